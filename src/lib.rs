//! Creature Waves Engine
//!
//! A wave battler driven by a live public creature catalog: pick a starter,
//! fight an endless series of level-matched opponents, level up, evolve, and
//! capture what you beat. Presentation layers read the session and call the
//! named transitions on [`Game`].

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod collection;
pub mod combatant;
pub mod config;
pub mod errors;
pub mod game;
pub mod opponents;
pub mod progression;
pub mod session;

#[cfg(test)]
mod test_support;

// --- PUBLIC API RE-EXPORTS ---

// Catalog record shapes from the `schema` crate.
pub use schema::{
    BaseStats, CatalogKey, CreatureRecord, DamageClass, ElementType, EvolutionChainRecord,
    MoveRecord, SpeciesRecord,
};

// The orchestrator and the state it exposes.
pub use game::Game;
pub use session::{GameState, Phase, SessionUpdate};

// Battle types a front end renders.
pub use battle::state::{BattleEvent, BattleOutcome, BattleState, EventBus, TurnRng};
pub use combatant::ActiveCombatant;

// Collaborators the orchestrator is built from.
pub use catalog::{Catalog, HttpCatalog, MemoryCatalog};
pub use config::{GameConfig, Pacing};
pub use errors::{ActionError, CaptureError, CatalogError, ConfigError, StoreError};
pub use session::{FileStorage, MemoryStorage, SaveStorage};
