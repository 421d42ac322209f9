use super::Phase;
use crate::battle::state::{BattlePhase, BattleState};
use crate::collection::Lineage;
use crate::combatant::ActiveCombatant;
use log::warn;
use schema::CreatureRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const INITIAL_WAVE: u32 = 1;
pub const INITIAL_ITEMS: u32 = 5;

/// Everything about the current run. Absent fields in a stored session take
/// their defaults when it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub active: Option<ActiveCombatant>,
    pub opponent: Option<ActiveCombatant>,
    pub last_defeated: Option<ActiveCombatant>,
    pub wave: u32,
    pub items: u32,
    pub captured: BTreeSet<u32>,
    pub chosen_starter: Option<u32>,
    pub lineage: Lineage,
    pub phase: Phase,
    pub battle: Option<BattleState>,
    pub pending_evolution: Option<CreatureRecord>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            active: None,
            opponent: None,
            last_defeated: None,
            wave: INITIAL_WAVE,
            items: INITIAL_ITEMS,
            captured: BTreeSet::new(),
            chosen_starter: None,
            lineage: Lineage::default(),
            phase: Phase::Home,
            battle: None,
            pending_evolution: None,
        }
    }
}

impl GameState {
    /// Decode a stored session field by field. A field that is absent or
    /// fails to decode takes its default without touching the others.
    /// Returns `None` when the stored value is not an object at all.
    pub fn from_saved(saved: Value) -> Option<Self> {
        let Value::Object(fields) = saved else {
            return None;
        };
        let defaults = GameState::default();
        Some(Self {
            active: saved_field(&fields, "active", defaults.active),
            opponent: saved_field(&fields, "opponent", defaults.opponent),
            last_defeated: saved_field(&fields, "last_defeated", defaults.last_defeated),
            wave: saved_field(&fields, "wave", defaults.wave),
            items: saved_field(&fields, "items", defaults.items),
            captured: saved_field(&fields, "captured", defaults.captured),
            chosen_starter: saved_field(&fields, "chosen_starter", defaults.chosen_starter),
            lineage: saved_field(&fields, "lineage", defaults.lineage),
            phase: saved_field(&fields, "phase", defaults.phase),
            battle: saved_field(&fields, "battle", defaults.battle),
            pending_evolution: saved_field(
                &fields,
                "pending_evolution",
                defaults.pending_evolution,
            ),
        })
    }

    /// Repair a session read back from storage so every phase it lands in is playable.
    pub fn normalized(mut self) -> Self {
        if self.wave == 0 {
            self.wave = INITIAL_WAVE;
        }
        self.active = self.active.map(ActiveCombatant::repaired);
        self.opponent = self.opponent.map(ActiveCombatant::repaired);
        self.last_defeated = self.last_defeated.map(ActiveCombatant::repaired);
        if self.active.is_none() && !self.phase.resumable_without_combatant() {
            self.phase = Phase::Home;
        }
        // A turn interrupted mid-resolution is replayed from move selection
        if let Some(battle) = self.battle.as_mut() {
            if battle.phase == BattlePhase::Resolving {
                battle.phase = BattlePhase::SelectMove;
            }
        }
        self
    }
}

fn saved_field<T: DeserializeOwned>(fields: &Map<String, Value>, name: &str, default: T) -> T {
    let Some(raw) = fields.get(name) else {
        return default;
    };
    match T::deserialize(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("Saved field '{}' is unreadable, using its default: {}", name, err);
            default
        }
    }
}

/// A set of whole-field replacements. Fields left as `None` are untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub active: Option<Option<ActiveCombatant>>,
    pub opponent: Option<Option<ActiveCombatant>>,
    pub last_defeated: Option<Option<ActiveCombatant>>,
    pub wave: Option<u32>,
    pub items: Option<u32>,
    pub captured: Option<BTreeSet<u32>>,
    pub chosen_starter: Option<Option<u32>>,
    pub lineage: Option<Lineage>,
    pub phase: Option<Phase>,
    pub battle: Option<Option<BattleState>>,
    pub pending_evolution: Option<Option<CreatureRecord>>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active(mut self, active: Option<ActiveCombatant>) -> Self {
        self.active = Some(active);
        self
    }

    pub fn with_opponent(mut self, opponent: Option<ActiveCombatant>) -> Self {
        self.opponent = Some(opponent);
        self
    }

    pub fn with_last_defeated(mut self, last_defeated: Option<ActiveCombatant>) -> Self {
        self.last_defeated = Some(last_defeated);
        self
    }

    pub fn with_wave(mut self, wave: u32) -> Self {
        self.wave = Some(wave);
        self
    }

    pub fn with_items(mut self, items: u32) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_captured(mut self, captured: BTreeSet<u32>) -> Self {
        self.captured = Some(captured);
        self
    }

    pub fn with_chosen_starter(mut self, chosen_starter: Option<u32>) -> Self {
        self.chosen_starter = Some(chosen_starter);
        self
    }

    pub fn with_lineage(mut self, lineage: Lineage) -> Self {
        self.lineage = Some(lineage);
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_battle(mut self, battle: Option<BattleState>) -> Self {
        self.battle = Some(battle);
        self
    }

    pub fn with_pending_evolution(mut self, pending: Option<CreatureRecord>) -> Self {
        self.pending_evolution = Some(pending);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `state`, replacing each provided field wholesale.
    pub fn apply_to(self, state: &mut GameState) {
        if let Some(active) = self.active {
            state.active = active;
        }
        if let Some(opponent) = self.opponent {
            state.opponent = opponent;
        }
        if let Some(last_defeated) = self.last_defeated {
            state.last_defeated = last_defeated;
        }
        if let Some(wave) = self.wave {
            state.wave = wave;
        }
        if let Some(items) = self.items {
            state.items = items;
        }
        if let Some(captured) = self.captured {
            state.captured = captured;
        }
        if let Some(chosen_starter) = self.chosen_starter {
            state.chosen_starter = chosen_starter;
        }
        if let Some(lineage) = self.lineage {
            state.lineage = lineage;
        }
        if let Some(phase) = self.phase {
            state.phase = phase;
        }
        if let Some(battle) = self.battle {
            state.battle = battle;
        }
        if let Some(pending_evolution) = self.pending_evolution {
            state.pending_evolution = pending_evolution;
        }
    }
}
