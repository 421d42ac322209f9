//! The run as a whole: every screen-to-screen transition a front end can ask for.
//!
//! [`Game`] owns the session store, the catalog, the RNG and the pacing, so
//! one transition always runs to completion before the next one starts.
//! A rejected transition returns an [`ActionError`] and leaves the session
//! exactly as it was.

use std::sync::Arc;

use log::{debug, info, warn};
use schema::CatalogKey;

use crate::battle::capture::{can_attempt_capture, capture};
use crate::battle::engine::BattleEngine;
use crate::battle::state::{BattlePhase, EventBus, Side, TurnRng};
use crate::catalog::Catalog;
use crate::collection::{available_creatures, Lineage, STARTING_LEVEL};
use crate::combatant::ActiveCombatant;
use crate::config::GameConfig;
use crate::errors::{ActionError, ActionResult};
use crate::opponents::OpponentGenerator;
use crate::progression::{wave_bonus_items, ProgressionEngine};
use crate::session::{GameState, Phase, SaveStorage, SessionStore, SessionUpdate};

pub struct Game {
    catalog: Arc<dyn Catalog>,
    store: SessionStore,
    rng: TurnRng,
    config: GameConfig,
}

impl Game {
    /// Load the saved session (or a fresh one) from `storage`.
    pub async fn open(
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn SaveStorage>,
        rng: TurnRng,
        config: GameConfig,
    ) -> Self {
        let store = SessionStore::open(storage).await;
        Self {
            catalog,
            store,
            rng,
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Merge a partial update into the session and persist it.
    pub async fn apply_update(&mut self, update: SessionUpdate) {
        self.store.apply(update).await;
    }

    fn battle_engine(&mut self) -> BattleEngine<'_> {
        BattleEngine {
            catalog: self.catalog.as_ref(),
            store: &mut self.store,
            rng: &mut self.rng,
            pacing: self.config.pacing,
        }
    }

    fn require_phase(&self, action: &'static str, allowed: &[Phase]) -> ActionResult<()> {
        let phase = self.state().phase;
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(ActionError::WrongPhase { action, phase })
        }
    }

    /// Pick up a battle that was interrupted when the session was last saved.
    pub async fn resume(&mut self) -> ActionResult<EventBus> {
        let state = self.state();
        if state.phase != Phase::Battle {
            return Ok(EventBus::new());
        }
        if let Some(bus) = self.battle_engine().settle_interrupted().await {
            return Ok(bus);
        }

        let state = self.state();
        let needs_opponent = state
            .opponent
            .as_ref()
            .map_or(true, ActiveCombatant::is_fainted)
            || state.battle.as_ref().map_or(true, |battle| battle.is_over());
        if needs_opponent {
            debug!("Resuming at wave {} with a new opponent", state.wave);
            return self.start_next_battle().await;
        }

        let opponent_to_act = state
            .battle
            .as_ref()
            .is_some_and(|b| b.turn == Side::Opponent && b.phase == BattlePhase::SelectMove);
        let mut bus = EventBus::new();
        if opponent_to_act {
            debug!("Resuming on the opponent's turn");
            self.battle_engine().opponent_turn(&mut bus).await;
        }
        Ok(bus)
    }

    /// Draw an opponent for the current wave and start the battle.
    async fn start_next_battle(&mut self) -> ActionResult<EventBus> {
        let level = self
            .state()
            .active
            .as_ref()
            .map(|active| active.level)
            .ok_or(ActionError::NoActiveCombatant)?;

        let generator =
            OpponentGenerator::new(self.catalog.as_ref(), self.config.opponent_attempts);
        let opponent = generator.generate(level, &mut self.rng).await;
        Ok(self.battle_engine().start_battle(opponent).await)
    }

    /// Fetch `id` and build it as a brand new combatant at the starting level.
    async fn build_starting_combatant(&self, id: u32) -> ActionResult<ActiveCombatant> {
        let record = self
            .catalog
            .get_creature(&CatalogKey::Id(id))
            .await
            .map_err(|err| {
                warn!("Could not load creature #{}: {}", id, err);
                ActionError::CreatureUnavailable(id)
            })?;
        let progression = ProgressionEngine::new(self.catalog.as_ref());
        let moves = progression.learned_moves(&record, STARTING_LEVEL).await;
        Ok(ActiveCombatant::new(record, STARTING_LEVEL, moves))
    }

    /// Make `combatant` the run's creature and send it into wave battle.
    async fn begin_with(&mut self, combatant: ActiveCombatant) -> ActionResult<EventBus> {
        info!("{} begins the run", combatant.name());
        let id = combatant.id();
        self.store
            .apply(
                SessionUpdate::new()
                    .with_active(Some(combatant))
                    .with_chosen_starter(Some(id))
                    .with_opponent(None)
                    .with_last_defeated(None)
                    .with_pending_evolution(None)
                    .with_phase(Phase::Battle),
            )
            .await;
        self.start_next_battle().await
    }

    /// Home: pick a creature from the starters and everything captured so far.
    pub async fn start_run(&mut self) -> ActionResult<()> {
        self.require_phase("start run", &[Phase::Home])?;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::SelectActive))
            .await;
        Ok(())
    }

    /// Home: wipe everything, captures included, and choose a lineage.
    pub async fn start_fresh_run(&mut self) -> ActionResult<()> {
        self.require_phase("start fresh run", &[Phase::Home])?;
        self.store.reset().await;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::SelectLineage))
            .await;
        Ok(())
    }

    pub async fn choose_lineage(&mut self, index: usize) -> ActionResult<()> {
        self.require_phase("choose lineage", &[Phase::SelectLineage])?;
        let lineage = Lineage::from_index(index).ok_or(ActionError::InvalidLineage(index))?;
        self.store
            .apply(
                SessionUpdate::new()
                    .with_lineage(lineage)
                    .with_phase(Phase::SelectStarter),
            )
            .await;
        Ok(())
    }

    /// One of the selected lineage's three starters.
    pub async fn choose_starting_creature(&mut self, id: u32) -> ActionResult<EventBus> {
        self.require_phase("choose starter", &[Phase::SelectStarter])?;
        if !self.state().lineage.starters().contains(&id) {
            return Err(ActionError::UnavailableCreature(id));
        }
        let combatant = self.build_starting_combatant(id).await?;
        self.begin_with(combatant).await
    }

    /// Any starter or previously captured creature.
    pub async fn choose_active_creature(&mut self, id: u32) -> ActionResult<EventBus> {
        self.require_phase("choose creature", &[Phase::SelectActive])?;
        if !available_creatures(&self.state().captured).contains(&id) {
            return Err(ActionError::UnavailableCreature(id));
        }
        let combatant = self.build_starting_combatant(id).await?;
        self.begin_with(combatant).await
    }

    /// Step back out of a selection screen or the catalog browser.
    pub async fn back(&mut self) -> ActionResult<()> {
        let target = match self.state().phase {
            Phase::SelectActive | Phase::SelectLineage | Phase::CatalogBrowse => Phase::Home,
            Phase::SelectStarter => Phase::SelectLineage,
            phase => {
                return Err(ActionError::WrongPhase {
                    action: "back",
                    phase,
                })
            }
        };
        self.store
            .apply(SessionUpdate::new().with_phase(target))
            .await;
        Ok(())
    }

    pub async fn choose_move(&mut self, index: usize) -> ActionResult<EventBus> {
        self.battle_engine().choose_move(index).await
    }

    pub async fn surrender(&mut self) -> ActionResult<EventBus> {
        self.battle_engine().surrender().await
    }

    /// Victory: advance the wave, collect any bonus item, and fight the next opponent.
    /// An unconfirmed evolution is dropped.
    pub async fn continue_wave(&mut self) -> ActionResult<EventBus> {
        self.require_phase("continue", &[Phase::Victory])?;
        if self.state().active.is_none() {
            return Err(ActionError::NoActiveCombatant);
        }

        let wave = self.state().wave + 1;
        let bonus = wave_bonus_items(wave);
        if bonus > 0 {
            info!("Wave {} bonus: {} capture item", wave, bonus);
        }
        let items = self.state().items + bonus;
        self.store
            .apply(
                SessionUpdate::new()
                    .with_wave(wave)
                    .with_items(items)
                    .with_opponent(None)
                    .with_pending_evolution(None)
                    .with_phase(Phase::Battle),
            )
            .await;
        self.start_next_battle().await
    }

    /// Replace the active creature with its pending evolution.
    pub async fn confirm_evolution(&mut self) -> ActionResult<()> {
        self.require_phase("evolve", &[Phase::Victory])?;
        let state = self.state();
        let active = state.active.as_ref().ok_or(ActionError::NoActiveCombatant)?;
        let evolved = state
            .pending_evolution
            .clone()
            .ok_or(ActionError::NoPendingEvolution)?;

        let progression = ProgressionEngine::new(self.catalog.as_ref());
        let next = progression.evolve(active, evolved).await;
        info!("{} evolved into {}", active.name(), next.name());
        self.store
            .apply(
                SessionUpdate::new()
                    .with_active(Some(next))
                    .with_pending_evolution(None),
            )
            .await;
        Ok(())
    }

    pub async fn skip_evolution(&mut self) -> ActionResult<()> {
        self.require_phase("skip evolution", &[Phase::Victory])?;
        if self.state().pending_evolution.is_none() {
            return Err(ActionError::NoPendingEvolution);
        }
        self.store
            .apply(SessionUpdate::new().with_pending_evolution(None))
            .await;
        Ok(())
    }

    /// Defeat: look at the last creature beaten, if an item is left to catch it with.
    pub async fn open_capture(&mut self) -> ActionResult<()> {
        self.require_phase("open capture", &[Phase::Defeat])?;
        can_attempt_capture(self.state())?;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::Capture))
            .await;
        Ok(())
    }

    /// Catch the last defeated creature; it becomes the active creature and the
    /// next battle starts at the current wave.
    pub async fn attempt_capture(&mut self) -> ActionResult<EventBus> {
        self.require_phase("capture", &[Phase::Defeat, Phase::Capture])?;
        let state = self.state();
        let target = can_attempt_capture(state)?;
        let outcome = capture(self.catalog.as_ref(), target, state.items, &state.captured).await?;

        info!(
            "Captured {}; {} items left",
            outcome.captured_combatant.name(),
            outcome.items
        );
        self.store
            .apply(
                SessionUpdate::new()
                    .with_active(Some(outcome.captured_combatant))
                    .with_items(outcome.items)
                    .with_captured(outcome.captured)
                    .with_last_defeated(None)
                    .with_opponent(None)
                    .with_pending_evolution(None)
                    .with_phase(Phase::Battle),
            )
            .await;
        self.start_next_battle().await
    }

    pub async fn skip_capture(&mut self) -> ActionResult<()> {
        self.require_phase("skip capture", &[Phase::Capture])?;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::Defeat))
            .await;
        Ok(())
    }

    pub async fn open_catalog(&mut self) -> ActionResult<()> {
        self.require_phase("open catalog", &[Phase::Home])?;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::CatalogBrowse))
            .await;
        Ok(())
    }

    pub async fn close_catalog(&mut self) -> ActionResult<()> {
        self.require_phase("close catalog", &[Phase::CatalogBrowse])?;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::Home))
            .await;
        Ok(())
    }

    /// Leave the run for the home screen. Captures, items and the wave are kept;
    /// the creatures in play are not. A battle in progress must be surrendered first.
    pub async fn return_home(&mut self) -> ActionResult<()> {
        let phase = self.state().phase;
        if phase == Phase::Battle {
            return Err(ActionError::WrongPhase {
                action: "return home",
                phase,
            });
        }
        self.store
            .apply(
                SessionUpdate::new()
                    .with_active(None)
                    .with_opponent(None)
                    .with_last_defeated(None)
                    .with_battle(None)
                    .with_pending_evolution(None)
                    .with_phase(Phase::Home),
            )
            .await;
        Ok(())
    }

    /// Back to the defaults: wave 1, five items, nothing captured, home.
    pub async fn reset_run(&mut self) {
        self.store.reset().await;
    }
}
