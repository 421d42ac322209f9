use std::time::Duration;

use log::{debug, info, warn};
use schema::MoveRecord;

use crate::battle::calculators::{balance_opponent_move, calculate_attack_outcome};
use crate::battle::commands::{execute_command, BattleCommand};
use crate::battle::state::{
    BattleEvent, BattleOutcome, BattlePhase, BattleState, EventBus, Side, TurnRng,
};
use crate::catalog::Catalog;
use crate::combatant::ActiveCombatant;
use crate::config::Pacing;
use crate::errors::{ActionError, ActionResult};
use crate::progression::{experience_gain, ProgressionEngine};
use crate::session::{Phase, SessionStore, SessionUpdate};

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Drives one battle against the session store. Every HP change is written
/// through the store as soon as it happens.
pub struct BattleEngine<'a> {
    pub catalog: &'a dyn Catalog,
    pub store: &'a mut SessionStore,
    pub rng: &'a mut TurnRng,
    pub pacing: Pacing,
}

impl BattleEngine<'_> {
    async fn run(&mut self, command: BattleCommand, bus: &mut EventBus) {
        if let Some(update) = execute_command(command, self.store.state(), bus) {
            self.store.apply(update).await;
        }
    }

    async fn emit(&mut self, event: BattleEvent, bus: &mut EventBus) {
        self.run(BattleCommand::EmitEvent(event), bus).await;
    }

    /// Put `opponent` in the ring with the player to act first.
    pub async fn start_battle(&mut self, opponent: ActiveCombatant) -> EventBus {
        let mut bus = EventBus::new();
        info!(
            "Wave {}: {} (level {}) appears",
            self.store.state().wave,
            opponent.name(),
            opponent.level
        );
        let name = opponent.name().to_string();
        self.store
            .apply(
                SessionUpdate::new()
                    .with_opponent(Some(opponent))
                    .with_battle(Some(BattleState::new()))
                    .with_pending_evolution(None)
                    .with_phase(Phase::Battle),
            )
            .await;
        self.emit(BattleEvent::OpponentAppeared { name }, &mut bus)
            .await;
        bus
    }

    /// Player picks a move; it resolves, then the opponent answers unless
    /// the battle ended.
    pub async fn choose_move(&mut self, move_index: usize) -> ActionResult<EventBus> {
        let state = self.store.state();
        if state.phase != Phase::Battle {
            return Err(ActionError::WrongPhase {
                action: "choose move",
                phase: state.phase,
            });
        }
        let active = state.active.as_ref().ok_or(ActionError::NoActiveCombatant)?;
        if state.opponent.is_none() {
            return Err(ActionError::NoOpponent);
        }
        if !state.battle.as_ref().is_some_and(BattleState::is_player_turn) {
            return Err(ActionError::NotPlayerTurn);
        }
        let chosen = active
            .move_at(move_index)
            .ok_or(ActionError::InvalidMoveIndex(move_index))?;

        let mut bus = EventBus::new();
        if self.resolve_attack(Side::Player, &chosen, &mut bus).await {
            self.handle_victory(&mut bus).await;
            return Ok(bus);
        }

        pause(self.pacing.turn_delay()).await;
        self.opponent_turn(&mut bus).await;
        Ok(bus)
    }

    /// The opponent's automatic turn. Ends in defeat if the player faints.
    pub async fn opponent_turn(&mut self, bus: &mut EventBus) {
        let Some(opponent) = self.store.state().opponent.clone() else {
            return;
        };
        let chosen = self.pick_opponent_move(&opponent).await;
        let balanced = balance_opponent_move(chosen, opponent.level);

        if self.resolve_attack(Side::Opponent, &balanced, bus).await {
            self.handle_defeat(bus).await;
        }
    }

    /// Uniform pick over the opponent's learnable entries, re-fetched from the catalog.
    async fn pick_opponent_move(&mut self, opponent: &ActiveCombatant) -> MoveRecord {
        let entries = opponent.record.level_up_moves(opponent.level);
        if entries.is_empty() {
            return MoveRecord::basic_tackle();
        }
        let entry = entries[self.rng.next_index(entries.len(), "opponent move")];
        match self.catalog.get_move(&entry.move_ref.key()).await {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "Opponent move {} unavailable, using tackle: {}",
                    entry.move_ref.name, err
                );
                MoveRecord::basic_tackle()
            }
        }
    }

    /// Resolve one attack by `attacker`. Returns true when the defender fainted;
    /// otherwise the turn passes to the other side.
    async fn resolve_attack(
        &mut self,
        attacker: Side,
        move_used: &MoveRecord,
        bus: &mut EventBus,
    ) -> bool {
        let state = self.store.state();
        let (Some(active), Some(opponent)) = (state.active.clone(), state.opponent.clone()) else {
            return false;
        };
        let (attacking, defending) = match attacker {
            Side::Player => (&active, &opponent),
            Side::Opponent => (&opponent, &active),
        };
        let defender = attacker.other();

        self.run(BattleCommand::SetPhase(BattlePhase::Resolving), bus)
            .await;
        let commands =
            calculate_attack_outcome(attacking, defending, defender, move_used, self.rng);
        for command in commands {
            if matches!(command, BattleCommand::DealDamage { .. }) {
                pause(self.pacing.attack_delay()).await;
            }
            self.run(command, bus).await;
        }

        let fainted = match defender {
            Side::Player => self.store.state().active.as_ref(),
            Side::Opponent => self.store.state().opponent.as_ref(),
        }
        .is_some_and(ActiveCombatant::is_fainted);

        if !fainted {
            self.run(BattleCommand::PassTurn, bus).await;
        }
        fainted
    }

    /// Award experience, level up, look for an evolution, and move to `victory`.
    async fn handle_victory(&mut self, bus: &mut EventBus) {
        pause(self.pacing.end_delay()).await;
        let state = self.store.state();
        let (Some(active), Some(defeated)) = (state.active.clone(), state.opponent.clone()) else {
            return;
        };

        self.run(BattleCommand::EndBattle(BattleOutcome::Victory), bus)
            .await;

        let gained = experience_gain(defeated.level);
        self.emit(
            BattleEvent::ExperienceGained {
                name: active.name().to_string(),
                amount: gained,
            },
            bus,
        )
        .await;

        let progression = ProgressionEngine::new(self.catalog);
        let leveled = progression.resolve_level_ups(active.clone(), gained).await;
        if leveled.level > active.level {
            self.emit(
                BattleEvent::LeveledUp {
                    name: leveled.name().to_string(),
                    level: leveled.level,
                },
                bus,
            )
            .await;
        }

        let evolution = progression.find_evolution(&leveled).await;
        if let Some(evolved) = &evolution {
            self.emit(
                BattleEvent::EvolutionReady {
                    name: leveled.name().to_string(),
                    into: evolved.name.clone(),
                },
                bus,
            )
            .await;
        }

        debug!("{} defeated {}", leveled.name(), defeated.name());
        self.store
            .apply(
                SessionUpdate::new()
                    .with_active(Some(leveled))
                    .with_last_defeated(Some(defeated))
                    .with_opponent(None)
                    .with_pending_evolution(evolution)
                    .with_phase(Phase::Victory),
            )
            .await;
    }

    async fn handle_defeat(&mut self, bus: &mut EventBus) {
        pause(self.pacing.end_delay()).await;
        self.finish_lost_battle(BattleOutcome::Defeat, bus).await;
    }

    /// Abandon the battle. Same effect as a defeat.
    pub async fn surrender(&mut self) -> ActionResult<EventBus> {
        let state = self.store.state();
        if state.phase != Phase::Battle {
            return Err(ActionError::WrongPhase {
                action: "surrender",
                phase: state.phase,
            });
        }
        let mut bus = EventBus::new();
        if let Some(active) = state.active.as_ref() {
            let name = active.name().to_string();
            self.emit(BattleEvent::Surrendered { name }, &mut bus).await;
        }
        self.finish_lost_battle(BattleOutcome::Surrender, &mut bus)
            .await;
        Ok(bus)
    }

    /// Only the battle record and the phase change; everything else stays as it was.
    async fn finish_lost_battle(&mut self, outcome: BattleOutcome, bus: &mut EventBus) {
        self.run(BattleCommand::EndBattle(outcome), bus).await;
        self.store
            .apply(SessionUpdate::new().with_phase(Phase::Defeat))
            .await;
    }

    /// Finish a battle whose deciding write landed before the session was
    /// last saved but whose result did not. Returns `None` when the battle
    /// is still undecided.
    pub async fn settle_interrupted(&mut self) -> Option<EventBus> {
        let state = self.store.state();
        if state.phase != Phase::Battle {
            return None;
        }
        let Some(player_fainted) = state.active.as_ref().map(ActiveCombatant::is_fainted) else {
            return None;
        };
        let opponent_fainted = state
            .opponent
            .as_ref()
            .is_some_and(ActiveCombatant::is_fainted);
        let recorded = state.battle.as_ref().and_then(|battle| battle.outcome);

        let mut bus = EventBus::new();
        if player_fainted {
            debug!("Settling a battle the player already lost");
            self.finish_lost_battle(BattleOutcome::Defeat, &mut bus)
                .await;
        } else if opponent_fainted {
            debug!("Settling a battle the player already won");
            self.handle_victory(&mut bus).await;
        } else {
            let outcome = recorded.filter(|outcome| *outcome != BattleOutcome::Victory)?;
            debug!("Settling a battle that ended in {:?}", outcome);
            self.finish_lost_battle(outcome, &mut bus).await;
        }
        Some(bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{GameState, MemoryStorage};
    use crate::test_support::{creature_with_moves, offensive_move, starter_catalog};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    async fn store_with(state: GameState) -> SessionStore {
        let mut store = SessionStore::open(Arc::new(MemoryStorage::new())).await;
        store
            .apply(
                SessionUpdate::new()
                    .with_active(state.active)
                    .with_opponent(state.opponent)
                    .with_items(state.items)
                    .with_captured(state.captured)
                    .with_wave(state.wave)
                    .with_battle(state.battle)
                    .with_phase(state.phase),
            )
            .await;
        store
    }

    fn charmander() -> ActiveCombatant {
        let record = creature_with_moves(4, "charmander", &[(10, "scratch", 1), (52, "ember", 7)]);
        ActiveCombatant::new(record, 5, vec![offensive_move(10, "scratch", 40)])
    }

    fn rattata(hp: u32) -> ActiveCombatant {
        let record = creature_with_moves(19, "rattata", &[(33, "tackle", 1)]);
        let mut opponent = ActiveCombatant::new(record, 5, vec![]);
        opponent.current_hp = hp;
        opponent
    }

    fn in_battle(active: ActiveCombatant, opponent: ActiveCombatant) -> GameState {
        GameState {
            active: Some(active),
            opponent: Some(opponent),
            phase: Phase::Battle,
            battle: Some(BattleState::new()),
            items: 2,
            captured: [16, 19].into_iter().collect(),
            wave: 4,
            ..Default::default()
        }
    }

    fn engine<'a>(
        catalog: &'a dyn Catalog,
        store: &'a mut SessionStore,
        rng: &'a mut TurnRng,
    ) -> BattleEngine<'a> {
        BattleEngine {
            catalog,
            store,
            rng,
            pacing: Pacing::instant(),
        }
    }

    #[tokio::test]
    async fn test_start_battle_logs_appearance() {
        let catalog = starter_catalog();
        let mut store = store_with(GameState {
            active: Some(charmander()),
            ..Default::default()
        })
        .await;
        let mut rng = TurnRng::new_for_test(vec![]);

        let bus = engine(&catalog, &mut store, &mut rng)
            .start_battle(rattata(20))
            .await;

        let state = store.state();
        assert_eq!(state.phase, Phase::Battle);
        let battle = state.battle.as_ref().unwrap();
        assert!(battle.is_player_turn());
        assert_eq!(battle.log, vec!["A wild rattata appeared!".to_string()]);
        assert_eq!(bus.len(), 1);
    }

    #[tokio::test]
    async fn test_exchange_of_blows_writes_hp_through() {
        let catalog = starter_catalog();
        let mut store = store_with(in_battle(charmander(), rattata(20))).await;
        // player damage roll, opponent move pick, opponent damage roll
        let mut rng = TurnRng::new_for_test(vec![0.0, 0.0, 0.0]);

        engine(&catalog, &mut store, &mut rng)
            .choose_move(0)
            .await
            .unwrap();

        let state = store.state();
        // 5.2 * 0.85 floors to 4 both ways
        assert_eq!(state.opponent.as_ref().unwrap().current_hp, 16);
        let player = state.active.as_ref().unwrap();
        assert_eq!(player.current_hp, player.max_hp - 4);

        let battle = state.battle.as_ref().unwrap();
        assert!(battle.is_player_turn());
        assert_eq!(battle.turn_number, 2);
        assert_eq!(
            battle.log,
            vec![
                "charmander used scratch!".to_string(),
                "It dealt 4 damage!".to_string(),
                "rattata used tackle!".to_string(),
                "It dealt 4 damage!".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_victory_awards_experience() {
        let catalog = starter_catalog();
        let mut store = store_with(in_battle(charmander(), rattata(3))).await;
        let mut rng = TurnRng::new_for_test(vec![0.0]);

        let bus = engine(&catalog, &mut store, &mut rng)
            .choose_move(0)
            .await
            .unwrap();

        let state = store.state();
        assert_eq!(state.phase, Phase::Victory);
        assert!(state.opponent.is_none());
        assert_eq!(state.last_defeated.as_ref().map(|c| c.id()), Some(19));
        // level 5 opponent is worth 350; 216 reaches level 6, 134 carries over
        let player = state.active.as_ref().unwrap();
        assert_eq!(player.level, 6);
        assert_eq!(player.experience, 134);
        assert!(bus
            .formatted()
            .contains(&"charmander gained 350 experience!".to_string()));
        assert!(bus
            .formatted()
            .contains(&"charmander leveled up to level 6!".to_string()));
        assert_eq!(state.pending_evolution, None);
        assert_eq!(state.battle.as_ref().unwrap().outcome, Some(BattleOutcome::Victory));
    }

    #[tokio::test]
    async fn test_victory_surfaces_pending_evolution() {
        let catalog = starter_catalog();
        let mut player = charmander();
        player.level = 15;
        player.experience_to_next = 1;
        let mut store = store_with(in_battle(player, rattata(1))).await;
        let mut rng = TurnRng::new_for_test(vec![0.0]);

        engine(&catalog, &mut store, &mut rng)
            .choose_move(0)
            .await
            .unwrap();

        let state = store.state();
        assert_eq!(state.active.as_ref().unwrap().level, 16);
        assert_eq!(
            state.pending_evolution.as_ref().map(|r| r.name.as_str()),
            Some("charmeleon")
        );
        // Not replaced until confirmed
        assert_eq!(state.active.as_ref().unwrap().name(), "charmander");
    }

    #[tokio::test]
    async fn test_defeat_preserves_progress() {
        let catalog = starter_catalog();
        let mut player = charmander();
        player.current_hp = 1;
        let before = in_battle(player, rattata(20));
        let mut store = store_with(before.clone()).await;
        let mut rng = TurnRng::new_for_test(vec![0.0, 0.0, 0.0]);

        engine(&catalog, &mut store, &mut rng)
            .choose_move(0)
            .await
            .unwrap();

        let state = store.state();
        assert_eq!(state.phase, Phase::Defeat);
        assert_eq!(state.opponent.as_ref().map(|c| c.current_hp), Some(16));
        assert_eq!(state.captured, before.captured);
        assert_eq!(state.items, before.items);
        assert_eq!(state.wave, before.wave);
        assert_eq!(state.active.as_ref().unwrap().current_hp, 0);
    }

    #[tokio::test]
    async fn test_surrender_preserves_progress() {
        let catalog = starter_catalog();
        let before = in_battle(charmander(), rattata(20));
        let mut store = store_with(before.clone()).await;
        let mut rng = TurnRng::new_for_test(vec![]);

        let bus = engine(&catalog, &mut store, &mut rng)
            .surrender()
            .await
            .unwrap();

        let state = store.state();
        assert_eq!(state.phase, Phase::Defeat);
        assert_eq!(state.opponent, before.opponent);
        assert_eq!(state.active, before.active);
        assert_eq!(state.captured, before.captured);
        assert_eq!(state.items, before.items);
        assert_eq!(state.wave, before.wave);
        assert_eq!(
            state.battle.as_ref().unwrap().outcome,
            Some(BattleOutcome::Surrender)
        );
        assert_eq!(
            bus.formatted(),
            vec!["charmander retreated from battle.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_settles_a_won_battle_left_unrecorded() {
        let catalog = starter_catalog();
        let mut store = store_with(in_battle(charmander(), rattata(0))).await;
        let mut rng = TurnRng::new_for_test(vec![]);

        let bus = engine(&catalog, &mut store, &mut rng)
            .settle_interrupted()
            .await
            .expect("battle was already decided");

        let state = store.state();
        assert_eq!(state.phase, Phase::Victory);
        assert_eq!(state.last_defeated.as_ref().map(|c| c.id()), Some(19));
        assert_eq!(state.active.as_ref().unwrap().experience, 134);
        assert!(bus
            .formatted()
            .contains(&"charmander gained 350 experience!".to_string()));
    }

    #[tokio::test]
    async fn test_settles_a_lost_battle_left_unrecorded() {
        let catalog = starter_catalog();
        let mut player = charmander();
        player.current_hp = 0;
        let before = in_battle(player, rattata(20));
        let mut store = store_with(before.clone()).await;
        let mut rng = TurnRng::new_for_test(vec![]);

        engine(&catalog, &mut store, &mut rng)
            .settle_interrupted()
            .await
            .expect("battle was already decided");

        let state = store.state();
        assert_eq!(state.phase, Phase::Defeat);
        assert_eq!(state.opponent, before.opponent);
        assert_eq!(
            state.battle.as_ref().unwrap().outcome,
            Some(BattleOutcome::Defeat)
        );
    }

    #[tokio::test]
    async fn test_undecided_battle_is_not_settled() {
        let catalog = starter_catalog();
        let mut store = store_with(in_battle(charmander(), rattata(20))).await;
        let snapshot = store.state().clone();
        let mut rng = TurnRng::new_for_test(vec![]);

        let settled = engine(&catalog, &mut store, &mut rng)
            .settle_interrupted()
            .await;
        assert_eq!(settled, None);
        assert_eq!(store.state(), &snapshot);
    }

    #[tokio::test]
    async fn test_opponent_move_is_capped() {
        // A level 5 opponent whose only move has 120 power hits as if it had 60
        let catalog = starter_catalog().with_move(offensive_move(38, "double-edge", 120));
        let record = creature_with_moves(19, "rattata", &[(38, "double-edge", 1)]);
        let opponent = ActiveCombatant::new(record, 5, vec![]);
        let mut store = store_with(in_battle(charmander(), opponent)).await;
        let mut rng = TurnRng::new_for_test(vec![0.0, 0.0, 0.0]);

        engine(&catalog, &mut store, &mut rng)
            .choose_move(0)
            .await
            .unwrap();

        // ((20/250) * 1 * 60 + 2) * 0.85 = 5.78
        let player = store.state().active.clone().unwrap();
        assert_eq!(player.max_hp - player.current_hp, 5);
    }

    #[tokio::test]
    async fn test_opponent_falls_back_to_tackle() {
        // The opponent's move is missing from the catalog
        let catalog = starter_catalog();
        let record = creature_with_moves(19, "rattata", &[(999, "mystery", 1)]);
        let opponent = ActiveCombatant::new(record, 5, vec![]);
        let mut store = store_with(in_battle(charmander(), opponent)).await;
        let mut rng = TurnRng::new_for_test(vec![0.0, 0.0, 0.0]);

        let bus = engine(&catalog, &mut store, &mut rng)
            .choose_move(0)
            .await
            .unwrap();
        assert!(bus
            .formatted()
            .contains(&"rattata used tackle!".to_string()));
    }

    #[tokio::test]
    async fn test_rejected_moves_leave_state_untouched() {
        let catalog = starter_catalog();
        let before = in_battle(charmander(), rattata(20));
        let mut store = store_with(before).await;
        let snapshot = store.state().clone();
        let mut rng = TurnRng::new_for_test(vec![]);

        let result = engine(&catalog, &mut store, &mut rng).choose_move(3).await;
        assert_eq!(result.err(), Some(ActionError::InvalidMoveIndex(3)));
        assert_eq!(store.state(), &snapshot);

        store
            .apply(SessionUpdate::new().with_phase(Phase::Victory))
            .await;
        let result = engine(&catalog, &mut store, &mut rng).choose_move(0).await;
        assert!(matches!(
            result,
            Err(ActionError::WrongPhase {
                phase: Phase::Victory,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_move_rejected_on_opponent_turn() {
        let catalog = starter_catalog();
        let mut state = in_battle(charmander(), rattata(20));
        state.battle.as_mut().unwrap().turn = Side::Opponent;
        let mut store = store_with(state).await;
        let mut rng = TurnRng::new_for_test(vec![]);

        let result = engine(&catalog, &mut store, &mut rng).choose_move(0).await;
        assert_eq!(result.err(), Some(ActionError::NotPlayerTurn));
    }
}
