use crate::battle::state::{BattleEvent, BattleOutcome, BattlePhase, BattleState, EventBus, Side};
use crate::session::{GameState, SessionUpdate};

/// Atomic changes a battle step produces. Each one becomes a single
/// whole-field session update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleCommand {
    EmitEvent(BattleEvent),
    DealDamage { target: Side, amount: u32 },
    SetPhase(BattlePhase),
    PassTurn,
    EndBattle(BattleOutcome),
}

/// Translate one command into the session update that applies it, recording
/// events on the bus and in the battle log. Returns `None` when there is
/// nothing to change (e.g. the target is already gone).
pub fn execute_command(
    command: BattleCommand,
    state: &GameState,
    bus: &mut EventBus,
) -> Option<SessionUpdate> {
    let battle = state.battle.clone().unwrap_or_default();

    match command {
        BattleCommand::EmitEvent(event) => {
            let line = event.format();
            bus.push(event);
            let line = line?;
            let mut battle = battle;
            battle.log.push(line);
            Some(SessionUpdate::new().with_battle(Some(battle)))
        }
        BattleCommand::DealDamage { target, amount } => match target {
            Side::Player => {
                let mut active = state.active.clone()?;
                active.take_damage(amount);
                Some(SessionUpdate::new().with_active(Some(active)))
            }
            Side::Opponent => {
                let mut opponent = state.opponent.clone()?;
                opponent.take_damage(amount);
                Some(SessionUpdate::new().with_opponent(Some(opponent)))
            }
        },
        BattleCommand::SetPhase(phase) => Some(SessionUpdate::new().with_battle(Some(
            BattleState { phase, ..battle },
        ))),
        BattleCommand::PassTurn => {
            let turn = battle.turn.other();
            // A full round has passed once the player is up again
            let turn_number = if turn == Side::Player {
                battle.turn_number + 1
            } else {
                battle.turn_number
            };
            Some(SessionUpdate::new().with_battle(Some(BattleState {
                turn,
                turn_number,
                phase: BattlePhase::SelectMove,
                ..battle
            })))
        }
        BattleCommand::EndBattle(outcome) => {
            bus.push(BattleEvent::BattleEnded { outcome });
            Some(SessionUpdate::new().with_battle(Some(BattleState {
                phase: BattlePhase::Ended,
                outcome: Some(outcome),
                ..battle
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::ActiveCombatant;
    use crate::test_support::creature;
    use pretty_assertions::assert_eq;

    fn battle_state() -> GameState {
        GameState {
            active: Some(ActiveCombatant::new(creature(4, "charmander", 39), 5, vec![])),
            opponent: Some(ActiveCombatant::new(creature(19, "rattata", 30), 5, vec![])),
            battle: Some(BattleState::new()),
            ..Default::default()
        }
    }

    fn run(state: &mut GameState, command: BattleCommand, bus: &mut EventBus) {
        if let Some(update) = execute_command(command, state, bus) {
            update.apply_to(state);
        }
    }

    #[test]
    fn test_damage_targets_the_right_side() {
        let mut state = battle_state();
        let mut bus = EventBus::new();
        let player_hp = state.active.as_ref().unwrap().current_hp;
        let opponent_hp = state.opponent.as_ref().unwrap().current_hp;

        run(
            &mut state,
            BattleCommand::DealDamage {
                target: Side::Opponent,
                amount: 3,
            },
            &mut bus,
        );
        assert_eq!(state.opponent.as_ref().unwrap().current_hp, opponent_hp - 3);
        assert_eq!(state.active.as_ref().unwrap().current_hp, player_hp);

        run(
            &mut state,
            BattleCommand::DealDamage {
                target: Side::Player,
                amount: 1000,
            },
            &mut bus,
        );
        assert!(state.active.as_ref().unwrap().is_fainted());
    }

    #[test]
    fn test_events_are_logged() {
        let mut state = battle_state();
        let mut bus = EventBus::new();
        run(
            &mut state,
            BattleCommand::EmitEvent(BattleEvent::Fainted {
                name: "rattata".to_string(),
            }),
            &mut bus,
        );
        run(
            &mut state,
            BattleCommand::EndBattle(BattleOutcome::Victory),
            &mut bus,
        );

        let battle = state.battle.unwrap();
        assert_eq!(battle.log, vec!["rattata fainted!".to_string()]);
        assert_eq!(battle.phase, BattlePhase::Ended);
        assert_eq!(battle.outcome, Some(BattleOutcome::Victory));
        assert_eq!(bus.len(), 2);
    }

    #[test]
    fn test_pass_turn_counts_rounds() {
        let mut state = battle_state();
        let mut bus = EventBus::new();

        run(&mut state, BattleCommand::SetPhase(BattlePhase::Resolving), &mut bus);
        run(&mut state, BattleCommand::PassTurn, &mut bus);
        let battle = state.battle.clone().unwrap();
        assert_eq!(battle.turn, Side::Opponent);
        assert_eq!(battle.phase, BattlePhase::SelectMove);
        assert_eq!(battle.turn_number, 1);

        run(&mut state, BattleCommand::PassTurn, &mut bus);
        let battle = state.battle.unwrap();
        assert_eq!(battle.turn, Side::Player);
        assert_eq!(battle.turn_number, 2);
    }

    #[test]
    fn test_damage_without_target_is_ignored() {
        let state = GameState::default();
        let mut bus = EventBus::new();
        let update = execute_command(
            BattleCommand::DealDamage {
                target: Side::Opponent,
                amount: 5,
            },
            &state,
            &mut bus,
        );
        assert_eq!(update, None);
    }
}
