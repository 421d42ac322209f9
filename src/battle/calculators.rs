use crate::battle::commands::BattleCommand;
use crate::battle::state::{BattleEvent, Side, TurnRng};
use crate::combatant::ActiveCombatant;
use schema::MoveRecord;

const MIN_DAMAGE_FACTOR: f64 = 0.85;
const DAMAGE_FACTOR_SPREAD: f64 = 0.15;

/// Highest level at which opponent moves are held to the low power cap.
const LOW_CAP_MAX_LEVEL: u8 = 10;
const LOW_POWER_CAP: u16 = 60;
const HIGH_POWER_CAP: u16 = 80;

/// Unrandomized damage: ((2L + 10) / 250) × (A / D) × P + 2.
/// A defense of zero is treated as one.
pub fn damage_base(attacker_level: u8, attack: u32, defense: u32, power: u16) -> f64 {
    let defense = defense.max(1) as f64;
    ((2.0 * attacker_level as f64 + 10.0) / 250.0) * (attack as f64 / defense) * power as f64
        + 2.0
}

/// Damage for one hit. Zero power deals nothing; otherwise the base is scaled by a
/// uniform factor in [0.85, 1.0), floored, and never drops below 1.
pub fn compute_damage(
    attacker_level: u8,
    attack: u32,
    defense: u32,
    power: u16,
    rng: &mut TurnRng,
) -> u32 {
    if power == 0 {
        return 0;
    }
    let base = damage_base(attacker_level, attack, defense, power);
    let factor = MIN_DAMAGE_FACTOR + rng.next_unit("damage variance") * DAMAGE_FACTOR_SPREAD;
    ((base * factor).floor() as u32).max(1)
}

/// Opponent moves are clamped so early waves stay survivable.
pub fn opponent_power_cap(level: u8) -> u16 {
    if level <= LOW_CAP_MAX_LEVEL {
        LOW_POWER_CAP
    } else {
        HIGH_POWER_CAP
    }
}

/// The move as the opponent will use it: missing power counts as 40, then the level cap applies.
pub fn balance_opponent_move(move_used: MoveRecord, level: u8) -> MoveRecord {
    let power = move_used.effective_power().min(opponent_power_cap(level));
    MoveRecord {
        power: Some(power),
        ..move_used
    }
}

/// Resolve one attack into the commands that apply it.
pub fn calculate_attack_outcome(
    attacker: &ActiveCombatant,
    defender: &ActiveCombatant,
    defender_side: Side,
    move_used: &MoveRecord,
    rng: &mut TurnRng,
) -> Vec<BattleCommand> {
    let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::MoveUsed {
        attacker: attacker.name().to_string(),
        move_name: move_used.name.clone(),
    })];

    let damage = compute_damage(
        attacker.level,
        attacker.stats().attack,
        defender.stats().defense,
        move_used.effective_power(),
        rng,
    );
    let remaining_hp = defender.current_hp.saturating_sub(damage);

    commands.push(BattleCommand::DealDamage {
        target: defender_side,
        amount: damage,
    });
    commands.push(BattleCommand::EmitEvent(BattleEvent::DamageDealt {
        target: defender_side,
        amount: damage,
        remaining_hp,
    }));

    if remaining_hp == 0 {
        commands.push(BattleCommand::EmitEvent(BattleEvent::Fainted {
            name: defender.name().to_string(),
        }));
    }

    commands
}
