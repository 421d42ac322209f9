// Experience and wave rewards
const EXP_PER_DEFEATED_LEVEL: u32 = 50;
const EXP_FLAT_BONUS: u32 = 100;

/// Every wave divisible by this grants one extra capture item.
pub const BONUS_ITEM_WAVE_INTERVAL: u32 = 5;

/// Highest level a combatant can reach.
pub const MAX_LEVEL: u8 = 100;

/// Experience awarded for defeating an opponent of `defeated_level`.
/// Formula: level × 50 + 100
pub fn experience_gain(defeated_level: u8) -> u32 {
    defeated_level as u32 * EXP_PER_DEFEATED_LEVEL + EXP_FLAT_BONUS
}

/// Experience needed to advance into `level`: level³.
/// A combatant at level L stores `experience_to_reach_level(L + 1)` as its threshold.
pub fn experience_to_reach_level(level: u8) -> u32 {
    (level as u32).pow(3)
}

/// Bonus capture items granted on arriving at `wave`.
pub fn wave_bonus_items(wave: u32) -> u32 {
    if wave > 0 && wave % BONUS_ITEM_WAVE_INTERVAL == 0 {
        1
    } else {
        0
    }
}
