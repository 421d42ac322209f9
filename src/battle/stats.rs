use schema::BaseStats;
use serde::{Deserialize, Serialize};

/// Battle stats of a creature at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// Flat IV every creature is treated as having.
const FIXED_IV: u32 = 31;
const OTHER_STAT_OFFSET: u32 = 5;
const HP_FLAT_OFFSET: u32 = 10;

/// floor(((2 * base + 31) * level) / 100) + offset
fn scaled_stat(base: u16, level: u8) -> u32 {
    ((2 * base as u32 + FIXED_IV) * level as u32) / 100
}

/// Derive battle stats from catalog base stats. Missing base values count as 50.
/// HP gets `level + 10` on top, the other stats a flat 5.
pub fn derive_stats(base: &BaseStats, level: u8) -> DerivedStats {
    DerivedStats {
        hp: scaled_stat(base.hp(), level) + level as u32 + HP_FLAT_OFFSET,
        attack: scaled_stat(base.attack(), level) + OTHER_STAT_OFFSET,
        defense: scaled_stat(base.defense(), level) + OTHER_STAT_OFFSET,
        speed: scaled_stat(base.speed(), level) + OTHER_STAT_OFFSET,
    }
}
