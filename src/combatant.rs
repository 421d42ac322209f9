use crate::battle::stats::{derive_stats, DerivedStats};
use crate::progression::rewards::experience_to_reach_level;
use schema::{CreatureRecord, MoveRecord};
use serde::{Deserialize, Serialize};

/// Most moves a combatant can know at once.
pub const MAX_LEARNED_MOVES: usize = 4;

/// A catalog creature brought into play with its own level, HP, experience
/// and move set. The player's combatant persists across battles; an
/// opponent's lives for one wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCombatant {
    pub record: CreatureRecord,
    pub level: u8,
    pub current_hp: u32,
    #[serde(default)]
    pub max_hp: u32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub experience_to_next: u32,
    #[serde(default)]
    pub learned_moves: Vec<MoveRecord>,
}

impl ActiveCombatant {
    /// Fresh combatant at full HP with no experience.
    pub fn new(record: CreatureRecord, level: u8, mut learned_moves: Vec<MoveRecord>) -> Self {
        let max_hp = derive_stats(&record.base_stats, level).hp;
        learned_moves.truncate(MAX_LEARNED_MOVES);
        Self {
            record,
            level,
            current_hp: max_hp,
            max_hp,
            experience: 0,
            experience_to_next: experience_to_reach_level(level.saturating_add(1)),
            learned_moves,
        }
    }

    /// Recompute derived fields a stored combatant was saved without.
    pub fn repaired(mut self) -> Self {
        if self.max_hp == 0 {
            self.max_hp = derive_stats(&self.record.base_stats, self.level).hp;
        }
        self.current_hp = self.current_hp.min(self.max_hp);
        if self.experience_to_next == 0 {
            self.experience_to_next = experience_to_reach_level(self.level.saturating_add(1));
        }
        self
    }

    pub fn id(&self) -> u32 {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn stats(&self) -> DerivedStats {
        derive_stats(&self.record.base_stats, self.level)
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Subtract damage, flooring at zero. Returns the remaining HP.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp
    }

    /// The move at `index`, or the basic tackle when nothing is learned.
    pub fn move_at(&self, index: usize) -> Option<MoveRecord> {
        if self.learned_moves.is_empty() {
            return (index == 0).then(MoveRecord::basic_tackle);
        }
        self.learned_moves.get(index).cloned()
    }
}
