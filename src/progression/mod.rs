//! Experience, leveling, move learning and evolution.
//!
//! Pure formulas live in [`rewards`]. Everything that has to consult the
//! catalog hangs off [`ProgressionEngine`], split across the submodules.

pub mod evolution;
pub mod moves;
pub mod rewards;

use crate::battle::stats::derive_stats;
use crate::catalog::Catalog;
use crate::combatant::ActiveCombatant;
use log::debug;
use rewards::{experience_to_reach_level, MAX_LEVEL};

pub use rewards::{experience_gain, wave_bonus_items};

/// Catalog-backed progression rules.
pub struct ProgressionEngine<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> ProgressionEngine<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Add `gained` experience, advancing as many levels as it pays for.
    /// HP grows by the max HP delta and the move set is relearned when the
    /// level changes. Zero gain returns the combatant untouched.
    pub async fn resolve_level_ups(
        &self,
        combatant: ActiveCombatant,
        gained: u32,
    ) -> ActiveCombatant {
        if gained == 0 {
            return combatant;
        }

        let mut updated = combatant;
        let starting_level = updated.level;
        updated.experience = updated.experience.saturating_add(gained);

        while updated.level < MAX_LEVEL && updated.experience >= updated.experience_to_next {
            updated.experience -= updated.experience_to_next;
            updated.level += 1;
            updated.experience_to_next = experience_to_reach_level(updated.level + 1);
        }

        // Surplus at the cap is kept just under the threshold
        if updated.level >= MAX_LEVEL {
            updated.experience = updated
                .experience
                .min(updated.experience_to_next.saturating_sub(1));
        }

        if updated.level != starting_level {
            let new_max_hp = derive_stats(&updated.record.base_stats, updated.level).hp;
            let hp_increase = new_max_hp.saturating_sub(updated.max_hp);
            updated.max_hp = new_max_hp;
            updated.current_hp = (updated.current_hp + hp_increase).min(new_max_hp);
            updated.learned_moves = self.learned_moves(&updated.record, updated.level).await;
            debug!(
                "{} advanced from level {} to {}",
                updated.name(),
                starting_level,
                updated.level
            );
        }

        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::test_support::{creature_with_moves, offensive_move};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn charmander_catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_move(offensive_move(10, "scratch", 40))
            .with_move(offensive_move(52, "ember", 40))
            .with_move(offensive_move(33, "tackle", 40))
    }

    fn charmander(level: u8) -> ActiveCombatant {
        let record = creature_with_moves(4, "charmander", &[(10, "scratch", 1), (52, "ember", 7)]);
        ActiveCombatant::new(record, level, vec![offensive_move(10, "scratch", 40)])
    }

    #[tokio::test]
    async fn test_zero_gain_is_identity() {
        let catalog = charmander_catalog();
        let engine = ProgressionEngine::new(&catalog);
        let mut before = charmander(5);
        before.experience = 100;
        before.current_hp = 3;

        let after = engine.resolve_level_ups(before.clone(), 0).await;
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_gain_below_threshold_only_adds_experience() {
        let catalog = charmander_catalog();
        let engine = ProgressionEngine::new(&catalog);
        let before = charmander(5);

        let after = engine.resolve_level_ups(before.clone(), 200).await;
        assert_eq!(after.level, 5);
        assert_eq!(after.experience, 200);
        assert_eq!(after.learned_moves, before.learned_moves);
    }

    #[rstest]
    #[case(216, 1)] // exactly 6³
    #[case(216 + 343, 2)] // 6³ + 7³
    #[case(216 + 343 + 512, 3)] // + 8³
    #[tokio::test]
    async fn test_crossing_thresholds(#[case] gained: u32, #[case] levels: u8) {
        let catalog = charmander_catalog();
        let engine = ProgressionEngine::new(&catalog);

        let after = engine.resolve_level_ups(charmander(5), gained).await;
        assert_eq!(after.level, 5 + levels);
        assert_eq!(after.experience, 0);
        assert!(after.experience < after.experience_to_next);
        assert_eq!(after.experience_to_next, experience_to_reach_level(after.level + 1));
    }

    #[tokio::test]
    async fn test_level_up_raises_hp_by_delta_and_relearns() {
        let catalog = charmander_catalog();
        let engine = ProgressionEngine::new(&catalog);
        let mut before = charmander(5);
        before.current_hp = 4;

        let after = engine.resolve_level_ups(before.clone(), 216 + 343).await;
        assert_eq!(after.level, 7);
        let delta = after.max_hp - before.max_hp;
        assert!(delta > 0);
        assert_eq!(after.current_hp, 4 + delta);
        let names: Vec<&str> = after.learned_moves.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ember", "scratch"]);
    }

    #[tokio::test]
    async fn test_level_capped_at_max() {
        let catalog = charmander_catalog();
        let engine = ProgressionEngine::new(&catalog);

        let after = engine.resolve_level_ups(charmander(99), u32::MAX).await;
        assert_eq!(after.level, MAX_LEVEL);
        assert!(after.experience < after.experience_to_next);
    }
}
