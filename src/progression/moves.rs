use super::ProgressionEngine;
use crate::combatant::MAX_LEARNED_MOVES;
use log::warn;
use schema::{CatalogKey, CreatureRecord, MoveRecord};

/// How many of the most recently learnable moves are resolved before filtering.
const MOVE_CANDIDATES: usize = 6;

impl ProgressionEngine<'_> {
    /// Offensive moves known at `level`, most recently learned first, at most four.
    /// Falls back to a single tackle when nothing offensive is learnable.
    pub async fn learned_moves(&self, creature: &CreatureRecord, level: u8) -> Vec<MoveRecord> {
        let mut moves = Vec::new();
        for entry in creature.level_up_moves(level).into_iter().take(MOVE_CANDIDATES) {
            match self.catalog.get_move(&entry.move_ref.key()).await {
                Ok(record) if record.is_offensive() => moves.push(record),
                Ok(_) => {}
                Err(err) => warn!("Skipping move {}: {}", entry.move_ref.name, err),
            }
        }
        moves.truncate(MAX_LEARNED_MOVES);

        if moves.is_empty() {
            moves.push(self.fallback_tackle().await);
        }
        moves
    }

    /// The catalog's tackle, or the built-in copy when the catalog can't supply it.
    pub async fn fallback_tackle(&self) -> MoveRecord {
        match self
            .catalog
            .get_move(&CatalogKey::Name("tackle".to_string()))
            .await
        {
            Ok(record) => record,
            Err(err) => {
                warn!("Failed to fetch tackle, using built-in copy: {}", err);
                MoveRecord::basic_tackle()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::test_support::{creature_with_moves, offensive_move, status_move};
    use pretty_assertions::assert_eq;

    fn names(moves: &[MoveRecord]) -> Vec<&str> {
        moves.iter().map(|m| m.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_most_recent_offensive_moves_first() {
        let creature = creature_with_moves(
            4,
            "charmander",
            &[
                (10, "scratch", 1),
                (45, "growl", 1),
                (52, "ember", 7),
                (43, "leer", 10),
                (99, "rage", 12),
            ],
        );
        let catalog = MemoryCatalog::new()
            .with_move(offensive_move(10, "scratch", 40))
            .with_move(status_move(45, "growl"))
            .with_move(offensive_move(52, "ember", 40))
            .with_move(status_move(43, "leer"))
            .with_move(offensive_move(99, "rage", 20));
        let engine = ProgressionEngine::new(&catalog);

        let moves = engine.learned_moves(&creature, 12).await;
        assert_eq!(names(&moves), vec!["rage", "ember", "scratch"]);

        let early = engine.learned_moves(&creature, 6).await;
        assert_eq!(names(&early), vec!["scratch"]);
    }

    #[tokio::test]
    async fn test_at_most_four_from_six_candidates() {
        let creature = creature_with_moves(
            1,
            "testmon",
            &[
                (1, "a", 1),
                (2, "b", 2),
                (3, "c", 3),
                (4, "d", 4),
                (5, "e", 5),
                (6, "f", 6),
                (7, "g", 7),
            ],
        );
        let mut catalog = MemoryCatalog::new();
        for (id, name) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e"), (6, "f"), (7, "g")] {
            catalog = catalog.with_move(offensive_move(id, name, 50));
        }
        let engine = ProgressionEngine::new(&catalog);

        let moves = engine.learned_moves(&creature, 50).await;
        assert_eq!(names(&moves), vec!["g", "f", "e", "d"]);
        assert!(moves.iter().all(MoveRecord::is_offensive));
    }

    #[tokio::test]
    async fn test_only_six_candidates_are_considered() {
        // The six newest moves are all status moves, so the old tackle is never reached
        let creature = creature_with_moves(
            1,
            "testmon",
            &[
                (33, "tackle", 1),
                (2, "s2", 2),
                (3, "s3", 3),
                (4, "s4", 4),
                (5, "s5", 5),
                (6, "s6", 6),
                (7, "s7", 7),
            ],
        );
        let mut catalog = MemoryCatalog::new();
        for (id, name) in [(2, "s2"), (3, "s3"), (4, "s4"), (5, "s5"), (6, "s6"), (7, "s7")] {
            catalog = catalog.with_move(status_move(id, name));
        }
        let engine = ProgressionEngine::new(&catalog);

        // tackle is missing from the catalog too, so the built-in copy is used
        let moves = engine.learned_moves(&creature, 10).await;
        assert_eq!(moves, vec![MoveRecord::basic_tackle()]);
    }

    #[tokio::test]
    async fn test_failed_lookups_are_skipped() {
        let creature = creature_with_moves(
            7,
            "squirtle",
            &[(33, "tackle", 1), (55, "water-gun", 7)],
        );
        // water-gun is not in the catalog
        let catalog = MemoryCatalog::new().with_move(offensive_move(33, "tackle", 40));
        let engine = ProgressionEngine::new(&catalog);

        let moves = engine.learned_moves(&creature, 10).await;
        assert_eq!(names(&moves), vec!["tackle"]);
    }

    #[tokio::test]
    async fn test_catalog_tackle_preferred_for_fallback() {
        let creature = creature_with_moves(129, "magikarp", &[(150, "splash", 1)]);
        let mut catalog_tackle = offensive_move(33, "tackle", 35);
        catalog_tackle.accuracy = Some(95);
        let catalog = MemoryCatalog::new()
            .with_move(status_move(150, "splash"))
            .with_move(catalog_tackle.clone());
        let engine = ProgressionEngine::new(&catalog);

        assert_eq!(engine.learned_moves(&creature, 5).await, vec![catalog_tackle]);
    }
}
