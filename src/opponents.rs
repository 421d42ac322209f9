//! Picks the creature the player faces each wave.
//!
//! Opponents are drawn from hand-picked basic forms so early waves never
//! throw a fully evolved creature at a starter. Generation cannot fail:
//! after the configured number of attempts it walks a short fallback list,
//! and past that uses a built-in record.

use crate::battle::state::TurnRng;
use crate::catalog::Catalog;
use crate::combatant::{ActiveCombatant, MAX_LEARNED_MOVES};
use log::{debug, warn};
use schema::{
    BaseStats, CatalogKey, CreatureRecord, ElementType, MoveLearnEntry, MoveRecord,
    NamedResource, SpriteRefs,
};

/// Attempts at drawing from the eligibility pool before falling back.
pub const DEFAULT_OPPONENT_ATTEMPTS: u32 = 10;

/// Tried in rotation, from a random starting point, once the pool draws fail.
pub const FALLBACK_OPPONENT_IDS: [u32; 4] = [25, 1, 4, 7];

const TIER_TWO_MIN_LEVEL: u8 = 11;
const TIER_THREE_MIN_LEVEL: u8 = 21;

const MOVE_URL_BASE: &str = "https://pokeapi.co/api/v2/move";

#[rustfmt::skip]
const TIER_ONE: &[u32] = &[
    1, 4, 7, 10, 13, 16, 19, 21, 23, 25, 27, 29, 32, 35, 37, 39, 41, 43, 46, 48,
    50, 52, 54, 56, 58, 60, 63, 66, 69, 72, 74, 77, 79, 81, 83, 84, 86, 88, 90, 92,
    95, 96, 98, 100, 102, 104, 108, 109, 111, 113, 114, 115, 116, 118, 120, 122, 123, 124, 125, 126,
    127, 128, 129, 131, 132, 133, 137, 138, 140, 142, 143, 144, 145, 146, 147, 150, 151,
];

#[rustfmt::skip]
const TIER_TWO: &[u32] = &[
    152, 155, 158, 161, 163, 165, 167, 170, 172, 173, 174, 175, 177, 179, 183, 185, 187, 190, 191, 193,
    194, 198, 200, 201, 202, 203, 204, 206, 207, 209, 211, 213, 214, 215, 216, 218, 220, 222, 223, 225,
    226, 227, 228, 231, 234, 235, 236, 238, 239, 240, 241, 243, 244, 245, 246,
];

#[rustfmt::skip]
const TIER_THREE: &[u32] = &[
    252, 255, 258, 261, 263, 265, 270, 273, 276, 278, 280, 283, 285, 287, 290, 293, 296, 298, 299, 300,
    301, 302, 303, 304, 307, 309, 311, 312, 313, 314, 315, 316, 318, 320, 322, 324, 325, 327, 328, 331,
    333, 335, 336, 337, 338, 339, 341, 343, 345, 347, 349, 351, 352, 353, 355, 357, 358, 359, 360, 361,
    363, 366, 369, 370, 371, 374, 377, 378, 379, 380, 381, 382, 383, 384, 385, 386,
];

/// Creature ids an opponent may be drawn from at `player_level`.
pub fn eligible_pool(player_level: u8) -> Vec<u32> {
    let mut pool = TIER_ONE.to_vec();
    if player_level >= TIER_TWO_MIN_LEVEL {
        pool.extend_from_slice(TIER_TWO);
    }
    if player_level >= TIER_THREE_MIN_LEVEL {
        pool.extend_from_slice(TIER_THREE);
    }
    pool
}

fn move_entry(id: u32, name: &str) -> MoveLearnEntry {
    MoveLearnEntry::level_up(
        NamedResource::new(name, format!("{}/{}/", MOVE_URL_BASE, id)),
        1,
    )
}

/// Level-one entries for the interchangeable basic moves.
fn basic_move_entries() -> Vec<MoveLearnEntry> {
    MoveRecord::basic_set()
        .iter()
        .map(|record| move_entry(record.id, &record.name))
        .collect()
}

/// Used only when the catalog cannot produce any fallback creature either.
pub fn built_in_opponent() -> CreatureRecord {
    CreatureRecord {
        id: 25,
        name: "pikachu".to_string(),
        base_stats: BaseStats::new(35, 55, 40, 90),
        types: vec![ElementType::Electric],
        sprites: SpriteRefs::default(),
        moves: vec![],
        species: NamedResource::new("pikachu", "https://pokeapi.co/api/v2/pokemon-species/25/"),
    }
}

pub struct OpponentGenerator<'a> {
    catalog: &'a dyn Catalog,
    max_attempts: u32,
}

impl<'a> OpponentGenerator<'a> {
    pub fn new(catalog: &'a dyn Catalog, max_attempts: u32) -> Self {
        Self {
            catalog,
            max_attempts,
        }
    }

    /// An opponent at exactly the player's level.
    pub async fn generate(&self, player_level: u8, rng: &mut TurnRng) -> ActiveCombatant {
        let pool = eligible_pool(player_level);

        for attempt in 1..=self.max_attempts {
            let id = pool[rng.next_index(pool.len(), "opponent pick")];
            match self.catalog.get_creature(&CatalogKey::Id(id)).await {
                Ok(record) => {
                    debug!("Drew {} (#{}) on attempt {}", record.name, record.id, attempt);
                    return Self::with_level_moves(record, player_level);
                }
                Err(err) => warn!("Opponent attempt {} failed: {}", attempt, err),
            }
        }

        let record = self.fallback_record(rng).await;
        Self::with_tackle_only(record, player_level)
    }

    async fn fallback_record(&self, rng: &mut TurnRng) -> CreatureRecord {
        let start = rng.next_index(FALLBACK_OPPONENT_IDS.len(), "fallback opponent");
        for offset in 0..FALLBACK_OPPONENT_IDS.len() {
            let id = FALLBACK_OPPONENT_IDS[(start + offset) % FALLBACK_OPPONENT_IDS.len()];
            match self.catalog.get_creature(&CatalogKey::Id(id)).await {
                Ok(record) => return record,
                Err(err) => warn!("Fallback opponent #{} unavailable: {}", id, err),
            }
        }
        warn!("No fallback opponent could be fetched, using the built-in record");
        built_in_opponent()
    }

    /// Keep the four most recently learnable moves, or the basic set when none are.
    fn with_level_moves(mut record: CreatureRecord, level: u8) -> ActiveCombatant {
        let learnable: Vec<MoveLearnEntry> = record
            .level_up_moves(level)
            .into_iter()
            .take(MAX_LEARNED_MOVES)
            .cloned()
            .collect();
        record.moves = if learnable.is_empty() {
            basic_move_entries()
        } else {
            learnable
        };
        ActiveCombatant::new(record, level, Vec::new())
    }

    fn with_tackle_only(mut record: CreatureRecord, level: u8) -> ActiveCombatant {
        let tackle = MoveRecord::basic_tackle();
        record.moves = vec![move_entry(tackle.id, &tackle.name)];
        ActiveCombatant::new(record, level, Vec::new())
    }
}
