use crate::{CatalogKey, ElementType, NamedResource};
use serde::{Deserialize, Serialize};

/// Base stat used when the catalog record omits one.
pub const DEFAULT_BASE_STAT: u16 = 50;

/// Learn method name for moves acquired by leveling.
pub const LEVEL_UP_METHOD: &str = "level-up";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default)]
    pub hp: Option<u16>,
    #[serde(default)]
    pub attack: Option<u16>,
    #[serde(default)]
    pub defense: Option<u16>,
    #[serde(default)]
    pub speed: Option<u16>,
}

impl BaseStats {
    pub fn new(hp: u16, attack: u16, defense: u16, speed: u16) -> Self {
        Self {
            hp: Some(hp),
            attack: Some(attack),
            defense: Some(defense),
            speed: Some(speed),
        }
    }

    pub fn hp(&self) -> u16 {
        self.hp.unwrap_or(DEFAULT_BASE_STAT)
    }

    pub fn attack(&self) -> u16 {
        self.attack.unwrap_or(DEFAULT_BASE_STAT)
    }

    pub fn defense(&self) -> u16 {
        self.defense.unwrap_or(DEFAULT_BASE_STAT)
    }

    pub fn speed(&self) -> u16 {
        self.speed.unwrap_or(DEFAULT_BASE_STAT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRefs {
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub artwork: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnDetail {
    pub level_learned_at: u8,
    pub learn_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLearnEntry {
    pub move_ref: NamedResource,
    #[serde(default)]
    pub details: Vec<LearnDetail>,
}

impl MoveLearnEntry {
    /// Convenience constructor for an entry learned by leveling.
    pub fn level_up(move_ref: NamedResource, level: u8) -> Self {
        Self {
            move_ref,
            details: vec![LearnDetail {
                level_learned_at: level,
                learn_method: LEVEL_UP_METHOD.to_string(),
            }],
        }
    }

    /// Level of the first level-up detail; 0 when the move is never learned by leveling.
    pub fn level_up_level(&self) -> u8 {
        self.details
            .iter()
            .find(|detail| detail.learn_method == LEVEL_UP_METHOD)
            .map(|detail| detail.level_learned_at)
            .unwrap_or(0)
    }

    /// Learnable by leveling at or below `level`.
    pub fn learnable_at(&self, level: u8) -> bool {
        let learned_at = self.level_up_level();
        learned_at > 0 && learned_at <= level
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub base_stats: BaseStats,
    #[serde(default)]
    pub types: Vec<ElementType>,
    #[serde(default)]
    pub sprites: SpriteRefs,
    #[serde(default)]
    pub moves: Vec<MoveLearnEntry>,
    #[serde(default)]
    pub species: NamedResource,
}

impl CreatureRecord {
    /// Entries learnable by leveling up to `level`, most recently learned first.
    pub fn level_up_moves(&self, level: u8) -> Vec<&MoveLearnEntry> {
        let mut learnable: Vec<&MoveLearnEntry> = self
            .moves
            .iter()
            .filter(|entry| entry.learnable_at(level))
            .collect();
        // Stable sort keeps catalog order among moves learned at the same level
        learnable.sort_by(|a, b| b.level_up_level().cmp(&a.level_up_level()));
        learnable
    }

    /// Species lookup key, falling back to the creature's own id.
    pub fn species_key(&self) -> CatalogKey {
        if self.species.url.is_empty() && self.species.name.is_empty() {
            CatalogKey::Id(self.id)
        } else {
            self.species.key()
        }
    }
}
