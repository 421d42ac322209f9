use crate::{DamageClass, ElementType};
use serde::{Deserialize, Serialize};

/// Power assumed for a move whose catalog power is missing.
pub const DEFAULT_MOVE_POWER: u16 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub power: Option<u16>,
    #[serde(default)]
    pub accuracy: Option<u16>,
    #[serde(default)]
    pub pp: Option<u16>,
    #[serde(default)]
    pub element: ElementType,
    #[serde(default)]
    pub damage_class: DamageClass,
}

impl MoveRecord {
    /// Offensive moves have a power above zero; everything else is filtered out of move pools.
    pub fn is_offensive(&self) -> bool {
        self.power.unwrap_or(0) > 0
    }

    /// Power used in damage resolution.
    pub fn effective_power(&self) -> u16 {
        self.power.unwrap_or(DEFAULT_MOVE_POWER)
    }

    /// The fixed tackle used whenever no real move can be resolved.
    pub fn basic_tackle() -> Self {
        Self::basic(33, "tackle")
    }

    /// Tackle, scratch and pound: the interchangeable starter moves.
    pub fn basic_set() -> Vec<Self> {
        vec![
            Self::basic(33, "tackle"),
            Self::basic(10, "scratch"),
            Self::basic(1, "pound"),
        ]
    }

    fn basic(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            power: Some(DEFAULT_MOVE_POWER),
            accuracy: Some(100),
            pp: Some(35),
            element: ElementType::Normal,
            damage_class: DamageClass::Physical,
        }
    }
}
