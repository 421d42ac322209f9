use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementType {
    #[default]
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
    #[serde(other)]
    Unknown,
}

impl ElementType {
    /// Parse a catalog type name; names this build does not know map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(ElementType::Unknown)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DamageClass {
    #[default]
    Physical,
    Special,
    #[serde(other)]
    Status,
}

impl DamageClass {
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(DamageClass::Status)
    }
}
