//! Starter lineages, catalog regions, and what the trainer has discovered.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Level every newly chosen creature starts at.
pub const STARTING_LEVEL: u8 = 5;

/// Themed starter groupings offered when beginning a fresh run.
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
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lineage {
    #[default]
    Kanto,
    Johto,
    Hoenn,
}

impl Lineage {
    pub fn all() -> Vec<Lineage> {
        Lineage::iter().collect()
    }

    pub fn from_index(index: usize) -> Option<Lineage> {
        Lineage::iter().nth(index)
    }

    /// Grass, fire and water starter ids.
    pub fn starters(self) -> [u32; 3] {
        match self {
            Lineage::Kanto => [1, 4, 7],
            Lineage::Johto => [152, 155, 158],
            Lineage::Hoenn => [252, 255, 258],
        }
    }
}

/// Every starter from every lineage, in lineage order.
pub fn all_starter_ids() -> Vec<u32> {
    Lineage::iter().flat_map(Lineage::starters).collect()
}

pub fn is_starter(id: u32) -> bool {
    Lineage::iter().any(|lineage| lineage.starters().contains(&id))
}

/// National catalog regions covered by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
}

impl Region {
    pub fn id_range(self) -> RangeInclusive<u32> {
        match self {
            Region::Kanto => 1..=151,
            Region::Johto => 152..=251,
            Region::Hoenn => 252..=386,
            Region::Sinnoh => 387..=493,
        }
    }

    pub fn of(id: u32) -> Option<Region> {
        Region::iter().find(|region| region.id_range().contains(&id))
    }

    /// Position in browse order; ids outside every region sort last.
    fn order_of(id: u32) -> usize {
        Region::iter()
            .position(|region| region.id_range().contains(&id))
            .unwrap_or(usize::MAX)
    }
}

/// Highest id the catalog browser lists.
pub fn catalog_size() -> u32 {
    Region::iter().map(|r| *r.id_range().end()).max().unwrap_or(0)
}

/// Creatures offered when choosing an active creature: every starter plus
/// everything captured. Starters come first, then region order, then id.
pub fn available_creatures(captured: &BTreeSet<u32>) -> Vec<u32> {
    let mut available = all_starter_ids();
    available.extend(captured.iter().copied().filter(|id| !is_starter(*id)));
    available.sort_by_key(|id| (!is_starter(*id), Region::order_of(*id), *id));
    available
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFilter {
    All,
    Discovered,
    Undiscovered,
    Region(Region),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: u32,
    pub region: Region,
    pub is_starter: bool,
    pub is_captured: bool,
    pub is_chosen: bool,
}

impl CatalogEntry {
    pub fn is_discovered(&self) -> bool {
        self.is_starter || self.is_captured || self.is_chosen
    }
}

/// The browsable catalog, ordered by region then id.
pub fn catalog_entries(
    captured: &BTreeSet<u32>,
    chosen_starter: Option<u32>,
    filter: CatalogFilter,
) -> Vec<CatalogEntry> {
    Region::iter()
        .flat_map(|region| region.id_range().map(move |id| (region, id)))
        .map(|(region, id)| CatalogEntry {
            id,
            region,
            is_starter: is_starter(id),
            is_captured: captured.contains(&id),
            is_chosen: chosen_starter == Some(id),
        })
        .filter(|entry| match filter {
            CatalogFilter::All => true,
            CatalogFilter::Discovered => entry.is_discovered(),
            CatalogFilter::Undiscovered => !entry.is_discovered(),
            CatalogFilter::Region(region) => entry.region == region,
        })
        .collect()
}

/// Starters, captures and the chosen creature, each counted once.
pub fn discovered_count(captured: &BTreeSet<u32>, chosen_starter: Option<u32>) -> usize {
    let mut discovered: BTreeSet<u32> = all_starter_ids().into_iter().collect();
    discovered.extend(captured.iter().copied());
    discovered.extend(chosen_starter);
    discovered.len()
}
