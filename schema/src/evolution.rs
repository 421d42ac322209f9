use crate::NamedResource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub id: u32,
    pub name: String,
    /// Id of the evolution chain; some species (event-only forms) have none.
    #[serde(default)]
    pub evolution_chain_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    /// Minimum level from the first evolution detail leading into this stage.
    #[serde(default)]
    pub min_level: Option<u8>,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

impl ChainLink {
    /// Depth-first search for the stage whose species name matches.
    pub fn find(&self, species_name: &str) -> Option<&ChainLink> {
        if self.species.name == species_name {
            return Some(self);
        }
        self.evolves_to
            .iter()
            .find_map(|next| next.find(species_name))
    }

    /// Branching chains always take the first successor.
    pub fn next_stage(&self) -> Option<&ChainLink> {
        self.evolves_to.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChainRecord {
    pub id: u32,
    pub chain: ChainLink,
}
