use std::collections::HashMap;

use async_trait::async_trait;

use super::Catalog;
use crate::errors::{CatalogError, CatalogResult};
use schema::{CatalogKey, CreatureRecord, EvolutionChainRecord, MoveRecord, SpeciesRecord};

/// In-process catalog backed by fixed records. Lookups accept either the id or
/// the slug; anything not registered is `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    creatures: HashMap<u32, CreatureRecord>,
    moves: HashMap<u32, MoveRecord>,
    species: HashMap<u32, SpeciesRecord>,
    chains: HashMap<u32, EvolutionChainRecord>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_creature(mut self, record: CreatureRecord) -> Self {
        self.creatures.insert(record.id, record);
        self
    }

    pub fn with_move(mut self, record: MoveRecord) -> Self {
        self.moves.insert(record.id, record);
        self
    }

    pub fn with_species(mut self, record: SpeciesRecord) -> Self {
        self.species.insert(record.id, record);
        self
    }

    pub fn with_evolution_chain(mut self, record: EvolutionChainRecord) -> Self {
        self.chains.insert(record.id, record);
        self
    }

    fn lookup<'a, T>(
        table: &'a HashMap<u32, T>,
        key: &CatalogKey,
        name_of: impl Fn(&T) -> &str,
    ) -> Option<&'a T> {
        match key {
            CatalogKey::Id(id) => table.get(id),
            CatalogKey::Name(name) => table
                .values()
                .find(|record| name_of(record).eq_ignore_ascii_case(name)),
        }
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn get_creature(&self, key: &CatalogKey) -> CatalogResult<CreatureRecord> {
        Self::lookup(&self.creatures, key, |r| r.name.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: "pokemon",
                key: key.clone(),
            })
    }

    async fn get_move(&self, key: &CatalogKey) -> CatalogResult<MoveRecord> {
        Self::lookup(&self.moves, key, |r| r.name.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: "move",
                key: key.clone(),
            })
    }

    async fn get_species(&self, key: &CatalogKey) -> CatalogResult<SpeciesRecord> {
        Self::lookup(&self.species, key, |r| r.name.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: "pokemon-species",
                key: key.clone(),
            })
    }

    async fn get_evolution_chain(&self, id: u32) -> CatalogResult<EvolutionChainRecord> {
        self.chains
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: "evolution-chain",
                key: CatalogKey::Id(id),
            })
    }
}
