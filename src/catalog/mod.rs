//! Read-only access to the public creature catalog.
//!
//! The engine only ever talks to the [`Catalog`] trait. [`HttpCatalog`] is the
//! live client; [`MemoryCatalog`] serves fixed records for tests and offline runs.

pub mod http;
pub mod memory;

use crate::errors::CatalogResult;
use async_trait::async_trait;
use schema::{CatalogKey, CreatureRecord, EvolutionChainRecord, MoveRecord, SpeciesRecord};

pub use http::HttpCatalog;
pub use memory::MemoryCatalog;

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Gets a creature by id or slug.
    async fn get_creature(&self, key: &CatalogKey) -> CatalogResult<CreatureRecord>;
    /// Gets a move by id or slug.
    async fn get_move(&self, key: &CatalogKey) -> CatalogResult<MoveRecord>;
    /// Gets a species by id or slug.
    async fn get_species(&self, key: &CatalogKey) -> CatalogResult<SpeciesRecord>;
    /// Gets an evolution chain by id.
    async fn get_evolution_chain(&self, id: u32) -> CatalogResult<EvolutionChainRecord>;
}
