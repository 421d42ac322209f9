use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::Catalog;
use crate::errors::{CatalogError, CatalogResult};
use schema::{
    id_from_url, BaseStats, CatalogKey, ChainLink, CreatureRecord, DamageClass, ElementType,
    EvolutionChainRecord, LearnDetail, MoveLearnEntry, MoveRecord, NamedResource, SpeciesRecord,
    SpriteRefs,
};

pub const DEFAULT_CATALOG_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    #[serde(default)]
    stats: Vec<PokemonStatSlot>,
    #[serde(default)]
    types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    sprites: Option<SpritesResponse>,
    #[serde(default)]
    moves: Vec<PokemonMoveSlot>,
    #[serde(default)]
    species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct SpritesResponse {
    front_default: Option<String>,
    back_default: Option<String>,
    other: Option<OtherSprites>,
}

#[derive(Clone, Debug, Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<ArtworkSprite>,
}

#[derive(Clone, Debug, Deserialize)]
struct ArtworkSprite {
    front_default: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    move_info: NamedResource,
    #[serde(default)]
    version_group_details: Vec<VersionGroupDetail>,
}

#[derive(Clone, Debug, Deserialize)]
struct VersionGroupDetail {
    level_learned_at: u8,
    move_learn_method: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct MoveResponse {
    id: u32,
    name: String,
    power: Option<u16>,
    accuracy: Option<u16>,
    pp: Option<u16>,
    #[serde(rename = "type")]
    type_info: Option<NamedResource>,
    damage_class: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesResponse {
    id: u32,
    name: String,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    id: u32,
    chain: ChainLinkResponse,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLinkResponse {
    species: NamedResource,
    #[serde(default)]
    evolution_details: Vec<EvolutionDetailResponse>,
    #[serde(default)]
    evolves_to: Vec<ChainLinkResponse>,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionDetailResponse {
    min_level: Option<u8>,
}

impl From<PokemonResponse> for CreatureRecord {
    fn from(response: PokemonResponse) -> Self {
        let stat = |name: &str| {
            response
                .stats
                .iter()
                .find(|slot| slot.stat.name == name)
                .map(|slot| slot.base_stat)
        };
        let base_stats = BaseStats {
            hp: stat("hp"),
            attack: stat("attack"),
            defense: stat("defense"),
            speed: stat("speed"),
        };

        let sprites = response
            .sprites
            .as_ref()
            .map(|sprites| SpriteRefs {
                front: sprites.front_default.clone(),
                back: sprites.back_default.clone(),
                artwork: sprites
                    .other
                    .as_ref()
                    .and_then(|other| other.official_artwork.as_ref())
                    .and_then(|artwork| artwork.front_default.clone()),
            })
            .unwrap_or_default();

        let types = response
            .types
            .iter()
            .map(|slot| ElementType::from_name(&slot.type_info.name))
            .collect();

        let moves = response
            .moves
            .into_iter()
            .map(|slot| MoveLearnEntry {
                move_ref: slot.move_info,
                details: slot
                    .version_group_details
                    .into_iter()
                    .map(|detail| LearnDetail {
                        level_learned_at: detail.level_learned_at,
                        learn_method: detail.move_learn_method.name,
                    })
                    .collect(),
            })
            .collect();

        CreatureRecord {
            id: response.id,
            name: response.name,
            base_stats,
            types,
            sprites,
            moves,
            species: response.species.unwrap_or_default(),
        }
    }
}

impl From<MoveResponse> for MoveRecord {
    fn from(response: MoveResponse) -> Self {
        MoveRecord {
            id: response.id,
            name: response.name,
            power: response.power,
            accuracy: response.accuracy,
            pp: response.pp,
            element: response
                .type_info
                .map(|t| ElementType::from_name(&t.name))
                .unwrap_or(ElementType::Unknown),
            damage_class: response
                .damage_class
                .map(|c| DamageClass::from_name(&c.name))
                .unwrap_or(DamageClass::Status),
        }
    }
}

impl From<SpeciesResponse> for SpeciesRecord {
    fn from(response: SpeciesResponse) -> Self {
        SpeciesRecord {
            id: response.id,
            name: response.name,
            evolution_chain_id: response
                .evolution_chain
                .and_then(|chain| id_from_url(&chain.url)),
        }
    }
}

impl From<ChainLinkResponse> for ChainLink {
    fn from(response: ChainLinkResponse) -> Self {
        ChainLink {
            species: response.species,
            min_level: response
                .evolution_details
                .first()
                .and_then(|detail| detail.min_level),
            evolves_to: response.evolves_to.into_iter().map(ChainLink::from).collect(),
        }
    }
}

impl From<EvolutionChainResponse> for EvolutionChainRecord {
    fn from(response: EvolutionChainResponse) -> Self {
        EvolutionChainRecord {
            id: response.id,
            chain: response.chain.into(),
        }
    }
}

#[derive(Default)]
struct RecordCache {
    creatures: HashMap<CatalogKey, CreatureRecord>,
    moves: HashMap<CatalogKey, MoveRecord>,
    species: HashMap<CatalogKey, SpeciesRecord>,
    chains: HashMap<u32, EvolutionChainRecord>,
}

/// Catalog client for the public REST service. Records are immutable, so every
/// successful lookup is cached for the lifetime of the client.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    cache: Mutex<RecordCache>,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CatalogError::Http {
                resource: "client",
                key: CatalogKey::Name("builder".to_string()),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Mutex::new(RecordCache::default()),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        key: &CatalogKey,
    ) -> CatalogResult<T> {
        let segment = key.normalized().to_string();
        let url = format!("{}/{}/{}", self.base_url, resource, segment);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| CatalogError::Http {
                resource,
                key: key.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                resource,
                key: key.clone(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                resource,
                key: key.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| CatalogError::Malformed {
                resource,
                key: key.clone(),
                details: err.to_string(),
            })
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn get_creature(&self, key: &CatalogKey) -> CatalogResult<CreatureRecord> {
        let key = &key.normalized();
        if let Some(record) = self.cache.lock().await.creatures.get(key) {
            return Ok(record.clone());
        }
        let record: CreatureRecord = self.fetch::<PokemonResponse>("pokemon", key).await?.into();
        let mut cache = self.cache.lock().await;
        cache
            .creatures
            .insert(CatalogKey::Id(record.id), record.clone());
        cache
            .creatures
            .insert(CatalogKey::Name(record.name.to_lowercase()), record.clone());
        Ok(record)
    }

    async fn get_move(&self, key: &CatalogKey) -> CatalogResult<MoveRecord> {
        let key = &key.normalized();
        if let Some(record) = self.cache.lock().await.moves.get(key) {
            return Ok(record.clone());
        }
        let record: MoveRecord = self.fetch::<MoveResponse>("move", key).await?.into();
        let mut cache = self.cache.lock().await;
        cache.moves.insert(CatalogKey::Id(record.id), record.clone());
        cache
            .moves
            .insert(CatalogKey::Name(record.name.to_lowercase()), record.clone());
        Ok(record)
    }

    async fn get_species(&self, key: &CatalogKey) -> CatalogResult<SpeciesRecord> {
        let key = &key.normalized();
        if let Some(record) = self.cache.lock().await.species.get(key) {
            return Ok(record.clone());
        }
        let record: SpeciesRecord = self
            .fetch::<SpeciesResponse>("pokemon-species", key)
            .await?
            .into();
        let mut cache = self.cache.lock().await;
        cache
            .species
            .insert(CatalogKey::Id(record.id), record.clone());
        cache
            .species
            .insert(CatalogKey::Name(record.name.to_lowercase()), record.clone());
        Ok(record)
    }

    async fn get_evolution_chain(&self, id: u32) -> CatalogResult<EvolutionChainRecord> {
        if let Some(record) = self.cache.lock().await.chains.get(&id) {
            return Ok(record.clone());
        }
        let record: EvolutionChainRecord = self
            .fetch::<EvolutionChainResponse>("evolution-chain", &CatalogKey::Id(id))
            .await?
            .into();
        self.cache.lock().await.chains.insert(id, record.clone());
        Ok(record)
    }
}
