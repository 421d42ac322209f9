use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup key for the catalog: either the numeric id or the slug name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogKey {
    Id(u32),
    Name(String),
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKey::Id(id) => write!(f, "{}", id),
            CatalogKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl CatalogKey {
    /// Slugs are case-insensitive; names are lowercased so equal keys hash alike.
    pub fn normalized(&self) -> CatalogKey {
        match self {
            CatalogKey::Id(id) => CatalogKey::Id(*id),
            CatalogKey::Name(name) => CatalogKey::Name(name.to_lowercase()),
        }
    }
}

impl From<u32> for CatalogKey {
    fn from(id: u32) -> Self {
        CatalogKey::Id(id)
    }
}

impl From<&str> for CatalogKey {
    fn from(name: &str) -> Self {
        CatalogKey::Name(name.to_string())
    }
}

/// A `{ name, url }` reference as the catalog embeds them in every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl NamedResource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Trailing numeric id of the resource url, e.g. `.../move/33/` -> 33.
    pub fn id(&self) -> Option<u32> {
        id_from_url(&self.url)
    }

    /// Prefer the numeric id, fall back to the slug.
    pub fn key(&self) -> CatalogKey {
        match self.id() {
            Some(id) => CatalogKey::Id(id),
            None => CatalogKey::Name(self.name.clone()),
        }
    }
}

/// Extract the last path segment of a resource url as an id.
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_key_lowercases_names() {
        assert_eq!(
            CatalogKey::from("Pikachu").normalized(),
            CatalogKey::Name("pikachu".to_string())
        );
        assert_eq!(CatalogKey::Id(25).normalized(), CatalogKey::Id(25));
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/move/33/"), Some(33));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/evolution-chain/1"), Some(1));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/move/tackle/"), None);
        assert_eq!(id_from_url(""), None);
    }

    #[test]
    fn test_key_falls_back_to_name() {
        let with_id = NamedResource::new("tackle", "https://pokeapi.co/api/v2/move/33/");
        assert_eq!(with_id.key(), CatalogKey::Id(33));

        let without_id = NamedResource::new("tackle", "");
        assert_eq!(without_id.key(), CatalogKey::Name("tackle".to_string()));
    }
}
