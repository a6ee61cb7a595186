//! Data models for the cover importer.
//!
//! `CatalogItem` mirrors the JSON the catalog service returns from `GET /item`.
//! Only the fields the importer reasons about are typed; everything else is
//! carried through untouched so the item can be written back in full.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The type of a work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemKind {
    Unknown,
    Manga,
    TV,
    Film,
    Novel,
    /// Original Video Animation
    OVA,
    /// Original Net Animation
    ONA,
    /// Music Video
    Music,
    /// Stage Play
    Play,
    Collection,
    ShortStory,
    Musical,
    VisualNovel,
    NonFiction,
}

/// The read/watch status of an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemStatus {
    Completed,
    InProgress,
    Planned,
    OnHold,
    Dropped,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Completed => write!(f, "Completed"),
            ItemStatus::InProgress => write!(f, "InProgress"),
            ItemStatus::Planned => write!(f, "Planned"),
            ItemStatus::OnHold => write!(f, "OnHold"),
            ItemStatus::Dropped => write!(f, "Dropped"),
        }
    }
}

/// A stored cover: blob name plus human-readable description.
///
/// Serialized as a two-element JSON array `[blob_name, description]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlobReference(pub String, pub String);

impl BlobReference {
    pub fn new(blob_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self(blob_name.into(), description.into())
    }

    pub fn blob_name(&self) -> &str {
        &self.0
    }

    pub fn description(&self) -> &str {
        &self.1
    }
}

/// Catalog item as served by the catalog service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub key: String,
    pub kind: ItemKind,
    pub status: ItemStatus,

    /// Free-form metadata (source identifiers etc.); `null` when absent
    #[serde(default)]
    pub extra: Value,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub covers: Vec<BlobReference>,

    /// Fields the importer does not interpret, preserved for write-back
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl CatalogItem {
    /// Create a bare item, mostly useful for tests
    pub fn new(key: impl Into<String>, kind: ItemKind, status: ItemStatus) -> Self {
        Self {
            key: key.into(),
            kind,
            status,
            extra: Value::Null,
            covers: Vec::new(),
            rest: Map::new(),
        }
    }

    /// The `extra` mapping, if it is a non-empty object
    pub fn extra_map(&self) -> Option<&Map<String, Value>> {
        self.extra.as_object().filter(|map| !map.is_empty())
    }

    pub fn has_extra(&self, field: &str) -> bool {
        self.extra_map().is_some_and(|map| map.contains_key(field))
    }

    /// String form of an `extra` value; numbers are rendered without quotes
    pub fn extra_str(&self, field: &str) -> Option<String> {
        match self.extra_map()?.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<BlobReference>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<BlobReference>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A cover image downloaded from a source site, waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverCandidate {
    pub description: String,
    pub image: Vec<u8>,
    pub media_type: String,
}

/// Name of the blob holding the `index`-th cover of item `key`
pub fn blob_name(key: &str, index: usize) -> String {
    format!("blob-{}-{:03}", key, index)
}
