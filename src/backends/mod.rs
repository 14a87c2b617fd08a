//! Catalog backend abstractions and concrete implementations.

pub mod pokeapi;

/// Creature record returned by catalog adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Catalog identifier in `[1, catalog_size]`.
    pub id: u32,
    pub name: String,
    /// Category tags in payload order (e.g. `electric`, `flying`).
    pub category_tags: Vec<String>,
    /// Primary image reference. The catalog sends `null` for some entries.
    pub image_url: Option<String>,
    /// Height in decimetres.
    pub height: u32,
    /// Weight in hectograms.
    pub weight: u32,
}

/// Failure raised while fetching one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request for id {id} failed: {reason}")]
    Transport { id: u32, reason: String },
    #[error("catalog returned HTTP {status} for id {id}")]
    Status { id: u32, status: u16 },
    #[error("catalog payload for id {id} is malformed: {reason}")]
    Malformed { id: u32, reason: String },
}

/// Interface implemented by concrete catalog adapters.
pub trait CatalogBackendAdapter: Send + Sync {
    fn fetch_record(&self, id: u32) -> Result<CatalogRecord, CatalogError>;
}
