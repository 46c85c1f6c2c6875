//! Local catalog entity store.
//!
//! Holds the persisted side of the catalog: one [`MangaEntity`] per remote
//! manga id and one [`TaxonomyEntry`] per `(kind, id)` pair. Relationships
//! are many-to-many and kept on both sides: a manga lists the
//! [`TaxonomyKey`]s it references, an entry lists the manga ids that
//! reference it.
//!
//! Store operations are synchronous. Writes go through
//! [`CatalogStore::commit`], which applies a whole [`Changeset`] or nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

use crate::error::Result;
use crate::types::TaxonomyKind;

pub mod memory;

pub use memory::MemoryCatalogStore;

/// Identity of a taxonomy entry: ids are only unique within a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxonomyKey {
    pub kind: TaxonomyKind,
    pub id: String,
}

impl TaxonomyKey {
    pub fn new(kind: TaxonomyKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// A persisted genre, theme, demographic or author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub key: TaxonomyKey,
    pub name: String,
    /// Ids of the manga that reference this entry
    pub manga: BTreeSet<i64>,
}

impl TaxonomyEntry {
    pub fn new(key: TaxonomyKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            manga: BTreeSet::new(),
        }
    }
}

/// A persisted manga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaEntity {
    pub id: i64,
    pub title: String,
    pub cover_url: Option<Url>,
    pub score: Option<f64>,
    pub synopsis: Option<String>,
    /// Every taxonomy entry this manga references, across all kinds
    pub taxonomies: BTreeSet<TaxonomyKey>,
}

impl MangaEntity {
    /// Ids of the referenced entries of one kind, in id order.
    pub fn ids_of(&self, kind: TaxonomyKind) -> Vec<&str> {
        self.taxonomies
            .iter()
            .filter(|key| key.kind == kind)
            .map(|key| key.id.as_str())
            .collect()
    }

    pub fn references(&self, key: &TaxonomyKey) -> bool {
        self.taxonomies.contains(key)
    }
}

/// Everything one reconciliation writes.
///
/// `created` holds taxonomy entries that did not exist when the changeset
/// was planned. Back-references (`TaxonomyEntry::manga`) are derived by the
/// store from the old and new `manga.taxonomies`, not supplied here.
#[derive(Debug, Clone, PartialEq)]
pub struct Changeset {
    pub created: Vec<TaxonomyEntry>,
    pub manga: MangaEntity,
}

/// Storage backend for catalog entities.
pub trait CatalogStore: Send + Sync {
    fn manga(&self, id: i64) -> Result<Option<MangaEntity>>;

    fn taxonomy(&self, key: &TaxonomyKey) -> Result<Option<TaxonomyEntry>>;

    /// Applies a changeset atomically.
    ///
    /// Must either apply every change or none. Relationships dropped from the
    /// manga are removed from the affected entries' back-references; the
    /// entries themselves are kept.
    ///
    /// # Errors
    ///
    /// * [`Error::Persistence`](crate::Error::Persistence) - If the write
    ///   fails or the manga references an entry that neither exists nor is
    ///   being created
    fn commit(&self, changes: Changeset) -> Result<()>;

    /// All entries of one kind, sorted by name.
    fn taxonomies(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>>;

    /// Manga referencing the given entry, sorted by title.
    fn manga_for(&self, key: &TaxonomyKey) -> Result<Vec<MangaEntity>>;

    fn manga_count(&self) -> Result<usize>;
}
