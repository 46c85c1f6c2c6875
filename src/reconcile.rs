//! DTO-to-entity reconciliation.
//!
//! [`Reconciler::reconcile`] resolves one decoded [`Manga`] into a persisted
//! [`MangaEntity`]. Embedded genres, themes, demographics and authors are
//! looked up by `(kind, id)` first and only created when missing, so two
//! manga sharing a genre end up pointing at the same stored entry.
//!
//! Reconciliation is idempotent: reconciling identical data twice creates
//! nothing the second time and leaves the relationships unchanged.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hondana::reconcile::Reconciler;
//! use hondana::store::{CatalogStore, MemoryCatalogStore};
//! use hondana::types::{Genre, Manga};
//!
//! let store = Arc::new(MemoryCatalogStore::new());
//! let reconciler = Reconciler::new(store.clone());
//!
//! let mut manga = Manga::new(1, "Vagabond");
//! manga.main_picture = Some("\"https://cdn.example.com/vagabond.jpg\"".to_string());
//! manga.genres.push(Genre { id: "g-action".into(), genre: "Action".into() });
//!
//! let entity = reconciler.reconcile(&manga).unwrap();
//! assert_eq!(entity.id, 1);
//! assert_eq!(entity.cover_url.unwrap().as_str(), "https://cdn.example.com/vagabond.jpg");
//! assert_eq!(store.manga_count().unwrap(), 1);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::store::{CatalogStore, Changeset, MangaEntity, TaxonomyEntry, TaxonomyKey};
use crate::types::{Manga, TaxonomyRecord};

/// Parses a raw cover string from the backend.
///
/// Literal `"` characters are stripped before parsing. Empty or unparsable
/// input yields `None`; a bad cover never fails the surrounding operation.
///
/// ```rust
/// use hondana::reconcile::sanitize_cover_url;
///
/// let url = sanitize_cover_url(Some("\"https://x/y.jpg\"")).unwrap();
/// assert_eq!(url.as_str(), "https://x/y.jpg");
///
/// assert!(sanitize_cover_url(Some("")).is_none());
/// assert!(sanitize_cover_url(Some("not a url")).is_none());
/// assert!(sanitize_cover_url(None).is_none());
/// ```
pub fn sanitize_cover_url(raw: Option<&str>) -> Option<Url> {
    let cleaned: String = raw?.chars().filter(|&c| c != '"').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    match Url::parse(cleaned) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!(cover = cleaned, error = %e, "dropping unparsable cover URL");
            None
        }
    }
}

/// Resolves catalog DTOs into store entities.
pub struct Reconciler<S: CatalogStore + ?Sized> {
    store: Arc<S>,
}

impl<S: CatalogStore + ?Sized> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Creates or updates the entity for `manga`.
    ///
    /// Taxonomy lookups happen first; the entity and any newly created
    /// entries are then written in one [`CatalogStore::commit`]. When an
    /// entity already exists its scalar fields are overwritten and its
    /// relationships replaced by the freshly resolved set.
    ///
    /// # Errors
    ///
    /// * [`Error::Persistence`](crate::Error::Persistence) - If a store read
    ///   or the commit fails. Nothing from this call is stored in that case.
    pub fn reconcile(&self, manga: &Manga) -> Result<MangaEntity> {
        let mut created = Vec::new();
        let mut keys = BTreeSet::new();

        self.resolve(&manga.genres, &mut created, &mut keys)?;
        self.resolve(&manga.themes, &mut created, &mut keys)?;
        self.resolve(&manga.demographics, &mut created, &mut keys)?;
        self.resolve(&manga.authors, &mut created, &mut keys)?;

        let entity = MangaEntity {
            id: manga.id,
            title: manga.title.clone(),
            cover_url: sanitize_cover_url(manga.main_picture.as_deref()),
            score: manga.score,
            synopsis: manga.synopsis.clone(),
            taxonomies: keys,
        };

        let new_entries = created.len();
        self.store
            .commit(Changeset {
                created,
                manga: entity.clone(),
            })
            .inspect_err(|e| warn!(manga = manga.id, error = %e, "reconciliation failed"))?;

        debug!(manga = manga.id, new_entries, "reconciled manga");
        Ok(entity)
    }

    /// Reconciles every manga in order, stopping at the first failure.
    pub fn reconcile_all(&self, manga: &[Manga]) -> Result<Vec<MangaEntity>> {
        manga.iter().map(|m| self.reconcile(m)).collect()
    }

    /// Collects the keys of `records`, planning an entry for every key the
    /// store does not know yet.
    fn resolve<R: TaxonomyRecord>(
        &self,
        records: &[R],
        created: &mut Vec<TaxonomyEntry>,
        keys: &mut BTreeSet<TaxonomyKey>,
    ) -> Result<()> {
        for record in records {
            let key = TaxonomyKey::new(R::KIND, record.id());
            if keys.contains(&key) {
                continue;
            }

            if self.store.taxonomy(&key)?.is_none() {
                created.push(TaxonomyEntry::new(key.clone(), record.display_name()));
            }
            keys.insert(key);
        }
        Ok(())
    }
}
