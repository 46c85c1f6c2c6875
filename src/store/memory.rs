use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{CatalogStore, Changeset, MangaEntity, TaxonomyEntry, TaxonomyKey};
use crate::types::TaxonomyKind;

#[derive(Debug, Default)]
struct Tables {
    manga: HashMap<i64, MangaEntity>,
    taxonomies: HashMap<TaxonomyKey, TaxonomyEntry>,
}

/// In-memory [`CatalogStore`].
///
/// A single `RwLock` guards both tables, so a commit is observed either
/// entirely or not at all.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries of one kind.
    pub fn taxonomy_count(&self, kind: TaxonomyKind) -> usize {
        self.tables
            .read()
            .taxonomies
            .keys()
            .filter(|key| key.kind == kind)
            .count()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn manga(&self, id: i64) -> Result<Option<MangaEntity>> {
        Ok(self.tables.read().manga.get(&id).cloned())
    }

    fn taxonomy(&self, key: &TaxonomyKey) -> Result<Option<TaxonomyEntry>> {
        Ok(self.tables.read().taxonomies.get(key).cloned())
    }

    fn commit(&self, changes: Changeset) -> Result<()> {
        let Changeset { created, manga } = changes;
        let mut tables = self.tables.write();

        // Validate before touching anything
        for key in &manga.taxonomies {
            let known = tables.taxonomies.contains_key(key)
                || created.iter().any(|entry| &entry.key == key);
            if !known {
                return Err(Error::persistence(format!(
                    "manga {} references unknown {} '{}'",
                    manga.id, key.kind, key.id
                )));
            }
        }

        for entry in created {
            // A concurrent commit may have created it since planning
            tables.taxonomies.entry(entry.key.clone()).or_insert(entry);
        }

        let previous = tables
            .manga
            .get(&manga.id)
            .map(|old| old.taxonomies.clone())
            .unwrap_or_default();

        for key in previous.difference(&manga.taxonomies) {
            if let Some(entry) = tables.taxonomies.get_mut(key) {
                entry.manga.remove(&manga.id);
            }
        }
        for key in &manga.taxonomies {
            if let Some(entry) = tables.taxonomies.get_mut(key) {
                entry.manga.insert(manga.id);
            }
        }

        debug!(
            manga = manga.id,
            taxonomies = manga.taxonomies.len(),
            "committed manga entity"
        );
        tables.manga.insert(manga.id, manga);
        Ok(())
    }

    fn taxonomies(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>> {
        let mut entries: Vec<TaxonomyEntry> = self
            .tables
            .read()
            .taxonomies
            .values()
            .filter(|entry| entry.key.kind == kind)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        Ok(entries)
    }

    fn manga_for(&self, key: &TaxonomyKey) -> Result<Vec<MangaEntity>> {
        let tables = self.tables.read();
        let Some(entry) = tables.taxonomies.get(key) else {
            return Ok(Vec::new());
        };

        let mut manga: Vec<MangaEntity> = entry
            .manga
            .iter()
            .filter_map(|id| tables.manga.get(id).cloned())
            .collect();
        manga.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(manga)
    }

    fn manga_count(&self) -> Result<usize> {
        Ok(self.tables.read().manga.len())
    }
}
