//! The local collection ledger.
//!
//! Tracks which catalog manga the user owns, which volumes, how far they
//! have read and whether the collection is complete. The ledger is keyed by
//! remote manga id and is independent of the catalog store: an entry caches
//! the title and cover it was created with and stays displayable without
//! any catalog lookup.
//!
//! Nothing spans the ledger and the catalog store. An operation that updates
//! both (reconcile a manga, then collect it) can be interrupted between the
//! two writes, leaving one store updated and the other not.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hondana::ledger::{EntryDraft, Ledger, MemoryLedgerStore};
//!
//! # fn main() -> hondana::Result<()> {
//! let ledger = Ledger::new(Arc::new(MemoryLedgerStore::new()));
//!
//! let mut draft = EntryDraft::new(42, "Yotsuba&!");
//! draft.progress.set_owned_volumes([1, 2, 3, 4]);
//! draft.progress.set_reading_volume(Some(4))?;
//! ledger.add_or_update(draft)?;
//!
//! let entry = ledger.edit(42, |progress| {
//!     progress.remove_volume(4);
//!     Ok(())
//! })?;
//! assert_eq!(entry.progress.reading_volume(), Some(3));
//! assert_eq!(ledger.list()?.len(), 1);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::reconcile::sanitize_cover_url;
use crate::types::Manga;

pub mod store;

pub use store::{JsonLedgerStore, MemoryLedgerStore};

/// Owned volumes and reading position of one collected manga.
///
/// The reading volume never exceeds the highest owned volume: every edit
/// that shrinks the owned set clamps it, and setting it past the highest
/// owned volume is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    owned_volumes: BTreeSet<u32>,
    reading_volume: Option<u32>,
    pub complete: bool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned volumes in ascending order.
    pub fn owned_volumes(&self) -> Vec<u32> {
        self.owned_volumes.iter().copied().collect()
    }

    pub fn owns(&self, volume: u32) -> bool {
        self.owned_volumes.contains(&volume)
    }

    pub fn max_owned(&self) -> Option<u32> {
        self.owned_volumes.last().copied()
    }

    pub fn reading_volume(&self) -> Option<u32> {
        self.reading_volume
    }

    pub fn add_volume(&mut self, volume: u32) {
        self.owned_volumes.insert(volume);
    }

    pub fn remove_volume(&mut self, volume: u32) {
        self.owned_volumes.remove(&volume);
        self.clamp_reading();
    }

    /// Flips ownership of `volume`; returns whether it is now owned.
    pub fn toggle_volume(&mut self, volume: u32) -> bool {
        if self.owns(volume) {
            self.remove_volume(volume);
            false
        } else {
            self.add_volume(volume);
            true
        }
    }

    pub fn set_owned_volumes(&mut self, volumes: impl IntoIterator<Item = u32>) {
        self.owned_volumes = volumes.into_iter().collect();
        self.clamp_reading();
    }

    /// Sets the volume currently being read.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] - If `volume` is past the highest owned volume
    pub fn set_reading_volume(&mut self, volume: Option<u32>) -> Result<()> {
        if let Some(volume) = volume {
            match self.max_owned() {
                Some(max) if volume <= max => {}
                Some(max) => {
                    return Err(Error::validation(format!(
                        "reading volume {} is past the highest owned volume {}",
                        volume, max
                    )));
                }
                None => {
                    return Err(Error::validation(format!(
                        "reading volume {} set with no volume owned",
                        volume
                    )));
                }
            }
        }
        self.reading_volume = volume;
        Ok(())
    }

    /// Returns `true` when volumes `1..=total` are all owned.
    pub fn owns_all(&self, total: u32) -> bool {
        total > 0 && (1..=total).all(|volume| self.owns(volume))
    }

    fn clamp_reading(&mut self) {
        let Some(reading) = self.reading_volume else {
            return;
        };
        match self.max_owned() {
            Some(max) if reading > max => self.reading_volume = Some(max),
            Some(_) => {}
            None => self.reading_volume = None,
        }
    }
}

/// One collected manga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    /// Local identifier
    pub id: Uuid,
    /// Remote catalog id; not a reference into the catalog store
    pub manga_id: i64,
    pub title: String,
    pub cover_url: Option<Url>,
    #[serde(flatten)]
    pub progress: Progress,
    pub updated_at: DateTime<Utc>,
}

/// Input of [`Ledger::add_or_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub manga_id: i64,
    pub title: String,
    pub cover_url: Option<Url>,
    pub progress: Progress,
}

impl EntryDraft {
    pub fn new(manga_id: i64, title: impl Into<String>) -> Self {
        Self {
            manga_id,
            title: title.into(),
            cover_url: None,
            progress: Progress::new(),
        }
    }

    /// Snapshots title and cover from a catalog record.
    pub fn from_manga(manga: &Manga) -> Self {
        Self {
            manga_id: manga.id,
            title: manga.title.clone(),
            cover_url: sanitize_cover_url(manga.main_picture.as_deref()),
            progress: Progress::new(),
        }
    }

    /// Starts an edit of an existing entry.
    pub fn from_entry(entry: &CollectionEntry) -> Self {
        Self {
            manga_id: entry.manga_id,
            title: entry.title.clone(),
            cover_url: entry.cover_url.clone(),
            progress: entry.progress.clone(),
        }
    }
}

/// Durable storage of collection entries.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<Vec<CollectionEntry>>;

    /// Inserts or replaces the entry with the same local id.
    fn save(&self, entry: &CollectionEntry) -> Result<()>;

    /// Removes an entry; returns whether it existed.
    fn remove(&self, id: Uuid) -> Result<bool>;
}

/// Collection operations over a [`LedgerStore`].
pub struct Ledger<S: LedgerStore + ?Sized> {
    store: Arc<S>,
}

impl<S: LedgerStore + ?Sized> Ledger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All entries sorted by title, case-insensitively.
    pub fn list(&self) -> Result<Vec<CollectionEntry>> {
        let mut entries = self.store.load()?;
        entries.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.manga_id.cmp(&b.manga_id))
        });
        Ok(entries)
    }

    pub fn entry_for_manga(&self, manga_id: i64) -> Result<Option<CollectionEntry>> {
        Ok(self
            .store
            .load()?
            .into_iter()
            .find(|entry| entry.manga_id == manga_id))
    }

    /// Stores `draft` under its manga id.
    ///
    /// An existing entry for the same manga keeps its local id and cached
    /// title and cover; its progress is overwritten and its timestamp
    /// refreshed. Otherwise a new entry is created.
    pub fn add_or_update(&self, draft: EntryDraft) -> Result<CollectionEntry> {
        let entry = match self.entry_for_manga(draft.manga_id)? {
            Some(mut existing) => {
                existing.progress = draft.progress;
                existing.updated_at = Utc::now();
                existing
            }
            None => CollectionEntry {
                id: Uuid::new_v4(),
                manga_id: draft.manga_id,
                title: draft.title,
                cover_url: draft.cover_url,
                progress: draft.progress,
                updated_at: Utc::now(),
            },
        };

        self.store.save(&entry)?;
        info!(
            manga = entry.manga_id,
            volumes = entry.progress.owned_volumes.len(),
            "saved collection entry"
        );
        Ok(entry)
    }

    /// Adds a catalog manga to the collection with no volumes owned. An
    /// existing entry is returned unchanged.
    pub fn collect(&self, manga: &Manga) -> Result<CollectionEntry> {
        match self.entry_for_manga(manga.id)? {
            Some(existing) => Ok(existing),
            None => self.add_or_update(EntryDraft::from_manga(manga)),
        }
    }

    /// Applies `change` to the progress of the entry for `manga_id` and
    /// saves it. Nothing is saved when `change` fails.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] - If the manga is not collected
    /// * Whatever `change` returns
    pub fn edit<F>(&self, manga_id: i64, change: F) -> Result<CollectionEntry>
    where
        F: FnOnce(&mut Progress) -> Result<()>,
    {
        let entry = self
            .entry_for_manga(manga_id)?
            .ok_or_else(|| Error::not_found(format!("collection entry for manga {}", manga_id)))?;

        let mut draft = EntryDraft::from_entry(&entry);
        change(&mut draft.progress)?;
        self.add_or_update(draft)
    }

    /// Deletes an entry by local id.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] - If no entry has that id
    pub fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.remove(id)? {
            return Err(Error::not_found(format!("collection entry {}", id)));
        }
        info!(%id, "deleted collection entry");
        Ok(())
    }
}
