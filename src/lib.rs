//! # hondana - Manga catalog synchronization and local collection tracking
//!
//! hondana is the client-side core of a manga browsing app backed by a REST
//! catalog. It loads remote listings page by page, composes filters for the
//! combined search, reconciles remote records into a local entity store
//! without duplicating shared genres or authors, and keeps a local ledger of
//! the user's collection and reading progress.
//!
//! ## Features
//!
//! - **Incremental Listings**: Append-only paginated lists with last-page
//!   detection and stale-response discarding
//! - **Filter Composition**: Independent filter controls folded into one
//!   search payload
//! - **Reconciliation**: Idempotent DTO-to-entity resolution with taxonomy
//!   deduplication and atomic commits
//! - **Collection Ledger**: Owned volumes, reading position and completeness
//!   per manga, persisted as JSON
//! - **Injectable Backend**: Everything talks to the catalog through the
//!   [`CatalogApi`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hondana::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> hondana::Result<()> {
//!     let config = ClientConfig::from_env();
//!     let catalog = Arc::new(HttpCatalog::from_config(&config)?);
//!
//!     // Scrolling list of the top-rated manga
//!     let list = MangaList::for_manga(catalog.clone(), config.page_size);
//!     list.load_next_page_if_needed(None).await?;
//!
//!     // Save the first one locally and add it to the collection
//!     let reconciler = Reconciler::new(Arc::new(MemoryCatalogStore::new()));
//!     let ledger = Ledger::new(Arc::new(JsonLedgerStore::open(&config.ledger_path)?));
//!
//!     if let Some(manga) = list.snapshot().items.first() {
//!         reconciler.reconcile(manga)?;
//!         ledger.collect(manga)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: Wire records decoded from the backend
//! - [`catalog`]: The [`CatalogApi`] seam and its REST binding
//! - [`net`]: HTTP client
//! - [`paging`]: Paginated list controller
//! - [`filter`]: Filter composer and search payload
//! - [`store`]: Catalog entity store
//! - [`reconcile`]: DTO-to-entity reconciler
//! - [`ledger`]: Local collection ledger
//! - [`config`]: Client configuration
//! - [`error`]: Error handling

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod net;
pub mod paging;
pub mod reconcile;
pub mod store;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```rust
/// use hondana::prelude::*;
///
/// let filters = FilterSelection::default();
/// assert_eq!(filters.query(), MangaQuery::Best);
/// ```
pub mod prelude {
    pub use crate::{
        catalog::{CatalogApi, HttpCatalog, MangaQuery},
        config::ClientConfig,
        filter::{CustomSearch, FilterSelection, MatchMode},
        ledger::{CollectionEntry, EntryDraft, JsonLedgerStore, Ledger, MemoryLedgerStore, Progress},
        paging::{AuthorList, LoadOutcome, MangaList, Paginator},
        reconcile::Reconciler,
        store::{CatalogStore, MemoryCatalogStore},
        types::{Author, Manga, Page},
    };
}

// Re-export main types at crate root for direct access
pub use catalog::{CatalogApi, HttpCatalog, MangaQuery};
pub use error::{Error, Result};
pub use filter::{CustomSearch, FilterSelection, MatchMode};
pub use ledger::{CollectionEntry, Ledger};
pub use paging::{LoadOutcome, MangaList, Paginator};
pub use reconcile::Reconciler;
pub use types::{Manga, Page};
