//! The remote catalog interface the core depends on.
//!
//! [`CatalogApi`] is the narrow seam between the core and the networked
//! backend. The core never builds URLs or touches HTTP; it asks a
//! `CatalogApi` for pages and records. [`HttpCatalog`] is the REST binding;
//! tests substitute scripted doubles.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hondana::catalog::{CatalogApi, HttpCatalog, MangaQuery};
//! use hondana::config::ClientConfig;
//!
//! # async fn example() -> hondana::Result<()> {
//! let catalog = HttpCatalog::from_config(&ClientConfig::from_env())?;
//!
//! let top = catalog.list_manga(&MangaQuery::Best, 1, 20).await?;
//! let seinen = catalog
//!     .list_manga(&MangaQuery::Genre("Seinen".into()), 1, 20)
//!     .await?;
//! let names = catalog.taxonomies().await?;
//! println!("{} genres, {} top manga", names.genres.len(), top.items.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::{
    error::Result,
    filter::CustomSearch,
    types::{Author, Manga, Page, TaxonomyKind},
};

pub mod http;

pub use http::HttpCatalog;

/// A paginated manga listing, one per pagination context.
#[derive(Debug, Clone, PartialEq)]
pub enum MangaQuery {
    /// Top-rated listing; the default when nothing is filtered
    Best,
    /// Manga with the given genre name
    Genre(String),
    /// Manga by the given author identifier
    Author(String),
    TitleContains(String),
    TitleBeginsWith(String),
    /// Combined search built by the filter composer
    Custom(CustomSearch),
}

/// Genre, theme and demographic name catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyNames {
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub demographics: Vec<String>,
}

/// Operations the core consumes from the catalog backend.
///
/// Implementations own transport concerns (timeouts, headers). They must
/// report an aborted request as [`Error::Cancelled`](crate::Error::Cancelled)
/// and a body of the wrong shape as a decoding error. Paginated lists treat
/// both differently from other failures.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetches one page of a manga listing.
    async fn list_manga(&self, query: &MangaQuery, page: u32, per: u32) -> Result<Page<Manga>>;

    /// Fetches one page of the author listing.
    async fn list_authors_page(&self, page: u32, per: u32) -> Result<Page<Author>>;

    /// Fetches the full author list.
    async fn authors(&self) -> Result<Vec<Author>>;

    /// Fetches the name catalog of one taxonomy category.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`](crate::Error::Validation) - For
    ///   [`TaxonomyKind::Author`], which has no name catalog
    async fn names(&self, kind: TaxonomyKind) -> Result<Vec<String>>;

    /// Fetches one manga by id.
    async fn manga(&self, id: i64) -> Result<Manga>;

    /// Runs the combined search.
    async fn search(&self, payload: &CustomSearch, page: u32, per: u32) -> Result<Page<Manga>>;

    /// Fetches the authors whose name matches `text`.
    async fn authors_matching(&self, text: &str) -> Result<Vec<Author>>;

    /// Fetches the genre, theme and demographic catalogs concurrently.
    async fn taxonomies(&self) -> Result<TaxonomyNames> {
        let (genres, themes, demographics) = futures::try_join!(
            self.names(TaxonomyKind::Genre),
            self.names(TaxonomyKind::Theme),
            self.names(TaxonomyKind::Demographic),
        )?;

        Ok(TaxonomyNames {
            genres,
            themes,
            demographics,
        })
    }
}
