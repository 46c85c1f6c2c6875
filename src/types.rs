//! Wire-shaped records decoded from the catalog backend.
//!
//! These are DTOs: transient values decoded straight from a response and
//! never persisted as-is. The reconciler turns them into store entities.
//!
//! - [`Manga`] - A catalog manga with its embedded taxonomy sub-records
//! - [`Genre`], [`Theme`], [`Demographic`], [`Author`] - Taxonomy sub-records
//! - [`Page`] - One page of a paginated listing
//! - [`TaxonomyKind`] - The category tag shared by all taxonomy records
//!
//! # Examples
//!
//! ```rust
//! use hondana::types::{Manga, Page};
//!
//! let body = r#"{
//!     "metadata": { "page": 1, "per": 10, "total": 1 },
//!     "items": [{ "id": 1, "title": "Monster", "genres": [{ "id": "g1", "genre": "Drama" }] }]
//! }"#;
//!
//! let page: Page<Manga> = serde_json::from_str(body).unwrap();
//! assert_eq!(page.metadata.page, 1);
//! assert_eq!(page.items[0].genres[0].genre, "Drama");
//! assert!(page.items[0].authors.is_empty());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A manga record as served by the catalog backend.
///
/// Everything except `id` and `title` is optional on the wire; the embedded
/// taxonomy lists default to empty when absent.
///
/// # Fields
///
/// * `id` - Stable integer identifier
/// * `main_picture` - Raw cover string. The backend sometimes wraps it in
///   literal quote characters; see [`sanitize_cover_url`](crate::reconcile::sanitize_cover_url)
/// * `genres`, `themes`, `demographics`, `authors` - Embedded sub-records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manga {
    pub id: i64,

    pub title: String,

    pub title_english: Option<String>,

    pub title_japanese: Option<String>,

    #[serde(default)]
    pub title_synonyms: Vec<String>,

    /// The backend spells this field `sypnosis`
    #[serde(alias = "sypnosis")]
    pub synopsis: Option<String>,

    pub background: Option<String>,

    pub chapters: Option<u32>,

    pub volumes: Option<u32>,

    pub score: Option<f64>,

    pub status: Option<String>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    pub main_picture: Option<String>,

    /// External link to the manga's page
    pub url: Option<String>,

    #[serde(default)]
    pub genres: Vec<Genre>,

    #[serde(default)]
    pub themes: Vec<Theme>,

    #[serde(default)]
    pub demographics: Vec<Demographic>,

    #[serde(default)]
    pub authors: Vec<Author>,
}

impl Manga {
    /// Creates a manga with only the required fields set.
    ///
    /// ```rust
    /// use hondana::types::Manga;
    ///
    /// let manga = Manga::new(7, "Berserk");
    /// assert_eq!(manga.id, 7);
    /// assert!(manga.genres.is_empty());
    /// ```
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            title_english: None,
            title_japanese: None,
            title_synonyms: Vec::new(),
            synopsis: None,
            background: None,
            chapters: None,
            volumes: None,
            score: None,
            status: None,
            start_date: None,
            end_date: None,
            main_picture: None,
            url: None,
            genres: Vec::new(),
            themes: Vec::new(),
            demographics: Vec::new(),
            authors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub genre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographic {
    pub id: String,
    pub demographic: String,
}

/// An author as embedded in a manga or returned by the author listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    /// e.g. "Story", "Art", "Story & Art"
    pub role: Option<String>,
}

impl Author {
    /// Returns `first last`, or just `first` when there is no last name.
    ///
    /// ```rust
    /// use hondana::types::Author;
    ///
    /// let author = Author {
    ///     id: "a1".to_string(),
    ///     first_name: "ONE".to_string(),
    ///     last_name: None,
    ///     role: None,
    /// };
    /// assert_eq!(author.full_name(), "ONE");
    /// ```
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", first, last),
            _ => first.to_string(),
        }
    }
}

/// Category tag for catalog taxonomy records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    Genre,
    Theme,
    Demographic,
    Author,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 4] = [
        TaxonomyKind::Genre,
        TaxonomyKind::Theme,
        TaxonomyKind::Demographic,
        TaxonomyKind::Author,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyKind::Genre => "genre",
            TaxonomyKind::Theme => "theme",
            TaxonomyKind::Demographic => "demographic",
            TaxonomyKind::Author => "author",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wire record that belongs to one taxonomy category.
pub trait TaxonomyRecord {
    const KIND: TaxonomyKind;

    /// Identifier, unique within [`Self::KIND`]
    fn id(&self) -> &str;

    /// Name shown to the user
    fn display_name(&self) -> String;
}

impl TaxonomyRecord for Genre {
    const KIND: TaxonomyKind = TaxonomyKind::Genre;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.genre.clone()
    }
}

impl TaxonomyRecord for Theme {
    const KIND: TaxonomyKind = TaxonomyKind::Theme;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.theme.clone()
    }
}

impl TaxonomyRecord for Demographic {
    const KIND: TaxonomyKind = TaxonomyKind::Demographic;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.demographic.clone()
    }
}

impl TaxonomyRecord for Author {
    const KIND: TaxonomyKind = TaxonomyKind::Author;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.full_name()
    }
}

/// One page of a paginated listing.
///
/// An empty `items` list is the only end-of-listing signal; `total` is
/// informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: PageMetadata,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Paging metadata echoed by the backend.
///
/// # Fields
///
/// * `page` - 1-based page number actually served
/// * `per` - Page size
/// * `total` - Total item count across all pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page: u32,
    pub per: u32,
    pub total: u64,
}
