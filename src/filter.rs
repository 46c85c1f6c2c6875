//! Filter composition for the combined-search endpoint.
//!
//! The presentation layer edits a [`FilterSelection`] one control at a time.
//! [`FilterSelection::compose`] folds whatever is selected into a single
//! [`CustomSearch`] payload, or reports that no filter is active so the
//! caller falls back to the default listing.
//!
//! # Examples
//!
//! ```rust
//! use hondana::filter::{FilterSelection, MatchMode};
//!
//! let mut filters = FilterSelection::default();
//! assert!(filters.compose().is_none());
//!
//! filters.title = "dragon".to_string();
//! filters.match_mode = MatchMode::BeginsWith;
//! filters.themes.insert("Martial Arts".to_string());
//!
//! let payload = filters.compose().unwrap();
//! assert_eq!(payload.search_title.as_deref(), Some("dragon"));
//! assert!(!payload.search_contains);
//! assert_eq!(payload.search_themes, Some(vec!["Martial Arts".to_string()]));
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::MangaQuery;

/// How free-text criteria are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    /// Substring match anywhere in the field
    #[default]
    Contains,
    /// Prefix match
    BeginsWith,
}

impl MatchMode {
    pub fn is_contains(&self) -> bool {
        matches!(self, MatchMode::Contains)
    }
}

/// Request body of the combined-search endpoint.
///
/// Unset criteria are omitted from the JSON body. `search_contains` applies
/// to every text criterion in the request; it cannot be set per field.
///
/// At most one of `search_author_ids` and the author name pair is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(rename_all = "camelCase")]
pub struct CustomSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_author_first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_author_last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_author_ids: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_genres: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_themes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_demographics: Option<Vec<String>>,

    pub search_contains: bool,
}

/// The filter controls currently selected by the user.
///
/// Every field is independent; nothing is validated until
/// [`compose`](FilterSelection::compose).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    /// Free-text title query
    pub title: String,
    pub match_mode: MatchMode,
    /// Single selected genre name
    pub genre: Option<String>,
    pub themes: BTreeSet<String>,
    pub demographics: BTreeSet<String>,
    /// Selected author identifiers. Takes precedence over `author_name`.
    pub author_ids: BTreeSet<String>,
    /// Free-text author name, split into first and last name on the first
    /// whitespace
    pub author_name: String,
}

impl FilterSelection {
    /// Returns `true` when no control carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
            && self.genre.as_deref().is_none_or(|g| g.trim().is_empty())
            && non_empty(&self.themes).is_none()
            && non_empty(&self.demographics).is_none()
            && non_empty(&self.author_ids).is_none()
            && self.author_name.trim().is_empty()
    }

    /// Builds the combined-search payload, or `None` when no filter is
    /// active.
    pub fn compose(&self) -> Option<CustomSearch> {
        if self.is_empty() {
            return None;
        }

        let mut payload = CustomSearch {
            search_title: non_blank(&self.title),
            search_genres: self
                .genre
                .as_deref()
                .and_then(non_blank)
                .map(|genre| vec![genre]),
            search_themes: non_empty(&self.themes),
            search_demographics: non_empty(&self.demographics),
            search_contains: self.match_mode.is_contains(),
            ..Default::default()
        };

        if let Some(ids) = non_empty(&self.author_ids) {
            payload.search_author_ids = Some(ids);
        } else if let Some(name) = non_blank(&self.author_name) {
            let (first, last) = match name.split_once(char::is_whitespace) {
                Some((first, last)) => (first.to_string(), non_blank(last)),
                None => (name, None),
            };
            payload.search_author_first_name = Some(first);
            payload.search_author_last_name = last;
        }

        Some(payload)
    }

    /// Maps the selection onto a listing: the combined search when a filter
    /// is active, the default listing otherwise.
    pub fn query(&self) -> MangaQuery {
        match self.compose() {
            Some(payload) => MangaQuery::Custom(payload),
            None => MangaQuery::Best,
        }
    }

    /// Clears every selection. Does not fetch anything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed, non-blank members of `set`, or `None` when there are none.
fn non_empty(set: &BTreeSet<String>) -> Option<Vec<String>> {
    let members: BTreeSet<String> = set.iter().map(String::as_str).filter_map(non_blank).collect();
    (!members.is_empty()).then(|| members.into_iter().collect())
}
