//! Common test utilities and fixtures
//!
//! Shared functionality used across all test modules.

use async_trait::async_trait;
use hondana::catalog::{CatalogApi, MangaQuery};
use hondana::filter::CustomSearch;
use hondana::types::{Author, Demographic, Genre, Manga, Page, PageMetadata, TaxonomyKind, Theme};
use hondana::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[allow(dead_code)]
pub const PAGE_SIZE: u32 = 5;

/// Installs a test subscriber once; `RUST_LOG` controls verbosity
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn genre(id: &str, name: &str) -> Genre {
    Genre {
        id: id.to_string(),
        genre: name.to_string(),
    }
}

#[allow(dead_code)]
pub fn theme(id: &str, name: &str) -> Theme {
    Theme {
        id: id.to_string(),
        theme: name.to_string(),
    }
}

#[allow(dead_code)]
pub fn demographic(id: &str, name: &str) -> Demographic {
    Demographic {
        id: id.to_string(),
        demographic: name.to_string(),
    }
}

#[allow(dead_code)]
pub fn author(id: &str, first: &str, last: Option<&str>) -> Author {
    Author {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.map(str::to_string),
        role: Some("Story & Art".to_string()),
    }
}

/// A manga with one genre, one theme, one demographic and one author
#[allow(dead_code)]
pub fn sample_manga(id: i64, title: &str) -> Manga {
    let mut manga = Manga::new(id, title);
    manga.score = Some(8.5);
    manga.synopsis = Some(format!("Synopsis of {}", title));
    manga.main_picture = Some(format!("\"https://cdn.example.com/{}.jpg\"", id));
    manga.genres = vec![genre("g-action", "Action")];
    manga.themes = vec![theme("t-samurai", "Samurai")];
    manga.demographics = vec![demographic("d-seinen", "Seinen")];
    manga.authors = vec![author("a-inoue", "Takehiko", Some("Inoue"))];
    manga
}

/// `count` manga with consecutive ids starting at `first_id`
#[allow(dead_code)]
pub fn manga_batch(first_id: i64, count: usize) -> Vec<Manga> {
    (0..count as i64)
        .map(|offset| Manga::new(first_id + offset, format!("Manga {}", first_id + offset)))
        .collect()
}

#[allow(dead_code)]
pub fn page_of<T>(items: Vec<T>, page: u32) -> Page<T> {
    Page {
        metadata: PageMetadata {
            page,
            per: PAGE_SIZE,
            total: 100,
        },
        items,
    }
}

/// What the scripted catalog answers for one page
#[allow(dead_code)]
#[derive(Clone)]
pub enum Reply {
    Items(Vec<Manga>),
    /// Items, but reported under a different page number
    ItemsAsPage(Vec<Manga>, u32),
    Undecodable,
    Unavailable,
    Cancelled,
}

/// `CatalogApi` double answering from a script keyed by query and page.
///
/// Unscripted pages are empty. Every request is recorded.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedCatalog {
    replies: Mutex<HashMap<(String, u32), Reply>>,
    author_pages: Mutex<HashMap<u32, Vec<Author>>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<(String, u32)>>,
}

#[allow(dead_code)]
impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(query: &MangaQuery) -> String {
        format!("{:?}", query)
    }

    pub fn script(&self, query: &MangaQuery, page: u32, reply: Reply) -> &Self {
        self.replies.lock().insert((Self::key(query), page), reply);
        self
    }

    pub fn script_authors(&self, page: u32, authors: Vec<Author>) -> &Self {
        self.author_pages.lock().insert(page, authors);
        self
    }

    /// Delays every answer for `query`
    pub fn delay(&self, query: &MangaQuery, delay: Duration) -> &Self {
        self.delays.lock().insert(Self::key(query), delay);
        self
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn list_manga(&self, query: &MangaQuery, page: u32, _per: u32) -> Result<Page<Manga>> {
        let key = Self::key(query);
        self.requests.lock().push((key.clone(), page));

        let delay = self.delays.lock().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().get(&(key, page)).cloned();
        match reply {
            None => Ok(page_of(Vec::new(), page)),
            Some(Reply::Items(items)) => Ok(page_of(items, page)),
            Some(Reply::ItemsAsPage(items, served)) => Ok(page_of(items, served)),
            Some(Reply::Undecodable) => Err(Error::decode("missing field `items`")),
            Some(Reply::Unavailable) => Err(Error::source("scripted", "HTTP 503 Service Unavailable")),
            Some(Reply::Cancelled) => Err(Error::Cancelled),
        }
    }

    async fn list_authors_page(&self, page: u32, _per: u32) -> Result<Page<Author>> {
        self.requests.lock().push(("authors".to_string(), page));
        let authors = self.author_pages.lock().get(&page).cloned().unwrap_or_default();
        Ok(page_of(authors, page))
    }

    async fn authors(&self) -> Result<Vec<Author>> {
        Ok(self.author_pages.lock().values().flatten().cloned().collect())
    }

    async fn names(&self, kind: TaxonomyKind) -> Result<Vec<String>> {
        Ok(vec![format!("some {}", kind)])
    }

    async fn manga(&self, id: i64) -> Result<Manga> {
        Ok(sample_manga(id, "Scripted"))
    }

    async fn search(&self, payload: &CustomSearch, page: u32, per: u32) -> Result<Page<Manga>> {
        self.list_manga(&MangaQuery::Custom(payload.clone()), page, per)
            .await
    }

    async fn authors_matching(&self, text: &str) -> Result<Vec<Author>> {
        Ok(self
            .author_pages
            .lock()
            .values()
            .flatten()
            .filter(|a| a.full_name().contains(text))
            .cloned()
            .collect())
    }
}

/// Unique scratch file path for file-backed store tests
#[allow(dead_code)]
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join("hondana-tests")
        .join(format!("{}-{}.json", name, uuid::Uuid::new_v4()))
}
