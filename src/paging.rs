//! Incremental loading of paginated listings.
//!
//! A [`Paginator`] drives one scrolling list. It accumulates pages of the
//! current query (its *context*) into a single growing list, detects the
//! last page and discards responses that arrive for a context it has since
//! left.
//!
//! # Rules
//!
//! - Page 1 and forced reloads replace the list; other pages append.
//! - The current page number is taken from the response metadata.
//! - An empty page is the only end-of-listing signal.
//! - While a load is in flight, or once the last page was seen, further
//!   loads are skipped unless forced.
//! - Every request carries the generation it was issued under. Switching
//!   query or forcing a reload starts a new generation, and responses from
//!   an older one are dropped on arrival.
//! - Cancellation is a no-op, a decoding failure marks the listing as
//!   finished, and every other failure is returned to the caller with only
//!   the loading flag cleared.
//! - Dropping a load future before it completes (a timeout, `select!`)
//!   aborts its request and clears the loading flag.
//!
//! State changes come back as a [`LoadOutcome`] from each call and are also
//! published as [`ListSnapshot`]s on a `tokio::sync::watch` channel.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hondana::catalog::HttpCatalog;
//! use hondana::config::ClientConfig;
//! use hondana::paging::MangaList;
//!
//! # async fn example() -> hondana::Result<()> {
//! let config = ClientConfig::from_env();
//! let catalog = Arc::new(HttpCatalog::from_config(&config)?);
//! let list = MangaList::for_manga(catalog, config.page_size);
//!
//! list.load_next_page_if_needed(None).await?;
//! let snapshot = list.snapshot();
//! if let Some(last) = snapshot.items.last() {
//!     // the view scrolled to the bottom
//!     list.load_next_page_if_needed(Some(last)).await?;
//! }
//!
//! list.search_title("berserk", Default::default()).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::{
    catalog::{CatalogApi, MangaQuery},
    error::Result,
    filter::{FilterSelection, MatchMode},
    types::{Author, Manga, Page},
};

/// A remote listing that can be fetched one page at a time.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + PartialEq + Send + Sync + 'static;
    type Query: Clone + PartialEq + Debug + Send + Sync + 'static;

    async fn fetch(&self, query: &Self::Query, page: u32, per: u32) -> Result<Page<Self::Item>>;
}

/// Manga listings of a [`CatalogApi`].
pub struct MangaPages {
    catalog: Arc<dyn CatalogApi>,
}

impl MangaPages {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl PageSource for MangaPages {
    type Item = Manga;
    type Query = MangaQuery;

    async fn fetch(&self, query: &MangaQuery, page: u32, per: u32) -> Result<Page<Manga>> {
        self.catalog.list_manga(query, page, per).await
    }
}

/// The author listing has a single context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllAuthors;

/// Author listing of a [`CatalogApi`].
pub struct AuthorPages {
    catalog: Arc<dyn CatalogApi>,
}

impl AuthorPages {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl PageSource for AuthorPages {
    type Item = Author;
    type Query = AllAuthors;

    async fn fetch(&self, _query: &AllAuthors, page: u32, per: u32) -> Result<Page<Author>> {
        self.catalog.list_authors_page(page, per).await
    }
}

/// Why a load request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another load of this list is still running
    InFlight,
    /// The last page was already reached
    LastPage,
    /// The item passed in is not the last one loaded
    NotAtEnd,
}

/// What a load did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list now holds exactly this page's items
    Replaced { page: u32, count: usize },
    /// The page's items were appended
    Appended { page: u32, count: usize },
    /// The page was empty; the listing is finished
    ReachedEnd { page: u32 },
    /// Nothing was requested
    Skipped(SkipReason),
    /// The response belonged to an abandoned context or reload and was
    /// dropped
    Discarded,
    /// The request was aborted
    Cancelled,
    /// The response could not be decoded; the listing is marked finished
    Undecodable,
}

/// Read-only view of a list for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T, Q> {
    pub items: Vec<T>,
    /// Last page applied, 0 before the first load
    pub page: u32,
    pub last_page: bool,
    pub loading: bool,
    pub query: Q,
}

struct State<T, Q> {
    items: Vec<T>,
    page: u32,
    last_page: bool,
    loading: bool,
    query: Q,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl<T, Q> State<T, Q> {
    /// Starts a new generation, orphaning whatever is in flight.
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.generation
    }
}

/// Undoes the loading state of a load whose future was dropped before its
/// response was applied.
struct LoadGuard<'a, S: PageSource> {
    list: &'a Paginator<S>,
    generation: u64,
    armed: bool,
}

impl<S: PageSource> Drop for LoadGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        {
            let mut state = self.list.state.lock();
            if state.generation != self.generation {
                return;
            }
            state.loading = false;
            if let Some(handle) = state.in_flight.take() {
                handle.abort();
            }
        }
        debug!(generation = self.generation, "page load dropped before completion");
        self.list.publish();
    }
}

/// What `load_next_page_if_needed` decided before suspending.
enum NextStep {
    Load(u32),
    Skip(SkipReason),
}

/// Paginated list controller over one [`PageSource`].
pub struct Paginator<S: PageSource> {
    source: Arc<S>,
    per: u32,
    state: Mutex<State<S::Item, S::Query>>,
    updates: watch::Sender<ListSnapshot<S::Item, S::Query>>,
}

/// Manga list controller.
pub type MangaList = Paginator<MangaPages>;

/// Author list controller.
pub type AuthorList = Paginator<AuthorPages>;

impl<S: PageSource> Paginator<S> {
    /// Creates an empty list for `query`. Nothing is fetched until the first
    /// load.
    pub fn new(source: S, query: S::Query, per: u32) -> Self {
        let (updates, _) = watch::channel(ListSnapshot {
            items: Vec::new(),
            page: 0,
            last_page: false,
            loading: false,
            query: query.clone(),
        });

        Self {
            source: Arc::new(source),
            per: per.max(1),
            state: Mutex::new(State {
                items: Vec::new(),
                page: 0,
                last_page: false,
                loading: false,
                query,
                generation: 0,
                in_flight: None,
            }),
            updates,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.per
    }

    pub fn snapshot(&self) -> ListSnapshot<S::Item, S::Query> {
        let state = self.state.lock();
        ListSnapshot {
            items: state.items.clone(),
            page: state.page,
            last_page: state.last_page,
            loading: state.loading,
            query: state.query.clone(),
        }
    }

    /// Subscribes to snapshots published after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<S::Item, S::Query>> {
        self.updates.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn is_last_page(&self) -> bool {
        self.state.lock().last_page
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    /// Loads page `page` of the current query.
    ///
    /// # Errors
    ///
    /// Transport and other non-decoding failures are returned after being
    /// logged. Cancellation and decoding failures are reported as
    /// [`LoadOutcome::Cancelled`] and [`LoadOutcome::Undecodable`] instead.
    pub async fn load_page(&self, page: u32, force_reload: bool) -> Result<LoadOutcome> {
        let (generation, query) = {
            let mut state = self.state.lock();
            if force_reload {
                state.bump();
            } else if state.loading {
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            } else if state.last_page {
                return Ok(LoadOutcome::Skipped(SkipReason::LastPage));
            }
            state.loading = true;
            (state.generation, state.query.clone())
        };
        let mut guard = LoadGuard {
            list: self,
            generation,
            armed: true,
        };
        self.publish();

        debug!(?query, page, generation, force_reload, "requesting page");
        let source = Arc::clone(&self.source);
        let per = self.per;
        let task = tokio::spawn(async move { source.fetch(&query, page, per).await });

        {
            let mut state = self.state.lock();
            if state.generation == generation {
                state.in_flight = Some(task.abort_handle());
            } else {
                task.abort();
            }
        }

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        };

        guard.armed = false;
        self.apply(generation, page, force_reload, result)
    }

    fn apply(
        &self,
        generation: u64,
        requested: u32,
        force_reload: bool,
        result: Result<Page<S::Item>>,
    ) -> Result<LoadOutcome> {
        let outcome = {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    requested,
                    generation,
                    current = state.generation,
                    "discarding response for abandoned context"
                );
                return Ok(match result {
                    Err(e) if e.is_cancellation() => LoadOutcome::Cancelled,
                    _ => LoadOutcome::Discarded,
                });
            }

            state.loading = false;
            state.in_flight = None;
            let replace = requested == 1 || force_reload;

            match result {
                Ok(page) => {
                    let served = page.metadata.page;
                    let count = page.items.len();
                    state.page = served;

                    if page.items.is_empty() {
                        if replace {
                            state.items.clear();
                        }
                        state.last_page = true;
                        info!(page = served, "reached last page");
                        LoadOutcome::ReachedEnd { page: served }
                    } else if replace {
                        state.items = page.items;
                        state.last_page = false;
                        LoadOutcome::Replaced {
                            page: served,
                            count,
                        }
                    } else {
                        state.items.extend(page.items);
                        state.last_page = false;
                        LoadOutcome::Appended {
                            page: served,
                            count,
                        }
                    }
                }
                Err(e) if e.is_cancellation() => {
                    debug!(requested, "page request cancelled");
                    LoadOutcome::Cancelled
                }
                Err(e) if e.is_decoding() => {
                    warn!(requested, error = %e, "undecodable page, stopping pagination");
                    state.last_page = true;
                    LoadOutcome::Undecodable
                }
                Err(e) => {
                    warn!(requested, error = %e, "page request failed");
                    drop(state);
                    self.publish();
                    return Err(e);
                }
            }
        };

        self.publish();
        Ok(outcome)
    }

    /// Loads the next page when `current` is the last loaded item.
    ///
    /// Meant to be called once per item as it becomes visible. `None` loads
    /// the first page.
    pub async fn load_next_page_if_needed(&self, current: Option<&S::Item>) -> Result<LoadOutcome> {
        let Some(current) = current else {
            return self.load_page(1, false).await;
        };

        let step = {
            let state = self.state.lock();
            if state.loading {
                NextStep::Skip(SkipReason::InFlight)
            } else if state.last_page {
                NextStep::Skip(SkipReason::LastPage)
            } else if state.items.last() != Some(current) {
                NextStep::Skip(SkipReason::NotAtEnd)
            } else {
                NextStep::Load(state.page + 1)
            }
        };

        match step {
            NextStep::Load(page) => self.load_page(page, false).await,
            NextStep::Skip(reason) => Ok(LoadOutcome::Skipped(reason)),
        }
    }

    /// Reloads the first page of the current query, discarding anything in
    /// flight.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        self.load_page(1, true).await
    }

    /// Switches to `query` without fetching: the list is emptied and the
    /// last-page and loading flags cleared.
    pub fn set_query(&self, query: S::Query) {
        {
            let mut state = self.state.lock();
            let generation = state.bump();
            debug!(?query, generation, "switching list context");
            state.query = query;
            state.items.clear();
            state.page = 0;
            state.last_page = false;
            state.loading = false;
        }
        self.publish();
    }

    /// Switches to `query` and loads its first page.
    pub async fn switch_query(&self, query: S::Query) -> Result<LoadOutcome> {
        self.set_query(query);
        self.load_page(1, false).await
    }

    /// Aborts the request in flight, if any. The pending load resolves to
    /// [`LoadOutcome::Cancelled`].
    pub fn cancel(&self) {
        if let Some(handle) = self.state.lock().in_flight.take() {
            handle.abort();
        }
    }
}

impl Paginator<MangaPages> {
    /// Creates a manga list starting on the top-rated listing.
    pub fn for_manga(catalog: Arc<dyn CatalogApi>, per: u32) -> Self {
        Self::new(MangaPages::new(catalog), MangaQuery::Best, per)
    }

    pub async fn show_best(&self) -> Result<LoadOutcome> {
        self.switch_query(MangaQuery::Best).await
    }

    /// Title search. Blank text falls back to the top-rated listing.
    pub async fn search_title(&self, text: &str, mode: MatchMode) -> Result<LoadOutcome> {
        let text = text.trim();
        let query = if text.is_empty() {
            MangaQuery::Best
        } else if mode.is_contains() {
            MangaQuery::TitleContains(text.to_string())
        } else {
            MangaQuery::TitleBeginsWith(text.to_string())
        };
        self.switch_query(query).await
    }

    pub async fn filter_genre(&self, genre: &str) -> Result<LoadOutcome> {
        self.switch_query(MangaQuery::Genre(genre.to_string())).await
    }

    pub async fn filter_author(&self, author_id: &str) -> Result<LoadOutcome> {
        self.switch_query(MangaQuery::Author(author_id.to_string()))
            .await
    }

    /// Applies the composed filters, or the top-rated listing when none is
    /// active.
    pub async fn apply_filters(&self, filters: &FilterSelection) -> Result<LoadOutcome> {
        self.switch_query(filters.query()).await
    }
}

impl Paginator<AuthorPages> {
    pub fn for_authors(catalog: Arc<dyn CatalogApi>, per: u32) -> Self {
        Self::new(AuthorPages::new(catalog), AllAuthors, per)
    }
}
