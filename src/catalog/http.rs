use async_trait::async_trait;

use crate::{
    catalog::{CatalogApi, MangaQuery},
    config::ClientConfig,
    error::{Error, Result},
    filter::CustomSearch,
    net::HttpClient,
    types::{Author, Manga, Page, TaxonomyKind},
};

/// REST binding of [`CatalogApi`].
///
/// Path segments built from user text (genre names, search text, author
/// ids) are percent-encoded; paging travels as `page` and `per` query
/// parameters.
///
/// # Endpoints
///
/// | Operation                  | Request                                |
/// |----------------------------|----------------------------------------|
/// | [`MangaQuery::Best`]       | `GET list/bestMangas`                  |
/// | [`MangaQuery::Genre`]      | `GET list/mangaByGenre/{genre}`        |
/// | [`MangaQuery::Author`]     | `GET list/mangaByAuthor/{id}`          |
/// | [`MangaQuery::TitleContains`]   | `GET search/mangasContains/{text}`   |
/// | [`MangaQuery::TitleBeginsWith`] | `GET search/mangasBeginsWith/{text}` |
/// | [`MangaQuery::Custom`], `search` | `POST search/manga`              |
/// | `list_authors_page`, `authors` | `GET list/authors`                 |
/// | `names`                    | `GET list/{genres,themes,demographics}`|
/// | `manga`                    | `GET search/manga/{id}`                |
/// | `authors_matching`         | `GET search/author/{text}`             |
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: HttpClient,
}

impl HttpCatalog {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds the HTTP client from the configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::new(config)?))
    }

    fn paged(path: &str, page: u32, per: u32) -> String {
        format!("{}?page={}&per={}", path, page, per)
    }

    fn segment(text: &str) -> String {
        urlencoding::encode(text.trim()).into_owned()
    }

    /// GET path of a plain listing. `None` for the combined search, which
    /// is a POST.
    fn listing_path(query: &MangaQuery) -> Option<String> {
        let path = match query {
            MangaQuery::Best => "list/bestMangas".to_string(),
            MangaQuery::Genre(genre) => format!("list/mangaByGenre/{}", Self::segment(genre)),
            MangaQuery::Author(id) => format!("list/mangaByAuthor/{}", Self::segment(id)),
            MangaQuery::TitleContains(text) => {
                format!("search/mangasContains/{}", Self::segment(text))
            }
            MangaQuery::TitleBeginsWith(text) => {
                format!("search/mangasBeginsWith/{}", Self::segment(text))
            }
            MangaQuery::Custom(_) => return None,
        };
        Some(path)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list_manga(&self, query: &MangaQuery, page: u32, per: u32) -> Result<Page<Manga>> {
        if let MangaQuery::Custom(payload) = query {
            return self.search(payload, page, per).await;
        }

        let path = Self::listing_path(query)
            .ok_or_else(|| Error::Other(format!("No endpoint for {:?}", query)))?;
        self.client.get_json(&Self::paged(&path, page, per)).await
    }

    async fn list_authors_page(&self, page: u32, per: u32) -> Result<Page<Author>> {
        self.client
            .get_json(&Self::paged("list/authors", page, per))
            .await
    }

    async fn authors(&self) -> Result<Vec<Author>> {
        self.client.get_json("list/authors").await
    }

    async fn names(&self, kind: TaxonomyKind) -> Result<Vec<String>> {
        let path = match kind {
            TaxonomyKind::Genre => "list/genres",
            TaxonomyKind::Theme => "list/themes",
            TaxonomyKind::Demographic => "list/demographics",
            TaxonomyKind::Author => {
                return Err(Error::validation("authors have no name catalog"));
            }
        };
        self.client.get_json(path).await
    }

    async fn manga(&self, id: i64) -> Result<Manga> {
        self.client.get_json(&format!("search/manga/{}", id)).await
    }

    async fn search(&self, payload: &CustomSearch, page: u32, per: u32) -> Result<Page<Manga>> {
        self.client
            .post_json(&Self::paged("search/manga", page, per), payload)
            .await
    }

    async fn authors_matching(&self, text: &str) -> Result<Vec<Author>> {
        self.client
            .get_json(&format!("search/author/{}", Self::segment(text)))
            .await
    }
}
