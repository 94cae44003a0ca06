//! The Movie Database search.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{endpoint_url, non_empty, require_key, ProviderClient, ResourceProvider};
use crate::config::ProviderEndpoint;
use crate::error::Result;
use crate::models::{Movie, ResourceKind, SearchLookup};

const PROVIDER: &str = "tmdb";
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Deserialize)]
pub struct MovieSearchResponse {
    pub results: Vec<MovieItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieItem {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub poster_path: Option<String>,
    pub popularity: Option<f64>,
    /// `YYYY-MM-DD`, sometimes empty.
    pub release_date: Option<String>,
}

pub fn normalize_movie(raw: MovieItem) -> Movie {
    Movie {
        title: non_empty(raw.title),
        overview: non_empty(raw.overview),
        average_votes: raw.vote_average,
        total_votes: raw.vote_count,
        image_url: non_empty(raw.poster_path).map(|path| format!("{POSTER_BASE_URL}{path}")),
        popularity: raw.popularity,
        released_on: raw
            .release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
    }
}

#[derive(Clone)]
pub struct TmdbProvider {
    client: ProviderClient,
    endpoint: ProviderEndpoint,
}

impl TmdbProvider {
    pub fn new(client: ProviderClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ResourceProvider for TmdbProvider {
    type Request = SearchLookup;
    type Raw = MovieItem;
    type Record = Movie;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Movie
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, request: &SearchLookup) -> Result<Vec<MovieItem>> {
        let key = require_key(PROVIDER, &self.endpoint)?;
        let mut url = endpoint_url(&self.endpoint, "/3/search/movie")?;
        url.query_pairs_mut()
            .append_pair("api_key", key)
            .append_pair("language", "en-US")
            .append_pair("page", "1")
            .append_pair("query", &request.search_query);

        let response: MovieSearchResponse = self.client.get_json(PROVIDER, url, None).await?;
        Ok(response.results)
    }

    fn normalize(&self, _request: &SearchLookup, raw: MovieItem) -> Result<Movie> {
        Ok(normalize_movie(raw))
    }
}
