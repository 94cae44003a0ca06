//! Upstream data providers and their record normalizers.
//!
//! Every provider module holds the raw response shapes, one pure
//! `normalize_*` function mapping a raw item to the canonical record, and a
//! [`ResourceProvider`] implementation the lookaside resolver drives.

mod client;
pub mod darksky;
pub mod eventbrite;
pub mod geocode;
pub mod hiking;
pub mod tmdb;
pub mod yelp;

use async_trait::async_trait;
use url::Url;

use crate::config::{ProviderEndpoint, ProvidersConfig};
use crate::error::{AppError, Result};
use crate::models::{Lookup, ResourceKind};

pub use client::ProviderClient;
pub use darksky::DarkSkyProvider;
pub use eventbrite::EventbriteProvider;
pub use geocode::GeocodeProvider;
pub use hiking::HikingProjectProvider;
pub use tmdb::TmdbProvider;
pub use yelp::YelpProvider;

/// How many records one resolution yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one record; an empty provider result is an error.
    One,
    /// Zero or more records; an empty provider result is a valid answer.
    Many,
}

/// The capabilities the resolver needs for one resource type: reach the
/// provider, and map what it returns to canonical records.
#[async_trait]
pub trait ResourceProvider: Send + Sync + 'static {
    type Request: Lookup + 'static;
    type Raw: Send + 'static;
    type Record: Clone + Send + Sync + 'static;

    fn kind(&self) -> ResourceKind;

    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    fn cardinality(&self) -> Cardinality {
        Cardinality::Many
    }

    async fn fetch(&self, request: &Self::Request) -> Result<Vec<Self::Raw>>;

    fn normalize(&self, request: &Self::Request, raw: Self::Raw) -> Result<Self::Record>;
}

/// The configured API key, or `ProviderUnavailable` if there is none.
pub(crate) fn require_key<'a>(
    provider: &'static str,
    endpoint: &'a ProviderEndpoint,
) -> Result<&'a str> {
    endpoint
        .api_key
        .as_deref()
        .ok_or_else(|| AppError::provider_unavailable(provider, "API key is not configured"))
}

/// Joins `path` onto the endpoint's base URL.
pub(crate) fn endpoint_url(endpoint: &ProviderEndpoint, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}{}", endpoint.base_url, path))?)
}

/// Treats blank provider strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// The six provider instances, sharing one HTTP client.
#[derive(Clone)]
pub struct Providers {
    pub geocode: GeocodeProvider,
    pub weather: DarkSkyProvider,
    pub events: EventbriteProvider,
    pub movies: TmdbProvider,
    pub yelp: YelpProvider,
    pub trails: HikingProjectProvider,
}

impl Providers {
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let client = ProviderClient::new(config.timeout())?;

        Ok(Self {
            geocode: GeocodeProvider::new(client.clone(), config.geocode.clone()),
            weather: DarkSkyProvider::new(client.clone(), config.weather.clone()),
            events: EventbriteProvider::new(client.clone(), config.events.clone()),
            movies: TmdbProvider::new(client.clone(), config.movies.clone()),
            yelp: YelpProvider::new(client.clone(), config.yelp.clone()),
            trails: HikingProjectProvider::new(client, config.trails.clone()),
        })
    }
}
