use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::models::ResourceKind;
use crate::providers::{
    DarkSkyProvider, EventbriteProvider, GeocodeProvider, HikingProjectProvider, Providers,
    TmdbProvider, YelpProvider,
};

use super::LookasideResolver;

/// One lookaside resolver per resource type, all sharing the same store.
pub struct Resolvers {
    pub location: LookasideResolver<GeocodeProvider>,
    pub weather: LookasideResolver<DarkSkyProvider>,
    pub events: LookasideResolver<EventbriteProvider>,
    pub movies: LookasideResolver<TmdbProvider>,
    pub yelp: LookasideResolver<YelpProvider>,
    pub trails: LookasideResolver<HikingProjectProvider>,
}

impl Resolvers {
    pub fn new(providers: Providers, db: Arc<dyn DatabaseBackend>, config: &Config) -> Self {
        let timeout = config.providers.timeout();
        let cache = &config.cache;

        // Each resolver picks up its own freshness window and the shared flags.
        macro_rules! resolver {
            ($provider:expr, $kind:expr) => {
                LookasideResolver::new($provider, db.clone(), timeout)
                    .with_freshness(cache.freshness($kind))
                    .with_single_flight(cache.single_flight)
            };
        }

        Self {
            location: resolver!(providers.geocode, ResourceKind::Location),
            weather: resolver!(providers.weather, ResourceKind::Weather),
            events: resolver!(providers.events, ResourceKind::Event),
            movies: resolver!(providers.movies, ResourceKind::Movie),
            yelp: resolver!(providers.yelp, ResourceKind::Business),
            trails: resolver!(providers.trails, ResourceKind::Trail),
        }
    }
}
