use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use super::response;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "City Explorer API",
        version = "1.0.0",
        description = "Location-driven aggregator: geocoding, weather, events, movies, businesses and trails behind a lookaside cache.",
    ),
    paths(
        handlers::health::health_check,
        handlers::resources::get_location,
        handlers::resources::get_weather,
        handlers::resources::get_events,
        handlers::resources::get_movies,
        handlers::resources::get_yelp,
        handlers::resources::get_trails,
    ),
    components(schemas(
        // Error envelope
        response::ErrorCode,
        response::ApiError,
        response::ErrorBody,
        // Records
        models::Location,
        models::Weather,
        models::Event,
        models::Movie,
        models::Business,
        models::Trail,
        // Lookups carried in `data`
        models::CoordinateLookup,
        models::AddressLookup,
        models::SearchLookup,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "location", description = "Geocode a free-text search"),
        (name = "weather", description = "Daily forecast for a location"),
        (name = "events", description = "Events near a location"),
        (name = "movies", description = "Movies matching a location's name"),
        (name = "yelp", description = "Businesses near a location"),
        (name = "trails", description = "Hiking trails near a location"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
