use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::openapi;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let resources = Router::new()
        .route("/location", get(handlers::resources::get_location))
        .route("/weather", get(handlers::resources::get_weather))
        .route("/events", get(handlers::resources::get_events))
        .route("/movies", get(handlers::resources::get_movies))
        .route("/yelp", get(handlers::resources::get_yelp))
        .route("/trails", get(handlers::resources::get_trails));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router());

    Router::new()
        .merge(resources)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
