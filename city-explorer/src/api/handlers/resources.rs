use axum::extract::State;
use axum::Json;
use validator::Validate;

use crate::api::extractors::{DataParam, RawData};
use crate::api::response::ErrorBody;
use crate::api::state::AppState;
use crate::error::{AppError, Result};
use crate::models::{
    AddressLookup, Business, CachedRecord, CoordinateLookup, Event, Location, LocationLookup,
    Movie, SearchLookup, Trail, Weather,
};

/// Rejects lookups for a location this service never resolved.
async fn ensure_location(state: &AppState, location_id: i64) -> Result<()> {
    if state.db.location_exists(location_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Location {location_id} has not been resolved"
        )))
    }
}

/// `GET /location?data=<search text>`
#[utoipa::path(
    get,
    path = "/location",
    tag = "location",
    params(("data" = String, Query, description = "Free-text place search, e.g. `Seattle`")),
    responses(
        (status = 200, description = "Geocoded location row (`id`, `created_at` and the fields below)", body = Location),
        (status = 400, description = "Missing search text", body = ErrorBody),
        (status = 500, description = "Resolution failed", body = ErrorBody),
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    RawData(data): RawData,
) -> Result<Json<CachedRecord<Location>>> {
    let lookup = LocationLookup::new(&data);
    lookup.validate()?;

    let location = state.resolvers.location.resolve_one(&lookup).await?;
    Ok(Json(location))
}

/// `GET /weather?data={"id","latitude","longitude"}`
#[utoipa::path(
    get,
    path = "/weather",
    tag = "weather",
    params(("data" = String, Query, description = "JSON location object: `id`, `latitude`, `longitude`")),
    responses(
        (status = 200, description = "Daily forecasts", body = [Weather]),
        (status = 400, description = "Invalid location object", body = ErrorBody),
        (status = 404, description = "Unknown location id", body = ErrorBody),
        (status = 500, description = "Resolution failed", body = ErrorBody),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    DataParam(lookup): DataParam<CoordinateLookup>,
) -> Result<Json<Vec<CachedRecord<Weather>>>> {
    ensure_location(&state, lookup.location_id).await?;
    Ok(Json(state.resolvers.weather.resolve(&lookup).await?))
}

/// `GET /events?data={"id","formatted_query"}`
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(("data" = String, Query, description = "JSON location object: `id`, `formatted_query`")),
    responses(
        (status = 200, description = "Upcoming events near the address", body = [Event]),
        (status = 400, description = "Invalid location object", body = ErrorBody),
        (status = 404, description = "Unknown location id", body = ErrorBody),
        (status = 500, description = "Resolution failed", body = ErrorBody),
    )
)]
pub async fn get_events(
    State(state): State<AppState>,
    DataParam(lookup): DataParam<AddressLookup>,
) -> Result<Json<Vec<CachedRecord<Event>>>> {
    ensure_location(&state, lookup.location_id).await?;
    Ok(Json(state.resolvers.events.resolve(&lookup).await?))
}

/// `GET /movies?data={"id","search_query"}`
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    params(("data" = String, Query, description = "JSON location object: `id`, `search_query`")),
    responses(
        (status = 200, description = "Movies matching the search text", body = [Movie]),
        (status = 400, description = "Invalid location object", body = ErrorBody),
        (status = 404, description = "Unknown location id", body = ErrorBody),
        (status = 500, description = "Resolution failed", body = ErrorBody),
    )
)]
pub async fn get_movies(
    State(state): State<AppState>,
    DataParam(lookup): DataParam<SearchLookup>,
) -> Result<Json<Vec<CachedRecord<Movie>>>> {
    ensure_location(&state, lookup.location_id).await?;
    Ok(Json(state.resolvers.movies.resolve(&lookup).await?))
}

/// `GET /yelp?data={"id","search_query"}`
#[utoipa::path(
    get,
    path = "/yelp",
    tag = "yelp",
    params(("data" = String, Query, description = "JSON location object: `id`, `search_query`")),
    responses(
        (status = 200, description = "Businesses in the area", body = [Business]),
        (status = 400, description = "Invalid location object", body = ErrorBody),
        (status = 404, description = "Unknown location id", body = ErrorBody),
        (status = 500, description = "Resolution failed", body = ErrorBody),
    )
)]
pub async fn get_yelp(
    State(state): State<AppState>,
    DataParam(lookup): DataParam<SearchLookup>,
) -> Result<Json<Vec<CachedRecord<Business>>>> {
    ensure_location(&state, lookup.location_id).await?;
    Ok(Json(state.resolvers.yelp.resolve(&lookup).await?))
}

/// `GET /trails?data={"id","latitude","longitude"}`
#[utoipa::path(
    get,
    path = "/trails",
    tag = "trails",
    params(("data" = String, Query, description = "JSON location object: `id`, `latitude`, `longitude`")),
    responses(
        (status = 200, description = "Hiking trails within 200 miles", body = [Trail]),
        (status = 400, description = "Invalid location object", body = ErrorBody),
        (status = 404, description = "Unknown location id", body = ErrorBody),
        (status = 500, description = "Resolution failed", body = ErrorBody),
    )
)]
pub async fn get_trails(
    State(state): State<AppState>,
    DataParam(lookup): DataParam<CoordinateLookup>,
) -> Result<Json<Vec<CachedRecord<Trail>>>> {
    ensure_location(&state, lookup.location_id).await?;
    Ok(Json(state.resolvers.trails.resolve(&lookup).await?))
}
