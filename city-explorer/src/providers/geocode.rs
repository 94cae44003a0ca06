//! Google Geocoding API.

use async_trait::async_trait;
use serde::Deserialize;

use super::{endpoint_url, non_empty, require_key, Cardinality, ProviderClient, ResourceProvider};
use crate::config::ProviderEndpoint;
use crate::error::{AppError, Result};
use crate::models::{Location, LocationLookup, ResourceKind};

const PROVIDER: &str = "geocode";

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Maps one geocoding result for `search_query` to a [`Location`].
///
/// Coordinates are mandatory; a result without them is malformed.
pub fn normalize_location(search_query: &str, raw: GeocodeResult) -> Result<Location> {
    let coordinates = raw
        .geometry
        .and_then(|g| g.location)
        .ok_or_else(|| AppError::provider_malformed(PROVIDER, "result has no coordinates"))?;

    Ok(Location {
        search_query: search_query.to_string(),
        formatted_query: non_empty(raw.formatted_address),
        latitude: coordinates.lat,
        longitude: coordinates.lng,
    })
}

#[derive(Clone)]
pub struct GeocodeProvider {
    client: ProviderClient,
    endpoint: ProviderEndpoint,
}

impl GeocodeProvider {
    pub fn new(client: ProviderClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ResourceProvider for GeocodeProvider {
    type Request = LocationLookup;
    type Raw = GeocodeResult;
    type Record = Location;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Location
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::One
    }

    async fn fetch(&self, request: &LocationLookup) -> Result<Vec<GeocodeResult>> {
        let key = require_key(PROVIDER, &self.endpoint)?;
        let mut url = endpoint_url(&self.endpoint, "/maps/api/geocode/json")?;
        url.query_pairs_mut()
            .append_pair("address", &request.search_query)
            .append_pair("key", key);

        let response: GeocodeResponse = self.client.get_json(PROVIDER, url, None).await?;

        // Google reports auth and quota failures with HTTP 200 and a status field.
        match response.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => Ok(response.results),
            Some(status) => Err(AppError::provider_unavailable(
                PROVIDER,
                format!(
                    "status {status}: {}",
                    response.error_message.unwrap_or_default()
                ),
            )),
        }
    }

    fn normalize(&self, request: &LocationLookup, raw: GeocodeResult) -> Result<Location> {
        normalize_location(&request.search_query, raw)
    }
}
