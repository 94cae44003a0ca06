//! Dark Sky daily forecast.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;

use super::{endpoint_url, non_empty, require_key, ProviderClient, ResourceProvider};
use crate::config::ProviderEndpoint;
use crate::error::{AppError, Result};
use crate::models::{CoordinateLookup, ResourceKind, Weather};

const PROVIDER: &str = "weather";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
pub struct DailyBlock {
    pub data: Vec<DailyItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyItem {
    /// Unix seconds.
    pub time: i64,
    pub summary: Option<String>,
}

pub fn normalize_weather(raw: DailyItem) -> Result<Weather> {
    let time = Utc
        .timestamp_opt(raw.time, 0)
        .single()
        .ok_or_else(|| AppError::provider_malformed(PROVIDER, format!("bad time {}", raw.time)))?;

    Ok(Weather {
        forecast: non_empty(raw.summary),
        time,
    })
}

#[derive(Clone)]
pub struct DarkSkyProvider {
    client: ProviderClient,
    endpoint: ProviderEndpoint,
}

impl DarkSkyProvider {
    pub fn new(client: ProviderClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ResourceProvider for DarkSkyProvider {
    type Request = CoordinateLookup;
    type Raw = DailyItem;
    type Record = Weather;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Weather
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, request: &CoordinateLookup) -> Result<Vec<DailyItem>> {
        let key = require_key(PROVIDER, &self.endpoint)?;
        let url = endpoint_url(
            &self.endpoint,
            &format!(
                "/forecast/{key}/{},{}",
                request.latitude, request.longitude
            ),
        )?;

        let response: ForecastResponse = self.client.get_json(PROVIDER, url, None).await?;
        Ok(response.daily.data)
    }

    fn normalize(&self, _request: &CoordinateLookup, raw: DailyItem) -> Result<Weather> {
        normalize_weather(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_weather_keeps_full_timestamp() {
        let raw: DailyItem = serde_json::from_value(json!({
            "time": 1540278000,
            "summary": "Mostly cloudy throughout the day."
        }))
        .unwrap();

        let weather = normalize_weather(raw).unwrap();
        assert_eq!(
            weather.forecast.as_deref(),
            Some("Mostly cloudy throughout the day.")
        );
        assert_eq!(weather.time.to_rfc3339(), "2018-10-23T07:00:00+00:00");
    }

    #[test]
    fn test_missing_summary_becomes_null() {
        let raw: DailyItem = serde_json::from_value(json!({ "time": 0 })).unwrap();
        assert_eq!(normalize_weather(raw).unwrap().forecast, None);
    }

    #[test]
    fn test_out_of_range_time_is_malformed() {
        let raw = DailyItem {
            time: i64::MAX,
            summary: None,
        };
        assert!(matches!(
            normalize_weather(raw),
            Err(AppError::ProviderMalformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_daily_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/wx-key/47.6,-122.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": { "data": [
                    { "time": 1540278000, "summary": "Rain." },
                    { "time": 1540364400, "summary": "Clear." }
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = DarkSkyProvider::new(
            ProviderClient::new(std::time::Duration::from_secs(5)).unwrap(),
            ProviderEndpoint {
                base_url: server.uri(),
                api_key: Some("wx-key".into()),
            },
        );
        let lookup = CoordinateLookup {
            location_id: 1,
            latitude: 47.6,
            longitude: -122.3,
        };

        let days = provider.fetch(&lookup).await.unwrap();
        assert_eq!(days.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_daily_block_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "currently": {} })))
            .mount(&server)
            .await;

        let provider = DarkSkyProvider::new(
            ProviderClient::new(std::time::Duration::from_secs(5)).unwrap(),
            ProviderEndpoint {
                base_url: server.uri(),
                api_key: Some("k".into()),
            },
        );
        let lookup = CoordinateLookup {
            location_id: 1,
            latitude: 0.0,
            longitude: 0.0,
        };
        assert!(matches!(
            provider.fetch(&lookup).await,
            Err(AppError::ProviderMalformed { .. })
        ));
    }
}
