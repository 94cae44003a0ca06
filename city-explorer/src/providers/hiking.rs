//! Hiking Project trail search.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use serde::Deserialize;

use super::{endpoint_url, non_empty, require_key, ProviderClient, ResourceProvider};
use crate::config::ProviderEndpoint;
use crate::error::Result;
use crate::models::{CoordinateLookup, ResourceKind, Trail};

const PROVIDER: &str = "hiking_project";
const MAX_DISTANCE_MILES: &str = "200";

#[derive(Debug, Deserialize)]
pub struct TrailSearchResponse {
    pub trails: Vec<TrailItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailItem {
    pub name: Option<String>,
    pub location: Option<String>,
    pub length: Option<f64>,
    pub stars: Option<f64>,
    pub star_votes: Option<i64>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub condition_details: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`; the epoch means "never reported".
    pub condition_date: Option<String>,
}

fn parse_condition_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .filter(|reported| reported.year() > 1970)
}

pub fn normalize_trail(raw: TrailItem) -> Trail {
    let reported = raw.condition_date.as_deref().and_then(parse_condition_date);

    Trail {
        name: non_empty(raw.name),
        location: non_empty(raw.location),
        length: raw.length,
        stars: raw.stars,
        star_votes: raw.star_votes,
        summary: non_empty(raw.summary),
        trail_url: non_empty(raw.url),
        conditions: non_empty(raw.condition_details),
        condition_date: reported.map(|r| r.date()),
        condition_time: reported.map(|r| r.time()),
    }
}

#[derive(Clone)]
pub struct HikingProjectProvider {
    client: ProviderClient,
    endpoint: ProviderEndpoint,
}

impl HikingProjectProvider {
    pub fn new(client: ProviderClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ResourceProvider for HikingProjectProvider {
    type Request = CoordinateLookup;
    type Raw = TrailItem;
    type Record = Trail;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Trail
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, request: &CoordinateLookup) -> Result<Vec<TrailItem>> {
        let key = require_key(PROVIDER, &self.endpoint)?;
        let mut url = endpoint_url(&self.endpoint, "/data/get-trails")?;
        url.query_pairs_mut()
            .append_pair("lat", &request.latitude.to_string())
            .append_pair("lon", &request.longitude.to_string())
            .append_pair("maxDistance", MAX_DISTANCE_MILES)
            .append_pair("key", key);

        let response: TrailSearchResponse = self.client.get_json(PROVIDER, url, None).await?;
        Ok(response.trails)
    }

    fn normalize(&self, _request: &CoordinateLookup, raw: TrailItem) -> Result<Trail> {
        Ok(normalize_trail(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    fn raw(condition_date: &str) -> TrailItem {
        serde_json::from_value(json!({
            "id": 7011192,
            "name": "Rattlesnake Ledge",
            "location": "North Bend, Washington",
            "length": 4.3,
            "stars": 4.4,
            "starVotes": 83,
            "summary": "A nice hike with views of Rattlesnake Lake.",
            "url": "https://www.hikingproject.com/trail/7011192/rattlesnake-ledge",
            "conditionStatus": "All Clear",
            "conditionDetails": "Dry",
            "conditionDate": condition_date
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_trail_splits_condition_timestamp() {
        let trail = normalize_trail(raw("2018-07-21 11:12:33"));

        assert_eq!(trail.name.as_deref(), Some("Rattlesnake Ledge"));
        assert_eq!(trail.star_votes, Some(83));
        assert_eq!(trail.conditions.as_deref(), Some("Dry"));
        assert_eq!(trail.condition_date, NaiveDate::from_ymd_opt(2018, 7, 21));
        assert_eq!(trail.condition_time, NaiveTime::from_hms_opt(11, 12, 33));
    }

    #[test]
    fn test_epoch_condition_date_means_no_report() {
        let trail = normalize_trail(raw("1970-01-01 00:00:00"));
        assert_eq!(trail.condition_date, None);
        assert_eq!(trail.condition_time, None);
    }

    #[test]
    fn test_normalize_is_pure() {
        assert_eq!(
            normalize_trail(raw("2018-07-21 11:12:33")),
            normalize_trail(raw("2018-07-21 11:12:33"))
        );
    }
}
