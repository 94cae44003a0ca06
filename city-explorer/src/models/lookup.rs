//! Request payloads carried in the `data` query parameter.
//!
//! Clients usually send the whole resolved location object, so unknown fields
//! are ignored. Ids and coordinates are accepted either as JSON numbers or as
//! numeric strings (some clients echo database numerics back as text).

use serde::{de, Deserialize, Deserializer};
use validator::Validate;

use super::LookupKey;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn flexible_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match NumberOrText::<T>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

/// `GET /location`: free-text place search.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, utoipa::ToSchema)]
pub struct LocationLookup {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 512))]
    pub search_query: String,
}

impl LocationLookup {
    pub fn new(search_query: &str) -> Self {
        Self {
            search_query: search_query.trim().to_string(),
        }
    }
}

/// Weather and trails: resolved location plus its coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, utoipa::ToSchema)]
pub struct CoordinateLookup {
    #[serde(rename = "id", deserialize_with = "flexible_number")]
    #[validate(range(min = 1))]
    pub location_id: i64,
    #[serde(deserialize_with = "flexible_number")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[serde(deserialize_with = "flexible_number")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Events: resolved location plus its formatted address.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, utoipa::ToSchema)]
pub struct AddressLookup {
    #[serde(rename = "id", deserialize_with = "flexible_number")]
    #[validate(range(min = 1))]
    pub location_id: i64,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 512))]
    pub formatted_query: String,
}

/// Movies and businesses: resolved location plus the original search text.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, utoipa::ToSchema)]
pub struct SearchLookup {
    #[serde(rename = "id", deserialize_with = "flexible_number")]
    #[validate(range(min = 1))]
    pub location_id: i64,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 512))]
    pub search_query: String,
}

/// Anything that can be turned into a cache lookup key.
pub trait Lookup: Validate + Send + Sync + std::fmt::Debug {
    fn lookup_key(&self) -> LookupKey;
}

impl Lookup for LocationLookup {
    fn lookup_key(&self) -> LookupKey {
        LookupKey::SearchQuery(self.search_query.clone())
    }
}

impl Lookup for CoordinateLookup {
    fn lookup_key(&self) -> LookupKey {
        LookupKey::LocationId(self.location_id)
    }
}

impl Lookup for AddressLookup {
    fn lookup_key(&self) -> LookupKey {
        LookupKey::LocationId(self.location_id)
    }
}

impl Lookup for SearchLookup {
    fn lookup_key(&self) -> LookupKey {
        LookupKey::LocationId(self.location_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_lookup_accepts_full_location_object() {
        let json = r#"{
            "id": 4,
            "search_query": "seattle",
            "formatted_query": "Seattle, WA, USA",
            "latitude": "47.6062095",
            "longitude": -122.3320708,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let lookup: CoordinateLookup = serde_json::from_str(json).unwrap();

        assert_eq!(lookup.location_id, 4);
        assert!((lookup.latitude - 47.6062095).abs() < f64::EPSILON);
        assert!(lookup.validate().is_ok());
        assert_eq!(lookup.lookup_key(), LookupKey::LocationId(4));
    }

    #[test]
    fn test_id_as_string_is_accepted() {
        let lookup: SearchLookup =
            serde_json::from_str(r#"{"id": "12", "search_query": " Seattle "}"#).unwrap();
        assert_eq!(lookup.location_id, 12);
        assert_eq!(lookup.search_query, "Seattle");
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result: Result<AddressLookup, _> =
            serde_json::from_str(r#"{"formatted_query": "Seattle, WA"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_latitude_fails_validation() {
        let lookup: CoordinateLookup =
            serde_json::from_str(r#"{"id": 1, "latitude": 123.0, "longitude": 0}"#).unwrap();
        assert!(lookup.validate().is_err());
    }

    #[test]
    fn test_blank_search_fails_validation() {
        let lookup = LocationLookup::new("   ");
        assert!(lookup.validate().is_err());
    }
}
