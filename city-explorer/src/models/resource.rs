use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The six resource types served by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Location,
    Weather,
    Event,
    Movie,
    Business,
    Trail,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::Location,
        Self::Weather,
        Self::Event,
        Self::Movie,
        Self::Business,
        Self::Trail,
    ];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Location => "locations",
            Self::Weather => "weathers",
            Self::Event => "events",
            Self::Movie => "movies",
            Self::Business => "yelps",
            Self::Trail => "trails",
        }
    }

    /// Column holding the lookup key.
    pub fn key_column(&self) -> &'static str {
        match self {
            Self::Location => "search_query",
            _ => "location_id",
        }
    }

    /// Whether rows of this kind hang off a location.
    pub fn is_dependent(&self) -> bool {
        !matches!(self, Self::Location)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::Weather => write!(f, "weather"),
            Self::Event => write!(f, "event"),
            Self::Movie => write!(f, "movie"),
            Self::Business => write!(f, "business"),
            Self::Trail => write!(f, "trail"),
        }
    }
}

/// Value addressing cached rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    SearchQuery(String),
    LocationId(i64),
}

impl LookupKey {
    pub fn location_id(&self) -> Option<i64> {
        match self {
            Self::LocationId(id) => Some(*id),
            Self::SearchQuery(_) => None,
        }
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SearchQuery(query) => write!(f, "search_query={query}"),
            Self::LocationId(id) => write!(f, "location_id={id}"),
        }
    }
}

/// A normalized record together with its row metadata.
///
/// `id` is `None` when the record was fetched but the write-back failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecord<R> {
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: R,
}

impl<R> CachedRecord<R> {
    /// Whether this row is still inside `window`, measured from `now`.
    pub fn is_fresh(&self, window: Option<std::time::Duration>, now: DateTime<Utc>) -> bool {
        match window.and_then(|w| chrono::Duration::from_std(w).ok()) {
            Some(window) => now - self.created_at <= window,
            None => true,
        }
    }
}
