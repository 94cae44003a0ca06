//! Column mappings between canonical records and their cache tables.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use libsql::{Row, Value};

use crate::error::{AppError, Result};
use crate::models::{Business, Event, Location, Movie, ResourceKind, Trail, Weather};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A record type that owns one cache table.
///
/// Rows are read as `id, created_at, [location_id,] COLUMNS...`; `from_row`
/// receives the index of the first entry of `COLUMNS`.
pub trait StoredRecord: Sized + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// Data columns in bind order.
    const COLUMNS: &'static [&'static str];

    fn to_values(&self) -> Vec<Value>;

    fn from_row(row: &Row, offset: i32) -> Result<Self>;
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {value:?}: {e}")))
}

fn optional_text<T>(value: Option<T>, format: &str) -> Value
where
    T: FormattedText,
{
    value.map(|v| v.render(format)).into()
}

fn read_optional<T: FormattedText>(row: &Row, idx: i32, format: &str) -> Result<Option<T>> {
    Ok(row
        .get::<Option<String>>(idx)?
        .and_then(|text| T::parse(&text, format)))
}

trait FormattedText: Sized {
    fn render(&self, format: &str) -> String;
    fn parse(text: &str, format: &str) -> Option<Self>;
}

impl FormattedText for NaiveDate {
    fn render(&self, format: &str) -> String {
        self.format(format).to_string()
    }
    fn parse(text: &str, format: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text, format).ok()
    }
}

impl FormattedText for NaiveTime {
    fn render(&self, format: &str) -> String {
        self.format(format).to_string()
    }
    fn parse(text: &str, format: &str) -> Option<Self> {
        NaiveTime::parse_from_str(text, format).ok()
    }
}

impl FormattedText for NaiveDateTime {
    fn render(&self, format: &str) -> String {
        self.format(format).to_string()
    }
    fn parse(text: &str, format: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text, format).ok()
    }
}

impl StoredRecord for Location {
    const KIND: ResourceKind = ResourceKind::Location;
    const COLUMNS: &'static [&'static str] =
        &["search_query", "formatted_query", "latitude", "longitude"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.search_query.clone().into(),
            self.formatted_query.clone().into(),
            self.latitude.into(),
            self.longitude.into(),
        ]
    }

    fn from_row(row: &Row, offset: i32) -> Result<Self> {
        Ok(Self {
            search_query: row.get(offset)?,
            formatted_query: row.get(offset + 1)?,
            latitude: row.get(offset + 2)?,
            longitude: row.get(offset + 3)?,
        })
    }
}

impl StoredRecord for Weather {
    const KIND: ResourceKind = ResourceKind::Weather;
    const COLUMNS: &'static [&'static str] = &["forecast", "time"];

    fn to_values(&self) -> Vec<Value> {
        vec![self.forecast.clone().into(), self.time.to_rfc3339().into()]
    }

    fn from_row(row: &Row, offset: i32) -> Result<Self> {
        Ok(Self {
            forecast: row.get(offset)?,
            time: parse_timestamp(&row.get::<String>(offset + 1)?)?,
        })
    }
}

impl StoredRecord for Event {
    const KIND: ResourceKind = ResourceKind::Event;
    const COLUMNS: &'static [&'static str] = &["link", "name", "summary", "event_date"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.link.clone().into(),
            self.name.clone().into(),
            self.summary.clone().into(),
            optional_text(self.event_date, DATE_TIME_FORMAT),
        ]
    }

    fn from_row(row: &Row, offset: i32) -> Result<Self> {
        Ok(Self {
            link: row.get(offset)?,
            name: row.get(offset + 1)?,
            summary: row.get(offset + 2)?,
            event_date: read_optional(row, offset + 3, DATE_TIME_FORMAT)?,
        })
    }
}

impl StoredRecord for Movie {
    const KIND: ResourceKind = ResourceKind::Movie;
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "overview",
        "average_votes",
        "total_votes",
        "image_url",
        "popularity",
        "released_on",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.overview.clone().into(),
            self.average_votes.into(),
            self.total_votes.into(),
            self.image_url.clone().into(),
            self.popularity.into(),
            optional_text(self.released_on, DATE_FORMAT),
        ]
    }

    fn from_row(row: &Row, offset: i32) -> Result<Self> {
        Ok(Self {
            title: row.get(offset)?,
            overview: row.get(offset + 1)?,
            average_votes: row.get(offset + 2)?,
            total_votes: row.get(offset + 3)?,
            image_url: row.get(offset + 4)?,
            popularity: row.get(offset + 5)?,
            released_on: read_optional(row, offset + 6, DATE_FORMAT)?,
        })
    }
}

impl StoredRecord for Business {
    const KIND: ResourceKind = ResourceKind::Business;
    const COLUMNS: &'static [&'static str] = &["name", "image_url", "price", "rating", "url"];

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.image_url.clone().into(),
            self.price.clone().into(),
            self.rating.into(),
            self.url.clone().into(),
        ]
    }

    fn from_row(row: &Row, offset: i32) -> Result<Self> {
        Ok(Self {
            name: row.get(offset)?,
            image_url: row.get(offset + 1)?,
            price: row.get(offset + 2)?,
            rating: row.get(offset + 3)?,
            url: row.get(offset + 4)?,
        })
    }
}

impl StoredRecord for Trail {
    const KIND: ResourceKind = ResourceKind::Trail;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "location",
        "length",
        "stars",
        "star_votes",
        "summary",
        "trail_url",
        "conditions",
        "condition_date",
        "condition_time",
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.location.clone().into(),
            self.length.into(),
            self.stars.into(),
            self.star_votes.into(),
            self.summary.clone().into(),
            self.trail_url.clone().into(),
            self.conditions.clone().into(),
            optional_text(self.condition_date, DATE_FORMAT),
            optional_text(self.condition_time, TIME_FORMAT),
        ]
    }

    fn from_row(row: &Row, offset: i32) -> Result<Self> {
        Ok(Self {
            name: row.get(offset)?,
            location: row.get(offset + 1)?,
            length: row.get(offset + 2)?,
            stars: row.get(offset + 3)?,
            star_votes: row.get(offset + 4)?,
            summary: row.get(offset + 5)?,
            trail_url: row.get(offset + 6)?,
            conditions: row.get(offset + 7)?,
            condition_date: read_optional(row, offset + 8, DATE_FORMAT)?,
            condition_time: read_optional(row, offset + 9, TIME_FORMAT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_values() {
        let trail = Trail {
            name: Some("Loop".into()),
            location: None,
            length: Some(2.5),
            stars: None,
            star_votes: None,
            summary: None,
            trail_url: None,
            conditions: None,
            condition_date: NaiveDate::from_ymd_opt(2018, 7, 21),
            condition_time: NaiveTime::from_hms_opt(11, 12, 33),
        };
        let values = trail.to_values();
        assert_eq!(values.len(), Trail::COLUMNS.len());
        assert_eq!(values[8], Value::Text("2018-07-21".into()));
        assert_eq!(values[9], Value::Text("11:12:33".into()));
        assert_eq!(values[1], Value::Null);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("2024-03-01T10:00:00+00:00").is_ok());
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(AppError::Internal(_))
        ));
    }
}
