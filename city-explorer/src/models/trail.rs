use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Trail {
    pub name: Option<String>,
    pub location: Option<String>,
    /// Miles.
    pub length: Option<f64>,
    pub stars: Option<f64>,
    pub star_votes: Option<i64>,
    pub summary: Option<String>,
    pub trail_url: Option<String>,
    pub conditions: Option<String>,
    pub condition_date: Option<NaiveDate>,
    pub condition_time: Option<NaiveTime>,
}
