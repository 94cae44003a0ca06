use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Event {
    pub link: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    /// Local start time at the venue, no offset attached.
    pub event_date: Option<NaiveDateTime>,
}
