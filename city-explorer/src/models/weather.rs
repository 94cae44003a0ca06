use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Weather {
    pub forecast: Option<String>,
    /// Start of the forecast day.
    pub time: DateTime<Utc>,
}
