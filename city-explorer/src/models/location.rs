use serde::{Deserialize, Serialize};

/// A geocoded search. Root of every other resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Location {
    /// Search text exactly as the client sent it (trimmed).
    pub search_query: String,
    pub formatted_query: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
