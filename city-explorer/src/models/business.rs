use serde::{Deserialize, Serialize};

/// A business listing with its review summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Business {
    pub name: Option<String>,
    pub image_url: Option<String>,
    /// Price tier as the provider renders it, e.g. `"$$"`.
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub url: Option<String>,
}
