//! Yelp Fusion business search.

use async_trait::async_trait;
use serde::Deserialize;

use super::{endpoint_url, non_empty, require_key, ProviderClient, ResourceProvider};
use crate::config::ProviderEndpoint;
use crate::error::Result;
use crate::models::{Business, ResourceKind, SearchLookup};

const PROVIDER: &str = "yelp";

#[derive(Debug, Deserialize)]
pub struct BusinessSearchResponse {
    pub businesses: Vec<BusinessItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessItem {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub url: Option<String>,
}

pub fn normalize_business(raw: BusinessItem) -> Business {
    Business {
        name: non_empty(raw.name),
        image_url: non_empty(raw.image_url),
        price: non_empty(raw.price),
        rating: raw.rating,
        url: non_empty(raw.url),
    }
}

#[derive(Clone)]
pub struct YelpProvider {
    client: ProviderClient,
    endpoint: ProviderEndpoint,
}

impl YelpProvider {
    pub fn new(client: ProviderClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ResourceProvider for YelpProvider {
    type Request = SearchLookup;
    type Raw = BusinessItem;
    type Record = Business;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Business
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, request: &SearchLookup) -> Result<Vec<BusinessItem>> {
        let token = require_key(PROVIDER, &self.endpoint)?;
        let mut url = endpoint_url(&self.endpoint, "/v3/businesses/search")?;
        url.query_pairs_mut()
            .append_pair("location", &request.search_query);

        let response: BusinessSearchResponse =
            self.client.get_json(PROVIDER, url, Some(token)).await?;
        Ok(response.businesses)
    }

    fn normalize(&self, _request: &SearchLookup, raw: BusinessItem) -> Result<Business> {
        Ok(normalize_business(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_business() {
        let raw: BusinessItem = serde_json::from_value(json!({
            "id": "abc",
            "name": "Pike Place Chowder",
            "image_url": "https://s3-media.fl.yelpcdn.com/bphoto/x/o.jpg",
            "price": "$$",
            "rating": 4.5,
            "url": "https://www.yelp.com/biz/pike-place-chowder-seattle"
        }))
        .unwrap();

        let business = normalize_business(raw);
        assert_eq!(business.name.as_deref(), Some("Pike Place Chowder"));
        assert_eq!(business.price.as_deref(), Some("$$"));
        assert_eq!(business.rating, Some(4.5));
    }

    #[test]
    fn test_missing_rating_and_price_become_null() {
        let raw: BusinessItem =
            serde_json::from_value(json!({ "name": "New Place", "image_url": "" })).unwrap();

        let business = normalize_business(raw);
        assert_eq!(business.rating, None);
        assert_eq!(business.price, None);
        assert_eq!(business.image_url, None);
    }
}
