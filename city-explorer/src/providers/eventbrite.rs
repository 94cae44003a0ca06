//! Eventbrite event search.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::{endpoint_url, non_empty, require_key, ProviderClient, ResourceProvider};
use crate::config::ProviderEndpoint;
use crate::error::Result;
use crate::models::{AddressLookup, Event, ResourceKind};

const PROVIDER: &str = "eventbrite";

#[derive(Debug, Deserialize)]
pub struct EventSearchResponse {
    pub events: Vec<EventItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventItem {
    pub url: Option<String>,
    pub name: Option<MultipartText>,
    pub summary: Option<String>,
    pub start: Option<EventStart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultipartText {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventStart {
    /// Venue-local time, e.g. `2019-01-10T19:00:00`.
    pub local: Option<String>,
}

fn parse_local(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub fn normalize_event(raw: EventItem) -> Event {
    Event {
        link: non_empty(raw.url),
        name: non_empty(raw.name.and_then(|n| n.text)),
        summary: non_empty(raw.summary),
        event_date: raw
            .start
            .and_then(|s| s.local)
            .as_deref()
            .and_then(parse_local),
    }
}

#[derive(Clone)]
pub struct EventbriteProvider {
    client: ProviderClient,
    endpoint: ProviderEndpoint,
}

impl EventbriteProvider {
    pub fn new(client: ProviderClient, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ResourceProvider for EventbriteProvider {
    type Request = AddressLookup;
    type Raw = EventItem;
    type Record = Event;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Event
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, request: &AddressLookup) -> Result<Vec<EventItem>> {
        let token = require_key(PROVIDER, &self.endpoint)?;
        let mut url = endpoint_url(&self.endpoint, "/v3/events/search")?;
        url.query_pairs_mut()
            .append_pair("token", token)
            .append_pair("location.address", &request.formatted_query);

        let response: EventSearchResponse = self.client.get_json(PROVIDER, url, None).await?;
        Ok(response.events)
    }

    fn normalize(&self, _request: &AddressLookup, raw: EventItem) -> Result<Event> {
        Ok(normalize_event(raw))
    }
}
