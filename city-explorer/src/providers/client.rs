use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::{AppError, Result};

/// Shared HTTP client for every upstream provider.
///
/// Built once at startup with the provider timeout; cloning is cheap.
#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    timeout: Duration,
}

impl ProviderClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("city-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// `GET url` and decode the JSON body.
    ///
    /// Non-success statuses and transport failures are `ProviderUnavailable`,
    /// an expired deadline is `ProviderTimeout`, an undecodable body is
    /// `ProviderMalformed`. Error messages never include the request URL,
    /// which may carry credentials.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        provider: &'static str,
        url: Url,
        bearer: Option<&str>,
    ) -> Result<T> {
        tracing::debug!(provider, host = url.host_str().unwrap_or(""), "Calling provider");

        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::provider_unavailable(
                provider,
                format!("upstream responded with {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(provider, e))?;

        serde_json::from_slice(&body)
            .map_err(|e| AppError::provider_malformed(provider, format!("invalid body: {e}")))
    }

    fn classify(&self, provider: &'static str, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::ProviderTimeout {
                provider,
                after_secs: self.timeout.as_secs(),
            }
        } else {
            AppError::provider_unavailable(provider, error.without_url().to_string())
        }
    }
}
