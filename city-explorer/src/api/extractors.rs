//! Extractors for the `data` query parameter.
//!
//! `/location` takes it as raw search text; every other resource takes a
//! JSON-encoded lookup object.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct DataQuery {
    data: Option<String>,
}

async fn data_param<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<String, AppError> {
    let Query(query) = Query::<DataQuery>::from_request_parts(parts, state)
        .await
        .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    query
        .data
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing required query parameter: data".to_string()))
}

/// The `data` parameter as plain text.
pub struct RawData(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RawData {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(data_param(parts, state).await?))
    }
}

/// The `data` parameter decoded from JSON and validated.
pub struct DataParam<T>(pub T);

impl<S, T> FromRequestParts<S> for DataParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = data_param(parts, state).await?;
        let value: T = serde_json::from_str(&raw).map_err(map_json_error)?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn map_json_error(err: serde_json::Error) -> AppError {
    let message = err.to_string();
    if let Some(field) = extract_missing_field(&message) {
        AppError::Validation(format!("Missing required field: {field}"))
    } else if err.is_syntax() || err.is_eof() {
        AppError::Validation(format!("data must be a JSON object: {message}"))
    } else {
        AppError::Validation(format!("Invalid data: {message}"))
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
