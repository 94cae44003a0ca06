mod extractors;
pub mod handlers;
pub mod openapi;
pub mod response;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::{create_router, AppState};
    use crate::config::{Config, DatabaseConfig};
    use crate::db::{Database, DatabaseBackend, LibSqlBackend};

    async fn test_state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database =
            DatabaseConfig::local(format!("file:{}", dir.path().join("api.db").display()));
        // Nothing here may reach a real provider.
        config.providers.geocode.api_key = None;

        let raw_db = Database::new(&config.database).await.unwrap();
        let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

        (AppState::new(config, db).unwrap(), dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get(uri: &str) -> axum::response::Response {
        let (state, _dir) = test_state().await;
        create_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_database_ok() {
        let response = get("/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"]["status"], "ok");
        assert!(json["missing_api_keys"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("GEOCODE_API_KEY")));
    }

    #[tokio::test]
    async fn openapi_json_lists_every_resource() {
        let response = get("/openapi.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(version.starts_with('3'), "got: {version}");
        for path in ["/location", "/weather", "/events", "/movies", "/yelp", "/trails"] {
            assert!(json["paths"].get(path).is_some(), "{path} missing");
        }
    }

    #[tokio::test]
    async fn location_without_data_is_bad_request() {
        let response = get("/location").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn weather_with_non_json_data_is_bad_request() {
        let response = get("/weather?data=seattle").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn dependent_lookup_for_unknown_location_is_not_found() {
        let response =
            get("/yelp?data=%7B%22id%22%3A41%2C%22search_query%22%3A%22seattle%22%7D").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn provider_failure_is_generic_server_error() {
        // No geocode key: the provider call fails before leaving the process.
        let response = get("/location?data=Seattle").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "internal_error");
        assert_eq!(
            json["error"]["message"],
            crate::error::GENERIC_FAILURE_MESSAGE
        );
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let (state, _dir) = test_state().await;
        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
