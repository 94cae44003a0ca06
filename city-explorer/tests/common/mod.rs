// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Once};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

use city_explorer::api::{create_router, AppState};
use city_explorer::config::{Config, DatabaseConfig};
use city_explorer::db::{Database, DatabaseBackend, LibSqlBackend};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A router wired to a file database and one mock server standing in for every provider.
pub struct TestApp {
    pub router: Router,
    pub providers: MockServer,
    pub db: Database,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_test_logger();

        let dir = tempfile::tempdir().unwrap();
        let providers = MockServer::start().await;

        let mut config = Config::default();
        config.database =
            DatabaseConfig::local(format!("file:{}", dir.path().join("it.db").display()));
        for endpoint in [
            &mut config.providers.geocode,
            &mut config.providers.weather,
            &mut config.providers.events,
            &mut config.providers.movies,
            &mut config.providers.yelp,
            &mut config.providers.trails,
        ] {
            endpoint.base_url = providers.uri();
            endpoint.api_key = Some("test-key".to_string());
        }
        config.providers.timeout_secs = 1;

        let db = Database::new(&config.database).await.unwrap();
        let backend: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(db.clone()));
        let state = AppState::new(config, backend).unwrap();

        Self {
            router: create_router(state),
            providers,
            db,
            _dir: dir,
        }
    }

    /// `GET uri`, returning status and decoded JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// `GET path?data=<json>`
    pub async fn get_with_data(
        &self,
        path: &str,
        data: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let encoded: String =
            url::form_urlencoded::byte_serialize(data.to_string().as_bytes()).collect();
        self.get(&format!("{path}?data={encoded}")).await
    }

    pub async fn count_rows(&self, table: &str) -> i64 {
        let conn = self.db.connect().await.unwrap();
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    }
}
