//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock converter injected, so the full HTTP stack can be exercised
//! without yt-dlp or network access.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use convertino_core::{
    config::{AuthConfig, StorageConfig},
    create_authenticator, ArtifactStore, AuthMethod, Config, InMemoryJobRegistry,
    JobOrchestrator, OrchestratorConfig,
};
use convertino_server::state::AppState;

/// Re-export mocks and fixtures for test convenience
pub use convertino_core::testing::{fixtures, MockConverter, OutputNaming, RecordedCall};

/// Key accepted when the fixture runs with RapidAPI auth.
pub const TEST_API_KEY: &str = "test-rapidapi-key";
/// Host header sent alongside [`TEST_API_KEY`].
pub const TEST_API_HOST: &str = "youtube-to-mp3-converter.p.rapidapi.com";

/// Test fixture for E2E testing with a mock converter.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post_json("/api/convert", json!({
///         "url": fixtures::VALID_URL
///     })).await;
///
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock converter - control metadata, failures and output naming
    pub converter: Arc<MockConverter>,
    /// Storage directory for artifacts
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is empty or not JSON
    pub body: Value,
    pub bytes: Bytes,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Require RapidAPI headers instead of running in development mode
    pub rapid_api: bool,
}

impl TestConfig {
    pub fn with_rapid_api() -> Self {
        Self { rapid_api: true }
    }
}

impl TestFixture {
    /// Create a new test fixture in development mode.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let auth = if test_config.rapid_api {
            AuthConfig {
                method: AuthMethod::RapidApi,
                api_key: Some(TEST_API_KEY.to_string()),
                api_host: Some(TEST_API_HOST.to_string()),
            }
        } else {
            AuthConfig {
                method: AuthMethod::None,
                api_key: None,
                api_host: None,
            }
        };

        let config = Config {
            auth,
            server: Default::default(),
            storage: StorageConfig {
                path: temp_dir.path().to_path_buf(),
                ..Default::default()
            },
            converter: Default::default(),
            sources: Default::default(),
        };

        let converter = Arc::new(MockConverter::new());
        let store = Arc::new(ArtifactStore::new(&config.storage));
        let orchestrator = Arc::new(JobOrchestrator::new(
            OrchestratorConfig::from(&config),
            Arc::new(InMemoryJobRegistry::new()),
            Arc::clone(&converter) as Arc<dyn convertino_core::MediaConverter>,
            Arc::clone(&store),
        ));
        let authenticator = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );

        let state = Arc::new(AppState::new(config, authenticator, orchestrator, store));
        let router = convertino_server::api::create_router(state);

        Self {
            router,
            converter,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method("GET").uri(path), Body::empty())
            .await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder, Body::empty()).await
    }

    /// Send a POST request with JSON body.
    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.post_json_with_headers(path, body, &[]).await
    }

    /// Send a POST request with JSON body and extra headers.
    pub async fn post_json_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder, Body::from(serde_json::to_vec(&body).unwrap()))
            .await
    }

    /// Send a POST request with an urlencoded form body.
    pub async fn post_form(&self, path: &str, body: &str) -> TestResponse {
        self.post_with_content_type(path, body, "application/x-www-form-urlencoded")
            .await
    }

    /// Send a POST request with a `multipart/form-data` body of text parts.
    pub async fn post_multipart(&self, path: &str, parts: &[(&str, &str)]) -> TestResponse {
        const BOUNDARY: &str = "convertino-test-boundary";
        let mut body = String::new();
        for (name, value) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        self.post_with_content_type(
            path,
            &body,
            &format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .await
    }

    /// Send a POST request with custom content type (for testing wrong content types).
    pub async fn post_with_content_type(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type);
        self.send(builder, Body::from(body.to_string())).await
    }

    /// Submit a conversion for `url` and return the task id.
    pub async fn convert(&self, url: &str) -> String {
        let response = self
            .post_json("/api/convert", serde_json::json!({ "url": url }))
            .await;
        assert_eq!(response.status, StatusCode::ACCEPTED, "{}", response.body);
        response.body["task_id"]
            .as_str()
            .expect("task_id missing")
            .to_string()
    }

    /// Poll the status endpoint until the task is completed or errored.
    pub async fn wait_terminal(&self, task_id: &str) -> TestResponse {
        for _ in 0..500 {
            let response = self.get(&format!("/api/status/{}", task_id)).await;
            let status = response.body["data"]["status"].as_str().unwrap_or_default();
            if status == "completed" || status == "error" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {} did not finish", task_id);
    }

    async fn send(&self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
