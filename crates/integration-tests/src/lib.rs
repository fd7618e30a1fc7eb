//! Integration test harness for the merchant bank API.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`;
//! no server or network is involved. Each [`TestApp`] owns a fresh temporary
//! data directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p merchant-bank-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use merchant_bank_api::config::{BankConfig, TokenConfig};
use merchant_bank_api::db::DataDir;
use merchant_bank_api::routes;
use merchant_bank_api::services::{AcceptAllVerifier, PasswordCost, TransactionVerifier};
use merchant_bank_api::state::AppState;

/// Signing key used by every test app.
pub const TEST_SIGNING_KEY: &str = "integration-test-signing-key-0123456789";

/// Issuer used by every test app.
pub const TEST_ISSUER: &str = "merchant-bank-test";

/// A router over a temporary data directory.
pub struct TestApp {
    dir: tempfile::TempDir,
    state: AppState,
    router: Router,
}

/// Status and decoded JSON body of a response. Non-JSON bodies decode to
/// `Value::String`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Build an app with an initialised data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or state cannot be created.
    pub async fn new() -> Self {
        Self::with_unique_usernames(false).await
    }

    /// Build an app, choosing whether usernames must be unique.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or state cannot be created.
    pub async fn with_unique_usernames(unique_usernames: bool) -> Self {
        Self::build(unique_usernames, AcceptAllVerifier).await
    }

    /// Build an app whose payments are checked by `verifier`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or state cannot be created.
    pub async fn with_verifier(verifier: impl TransactionVerifier + 'static) -> Self {
        Self::build(false, verifier).await
    }

    #[allow(clippy::unwrap_used)]
    async fn build(unique_usernames: bool, verifier: impl TransactionVerifier + 'static) -> Self {
        let dir = tempfile::tempdir().unwrap();
        DataDir::new(dir.path()).initialise().await.unwrap();

        let config = BankConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            data_dir: dir.path().to_path_buf(),
            token: TokenConfig::new(
                SecretString::from(TEST_SIGNING_KEY),
                TEST_ISSUER,
                Duration::from_secs(24 * 60 * 60),
            )
            .unwrap(),
            unique_usernames,
            password_cost: PasswordCost::minimal(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::with_verifier(&config, verifier).unwrap();
        let router = routes::app(state.clone());

        Self { dir, state, router }
    }

    /// The data directory backing this app.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// The shared state, for assertions against the collections.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Send a request and decode the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    /// `GET` without a token.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    /// `POST` a JSON body without a token.
    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    /// Register a customer and return the response.
    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/api/customers",
            &serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Log in and return the session token.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/login",
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.body["token"]
            .as_str()
            .map(ToOwned::to_owned)
            .unwrap_or_default()
    }
}
