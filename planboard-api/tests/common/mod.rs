//! Common test utilities for integration tests
//!
//! Builds the real router over an [`InMemoryStore`] and a mailer that keeps
//! every message, so the tests run without Postgres or a mail relay.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use planboard_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, MailConfig, PasswordConfig},
    mail::{EmailMessage, MailError, Mailer},
};
use planboard_shared::store::InMemoryStore;
use serde_json::{json, Value};
use tower::Service as _;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const APP_BASE_URL: &str = "http://localhost:3000";
pub const PASSWORD: &str = "correct horse battery";

/// Mailer that records instead of sending
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![APP_BASE_URL.to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        // cheapest Argon2id parameters; hashing cost is not under test
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        mail: MailConfig {
            from: "no-reply@planboard.local".to_string(),
            relay_url: None,
            relay_token: None,
            app_base_url: APP_BASE_URL.to_string(),
        },
    }
}

/// Response status and parsed JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// Test context containing the router and its collaborators
pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(store.clone(), mailer.clone(), test_config());

        Self {
            app: build_router(state),
            store,
            mailer,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Signs up `username` with [`PASSWORD`] and returns the account JSON
    pub async fn sign_up(&self, username: &str) -> Value {
        let response = self
            .post(
                "/api/users/create",
                None,
                json!({
                    "firstName": "Dan",
                    "lastName": "Neri",
                    "email": format!("{}@example.com", username),
                    "username": username,
                    "password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Signs up and signs in; returns the user id and an access token
    pub async fn signed_in_user(&self, username: &str) -> (Uuid, String) {
        let account = self.sign_up(username).await;
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        let id = account["id"].as_str().unwrap().parse().unwrap();
        let token = response.body["access_token"].as_str().unwrap().to_string();
        (id, token)
    }

    /// Creates a project and returns its tree
    pub async fn create_project(&self, token: &str, title: &str) -> Value {
        let response = self
            .post("/api/projects/create", Some(token), json!({ "title": title }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }

    /// Creates a list in `project_id` and returns the project's lists
    pub async fn create_list(&self, token: &str, project_id: &str, title: &str) -> Value {
        let response = self
            .post(
                "/api/lists/create",
                Some(token),
                json!({ "projectID": project_id, "title": title }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}

/// `id` field of a JSON object
pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// `id`s of a JSON array, in order
pub fn ids(values: &Value) -> Vec<String> {
    values.as_array().unwrap().iter().map(id_of).collect()
}

/// `position`s of a JSON array, in order
pub fn positions(values: &Value) -> Vec<i64> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["position"].as_i64().unwrap())
        .collect()
}
