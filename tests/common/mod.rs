#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

use movie_watchlist_api::config::AppConfig;
use movie_watchlist_api::database::MemoryStore;
use movie_watchlist_api::services::{Notifier, OutgoingEmail, RecordingMailer};
use movie_watchlist_api::{app, AppState};

pub const PASSWORD: &str = "secret123";

/// Full application served on an ephemeral port over the in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub mail: UnboundedReceiver<OutgoingEmail>,
}

/// A registered account and its bearer token
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_rate_limiting = false;
    config
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let mut config = test_config();
        configure(&mut config);

        let store = Arc::new(MemoryStore::new());
        let (mailer, mail) = RecordingMailer::new();
        let state = AppState::new(store.clone(), Notifier::new(Arc::new(mailer)), config);

        let listener = TcpListener::bind("127.0.0.1:0").await.context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let service = app(state).into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            store,
            mail,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the JSON body (`Null` when there is none)
    pub async fn send(&self, method: Method, path: &str, token: Option<&str>, body: Option<&Value>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, token, Some(&body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, token, Some(&body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, token, None).await
    }

    pub async fn register(&self, name: &str, email: &str) -> Result<TestUser> {
        self.register_with(json!({ "name": name, "email": email, "password": PASSWORD })).await
    }

    pub async fn register_with(&self, payload: Value) -> Result<TestUser> {
        let (status, body) = self.post("/api/auth/register", None, payload).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);

        Ok(TestUser {
            id: body["data"]["user"]["id"].as_str().context("missing user id")?.to_string(),
            email: body["data"]["user"]["email"].as_str().context("missing email")?.to_string(),
            token: body["data"]["token"].as_str().context("missing token")?.to_string(),
        })
    }

    /// Create a movie and return its JSON representation
    pub async fn add_movie(&self, user: &TestUser, movie: Value) -> Result<Value> {
        let (status, body) = self.post("/api/movies", Some(&user.token), movie).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create movie failed: {} {}", status, body);
        Ok(body["data"]["movie"].clone())
    }

    pub async fn next_email(&mut self) -> Result<OutgoingEmail> {
        tokio::time::timeout(Duration::from_secs(2), self.mail.recv())
            .await
            .context("timed out waiting for email")?
            .context("mailer channel closed")
    }

    /// Give detached notification tasks a chance to run, then check nothing was sent
    pub async fn assert_no_email(&mut self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Ok(email) = self.mail.try_recv() {
            panic!("unexpected email: {} to {}", email.subject, email.to);
        }
    }
}
