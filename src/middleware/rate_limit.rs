use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;

use crate::error::ApiError;

const RATE_LIMITED: &str = "Too many requests from this IP, please try again later.";

/// Idle clients are swept once the table grows past this many entries
const SWEEP_THRESHOLD: usize = 10_000;

/// Sliding-window log limiter keyed by client address
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests as usize,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request; on rejection returns how long until the oldest hit leaves the window
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut clients = self.clients.lock().await;

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, hits| hits.back().is_some_and(|last| now.duration_since(*last) < window));
        }

        let hits = clients.entry(key.to_string()).or_default();
        while hits.front().is_some_and(|first| now.duration_since(*first) >= self.window) {
            hits.pop_front();
        }

        if hits.len() >= self.max_requests {
            let retry_after = hits
                .front()
                .map(|first| self.window.saturating_sub(now.duration_since(*first)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        hits.push_back(now);
        Ok(())
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request);

    if let Err(retry_after) = limiter.check(&key).await {
        tracing::warn!("Rate limit exceeded for {}", key);
        // Round up so clients never retry a moment too early
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        return Err(ApiError::too_many_requests(RATE_LIMITED, secs.max(1)));
    }

    Ok(next.run(request).await)
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
