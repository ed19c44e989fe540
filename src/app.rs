use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Datastore;
use crate::handlers::{self, protected, public};
use crate::middleware::{normalize_errors, rate_limit, require_auth, RateLimiter};
use crate::services::Notifier;

/// Shared, read-only application context handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub tokens: TokenService,
    pub notifier: Notifier,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>, notifier: Notifier, config: AppConfig) -> Self {
        Self {
            store,
            tokens: TokenService::from_config(&config.security),
            notifier,
            config: Arc::new(config),
        }
    }
}

/// Build the complete HTTP application
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()));

    let mut router = Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes));

    if state.config.api.enable_rate_limiting {
        let limiter = RateLimiter::new(
            state.config.api.rate_limit_requests,
            Duration::from_secs(state.config.api.rate_limit_window_secs),
        );
        router = router.layer(from_fn_with_state(limiter, rate_limit));
    }

    router
        .layer(from_fn_with_state(state.clone(), normalize_errors))
        .layer(
            // Outermost first
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("cross-origin-resource-policy"),
                    HeaderValue::from_static("same-origin"),
                ))
                .layer(cors_layer(&state.config.security.cors_origins)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/health", get(public::health_get))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, movies};

    Router::new()
        .route("/auth/profile", get(auth::profile_get))
        .route("/movies", get(movies::movies_get).post(movies::movie_post))
        // Static segment wins over the :id capture
        .route("/movies/stats", get(movies::stats_get))
        .route(
            "/movies/:id",
            get(movies::movie_get).put(movies::movie_put).delete(movies::movie_delete),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
