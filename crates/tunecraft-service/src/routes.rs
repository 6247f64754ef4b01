//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{credits, generate, health, pages};
use crate::session::session_middleware;
use crate::state::AppState;

/// Maximum concurrent requests per generation endpoint.
/// Provider calls hold a request open until the remote job finishes.
const GENERATION_MAX_CONCURRENT_REQUESTS: usize = 32;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Session (cookie issued on first request)
/// - `GET /` - Landing page
/// - `GET /credits` - Current balance
/// - `POST /reward` - Add reward credits
///
/// ## Generation (session, concurrency-limited)
/// - `POST /generate` - Text to music
/// - `POST /remix` - Uploaded melody plus text to music
/// - `POST /video` - Text to video
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let generation_routes = Router::new()
        .route("/generate", post(generate::generate_music))
        .route("/remix", post(generate::remix_music))
        .route("/video", post(generate::generate_video))
        .layer(ConcurrencyLimitLayer::new(GENERATION_MAX_CONCURRENT_REQUESTS));

    let router = Router::new()
        .route("/", get(pages::index))
        .route("/credits", get(credits::get_credits))
        .route("/reward", post(credits::reward))
        .merge(generation_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        // Health (public, no session)
        .route("/health", get(health::health))
        // Global middleware. Extractors enforce the body limit so that
        // oversized bodies surface as JSON 413s.
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let router = match request_timeout_seconds {
        Some(secs) => router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(Duration::from_secs(secs))),
        ),
        None => router,
    };

    router.with_state(state)
}

/// Turn middleware errors into JSON error responses.
async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    }
}
