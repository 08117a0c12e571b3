//! Router-wide layers: request tracing, CORS and per-IP rate limiting

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::Config;
use crate::state::AppState;

/// Per-IP quota: `burst` requests, one slot refilled every `refill_secs`
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub refill_secs: u64,
    pub burst: u32,
}

/// Registration: 5 per hour
pub const REGISTER_LIMIT: RateLimit = RateLimit {
    refill_secs: 720,
    burst: 5,
};

/// Login: 10 per minute
pub const LOGIN_LIMIT: RateLimit = RateLimit {
    refill_secs: 6,
    burst: 10,
};

/// Wrap `router` in a per-IP rate limiter when rate limiting is enabled.
///
/// Clients are keyed on the socket peer address, so the server must be run
/// with `into_make_service_with_connect_info::<SocketAddr>()`. Forwarding
/// headers are ignored.
pub fn rate_limited(
    router: Router<AppState>,
    limit: RateLimit,
    config: &Config,
) -> Router<AppState> {
    if !config.rate_limit_enabled {
        return router;
    }

    let governor = GovernorConfigBuilder::default()
        .per_second(limit.refill_secs)
        .burst_size(limit.burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish();

    match governor {
        Some(governor) => router.layer(GovernorLayer::new(Arc::new(governor))),
        None => {
            tracing::warn!(?limit, "Invalid rate limit quota, route left unlimited");
            router
        }
    }
}

/// Apply tracing and CORS to the whole application
pub fn apply_middleware(router: Router, config: &Config) -> Router {
    router
        // CORS (innermost)
        .layer(cors_layer(config))
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
