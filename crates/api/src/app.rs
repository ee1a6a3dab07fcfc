use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{get, post, put},
    BoxError, Router,
};
use domain::Store;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{devices, health, homes, profiles, register};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Builds the router. Fails only when the configured JWT keys cannot be
/// parsed.
pub fn create_app(config: Config, store: Arc<dyn Store>) -> Result<Router, JwtError> {
    let config = Arc::new(config);

    let jwt = Arc::new(JwtConfig::with_leeway(
        &config.jwt.private_key,
        &config.jwt.public_key,
        config.jwt.access_token_expiry_secs,
        config.jwt.leeway_secs,
    )?);

    // Create rate limiter if rate limiting is enabled (rate_limit_per_minute > 0)
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        store,
        config: config.clone(),
        jwt,
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Protected routes (require a bearer JWT)
    // Middleware order: auth runs first, then rate limiting (which needs the profile id)
    let protected_routes = Router::new()
        .route("/api/v1/profile", get(profiles::get_profile))
        .route(
            "/api/v1/profiles/:profile_id/tokens",
            post(profiles::rotate_api_token),
        )
        .route(
            "/api/v1/homes",
            get(homes::list_homes).post(homes::create_home),
        )
        .route(
            "/api/v1/homes/:home_id",
            put(homes::update_home).delete(homes::delete_home),
        )
        .route(
            "/api/v1/homes/:home_id/rooms",
            get(homes::list_rooms).post(homes::add_room),
        )
        .route(
            "/api/v1/homes/:home_id/rooms/:room_id",
            put(homes::update_room).delete(homes::delete_room),
        )
        .route("/api/v1/devices", get(devices::list_devices))
        .route(
            "/api/v1/devices/:device_id",
            put(devices::assign_device).delete(devices::delete_device),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Devices authenticate with the API token in the body
    let registration_routes =
        Router::new().route("/api/v1/register", post(register::register_device));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(registration_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(config.server.request_timeout_secs)),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}

/// Maps errors from the timeout layer to the JSON error body.
pub async fn handle_timeout_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::ServiceUnavailable("request timed out".into())
    } else {
        ApiError::Internal(format!("unhandled middleware error: {}", err))
    }
}
