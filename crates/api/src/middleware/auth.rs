//! Authentication middleware.
//!
//! Requires a valid bearer JWT on protected routes.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::extractors::ProfileAuth;

/// Middleware that requires JWT authentication.
///
/// The verified identity is stored in request extensions, where the rate
/// limiter and the [`ProfileAuth`] extractor pick it up.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    match ProfileAuth::from_parts(&parts, &state.jwt) {
        Ok(auth) => {
            tracing::Span::current().record("profile_id", tracing::field::display(auth.profile_id));
            parts.extensions.insert(auth);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(err) => err.into_response(),
    }
}
