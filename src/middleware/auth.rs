use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

/// Middleware that checks the shared-secret token header on every request.
///
/// A missing header, an empty value or a mismatch ends the request with a bare
/// 401; the wrapped handler never runs. A matching value passes the request on
/// untouched.
pub async fn auth_middleware(State(auth): State<Arc<AuthConfig>>, req: Request, next: Next) -> Response {
    if !is_authorized(req.headers(), &auth) {
        tracing::warn!("rejected {} {}: missing or invalid {} header", req.method(), req.uri().path(), auth.header);
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(req).await
}

/// True when the configured header carries exactly the configured token.
pub fn is_authorized(headers: &HeaderMap, auth: &AuthConfig) -> bool {
    let provided = match headers.get(auth.header.as_str()) {
        Some(value) if !value.is_empty() => value.as_bytes(),
        _ => return false,
    };
    // Constant-time comparison; unequal lengths compare unequal
    provided.ct_eq(auth.token.as_bytes()).into()
}
