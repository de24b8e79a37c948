use axum::{http::StatusCode, response::IntoResponse};

// Liveness check; still behind the auth gate like every other route
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}
