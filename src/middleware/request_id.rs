use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::config::TracingConfig;

/// Stamps every request with a correlation id.
///
/// A caller-supplied id is kept as is. Otherwise a random UUID
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`) is generated and written into the
/// request headers, so handlers read the same value either way. The id is also
/// echoed on the response.
pub async fn request_id_middleware(
    State(cfg): State<Arc<TracingConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = match HeaderName::from_bytes(cfg.header.as_bytes()) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("invalid correlation id header name {:?}: {}", cfg.header, e);
            return next.run(req).await;
        }
    };

    let supplied = req.headers().get(&header).filter(|v| !v.is_empty()).cloned();
    let value = match supplied {
        Some(v) => v,
        None => {
            // A hyphenated UUID is always a valid header value
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            req.headers_mut().insert(header.clone(), generated.clone());
            generated
        }
    };

    // Header values may carry opaque bytes; keep what is readable
    let id = String::from_utf8_lossy(value.as_bytes()).into_owned();
    let ts = chrono::Utc::now().format("%a %b %e %H:%M:%S UTC %Y");
    tracing::info!("{} - {}", ts, id);

    // Handlers read the id through the `RequestId` extractor
    req.extensions_mut().insert(RequestId(id));

    let mut res = next.run(req).await;
    res.headers_mut().insert(header, value);
    res
}

/// The correlation id of the current request.
///
/// Empty when the request did not pass through [`request_id_middleware`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RequestId>().cloned().unwrap_or_default())
    }
}
