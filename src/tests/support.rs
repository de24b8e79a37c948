#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::{AppConfig, DatabaseConfig};
use crate::repository::CustomerRepository;
use crate::state::AppState;
use crate::types::Customer;

pub const TOKEN_HEADER: &str = "X-Token";
pub const TOKEN: &str = "test";
pub const REQUEST_ID_HEADER: &str = "X-RequestID";

pub fn test_config() -> AppConfig {
    AppConfig::default()
}

pub fn app(repo: Arc<dyn CustomerRepository>) -> axum::Router {
    crate::routes::router(AppState::new(repo, test_config()))
}

pub fn db_config(dir: &TempDir, unique_customers: bool) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("clients.db").display()),
        max_connections: 1,
        query_timeout_ms: 5000,
        unique_customers,
    }
}

/// Opens a fresh SQLite file with the customer schema applied.
///
/// The `TempDir` must outlive the pool.
pub async fn setup_test_db(unique_customers: bool) -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = crate::db::connect(&db_config(&dir, unique_customers)).await.unwrap();
    crate::db::init_db(&pool, unique_customers).await.unwrap();
    (pool, dir)
}

pub fn customer(id: i64, email: &str, title: &str, content: &str, mailing_id: i64) -> Customer {
    Customer {
        id,
        email: email.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        mailing_id,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        deleted_at: None,
    }
}

/// Builds a request carrying the given headers and, optionally, a JSON body.
pub fn request(method: Method, uri: &str, body: Option<&str>, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = match body {
        Some(json) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    req.unwrap()
}

pub fn authed(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
    request(method, uri, body, &[(TOKEN_HEADER, TOKEN)])
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// In-memory log sink for asserting on emitted log lines.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines containing `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents().lines().filter(|l| l.contains(needle)).map(str::to_string).collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes this thread's log output into a buffer until the guard drops.
///
/// `#[tokio::test]` runs on a single thread, so everything the router logs lands here.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
