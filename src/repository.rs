//! Customer repository: one call-through per storage operation plus error classification.
//!
//! Handlers and the cleanup scheduler depend on [`CustomerRepository`] only, so
//! the SQLite-backed [`Repository`] can be swapped for a test double.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::store::CustomerStore;
use crate::types::{Customer, NewCustomer};

/// Error texts treated as uniqueness violations when the driver does not flag them.
///
/// SQLite reports `UNIQUE constraint failed: customers.email, ...`; the PostgreSQL
/// wording is kept for databases reached through the same driver.
pub const DUPLICATE_KEY_MARKERS: [&str; 2] =
    ["UNIQUE constraint failed", "duplicate key value violates unique constraint"];

/// The error vocabulary handlers branch on.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("duplicate key value for customer index: {0}")]
    DuplicateKey(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {op}: {message}")]
    Storage { op: &'static str, message: String },
}

impl RepoError {
    /// Classifies a raw driver error raised while running `op`.
    pub fn classify(op: &'static str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::DuplicateKey(db_err.message().to_string())
            }
            other => {
                let message = other.to_string();
                if DUPLICATE_KEY_MARKERS.iter().any(|m| message.contains(m)) {
                    RepoError::DuplicateKey(message)
                } else {
                    RepoError::Storage { op, message }
                }
            }
        }
    }

    #[cfg(test)]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, RepoError::DuplicateKey(_))
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Applies the table shape. Failure here is fatal at startup.
    async fn migrate(&self) -> RepoResult<()>;

    /// Stores a validated candidate and returns the stored row.
    async fn create(&self, customer: NewCustomer) -> RepoResult<Customer>;

    async fn first(&self, id: i64) -> RepoResult<Customer>;

    async fn find(&self) -> RepoResult<Vec<Customer>>;

    /// Soft-deletes by id. Unknown or already deleted ids are not an error.
    async fn delete(&self, id: i64) -> RepoResult<u64>;

    async fn delete_old(&self, max_age_secs: u64) -> RepoResult<u64>;

    async fn delete_by_mailing_id(&self, mailing_id: i64) -> RepoResult<u64>;
}

/// [`CustomerRepository`] over any [`CustomerStore`].
pub struct Repository<S> {
    store: Arc<S>,
    unique_customers: bool,
    timeout: Duration,
}

impl<S: CustomerStore> Repository<S> {
    pub fn new(store: S, unique_customers: bool, timeout: Duration) -> Self {
        Self { store: Arc::new(store), unique_customers, timeout }
    }

    async fn run<T, F>(&self, op: &'static str, fut: F) -> RepoResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(|e| RepoError::classify(op, e)),
            Err(_) => Err(RepoError::Storage {
                op,
                message: format!("timed out after {}ms", self.timeout.as_millis()),
            }),
        }
    }
}

#[async_trait]
impl<S: CustomerStore + 'static> CustomerRepository for Repository<S> {
    async fn migrate(&self) -> RepoResult<()> {
        self.run("migrate", self.store.ensure_schema(self.unique_customers)).await
    }

    async fn create(&self, customer: NewCustomer) -> RepoResult<Customer> {
        self.run("create", self.store.create(&customer)).await
    }

    async fn first(&self, id: i64) -> RepoResult<Customer> {
        self.run("first", self.store.read_one(id)).await
    }

    async fn find(&self) -> RepoResult<Vec<Customer>> {
        self.run("find", self.store.read_all()).await
    }

    async fn delete(&self, id: i64) -> RepoResult<u64> {
        self.run("delete", self.store.delete_one(id)).await
    }

    async fn delete_old(&self, max_age_secs: u64) -> RepoResult<u64> {
        self.run("delete old", self.store.delete_by_age(max_age_secs)).await
    }

    async fn delete_by_mailing_id(&self, mailing_id: i64) -> RepoResult<u64> {
        self.run("delete by mailing id", self.store.delete_by_group_tag(mailing_id)).await
    }
}
