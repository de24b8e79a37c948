//! Storage adapter: the thin layer that talks to SQLite.
//!
//! Errors are returned exactly as the driver produced them; classification
//! happens one layer up in [`crate::repository`].

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::types::{Customer, NewCustomer};

const COLUMNS: &str = "id, email, title, content, mailing_id, created_at, updated_at, deleted_at";
const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%SZ','now')";

/// Raw row operations on the customer table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Applies the table shape, including the optional uniqueness index.
    async fn ensure_schema(&self, unique_customers: bool) -> Result<(), sqlx::Error>;

    /// Inserts a row and returns it as stored.
    async fn create(&self, customer: &NewCustomer) -> Result<Customer, sqlx::Error>;

    /// Fetches a live row; `sqlx::Error::RowNotFound` when there is none.
    async fn read_one(&self, id: i64) -> Result<Customer, sqlx::Error>;

    async fn read_all(&self) -> Result<Vec<Customer>, sqlx::Error>;

    /// Soft-deletes one row, returning the number of rows marked.
    async fn delete_one(&self, id: i64) -> Result<u64, sqlx::Error>;

    /// Soft-deletes live rows created more than `max_age_secs` seconds ago.
    async fn delete_by_age(&self, max_age_secs: u64) -> Result<u64, sqlx::Error>;

    /// Soft-deletes live rows carrying the given mailing id.
    async fn delete_by_group_tag(&self, mailing_id: i64) -> Result<u64, sqlx::Error>;
}

#[derive(Clone)]
pub struct SqliteCustomerStore {
    pool: SqlitePool,
}

impl SqliteCustomerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for SqliteCustomerStore {
    async fn ensure_schema(&self, unique_customers: bool) -> Result<(), sqlx::Error> {
        crate::db::init_db(&self.pool, unique_customers).await
    }

    async fn create(&self, customer: &NewCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (email, title, content, mailing_id) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
            COLUMNS
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&customer.email)
            .bind(&customer.title)
            .bind(&customer.content)
            .bind(customer.mailing_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn read_one(&self, id: i64) -> Result<Customer, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE id = ?1 AND deleted_at IS NULL", COLUMNS);
        sqlx::query_as::<_, Customer>(&query).bind(id).fetch_one(&self.pool).await
    }

    async fn read_all(&self) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE deleted_at IS NULL ORDER BY id", COLUMNS);
        sqlx::query_as::<_, Customer>(&query).fetch_all(&self.pool).await
    }

    async fn delete_one(&self, id: i64) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET deleted_at = {now}, updated_at = {now} WHERE id = ?1 AND deleted_at IS NULL",
            now = NOW
        );
        let res = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected())
    }

    async fn delete_by_age(&self, max_age_secs: u64) -> Result<u64, sqlx::Error> {
        // ISO timestamps compare lexicographically
        let query = format!(
            "UPDATE customers SET deleted_at = {now}, updated_at = {now} \
             WHERE deleted_at IS NULL AND created_at < strftime('%Y-%m-%dT%H:%M:%SZ','now', ?1)",
            now = NOW
        );
        let res = sqlx::query(&query)
            .bind(format!("-{} seconds", max_age_secs))
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn delete_by_group_tag(&self, mailing_id: i64) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET deleted_at = {now}, updated_at = {now} WHERE mailing_id = ?1 AND deleted_at IS NULL",
            now = NOW
        );
        let res = sqlx::query(&query).bind(mailing_id).execute(&self.pool).await?;
        Ok(res.rows_affected())
    }
}
