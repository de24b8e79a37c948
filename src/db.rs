use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};

use crate::config::DatabaseConfig;

/// Name of the optional uniqueness index over live customer rows.
pub const UNIQUE_INDEX: &str = "idx_customers_unique_live";

/// Creates the SQLite file if needed and opens a pool against it.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    crate::config::ensure_sqlite_parent_dir(&cfg.url)?;
    if !Sqlite::database_exists(&cfg.url).await.unwrap_or(false) {
        tracing::info!("Creating SQLite database at {}", cfg.url);
        Sqlite::create_database(&cfg.url).await?;
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&cfg.url)
        .await?;
    Ok(pool)
}

/// Brings the `customers` table in line with the customer shape.
///
/// With `unique_customers` the `(email, title, content, mailing_id)` tuple is unique
/// among rows that are not soft-deleted; without it the index is dropped.
pub async fn init_db(pool: &SqlitePool, unique_customers: bool) -> Result<(), sqlx::Error> {
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }

    // AUTOINCREMENT keeps ids from ever being reused
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            mailing_id INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            deleted_at TEXT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_customers_deleted_at ON customers(deleted_at)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_customers_mailing_id ON customers(mailing_id)")
        .execute(pool)
        .await?;

    if unique_customers {
        let query = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON customers(email, title, content, mailing_id) WHERE deleted_at IS NULL",
            UNIQUE_INDEX
        );
        sqlx::query(&query).execute(pool).await?;
    } else {
        sqlx::query(&format!("DROP INDEX IF EXISTS {}", UNIQUE_INDEX)).execute(pool).await?;
    }

    Ok(())
}
