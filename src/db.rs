// File: src/db.rs
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    date DATE NOT NULL,
    time TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const MEMORY_URL: &str = "sqlite::memory:";

/// Opens (creating if needed) the database at `url` and makes sure the schema exists.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    // Every pooled connection to ":memory:" would get its own empty database.
    let max_connections = if url.contains(":memory:") { 1 } else { 4 };

    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    debug!(url, "database ready");
    Ok(pool)
}

pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    connect(MEMORY_URL).await
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
