//! Database access layer for spindle-as
//!
//! SQLite via sqlx. The albums table is created on startup if missing;
//! review counters live on the album row and only ever move upward.

use spindle_common::Result;
use sqlx::sqlite::SqlitePool;
use tracing::info;

mod albums;

pub use albums::{AlbumStore, SqliteStore};

/// Connect to the database named by `url` (e.g.
/// `sqlite://spindle.db?mode=rwc`, or `sqlite::memory:` in tests).
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let pool = SqlitePool::connect(url).await?;
    Ok(pool)
}

/// Create the albums table if it does not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            album_id TEXT PRIMARY KEY,
            artist TEXT NOT NULL,
            title TEXT NOT NULL,
            year TEXT NOT NULL,
            image TEXT NOT NULL,
            like_count INTEGER NOT NULL DEFAULT 0,
            dislike_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("database schema ready");
    Ok(())
}
