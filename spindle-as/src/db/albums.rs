//! Album persistence
//!
//! `AlbumStore` is the seam between the pipeline and whatever holds the
//! album records; `SqliteStore` is the sqlx-backed implementation. The
//! verdict update is a single atomic `UPDATE ... SET c = c + 1`, so two
//! workers applying verdicts to the same album can never lose an increment
//! the way a read-modify-write would.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spindle_common::{Album, NewAlbum, Result, Verdict};
use sqlx::sqlite::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Entity store operations the pipeline needs
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Register a new album. Assigns its UUID; counters start at zero.
    async fn insert(&self, album: NewAlbum) -> Result<Album>;

    /// Fetch an album record by id
    async fn get(&self, album_id: Uuid) -> Result<Option<Album>>;

    /// Atomically increment the counter matching `verdict`.
    ///
    /// Returns `false` when no album with that id exists (nothing mutated).
    async fn apply_verdict(&self, album_id: Uuid, verdict: Verdict) -> Result<bool>;
}

/// SQLite-backed album store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Row tuple in column order: album_id, artist, title, year, image,
/// like_count, dislike_count, created_at
type AlbumRow = (String, String, String, String, String, i64, i64, String);

fn album_from_row(row: AlbumRow) -> Result<Album> {
    let album_id = Uuid::parse_str(&row.0)
        .map_err(|e| spindle_common::Error::Internal(format!("corrupt album_id in store: {}", e)))?;
    let created_at = DateTime::parse_from_rfc3339(&row.7)
        .map_err(|e| spindle_common::Error::Internal(format!("corrupt created_at in store: {}", e)))?
        .with_timezone(&Utc);

    Ok(Album {
        album_id,
        artist: row.1,
        title: row.2,
        year: row.3,
        image: row.4,
        like_count: row.5,
        dislike_count: row.6,
        created_at,
    })
}

#[async_trait]
impl AlbumStore for SqliteStore {
    async fn insert(&self, album: NewAlbum) -> Result<Album> {
        let album_id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO albums (album_id, artist, title, year, image, like_count, dislike_count, created_at)
            VALUES (?, ?, ?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(album_id.to_string())
        .bind(&album.artist)
        .bind(&album.title)
        .bind(&album.year)
        .bind(&album.image)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(%album_id, artist = %album.artist, title = %album.title, "registered album");

        Ok(Album {
            album_id,
            artist: album.artist,
            title: album.title,
            year: album.year,
            image: album.image,
            like_count: 0,
            dislike_count: 0,
            created_at,
        })
    }

    async fn get(&self, album_id: Uuid) -> Result<Option<Album>> {
        let row = sqlx::query_as::<_, AlbumRow>(
            r#"
            SELECT album_id, artist, title, year, image, like_count, dislike_count, created_at
            FROM albums WHERE album_id = ?
            "#,
        )
        .bind(album_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(album_from_row).transpose()
    }

    async fn apply_verdict(&self, album_id: Uuid, verdict: Verdict) -> Result<bool> {
        // Column names cannot be bound, so each verdict gets its own
        // prepared statement.
        let sql = match verdict {
            Verdict::Like => "UPDATE albums SET like_count = like_count + 1 WHERE album_id = ?",
            Verdict::Dislike => {
                "UPDATE albums SET dislike_count = dislike_count + 1 WHERE album_id = ?"
            }
        };

        let result = sqlx::query(sql)
            .bind(album_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
