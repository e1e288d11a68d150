// SQLite-backed registry store for persistent moderation data.
//
// Tables:
// - registry_meta: Deployment metadata (the owner)
// - contents: Submitted content records
// - reports: Filed reports
// - content_reporters: (content_id, reporter) pairs, one report each
// - moderators: Current moderator set

use crate::core::registry::{
    Content, ContentStatus, Identity, RegistryError, RegistryStore, Report,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::time::Duration;

const OWNER_KEY: &str = "owner";

fn storage_error(e: sqlx::Error) -> RegistryError {
    RegistryError::StorageError(e.to_string())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RegistryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RegistryError::StorageError(format!("bad timestamp {raw:?}: {e}")))
}

fn content_from_row(row: &SqliteRow) -> Result<Content, RegistryError> {
    let status: String = row.get("status");
    let status = status
        .parse::<ContentStatus>()
        .map_err(|e| RegistryError::StorageError(e.to_string()))?;
    let timestamp: String = row.get("timestamp");

    Ok(Content {
        id: row.get::<i64, _>("id") as u64,
        author: row.get::<i64, _>("author") as u64,
        content_hash: row.get("content_hash"),
        timestamp: parse_timestamp(&timestamp)?,
        is_active: row.get("is_active"),
        report_count: row.get::<i64, _>("report_count") as u32,
        status,
    })
}

fn report_from_row(row: &SqliteRow) -> Result<Report, RegistryError> {
    let timestamp: String = row.get("timestamp");

    Ok(Report {
        id: row.get::<i64, _>("id") as u64,
        content_id: row.get::<i64, _>("content_id") as u64,
        reporter: row.get::<i64, _>("reporter") as u64,
        reason: row.get("reason"),
        timestamp: parse_timestamp(&timestamp)?,
        is_processed: row.get("is_processed"),
    })
}

pub struct SqliteRegistryStore {
    pool: Pool<Sqlite>,
}

impl SqliteRegistryStore {
    /// Open (creating if needed) the database at `database_url` and migrate it.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let path_str = database_url.trim_start_matches("sqlite://");
        let in_memory = database_url.contains(":memory:");
        if !in_memory && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        // Every connection to ":memory:" opens its own empty database, so keep
        // exactly one and never recycle it.
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = options.connect(&conn_str).await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), RegistryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS registry_meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contents (
                id INTEGER PRIMARY KEY,
                author INTEGER NOT NULL,
                content_hash TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                report_count INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'Active'
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY,
                content_id INTEGER NOT NULL REFERENCES contents(id),
                reporter INTEGER NOT NULL,
                reason TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                is_processed BOOLEAN NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_reporters (
                content_id INTEGER NOT NULL,
                reporter INTEGER NOT NULL,
                PRIMARY KEY (content_id, reporter)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS moderators (
                identity INTEGER PRIMARY KEY
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}

#[async_trait]
impl RegistryStore for SqliteRegistryStore {
    async fn get_owner(&self) -> Result<Option<Identity>, RegistryError> {
        let row = sqlx::query("SELECT value FROM registry_meta WHERE key = ?")
            .bind(OWNER_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(|r| r.get::<i64, _>("value") as u64))
    }

    async fn set_owner(&self, owner: Identity) -> Result<(), RegistryError> {
        sqlx::query(
            r#"
            INSERT INTO registry_meta (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value
            "#,
        )
        .bind(OWNER_KEY)
        .bind(owner as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn content_count(&self) -> Result<u64, RegistryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM contents")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn report_count(&self) -> Result<u64, RegistryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM reports")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn get_content(&self, content_id: u64) -> Result<Option<Content>, RegistryError> {
        let row = sqlx::query("SELECT * FROM contents WHERE id = ?")
            .bind(content_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(content_from_row).transpose()
    }

    async fn get_report(&self, report_id: u64) -> Result<Option<Report>, RegistryError> {
        let row = sqlx::query("SELECT * FROM reports WHERE id = ?")
            .bind(report_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn has_reported(
        &self,
        content_id: u64,
        reporter: Identity,
    ) -> Result<bool, RegistryError> {
        let row = sqlx::query(
            "SELECT 1 FROM content_reporters WHERE content_id = ? AND reporter = ?",
        )
        .bind(content_id as i64)
        .bind(reporter as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.is_some())
    }

    async fn is_moderator(&self, identity: Identity) -> Result<bool, RegistryError> {
        let row = sqlx::query("SELECT 1 FROM moderators WHERE identity = ?")
            .bind(identity as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.is_some())
    }

    async fn list_moderators(&self) -> Result<Vec<Identity>, RegistryError> {
        let rows = sqlx::query("SELECT identity FROM moderators")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        // Ids above i64::MAX are stored negative, so sort after casting back
        let mut moderators: Vec<Identity> = rows
            .iter()
            .map(|r| r.get::<i64, _>("identity") as u64)
            .collect();
        moderators.sort_unstable();
        Ok(moderators)
    }

    async fn insert_content(&self, content: Content) -> Result<(), RegistryError> {
        sqlx::query(
            r#"
            INSERT INTO contents (id, author, content_hash, timestamp, is_active, report_count, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(content.id as i64)
        .bind(content.author as i64)
        .bind(&content.content_hash)
        .bind(content.timestamp.to_rfc3339())
        .bind(content.is_active)
        .bind(content.report_count as i64)
        .bind(content.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn record_report(&self, report: Report, content: Content) -> Result<(), RegistryError> {
        // Dropping the transaction on an early return rolls everything back.
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query(
            r#"
            INSERT INTO reports (id, content_id, reporter, reason, timestamp, is_processed)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(report.id as i64)
        .bind(report.content_id as i64)
        .bind(report.reporter as i64)
        .bind(&report.reason)
        .bind(report.timestamp.to_rfc3339())
        .bind(report.is_processed)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        sqlx::query("INSERT INTO content_reporters (content_id, reporter) VALUES (?, ?)")
            .bind(report.content_id as i64)
            .bind(report.reporter as i64)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        sqlx::query(
            "UPDATE contents SET report_count = ?, status = ?, is_active = ? WHERE id = ?",
        )
        .bind(content.report_count as i64)
        .bind(content.status.as_str())
        .bind(content.is_active)
        .bind(content.id as i64)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn update_content(&self, content: Content) -> Result<(), RegistryError> {
        let result = sqlx::query(
            "UPDATE contents SET report_count = ?, status = ?, is_active = ? WHERE id = ?",
        )
        .bind(content.report_count as i64)
        .bind(content.status.as_str())
        .bind(content.is_active)
        .bind(content.id as i64)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::StorageError(format!(
                "content {} was never inserted",
                content.id
            )));
        }
        Ok(())
    }

    async fn set_moderator(&self, identity: Identity, enabled: bool) -> Result<(), RegistryError> {
        let query = if enabled {
            "INSERT OR IGNORE INTO moderators (identity) VALUES (?)"
        } else {
            "DELETE FROM moderators WHERE identity = ?"
        };

        sqlx::query(query)
            .bind(identity as i64)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
