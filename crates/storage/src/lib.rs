use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{ClaimId, RevealCount};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredReveal {
    pub token: String,
    pub prize: i64,
    pub reveal_count: RevealCount,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClaim {
    pub reveal_token: String,
    pub name: String,
    pub phone: String,
    pub kseb_consumer: String,
    pub kseb_phone: String,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct StoredClaim {
    pub claim_id: ClaimId,
    pub reveal_token: String,
    pub name: String,
    pub phone: String,
    pub kseb_consumer: String,
    pub kseb_phone: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reveal_counter (
                id    INTEGER PRIMARY KEY CHECK (id = 1),
                count INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure reveal_counter table exists")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reveals (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                token        TEXT NOT NULL UNIQUE,
                prize        INTEGER NOT NULL,
                reveal_count INTEGER NOT NULL,
                issued_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure reveals table exists")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS claims (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                reveal_token  TEXT NOT NULL,
                name          TEXT NOT NULL,
                phone         TEXT NOT NULL,
                kseb_consumer TEXT NOT NULL,
                kseb_phone    TEXT NOT NULL,
                location      TEXT NOT NULL,
                created_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure claims table exists")?;

        Ok(())
    }

    /// Increments and returns the shared reveal counter. The counter is a
    /// single row so concurrent reveals serialize on the upsert.
    pub async fn next_reveal_count(&self) -> Result<RevealCount> {
        let rec = sqlx::query(
            "INSERT INTO reveal_counter (id, count) VALUES (1, 1)
             ON CONFLICT(id) DO UPDATE SET count = count + 1
             RETURNING count",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(RevealCount(rec.get::<i64, _>(0)))
    }

    pub async fn record_reveal(
        &self,
        token: &str,
        prize: i64,
        reveal_count: RevealCount,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO reveals (token, prize, reveal_count, issued_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(prize)
        .bind(reveal_count.0)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_reveal(&self, token: &str) -> Result<Option<StoredReveal>> {
        let row = sqlx::query(
            "SELECT token, prize, reveal_count, issued_at FROM reveals WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| StoredReveal {
            token: r.get::<String, _>(0),
            prize: r.get::<i64, _>(1),
            reveal_count: RevealCount(r.get::<i64, _>(2)),
            issued_at: r.get::<DateTime<Utc>, _>(3),
        }))
    }

    pub async fn insert_claim(&self, claim: &NewClaim) -> Result<ClaimId> {
        let rec = sqlx::query(
            "INSERT INTO claims (reveal_token, name, phone, kseb_consumer, kseb_phone, location, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&claim.reveal_token)
        .bind(&claim.name)
        .bind(&claim.phone)
        .bind(&claim.kseb_consumer)
        .bind(&claim.kseb_phone)
        .bind(&claim.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(ClaimId(rec.get::<i64, _>(0)))
    }

    pub async fn count_claims(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn claims_for_token(&self, reveal_token: &str) -> Result<Vec<StoredClaim>> {
        let rows = sqlx::query(
            "SELECT id, reveal_token, name, phone, kseb_consumer, kseb_phone, location, created_at
             FROM claims
             WHERE reveal_token = ?
             ORDER BY id ASC",
        )
        .bind(reveal_token)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredClaim {
                claim_id: ClaimId(r.get::<i64, _>(0)),
                reveal_token: r.get::<String, _>(1),
                name: r.get::<String, _>(2),
                phone: r.get::<String, _>(3),
                kseb_consumer: r.get::<String, _>(4),
                kseb_phone: r.get::<String, _>(5),
                location: r.get::<String, _>(6),
                created_at: r.get::<DateTime<Utc>, _>(7),
            })
            .collect())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
