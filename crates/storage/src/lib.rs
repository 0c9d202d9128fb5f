use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{Note, NoteId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite database url '{database_url}'"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
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

    /// Returns every note in insertion order.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query("SELECT id, title, content, created_at FROM notes ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list notes")?;
        Ok(rows.iter().map(note_from_row).collect())
    }

    pub async fn get_note(&self, note_id: NoteId) -> Result<Option<Note>> {
        let row = sqlx::query("SELECT id, title, content, created_at FROM notes WHERE id = ?")
            .bind(note_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(note_from_row))
    }

    pub async fn create_note(&self, title: &str, content: &str) -> Result<Note> {
        let created_at: DateTime<Utc> = Utc::now();
        let row = sqlx::query(
            "INSERT INTO notes (title, content, created_at) VALUES (?, ?, ?)
             RETURNING id, title, content, created_at",
        )
        .bind(title)
        .bind(content)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert note")?;
        let note = note_from_row(&row);
        debug!(note_id = note.id.0, "storage: note inserted");
        Ok(note)
    }

    /// Deletes a note; returns `false` when no row matched.
    pub async fn remove_note(&self, note_id: NoteId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(note_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete note {}", note_id.0))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_notes(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn note_from_row(row: &SqliteRow) -> Note {
    Note {
        id: NoteId(row.get::<i64, _>(0)),
        title: row.get::<String, _>(1),
        content: row.get::<String, _>(2),
        created_at: row.get::<DateTime<Utc>, _>(3),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let parent = match sqlite_path(database_url).as_deref().and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => return Ok(()),
    };
    fs::create_dir_all(&parent).with_context(|| {
        format!(
            "failed to create directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

/// File backing a sqlite url, or `None` for in-memory and non-sqlite urls.
fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url.strip_prefix("sqlite:")?;
    if rest.starts_with(":memory:") {
        return None;
    }
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or_default();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
