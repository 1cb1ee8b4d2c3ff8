//! Human-readable event log shown to admins.
//!
//! Entries are kept in memory for the whole process and persisted in `log`
//! chunks of at most [`CHUNK_SIZE`] entries. Each entry is also emitted as a
//! tracing event.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use jury_core::Judge;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::store::{Store, StoreResult};

pub const CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    System,
    Admin,
    Judge,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::System => "SYSTEM",
            LogLevel::Admin => "ADMIN",
            LogLevel::Judge => "JUDGE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[2024-02-10T14:03:11.250Z] LEVEL | message`
pub fn format_entry(at: DateTime<Utc>, level: LogLevel, message: &str) -> String {
    format!(
        "[{}] {} | {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        message
    )
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<String>,
    /// Persisted chunk currently being appended to, and the index in `entries`
    /// of its first entry.
    chunk: Option<(i32, usize)>,
}

#[derive(Debug, PartialEq, Eq)]
enum ChunkWrite {
    /// Rewrite chunk `id` with `entries[start..]`.
    Update { id: i32, start: usize },
    /// Start a new chunk holding `entries[start..]`.
    Insert { start: usize },
}

fn next_write(chunk: Option<(i32, usize)>, len: usize) -> ChunkWrite {
    match chunk {
        Some((id, start)) if len - start <= CHUNK_SIZE => ChunkWrite::Update { id, start },
        Some((_, start)) => ChunkWrite::Insert {
            start: start + CHUNK_SIZE,
        },
        None => ChunkWrite::Insert { start: 0 },
    }
}

pub struct EventLogger {
    db: DatabaseConnection,
    inner: Mutex<Inner>,
}

impl EventLogger {
    /// Rebuild the in-memory mirror from persisted chunks.
    pub async fn load(db: DatabaseConnection) -> StoreResult<Self> {
        let chunks = Store::new(&db).find_log_chunks().await?;
        let mut inner = Inner::default();
        for chunk in chunks {
            let entries: Vec<String> =
                serde_json::from_value(chunk.entries).unwrap_or_else(|e| {
                    warn!(chunk_id = chunk.id, error = %e, "Skipping unreadable log chunk");
                    Vec::new()
                });
            inner.chunk = Some((chunk.id, inner.entries.len()));
            inner.entries.extend(entries);
        }
        info!(entries = inner.entries.len(), "Event log loaded");
        Ok(Self {
            db,
            inner: Mutex::new(inner),
        })
    }

    pub async fn system(&self, message: impl AsRef<str>) {
        self.write(LogLevel::System, message.as_ref()).await;
    }

    pub async fn admin(&self, message: impl AsRef<str>) {
        self.write(LogLevel::Admin, message.as_ref()).await;
    }

    /// Judge entries are prefixed with the judge's name and id.
    pub async fn judge(&self, judge: &Judge, message: impl AsRef<str>) {
        let line = format!("{} ({}) {}", judge.name, judge.id, message.as_ref());
        self.write(LogLevel::Judge, &line).await;
    }

    async fn write(&self, level: LogLevel, message: &str) {
        let entry = format_entry(Utc::now(), level, message);
        info!(target: "jury::event", level = level.as_str(), "{}", message);

        let mut inner = self.inner.lock().await;
        inner.entries.push(entry);
        if let Err(e) = self.persist(&mut inner).await {
            warn!(error = %e, "Failed to persist event log entry");
        }
    }

    /// Write the tail of the in-memory log into the current chunk, starting a
    /// new chunk when the current one is full.
    async fn persist(&self, inner: &mut Inner) -> StoreResult<()> {
        let store = Store::new(&self.db);
        match next_write(inner.chunk, inner.entries.len()) {
            ChunkWrite::Update { id, start } => {
                store.update_log_chunk(id, &inner.entries[start..]).await?;
            }
            ChunkWrite::Insert { start } => {
                let id = store.insert_log_chunk(&inner.entries[start..]).await?;
                inner.chunk = Some((id, start));
            }
        }
        Ok(())
    }

    pub async fn entries(&self) -> Vec<String> {
        self.inner.lock().await.entries.clone()
    }

    /// Drop the in-memory mirror. Persisted chunks are removed by the store reset.
    pub async fn clear(&self) {
        *self.inner.lock().await = Inner::default();
    }
}
