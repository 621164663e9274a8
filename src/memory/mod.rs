use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A durable learned statement about user preference or context.
/// Append-only; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub category: String,
    pub text: String,
}

/// A persisted conversation record, searchable by the recall intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// SQLite-backed store for learned facts and conversation history.
///
/// Each operation opens its own connection (WAL mode, busy timeout), so
/// concurrent appends from separate requests serialize at the database and
/// remain visible in insertion order to any reader that starts afterwards.
pub struct MemoryStore {
    db_path: PathBuf,
    has_fts: bool,
}

impl MemoryStore {
    pub fn new(memory_dir: impl AsRef<Path>) -> Result<Self> {
        let memory_dir = memory_dir.as_ref();
        std::fs::create_dir_all(memory_dir).with_context(|| {
            format!("Failed to create memory directory: {}", memory_dir.display())
        })?;

        let mut store = Self {
            db_path: memory_dir.join("deskbot.sqlite3"),
            has_fts: false,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=3000;",
        )?;
        Ok(conn)
    }

    fn ensure_schema(&mut self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS facts (
                id INTEGER PRIMARY KEY,
                category TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        match conn.execute(
            "CREATE VIRTUAL TABLE IF NOT EXISTS history_fts
            USING fts5(
                content,
                content='history',
                content_rowid='id'
            )",
            [],
        ) {
            Ok(_) => {
                conn.execute(
                    "CREATE TRIGGER IF NOT EXISTS hist_ai AFTER INSERT ON history BEGIN
                        INSERT INTO history_fts(rowid, content)
                        VALUES (new.id, new.content);
                    END",
                    [],
                )?;
                self.has_fts = true;
            }
            Err(_) => {
                self.has_fts = false;
                debug!("FTS5 not available; history search falls back to LIKE");
            }
        }

        Ok(())
    }

    pub fn append_fact(&self, category: &str, text: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO facts (category, text, created_at) VALUES (?1, ?2, ?3)",
            params![category, text, Utc::now().to_rfc3339()],
        )?;
        debug!("stored fact: category={}, len={}", category, text.len());
        Ok(())
    }

    /// The most recent `limit` facts, in insertion order (oldest of the
    /// window first).
    pub fn recent_facts(&self, limit: usize) -> Result<Vec<Fact>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT category, text FROM
                (SELECT id, category, text FROM facts ORDER BY id DESC LIMIT ?1)
             ORDER BY id ASC",
        )?;
        let facts = stmt
            .query_map(params![limit as i64], |row| {
                Ok(Fact {
                    category: row.get(0)?,
                    text: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(facts)
    }

    /// Append a completed exchange (user query, assistant reply) to history.
    pub fn log_turn(&self, query: &str, reply: &str) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO history (role, content, created_at) VALUES ('user', ?1, ?2)",
            params![query, now],
        )?;
        conn.execute(
            "INSERT INTO history (role, content, created_at) VALUES ('assistant', ?1, ?2)",
            params![reply, now],
        )?;
        Ok(())
    }

    /// Search prior records. FTS5 when available, LIKE otherwise.
    pub fn search_history(&self, query: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.connect()?;

        if self.has_fts {
            let fts_query = fts_escape(query);
            if !fts_query.is_empty() {
                let mut stmt = conn.prepare(
                    "SELECT h.role, h.content, h.created_at
                     FROM history_fts f JOIN history h ON h.id = f.rowid
                     WHERE history_fts MATCH ?1
                     ORDER BY rank LIMIT ?2",
                )?;
                let records = stmt
                    .query_map(params![fts_query, limit as i64], row_to_record)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if !records.is_empty() {
                    return Ok(records);
                }
            }
        }

        // LIKE fallback: match any meaningful word from the query
        let mut records = Vec::new();
        for word in query.split_whitespace().filter(|w| w.len() > 3).take(3) {
            let pattern = format!("%{}%", word);
            let mut stmt = conn.prepare(
                "SELECT role, content, created_at FROM history
                 WHERE content LIKE ?1 ORDER BY id DESC LIMIT ?2",
            )?;
            let hits = stmt
                .query_map(params![pattern, limit as i64], row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for hit in hits {
                if records.len() >= limit {
                    break;
                }
                records.push(hit);
            }
        }
        Ok(records)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        role: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Quote each term so FTS5 treats the query as plain words, not syntax.
fn fts_escape(query: &str) -> String {
    query
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .map(|w| format!("\"{}\"", w.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
mod tests;
