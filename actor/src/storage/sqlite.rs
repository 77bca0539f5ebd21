//! SQLite backend for match outcome storage.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{GameOutcome, OutcomeStore, WinnerSummary};

/// SQLite-based outcome store.
///
/// Uses a Mutex for thread-safety since rusqlite Connection is not Sync.
pub struct SqliteOutcomeStore {
    conn: Mutex<Connection>,
}

impl SqliteOutcomeStore {
    /// Open (or create) the database and initialize the schema if needed.
    /// `":memory:"` opens a private in-memory database.
    pub fn new(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS game_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                game_mode TEXT NOT NULL,
                winner TEXT NOT NULL,
                duration REAL NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_game_results_mode ON game_results(game_mode)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))
    }
}

#[async_trait]
impl OutcomeStore for SqliteOutcomeStore {
    async fn record(&self, outcome: &GameOutcome) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO game_results (game_mode, winner, duration) VALUES (?1, ?2, ?3)",
            params![outcome.mode, outcome.winner, outcome.duration_secs],
        )?;
        Ok(())
    }

    async fn count(&self, mode: Option<&str>) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM game_results WHERE ?1 IS NULL OR game_mode = ?1",
            params![mode],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    async fn summary(&self, mode: Option<&str>) -> Result<Vec<WinnerSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT winner, COUNT(*), AVG(duration) FROM game_results
             WHERE ?1 IS NULL OR game_mode = ?1
             GROUP BY winner
             ORDER BY COUNT(*) DESC, winner ASC",
        )?;
        let rows = stmt.query_map(params![mode], |row| {
            Ok(WinnerSummary {
                winner: row.get(0)?,
                games: row.get::<_, i64>(1)? as u64,
                avg_duration_secs: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn recent(&self, mode: Option<&str>, limit: usize) -> Result<Vec<GameOutcome>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT game_mode, winner, duration FROM game_results
             WHERE ?1 IS NULL OR game_mode = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![mode, limit], |row| {
            Ok(GameOutcome {
                mode: row.get(0)?,
                winner: row.get(1)?,
                duration_secs: row.get(2)?,
            })
        })?;
        let mut outcomes = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        outcomes.reverse();
        Ok(outcomes)
    }
}
