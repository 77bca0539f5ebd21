//! Storage backend for match outcomes (SQLite).
//!
//! # Usage
//!
//! ```rust,ignore
//! use actor::storage::{create_outcome_store, GameOutcome, OutcomeStore};
//!
//! let store = create_outcome_store("./data/outcomes.db")?;
//! store.record(&outcome).await?;
//! ```

mod sqlite;

pub use sqlite::SqliteOutcomeStore;

use anyhow::Result;
use async_trait::async_trait;

/// Result of one finished game
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    /// Match mode label, e.g. "heuristic-vs-guided"
    pub mode: String,
    /// Label of the bot that sank the other fleet first
    pub winner: String,
    pub duration_secs: f64,
}

/// Aggregated outcomes for one winner label
#[derive(Debug, Clone, PartialEq)]
pub struct WinnerSummary {
    pub winner: String,
    pub games: u64,
    pub avg_duration_secs: f64,
}

/// Abstract interface for outcome storage.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Record a single finished game
    async fn record(&self, outcome: &GameOutcome) -> Result<()>;

    /// Number of recorded games, optionally restricted to one mode
    async fn count(&self, mode: Option<&str>) -> Result<u64>;

    /// Per-winner totals, most wins first
    async fn summary(&self, mode: Option<&str>) -> Result<Vec<WinnerSummary>>;

    /// The last `limit` outcomes in recording order, optionally restricted to
    /// one mode
    async fn recent(&self, mode: Option<&str>, limit: usize) -> Result<Vec<GameOutcome>>;
}

/// Open the outcome store at `db_path`
pub fn create_outcome_store(db_path: &str) -> Result<Box<dyn OutcomeStore>> {
    Ok(Box::new(SqliteOutcomeStore::new(db_path)?))
}
