//! Remote score store
//!
//! Features:
//! - Per-user cumulative score with atomic add-or-initialize commits
//! - Per-user best single-session score
//! - Errors are values; the session controller logs them and carries on

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure talking to a score store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store unavailable: {0}")]
    Unavailable(String),

    #[error("commit rejected: {0}")]
    Rejected(String),
}

/// Store's view after a committed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Sum of every committed session score
    pub total: i64,
    /// Best single-session score
    pub high_score: i64,
}

/// Remote key/value collaborator holding cumulative scores
///
/// `commit_session_score` must be an atomic read-modify-write so that
/// concurrent sessions of one user never lose an increment.
pub trait ScoreStore {
    fn read_high_score(&self, user_id: &str) -> Result<i64, StoreError>;
    fn commit_session_score(&self, user_id: &str, score: i64) -> Result<CommitReceipt, StoreError>;
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct ScoreRecord {
    total: i64,
    high_score: Option<i64>,
}

/// In-process store; a mutex makes each commit one atomic transaction
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    records: Mutex<HashMap<String, ScoreRecord>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative total for `user_id` (0 if never committed)
    pub fn total(&self, user_id: &str) -> Result<i64, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(records.get(user_id).map(|r| r.total).unwrap_or(0))
    }
}

impl ScoreStore for MemoryScoreStore {
    fn read_high_score(&self, user_id: &str) -> Result<i64, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(records
            .get(user_id)
            .and_then(|r| r.high_score)
            .unwrap_or(0))
    }

    fn commit_session_score(&self, user_id: &str, score: i64) -> Result<CommitReceipt, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let record = records.entry(user_id.to_string()).or_default();
        record.total = record
            .total
            .checked_add(score)
            .ok_or_else(|| StoreError::Rejected(format!("total overflow for {user_id}")))?;
        let best = record.high_score.map_or(score, |h| h.max(score));
        record.high_score = Some(best);
        Ok(CommitReceipt {
            total: record.total,
            high_score: best,
        })
    }
}

/// Store that always fails (offline hosts, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineScoreStore;

impl ScoreStore for OfflineScoreStore {
    fn read_high_score(&self, _user_id: &str) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn commit_session_score(&self, _user_id: &str, _score: i64) -> Result<CommitReceipt, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
}

impl<T: ScoreStore + ?Sized> ScoreStore for std::sync::Arc<T> {
    fn read_high_score(&self, user_id: &str) -> Result<i64, StoreError> {
        (**self).read_high_score(user_id)
    }

    fn commit_session_score(&self, user_id: &str, score: i64) -> Result<CommitReceipt, StoreError> {
        (**self).commit_session_score(user_id, score)
    }
}
