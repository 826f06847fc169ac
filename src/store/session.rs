//! Pending rounds: the preview → confirm handoff.
//!
//! A generated assignment is not persisted until it is confirmed and sent.
//! The gap between the two steps is carried by an explicit [`PendingRound`]
//! session object (keyed, timestamped, expirable) instead of process-wide
//! mutable state: the web surface holds them in a [`SessionStore`], the CLI
//! writes the same object to a pending file and reloads it at confirm time.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Assignment, WeightTable};

/// Length of generated session keys
const KEY_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("pending round I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse pending round: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pending round is {age_minutes} minutes old (limit {ttl_minutes}); generate a fresh one")]
    Expired { age_minutes: i64, ttl_minutes: i64 },
}

/// A generated-but-unconfirmed round: the assignment to deliver and the
/// cooldown-updated table to persist once it is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRound {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub assignment: Assignment,
    pub table: WeightTable,
}

impl PendingRound {
    pub fn new(assignment: Assignment, table: WeightTable) -> Self {
        let key: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(KEY_LEN)
            .map(char::from)
            .collect();
        Self {
            key,
            created_at: Utc::now(),
            assignment,
            table,
        }
    }

    #[must_use]
    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }

    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Write the pending round to a file for a later confirm step
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` or `SessionError::Parse`.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load a pending round from a file, refusing one older than `ttl`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired` for a stale round, or the
    /// underlying read/parse error.
    pub fn load_fresh(path: &Path, ttl: Duration) -> Result<Self, SessionError> {
        let content = std::fs::read_to_string(path)?;
        let round: Self = serde_json::from_str(&content)?;
        if round.is_expired(ttl) {
            return Err(SessionError::Expired {
                age_minutes: round.age().num_minutes(),
                ttl_minutes: ttl.num_minutes(),
            });
        }
        Ok(round)
    }
}

/// In-memory session store keyed by round key, with TTL-based expiry.
///
/// Not internally synchronized: callers serialize access (the web server
/// keeps it behind the same mutex that serializes assignment runs).
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, PendingRound>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Store a pending round, returning its key
    pub fn insert(&mut self, round: PendingRound) -> String {
        self.purge_expired();
        let key = round.key.clone();
        self.sessions.insert(key.clone(), round);
        key
    }

    /// Remove and return the round for `key`, if present and fresh.
    /// Confirming consumes the session.
    pub fn take(&mut self, key: &str) -> Option<PendingRound> {
        self.purge_expired();
        self.sessions.remove(key)
    }

    fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.sessions.retain(|_, round| !round.is_expired(ttl));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
