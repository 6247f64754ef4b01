//! In-memory session store.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use tunecraft_core::{SessionId, SessionRecord};

use crate::error::Result;
use crate::SessionStore;

/// Number of writes between sweeps of expired sessions.
pub const SWEEP_INTERVAL: usize = 64;

/// Process-local session store.
///
/// Records idle for longer than the configured TTL are treated as absent.
/// An expired record is dropped when it is next looked up, and every
/// [`SWEEP_INTERVAL`] writes the whole map is swept, so sessions that are
/// never seen again do not accumulate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: DashMap<SessionId, SessionRecord>,
    ttl: Option<Duration>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create a store whose sessions never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that expires sessions idle longer than `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Number of records held, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every expired record. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        if self.ttl.is_none() || self.is_empty() {
            return 0;
        }

        let now = Utc::now();
        let before = self.len();
        self.sessions
            .retain(|_, record| !self.is_expired(record, now));
        let removed = before.saturating_sub(self.len());

        if removed > 0 {
            tracing::debug!(removed, remaining = self.len(), "Swept expired sessions");
        }
        removed
    }

    fn is_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        self.ttl.is_some_and(|ttl| now - record.updated_at > ttl)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, session: &SessionId) -> Result<Option<SessionRecord>> {
        let record = self.sessions.get(session).map(|r| r.value().clone());

        match record {
            Some(record) if self.is_expired(&record, Utc::now()) => {
                self.sessions.remove(session);
                tracing::debug!(session = %session, "Session expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn put(&self, session: &SessionId, record: &SessionRecord) -> Result<()> {
        self.sessions.insert(*session, record.clone());

        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_INTERVAL == 0 {
            self.sweep_expired();
        }
        Ok(())
    }
}
