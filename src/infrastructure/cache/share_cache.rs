use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Time source, swappable in tests
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

const TOKEN_LENGTH: usize = 24;
const SHARE_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
struct Entry {
    payload: Value,
    stored_at: DateTime<Utc>,
}

/// Token-addressed store for shared analysis payloads.
///
/// Entries live for seven days. Expired entries are swept on every write
/// and filtered lazily on read, so a stale token behaves exactly like an
/// unknown one.
#[derive(Debug)]
pub struct ShareCache {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Default for ShareCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Store a payload and return the token that retrieves it.
    pub fn share(&self, payload: Value) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| !is_expired(entry, now));
        entries.insert(
            token.clone(),
            Entry {
                payload,
                stored_at: now,
            },
        );
        debug!("Shared analysis stored, {} live entries", entries.len());
        token
    }

    /// Look up a shared payload. Unknown and expired tokens both come back
    /// as `None`.
    pub fn get(&self, token: &str) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(token)
            .filter(|entry| !is_expired(entry, now))
            .map(|entry| entry.payload.clone())
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_expired(entry: &Entry, now: DateTime<Utc>) -> bool {
    now - entry.stored_at >= Duration::days(SHARE_TTL_DAYS)
}
