use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: Instant,
}

const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Transient toast queue shared by every section of a dashboard.
#[derive(Debug, Clone)]
pub struct Notifier {
    notices: Arc<Mutex<Vec<Notice>>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl Notifier {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { notices: Arc::default(), next_id: Arc::new(AtomicU64::new(1)), ttl }
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message.into())
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message.into())
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut notices = self.lock();
        let before = notices.len();
        notices.retain(|notice| notice.id != id);
        notices.len() != before
    }

    /// Notices raised within the time-to-live, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        let mut notices = self.lock();
        self.prune(&mut notices, Instant::now());
        notices.clone()
    }

    pub fn latest(&self) -> Option<Notice> {
        self.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, level: NoticeLevel, message: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match level {
            NoticeLevel::Error => tracing::warn!(notice_id = id, message = %message, "Error notice"),
            _ => tracing::debug!(notice_id = id, message = %message, "Notice"),
        }
        let now = Instant::now();
        let mut notices = self.lock();
        self.prune(&mut notices, now);
        notices.push(Notice { id, level, message, raised_at: now });
        id
    }

    fn prune(&self, notices: &mut Vec<Notice>, now: Instant) {
        notices.retain(|notice| now.duration_since(notice.raised_at) < self.ttl);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Yes/no prompt shown before destructive actions.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything. Used by non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Keys of actions currently running, e.g. `remove:t1`.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<BTreeSet<String>>>,
}

impl InFlight {
    /// Claims `key`. Returns `None` while another action holds it.
    pub fn begin(&self, key: impl Into<String>) -> Option<InFlightGuard> {
        let key = key.into();
        let inserted = self.lock().insert(key.clone());
        inserted.then(|| InFlightGuard { keys: Arc::clone(&self.keys), key })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub fn is_idle(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<BTreeSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.key);
    }
}
