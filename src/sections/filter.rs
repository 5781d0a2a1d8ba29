use std::time::Duration;

use tokio::time::Instant;

/// Trimmed, lowercased search term. Empty means "no filter".
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Case-insensitive substring match of an already normalized `needle`
/// against any present field.
pub fn matches_any<'a, I>(needle: &str, fields: I) -> bool
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    if needle.is_empty() {
        return true;
    }
    fields.into_iter().flatten().any(|field| field.to_lowercase().contains(needle))
}

/// Search input that only takes effect after the user stops typing for
/// `delay`.
#[derive(Debug, Clone)]
pub struct Debounced {
    applied: String,
    pending: Option<(String, Instant)>,
    delay: Duration,
}

impl Debounced {
    pub fn new(delay: Duration) -> Self {
        Self { applied: String::new(), pending: None, delay }
    }

    pub fn input(&mut self, raw: impl Into<String>) {
        self.pending = Some((raw.into(), Instant::now() + self.delay));
    }

    /// Applies the pending input if its quiet period has passed. Returns
    /// true when the applied value changed.
    pub fn poll(&mut self) -> bool {
        match &self.pending {
            Some((_, deadline)) if Instant::now() >= *deadline => self.apply(),
            _ => false,
        }
    }

    /// Waits out the quiet period of the pending input, if any.
    pub async fn settle(&mut self) -> bool {
        if let Some((_, deadline)) = &self.pending {
            tokio::time::sleep_until(*deadline).await;
        }
        self.apply()
    }

    pub fn value(&self) -> &str {
        &self.applied
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn apply(&mut self) -> bool {
        match self.pending.take() {
            Some((value, _)) if value != self.applied => {
                self.applied = value;
                true
            }
            _ => false,
        }
    }
}
