use std::collections::BTreeMap;

use tokio::sync::watch;

/// Collections held by the admin store. Each one loads independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Teachers,
    Students,
    Classes,
    Live,
    Fees,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] =
        [Self::Teachers, Self::Students, Self::Classes, Self::Live, Self::Fees];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teachers => "teachers",
            Self::Students => "students",
            Self::Classes => "classes",
            Self::Live => "live",
            Self::Fees => "fees",
        }
    }
}

/// Per-resource in-flight counters. A resource reads as loading while at
/// least one fetch for it has not finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingFlags<K: Ord> {
    in_flight: BTreeMap<K, u32>,
}

impl<K: Ord> Default for LoadingFlags<K> {
    fn default() -> Self {
        Self { in_flight: BTreeMap::new() }
    }
}

impl<K: Ord + Copy> LoadingFlags<K> {
    pub fn is_loading(&self, kind: K) -> bool {
        self.in_flight.get(&kind).is_some_and(|count| *count > 0)
    }

    pub fn any(&self) -> bool {
        self.in_flight.values().any(|count| *count > 0)
    }

    fn begin(&mut self, kind: K) {
        *self.in_flight.entry(kind).or_insert(0) += 1;
    }

    fn end(&mut self, kind: K) {
        if let Some(count) = self.in_flight.get_mut(&kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(&kind);
            }
        }
    }
}

/// State types whose loading flags can be driven by [`LoadingGuard`].
pub(crate) trait HasLoading<K: Ord + Copy> {
    fn loading_mut(&mut self) -> &mut LoadingFlags<K>;
}

/// Marks `kind` as loading for as long as the guard lives. The flag is
/// cleared on drop, so an early return or a failed fetch still resets it.
pub(crate) struct LoadingGuard<'a, S: HasLoading<K>, K: Ord + Copy> {
    state: &'a watch::Sender<S>,
    kind: K,
}

impl<'a, S: HasLoading<K>, K: Ord + Copy> LoadingGuard<'a, S, K> {
    pub(crate) fn start(state: &'a watch::Sender<S>, kind: K) -> Self {
        state.send_modify(|state| state.loading_mut().begin(kind));
        Self { state, kind }
    }
}

impl<S: HasLoading<K>, K: Ord + Copy> Drop for LoadingGuard<'_, S, K> {
    fn drop(&mut self) {
        let kind = self.kind;
        self.state.send_modify(|state| state.loading_mut().end(kind));
    }
}

/// Outcome of a settle-all refresh: every requested resource is reported,
/// whether it loaded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport<K> {
    outcomes: Vec<(K, Result<usize, String>)>,
}

impl<K: Copy + PartialEq> RefreshReport<K> {
    pub(crate) fn new(outcomes: Vec<(K, Result<usize, String>)>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[(K, Result<usize, String>)] {
        &self.outcomes
    }

    pub fn outcome(&self, kind: K) -> Option<&Result<usize, String>> {
        self.outcomes.iter().find(|(candidate, _)| *candidate == kind).map(|(_, outcome)| outcome)
    }

    pub fn failed(&self) -> Vec<K> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_ok())
    }
}

/// Drops duplicates while keeping the caller's order.
pub(crate) fn unique_kinds<K: Copy + PartialEq>(kinds: &[K]) -> Vec<K> {
    let mut unique = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    unique
}
