use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;

use super::resource::{
    unique_kinds, HasLoading, LoadingFlags, LoadingGuard, RefreshReport, ResourceKind,
};
use super::stats::Stats;
use crate::schemas::class::{Class, ClassQuery};
use crate::schemas::fee::StudentFees;
use crate::schemas::session::VideoSession;
use crate::schemas::student::Student;
use crate::schemas::teacher::Teacher;
use crate::services::gateway::{AdminApi, GatewayError};

/// Everything the admin dashboard renders from. Snapshots are cheap clones
/// handed to views; only [`AdminStore`] mutates the live copy.
#[derive(Debug, Clone, Default)]
pub struct AdminState {
    pub teachers: Vec<Teacher>,
    pub students: Vec<Student>,
    pub classes: Vec<Class>,
    pub live_sessions: Vec<VideoSession>,
    pub fees: Vec<StudentFees>,
    pub stats: Stats,
    loading: LoadingFlags<ResourceKind>,
    errors: BTreeMap<ResourceKind, String>,
}

impl AdminState {
    pub fn is_loading(&self, kind: ResourceKind) -> bool {
        self.loading.is_loading(kind)
    }

    pub fn loading(&self) -> &LoadingFlags<ResourceKind> {
        &self.loading
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self, kind: ResourceKind) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }

    fn commit(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::Teachers(items) => self.teachers = items,
            Loaded::Students(items) => self.students = items,
            Loaded::Classes(items) => self.classes = items,
            Loaded::Live(items) => self.live_sessions = items,
            Loaded::Fees(items) => self.fees = items,
        }
        self.stats = Stats {
            total_teachers: self.teachers.len(),
            total_students: self.students.len(),
            active_classes: self.classes.len(),
            live_sessions: self.live_sessions.len(),
        };
    }
}

impl HasLoading<ResourceKind> for AdminState {
    fn loading_mut(&mut self) -> &mut LoadingFlags<ResourceKind> {
        &mut self.loading
    }
}

enum Loaded {
    Teachers(Vec<Teacher>),
    Students(Vec<Student>),
    Classes(Vec<Class>),
    Live(Vec<VideoSession>),
    Fees(Vec<StudentFees>),
}

impl Loaded {
    fn len(&self) -> usize {
        match self {
            Self::Teachers(items) => items.len(),
            Self::Students(items) => items.len(),
            Self::Classes(items) => items.len(),
            Self::Live(items) => items.len(),
            Self::Fees(items) => items.len(),
        }
    }
}

/// Client-side cache behind the admin dashboard.
///
/// Each collection is replaced wholesale on a successful fetch and left
/// untouched on failure. Changes are published through a `watch` channel;
/// views subscribe and pull a [`snapshot`](Self::snapshot) when notified.
pub struct AdminStore<G: ?Sized> {
    gateway: Arc<G>,
    state: watch::Sender<AdminState>,
}

impl<G: AdminApi + ?Sized> AdminStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(AdminState::default());
        Self { gateway, state }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn subscribe(&self) -> watch::Receiver<AdminState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AdminState {
        self.state.borrow().clone()
    }

    /// Initial load when the dashboard opens.
    pub async fn mount(&self) -> RefreshReport<ResourceKind> {
        self.refresh_all().await
    }

    pub async fn refresh_all(&self) -> RefreshReport<ResourceKind> {
        self.refresh(&ResourceKind::ALL).await
    }

    /// Fetches every requested resource concurrently and waits for all of
    /// them. One failure never stops the others.
    pub async fn refresh(&self, kinds: &[ResourceKind]) -> RefreshReport<ResourceKind> {
        let kinds = unique_kinds(kinds);
        let outcomes = join_all(kinds.into_iter().map(|kind| async move {
            (kind, self.fetch(kind).await.map_err(|err| err.to_string()))
        }))
        .await;
        RefreshReport::new(outcomes)
    }

    /// Loads one resource and returns how many records it holds now.
    pub async fn fetch(&self, kind: ResourceKind) -> Result<usize, GatewayError> {
        let _loading = LoadingGuard::start(&self.state, kind);

        let result = match kind {
            ResourceKind::Teachers => self.gateway.list_teachers().await.map(Loaded::Teachers),
            ResourceKind::Students => self.gateway.list_students().await.map(Loaded::Students),
            ResourceKind::Classes => {
                self.gateway.list_classes(&ClassQuery::default()).await.map(Loaded::Classes)
            }
            ResourceKind::Live => self.gateway.list_video_sessions().await.map(Loaded::Live),
            ResourceKind::Fees => self.gateway.fee_students().await.map(Loaded::Fees),
        };

        match result {
            Ok(loaded) => {
                let count = loaded.len();
                self.state.send_modify(|state| {
                    state.commit(loaded);
                    state.errors.remove(&kind);
                });
                metrics::counter!("store_fetch_total", "resource" => kind.as_str(), "outcome" => "ok")
                    .increment(1);
                tracing::debug!(resource = kind.as_str(), count, "Resource refreshed");
                Ok(count)
            }
            Err(err) => {
                self.state.send_modify(|state| {
                    state.errors.insert(kind, err.to_string());
                });
                metrics::counter!("store_fetch_total", "resource" => kind.as_str(), "outcome" => "error")
                    .increment(1);
                tracing::error!(resource = kind.as_str(), error = %err, "Failed to fetch resource");
                Err(err)
            }
        }
    }
}
