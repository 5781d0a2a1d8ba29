use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;

use super::resource::{unique_kinds, HasLoading, LoadingFlags, LoadingGuard, RefreshReport};
use crate::schemas::assignment::Assignment;
use crate::schemas::student::StudentDashboard;
use crate::services::gateway::{GatewayError, StudentApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StudentResource {
    Dashboard,
    Assignments,
}

impl StudentResource {
    pub const ALL: [StudentResource; 2] = [Self::Dashboard, Self::Assignments];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "student_dashboard",
            Self::Assignments => "student_assignments",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentState {
    pub dashboard: Option<StudentDashboard>,
    pub assignments: Vec<Assignment>,
    loading: LoadingFlags<StudentResource>,
    errors: BTreeMap<StudentResource, String>,
}

impl StudentState {
    pub fn is_loading(&self, kind: StudentResource) -> bool {
        self.loading.is_loading(kind)
    }

    pub fn last_error(&self, kind: StudentResource) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }

    pub fn has_teacher(&self) -> bool {
        self.dashboard.as_ref().is_some_and(|dashboard| dashboard.teacher.is_some())
    }
}

impl HasLoading<StudentResource> for StudentState {
    fn loading_mut(&mut self) -> &mut LoadingFlags<StudentResource> {
        &mut self.loading
    }
}

pub struct StudentStore<G: ?Sized> {
    gateway: Arc<G>,
    state: watch::Sender<StudentState>,
}

impl<G: StudentApi + ?Sized> StudentStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(StudentState::default());
        Self { gateway, state }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn subscribe(&self) -> watch::Receiver<StudentState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StudentState {
        self.state.borrow().clone()
    }

    pub async fn load_all(&self) -> RefreshReport<StudentResource> {
        let kinds = unique_kinds(&StudentResource::ALL);
        let outcomes = join_all(kinds.into_iter().map(|kind| async move {
            (kind, self.fetch(kind).await.map_err(|err| err.to_string()))
        }))
        .await;
        RefreshReport::new(outcomes)
    }

    pub async fn fetch(&self, kind: StudentResource) -> Result<usize, GatewayError> {
        let _loading = LoadingGuard::start(&self.state, kind);

        let result = match kind {
            StudentResource::Dashboard => self.gateway.dashboard().await.map(|dashboard| {
                let count = dashboard.classes.len();
                self.state.send_modify(|state| state.dashboard = Some(dashboard));
                count
            }),
            StudentResource::Assignments => self.gateway.my_assignments().await.map(|items| {
                let count = items.len();
                self.state.send_modify(|state| state.assignments = items);
                count
            }),
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("store_fetch_total", "resource" => kind.as_str(), "outcome" => outcome)
            .increment(1);
        self.state.send_modify(|state| match &result {
            Ok(_) => {
                state.errors.remove(&kind);
            }
            Err(err) => {
                tracing::error!(resource = kind.as_str(), error = %err, "Failed to load student data");
                state.errors.insert(kind, err.to_string());
            }
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{class_fixture, student_fixture, FakeGateway};

    #[tokio::test]
    async fn dashboard_and_assignments_load_together() {
        let gateway = FakeGateway::default();
        gateway.seed(|state| {
            state.dashboard = Some(StudentDashboard {
                student: student_fixture("s1", "Maryam", Some("t1")),
                teacher: None,
                classes: vec![class_fixture("c1", "Tajweed", "t1"), class_fixture("c2", "Hifz", "t1")],
            });
        });
        let store = StudentStore::new(Arc::new(gateway));

        let report = store.load_all().await;

        assert_eq!(report.outcome(StudentResource::Dashboard), Some(&Ok(2)));
        assert_eq!(report.outcome(StudentResource::Assignments), Some(&Ok(0)));
        assert!(!store.snapshot().has_teacher());
    }

    #[tokio::test]
    async fn missing_dashboard_reports_error() {
        let store = StudentStore::new(Arc::new(FakeGateway::default()));

        let err = store.fetch(StudentResource::Dashboard).await.expect_err("no dashboard");

        assert_eq!(err.status(), Some(404));
        let state = store.snapshot();
        assert!(state.dashboard.is_none());
        assert!(!state.is_loading(StudentResource::Dashboard));
        assert_eq!(state.last_error(StudentResource::Dashboard), Some("Student not found"));
    }
}
