use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use time::OffsetDateTime;
use tokio::sync::watch;

use super::resource::{unique_kinds, HasLoading, LoadingFlags, LoadingGuard, RefreshReport};
use crate::schemas::assignment::{Assignment, AssignmentQuery};
use crate::schemas::class::Class;
use crate::schemas::student::Student;
use crate::schemas::types::ClassStatus;
use crate::services::gateway::{GatewayError, TeacherApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeacherResource {
    Classes,
    Students,
    Assignments,
}

impl TeacherResource {
    pub const ALL: [TeacherResource; 3] = [Self::Classes, Self::Students, Self::Assignments];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classes => "teacher_classes",
            Self::Students => "teacher_students",
            Self::Assignments => "teacher_assignments",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeacherStats {
    pub total_classes: usize,
    pub upcoming_classes: usize,
    pub completed_classes: usize,
    pub total_students: usize,
    pub total_assignments: usize,
    pub pending_submissions: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TeacherState {
    pub classes: Vec<Class>,
    pub students: Vec<Student>,
    pub assignments: Vec<Assignment>,
    loading: LoadingFlags<TeacherResource>,
    errors: BTreeMap<TeacherResource, String>,
}

impl TeacherState {
    pub fn is_loading(&self, kind: TeacherResource) -> bool {
        self.loading.is_loading(kind)
    }

    pub fn last_error(&self, kind: TeacherResource) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }

    /// Scheduled classes still ahead of `now`.
    pub fn upcoming_classes(&self, now: OffsetDateTime) -> Vec<&Class> {
        self.classes
            .iter()
            .filter(|class| {
                class.scheduled_date.is_some_and(|date| date > now)
                    && class.status == Some(ClassStatus::Scheduled)
            })
            .collect()
    }

    /// Classes marked completed, plus past classes that were not cancelled.
    pub fn completed_classes(&self, now: OffsetDateTime) -> Vec<&Class> {
        self.classes
            .iter()
            .filter(|class| {
                class.status == Some(ClassStatus::Completed)
                    || (class.scheduled_date.is_some_and(|date| date < now)
                        && class.status != Some(ClassStatus::Cancelled))
            })
            .collect()
    }

    pub fn stats(&self, now: OffsetDateTime) -> TeacherStats {
        TeacherStats {
            total_classes: self.classes.len(),
            upcoming_classes: self.upcoming_classes(now).len(),
            completed_classes: self.completed_classes(now).len(),
            total_students: self.students.len(),
            total_assignments: self.assignments.len(),
            pending_submissions: self.assignments.iter().map(Assignment::pending).sum(),
        }
    }
}

impl HasLoading<TeacherResource> for TeacherState {
    fn loading_mut(&mut self) -> &mut LoadingFlags<TeacherResource> {
        &mut self.loading
    }
}

pub struct TeacherStore<G: ?Sized> {
    gateway: Arc<G>,
    state: watch::Sender<TeacherState>,
}

impl<G: TeacherApi + ?Sized> TeacherStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(TeacherState::default());
        Self { gateway, state }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn subscribe(&self) -> watch::Receiver<TeacherState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TeacherState {
        self.state.borrow().clone()
    }

    pub async fn load_all(&self) -> RefreshReport<TeacherResource> {
        self.refresh(&TeacherResource::ALL).await
    }

    pub async fn refresh(&self, kinds: &[TeacherResource]) -> RefreshReport<TeacherResource> {
        let kinds = unique_kinds(kinds);
        let outcomes = join_all(kinds.into_iter().map(|kind| async move {
            (kind, self.fetch(kind).await.map_err(|err| err.to_string()))
        }))
        .await;
        RefreshReport::new(outcomes)
    }

    pub async fn fetch(&self, kind: TeacherResource) -> Result<usize, GatewayError> {
        let _loading = LoadingGuard::start(&self.state, kind);

        let result = match kind {
            TeacherResource::Classes => self.gateway.my_classes().await.map(|items| {
                let count = items.len();
                self.state.send_modify(|state| state.classes = items);
                count
            }),
            TeacherResource::Students => self.gateway.my_students().await.map(|items| {
                let count = items.len();
                self.state.send_modify(|state| state.students = items);
                count
            }),
            TeacherResource::Assignments => {
                self.gateway.assignments(&AssignmentQuery::default()).await.map(|items| {
                    let count = items.len();
                    self.state.send_modify(|state| state.assignments = items);
                    count
                })
            }
        };

        match &result {
            Ok(_) => {
                self.state.send_modify(|state| {
                    state.errors.remove(&kind);
                });
                metrics::counter!("store_fetch_total", "resource" => kind.as_str(), "outcome" => "ok")
                    .increment(1);
            }
            Err(err) => {
                self.state.send_modify(|state| {
                    state.errors.insert(kind, err.to_string());
                });
                metrics::counter!("store_fetch_total", "resource" => kind.as_str(), "outcome" => "error")
                    .increment(1);
                tracing::error!(resource = kind.as_str(), error = %err, "Failed to load teacher data");
            }
        }
        result
    }
}
