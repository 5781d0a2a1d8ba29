use std::sync::Arc;

use time::OffsetDateTime;

use crate::modals::{CreateAssignmentModal, GradeSubmissionModal, SubmitError};
use crate::schemas::class::Class;
use crate::schemas::types::ClassStatus;
use crate::sections::{matches_any, normalize_query, ActionError, InFlight, Notifier};
use crate::services::gateway::TeacherApi;
use crate::store::{RefreshReport, TeacherResource, TeacherState, TeacherStats, TeacherStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherClassFilters {
    pub status: Option<ClassStatus>,
    pub search: String,
}

impl TeacherClassFilters {
    pub fn matches(&self, class: &Class) -> bool {
        if self.status.is_some() && class.status != self.status {
            return false;
        }
        let needle = normalize_query(&self.search);
        matches_any(
            &needle,
            [
                class.title.as_deref(),
                class.course.as_ref().and_then(|course| course.name.as_deref()),
                class.status.map(ClassStatus::as_str),
            ],
        )
    }
}

/// A student enrolled in one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassStudent {
    pub id: String,
    pub name: String,
}

/// One of the teacher's students with the classes they are enrolled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub class_ids: Vec<String>,
    pub class_names: String,
}

pub struct TeacherDashboard<G: ?Sized> {
    store: Arc<TeacherStore<G>>,
    notifier: Notifier,
    in_flight: InFlight,
    video_call_path: String,
    filters: TeacherClassFilters,
    create_modal: CreateAssignmentModal,
    grade_modal: GradeSubmissionModal,
}

impl<G: TeacherApi + ?Sized> TeacherDashboard<G> {
    pub fn new(store: Arc<TeacherStore<G>>, video_call_path: impl Into<String>) -> Self {
        Self {
            store,
            notifier: Notifier::default(),
            in_flight: InFlight::default(),
            video_call_path: video_call_path.into().trim_end_matches('/').to_string(),
            filters: TeacherClassFilters::default(),
            create_modal: CreateAssignmentModal::default(),
            grade_modal: GradeSubmissionModal::default(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn state(&self) -> TeacherState {
        self.store.snapshot()
    }

    pub async fn load(&self) -> RefreshReport<TeacherResource> {
        let report = self.store.load_all().await;
        if !report.is_complete() {
            self.notifier.error("Failed to load dashboard data");
        }
        report
    }

    pub fn stats(&self, now: OffsetDateTime) -> TeacherStats {
        self.store.snapshot().stats(now)
    }

    pub fn filters_mut(&mut self) -> &mut TeacherClassFilters {
        &mut self.filters
    }

    pub fn filtered_classes(&self) -> Vec<Class> {
        self.store.snapshot().classes.into_iter().filter(|class| self.filters.matches(class)).collect()
    }

    /// Students enrolled in `class_id`, as listed on the class card.
    pub fn students_for_class(&self, class_id: &str) -> Vec<ClassStudent> {
        let state = self.store.snapshot();
        let Some(class) = state.classes.iter().find(|class| class.id == class_id) else {
            return Vec::new();
        };
        class
            .enrolled
            .iter()
            .map(|enrollment| ClassStudent {
                id: enrollment.student_id.clone().unwrap_or_default(),
                name: enrollment
                    .profile
                    .as_ref()
                    .and_then(|profile| profile.name.clone())
                    .unwrap_or_else(|| "Unknown Student".to_string()),
            })
            .collect()
    }

    /// The teacher's students with their classes, optionally narrowed to
    /// those enrolled in `class_id`.
    pub fn roster(&self, class_id: Option<&str>) -> Vec<RosterEntry> {
        let state = self.store.snapshot();
        state
            .students
            .iter()
            .map(|student| {
                let classes: Vec<&Class> = state
                    .classes
                    .iter()
                    .filter(|class| {
                        class
                            .enrolled
                            .iter()
                            .any(|enrollment| enrollment.student_id.as_deref() == Some(student.id.as_str()))
                    })
                    .collect();
                let class_names = if classes.is_empty() {
                    "Not assigned to any class".to_string()
                } else {
                    classes.iter().map(|class| class.display_title()).collect::<Vec<_>>().join(", ")
                };
                RosterEntry {
                    id: student.id.clone(),
                    name: student.name.clone(),
                    class_ids: classes.iter().map(|class| class.id.clone()).collect(),
                    class_names,
                }
            })
            .filter(|entry| class_id.map_or(true, |id| entry.class_ids.iter().any(|class| class == id)))
            .collect()
    }

    pub fn create_modal(&mut self) -> &mut CreateAssignmentModal {
        &mut self.create_modal
    }

    pub fn grade_modal(&mut self) -> &mut GradeSubmissionModal {
        &mut self.grade_modal
    }

    pub async fn create_assignment(&mut self) -> Result<(), SubmitError> {
        let outcome = self.create_modal.submit(self.store.gateway()).await;
        self.report(outcome, "Assignment created successfully!").await
    }

    pub async fn grade_submission(&mut self) -> Result<(), SubmitError> {
        let outcome = self.grade_modal.submit(self.store.gateway()).await;
        self.report(outcome, "Assignment graded successfully!").await
    }

    /// Starts a video session for one of the teacher's classes and returns
    /// the call link.
    pub async fn start_session(&self, class_id: &str) -> Result<String, ActionError> {
        let _guard = self.in_flight.begin(format!("session_{class_id}")).ok_or(ActionError::Busy)?;

        match self.store.gateway().start_class_session(class_id).await {
            Ok(session) => {
                self.notifier.success("Video session started!");
                Ok(format!("{}/{}", self.video_call_path, session.meeting_key()))
            }
            Err(err) => {
                let message = format!("Failed to start session: {err}");
                self.notifier.error(message.clone());
                Err(ActionError::Failed { message, source: err })
            }
        }
    }

    async fn report(&self, outcome: Result<(), SubmitError>, success: &str) -> Result<(), SubmitError> {
        match &outcome {
            Ok(()) => {
                self.notifier.success(success);
                self.store.refresh(&[TeacherResource::Assignments]).await;
            }
            Err(err) => {
                self.notifier.error(err.to_string());
            }
        }
        outcome
    }
}
