use std::sync::Arc;

use crate::schemas::assignment::{Assignment, SubmissionCreate};
use crate::schemas::class::Class;
use crate::schemas::types::SubmissionStatus;
use crate::sections::{ActionError, InFlight, Notifier};
use crate::services::gateway::StudentApi;
use crate::store::{RefreshReport, StudentResource, StudentState, StudentStore};

pub const NO_TEACHER_MESSAGE: &str =
    "You haven't been assigned to a teacher yet. Please contact admin to get started with your classes.";
pub const NO_CLASSES_MESSAGE: &str = "No classes scheduled yet. Your teacher will schedule classes soon.";

/// Badge text for the student's own submission on `assignment`.
pub fn submission_label(assignment: &Assignment) -> String {
    let Some(submission) = assignment.submissions.first() else {
        return "Pending".to_string();
    };
    match (submission.status, submission.score) {
        (Some(SubmissionStatus::Graded), Some(score)) | (None, Some(score)) => {
            format!("Graded: {}/{}", format_score(score), assignment.max_score)
        }
        (Some(SubmissionStatus::Graded), None) => format!("Graded: -/{}", assignment.max_score),
        (Some(SubmissionStatus::Submitted), _) | (None, None) => "Submitted".to_string(),
        (Some(SubmissionStatus::Pending), _) => "Pending".to_string(),
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        score.to_string()
    }
}

/// The student's own dashboard: their teacher, the teacher's classes and
/// their assignments.
pub struct StudentPortal<G: ?Sized> {
    store: Arc<StudentStore<G>>,
    notifier: Notifier,
    in_flight: InFlight,
}

impl<G: StudentApi + ?Sized> StudentPortal<G> {
    pub fn new(store: Arc<StudentStore<G>>) -> Self {
        Self { store, notifier: Notifier::default(), in_flight: InFlight::default() }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn state(&self) -> StudentState {
        self.store.snapshot()
    }

    pub async fn load(&self) -> RefreshReport<StudentResource> {
        self.store.load_all().await
    }

    pub fn classes(&self) -> Vec<Class> {
        self.store.snapshot().dashboard.map(|dashboard| dashboard.classes).unwrap_or_default()
    }

    /// Message shown in place of the class list, if any.
    pub fn classes_placeholder(&self) -> Option<&'static str> {
        let state = self.store.snapshot();
        if !state.has_teacher() {
            Some(NO_TEACHER_MESSAGE)
        } else if state.dashboard.is_some_and(|dashboard| dashboard.classes.is_empty()) {
            Some(NO_CLASSES_MESSAGE)
        } else {
            None
        }
    }

    pub fn is_submitting(&self, assignment_id: &str) -> bool {
        self.in_flight.contains(assignment_id)
    }

    pub async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: &SubmissionCreate,
    ) -> Result<(), ActionError> {
        let _guard = self.in_flight.begin(assignment_id).ok_or(ActionError::Busy)?;

        match self.store.gateway().submit_assignment(assignment_id, submission).await {
            Ok(()) => {
                self.notifier.success("Assignment submitted successfully!");
                // A failed reload is already logged by the store.
                let _ = self.store.fetch(StudentResource::Assignments).await;
                Ok(())
            }
            Err(err) => {
                let message = format!("Failed to submit assignment: {err}");
                self.notifier.error(message.clone());
                Err(ActionError::Failed { message, source: err })
            }
        }
    }
}
