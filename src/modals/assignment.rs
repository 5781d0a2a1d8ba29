use std::collections::BTreeSet;

use validator::Validate;

use super::state::{FormError, ModalForm, SubmitError};
use crate::core::time::{format_rfc3339, parse_timestamp};
use crate::schemas::assignment::{
    default_max_score, AssignmentCreate, GradeRequest, StudentTargets, Submission,
};
use crate::services::gateway::{GatewayError, TeacherApi};
use crate::services::session::SESSION_EXPIRED_MESSAGE;

pub(crate) const NO_STUDENTS_MESSAGE: &str = "No students are assigned to you yet. Please contact administration to assign students to your account.";

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct AssignmentForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    #[validate(range(min = 1, message = "Max score must be at least 1"))]
    pub max_score: u32,
    pub class_id: Option<String>,
    pub for_all_students: bool,
    pub selected_students: BTreeSet<String>,
}

impl Default for AssignmentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            max_score: default_max_score(),
            class_id: None,
            for_all_students: true,
            selected_students: BTreeSet::new(),
        }
    }
}

impl AssignmentForm {
    pub fn toggle_student(&mut self, student_id: &str) {
        if !self.selected_students.remove(student_id) {
            self.selected_students.insert(student_id.to_string());
        }
    }

    fn to_request(&self) -> Result<AssignmentCreate, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::Invalid("Please provide a title for the assignment".to_string()));
        }
        if self.due_date.trim().is_empty() {
            return Err(FormError::Invalid("Please set a due date for the assignment".to_string()));
        }
        let due = parse_timestamp(&self.due_date).ok_or_else(|| {
            FormError::Invalid("Please set a due date for the assignment".to_string())
        })?;

        let student_ids = if self.for_all_students {
            StudentTargets::All
        } else if self.selected_students.is_empty() {
            return Err(FormError::Invalid("Please select at least one student".to_string()));
        } else {
            StudentTargets::Selected(self.selected_students.iter().cloned().collect())
        };

        Ok(AssignmentCreate {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            due_date: format_rfc3339(due),
            max_score: self.max_score,
            class_id: self.class_id.clone().filter(|id| !id.is_empty()),
            for_all_students: self.for_all_students,
            student_ids,
        })
    }
}

pub(crate) fn describe_assignment_error(err: &GatewayError) -> String {
    let message = err.to_string();
    if message.contains("No valid students") {
        NO_STUDENTS_MESSAGE.to_string()
    } else if err.is_auth_failure() || message.contains("token") || message.contains("Unauthorized") {
        SESSION_EXPIRED_MESSAGE.to_string()
    } else {
        format!("Failed to create assignment: {message}")
    }
}

pub type CreateAssignmentModal = ModalForm<AssignmentForm>;

impl ModalForm<AssignmentForm> {
    pub async fn submit<G: TeacherApi + ?Sized>(&mut self, gateway: &G) -> Result<(), SubmitError> {
        let request = self.prepare(AssignmentForm::to_request)?;
        let outcome = gateway.create_assignment(&request).await;
        self.settle(outcome, describe_assignment_error)
    }
}

/// Score entry for one submission. The score is kept as typed so a bad
/// value can be reported instead of silently becoming zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct GradeForm {
    #[validate(length(min = 1, message = "Select a submission to grade"))]
    pub submission_id: String,
    pub student_name: String,
    pub score: String,
    pub feedback: String,
}

impl GradeForm {
    fn to_request(&self) -> Result<GradeRequest, FormError> {
        let score = self
            .score
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite() && *score >= 0.0)
            .ok_or_else(|| FormError::Invalid("Please enter a valid score".to_string()))?;

        Ok(GradeRequest { score, feedback: self.feedback.trim().to_string() })
    }
}

pub type GradeSubmissionModal = ModalForm<GradeForm>;

impl ModalForm<GradeForm> {
    /// Opens the grader prefilled with any existing score and feedback.
    pub fn open_for(&mut self, submission: &Submission) -> bool {
        if self.is_open() {
            return false;
        }
        self.open();
        match self.edit() {
            Ok(form) => {
                *form = GradeForm {
                    submission_id: submission.id.clone(),
                    student_name: submission
                        .student_name
                        .clone()
                        .unwrap_or_else(|| "Unknown Student".to_string()),
                    score: submission.score.map(|score| score.to_string()).unwrap_or_default(),
                    feedback: submission.feedback.clone().unwrap_or_default(),
                };
                true
            }
            Err(_) => false,
        }
    }

    pub async fn submit<G: TeacherApi + ?Sized>(&mut self, gateway: &G) -> Result<(), SubmitError> {
        let (submission_id, grade) =
            self.prepare(|form| Ok((form.submission_id.clone(), form.to_request()?)))?;
        let outcome = gateway.grade_submission(&submission_id, &grade).await;
        self.settle(outcome, |err| format!("Failed to grade assignment: {err}"))
    }
}
