use std::time::Duration;

use super::filter::{matches_any, normalize_query, Debounced};
use super::{ActionError, SectionContext};
use crate::modals::{AssignStudentModal, SubmitError};
use crate::schemas::student::Student;
use crate::schemas::teacher::Teacher;
use crate::services::gateway::AdminApi;
use crate::store::ResourceKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentCounts {
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
}

pub struct StudentsSection<G: ?Sized> {
    ctx: SectionContext<G>,
    search: Debounced,
    assign_modal: AssignStudentModal,
}

impl<G: AdminApi + ?Sized> StudentsSection<G> {
    pub fn new(ctx: SectionContext<G>, search_debounce: Duration) -> Self {
        Self { ctx, search: Debounced::new(search_debounce), assign_modal: AssignStudentModal::default() }
    }

    pub fn search_input(&mut self, raw: impl Into<String>) {
        self.search.input(raw);
    }

    /// Applies typed search text once the debounce window has passed.
    pub fn poll_search(&mut self) -> bool {
        self.search.poll()
    }

    pub async fn settle_search(&mut self) -> bool {
        self.search.settle().await
    }

    pub fn search_term(&self) -> &str {
        self.search.value()
    }

    pub fn filtered_students(&self) -> Vec<Student> {
        let needle = normalize_query(self.search.value());
        self.ctx
            .store
            .snapshot()
            .students
            .into_iter()
            .filter(|student| {
                matches_any(
                    &needle,
                    [
                        Some(student.name.as_str()),
                        Some(student.email.as_str()),
                        student.course.as_deref(),
                        student.teacher_name.as_deref(),
                    ],
                )
            })
            .collect()
    }

    pub fn counts(&self) -> StudentCounts {
        let students = self.ctx.store.snapshot().students;
        let assigned = students.iter().filter(|student| student.is_assigned()).count();
        StudentCounts { total: students.len(), assigned, unassigned: students.len() - assigned }
    }

    pub fn unassigned_students(&self) -> Vec<Student> {
        self.ctx.store.snapshot().students.into_iter().filter(|student| !student.is_assigned()).collect()
    }

    /// Teachers offered in the assignment picker.
    pub fn teacher_options(&self) -> Vec<Teacher> {
        self.ctx.store.snapshot().teachers
    }

    pub fn assign_modal(&mut self) -> &mut AssignStudentModal {
        &mut self.assign_modal
    }

    pub async fn quick_assign(&mut self, student_id: &str) -> Result<(), SubmitError> {
        let outcome = self.assign_modal.quick_assign(self.ctx.gateway(), student_id).await;
        self.report(outcome, |_| "Student assigned successfully!".to_string()).await
    }

    pub async fn bulk_assign(&mut self) -> Result<usize, SubmitError> {
        let outcome = self.assign_modal.bulk_assign(self.ctx.gateway()).await;
        self.report(outcome, |assigned| format!("Successfully assigned {assigned} students!")).await
    }

    pub async fn unassign_student(&self, student_id: &str) -> Result<(), ActionError> {
        self.ctx.confirm("Are you sure you want to unassign this student?")?;
        let _guard = self.ctx.claim(format!("unassign_{student_id}"))?;

        let outcome = self.ctx.gateway().unassign_student(student_id).await;
        self.ctx
            .finish(
                outcome,
                |_| "Student unassigned successfully".to_string(),
                |err| format!("Failed to unassign student: {err}"),
                &[ResourceKind::Students],
            )
            .await
    }

    pub async fn remove_student(&self, student_id: &str) -> Result<(), ActionError> {
        self.ctx.confirm("Are you sure you want to remove this student?")?;
        let _guard = self.ctx.claim(format!("remove_{student_id}"))?;

        let outcome = self.ctx.gateway().remove_student(student_id).await;
        self.ctx
            .finish(
                outcome,
                |_| "Student removed successfully".to_string(),
                |err| format!("Failed to remove student: {err}"),
                &[ResourceKind::Students],
            )
            .await
    }

    pub async fn refresh(&self) {
        self.ctx.store.refresh(&[ResourceKind::Students]).await;
    }

    async fn report<T>(
        &self,
        outcome: Result<T, SubmitError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, SubmitError> {
        match &outcome {
            Ok(value) => {
                self.ctx.notifier.success(success(value));
                self.ctx.store.refresh(&[ResourceKind::Students]).await;
            }
            Err(err) => {
                self.ctx.notifier.error(err.to_string());
            }
        }
        outcome
    }
}
