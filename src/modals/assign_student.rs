use std::collections::BTreeMap;

use super::state::{FormError, SubmitError};
use crate::schemas::student::StudentAssignment;
use crate::services::gateway::AdminApi;

/// Assigns unassigned students to teachers, one row at a time or in bulk.
///
/// The selection map is local draft state only. Nothing in the store is
/// edited here; callers refetch students after a successful write.
#[derive(Debug, Clone, Default)]
pub struct AssignStudentModal {
    open: bool,
    selections: BTreeMap<String, String>,
    bulk_submitting: bool,
}

impl AssignStudentModal {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) -> bool {
        if self.bulk_submitting {
            return false;
        }
        self.open = false;
        self.selections.clear();
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_bulk_submitting(&self) -> bool {
        self.bulk_submitting
    }

    /// Picks a teacher for a student. An empty id clears the row.
    pub fn select(&mut self, student_id: &str, teacher_id: &str) {
        if teacher_id.is_empty() {
            self.selections.remove(student_id);
        } else {
            self.selections.insert(student_id.to_string(), teacher_id.to_string());
        }
    }

    pub fn selection(&self, student_id: &str) -> Option<&str> {
        self.selections.get(student_id).map(String::as_str)
    }

    pub fn selected_rows(&self) -> Vec<StudentAssignment> {
        self.selections
            .iter()
            .map(|(student_id, teacher_id)| StudentAssignment {
                student_id: student_id.clone(),
                teacher_id: teacher_id.clone(),
            })
            .collect()
    }

    /// Assigns a single student right away using the row's selection.
    pub async fn quick_assign<G: AdminApi + ?Sized>(
        &mut self,
        gateway: &G,
        student_id: &str,
    ) -> Result<(), SubmitError> {
        let Some(teacher_id) = self.selection(student_id).map(str::to_string) else {
            return Err(FormError::Invalid("Please select a teacher".to_string()).into());
        };

        match gateway.assign_student(student_id, &teacher_id).await {
            Ok(()) => {
                self.selections.remove(student_id);
                Ok(())
            }
            Err(err) => Err(SubmitError::Rejected {
                message: format!("Failed to assign student: {err}"),
                source: err,
            }),
        }
    }

    /// Sends every selected row in one request and returns the server's
    /// aggregate `assigned` count. Rows the server skipped are not reported
    /// individually.
    pub async fn bulk_assign<G: AdminApi + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<usize, SubmitError> {
        if self.bulk_submitting {
            return Err(FormError::Busy.into());
        }
        let rows = self.selected_rows();
        if rows.is_empty() {
            return Err(FormError::Invalid("No assignments selected".to_string()).into());
        }

        self.bulk_submitting = true;
        let outcome = gateway.bulk_assign(&rows).await;
        self.bulk_submitting = false;

        match outcome {
            Ok(result) => {
                self.close();
                Ok(result.assigned)
            }
            Err(err) => Err(SubmitError::Rejected {
                message: format!("Failed to assign students: {err}"),
                source: err,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{student_fixture, teacher_fixture, FakeGateway};

    #[tokio::test]
    async fn quick_assign_requires_a_selection() {
        let gateway = FakeGateway::default();
        let mut modal = AssignStudentModal::default();
        modal.open();

        let err = modal.quick_assign(&gateway, "s1").await.expect_err("no teacher");

        assert_eq!(err.to_string(), "Please select a teacher");
        assert_eq!(gateway.call_count("assign_student"), 0);
    }

    #[tokio::test]
    async fn empty_bulk_is_rejected_locally() {
        let gateway = FakeGateway::default();
        let mut modal = AssignStudentModal::default();
        modal.open();
        modal.select("s1", "t1");
        modal.select("s1", "");

        let err = modal.bulk_assign(&gateway).await.expect_err("empty");

        assert_eq!(err.to_string(), "No assignments selected");
        assert_eq!(gateway.call_count("bulk_assign"), 0);
    }

    #[tokio::test]
    async fn bulk_reports_server_count_when_a_row_is_skipped() {
        let gateway = FakeGateway::default();
        gateway.seed(|state| {
            state.teachers = vec![teacher_fixture("t1", "A. Khan", "khan@academy.test", "Tajweed")];
            state.students =
                vec![student_fixture("s1", "Maryam", None), student_fixture("s2", "Yusuf", None)];
            state.bulk_rejects.insert("s2".to_string());
        });
        let mut modal = AssignStudentModal::default();
        modal.open();
        modal.select("s1", "t1");
        modal.select("s2", "t1");

        let assigned = modal.bulk_assign(&gateway).await.expect("bulk");

        assert_eq!(assigned, 1);
        assert!(!modal.is_open());
        assert!(modal.selected_rows().is_empty());
    }

    #[tokio::test]
    async fn failed_bulk_keeps_selections() {
        let gateway = FakeGateway::default();
        gateway.fail("bulk_assign", crate::services::gateway::GatewayError::network());
        let mut modal = AssignStudentModal::default();
        modal.open();
        modal.select("s1", "t1");

        let err = modal.bulk_assign(&gateway).await.expect_err("offline");

        assert!(err.to_string().starts_with("Failed to assign students: Cannot connect"));
        assert_eq!(modal.selection("s1"), Some("t1"));
        assert!(modal.is_open());
        assert!(!modal.is_bulk_submitting());
    }
}
