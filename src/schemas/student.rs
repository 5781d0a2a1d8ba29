use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::time::deserialize_option_timestamp;
use crate::schemas::class::Class;
use crate::schemas::teacher::TeacherSummary;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub email: String,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub assigned_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub teacher: Option<TeacherSummary>,
}

impl Student {
    /// Only a missing `teacher_id` counts as unassigned; an id pointing at a
    /// teacher that no longer exists still reads as assigned.
    pub fn is_assigned(&self) -> bool {
        self.teacher_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentCreate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

/// One row of a bulk assignment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentAssignment {
    #[serde(rename = "studentId")]
    pub student_id: String,
    #[serde(rename = "teacherId")]
    pub teacher_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BulkAssignResult {
    #[serde(default)]
    pub assigned: usize,
}

/// `GET /api/student/dashboard`: the student, their teacher and the
/// teacher's classes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentDashboard {
    pub student: Student,
    #[serde(default)]
    pub teacher: Option<TeacherSummary>,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub classes: Vec<Class>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_teacher_id_is_unassigned() {
        let student: Student = serde_json::from_value(json!({
            "id": "s1",
            "name": "Maryam",
            "email": "m@x.com",
            "teacher_id": ""
        }))
        .expect("student");
        assert!(!student.is_assigned());
    }

    #[test]
    fn bulk_row_uses_camel_case_keys() {
        let row = StudentAssignment { student_id: "s1".to_string(), teacher_id: "t1".to_string() };
        assert_eq!(
            serde_json::to_value(&row).expect("row"),
            json!({"studentId": "s1", "teacherId": "t1"})
        );
    }

    #[test]
    fn null_fields_do_not_sink_the_list() {
        let students: Vec<Student> = serde_json::from_value(json!([
            {"id": "s1", "name": "Maryam", "email": "m@x.com"},
            {"id": "s2", "name": null, "email": null, "teacher_id": "t1"}
        ]))
        .expect("students");

        assert_eq!(students.len(), 2);
        assert_eq!(students[1].name, "");
        assert!(students[1].is_assigned());
    }
}
