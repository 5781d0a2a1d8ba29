use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::time::deserialize_option_timestamp;
use crate::schemas::session::VideoSession;
use crate::schemas::teacher::TeacherSummary;
use crate::schemas::types::{ClassStatus, RecurrenceType};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Class {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub teacher: Option<TeacherSummary>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub scheduled_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub status: Option<ClassStatus>,
    #[serde(default)]
    pub is_exam: bool,
    #[serde(default)]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default)]
    pub recurrence_interval: Option<u32>,
    #[serde(default)]
    pub recurrence_days: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub max_students: Option<u32>,
    #[serde(default)]
    pub meeting_id: Option<String>,
    #[serde(default)]
    pub course: Option<CourseSummary>,
    #[serde(default, alias = "students_classes", deserialize_with = "crate::schemas::null_as_default")]
    pub enrolled: Vec<Enrollment>,
    #[serde(default)]
    pub enrolled_count: Option<u32>,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub video_sessions: Vec<VideoSession>,
}

impl Class {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|value| !value.is_empty())
            .or_else(|| self.name.as_deref().filter(|value| !value.is_empty()))
            .unwrap_or("Untitled Class")
    }

    pub fn teacher_name(&self) -> &str {
        self.teacher.as_ref().and_then(|teacher| teacher.name.as_deref()).unwrap_or("Unassigned")
    }

    pub fn enrolled_total(&self) -> usize {
        if self.enrolled.is_empty() {
            self.enrolled_count.unwrap_or(0) as usize
        } else {
            self.enrolled.len()
        }
    }

    /// `Students: 4 / 20`, or without the cap when none is set.
    pub fn capacity_label(&self) -> String {
        match self.max_students {
            Some(max) => format!("Students: {} / {max}", self.enrolled_total()),
            None => format!("Students: {}", self.enrolled_total()),
        }
    }

    pub fn status_label(&self) -> String {
        self.status.map(ClassStatus::as_str).unwrap_or("unknown").to_uppercase()
    }

    /// Date shown on the card: the scheduled date, else the creation date.
    pub fn display_date(&self) -> Option<OffsetDateTime> {
        self.scheduled_date.or(self.created_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseSummary {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Enrollment {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default, alias = "profiles")]
    pub profile: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileSummary {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCreate {
    pub title: String,
    pub teacher_id: String,
    pub scheduled_date: String,
    pub duration: u32,
    pub description: String,
    pub status: ClassStatus,
    pub is_exam: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_students: Option<u32>,
    pub recurring: bool,
    pub recurrence_type: RecurrenceType,
    pub recurrence_days: u32,
    pub recurrence_interval: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClassStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_students: Option<u32>,
}

impl ClassUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Server-side filters for `GET /api/admin/classes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassQuery {
    pub status: Option<ClassStatus>,
    pub teacher_id: Option<String>,
}

impl ClassQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(teacher_id) = &self.teacher_id {
            pairs.push(("teacher_id", teacher_id.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_reads_legacy_enrollment_key() {
        let class: Class = serde_json::from_value(json!({
            "id": "c1",
            "name": "Tajweed basics",
            "status": "scheduled",
            "scheduled_date": "2025-03-01T09:00:00Z",
            "max_students": 20,
            "students_classes": [
                {"student_id": "s1", "profiles": {"name": "Maryam"}},
                {"student_id": "s2"}
            ]
        }))
        .expect("class");

        assert_eq!(class.display_title(), "Tajweed basics");
        assert_eq!(class.enrolled_total(), 2);
        assert_eq!(class.capacity_label(), "Students: 2 / 20");
        assert_eq!(class.status_label(), "SCHEDULED");
        assert_eq!(class.teacher_name(), "Unassigned");
    }

    #[test]
    fn class_update_skips_unset_fields() {
        let update = ClassUpdate { status: Some(ClassStatus::Cancelled), ..ClassUpdate::default() };
        assert_eq!(serde_json::to_value(&update).expect("update"), json!({"status": "cancelled"}));
        assert!(ClassUpdate::default().is_empty());
    }

    #[test]
    fn null_enrollment_lists_read_as_empty() {
        let class: Class = serde_json::from_value(json!({
            "id": "c1",
            "title": "Hifz",
            "students_classes": null,
            "video_sessions": null
        }))
        .expect("class");

        assert_eq!(class.enrolled_total(), 0);
        assert!(class.video_sessions.is_empty());
    }
}
