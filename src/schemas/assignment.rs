use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

use crate::core::time::deserialize_option_timestamp;
use crate::schemas::types::SubmissionStatus;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub class_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub submissions: Vec<Submission>,
    #[serde(default)]
    pub submitted_count: Option<usize>,
    #[serde(default)]
    pub graded_count: Option<usize>,
    #[serde(default)]
    pub pending_count: Option<usize>,
}

pub(crate) fn default_max_score() -> u32 {
    100
}

impl Assignment {
    pub fn submitted(&self) -> usize {
        self.submitted_count.unwrap_or(self.submissions.len())
    }

    pub fn graded(&self) -> usize {
        self.graded_count
            .unwrap_or_else(|| self.submissions.iter().filter(|sub| sub.is_graded()).count())
    }

    /// Submissions still waiting for a score.
    pub fn pending(&self) -> usize {
        self.pending_count
            .unwrap_or_else(|| self.submissions.iter().filter(|sub| !sub.is_graded()).count())
    }

    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        self.due_date.is_some_and(|due| due < now) && self.pending() > 0
    }

    /// Distinct students that have submitted at least once.
    pub fn student_count(&self) -> usize {
        let mut ids: Vec<&str> =
            self.submissions.iter().filter_map(|sub| sub.student_id.as_deref()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub submitted_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }
}

/// The assignment list endpoint answers either with a bare array or with a
/// paged envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AssignmentListBody {
    Bare(Vec<Assignment>),
    Paged { assignments: Vec<Assignment> },
}

impl AssignmentListBody {
    pub(crate) fn into_items(self) -> Vec<Assignment> {
        match self {
            Self::Bare(items) | Self::Paged { assignments: items } => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentTargets {
    All,
    Selected(Vec<String>),
}

impl StudentTargets {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl Serialize for StudentTargets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Selected(ids) => ids.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentCreate {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub max_score: u32,
    pub class_id: Option<String>,
    pub for_all_students: bool,
    pub student_ids: StudentTargets,
}

/// Query for `GET /api/teacher/assignments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentQuery {
    pub status: Option<SubmissionStatus>,
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for AssignmentQuery {
    fn default() -> Self {
        Self { status: None, student_id: None, class_id: None, page: 1, limit: 50 }
    }
}

impl AssignmentQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(status) = self.status {
            let status = match status {
                SubmissionStatus::Pending => "pending",
                SubmissionStatus::Submitted => "submitted",
                SubmissionStatus::Graded => "graded",
            };
            pairs.push(("status", status.to_string()));
        }
        if let Some(student_id) = &self.student_id {
            pairs.push(("student_id", student_id.clone()));
        }
        if let Some(class_id) = &self.class_id {
            pairs.push(("class_id", class_id.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRequest {
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_are_derived_when_server_omits_them() {
        let assignment: Assignment = serde_json::from_value(json!({
            "id": "a1",
            "title": "Surah Al-Mulk recitation",
            "due_date": "2025-01-10T00:00:00Z",
            "submissions": [
                {"id": "s1", "student_id": "st1", "score": 9.0},
                {"id": "s2", "student_id": "st2", "score": null},
                {"id": "s3", "student_id": "st2"}
            ]
        }))
        .expect("assignment");

        assert_eq!(assignment.max_score, 100);
        assert_eq!(assignment.submitted(), 3);
        assert_eq!(assignment.graded(), 1);
        assert_eq!(assignment.pending(), 2);
        assert_eq!(assignment.student_count(), 2);
        assert!(assignment.is_overdue(time::macros::datetime!(2025-02-01 0:00 UTC)));
    }

    #[test]
    fn student_targets_serialize_as_all_or_list() {
        assert_eq!(serde_json::to_value(StudentTargets::All).expect("all"), json!("all"));
        assert_eq!(
            serde_json::to_value(StudentTargets::Selected(vec!["s1".to_string()])).expect("list"),
            json!(["s1"])
        );
    }

    #[test]
    fn list_body_accepts_envelope() {
        let body: AssignmentListBody =
            serde_json::from_value(json!({"assignments": [{"id": "a1", "title": "T"}], "total": 1}))
                .expect("envelope");
        assert_eq!(body.into_items().len(), 1);
    }

    #[test]
    fn query_always_carries_paging() {
        let query = AssignmentQuery { class_id: Some("c1".to_string()), ..AssignmentQuery::default() };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "1".to_string()),
                ("limit", "50".to_string()),
                ("class_id", "c1".to_string())
            ]
        );
    }
}
