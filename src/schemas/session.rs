use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::time::deserialize_option_timestamp;
use crate::schemas::teacher::TeacherSummary;
use crate::schemas::types::SessionStatus;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoSession {
    pub id: String,
    #[serde(default)]
    pub meeting_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub teacher: Option<TeacherSummary>,
    #[serde(default, rename = "class")]
    pub class_info: Option<SessionClass>,
    #[serde(default)]
    pub agenda: Option<String>,
}

impl VideoSession {
    /// Key used by the join/remove endpoints: the meeting id, else the row id.
    pub fn meeting_key(&self) -> &str {
        self.meeting_id.as_deref().filter(|value| !value.is_empty()).unwrap_or(&self.id)
    }

    pub fn is_live(&self) -> bool {
        self.status == Some(SessionStatus::Active)
    }

    pub fn status_label(&self) -> String {
        self.status.map(SessionStatus::as_str).unwrap_or("unknown").to_uppercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionClass {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartSession {
    #[serde(rename = "classId")]
    pub class_id: String,
    #[serde(rename = "teacherId", skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(rename = "className")]
    pub class_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JoinedCall {
    #[serde(default, alias = "meetingId")]
    pub meeting_id: Option<String>,
    #[serde(default, alias = "joinUrl")]
    pub join_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meeting_key_falls_back_to_row_id() {
        let session: VideoSession = serde_json::from_value(json!({
            "id": "row-1",
            "status": "live",
            "participants": [{"id": "p1"}, {"id": "p2"}]
        }))
        .expect("session");

        assert_eq!(session.meeting_key(), "row-1");
        assert!(session.is_live());
        assert_eq!(session.participants.len(), 2);
        assert_eq!(session.status_label(), "ACTIVE");
    }

    #[test]
    fn null_participants_count_as_none() {
        let sessions: Vec<VideoSession> = serde_json::from_value(json!([
            {"id": "row-1", "participants": null},
            {"id": "row-2", "participants": [{"id": "p1"}]}
        ]))
        .expect("sessions");

        assert!(sessions[0].participants.is_empty());
        assert_eq!(sessions[1].participants.len(), 1);
    }
}
