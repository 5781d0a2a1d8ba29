use serde::Deserialize;
use time::OffsetDateTime;

use crate::core::time::deserialize_option_timestamp;

/// Server-computed counters from `GET /api/admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminStats {
    #[serde(default, alias = "totalTeachers")]
    pub total_teachers: u64,
    #[serde(default, alias = "totalStudents")]
    pub total_students: u64,
    #[serde(default, alias = "activeClasses")]
    pub active_classes: u64,
    #[serde(default, alias = "liveSessions")]
    pub live_sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminAction {
    pub id: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "deserialize_option_timestamp")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdminActionPage {
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub actions: Vec<AdminAction>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}
