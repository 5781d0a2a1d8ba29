use serde::{Deserialize, Serialize};

use crate::schemas::types::TeacherStatus;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Teacher {
    pub id: String,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::schemas::null_as_default")]
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub status: TeacherStatus,
}

/// Teacher fields embedded in class, session and student rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TeacherSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherCreate {
    pub name: String,
    pub email: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub login_url: String,
}

impl Credentials {
    /// Text copied right after a teacher is created.
    pub fn clipboard_text(&self) -> String {
        format!("Email: {}\nPassword: {}\nLogin: {}", self.email, self.password, self.login_url)
    }

    /// Text copied from the credentials panel's explicit copy action.
    pub fn share_text(&self) -> String {
        format!(
            "Teacher Login Credentials:\nEmail: {}\nPassword: {}\nLogin URL: {}\n\nPlease share these credentials securely with the teacher.",
            self.email, self.password, self.login_url
        )
    }
}

/// Raw `POST /api/admin/teachers` body. The gateway turns it into
/// [`TeacherCreated`] or an error.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateTeacherResponse {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) teacher: Option<Teacher>,
    #[serde(default)]
    pub(crate) credentials: Option<Credentials>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeacherCreated {
    pub teacher: Teacher,
    pub credentials: Credentials,
}
