use validator::Validate;

use super::state::{ModalForm, SubmitError};
use crate::schemas::teacher::{Credentials, TeacherCreate, TeacherCreated};
use crate::services::gateway::{AdminApi, GatewayError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct TeacherForm {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
}

pub type AddTeacherModal = ModalForm<TeacherForm>;

pub(crate) const DUPLICATE_TEACHER_MESSAGE: &str = "A teacher with this email already exists";

/// Text shown for a failed teacher creation.
pub(crate) fn describe_create_error(err: &GatewayError) -> String {
    let message = err.to_string();
    if message.contains("already exists") {
        DUPLICATE_TEACHER_MESSAGE.to_string()
    } else if message.is_empty() {
        "Failed to add teacher".to_string()
    } else {
        message
    }
}

impl ModalForm<TeacherForm> {
    pub async fn submit<G: AdminApi + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<TeacherCreated, SubmitError> {
        let request = self.prepare(|form| {
            Ok(TeacherCreate {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                subject: form.subject.trim().to_string(),
            })
        })?;
        let outcome = gateway.create_teacher(&request).await;
        self.settle(outcome, describe_create_error)
    }
}

/// Shows a new teacher's credentials exactly once. Dismissing it drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsPanel {
    credentials: Option<Credentials>,
}

impl CredentialsPanel {
    pub fn show(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn dismiss(&mut self) {
        self.credentials = None;
    }
}
