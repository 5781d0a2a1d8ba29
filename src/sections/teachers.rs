use std::sync::Arc;

use super::notify::Clipboard;
use super::{ActionError, SectionContext};
use crate::modals::{AddTeacherModal, CredentialsPanel, SubmitError};
use crate::schemas::teacher::Teacher;
use crate::services::gateway::AdminApi;
use crate::store::ResourceKind;

pub const REMOVE_TEACHER_PROMPT: &str = "Are you sure you want to remove this teacher?";

pub struct TeachersSection<G: ?Sized> {
    ctx: SectionContext<G>,
    clipboard: Arc<dyn Clipboard>,
    add_modal: AddTeacherModal,
    credentials: CredentialsPanel,
}

impl<G: AdminApi + ?Sized> TeachersSection<G> {
    pub fn new(ctx: SectionContext<G>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            ctx,
            clipboard,
            add_modal: AddTeacherModal::default(),
            credentials: CredentialsPanel::default(),
        }
    }

    pub fn teachers(&self) -> Vec<Teacher> {
        self.ctx.store.snapshot().teachers
    }

    pub fn is_loading(&self) -> bool {
        self.ctx.store.snapshot().is_loading(ResourceKind::Teachers)
    }

    pub fn add_modal(&mut self) -> &mut AddTeacherModal {
        &mut self.add_modal
    }

    pub fn credentials(&self) -> &CredentialsPanel {
        &self.credentials
    }

    /// Submits the add-teacher modal. On success the credentials are copied
    /// to the clipboard when possible and kept on the panel until dismissed.
    pub async fn add_teacher(&mut self) -> Result<Teacher, SubmitError> {
        let created = match self.add_modal.submit(self.ctx.gateway()).await {
            Ok(created) => created,
            Err(err) => {
                if let SubmitError::Rejected { message, .. } = &err {
                    self.ctx.notifier.error(message.clone());
                }
                return Err(err);
            }
        };

        let copied = self.clipboard.copy(&created.credentials.clipboard_text());
        if let Err(err) = &copied {
            tracing::warn!(error = %err, "Could not copy teacher credentials");
        }
        let message = match copied {
            Ok(()) => format!(
                "Teacher {} added successfully! Credentials copied to clipboard.",
                created.teacher.name
            ),
            Err(_) => format!("Teacher {} added successfully!", created.teacher.name),
        };
        self.ctx.notifier.success(message);
        self.credentials.show(created.credentials);
        self.ctx.store.refresh(&[ResourceKind::Teachers]).await;

        Ok(created.teacher)
    }

    /// Copies the full credential note from the panel.
    pub fn copy_credentials(&self) -> bool {
        let Some(credentials) = self.credentials.credentials() else {
            return false;
        };
        match self.clipboard.copy(&credentials.share_text()) {
            Ok(()) => {
                self.ctx.notifier.success("Credentials copied to clipboard!");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "Could not copy teacher credentials");
                self.ctx.notifier.error("Failed to copy to clipboard");
                false
            }
        }
    }

    pub fn dismiss_credentials(&mut self) {
        self.credentials.dismiss();
    }

    pub fn is_removing(&self, teacher_id: &str) -> bool {
        self.ctx.in_flight.contains(&remove_key(teacher_id))
    }

    pub async fn remove_teacher(&self, teacher_id: &str) -> Result<(), ActionError> {
        self.ctx.confirm(REMOVE_TEACHER_PROMPT)?;
        let _guard = self.ctx.claim(remove_key(teacher_id))?;

        let outcome = self.ctx.gateway().remove_teacher(teacher_id).await;
        self.ctx
            .finish(
                outcome,
                |_| "Teacher removed successfully".to_string(),
                |err| format!("Failed to remove teacher: {err}"),
                &[ResourceKind::Teachers],
            )
            .await
    }
}

fn remove_key(teacher_id: &str) -> String {
    format!("remove_{teacher_id}")
}
