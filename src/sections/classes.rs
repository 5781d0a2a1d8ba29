use std::collections::BTreeSet;

use super::filter::{matches_any, normalize_query};
use super::{ActionError, SectionContext};
use crate::modals::{ScheduleClassModal, SubmitError};
use crate::schemas::class::{Class, ClassUpdate};
use crate::schemas::session::StartSession;
use crate::schemas::teacher::Teacher;
use crate::schemas::types::ClassStatus;
use crate::services::gateway::AdminApi;
use crate::store::ResourceKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassFilters {
    pub status: Option<ClassStatus>,
    pub teacher_id: Option<String>,
    pub search: String,
}

impl ClassFilters {
    pub fn is_active(&self) -> bool {
        self.status.is_some() || self.teacher_id.is_some() || !self.search.trim().is_empty()
    }

    pub fn matches(&self, class: &Class) -> bool {
        if self.status.is_some() && class.status != self.status {
            return false;
        }
        if let Some(teacher_id) = &self.teacher_id {
            if class.teacher_id.as_ref() != Some(teacher_id) {
                return false;
            }
        }

        let needle = normalize_query(&self.search);
        let teacher = class.teacher.as_ref();
        matches_any(
            &needle,
            [
                class.title.as_deref(),
                class.name.as_deref(),
                teacher.and_then(|teacher| teacher.name.as_deref()),
                teacher.and_then(|teacher| teacher.email.as_deref()),
                class.description.as_deref(),
                class.status.map(ClassStatus::as_str),
                class.subject.as_deref(),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub total: usize,
    pub active: usize,
    pub scheduled: usize,
    pub teachers_without_classes: usize,
}

/// Teachers with no class in `classes`. When either list is empty every
/// teacher is returned.
pub fn teachers_without_classes(teachers: &[Teacher], classes: &[Class]) -> Vec<Teacher> {
    if teachers.is_empty() || classes.is_empty() {
        return teachers.to_vec();
    }
    let busy: BTreeSet<&str> = classes.iter().filter_map(|class| class.teacher_id.as_deref()).collect();
    teachers.iter().filter(|teacher| !busy.contains(teacher.id.as_str())).cloned().collect()
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

pub struct ClassesSection<G: ?Sized> {
    ctx: SectionContext<G>,
    video_call_path: String,
    filters: ClassFilters,
    schedule_modal: ScheduleClassModal,
}

impl<G: AdminApi + ?Sized> ClassesSection<G> {
    pub fn new(ctx: SectionContext<G>, video_call_path: impl Into<String>) -> Self {
        Self {
            ctx,
            video_call_path: video_call_path.into().trim_end_matches('/').to_string(),
            filters: ClassFilters::default(),
            schedule_modal: ScheduleClassModal::default(),
        }
    }

    pub fn filters(&self) -> &ClassFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut ClassFilters {
        &mut self.filters
    }

    pub fn clear_filters(&mut self) {
        self.filters = ClassFilters::default();
    }

    pub fn filtered_classes(&self) -> Vec<Class> {
        self.ctx
            .store
            .snapshot()
            .classes
            .into_iter()
            .filter(|class| self.filters.matches(class))
            .collect()
    }

    pub fn teachers_without_classes(&self) -> Vec<Teacher> {
        let state = self.ctx.store.snapshot();
        teachers_without_classes(&state.teachers, &state.classes)
    }

    pub fn counts(&self) -> ClassCounts {
        let state = self.ctx.store.snapshot();
        let with_status = |status| state.classes.iter().filter(|class| class.status == Some(status)).count();
        ClassCounts {
            total: state.classes.len(),
            active: with_status(ClassStatus::Active),
            scheduled: with_status(ClassStatus::Scheduled),
            teachers_without_classes: teachers_without_classes(&state.teachers, &state.classes).len(),
        }
    }

    /// Heading over the result list, shown only while a filter is set.
    pub fn results_header(&self) -> Option<String> {
        if !self.filters.is_active() {
            return None;
        }
        let search = self.filters.search.trim();
        Some(if search.is_empty() {
            "Filtered Results".to_string()
        } else {
            format!("Search Results for \"{search}\"")
        })
    }

    pub fn results_summary(&self) -> String {
        let found = plural(self.filtered_classes().len(), "class", "classes");
        let available = self.teachers_without_classes().len();
        if self.filters.search.trim().is_empty() || available == 0 {
            format!("Found {found}")
        } else {
            format!("Found {found} • {}", plural(available, "available teacher", "available teachers"))
        }
    }

    pub fn schedule_modal(&mut self) -> &mut ScheduleClassModal {
        &mut self.schedule_modal
    }

    pub async fn schedule(&mut self) -> Result<(), SubmitError> {
        match self.schedule_modal.submit(self.ctx.gateway()).await {
            Ok(message) => {
                self.ctx.notifier.success(message);
                self.ctx.store.refresh_all().await;
                Ok(())
            }
            Err(err) => {
                self.ctx.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Saves edits to an existing class. An empty update sends nothing.
    pub async fn update_class(&self, class_id: &str, update: &ClassUpdate) -> Result<(), ActionError> {
        if update.is_empty() {
            return Ok(());
        }
        let _guard = self.ctx.claim(format!("update_{class_id}"))?;

        let outcome = self.ctx.gateway().update_class(class_id, update).await;
        self.ctx
            .finish(
                outcome,
                |_| "Class updated successfully!".to_string(),
                |err| format!("Failed to update class: {err}"),
                &[ResourceKind::Classes],
            )
            .await
    }

    pub async fn delete_class(&self, class: &Class) -> Result<(), ActionError> {
        self.ctx.confirm(&format!("Are you sure you want to delete \"{}\"?", class.display_title()))?;
        let _guard = self.ctx.claim(format!("delete_{}", class.id))?;

        let outcome = self.ctx.gateway().delete_class(&class.id).await;
        self.ctx
            .finish(
                outcome,
                |_| "Class deleted successfully!".to_string(),
                |err| format!("Failed to delete class: {err}"),
                &[ResourceKind::Classes, ResourceKind::Teachers],
            )
            .await
    }

    /// Starts a video session for `class` and returns the call link.
    pub async fn start_session(&self, class: &Class) -> Result<String, ActionError> {
        let _guard = self.ctx.claim(format!("session_{}", class.id))?;
        let start = StartSession {
            class_id: class.id.clone(),
            teacher_id: class.teacher_id.clone(),
            class_name: class.display_title().to_string(),
        };

        let outcome = self.ctx.gateway().start_video_session(&start).await;
        let session = self
            .ctx
            .finish(
                outcome,
                |_| "Video session started!".to_string(),
                |err| format!("Failed to start session: {err}"),
                &[ResourceKind::Live],
            )
            .await?;
        Ok(self.call_link(session.meeting_key()))
    }

    /// Link to the running session of an active class.
    pub fn session_link(&self, class: &Class) -> Option<String> {
        if class.status != Some(ClassStatus::Active) {
            return None;
        }
        class.meeting_id.as_deref().filter(|id| !id.is_empty()).map(|id| self.call_link(id))
    }

    pub async fn refresh(&self) {
        self.ctx.store.refresh(&[ResourceKind::Classes, ResourceKind::Teachers]).await;
    }

    fn call_link(&self, meeting_id: &str) -> String {
        format!("{}/{meeting_id}", self.video_call_path)
    }
}
