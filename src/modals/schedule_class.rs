use validator::Validate;

use super::state::{FormError, ModalForm, SubmitError};
use crate::core::time::{format_rfc3339, parse_timestamp};
use crate::schemas::class::ClassCreate;
use crate::schemas::types::{ClassStatus, RecurrenceType};
use crate::services::gateway::AdminApi;

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ClassForm {
    #[validate(length(min = 1, message = "Class title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please select a teacher"))]
    pub teacher_id: String,
    /// `YYYY-MM-DDTHH:MM` as typed, or a full RFC 3339 timestamp.
    #[validate(length(min = 1, message = "Please choose a date and time"))]
    pub scheduled_date: String,
    #[validate(range(min = 30, max = 240, message = "Duration must be between 30 and 240 minutes"))]
    pub duration: u32,
    pub description: String,
    pub status: ClassStatus,
    pub is_exam: bool,
    #[validate(range(min = 1, max = 50, message = "Max students must be between 1 and 50"))]
    pub max_students: u32,
    pub recurring: bool,
    pub recurrence_type: RecurrenceType,
    #[validate(range(min = 1, max = 365, message = "Recurrence must last between 1 and 365 days"))]
    pub recurrence_days: u32,
    #[validate(range(min = 1, max = 30, message = "Interval must be between 1 and 30 days"))]
    pub recurrence_interval: u32,
}

impl Default for ClassForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            teacher_id: String::new(),
            scheduled_date: String::new(),
            duration: 60,
            description: String::new(),
            status: ClassStatus::Scheduled,
            is_exam: false,
            max_students: 20,
            recurring: false,
            recurrence_type: RecurrenceType::None,
            recurrence_days: 30,
            recurrence_interval: 1,
        }
    }
}

impl ClassForm {
    /// Human description of the repeat rule, `None` for a one-off class.
    pub fn recurrence_summary(&self) -> Option<String> {
        if !self.recurring {
            return None;
        }
        let days = self.recurrence_days;
        Some(match self.recurrence_type {
            RecurrenceType::Daily => format!("Daily for {days} days"),
            RecurrenceType::Weekly => format!("Weekly for {} weeks", days.div_ceil(7)),
            RecurrenceType::Custom => {
                format!("Every {} days for {days} days", self.recurrence_interval)
            }
            RecurrenceType::None => format!("Schedule will repeat for {days} days"),
        })
    }

    pub fn success_message(&self) -> &'static str {
        if self.is_exam {
            "Exam scheduled successfully!"
        } else {
            "Class scheduled successfully!"
        }
    }

    fn to_request(&self) -> Result<ClassCreate, FormError> {
        let scheduled = parse_timestamp(&self.scheduled_date)
            .ok_or_else(|| FormError::Invalid("Please choose a valid date and time".to_string()))?;

        Ok(ClassCreate {
            title: self.title.trim().to_string(),
            teacher_id: self.teacher_id.clone(),
            scheduled_date: format_rfc3339(scheduled),
            duration: self.duration,
            description: self.description.clone(),
            status: self.status,
            is_exam: self.is_exam,
            max_students: Some(self.max_students),
            recurring: self.recurring,
            recurrence_type: self.recurrence_type,
            recurrence_days: self.recurrence_days,
            recurrence_interval: self.recurrence_interval,
        })
    }
}

pub type ScheduleClassModal = ModalForm<ClassForm>;

impl ModalForm<ClassForm> {
    /// Schedules the class and returns the success text for it.
    pub async fn submit<G: AdminApi + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<&'static str, SubmitError> {
        let (request, message) = self.prepare(|form| Ok((form.to_request()?, form.success_message())))?;
        let outcome = gateway.schedule_class(&request).await.map(|()| message);
        self.settle(outcome, |err| format!("Failed to schedule: {err}"))
    }
}
