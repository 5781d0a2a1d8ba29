use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::services::gateway::GatewayError;

/// Lifecycle shared by every modal form.
///
/// `Closed -> Open -> Submitting -> Closed` on success, or back to `Open`
/// with the error message on failure. While submitting, edits and further
/// submits are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        error: Option<String>,
    },
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0}")]
    Invalid(String),
    #[error("form is not open")]
    NotOpen,
    #[error("a submission is already in progress")]
    Busy,
}

/// Failure of a modal submission, carrying the text shown in the modal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: GatewayError,
    },
}

impl SubmitError {
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::Rejected { source, .. } => Some(source),
            Self::Form(_) => None,
        }
    }
}

/// First validation message, by field name, so results are stable.
pub(crate) fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|left, right| left.0.cmp(&right.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid form".to_string())
}

pub(crate) fn validate_form<F: Validate>(form: &F) -> Result<(), FormError> {
    form.validate().map_err(|errors| FormError::Invalid(describe_validation(&errors)))
}

/// A form plus its modal lifecycle. The form is reset whenever the modal
/// closes, so a cancelled draft never leaks into the next open.
#[derive(Debug, Clone, Default)]
pub struct ModalForm<F> {
    state: ModalState,
    form: F,
}

impl<F: Default> ModalForm<F> {
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, ModalState::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ModalState::Open { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn open(&mut self) {
        if matches!(self.state, ModalState::Closed) {
            self.state = ModalState::Open { error: None };
        }
    }

    /// Dismisses the modal. Refused while a submission is running.
    pub fn close(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.state = ModalState::Closed;
        self.form = F::default();
        true
    }

    pub fn edit(&mut self) -> Result<&mut F, FormError> {
        match self.state {
            ModalState::Closed => Err(FormError::NotOpen),
            ModalState::Submitting => Err(FormError::Busy),
            ModalState::Open { .. } => Ok(&mut self.form),
        }
    }

    /// Validates the form and builds its request. On success the modal
    /// moves to `Submitting`; on failure it stays open with the message.
    pub(crate) fn prepare<R>(
        &mut self,
        build: impl FnOnce(&F) -> Result<R, FormError>,
    ) -> Result<R, FormError>
    where
        F: Validate,
    {
        match self.state {
            ModalState::Closed => return Err(FormError::NotOpen),
            ModalState::Submitting => return Err(FormError::Busy),
            ModalState::Open { .. } => {}
        }

        match validate_form(&self.form).and_then(|()| build(&self.form)) {
            Ok(request) => {
                self.state = ModalState::Submitting;
                Ok(request)
            }
            Err(err) => {
                self.reject(err.to_string());
                Err(err)
            }
        }
    }

    /// Applies the gateway outcome of a submission started by `prepare`.
    pub(crate) fn settle<T>(
        &mut self,
        outcome: Result<T, GatewayError>,
        describe: impl FnOnce(&GatewayError) -> String,
    ) -> Result<T, SubmitError> {
        match outcome {
            Ok(value) => {
                self.finish_ok();
                Ok(value)
            }
            Err(err) => {
                let message = describe(&err);
                self.finish_err(message.clone());
                Err(SubmitError::Rejected { message, source: err })
            }
        }
    }

    /// Records a client-side rejection without leaving the open state.
    pub(crate) fn reject(&mut self, message: impl Into<String>) {
        if !self.is_submitting() {
            self.state = ModalState::Open { error: Some(message.into()) };
        }
    }

    fn finish_ok(&mut self) {
        self.state = ModalState::Closed;
        self.form = F::default();
    }

    fn finish_err(&mut self, message: impl Into<String>) {
        self.state = ModalState::Open { error: Some(message.into()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Default, Validate)]
    struct Draft {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 10, message = "Seats must be between 1 and 10"))]
        seats: u32,
    }

    #[test]
    fn lifecycle_locks_edits_while_submitting() {
        let mut modal = ModalForm::<Draft>::default();
        assert_eq!(modal.edit().err(), Some(FormError::NotOpen));

        modal.open();
        let draft = modal.edit().expect("open");
        draft.name = "Hifz".to_string();
        draft.seats = 4;
        let seats = modal.prepare(|draft| Ok(draft.seats)).expect("submit");
        assert_eq!(seats, 4);

        assert_eq!(modal.edit().err(), Some(FormError::Busy));
        assert_eq!(modal.prepare(|draft| Ok(draft.seats)).err(), Some(FormError::Busy));
        assert!(!modal.close());

        let failed: Result<(), _> =
            modal.settle(Err(GatewayError::server(500, "Server error: 500")), ToString::to_string);
        assert_eq!(failed.map_err(|err| err.to_string()), Err("Server error: 500".to_string()));
        assert_eq!(modal.error(), Some("Server error: 500"));
        assert_eq!(modal.form().name, "Hifz");

        modal.prepare(|draft| Ok(draft.seats)).expect("retry");
        modal.settle(Ok(()), ToString::to_string).expect("saved");
        assert_eq!(modal.state(), &ModalState::Closed);
        assert!(modal.form().name.is_empty());
    }

    #[test]
    fn invalid_form_stays_open_with_message() {
        let mut modal = ModalForm::<Draft>::default();
        modal.open();

        let err = modal.prepare(|draft| Ok(draft.seats)).expect_err("invalid");

        assert_eq!(err, FormError::Invalid("Name is required".to_string()));
        assert_eq!(modal.error(), Some("Name is required"));
        assert!(!modal.is_submitting());
    }

    #[test]
    fn first_message_is_picked_by_field_name() {
        let draft = Draft { name: String::new(), seats: 0 };
        assert_eq!(validate_form(&draft), Err(FormError::Invalid("Name is required".to_string())));

        let draft = Draft { name: "x".to_string(), seats: 11 };
        assert_eq!(
            validate_form(&draft),
            Err(FormError::Invalid("Seats must be between 1 and 10".to_string()))
        );
    }
}
