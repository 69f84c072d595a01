//! Submission forms for intentions and questions
//!
//! Both forms share the same two-state machine: `Editing` until submitted,
//! `Submitting` while the single network call is pending, then back to
//! `Editing` with a notice describing the outcome.

pub mod question;
pub mod sankalpa;

pub use question::QuestionForm;
pub use sankalpa::SankalpaForm;

use crate::backend::RelayError;
use thiserror::Error;
use tracing::warn;

/// Errors from a form submission
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("A submission is already in progress")]
    Busy,

    #[error(transparent)]
    Relay(#[from] RelayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
}

/// Outcome message shown next to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Shared state machine behind both forms
#[derive(Debug)]
struct FormMachine {
    state: FormState,
    notice: Option<Notice>,
}

impl FormMachine {
    fn new() -> Self {
        Self {
            state: FormState::Editing,
            notice: None,
        }
    }

    /// `Editing -> Submitting`, guarded by the non-empty check
    fn begin(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        if self.state == FormState::Submitting {
            return Err(FormError::Busy);
        }
        if value.trim().is_empty() {
            let message = format!("{} must not be empty", field);
            self.notice = Some(Notice::Error(message.clone()));
            return Err(RelayError::Validation(message).into());
        }
        self.state = FormState::Submitting;
        self.notice = None;
        Ok(())
    }

    fn succeed(&mut self, notice: Option<Notice>) {
        self.state = FormState::Editing;
        self.notice = notice;
    }

    fn fail(&mut self, form: &str, err: RelayError) -> FormError {
        warn!(form, status = ?err.status(), error = %err, "Submission failed");
        self.state = FormState::Editing;
        self.notice = Some(Notice::Error(err.to_string()));
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_blank_values() {
        let mut machine = FormMachine::new();
        let err = machine.begin("Sankalpa", "   ").unwrap_err();
        assert!(matches!(err, FormError::Relay(RelayError::Validation(_))));
        assert_eq!(machine.state, FormState::Editing);
        assert_eq!(
            machine.notice,
            Some(Notice::Error("Sankalpa must not be empty".to_string()))
        );
    }

    #[test]
    fn test_begin_blocks_reentry() {
        let mut machine = FormMachine::new();
        machine.begin("Question", "why?").unwrap();
        assert_eq!(machine.state, FormState::Submitting);
        assert_eq!(machine.begin("Question", "why?"), Err(FormError::Busy));

        machine.succeed(None);
        assert_eq!(machine.state, FormState::Editing);
        assert!(machine.begin("Question", "again").is_ok());
    }
}
