//! View state of the create/edit sheets and the delete confirmation dialog.
//!
//! A sheet is `Closed`, `Open` for a create or an edit, or `Submitting`
//! while its single network call is in flight. Success and cancel both land
//! back in `Closed`; a failed submission returns to `Open` with the same
//! target so the entered values survive.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("the editor is not open")]
    NotOpen,
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("no submission is in flight")]
    NotSubmitting,
}

/// What an open sheet is editing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "record", rename_all = "snake_case")]
pub enum EditorTarget<T> {
    Create,
    Edit(T),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorState<T> {
    Closed,
    Open(EditorTarget<T>),
    Submitting(EditorTarget<T>),
}

impl<T> Default for EditorState<T> {
    fn default() -> Self {
        EditorState::Closed
    }
}

impl<T> EditorState<T> {
    pub fn open_create(&mut self) {
        *self = EditorState::Open(EditorTarget::Create);
    }

    pub fn open_edit(&mut self, record: T) {
        *self = EditorState::Open(EditorTarget::Edit(record));
    }

    pub fn cancel(&mut self) {
        *self = EditorState::Closed;
    }

    pub fn begin_submit(&mut self) -> Result<(), EditorError> {
        match std::mem::take(self) {
            EditorState::Open(target) => {
                *self = EditorState::Submitting(target);
                Ok(())
            }
            EditorState::Submitting(target) => {
                *self = EditorState::Submitting(target);
                Err(EditorError::AlreadySubmitting)
            }
            EditorState::Closed => Err(EditorError::NotOpen),
        }
    }

    /// The call succeeded: the sheet closes and its form resets.
    pub fn submit_succeeded(&mut self) -> Result<(), EditorError> {
        if !matches!(self, EditorState::Submitting(_)) {
            return Err(EditorError::NotSubmitting);
        }
        *self = EditorState::Closed;
        Ok(())
    }

    /// The call failed: the sheet stays open on the same target.
    pub fn submit_failed(&mut self) -> Result<(), EditorError> {
        match std::mem::take(self) {
            EditorState::Submitting(target) => {
                *self = EditorState::Open(target);
                Ok(())
            }
            other => {
                *self = other;
                Err(EditorError::NotSubmitting)
            }
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, EditorState::Closed)
    }

    pub fn target(&self) -> Option<&EditorTarget<T>> {
        match self {
            EditorState::Closed => None,
            EditorState::Open(target) | EditorState::Submitting(target) => Some(target),
        }
    }

    pub fn record(&self) -> Option<&T> {
        match self.target() {
            Some(EditorTarget::Edit(record)) => Some(record),
            _ => None,
        }
    }
}

/// Two-step delete: the dialog carries only the target id until confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
pub struct DeleteConfirmation {
    pub id: String,
    pub open: bool,
}

impl DeleteConfirmation {
    pub fn open(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            open: true,
        }
    }

    /// Resets to `{ id: "", open: false }` without any side effect.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Hands out the id to delete and closes the dialog. `None` when the
    /// dialog was not open.
    pub fn confirm(&mut self) -> Option<String> {
        if !self.open || self.id.is_empty() {
            return None;
        }
        let id = std::mem::take(&mut self.id);
        self.open = false;
        Some(id)
    }
}
