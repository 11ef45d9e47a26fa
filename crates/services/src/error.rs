//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::LessonError;

/// Errors emitted while loading lesson content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("no lesson content for '{lesson_ref}'")]
    NotFound { lesson_ref: String },

    #[error("'{lesson_ref}' is not a valid lesson reference")]
    InvalidRef { lesson_ref: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Invalid(#[from] LessonError),
}

/// Errors emitted by the lesson flow.
///
/// Only content-load failures surface here; persistence failures are
/// swallowed at the boundary and validation mismatches are outcome data,
/// not errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Content(#[from] ContentError),
}
