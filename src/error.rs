//! Error types for the quiz core.
//!
//! Every variant is a local, recoverable condition. The HTTP layer maps each
//! [`QuizError`] kind to its own status code.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`QuizEngine`](crate::quiz::QuizEngine) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    /// The user identifier was empty or absent.
    #[error("missing user identifier")]
    MissingUser,

    /// An answer was submitted before the quiz was started.
    #[error("no quiz session for user {0:?}; start the quiz first")]
    SessionNotFound(String),

    /// An answer was submitted after the last question was consumed.
    #[error("quiz already completed")]
    QuizAlreadyCompleted,

    /// The question bank has no questions.
    #[error("question bank is empty")]
    NoQuestions,

    /// A question index pointed past the end of the bank.
    #[error("question index {index} out of range (bank has {len} questions)")]
    OutOfRange { index: usize, len: usize },
}

impl QuizError {
    /// Stable machine-readable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingUser => "missing_user",
            Self::SessionNotFound(_) => "session_not_found",
            Self::QuizAlreadyCompleted => "quiz_already_completed",
            Self::NoQuestions => "no_questions",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Errors returned by [`SessionStore`](crate::session::SessionStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("user identifier must not be empty")]
    InvalidUser,

    #[error("no session for user {0:?}")]
    NotFound(String),
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidUser => Self::MissingUser,
            StoreError::NotFound(user) => Self::SessionNotFound(user),
        }
    }
}

/// Errors raised while loading a [`QuestionBank`](crate::quiz::QuestionBank).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    /// The question file could not be read.
    #[error("failed to read question file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The question file is not valid YAML/JSON of the expected shape.
    #[error("failed to parse question file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A question is missing its prompt or accepted answers.
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}
