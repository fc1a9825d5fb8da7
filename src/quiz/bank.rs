//! Immutable, ordered question bank.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BankError, QuizError};

/// A single quiz question.
///
/// Answers are matched case-insensitively after trimming surrounding
/// whitespace on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    accepted_answers: Vec<String>,
}

impl Question {
    /// Create a question from a prompt and its accepted answers.
    pub fn new<I, S>(prompt: impl Into<String>, accepted_answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            accepted_answers: accepted_answers.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Check whether `answer` matches one of the accepted answers.
    #[must_use]
    pub fn accepts(&self, answer: &str) -> bool {
        let candidate = normalize(answer);
        !candidate.is_empty()
            && self
                .accepted_answers
                .iter()
                .any(|accepted| normalize(accepted) == candidate)
    }

    fn validate(&self, index: usize) -> Result<(), BankError> {
        if self.prompt.trim().is_empty() {
            return Err(BankError::InvalidQuestion {
                index,
                reason: "prompt is empty".to_string(),
            });
        }
        if !self.accepted_answers.iter().any(|a| !a.trim().is_empty()) {
            return Err(BankError::InvalidQuestion {
                index,
                reason: "no accepted answers".to_string(),
            });
        }
        Ok(())
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// On-disk layout of a question file.
#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Ordered, read-only sequence of questions.
///
/// Never mutated after construction, so it can be shared across request
/// handlers behind an `Arc` without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The bank used when no question file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Question::new("Capital of France?", ["Paris"]),
            Question::new("How many continents are there?", ["7", "seven"]),
            Question::new("Chemical symbol for gold?", ["Au"]),
            Question::new("Largest planet in the solar system?", ["Jupiter"]),
        ])
    }

    /// Parse a bank from YAML (or JSON) text.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::Parse`] for malformed documents and
    /// [`BankError::InvalidQuestion`] for questions without a prompt or answers.
    pub fn from_yaml_str(text: &str) -> Result<Self, BankError> {
        let file: BankFile = serde_yaml::from_str(text)?;
        for (index, question) in file.questions.iter().enumerate() {
            question.validate(index)?;
        }
        Ok(Self::new(file.questions))
    }

    /// Load a bank from a YAML or JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Get the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::OutOfRange`] when `index >= self.len()`.
    pub fn question_at(&self, index: usize) -> Result<&Question, QuizError> {
        self.questions.get(index).ok_or(QuizError::OutOfRange {
            index,
            len: self.questions.len(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
