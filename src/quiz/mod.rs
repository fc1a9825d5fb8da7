//! Quiz core: the question bank and the session state machine.
//!
//! The core is transport-agnostic. It never logs, and reports every failure as
//! a typed [`QuizError`](crate::error::QuizError).
//!
//! # Example
//!
//! ```rust
//! use quiz_sessions::quiz::{Question, QuestionBank, QuizEngine};
//! use quiz_sessions::session::SessionStore;
//!
//! let bank = QuestionBank::new(vec![Question::new("Capital of France?", ["Paris"])]);
//! let engine = QuizEngine::new(bank, SessionStore::new());
//!
//! let started = engine.start("tester").unwrap();
//! assert_eq!(started.question.prompt(), "Capital of France?");
//!
//! let outcome = engine.submit_answer("tester", " paris ").unwrap();
//! assert!(outcome.correct);
//! assert!(outcome.completed);
//! assert!(outcome.next_question.is_none());
//! ```

mod bank;
mod engine;

pub use bank::{Question, QuestionBank};
pub use engine::{AnswerOutcome, QuizEngine, StartOutcome};
