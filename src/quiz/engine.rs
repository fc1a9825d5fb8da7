//! Quiz state machine on top of the question bank and session store.

use std::sync::Arc;

use crate::error::QuizError;
use crate::quiz::bank::{Question, QuestionBank};
use crate::session::{Session, SessionStore};

/// Result of [`QuizEngine::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    /// The question the user should answer next.
    pub question: Question,
    /// The session as it was when the question was picked.
    pub session: Session,
}

/// Result of [`QuizEngine::submit_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Whether the submitted answer was accepted.
    pub correct: bool,
    /// The next question, or `None` once the quiz is completed.
    pub next_question: Option<Question>,
    pub completed: bool,
    /// The session after recording the answer.
    pub session: Session,
}

/// Drives quiz sessions through the question bank.
///
/// Every submission consumes the current question whether or not the answer
/// was correct. A completed session only leaves that state through
/// [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct QuizEngine {
    bank: Arc<QuestionBank>,
    sessions: SessionStore,
}

impl QuizEngine {
    #[must_use]
    pub fn new(bank: impl Into<Arc<QuestionBank>>, sessions: SessionStore) -> Self {
        Self {
            bank: bank.into(),
            sessions,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    /// Start (or resume) the quiz for `user_id` and return the current question.
    ///
    /// # Errors
    ///
    /// - [`QuizError::MissingUser`] if `user_id` is empty
    /// - [`QuizError::NoQuestions`] if the bank is empty
    /// - [`QuizError::QuizAlreadyCompleted`] if the session already finished
    pub fn start(&self, user_id: &str) -> Result<StartOutcome, QuizError> {
        if user_id.is_empty() {
            return Err(QuizError::MissingUser);
        }
        if self.bank.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let session = self.sessions.get_or_create(user_id)?;
        if session.is_completed() {
            return Err(QuizError::QuizAlreadyCompleted);
        }
        let question = self.bank.question_at(session.current_index())?.clone();
        Ok(StartOutcome { question, session })
    }

    /// Evaluate `answer` against the user's current question and advance.
    ///
    /// # Errors
    ///
    /// - [`QuizError::MissingUser`] if `user_id` is empty
    /// - [`QuizError::SessionNotFound`] if the quiz was never started
    /// - [`QuizError::QuizAlreadyCompleted`] if every question was answered
    pub fn submit_answer(&self, user_id: &str, answer: &str) -> Result<AnswerOutcome, QuizError> {
        if user_id.is_empty() {
            return Err(QuizError::MissingUser);
        }

        let bank = &self.bank;
        // The completion check and the comparison run under the store's lock,
        // against the same index the store then advances.
        let (correct, session) = self.sessions.record_answer(user_id, bank.len(), |current: &Session| {
            if current.is_completed() {
                return Err(QuizError::QuizAlreadyCompleted);
            }
            let question = bank.question_at(current.current_index())?;
            Ok(question.accepts(answer))
        })?;

        let next_question = if session.is_completed() {
            None
        } else {
            Some(self.bank.question_at(session.current_index())?.clone())
        };

        Ok(AnswerOutcome {
            correct,
            next_question,
            completed: session.is_completed(),
            session,
        })
    }

    /// Reset the user's progress to the first question.
    ///
    /// Unknown users get a fresh session.
    pub fn reset(&self, user_id: &str) -> Result<Session, QuizError> {
        Ok(self.sessions.reset(user_id)?)
    }

    /// Read the user's progress without creating a session.
    pub fn progress(&self, user_id: &str) -> Result<Session, QuizError> {
        if user_id.is_empty() {
            return Err(QuizError::MissingUser);
        }
        Ok(self.sessions.get(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn france_bank() -> QuestionBank {
        QuestionBank::new(vec![Question::new("Capital of France?", ["Paris"])])
    }

    fn three_question_bank() -> QuestionBank {
        QuestionBank::new(vec![
            Question::new("Capital of France?", ["Paris"]),
            Question::new("2 + 2?", ["4", "four"]),
            Question::new("Chemical symbol for gold?", ["Au"]),
        ])
    }

    fn engine(bank: QuestionBank) -> QuizEngine {
        QuizEngine::new(bank, SessionStore::new())
    }

    #[test]
    fn test_single_question_scenario() {
        let engine = engine(france_bank());

        let started = engine.start("tester").unwrap();
        assert_eq!(started.question.prompt(), "Capital of France?");

        let outcome = engine.submit_answer("tester", "Paris").unwrap();
        assert!(outcome.correct);
        assert!(outcome.completed);
        assert!(outcome.next_question.is_none());
        assert_eq!(outcome.session.score(), 1);

        assert_eq!(
            engine.submit_answer("tester", "Paris"),
            Err(QuizError::QuizAlreadyCompleted)
        );
    }

    #[test]
    fn test_submit_without_start() {
        let engine = engine(france_bank());
        assert_eq!(
            engine.submit_answer("unknownUser", "x"),
            Err(QuizError::SessionNotFound("unknownUser".to_string()))
        );
        assert!(engine.sessions().is_empty());
    }

    #[test]
    fn test_missing_user() {
        let engine = engine(france_bank());
        assert_eq!(engine.start(""), Err(QuizError::MissingUser));
        assert_eq!(engine.submit_answer("", "Paris"), Err(QuizError::MissingUser));
        assert_eq!(engine.reset(""), Err(QuizError::MissingUser));
        assert_eq!(engine.progress(""), Err(QuizError::MissingUser));
    }

    #[test]
    fn test_start_with_empty_bank() {
        let engine = engine(QuestionBank::default());
        assert_eq!(engine.start("tester"), Err(QuizError::NoQuestions));
        assert!(engine.sessions().is_empty());
    }

    #[test]
    fn test_start_then_progress_is_fresh() {
        let engine = engine(three_question_bank());
        engine.start("tester").unwrap();

        let session = engine.progress("tester").unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(!session.is_completed());
    }

    #[test]
    fn test_start_resumes_current_question() {
        let engine = engine(three_question_bank());
        engine.start("tester").unwrap();
        engine.submit_answer("tester", "Paris").unwrap();

        let resumed = engine.start("tester").unwrap();
        assert_eq!(resumed.question.prompt(), "2 + 2?");
        assert_eq!(resumed.session.current_index(), 1);
        assert_eq!(resumed.session.score(), 1);
    }

    #[test]
    fn test_start_after_completion() {
        let engine = engine(france_bank());
        engine.start("tester").unwrap();
        engine.submit_answer("tester", "Lyon").unwrap();
        assert_eq!(engine.start("tester"), Err(QuizError::QuizAlreadyCompleted));
    }

    #[test]
    fn test_wrong_answer_consumes_question() {
        let engine = engine(three_question_bank());
        engine.start("tester").unwrap();

        let outcome = engine.submit_answer("tester", "Lyon").unwrap();
        assert!(!outcome.correct);
        assert!(!outcome.completed);
        assert_eq!(outcome.session.current_index(), 1);
        assert_eq!(outcome.session.score(), 0);
        assert_eq!(outcome.next_question.unwrap().prompt(), "2 + 2?");
    }

    #[test]
    fn test_answers_are_trimmed_and_case_insensitive() {
        let engine = engine(three_question_bank());
        engine.start("tester").unwrap();

        assert!(engine.submit_answer("tester", "  pArIs ").unwrap().correct);
        assert!(engine.submit_answer("tester", "FOUR").unwrap().correct);
        let last = engine.submit_answer("tester", "\tau\n").unwrap();
        assert!(last.correct);
        assert!(last.completed);
        assert_eq!(last.session.score(), 3);
    }

    #[test]
    fn test_mixed_answers_complete_after_bank_length() {
        let engine = engine(three_question_bank());
        engine.start("tester").unwrap();

        let answers = ["Paris", "5", "Au"];
        let mut last = None;
        for (i, answer) in answers.iter().enumerate() {
            let outcome = engine.submit_answer("tester", answer).unwrap();
            assert!(outcome.session.score() <= outcome.session.current_index());
            assert_eq!(outcome.session.current_index(), i + 1);
            last = Some(outcome);
        }

        let last = last.unwrap();
        assert!(last.completed);
        assert_eq!(last.session.score(), 2);
        assert_eq!(
            engine.submit_answer("tester", "anything"),
            Err(QuizError::QuizAlreadyCompleted)
        );
    }

    #[test]
    fn test_reset_after_completion() {
        let engine = engine(france_bank());
        engine.start("tester").unwrap();
        engine.submit_answer("tester", "Paris").unwrap();

        let session = engine.reset("tester").unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(!session.is_completed());

        let outcome = engine.submit_answer("tester", "paris").unwrap();
        assert!(outcome.correct);
    }

    #[test]
    fn test_reset_unknown_user() {
        let engine = engine(france_bank());
        let session = engine.reset("john").unwrap();
        assert_eq!(session.current_index(), 0);
        assert!(engine.progress("john").is_ok());
    }

    #[test]
    fn test_progress_does_not_create() {
        let engine = engine(france_bank());
        assert_eq!(
            engine.progress("ghost"),
            Err(QuizError::SessionNotFound("ghost".to_string()))
        );
        assert!(engine.sessions().is_empty());
    }

    #[test]
    fn test_users_are_independent() {
        let engine = engine(three_question_bank());
        engine.start("alice").unwrap();
        engine.start("bob").unwrap();

        engine.submit_answer("alice", "Paris").unwrap();
        engine.submit_answer("alice", "4").unwrap();

        assert_eq!(engine.progress("alice").unwrap().current_index(), 2);
        assert_eq!(engine.progress("bob").unwrap().current_index(), 0);
    }

    #[test]
    fn test_concurrent_submissions_for_one_user() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 8;

        let questions = (0..50)
            .map(|i| Question::new(format!("Question {i}"), ["yes"]))
            .collect();
        let engine = engine(QuestionBank::new(questions));
        engine.start("racer").unwrap();

        let results: Vec<Result<AnswerOutcome, QuizError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let engine = engine.clone();
                    scope.spawn(move || {
                        (0..PER_THREAD)
                            .map(|i| {
                                let answer = if (t + i) % 2 == 0 { "yes" } else { "no" };
                                engine.submit_answer("racer", answer)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let accepted: Vec<&AnswerOutcome> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(QuizError::QuizAlreadyCompleted)))
            .count();

        assert_eq!(accepted.len(), 50);
        assert_eq!(rejected, THREADS * PER_THREAD - 50);

        let mut indexes: Vec<usize> = accepted.iter().map(|o| o.session.current_index()).collect();
        indexes.sort_unstable();
        assert_eq!(indexes, (1..=50).collect::<Vec<_>>());

        let final_session = engine.progress("racer").unwrap();
        let correct = accepted.iter().filter(|o| o.correct).count();
        assert!(final_session.is_completed());
        assert_eq!(final_session.current_index(), 50);
        assert_eq!(final_session.score(), correct);
        assert!(final_session.score() <= final_session.current_index());
    }
}
