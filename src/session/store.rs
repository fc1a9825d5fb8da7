//! Quiz session records and the store that owns them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;

/// Snapshot of one user's quiz progress.
///
/// Values handed out by [`SessionStore`] are copies. Changing them has no
/// effect on the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    user_id: String,
    current_index: usize,
    score: usize,
    completed: bool,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            current_index: 0,
            score: 0,
            completed: false,
            started_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 0-based index of the question the user should answer next.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of correctly answered questions.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn advance(&mut self, correct: bool, total: usize) {
        if correct {
            self.score += 1;
        }
        self.current_index = (self.current_index + 1).min(total);
        self.completed = self.current_index >= total;
        self.updated_at = Utc::now();
    }
}

/// Thread-safe store for quiz sessions.
///
/// The store is the only place session fields are mutated. All mutations
/// (creation, reset and [`record_answer`](Self::record_answer)) run under a
/// single write lock, so a read-modify-write on one session is atomic with
/// respect to every other operation on the store.
///
/// Cloning is cheap and yields a handle to the same sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug, Default)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the map consistent, so a poisoned lock
    // is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the session for `user_id`, creating a fresh one if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUser`] when `user_id` is empty.
    pub fn get_or_create(&self, user_id: &str) -> Result<Session, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::InvalidUser);
        }

        // Try read-only first
        if let Some(session) = self.read().get(user_id) {
            return Ok(session.clone());
        }

        let mut guard = self.write();
        let session = guard
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id.to_string()));
        Ok(session.clone())
    }

    /// Get the session for `user_id` without creating one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the user has no session.
    pub fn get(&self, user_id: &str) -> Result<Session, StoreError> {
        self.read()
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    /// Reset the session for `user_id` to its initial state.
    ///
    /// Resetting an unknown user creates a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUser`] when `user_id` is empty.
    pub fn reset(&self, user_id: &str) -> Result<Session, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::InvalidUser);
        }
        let session = Session::new(user_id.to_string());
        self.write().insert(user_id.to_string(), session.clone());
        Ok(session)
    }

    /// Atomically record one answer for `user_id`.
    ///
    /// `judge` receives a snapshot of the current session while the write lock
    /// is held and returns whether the answer was correct, or an error to
    /// reject the submission without touching the session. On acceptance the
    /// session moves to the next question, the score grows by one if the
    /// answer was correct, and the session is marked completed once
    /// `current_index` reaches `total`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] (converted into `E`) when the user has
    /// no session, or whatever `judge` returns.
    pub fn record_answer<F, E>(
        &self,
        user_id: &str,
        total: usize,
        judge: F,
    ) -> Result<(bool, Session), E>
    where
        F: FnOnce(&Session) -> Result<bool, E>,
        E: From<StoreError>,
    {
        let mut guard = self.write();
        let session = guard
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;

        let correct = judge(session)?;
        session.advance(correct, total);
        Ok((correct, session.clone()))
    }

    /// Remove a session by user ID.
    pub fn remove(&self, user_id: &str) -> Option<Session> {
        self.write().remove(user_id)
    }

    /// Get the number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// List all user IDs with a session.
    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}
