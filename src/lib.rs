//! Quiz Sessions
//!
//! A small per-user quiz session tracker served over HTTP: start a quiz,
//! submit answers, and reset progress.
//!
//! # Architecture
//!
//! - **Quiz core**: immutable question bank plus the per-user state machine
//! - **Session store**: in-memory, lock-protected map from user to progress
//! - **Server**: Axum handlers translating HTTP requests into core calls
//!
//! # Modules
//!
//! - [`config`]: Layered configuration (defaults, file, env, CLI)
//! - [`error`]: Typed errors for the core
//! - [`quiz`]: Question bank and quiz engine
//! - [`server`]: HTTP routes and handlers
//! - [`session`]: Session records and storage

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod quiz;
pub mod server;
pub mod session;

use crate::config::AppConfig;

use quiz::QuizEngine;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Quiz engine owning the question bank and session store.
    pub engine: QuizEngine,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: QuizEngine, config: Arc<AppConfig>) -> Self {
        Self { engine, config }
    }
}
