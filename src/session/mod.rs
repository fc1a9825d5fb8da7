//! Per-user quiz session storage.
//!
//! Sessions live in memory for the lifetime of the process and are keyed by
//! the externally supplied user identifier.
//!
//! # Architecture
//!
//! - [`Session`]: snapshot of one user's progress
//! - [`SessionStore`]: thread-safe owner of all sessions
//!
//! # Example
//!
//! ```rust
//! use quiz_sessions::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.get_or_create("tester").unwrap();
//! assert_eq!(session.current_index(), 0);
//! assert_eq!(session.score(), 0);
//! assert!(!session.is_completed());
//! ```

mod store;

pub use store::{Session, SessionStore};
