//! Core types shared by every step of a run.
//!
//! Currently this is the error taxonomy; see [`error`] for details.

pub mod error;

pub use error::{ErrorContext, Result, UpdaterError, create_error_context, user_friendly_error};
