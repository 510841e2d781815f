//! Cross-platform utilities
//!
//! # Modules
//!
//! - [`fs`] - Run workspace and atomic file replacement
//! - [`platform`] - Executable lookup and path expansion

pub mod fs;
pub mod platform;

pub use fs::{Workspace, atomic_replace, checksum};
pub use platform::{find_executable, resolve_path};
