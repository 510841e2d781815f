//! Filesystem utilities: the per-run workspace and atomic replacement.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tmpl_resources::utils::fs::{Workspace, atomic_replace, checksum};
//! use std::path::Path;
//!
//! # fn example() -> tmpl_resources::core::Result<()> {
//! let workspace = Workspace::acquire("example")?;
//! let content = b"A\n#---START-RESOURCES---\n#---END-RESOURCES---\n";
//! println!("digest: {}", checksum(content));
//! atomic_replace(Path::new("example.tmpl"), content)?;
//! workspace.release()?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod temp;

pub use atomic::{atomic_replace, checksum};
pub use temp::Workspace;
