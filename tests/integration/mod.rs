//! Integration test suite for tmpl-resources
//!
//! Each test runs the real binary against a temp project whose package
//! manager (`poetry`) and helper (`poet-resources`) are small shell scripts.
//! The scripts drop marker files so tests can tell which steps actually ran.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! Tests are `#[serial]` because they write and immediately execute scripts,
//! which races with concurrent forks on Linux ("Text file busy").

#![cfg(unix)]

mod common;

mod failures;
mod pipeline;
