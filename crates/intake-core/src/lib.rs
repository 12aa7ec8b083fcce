//! # intake-core
//!
//! Shared vocabulary for the intake workspace: the unified error type and the
//! `Result` alias every other crate returns.

pub mod error;

pub use error::{IntakeError, Result};
