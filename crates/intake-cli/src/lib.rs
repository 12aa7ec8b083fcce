//! # intake-cli
//!
//! Command-line interface for the intake configuration and service tooling.
//!
//! ## Commands
//!
//! - `intake env` — Show the detected environment
//! - `intake config` — Show the resolved configuration snapshot
//! - `intake defaults` — Show a default table, alone or merged onto the base
//! - `intake overrides` — Show the per-environment dynamic overrides
//! - `intake doctor` — Audit configuration
//! - `intake health` / `chat` / `consultations` — Probe the running service

pub mod commands;

pub use commands::Cli;
