//! # intake-client
//!
//! Black-box client for the chat/extraction service. It speaks the service's
//! HTTP contract and rejects responses that break it:
//!
//! - `GET /system/health` → 200 with a `status` field
//! - `POST /chat/message` → 200 with at least `response`
//! - `GET /consultations` → 200 with a JSON array

pub mod client;
pub mod types;

pub use client::ServiceClient;
pub use types::{ChatRequest, ChatResponse, HealthResponse, ValidationSummary};
