//! Runs against a live service. Start it, then:
//!
//! ```text
//! INTAKE_BASE_URL=http://localhost:8000 cargo test -p intake-client -- --ignored
//! ```

use intake_client::*;
use std::time::Duration;

fn live_client() -> ServiceClient {
    let base = std::env::var("INTAKE_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into());
    ServiceClient::new(base, Duration::from_secs(10), 1).unwrap()
}

#[tokio::test]
#[ignore = "requires a running service"]
async fn test_live_health() {
    let health = live_client().health().await.unwrap();
    assert!(!health.status.is_empty());
}

#[tokio::test]
#[ignore = "requires a running service"]
async fn test_live_chat_message() {
    let reply = live_client()
        .send_message(&ChatRequest::new_session("Olá, meu nome é Maria Santos"))
        .await
        .unwrap();
    assert!(!reply.response.is_empty());
}

#[tokio::test]
#[ignore = "requires a running service"]
async fn test_live_empty_message_status() {
    let status = live_client()
        .send_message_status(&ChatRequest::new_session(""))
        .await
        .unwrap();
    assert!([200, 400, 422].contains(&status.as_u16()), "got {status}");
}

#[tokio::test]
#[ignore = "requires a running service"]
async fn test_live_consultations_is_array() {
    live_client().consultations().await.unwrap();
}
