use std::time::Duration;

use intake_config::Settings;
use intake_core::{IntakeError, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{ChatRequest, ChatResponse, HealthResponse};

pub const HEALTH_PATH: &str = "/system/health";
pub const CHAT_PATH: &str = "/chat/message";
pub const CONSULTATIONS_PATH: &str = "/consultations";

/// Client for the chat/extraction service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
}

impl ServiceClient {
    /// `max_retries` is the total number of attempts for transport failures.
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntakeError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_attempts: max_retries.max(1),
        })
    }

    /// Client aimed at the service described by `settings`, honouring its
    /// request timeout and retry budget.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.base_url(),
            Duration::from_secs(settings.api_request_timeout),
            settings.max_api_retries,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.send(HEALTH_PATH, |c, url| c.get(url)).await?;
        let body = Self::expect_ok(HEALTH_PATH, resp).await?;
        if body.get("status").is_none() {
            return Err(violation(HEALTH_PATH, "missing `status` field"));
        }
        decode(HEALTH_PATH, body)
    }

    pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let resp = self.send(CHAT_PATH, |c, url| c.post(url).json(request)).await?;
        let body = Self::expect_ok(CHAT_PATH, resp).await?;
        if body.get("response").is_none() {
            return Err(violation(CHAT_PATH, "missing `response` field"));
        }
        let reply: ChatResponse = decode(CHAT_PATH, body)?;
        reply.check().map_err(|reason| violation(CHAT_PATH, reason))?;
        debug!(
            session_id = %request.session_id,
            confidence = ?reply.confidence_score,
            "chat reply received"
        );
        Ok(reply)
    }

    /// Post a message and report only the status code. Useful for inputs the
    /// service is allowed to reject (e.g. an empty message).
    pub async fn send_message_status(&self, request: &ChatRequest) -> Result<StatusCode> {
        let resp = self.send(CHAT_PATH, |c, url| c.post(url).json(request)).await?;
        Ok(resp.status())
    }

    pub async fn consultations(&self) -> Result<Vec<serde_json::Value>> {
        let resp = self.send(CONSULTATIONS_PATH, |c, url| c.get(url)).await?;
        match Self::expect_ok(CONSULTATIONS_PATH, resp).await? {
            serde_json::Value::Array(items) => Ok(items),
            other => Err(violation(
                CONSULTATIONS_PATH,
                format!("expected a JSON array, got {}", json_kind(&other)),
            )),
        }
    }

    /// Send with retries on transport failures. HTTP error statuses are not
    /// retried.
    async fn send<F>(&self, path: &str, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client, String) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 1;
        loop {
            match build(&self.client, url.clone()).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < self.max_attempts => {
                    warn!(%url, attempt, error = %e, "request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(IntakeError::Service {
                        endpoint: path.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    async fn expect_ok(path: &str, resp: Response) -> Result<serde_json::Value> {
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(IntakeError::UnexpectedStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| violation(path, format!("body is not JSON: {e}")))
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: serde_json::Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| violation(path, e.to_string()))
}

fn violation(path: &str, reason: impl Into<String>) -> IntakeError {
    IntakeError::ContractViolation {
        endpoint: path.to_string(),
        reason: reason.into(),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_config::Environment;

    #[test]
    fn test_from_settings_uses_base_url() {
        let mut settings = Settings::defaults(Environment::Testing).unwrap();
        settings.host = "127.0.0.1".into();
        let client = ServiceClient::from_settings(&settings).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.max_attempts, 1);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ServiceClient::new("http://localhost:8000/", Duration::from_secs(1), 0).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.max_attempts, 1);
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&serde_json::json!({})), "object");
        assert_eq!(json_kind(&serde_json::json!([])), "array");
    }
}
