use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Body of `GET /system/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: String,
    /// Per-dependency status, e.g. `postgres`, `fastapi`.
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Body of `POST /chat/message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }

    /// Start a fresh session with a random id.
    pub fn new_session(message: impl Into<String>) -> Self {
        Self::new(message, Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_errors: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Reply from `POST /chat/message`. Only `response` is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Field name → extracted value; `None` for fields not captured yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<BTreeMap<String, Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_summary: Option<ValidationSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_created: Option<bool>,
}

impl ChatResponse {
    /// Fields the service has actually extracted, skipping pending ones.
    pub fn extracted_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extracted_data
            .iter()
            .flatten()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    /// Check invariants the schema alone cannot express.
    pub fn check(&self) -> Result<(), String> {
        if let Some(score) = self.confidence_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(format!("confidence_score {score} outside [0, 1]"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_chat_response() {
        let r: ChatResponse = serde_json::from_str(r#"{"response": "Olá!"}"#).unwrap();
        assert_eq!(r.response, "Olá!");
        assert!(r.extracted_data.is_none());
        assert!(r.check().is_ok());
    }

    #[test]
    fn test_full_chat_response() {
        let r: ChatResponse = serde_json::from_str(
            r#"{
                "response": "Anotado.",
                "session_id": "abc",
                "extracted_data": {"name": "João Silva", "phone": "11999887766"},
                "validation_summary": {"total_errors": 0, "warnings": []},
                "confidence_score": 0.85,
                "consultation_created": false
            }"#,
        )
        .unwrap();
        assert_eq!(r.extracted_data.as_ref().unwrap()["name"].as_deref(), Some("João Silva"));
        let summary = r.validation_summary.as_ref().unwrap();
        assert_eq!(summary.total_errors, 0);
        assert!(summary.extra.contains_key("warnings"));
        assert_eq!(r.consultation_created, Some(false));
        assert!(r.check().is_ok());
    }

    #[test]
    fn test_pending_fields_are_null() {
        let r: ChatResponse = serde_json::from_str(
            r#"{"response": "ok", "extracted_data": {"name": "Ana", "phone": null}}"#,
        )
        .unwrap();
        let data = r.extracted_data.as_ref().unwrap();
        assert_eq!(data.len(), 2);
        assert!(data["phone"].is_none());
        assert_eq!(r.extracted_fields().collect::<Vec<_>>(), vec![("name", "Ana")]);
    }

    #[test]
    fn test_confidence_out_of_range() {
        let r: ChatResponse =
            serde_json::from_str(r#"{"response": "x", "confidence_score": 1.2}"#).unwrap();
        assert!(r.check().is_err());
    }

    #[test]
    fn test_missing_response_rejected() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"confidence_score": 0.5}"#).is_err());
    }

    #[test]
    fn test_new_session_ids_are_unique() {
        let a = ChatRequest::new_session("oi");
        let b = ChatRequest::new_session("oi");
        assert_ne!(a.session_id, b.session_id);
        assert!(Uuid::parse_str(&a.session_id).is_ok());
    }

    #[test]
    fn test_health_status() {
        let h: HealthResponse = serde_json::from_str(
            r#"{"status": "healthy", "services": {"postgres": "healthy"}}"#,
        )
        .unwrap();
        assert!(h.is_healthy());
        assert_eq!(h.services["postgres"], "healthy");
    }
}
