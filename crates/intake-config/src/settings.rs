use serde::{Deserialize, Serialize};
use std::str::FromStr;

use intake_core::{IntakeError, Result};

use crate::defaults::{keys, resolved_defaults, ConfigMap};
use crate::environment::Environment;

/// Resolved configuration snapshot handed to the service at startup.
///
/// Serialized keys match the flat `SCREAMING_SNAKE_CASE` names used by the
/// default tables, the `intake.toml` file layer and process variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,

    // ── Server ─────────────────────────────────────────────────
    pub host: String,
    pub port: u16,
    pub debug: bool,

    // ── OpenAI ─────────────────────────────────────────────────
    pub openai_model: String,
    pub openai_max_tokens: u32,
    pub openai_api_url: String,
    /// Seconds before an upstream completion call is abandoned.
    pub openai_timeout: u64,

    // ── Timeouts & retries ─────────────────────────────────────
    pub db_connection_timeout: f64,
    pub api_request_timeout: u64,
    pub max_api_retries: u32,

    // ── Logging & CORS ─────────────────────────────────────────
    /// One of DEBUG, INFO, WARNING, ERROR, CRITICAL.
    pub log_level: String,
    pub allowed_origins: Vec<String>,

    // ── Schema limits ──────────────────────────────────────────
    pub message_min_length: usize,
    pub message_max_length: usize,
    pub name_min_length: usize,
    pub name_max_length: usize,

    // ── Secrets (process environment only) ─────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

const REDACTED: &str = "********";

impl Settings {
    /// Defaults for `env`: the base table merged with that environment's overlay.
    pub fn defaults(env: Environment) -> Result<Self> {
        Self::from_map(resolved_defaults(env))
    }

    /// Build a snapshot from a complete flat key map.
    pub fn from_map(map: ConfigMap) -> Result<Self> {
        let value = serde_json::to_value(map)?;
        serde_json::from_value(value).map_err(|e| IntakeError::Config(e.to_string()))
    }

    pub fn to_map(&self) -> Result<ConfigMap> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }

    /// Layer a partial key map over the current values. `ENVIRONMENT` is
    /// ignored: the environment is decided by the classifier alone.
    pub fn apply_map(&mut self, overrides: ConfigMap) -> Result<()> {
        let mut merged = self.to_map()?;
        for (key, value) in overrides {
            if key == keys::ENVIRONMENT {
                continue;
            }
            merged.insert(key, value);
        }
        *self = Self::from_map(merged)?;
        Ok(())
    }

    /// Apply same-named process variables. Empty values count as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var(keys::HOST) {
            self.host = v;
        }
        if let Some(v) = var(keys::PORT) {
            self.port = parse_var(keys::PORT, &v)?;
        }
        if let Some(v) = var(keys::DEBUG) {
            self.debug = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = var(keys::OPENAI_MODEL) {
            self.openai_model = v;
        }
        if let Some(v) = var(keys::OPENAI_MAX_TOKENS) {
            self.openai_max_tokens = parse_var(keys::OPENAI_MAX_TOKENS, &v)?;
        }
        if let Some(v) = var(keys::OPENAI_API_URL) {
            self.openai_api_url = v;
        }
        if let Some(v) = var(keys::OPENAI_TIMEOUT) {
            self.openai_timeout = parse_var(keys::OPENAI_TIMEOUT, &v)?;
        }
        if let Some(v) = var(keys::DB_CONNECTION_TIMEOUT) {
            self.db_connection_timeout = parse_var(keys::DB_CONNECTION_TIMEOUT, &v)?;
        }
        if let Some(v) = var(keys::API_REQUEST_TIMEOUT) {
            self.api_request_timeout = parse_var(keys::API_REQUEST_TIMEOUT, &v)?;
        }
        if let Some(v) = var(keys::MAX_API_RETRIES) {
            self.max_api_retries = parse_var(keys::MAX_API_RETRIES, &v)?;
        }
        if let Some(v) = var(keys::LOG_LEVEL) {
            self.log_level = v.trim().to_uppercase();
        }
        if let Some(v) = var(keys::ALLOWED_ORIGINS) {
            self.allowed_origins = parse_origins(&v);
        }
        if let Some(v) = var(keys::MESSAGE_MIN_LENGTH) {
            self.message_min_length = parse_var(keys::MESSAGE_MIN_LENGTH, &v)?;
        }
        if let Some(v) = var(keys::MESSAGE_MAX_LENGTH) {
            self.message_max_length = parse_var(keys::MESSAGE_MAX_LENGTH, &v)?;
        }
        if let Some(v) = var(keys::NAME_MIN_LENGTH) {
            self.name_min_length = parse_var(keys::NAME_MIN_LENGTH, &v)?;
        }
        if let Some(v) = var(keys::NAME_MAX_LENGTH) {
            self.name_max_length = parse_var(keys::NAME_MAX_LENGTH, &v)?;
        }
        if let Some(v) = var(keys::DATABASE_URL) {
            self.database_url = Some(v);
        }
        if let Some(v) = var(keys::OPENAI_API_KEY) {
            self.openai_api_key = Some(v);
        }
        Ok(())
    }

    /// `http://{HOST}:{PORT}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.database_url.is_some() {
            copy.database_url = Some(REDACTED.into());
        }
        if copy.openai_api_key.is_some() {
            copy.openai_api_key = Some(REDACTED.into());
        }
        copy
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| IntakeError::validation(key, format!("cannot parse {raw:?}: {e}")))
}

/// Comma-separated origins; blanks are dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::ConfigValue;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_base_defaults() {
        let s = Settings::defaults(Environment::Development).unwrap();
        assert_eq!(s.app_name, "Data Structuring Agent");
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 8000);
        assert!(!s.debug);
        assert_eq!(s.log_level, "INFO");
        assert_eq!(s.openai_model, "gpt-4o-mini");
        assert_eq!(s.openai_max_tokens, 500);
        assert_eq!(s.allowed_origins.len(), 4);
        assert!(s.database_url.is_none());
    }

    #[test]
    fn test_env_overrides_parse_types() {
        let mut s = Settings::defaults(Environment::Development).unwrap();
        s.apply_env_overrides(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("DEBUG", "TRUE"),
            ("LOG_LEVEL", "debug"),
            ("OPENAI_MAX_TOKENS", "1000"),
            ("DB_CONNECTION_TIMEOUT", "7.5"),
            ("ALLOWED_ORIGINS", "http://localhost:3000, https://example.com,,"),
        ]))
        .unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.port, 3000);
        assert!(s.debug);
        assert_eq!(s.log_level, "DEBUG");
        assert_eq!(s.openai_max_tokens, 1000);
        assert_eq!(s.db_connection_timeout, 7.5);
        assert_eq!(s.allowed_origins, vec!["http://localhost:3000", "https://example.com"]);
    }

    #[test]
    fn test_debug_only_true_enables() {
        let mut s = Settings::defaults(Environment::Development).unwrap();
        s.apply_env_overrides(lookup(&[("DEBUG", "yes")])).unwrap();
        assert!(!s.debug);
    }

    #[test]
    fn test_unparseable_number_is_validation_error() {
        let mut s = Settings::defaults(Environment::Development).unwrap();
        let err = s.apply_env_overrides(lookup(&[("PORT", "99999")])).unwrap_err();
        assert!(matches!(err, IntakeError::ConfigValidation { ref field, .. } if field == "PORT"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let mut s = Settings::defaults(Environment::Testing).unwrap();
        s.apply_env_overrides(lookup(&[("PORT", ""), ("ALLOWED_ORIGINS", "  ")])).unwrap();
        assert_eq!(s.port, 8000);
        assert_eq!(s.allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_apply_map_ignores_environment() {
        let mut s = Settings::defaults(Environment::Production).unwrap();
        let overrides = ConfigMap::from([
            ("PORT".to_string(), ConfigValue::Int(9000)),
            ("ENVIRONMENT".to_string(), ConfigValue::Str("development".into())),
        ]);
        s.apply_map(overrides).unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.environment, Environment::Production);
    }

    #[test]
    fn test_apply_map_rejects_wrong_type() {
        let mut s = Settings::defaults(Environment::Development).unwrap();
        let overrides = ConfigMap::from([("PORT".to_string(), ConfigValue::Str("high".into()))]);
        assert!(matches!(s.apply_map(overrides), Err(IntakeError::Config(_))));
    }

    #[test]
    fn test_to_map_skips_unset_secrets() {
        let s = Settings::defaults(Environment::Development).unwrap();
        let map = s.to_map().unwrap();
        assert!(!map.contains_key("DATABASE_URL"));
        assert_eq!(map["ENVIRONMENT"], ConfigValue::Str("development".into()));
        assert_eq!(map["DB_CONNECTION_TIMEOUT"], ConfigValue::Float(5.0));
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut s = Settings::defaults(Environment::Development).unwrap();
        s.openai_api_key = Some("sk-abcdefghijklmnopqrstuvwxyz".into());
        let r = s.redacted();
        assert_eq!(r.openai_api_key.as_deref(), Some(REDACTED));
        assert!(r.database_url.is_none());
    }

    #[test]
    fn test_base_url() {
        let s = Settings::defaults(Environment::Development).unwrap();
        assert_eq!(s.base_url(), "http://0.0.0.0:8000");
    }
}
