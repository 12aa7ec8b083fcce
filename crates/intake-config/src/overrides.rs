use serde::{Deserialize, Serialize};

use crate::defaults::{ConfigMap, ConfigValue};
use crate::environment::Environment;

/// Deployment-sensitive settings keyed by environment.
///
/// These are resolved separately from the default tables and can disagree
/// with them (development runs with `debug = true` here while the base
/// table ships `DEBUG = false`). Consumers pick the path they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentOverrides {
    pub debug: bool,
    pub log_level: String,
    /// Upstream LLM call timeout in seconds.
    pub openai_timeout: u64,
    /// Database connection timeout in seconds.
    pub db_connection_timeout: f64,
    pub allowed_origins: Vec<String>,
}

impl EnvironmentOverrides {
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                debug: true,
                log_level: "DEBUG".into(),
                openai_timeout: 30,
                db_connection_timeout: 5.0,
                allowed_origins: vec![
                    "http://localhost:3000".into(),
                    "http://localhost:5678".into(),
                    "http://localhost:8000".into(),
                    "http://localhost:3001".into(),
                ],
            },
            Environment::Testing => Self {
                debug: false,
                log_level: "WARNING".into(),
                openai_timeout: 10,
                db_connection_timeout: 2.0,
                allowed_origins: vec!["http://localhost:3000".into()],
            },
            // Empty on purpose: production origins must be supplied explicitly.
            Environment::Production => Self {
                debug: false,
                log_level: "INFO".into(),
                openai_timeout: 60,
                db_connection_timeout: 10.0,
                allowed_origins: vec![],
            },
        }
    }

    /// Overrides for whatever `ENVIRONMENT` says right now.
    pub fn current() -> Self {
        Self::for_environment(Environment::detect())
    }

    pub fn to_map(&self) -> ConfigMap {
        ConfigMap::from([
            ("debug".to_string(), ConfigValue::Bool(self.debug)),
            ("log_level".to_string(), ConfigValue::Str(self.log_level.clone())),
            ("openai_timeout".to_string(), ConfigValue::Int(self.openai_timeout as i64)),
            (
                "db_connection_timeout".to_string(),
                ConfigValue::Float(self.db_connection_timeout),
            ),
            (
                "allowed_origins".to_string(),
                ConfigValue::List(self.allowed_origins.clone()),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_is_permissive() {
        let o = EnvironmentOverrides::for_environment(Environment::Development);
        assert!(o.debug);
        assert_eq!(o.log_level, "DEBUG");
        assert_eq!(o.allowed_origins.len(), 4);
        assert!(o.allowed_origins.iter().all(|u| u.starts_with("http://localhost:")));
    }

    #[test]
    fn test_testing_is_conservative() {
        let o = EnvironmentOverrides::for_environment(Environment::Testing);
        assert!(!o.debug);
        assert_eq!(o.log_level, "WARNING");
        assert_eq!(o.openai_timeout, 10);
        assert_eq!(o.db_connection_timeout, 2.0);
        assert_eq!(o.allowed_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_production_has_no_origins_and_longest_timeouts() {
        let prod = EnvironmentOverrides::for_environment(Environment::Production);
        assert!(!prod.debug);
        assert_eq!(prod.log_level, "INFO");
        assert!(prod.allowed_origins.is_empty());
        for env in [Environment::Development, Environment::Testing] {
            let other = EnvironmentOverrides::for_environment(env);
            assert!(prod.openai_timeout > other.openai_timeout);
            assert!(prod.db_connection_timeout > other.db_connection_timeout);
        }
    }

    #[test]
    fn test_to_map_keys() {
        let map = EnvironmentOverrides::for_environment(Environment::Testing).to_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["allowed_origins", "db_connection_timeout", "debug", "log_level", "openai_timeout"]
        );
        assert_eq!(map["debug"], ConfigValue::Bool(false));
    }
}
