use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use intake_core::{IntakeError, Result};

use crate::defaults::{keys, ConfigMap, ConfigValue, BASE_DEFAULTS};
use crate::environment::Environment;
use crate::settings::Settings;

/// Process variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "INTAKE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "intake.toml";

/// Loads the configuration snapshot once at startup.
///
/// Precedence, lowest first: resolved defaults for the detected environment,
/// the optional `intake.toml` file, then process variables.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: Arc<Settings>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > INTAKE_CONFIG > ./intake.toml
    pub fn resolve_path<F>(explicit: Option<&Path>, lookup: &F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Some(p) = lookup(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the real process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_lookup(path, |key| std::env::var(key).ok())
    }

    /// Load without the validation gate, for auditing a broken config.
    pub fn load_unchecked(path: Option<&Path>) -> Result<Self> {
        Self::from_lookup_unchecked(path, |key| std::env::var(key).ok())
    }

    /// Load with an injected variable lookup.
    pub fn from_lookup<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let loader = Self::from_lookup_unchecked(path, lookup)?;

        // Validate config — log warnings, fail on errors
        match loader.settings.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(IntakeError::Config(e));
            }
        }

        Ok(loader)
    }

    /// Resolve every layer but skip validation. Parse failures still error.
    pub fn from_lookup_unchecked<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);
        let config_path = Self::resolve_path(path, &lookup);
        info!(%environment, "resolving configuration");

        let mut settings = Settings::defaults(environment)?;

        if config_path.exists() {
            info!(?config_path, "loading configuration file");
            let raw = std::fs::read_to_string(&config_path)?;
            settings.apply_map(Self::parse_file(&raw, &config_path)?)?;
        } else {
            warn!(?config_path, "config file not found, using defaults");
        }

        settings.apply_env_overrides(&lookup)?;

        Ok(Self {
            settings: Arc::new(settings),
            config_path,
        })
    }

    /// Parse a flat TOML file into a key map. Unknown keys are skipped.
    fn parse_file(raw: &str, path: &Path) -> Result<ConfigMap> {
        let table = toml::from_str::<toml::Table>(raw).map_err(|e| {
            IntakeError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let mut map = ConfigMap::new();
        for (key, value) in table {
            let known = BASE_DEFAULTS.contains(&key)
                || key == keys::DATABASE_URL
                || key == keys::OPENAI_API_KEY;
            if !known {
                warn!(key = %key, "ignoring unknown configuration key");
                continue;
            }
            if key == keys::ENVIRONMENT {
                debug!("ENVIRONMENT in config file ignored; set the process variable instead");
                continue;
            }
            map.insert(key.clone(), toml_to_value(&key, value)?);
        }
        Ok(map)
    }

    /// Shared handle to the immutable snapshot.
    pub fn get(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    pub fn environment(&self) -> Environment {
        self.settings.environment
    }

    /// Config file path consulted (it may not exist).
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

fn toml_to_value(key: &str, value: toml::Value) -> Result<ConfigValue> {
    match value {
        toml::Value::Boolean(b) => Ok(ConfigValue::Bool(b)),
        toml::Value::Integer(i) => Ok(ConfigValue::Int(i)),
        toml::Value::Float(x) => Ok(ConfigValue::Float(x)),
        toml::Value::String(s) => Ok(ConfigValue::Str(s)),
        toml::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(s),
                other => Err(IntakeError::validation(
                    key,
                    format!("expected a list of strings, found {}", other.type_str()),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(ConfigValue::List),
        other => Err(IntakeError::validation(
            key,
            format!("unsupported value type {}", other.type_str()),
        )),
    }
}
