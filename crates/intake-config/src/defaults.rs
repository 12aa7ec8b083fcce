//! Static default tables: one base table plus production and testing overlays.
//!
//! Tables are plain data. `DefaultTable::flatten` yields exactly the keys a
//! table declares; `resolved_defaults` merges an overlay onto the base.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::environment::Environment;

/// Names of every key a resolved snapshot carries.
pub mod keys {
    pub const APP_NAME: &str = "APP_NAME";
    pub const APP_VERSION: &str = "APP_VERSION";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const DEBUG: &str = "DEBUG";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const OPENAI_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
    pub const OPENAI_API_URL: &str = "OPENAI_API_URL";
    pub const OPENAI_TIMEOUT: &str = "OPENAI_TIMEOUT";
    pub const DB_CONNECTION_TIMEOUT: &str = "DB_CONNECTION_TIMEOUT";
    pub const API_REQUEST_TIMEOUT: &str = "API_REQUEST_TIMEOUT";
    pub const MAX_API_RETRIES: &str = "MAX_API_RETRIES";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
    pub const MESSAGE_MIN_LENGTH: &str = "MESSAGE_MIN_LENGTH";
    pub const MESSAGE_MAX_LENGTH: &str = "MESSAGE_MAX_LENGTH";
    pub const NAME_MIN_LENGTH: &str = "NAME_MIN_LENGTH";
    pub const NAME_MAX_LENGTH: &str = "NAME_MAX_LENGTH";
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
}

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => write!(f, "{items:?}"),
        }
    }
}

/// Flat key → value mapping with deterministic ordering.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// Compile-time form of a [`ConfigValue`].
#[derive(Debug, Clone, Copy)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    List(&'static [&'static str]),
}

impl Literal {
    pub fn to_value(self) -> ConfigValue {
        match self {
            Self::Bool(b) => ConfigValue::Bool(b),
            Self::Int(i) => ConfigValue::Int(i),
            Self::Float(x) => ConfigValue::Float(x),
            Self::Str(s) => ConfigValue::Str(s.to_string()),
            Self::List(items) => ConfigValue::List(items.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// A named, immutable set of defaults associated with one environment.
#[derive(Debug)]
pub struct DefaultTable {
    pub name: &'static str,
    pub environment: Environment,
    pub entries: &'static [(&'static str, Literal)],
}

const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5678",
    "http://localhost:8000",
    "http://localhost:3001",
];

pub static BASE_DEFAULTS: DefaultTable = DefaultTable {
    name: "base",
    environment: Environment::Development,
    entries: &[
        (keys::APP_NAME, Literal::Str("Data Structuring Agent")),
        (keys::APP_VERSION, Literal::Str("1.0.0")),
        (keys::HOST, Literal::Str("0.0.0.0")),
        (keys::PORT, Literal::Int(8000)),
        (keys::DEBUG, Literal::Bool(false)),
        (keys::OPENAI_MODEL, Literal::Str("gpt-4o-mini")),
        (keys::OPENAI_MAX_TOKENS, Literal::Int(500)),
        (keys::OPENAI_API_URL, Literal::Str("https://api.openai.com/v1/chat/completions")),
        (keys::OPENAI_TIMEOUT, Literal::Int(30)),
        (keys::DB_CONNECTION_TIMEOUT, Literal::Float(5.0)),
        (keys::API_REQUEST_TIMEOUT, Literal::Int(10)),
        (keys::MAX_API_RETRIES, Literal::Int(3)),
        (keys::LOG_LEVEL, Literal::Str("INFO")),
        (keys::ALLOWED_ORIGINS, Literal::List(DEV_ORIGINS)),
        (keys::MESSAGE_MIN_LENGTH, Literal::Int(1)),
        (keys::MESSAGE_MAX_LENGTH, Literal::Int(2000)),
        (keys::NAME_MIN_LENGTH, Literal::Int(2)),
        (keys::NAME_MAX_LENGTH, Literal::Int(100)),
        (keys::ENVIRONMENT, Literal::Str("development")),
    ],
};

// Production origins stay empty: operators must configure them.
pub static PRODUCTION_DEFAULTS: DefaultTable = DefaultTable {
    name: "production",
    environment: Environment::Production,
    entries: &[
        (keys::DEBUG, Literal::Bool(false)),
        (keys::LOG_LEVEL, Literal::Str("INFO")),
        (keys::OPENAI_TIMEOUT, Literal::Int(60)),
        (keys::DB_CONNECTION_TIMEOUT, Literal::Float(10.0)),
        (keys::API_REQUEST_TIMEOUT, Literal::Int(20)),
        (keys::ALLOWED_ORIGINS, Literal::List(&[])),
    ],
};

pub static TESTING_DEFAULTS: DefaultTable = DefaultTable {
    name: "testing",
    environment: Environment::Testing,
    entries: &[
        (keys::DEBUG, Literal::Bool(false)),
        (keys::LOG_LEVEL, Literal::Str("WARNING")),
        (keys::OPENAI_TIMEOUT, Literal::Int(10)),
        (keys::DB_CONNECTION_TIMEOUT, Literal::Float(2.0)),
        (keys::API_REQUEST_TIMEOUT, Literal::Int(5)),
        (keys::MAX_API_RETRIES, Literal::Int(1)),
        (keys::ALLOWED_ORIGINS, Literal::List(&["http://localhost:3000"])),
    ],
};

impl DefaultTable {
    /// Select the table for an environment. Development uses the base table.
    pub fn for_environment(env: Environment) -> &'static DefaultTable {
        match env {
            Environment::Production => &PRODUCTION_DEFAULTS,
            Environment::Testing => &TESTING_DEFAULTS,
            Environment::Development => &BASE_DEFAULTS,
        }
    }

    /// Exactly the keys this table declares, freshly allocated.
    pub fn flatten(&self) -> ConfigMap {
        self.entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_value()))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }
}

/// Flattened defaults declared by the table selected for `env`.
pub fn defaults_for_environment(env: Environment) -> ConfigMap {
    DefaultTable::for_environment(env).flatten()
}

pub fn development_defaults() -> ConfigMap {
    defaults_for_environment(Environment::Development)
}

pub fn production_defaults() -> ConfigMap {
    defaults_for_environment(Environment::Production)
}

pub fn testing_defaults() -> ConfigMap {
    defaults_for_environment(Environment::Testing)
}

/// Base table merged with the overlay for `env` (overlay wins), with
/// `ENVIRONMENT` set to the resolved environment.
pub fn resolved_defaults(env: Environment) -> ConfigMap {
    let mut map = BASE_DEFAULTS.flatten();
    map.extend(DefaultTable::for_environment(env).flatten());
    map.insert(keys::ENVIRONMENT.to_string(), ConfigValue::Str(env.as_str().to_string()));
    map
}
