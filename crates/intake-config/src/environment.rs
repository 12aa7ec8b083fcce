use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Process variable that selects the deployment environment.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Deployment context that selects which defaults apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Development, Self::Testing, Self::Production];

    /// Classify an environment name. Total: unknown or empty names resolve
    /// to `Development`, never to `Production`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Self::Development,
            "test" | "testing" => Self::Testing,
            "prod" | "production" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Classify an optional signal; absent is the same as empty.
    pub fn from_signal(signal: Option<&str>) -> Self {
        signal.map(Self::from_name).unwrap_or_default()
    }

    /// Read `ENVIRONMENT` through an injected lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_signal(lookup(ENVIRONMENT_VAR).as_deref())
    }

    /// Read `ENVIRONMENT` from the process. Not cached: every call re-reads.
    pub fn detect() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }

    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_testing(&self) -> bool {
        matches!(self, Self::Testing)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The environment the process is running in right now.
pub fn current_environment() -> Environment {
    Environment::detect()
}

pub fn environment_name() -> &'static str {
    Environment::detect().as_str()
}

pub fn is_development() -> bool {
    Environment::detect().is_development()
}

pub fn is_testing() -> bool {
    Environment::detect().is_testing()
}

pub fn is_production() -> bool {
    Environment::detect().is_production()
}
