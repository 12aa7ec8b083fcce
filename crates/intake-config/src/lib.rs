//! # intake-config
//!
//! Runtime configuration for the data-structuring chat service. A snapshot is
//! resolved from the base default table, the overlay for the detected
//! environment, an optional `intake.toml`, and process variables, in that
//! precedence order, once at startup.
//!
//! Environment classification lives in one place ([`Environment`]); every
//! resolver takes the enum, never a raw string.

pub mod defaults;
pub mod environment;
pub mod loader;
pub mod overrides;
pub mod settings;
pub mod validation;

pub use defaults::{
    ConfigMap, ConfigValue, DefaultTable, defaults_for_environment, development_defaults,
    production_defaults, resolved_defaults, testing_defaults,
};
pub use environment::{
    Environment, ENVIRONMENT_VAR, current_environment, environment_name, is_development,
    is_production, is_testing,
};
pub use loader::ConfigLoader;
pub use overrides::EnvironmentOverrides;
pub use settings::Settings;
pub use validation::{ConfigWarning, WarningSeverity};
