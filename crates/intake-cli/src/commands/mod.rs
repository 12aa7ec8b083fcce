use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};

use intake_config::defaults::keys;
use intake_config::{ConfigLoader, ConfigValue, Environment, Settings, resolved_defaults};
use intake_core::Result;

mod inspect;
mod service;

/// Intake — configuration and service tooling for the data-structuring agent
#[derive(Parser)]
#[command(name = "intake", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to intake.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Service base URL (defaults to http://HOST:PORT from the config)
    #[arg(long, global = true, env = "INTAKE_BASE_URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected environment
    Env,
    /// Show the resolved configuration snapshot (secrets redacted)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a default table
    Defaults {
        /// Environment name (dev, test, prod, ...); defaults to the detected one
        #[arg(short, long)]
        env: Option<String>,
        /// Merge the overlay onto the base table instead of showing it alone
        #[arg(long)]
        resolved: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the per-environment dynamic overrides
    Overrides {
        /// Environment name; defaults to the detected one
        #[arg(short, long)]
        env: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Audit the configuration
    Doctor,
    /// Query the service health endpoint
    Health,
    /// Send one chat message to the service
    Chat {
        /// Message text
        message: String,
        /// Session ID to continue (creates new if omitted)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// List stored consultations
    Consultations,
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Map a service log level (DEBUG, INFO, WARNING, ERROR, CRITICAL) to a
/// tracing filter directive.
pub fn tracing_directive(level: &str) -> &'static str {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

/// Log level to use before the snapshot exists: the `LOG_LEVEL` variable if
/// set, else the resolved default for `env`.
pub fn bootstrap_level<F>(env: Environment, lookup: F) -> &'static str
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup(keys::LOG_LEVEL).filter(|l| !l.trim().is_empty()) {
        return tracing_directive(&level);
    }
    match resolved_defaults(env).get(keys::LOG_LEVEL) {
        Some(ConfigValue::Str(level)) => tracing_directive(level),
        _ => "info",
    }
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Tracing goes up before loading so loader warnings are not lost
        let environment = Environment::detect();
        let filter = self.init_tracing(environment);

        // doctor reports errors itself instead of failing the load
        let loader = match self.command {
            Commands::Doctor => ConfigLoader::load_unchecked(self.config.as_deref())?,
            _ => ConfigLoader::load(self.config.as_deref())?,
        };
        let settings = loader.get();

        if let Some(handle) = filter {
            let directive = tracing_directive(&settings.log_level);
            if let Err(e) = handle.reload(EnvFilter::new(directive)) {
                tracing::debug!(error = %e, "could not apply configured log level");
            }
        }

        match self.command {
            Commands::Env => inspect::cmd_env(&loader),
            Commands::Config { json } => inspect::cmd_config(&settings, json),
            Commands::Defaults {
                env,
                resolved,
                json,
            } => inspect::cmd_defaults(&loader, env.as_deref(), resolved, json),
            Commands::Overrides { env, json } => {
                inspect::cmd_overrides(&loader, env.as_deref(), json)
            }
            Commands::Doctor => inspect::cmd_doctor(&settings),
            Commands::Health => service::cmd_health(&settings, self.url.as_deref()).await,
            Commands::Chat { message, session } => {
                service::cmd_chat(&settings, self.url.as_deref(), message, session).await
            }
            Commands::Consultations => {
                service::cmd_consultations(&settings, self.url.as_deref()).await
            }
            Commands::Version => Self::cmd_version(&settings),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    /// Level pinned on the command line: --verbose > --quiet > --log-level.
    fn explicit_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            self.log_level.as_deref().map(tracing_directive)
        }
    }

    // RUST_LOG beats everything, then the flags. Otherwise start from the
    // bootstrap level and hand back a handle so the snapshot's LOG_LEVEL
    // can replace it once loaded.
    fn init_tracing(&self, environment: Environment) -> Option<FilterHandle> {
        let (filter, pinned) = match (EnvFilter::try_from_default_env(), self.explicit_level()) {
            (Ok(filter), _) => (filter, true),
            (Err(_), Some(level)) => (EnvFilter::new(level), true),
            (Err(_), None) => (
                EnvFilter::new(bootstrap_level(environment, |key| std::env::var(key).ok())),
                false,
            ),
        };
        let (filter, handle) = reload::Layer::new(filter);

        let (pretty, json) = if environment.is_development() {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            (Some(layer), None)
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_target(true);
            (None, Some(layer))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(pretty)
            .with(json)
            .init();

        (!pinned).then_some(handle)
    }

    fn cmd_version(settings: &Settings) -> Result<()> {
        println!("intake v{}", env!("CARGO_PKG_VERSION"));
        println!("   Service: {} {}", settings.app_name, settings.app_version);
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "intake", &mut std::io::stdout());
        Ok(())
    }
}
