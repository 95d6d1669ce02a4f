//! # Keel Logging
//!
//! Service provider that installs the process-wide `tracing` subscriber from
//! the `logging` configuration section and bridges the `log` facade used by
//! `keel-core` into it.
//!
//! ```json
//! // config/logging.json
//! { "level": "debug", "format": "json" }
//! ```
//!
//! `RUST_LOG`, when set, takes precedence over `logging.level`.
use std::str::FromStr;

use async_trait::async_trait;
use keel_core::kernel::bootstrap::Application;
use keel_core::kernel::error::{Error as KernelError, Result as KernelResult};
use keel_core::provider::{ConstructProvider, ServiceProvider};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Container token under which the resolved [`LoggingSettings`] are bound
pub const SETTINGS_TOKEN: &str = "logging.settings";

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(KernelError::Other(format!("Unsupported log format '{}'", other))),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawSettings {
    level: Option<String>,
    format: Option<String>,
}

/// Logging settings read from the `logging` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, e.g. `info` or `keel_core=debug,warn`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingSettings {
    /// Read the settings from the application's configuration.
    pub fn from_app(app: &Application) -> KernelResult<Self> {
        let raw = match app.config().get("logging") {
            Some(value) => serde_json::from_value::<RawSettings>(value)
                .map_err(|e| KernelError::Other(format!("Invalid logging configuration: {}", e)))?,
            None => RawSettings::default(),
        };

        let defaults = Self::default();
        let level = raw.level.unwrap_or(defaults.level);
        EnvFilter::try_new(&level)
            .map_err(|e| KernelError::Other(format!("Invalid log level '{}': {}", level, e)))?;
        let format = match raw.format {
            Some(format) => format.parse()?,
            None => defaults.format,
        };
        Ok(Self { level, format })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Installs logging during boot.
#[derive(Debug, Default)]
pub struct LoggingProvider {
    settings: LoggingSettings,
}

impl LoggingProvider {
    pub fn new(settings: LoggingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LoggingSettings {
        &self.settings
    }

    /// Install the global subscriber. Returns `false` if one was already
    /// installed, in which case the existing subscriber is kept.
    fn install(&self) -> bool {
        // Fails when a logger is already set, e.g. under a test harness
        if let Err(e) = tracing_log::LogTracer::init() {
            log::debug!("log bridge already installed: {}", e);
        }

        let registry = tracing_subscriber::registry().with(self.settings.filter());
        // Log lines go to stderr so command output on stdout stays parseable
        let result = match self.settings.format {
            LogFormat::Text => tracing::subscriber::set_global_default(
                registry.with(fmt::layer().with_writer(std::io::stderr)),
            ),
            LogFormat::Json => tracing::subscriber::set_global_default(
                registry.with(fmt::layer().json().with_writer(std::io::stderr)),
            ),
        };
        result.is_ok()
    }
}

#[async_trait]
impl ServiceProvider for LoggingProvider {
    fn name(&self) -> &'static str {
        "keel-logging"
    }

    async fn register(&self, app: &Application) -> KernelResult<()> {
        app.container().instance(SETTINGS_TOKEN, self.settings.clone());
        Ok(())
    }

    async fn boot(&self, _app: &Application) -> KernelResult<()> {
        if self.install() {
            tracing::info!(
                filter = %self.settings.level,
                format = ?self.settings.format,
                "Logging initialized"
            );
        } else {
            tracing::debug!("A global subscriber is already installed; keeping it");
        }
        Ok(())
    }
}

impl ConstructProvider for LoggingProvider {
    /// Falls back to the defaults when the `logging` section is invalid.
    fn construct(app: &Application) -> Self {
        let settings = LoggingSettings::from_app(app).unwrap_or_else(|e| {
            eprintln!("{}; using default logging settings", e);
            LoggingSettings::default()
        });
        Self::new(settings)
    }
}
