//! # Keel Kernel Errors
//!
//! Defines [`Error`], the crate-wide error enum. Each subsystem has its own
//! typed error ([`ContainerError`], [`ConfigSystemError`], [`EnvError`]) which
//! converts into [`Error`] via `#[from]`; the remaining variants cover the
//! application lifecycle itself.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigSystemError;
use crate::container::error::ContainerError;
use crate::env::error::EnvError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigSystemError),

    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// A provider was registered after the application booted.
    #[error("Cannot register provider '{provider}': the application has already booted")]
    RegistrationAfterBoot { provider: String },

    /// A configuration value required in the current environment is absent.
    #[error("Missing required configuration '{key}' in the '{environment}' environment")]
    MissingConfiguration { key: String, environment: String },

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}{}: {message}", provider.as_ref().map(|p| format!(" (provider '{}')", p)).unwrap_or_default())]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        provider: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Register")]
    Register,
    #[error("Boot")]
    Boot,
    #[error("Terminate")]
    Terminate,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Wrap `source` as a failure of `provider` during `phase`.
    pub fn lifecycle(phase: KernelLifecyclePhase, provider: Option<&str>, source: Error) -> Self {
        Error::KernelLifecycleError {
            phase,
            provider: provider.map(str::to_string),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
