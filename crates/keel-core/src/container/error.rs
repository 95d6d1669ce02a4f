//! # Keel Service Container Errors
//!
//! Defines [`ContainerError`], raised when a token cannot be resolved, when a
//! resolved instance is not of the requested type, or when a binding is
//! declared in a way the container cannot honor.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No binding found for [{token}]")]
    BindingNotFound { token: String },

    #[error("Instance resolved for [{token}] is not of the expected type '{expected}'")]
    TypeMismatch {
        token: String,
        expected: &'static str,
    },

    #[error("[{token}] cannot be aliased to itself")]
    SelfAlias { token: String },
}
