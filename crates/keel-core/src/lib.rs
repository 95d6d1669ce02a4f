pub mod config;
pub mod container;
pub mod env;
pub mod kernel;
pub mod provider;

// Re-export key public types/traits for easier use by the binary and providers
pub use config::Repository;
pub use container::{Container, Injectable, Instance, Symbol, Token};
pub use env::{Environment, MemoryEnvironment, SystemEnvironment};
pub use kernel::{Application, ApplicationBuilder};
pub use kernel::error::{Error, Result};
pub use provider::{ConstructProvider, ServiceProvider};

#[cfg(test)]
mod tests;
