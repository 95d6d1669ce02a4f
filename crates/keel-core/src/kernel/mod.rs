//! # Keel Core Kernel
//!
//! The `kernel` module forms the heart of `keel-core`. It owns the
//! [`Application`](bootstrap::Application), the runtime object every
//! framework package shares.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: loads the environment file and the
//!   configuration (cached snapshot or config directory) and wires the
//!   service container. See [`ApplicationBuilder`](bootstrap::ApplicationBuilder).
//! - **Provider Lifecycle**: every queued
//!   [`ServiceProvider`](crate::provider::ServiceProvider) registers, then
//!   every provider boots, strictly in registration order.
//! - **Environment Settings**: application key validation in production-like
//!   environments and propagation of the configured time zone.
//! - **Core Constants**: well-known paths, tokens and configuration keys in
//!   the `constants` submodule.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result`
//!   alias in the `error` submodule.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{Application, ApplicationBuilder, TerminateFuture};
pub use error::{Error, KernelLifecyclePhase, Result};
// Test module declaration
#[cfg(test)]
mod tests;
