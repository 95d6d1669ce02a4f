//! # Keel Service Providers
//!
//! The [`ServiceProvider`] contract: register bindings first, boot second.
//! Providers are queued on the [`Application`](crate::kernel::Application)
//! and driven by [`Application::boot`](crate::kernel::Application::boot).
pub mod traits;

pub use traits::{ConstructProvider, ServiceProvider};

// Test module declaration
#[cfg(test)]
mod tests;
