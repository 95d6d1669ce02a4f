use async_trait::async_trait;

use crate::kernel::bootstrap::Application;
use crate::kernel::error::Result;

/// A unit of feature registration.
///
/// The application drives every provider through two phases:
///
/// 1. [`register`](ServiceProvider::register) runs for all providers, in
///    registration order. It should only declare bindings.
/// 2. [`boot`](ServiceProvider::boot) runs for all providers, in the same
///    order, once every provider has registered. It may resolve services
///    declared by any provider.
///
/// Each phase receives the application explicitly instead of the provider
/// holding a back-reference to it.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    /// The name of the provider, used in logs and errors
    fn name(&self) -> &'static str;

    /// Declare bindings
    async fn register(&self, app: &Application) -> Result<()>;

    /// Use services once every provider has registered. Defaults to a no-op.
    async fn boot(&self, _app: &Application) -> Result<()> {
        Ok(())
    }
}

/// Providers that can be built from the application they are registered with.
///
/// See [`Application::register_type`].
pub trait ConstructProvider: ServiceProvider + Sized + 'static {
    fn construct(app: &Application) -> Self;
}
