use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex as SyncMutex;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::config::Repository;
use crate::container::{Container, Instance, Token, downcast};
use crate::env::{self, Environment, SystemEnvironment};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::provider::{ConstructProvider, ServiceProvider};

/// Future returned by a termination callback
pub type TerminateFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

type TerminatingCallback = Box<dyn FnOnce() -> TerminateFuture + Send>;

/// The runtime object shared by every framework package.
///
/// Owns the service container, the configuration repository, the ordered
/// provider list and the termination callbacks. Providers may be registered
/// until [`Application::boot`] completes; after that the application and its
/// configuration are frozen.
pub struct Application {
    base_path: PathBuf,
    environment_name: String,
    container: Arc<Container>,
    config: Arc<Repository>,
    environment: Arc<dyn Environment>,
    providers: SyncMutex<Vec<Arc<dyn ServiceProvider>>>,
    terminating: SyncMutex<Vec<TerminatingCallback>>,
    booted: AtomicBool,
    // Serializes concurrent boot() calls
    boot_lock: Mutex<()>,
}

/// Builder for [`Application`].
#[derive(Default)]
pub struct ApplicationBuilder {
    base_path: Option<PathBuf>,
    environment: Option<Arc<dyn Environment>>,
    config: Option<Map<String, Value>>,
}

impl ApplicationBuilder {
    /// Directory holding `.env`, `config/` and `bootstrap/cache/`
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Environment store to use instead of the process environment
    pub fn environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Use `config` as the configuration tree instead of loading it from disk
    pub fn config(mut self, config: Map<String, Value>) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the environment file and configuration, then create the application.
    ///
    /// See [`Application::new`] for how the environment name is chosen.
    pub fn build(self) -> Result<Application> {
        let base_path = self.base_path.unwrap_or_else(|| PathBuf::from("."));
        let environment = self.environment.unwrap_or_else(|| Arc::new(SystemEnvironment));
        log::info!("Initializing {} v{} at {}", constants::APP_NAME, constants::APP_VERSION, base_path.display());

        let env_file = base_path.join(constants::ENV_FILE);
        match env::load_file(environment.as_ref(), &env_file) {
            Ok(count) => log::debug!("Loaded {} variable(s) from {}", count, env_file.display()),
            Err(e) => log::debug!("Ignoring environment file: {}", e),
        }

        let config = match self.config {
            Some(items) => Repository::from_map(items),
            None => {
                let repository = Repository::new();
                let cache = base_path.join(constants::CONFIG_CACHE_PATH);
                if !repository.load_cached(&cache)? {
                    let loaded = repository.load_config_directory(&base_path.join(constants::CONFIG_DIR))?;
                    log::debug!("Loaded {} config file(s)", loaded);
                }
                repository
            }
        };

        let environment_name = environment
            .get(constants::APP_ENV_VAR)
            .or_else(|| config.get_str(constants::APP_ENV_KEY))
            .unwrap_or_else(|| constants::DEFAULT_ENVIRONMENT.to_string());
        log::info!("Application environment: {}", environment_name);

        let config = Arc::new(config);
        let container = Arc::new(Container::new());
        let config_instance: Instance = config.clone();
        container.shared_instance(constants::CONFIG_TOKEN, config_instance);
        container.alias(constants::CONFIG_TOKEN, Token::of::<Repository>())?;

        Ok(Application {
            base_path,
            environment_name,
            container,
            config,
            environment,
            providers: SyncMutex::new(Vec::new()),
            terminating: SyncMutex::new(Vec::new()),
            booted: AtomicBool::new(false),
            boot_lock: Mutex::new(()),
        })
    }
}

impl Application {
    /// Create an application rooted at `base_path`, using the process environment.
    ///
    /// The environment name comes from `APP_ENV`, then `app.env`, and
    /// defaults to `production` when neither is set. Production refuses to
    /// boot without a non-empty `app.key`, so an unconfigured application
    /// fails [`Application::boot`] with [`Error::MissingConfiguration`].
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().base_path(base_path).build()
    }

    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    /// Queue a provider. Fails once the application has booted.
    pub fn register<P: ServiceProvider + 'static>(&self, provider: P) -> Result<()> {
        self.register_arc(Arc::new(provider))
    }

    /// Queue a provider built from this application by [`ConstructProvider`].
    pub fn register_type<P: ConstructProvider>(&self) -> Result<()> {
        if self.is_booted() {
            return Err(Error::RegistrationAfterBoot {
                provider: std::any::type_name::<P>().to_string(),
            });
        }
        self.register(P::construct(self))
    }

    /// Queue a shared provider.
    pub fn register_arc(&self, provider: Arc<dyn ServiceProvider>) -> Result<()> {
        if self.is_booted() {
            return Err(Error::RegistrationAfterBoot {
                provider: provider.name().to_string(),
            });
        }
        log::debug!("Queued provider: {}", provider.name());
        self.providers.lock().push(provider);
        Ok(())
    }

    /// Run every provider's `register`, then every provider's `boot`, apply
    /// environment settings and freeze the configuration.
    ///
    /// Calling `boot` on a booted application does nothing. If a provider
    /// fails the application stays un-booted and the error names the
    /// provider and phase.
    pub async fn boot(&self) -> Result<()> {
        let _guard = self.boot_lock.lock().await;
        if self.is_booted() {
            return Ok(());
        }
        log::info!("Booting application...");

        // Walk by index so providers queued during this phase are registered too
        let mut registered = 0;
        while let Some(provider) = self.provider_at(registered) {
            self.register_provider(provider.as_ref()).await?;
            registered += 1;
        }

        let mut index = 0;
        while let Some(provider) = self.provider_at(index) {
            if index >= registered {
                self.register_provider(provider.as_ref()).await?;
            }
            log::debug!("Booting provider: {}", provider.name());
            provider
                .boot(self)
                .await
                .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Boot, Some(provider.name()), e))?;
            index += 1;
        }

        self.apply_environment_settings()?;
        self.config.mark_as_booted();
        self.booted.store(true, Ordering::SeqCst);
        log::info!("Application booted with {} provider(s).", index);
        Ok(())
    }

    /// Boot if needed. Kernels build their main loop on top of this.
    pub async fn run(&self) -> Result<()> {
        if !self.is_booted() {
            self.boot().await?;
        }
        Ok(())
    }

    /// Register a callback awaited by [`Application::terminate`].
    pub fn terminating<F, Fut>(&self, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let callback: TerminatingCallback = Box::new(move || -> TerminateFuture { Box::pin(callback()) });
        self.terminating.lock().push(callback);
    }

    /// Await every termination callback in registration order.
    ///
    /// Callbacks are drained, so each runs at most once. The first failure
    /// stops the drain and is returned; callbacks after it are dropped. The
    /// booted state is unaffected.
    pub async fn terminate(&self) -> Result<()> {
        let callbacks = std::mem::take(&mut *self.terminating.lock());
        log::info!("Terminating application ({} callback(s))...", callbacks.len());
        for callback in callbacks {
            callback()
                .await
                .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Terminate, None, e))?;
        }
        Ok(())
    }

    /// Resolve `token`.
    ///
    /// A container binding always wins. Without one, a name token starting
    /// with `config.` resolves to the configuration value at the rest of the
    /// name, as a [`serde_json::Value`]. Otherwise the container's
    /// missing-binding error is returned.
    pub fn make(&self, token: impl Into<Token>) -> Result<Instance> {
        let token = token.into();
        if self.container.has(&token) {
            return self.container.make(token);
        }
        if let Some(path) = token.as_name().and_then(|name| name.strip_prefix(constants::CONFIG_NAMESPACE)) {
            if let Some(value) = self.config.get(path) {
                log::trace!("Resolved [{}] from configuration", token);
                let instance: Instance = Arc::new(value);
                return Ok(instance);
            }
        }
        self.container.make(token)
    }

    /// Alias of [`Application::make`].
    pub fn resolve(&self, token: impl Into<Token>) -> Result<Instance> {
        self.make(token)
    }

    /// Resolve `token` and downcast to `T`. See [`Application::make`].
    pub fn make_as<T: std::any::Any + Send + Sync>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
        let token = token.into();
        let instance = self.make(&token)?;
        downcast(&token, instance)
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn config(&self) -> &Arc<Repository> {
        &self.config
    }

    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.environment
    }

    /// Read an environment variable
    pub fn env(&self, key: &str) -> Option<String> {
        self.environment.get(key)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(constants::CONFIG_DIR)
    }

    pub fn environment_file_path(&self) -> PathBuf {
        self.base_path.join(constants::ENV_FILE)
    }

    pub fn cached_config_path(&self) -> PathBuf {
        self.base_path.join(constants::CONFIG_CACHE_PATH)
    }

    /// The application environment, e.g. `local` or `production`
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    pub fn is_production(&self) -> bool {
        constants::PRODUCTION_ENVIRONMENTS.contains(&self.environment_name.as_str())
    }

    /// Returns whether the application has been booted.
    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    /// Names of the queued providers, in registration order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.lock().iter().map(|p| p.name()).collect()
    }

    fn provider_at(&self, index: usize) -> Option<Arc<dyn ServiceProvider>> {
        self.providers.lock().get(index).cloned()
    }

    async fn register_provider(&self, provider: &dyn ServiceProvider) -> Result<()> {
        log::debug!("Registering provider: {}", provider.name());
        provider
            .register(self)
            .await
            .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Register, Some(provider.name()), e))
    }

    fn apply_environment_settings(&self) -> Result<()> {
        if self.is_production() {
            let key = self
                .config
                .get_str(constants::APP_KEY_KEY)
                .filter(|key| !key.trim().is_empty());
            if key.is_none() {
                log::error!("No application key configured for '{}'", self.environment_name);
                return Err(Error::MissingConfiguration {
                    key: constants::APP_KEY_KEY.to_string(),
                    environment: self.environment_name.clone(),
                });
            }
        }

        if let Some(timezone) = self.config.get_str(constants::APP_TIMEZONE_KEY) {
            log::debug!("Setting process time zone to {}", timezone);
            self.environment.set(constants::TIMEZONE_VAR, &timezone);
        }
        Ok(())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("base_path", &self.base_path)
            .field("environment", &self.environment_name)
            .field("providers", &self.provider_names())
            .field("booted", &self.is_booted())
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
