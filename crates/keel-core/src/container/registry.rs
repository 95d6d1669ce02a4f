use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::container::error::ContainerError;
use crate::container::token::Token;
use crate::kernel::error::Result;

/// A shared, type-erased service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Produces an instance. Receives the container for recursive resolution.
pub type Factory = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Post-processes a freshly computed instance.
pub type Extender = Arc<dyn Fn(Instance, &Container) -> Result<Instance> + Send + Sync>;

/// Types the container can build on demand without an explicit binding.
///
/// This is the typed replacement for resolving an unbound constructor: a type
/// opts in by describing how to build itself from the container, and callers
/// ask for it with [`Container::make_type`].
pub trait Injectable: Any + Send + Sync + Sized {
    fn inject(container: &Container) -> Result<Self>;
}

struct Binding {
    factory: Factory,
    shared: bool,
    instance: Option<Instance>,
    generation: u64,
}

#[derive(Default)]
struct Registry {
    bindings: HashMap<Token, Binding>,
    aliases: HashMap<Token, Token>,
    tags: HashMap<String, Vec<Token>>,
    extenders: HashMap<Token, Vec<Extender>>,
    next_generation: u64,
}

impl Registry {
    /// Single-hop alias lookup.
    fn canonical(&self, token: &Token) -> Token {
        self.aliases.get(token).cloned().unwrap_or_else(|| token.clone())
    }

    fn insert(&mut self, token: Token, factory: Factory, shared: bool, instance: Option<Instance>) {
        // A direct binding shadows any alias previously registered under the same token
        self.aliases.remove(&token);
        self.next_generation += 1;
        let generation = self.next_generation;
        self.bindings.insert(token, Binding { factory, shared, instance, generation });
    }
}

/// Dependency injection container mapping tokens to instances.
///
/// The container is internally synchronized so it can be shared behind an
/// `Arc`. No lock is held while a factory or extender runs, so factories may
/// resolve other tokens from the container they receive.
#[derive(Default)]
pub struct Container {
    inner: RwLock<Registry>,
}

impl Container {
    /// Create a new empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transient binding. The factory runs on every resolution.
    /// Replaces any previous binding for the token.
    pub fn bind<T, F>(&self, token: impl Into<Token>, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.bind_factory(token, erase(factory), false);
    }

    /// Register a shared binding, computed on first resolution and memoized.
    pub fn singleton<T, F>(&self, token: impl Into<Token>, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.bind_factory(token, erase(factory), true);
    }

    /// Register a binding from an already type-erased factory.
    pub fn bind_factory(&self, token: impl Into<Token>, factory: Factory, shared: bool) {
        let token = token.into();
        log::trace!("Binding [{}] (shared: {})", token, shared);
        self.inner.write().insert(token, factory, shared, None);
    }

    /// Register a pre-built value as an already-resolved shared binding.
    ///
    /// The value is stored as given: extenders registered earlier for
    /// `token` are not applied, since nothing is computed. Extenders
    /// registered afterwards apply to it.
    pub fn instance<T: Any + Send + Sync>(&self, token: impl Into<Token>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.shared_instance(token, value.clone());
        value
    }

    /// Register an existing `Arc` as an already-resolved shared binding.
    pub fn shared_instance(&self, token: impl Into<Token>, instance: Instance) {
        let token = token.into();
        let cached = instance.clone();
        let factory: Factory = Arc::new(move |_: &Container| -> Result<Instance> { Ok(cached.clone()) });
        self.inner.write().insert(token, factory, true, Some(instance));
    }

    /// Make lookups under `alias` resolve to the binding under `token`.
    ///
    /// Aliases are followed for one hop only; aliasing an alias does not
    /// chain.
    pub fn alias(&self, token: impl Into<Token>, alias: impl Into<Token>) -> Result<()> {
        let token = token.into();
        let alias = alias.into();
        if token == alias {
            return Err(ContainerError::SelfAlias { token: token.to_string() }.into());
        }
        self.inner.write().aliases.insert(alias, token);
        Ok(())
    }

    /// Add `token` to the group named `tag`. Tagging the same token twice is a no-op.
    pub fn tag(&self, token: impl Into<Token>, tag: &str) {
        let token = token.into();
        let mut registry = self.inner.write();
        let tokens = registry.tags.entry(tag.to_string()).or_default();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    /// Add several tokens to the group named `tag`, preserving their order.
    pub fn tag_all<I, T>(&self, tokens: I, tag: &str)
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        for token in tokens {
            self.tag(token, tag);
        }
    }

    /// Resolve every token grouped under `tag`, in tagging order.
    pub fn tagged(&self, tag: &str) -> Result<Vec<Instance>> {
        let tokens = self.inner.read().tags.get(tag).cloned().unwrap_or_default();
        tokens.into_iter().map(|token| self.make(token)).collect()
    }

    /// Register a transform applied to every instance computed for `token`.
    ///
    /// Extenders run once per computed instance, in registration order. If
    /// `token` already holds a resolved shared instance, the extender is
    /// applied to it right away and replaces the cached value; if that run
    /// fails the error is returned and the extender is not registered.
    ///
    /// An alias is resolved when `extend` is called. Extending a name that
    /// only later becomes an alias does not affect the aliased binding.
    pub fn extend<T, U, F>(&self, token: impl Into<Token>, transform: F) -> Result<()>
    where
        T: Any + Send + Sync,
        U: Any + Send + Sync,
        F: Fn(Arc<T>, &Container) -> Result<U> + Send + Sync + 'static,
    {
        let token = token.into();
        let label = token.to_string();
        let extender: Extender = Arc::new(move |instance: Instance, container: &Container| -> Result<Instance> {
            let typed = downcast_named::<T>(&label, instance)?;
            let extended: Instance = Arc::new(transform(typed, container)?);
            Ok(extended)
        });

        let (canonical, cached) = {
            let registry = self.inner.read();
            let canonical = registry.canonical(&token);
            let cached = registry.bindings.get(&canonical).and_then(|binding| {
                binding.instance.clone().map(|instance| (instance, binding.generation))
            });
            (canonical, cached)
        };

        // A failing first run leaves the extender unregistered
        let extended = match cached {
            Some((instance, generation)) => Some((extender(instance, self)?, generation)),
            None => None,
        };

        let mut registry = self.inner.write();
        registry.extenders.entry(canonical.clone()).or_default().push(extender);
        if let Some((extended, generation)) = extended {
            if let Some(binding) = registry.bindings.get_mut(&canonical) {
                if binding.generation == generation {
                    binding.instance = Some(extended);
                }
            }
        }
        Ok(())
    }

    /// Resolve `token` to an instance.
    ///
    /// Shared bindings return their cached value once computed; transient
    /// bindings run their factory on every call. Registered extenders are
    /// applied to each freshly computed instance.
    pub fn make(&self, token: impl Into<Token>) -> Result<Instance> {
        let token = token.into();
        let (canonical, factory, shared, generation) = {
            let registry = self.inner.read();
            let canonical = registry.canonical(&token);
            match registry.bindings.get(&canonical) {
                Some(binding) => {
                    if let Some(instance) = &binding.instance {
                        return Ok(instance.clone());
                    }
                    (canonical, binding.factory.clone(), binding.shared, binding.generation)
                }
                None => {
                    return Err(ContainerError::BindingNotFound { token: token.to_string() }.into());
                }
            }
        };

        log::trace!("Computing instance for [{}]", canonical);
        let instance = factory(self)?;
        let instance = self.apply_extenders(&canonical, instance)?;

        if shared {
            let mut registry = self.inner.write();
            if let Some(binding) = registry.bindings.get_mut(&canonical) {
                // Skip caching if the binding was replaced while the factory ran
                if binding.generation == generation {
                    match &binding.instance {
                        Some(existing) => return Ok(existing.clone()),
                        None => binding.instance = Some(instance.clone()),
                    }
                }
            }
        }
        Ok(instance)
    }

    /// Alias of [`Container::make`].
    pub fn resolve(&self, token: impl Into<Token>) -> Result<Instance> {
        self.make(token)
    }

    /// Resolve `token` and downcast the instance to `T`.
    pub fn make_as<T: Any + Send + Sync>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
        let token = token.into();
        let instance = self.make(&token)?;
        downcast(&token, instance)
    }

    /// Resolve `T` by its type token, building it through [`Injectable`] when
    /// no binding exists. Built values are not cached.
    pub fn make_type<T: Injectable>(&self) -> Result<Arc<T>> {
        let token = Token::of::<T>();
        if self.has(&token) {
            return self.make_as::<T>(token);
        }
        log::trace!("No binding for [{}], injecting", token);
        let instance: Instance = Arc::new(T::inject(self)?);
        let instance = self.apply_extenders(&token, instance)?;
        downcast(&token, instance)
    }

    /// Whether a binding exists for `token` (following one alias hop).
    /// Never runs a factory.
    pub fn has(&self, token: impl Into<Token>) -> bool {
        let token = token.into();
        let registry = self.inner.read();
        registry.bindings.contains_key(&registry.canonical(&token))
    }

    /// Alias of [`Container::has`].
    pub fn bound(&self, token: impl Into<Token>) -> bool {
        self.has(token)
    }

    /// Whether `token` is a shared binding that already holds its instance.
    pub fn resolved(&self, token: impl Into<Token>) -> bool {
        let token = token.into();
        let registry = self.inner.read();
        registry
            .bindings
            .get(&registry.canonical(&token))
            .is_some_and(|binding| binding.instance.is_some())
    }

    /// Whether `alias` is registered as an alias.
    pub fn is_alias(&self, alias: impl Into<Token>) -> bool {
        self.inner.read().aliases.contains_key(&alias.into())
    }

    /// Drop the cached instance of a shared binding so the next resolution
    /// recomputes it. Returns whether an instance was dropped.
    pub fn forget_instance(&self, token: impl Into<Token>) -> bool {
        let token = token.into();
        let mut registry = self.inner.write();
        let canonical = registry.canonical(&token);
        registry
            .bindings
            .get_mut(&canonical)
            .and_then(|binding| binding.instance.take())
            .is_some()
    }

    /// Remove every binding, alias, tag and extender.
    pub fn flush(&self) {
        let mut registry = self.inner.write();
        registry.bindings.clear();
        registry.aliases.clear();
        registry.tags.clear();
        registry.extenders.clear();
    }

    /// Tokens with a direct binding, in no particular order.
    pub fn bound_tokens(&self) -> Vec<Token> {
        self.inner.read().bindings.keys().cloned().collect()
    }

    fn apply_extenders(&self, token: &Token, mut instance: Instance) -> Result<Instance> {
        let extenders = self.inner.read().extenders.get(token).cloned().unwrap_or_default();
        for extender in extenders {
            instance = extender(instance, self)?;
        }
        Ok(instance)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.read();
        f.debug_struct("Container")
            .field("bindings", &registry.bindings.len())
            .field("aliases", &registry.aliases.len())
            .field("tags", &registry.tags.len())
            .field("extended_tokens", &registry.extenders.len())
            .finish()
    }
}

/// Downcast a resolved instance to `T`, reporting `token` on mismatch.
pub fn downcast<T: Any + Send + Sync>(token: &Token, instance: Instance) -> Result<Arc<T>> {
    downcast_named(&token.to_string(), instance)
}

fn downcast_named<T: Any + Send + Sync>(token: &str, instance: Instance) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| {
        ContainerError::TypeMismatch {
            token: token.to_string(),
            expected: type_name::<T>(),
        }
        .into()
    })
}

fn erase<T, F>(factory: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(move |container: &Container| -> Result<Instance> {
        let instance: Instance = Arc::new(factory(container)?);
        Ok(instance)
    })
}
