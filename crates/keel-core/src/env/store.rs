use std::collections::HashMap;
use std::fmt::Debug;

use parking_lot::RwLock;

/// Process environment boundary.
///
/// The application reads and writes environment variables through this
/// trait so tests can run against an isolated [`MemoryEnvironment`] instead
/// of the real, process-wide one.
pub trait Environment: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// The real process environment.
///
/// Writes go through `std::env::set_var`, which is only sound while no
/// other thread touches the environment. Prefer [`MemoryEnvironment`] in
/// multi-threaded hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        // SAFETY: callers must not read or write the environment from other
        // threads while this runs. Keel writes only while building and
        // booting the application; the `keel` binary does both on a
        // current-thread runtime.
        unsafe { std::env::set_var(key, value) }
    }

    fn remove(&self, key: &str) {
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(key) }
    }
}

/// An in-memory environment.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: RwLock<HashMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment pre-populated with `vars`
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Snapshot of every variable
    pub fn vars(&self) -> HashMap<String, String> {
        self.vars.read().clone()
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.vars.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.vars.write().remove(key);
    }
}
