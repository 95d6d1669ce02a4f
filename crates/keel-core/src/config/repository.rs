use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::error::ConfigSystemError;
use crate::config::format::ConfigFormat;
use crate::kernel::error::Result;

/// Read model over the application's configuration tree.
///
/// The tree is a JSON object with one top-level key per configuration file.
/// Keys are addressed with dot paths (`"database.connections.main.host"`).
/// Once [`Repository::mark_as_booted`] has been called every mutating
/// operation fails with [`ConfigSystemError::Frozen`]; reads keep working.
#[derive(Debug, Default)]
pub struct Repository {
    items: RwLock<Map<String, Value>>,
    booted: AtomicBool,
}

impl Repository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over an existing tree
    pub fn from_map(items: Map<String, Value>) -> Self {
        Self {
            items: RwLock::new(items),
            booted: AtomicBool::new(false),
        }
    }

    /// Get the value at a dot path.
    ///
    /// Returns `None` as soon as a segment is missing or the traversal hits a
    /// value that is not a mapping. An empty key returns the whole tree.
    pub fn get(&self, key: &str) -> Option<Value> {
        let items = self.items.read();
        if key.is_empty() {
            return Some(Value::Object(items.clone()));
        }
        let mut segments = key.split('.');
        let mut current = items.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }

    /// Get the value at a dot path, or `default` when absent
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Get and deserialize the value at a dot path. Returns `None` when the
    /// value is absent or does not deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| serde_json::from_value(value).ok())
    }

    /// Get a string value, or `None` if absent or not a string
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if a dot path resolves to a value
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// A copy of the whole tree. Mutating the copy never affects the repository.
    pub fn all(&self) -> Map<String, Value> {
        self.items.read().clone()
    }

    /// Top-level keys, one per loaded configuration file
    pub fn keys(&self) -> Vec<String> {
        self.items.read().keys().cloned().collect()
    }

    /// Set the value at a dot path, creating intermediate mappings as needed.
    /// A non-mapping value in the way is replaced by a mapping.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable("set")?;
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(ConfigSystemError::InvalidKey {
                key: key.to_string(),
                reason: "empty path segment".to_string(),
            }
            .into());
        }

        let mut items = self.items.write();
        let mut segments: Vec<&str> = key.split('.').collect();
        let last = segments.pop().unwrap_or(key);
        let mut current = &mut *items;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just replaced by a mapping"),
            };
        }
        current.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Merge `values` into the section under the top-level `key`.
    ///
    /// Mappings are merged recursively and any other value in `values`
    /// replaces the existing one. A missing or non-mapping section is
    /// replaced by `values`.
    pub fn merge(&self, key: &str, values: Map<String, Value>) -> Result<()> {
        self.ensure_mutable("merge")?;
        let mut items = self.items.write();
        match items.get_mut(key) {
            Some(Value::Object(section)) => merge_into(section, values),
            _ => {
                items.insert(key.to_string(), Value::Object(values));
            }
        }
        Ok(())
    }

    /// Replace the whole tree
    pub fn replace(&self, items: Map<String, Value>) -> Result<()> {
        self.ensure_mutable("replace")?;
        *self.items.write() = items;
        Ok(())
    }

    /// Load every recognized configuration file in `dir`, each under its
    /// file stem.
    ///
    /// A missing directory counts as empty. Files that cannot be read or
    /// parsed are skipped. Returns the number of files loaded.
    pub fn load_config_directory(&self, dir: &Path) -> Result<usize> {
        self.ensure_mutable("load_config_directory")?;
        if !dir.is_dir() {
            log::debug!("Config directory {} not found, nothing to load", dir.display());
            return Ok(0);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| ConfigSystemError::io(e, "read_dir", dir.to_path_buf()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && ConfigFormat::from_path(path).is_some())
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match read_config_file(&path) {
                Ok((name, values)) => {
                    log::debug!("Loaded config file {} as '{}'", path.display(), name);
                    self.items.write().insert(name, Value::Object(values));
                    loaded += 1;
                }
                Err(e) => log::debug!("Skipping config file {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    /// Load a single configuration file under its file stem. Unlike
    /// [`Repository::load_config_directory`], failures are returned.
    pub fn load_file(&self, path: &Path) -> Result<String> {
        self.ensure_mutable("load_file")?;
        let (name, values) = read_config_file(path)?;
        self.items.write().insert(name.clone(), Value::Object(values));
        Ok(name)
    }

    /// Replace the tree with a cached JSON snapshot.
    ///
    /// Returns `Ok(false)` and leaves the tree untouched when the snapshot is
    /// missing or cannot be parsed.
    pub fn load_cached(&self, path: &Path) -> Result<bool> {
        self.ensure_mutable("load_cached")?;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Ok(false),
        };
        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(items) => {
                *self.items.write() = items;
                log::debug!("Loaded cached configuration from {}", path.display());
                Ok(true)
            }
            Err(e) => {
                log::debug!("Ignoring unreadable config cache {}: {}", path.display(), e);
                Ok(false)
            }
        }
    }

    /// Write the current tree as a JSON snapshot, creating parent directories.
    pub fn write_cache(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.items.read()).map_err(|e| {
            ConfigSystemError::SerializationError {
                format: ConfigFormat::Json.extension().to_string(),
                source: Box::new(e),
            }
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigSystemError::io(e, "create_dir_all", parent.to_path_buf()))?;
        }
        fs::write(path, content).map_err(|e| ConfigSystemError::io(e, "write", path.to_path_buf()))?;
        Ok(())
    }

    /// Remove a cached snapshot. Returns whether a file was removed.
    pub fn clear_cache(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).map_err(|e| ConfigSystemError::io(e, "remove_file", path.to_path_buf()))?;
        Ok(true)
    }

    /// Freeze the repository. There is no way back.
    pub fn mark_as_booted(&self) {
        self.booted.store(true, Ordering::SeqCst);
    }

    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    fn ensure_mutable(&self, operation: &str) -> Result<()> {
        if self.is_booted() {
            return Err(ConfigSystemError::frozen(operation).into());
        }
        Ok(())
    }
}

fn merge_into(target: &mut Map<String, Value>, values: Map<String, Value>) {
    for (key, value) in values {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                merge_into(existing, incoming);
                continue;
            }
            target.insert(key, Value::Object(incoming));
        } else {
            target.insert(key, value);
        }
    }
}

fn read_config_file(path: &Path) -> std::result::Result<(String, Map<String, Value>), ConfigSystemError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| ConfigSystemError::InvalidKey {
            key: path.display().to_string(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;
    let content = fs::read_to_string(path).map_err(|e| ConfigSystemError::io(e, "read_to_string", path.to_path_buf()))?;
    let values = format.parse_mapping(&content, &name)?;
    Ok((name, values))
}
