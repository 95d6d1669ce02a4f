use std::path::Path;

use serde_json::{Map, Value};

use crate::config::error::ConfigSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse a document into a JSON value.
    pub fn parse(&self, data: &str) -> Result<Value, ConfigSystemError> {
        let deserialization = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigSystemError::DeserializationError {
                format: self.extension().to_string(),
                source,
            }
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| deserialization(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization(Box::new(e))),
        }
    }

    /// Parse a document that must be a mapping.
    ///
    /// A mapping whose only entry is a `default` mapping is unwrapped, so a
    /// file may nest its settings under `default`.
    pub fn parse_mapping(&self, data: &str, name: &str) -> Result<Map<String, Value>, ConfigSystemError> {
        match self.parse(data)? {
            Value::Object(mut map) => {
                if map.len() == 1 && matches!(map.get("default"), Some(Value::Object(_))) {
                    if let Some(Value::Object(inner)) = map.remove("default") {
                        return Ok(inner);
                    }
                }
                Ok(map)
            }
            _ => Err(ConfigSystemError::NotAMapping(name.to_string())),
        }
    }
}
