/// Application name
pub const APP_NAME: &str = "Keel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Token prefix that makes `Application::make` fall back to configuration
pub const CONFIG_NAMESPACE: &str = "config.";

/// Token under which the configuration repository is bound
pub const CONFIG_TOKEN: &str = "config";

/// Configuration directory, relative to the base path
pub const CONFIG_DIR: &str = "config";

/// Environment file, relative to the base path
pub const ENV_FILE: &str = ".env";

/// Cached configuration snapshot, relative to the base path
pub const CONFIG_CACHE_PATH: &str = "bootstrap/cache/config.json";

/// Environment variable naming the application environment
pub const APP_ENV_VAR: &str = "APP_ENV";

/// Process time zone variable set at boot
pub const TIMEZONE_VAR: &str = "TZ";

/// Environment assumed when none is configured
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Environments that require an application key
pub const PRODUCTION_ENVIRONMENTS: &[&str] = &["production", "prod"];

/// Configuration keys read by the kernel
pub const APP_ENV_KEY: &str = "app.env";
pub const APP_KEY_KEY: &str = "app.key";
pub const APP_TIMEZONE_KEY: &str = "app.timezone";
