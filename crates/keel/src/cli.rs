use std::path::Path;

use keel_core::config::Repository;
use keel_core::kernel::bootstrap::Application;
use keel_core::kernel::constants;
use keel_core::kernel::error::{Error, Result};
use keel_logging::LoggingProvider;
use log::info;

/// Build the application and queue the providers every command boots with.
fn application(base_path: &Path) -> Result<Application> {
    let app = Application::new(base_path)?;
    app.register_type::<LoggingProvider>()?;
    Ok(app)
}

/// Default command: boot, then shut down cleanly.
pub async fn serve(base_path: &Path) -> Result<()> {
    println!("Initializing application...");
    let app = application(base_path)?;
    app.run().await?;
    info!("{} is running in the '{}' environment", constants::APP_NAME, app.environment_name());

    println!("Shutting down application...");
    app.terminate().await
}

pub async fn about(base_path: &Path) -> Result<()> {
    let app = application(base_path)?;
    app.boot().await?;

    println!("{} v{}", constants::APP_NAME, constants::APP_VERSION);
    println!("  Environment: {}", app.environment_name());
    println!("  Base path:   {}", app.base_path().display());
    println!("  Providers:   {}", app.provider_names().join(", "));
    println!(
        "  Config:      {}",
        if app.cached_config_path().is_file() { "cached" } else { "not cached" }
    );
    app.terminate().await
}

/// Print a configuration value. Missing keys are an error.
pub fn config_get(base_path: &Path, key: &str) -> Result<()> {
    let app = Application::new(base_path)?;
    let value = app
        .config()
        .get(key)
        .ok_or_else(|| Error::Other(format!("Configuration key '{}' is not defined", key)))?;
    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|e| Error::Other(format!("Failed to render '{}': {}", key, e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Rebuild the cache from the configuration directory.
pub fn config_cache(base_path: &Path) -> Result<()> {
    // Drop any stale snapshot first so the directory is read
    Repository::clear_cache(&base_path.join(constants::CONFIG_CACHE_PATH))?;
    let app = Application::new(base_path)?;
    let path = app.cached_config_path();
    app.config().write_cache(&path)?;
    println!("Configuration cached successfully at {}", path.display());
    Ok(())
}

pub fn config_clear(base_path: &Path) -> Result<()> {
    if Repository::clear_cache(&base_path.join(constants::CONFIG_CACHE_PATH))? {
        println!("Configuration cache cleared.");
    } else {
        println!("No configuration cache to clear.");
    }
    Ok(())
}
