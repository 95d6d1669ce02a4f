#![cfg(test)]

use serde_json::json;

use crate::config::Repository;
use crate::kernel::error::Result as KernelResult;

use super::common::{build_app, setup_project, write_file};

#[tokio::test]
async fn test_cache_round_trip_through_application() -> KernelResult<()> {
    let project = setup_project();
    let (app, _env) = build_app(project.path())?;
    app.boot().await?;

    // Writing a snapshot is allowed once the configuration is frozen
    app.config().write_cache(&app.cached_config_path())?;
    assert!(app.cached_config_path().is_file());

    // Edits to the directory are ignored while the snapshot exists
    write_file(project.path(), "config/app.json", r#"{ "name": "Edited" }"#);
    let (cached, _env) = build_app(project.path())?;
    assert_eq!(cached.config().get("app.name"), Some(json!("Keel")));
    assert_eq!(cached.config().all(), app.config().all());

    assert!(Repository::clear_cache(&cached.cached_config_path())?);
    assert!(!Repository::clear_cache(&cached.cached_config_path())?);

    let (fresh, _env) = build_app(project.path())?;
    assert_eq!(fresh.config().get("app.name"), Some(json!("Edited")));
    Ok(())
}

#[test]
fn test_broken_config_file_is_skipped() -> KernelResult<()> {
    let project = setup_project();
    write_file(project.path(), "config/broken.json", "{ not json");
    write_file(project.path(), "config/notes.txt", "ignored");

    let (app, _env) = build_app(project.path())?;
    assert!(app.config().has("app"));
    assert!(app.config().has("services"));
    assert!(!app.config().has("broken"));
    assert!(!app.config().has("notes"));
    Ok(())
}
