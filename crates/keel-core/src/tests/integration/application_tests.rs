#![cfg(test)]

use std::sync::Arc;

use serde_json::json;

use crate::container::Instance;
use crate::env::Environment;
use crate::kernel::error::{Error, Result as KernelResult};

use super::common::{
    MailMiddlewareProvider, MailServiceProvider, Mailer, Transport, build_app, setup_project, write_file,
};

#[tokio::test]
async fn test_full_application_lifecycle() -> KernelResult<()> {
    let project = setup_project();
    let (app, env) = build_app(project.path())?;

    assert_eq!(app.environment_name(), "local");
    assert_eq!(app.config().get("app.name"), Some(json!("Keel")));

    app.register(MailServiceProvider)?;
    app.register(MailMiddlewareProvider)?;
    app.run().await?;

    assert!(app.is_booted());
    assert_eq!(env.get("TZ").as_deref(), Some("Asia/Kolkata"));

    let mailer = app.make_as::<Mailer>("mailer")?;
    assert_eq!(mailer.from, "Keel <keel@example.com>");
    assert_eq!(mailer.middleware, vec!["throttle"]);
    assert_eq!(mailer.transport.describe(), "smtp:2525");

    // Resolved once during boot and shared afterwards
    let through_alias = app.make_as::<Mailer>("mail")?;
    assert!(Arc::ptr_eq(&mailer, &through_alias));
    assert_eq!(*app.make_as::<String>("mail.ready")?, "smtp:2525");

    let transports = app.container().tagged("transports")?;
    assert_eq!(transports.len(), 1);
    let transport = transports[0]
        .downcast_ref::<Arc<dyn Transport>>()
        .expect("tagged transport should be an Arc<dyn Transport>");
    assert_eq!(transport.describe(), "smtp:2525");

    assert_eq!(*app.make_as::<serde_json::Value>("config.services.mail.driver")?, json!("smtp"));
    assert!(matches!(app.config().set("app.name", "Changed"), Err(Error::Config(_))));

    let flushed = Arc::new(parking_lot::Mutex::new(false));
    let flag = flushed.clone();
    app.terminating(move || async move {
        *flag.lock() = true;
        Ok(())
    });
    app.terminate().await?;
    assert!(*flushed.lock());
    Ok(())
}

#[tokio::test]
async fn test_extension_registered_first_still_applies() -> KernelResult<()> {
    let project = setup_project();
    let (app, _env) = build_app(project.path())?;

    // The extender is queued before the binding it decorates exists
    app.register(MailMiddlewareProvider)?;
    app.register(MailServiceProvider)?;

    // MailMiddlewareProvider::boot resolves the mailer, which now exists
    app.boot().await?;
    let mailer = app.make_as::<Mailer>("mailer")?;
    assert_eq!(mailer.middleware, vec!["throttle"]);
    Ok(())
}

#[tokio::test]
async fn test_boot_failure_reports_provider() -> KernelResult<()> {
    let project = setup_project();
    let (app, _env) = build_app(project.path())?;

    // Boot resolves "mail", which nothing binds without MailServiceProvider
    app.register(MailMiddlewareProvider)?;
    let err = app.boot().await.unwrap_err();

    assert!(err.to_string().contains("mail-middleware"), "Unexpected error: {}", err);
    assert!(!app.is_booted());
    Ok(())
}

#[tokio::test]
async fn test_production_project_needs_key() -> KernelResult<()> {
    let project = setup_project();
    write_file(project.path(), ".env", "APP_ENV=production\n");
    let (app, _env) = build_app(project.path())?;
    assert!(app.is_production());
    assert!(matches!(app.boot().await, Err(Error::MissingConfiguration { .. })));

    write_file(
        project.path(),
        "config/app.json",
        r#"{ "name": "Keel", "key": "base64:c2VjcmV0" }"#,
    );
    let (app, _env) = build_app(project.path())?;
    app.boot().await?;
    assert!(app.is_booted());
    Ok(())
}

#[test]
fn test_instances_share_config_repository() -> KernelResult<()> {
    let project = setup_project();
    let (app, _env) = build_app(project.path())?;

    let repository: Instance = app.make("config")?;
    let direct: Instance = app.config().clone();
    assert!(Arc::ptr_eq(&repository, &direct));
    Ok(())
}
