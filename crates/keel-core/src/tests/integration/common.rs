#![cfg(test)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::{TempDir, tempdir};

use crate::env::{Environment, MemoryEnvironment};
use crate::kernel::bootstrap::Application;
use crate::kernel::error::Result as KernelResult;
use crate::provider::ServiceProvider;

// ===== FIXTURES =====

/// Write `content` to `relative` under `base`, creating parent directories.
pub fn write_file(base: &Path, relative: &str, content: &str) {
    let path = base.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, content).expect("Failed to write fixture file");
}

/// A project directory with an `.env` file and a couple of config files.
pub fn setup_project() -> TempDir {
    let dir = tempdir().expect("Failed to create temp project directory");
    write_file(
        dir.path(),
        ".env",
        "APP_ENV=local\nMAIL_FROM=\"Keel <keel@example.com>\"\n",
    );
    write_file(
        dir.path(),
        "config/app.json",
        r#"{ "name": "Keel", "timezone": "Asia/Kolkata" }"#,
    );
    write_file(
        dir.path(),
        "config/services.json",
        r#"{ "mail": { "driver": "smtp", "port": 2525 } }"#,
    );
    dir
}

pub fn build_app(base: &Path) -> KernelResult<(Application, Arc<MemoryEnvironment>)> {
    let env = Arc::new(MemoryEnvironment::new());
    let app = Application::builder()
        .base_path(base)
        .environment(env.clone())
        .build()?;
    Ok((app, env))
}

// ===== MOCK SERVICES =====

pub trait Transport: Send + Sync {
    fn describe(&self) -> String;
}

pub struct SmtpTransport {
    pub port: u16,
}

impl Transport for SmtpTransport {
    fn describe(&self) -> String {
        format!("smtp:{}", self.port)
    }
}

pub struct Mailer {
    pub from: String,
    pub transport: Arc<dyn Transport>,
    pub middleware: Vec<&'static str>,
}

// ===== MOCK PROVIDERS =====

/// Binds the transport and the mailer.
pub struct MailServiceProvider;

#[async_trait]
impl ServiceProvider for MailServiceProvider {
    fn name(&self) -> &'static str {
        "mail"
    }

    async fn register(&self, app: &Application) -> KernelResult<()> {
        let config = app.config().clone();
        app.container().singleton("mail.transport", move |_| {
            let port = config.get_as::<u16>("services.mail.port").unwrap_or(25);
            let transport: Arc<dyn Transport> = Arc::new(SmtpTransport { port });
            Ok(transport)
        });

        let environment = app.environment().clone();
        app.container().singleton("mailer", move |container| {
            let transport = container.make_as::<Arc<dyn Transport>>("mail.transport")?;
            Ok(Mailer {
                from: environment.get("MAIL_FROM").unwrap_or_default(),
                transport: (*transport).clone(),
                middleware: Vec::new(),
            })
        });
        app.container().alias("mailer", "mail")?;
        app.container().tag("mail.transport", "transports");
        Ok(())
    }
}

/// Decorates the mailer registered by [`MailServiceProvider`].
pub struct MailMiddlewareProvider;

#[async_trait]
impl ServiceProvider for MailMiddlewareProvider {
    fn name(&self) -> &'static str {
        "mail-middleware"
    }

    async fn register(&self, app: &Application) -> KernelResult<()> {
        app.container().extend("mailer", |mailer: Arc<Mailer>, _| {
            let mut middleware = mailer.middleware.clone();
            middleware.push("throttle");
            Ok(Mailer {
                from: mailer.from.clone(),
                transport: mailer.transport.clone(),
                middleware,
            })
        })
    }

    async fn boot(&self, app: &Application) -> KernelResult<()> {
        let mailer = app.make_as::<Mailer>("mail")?;
        app.container().instance("mail.ready", mailer.transport.describe());
        Ok(())
    }
}
