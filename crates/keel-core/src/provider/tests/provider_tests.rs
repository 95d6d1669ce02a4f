use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tempfile::tempdir;

use crate::env::MemoryEnvironment;
use crate::kernel::bootstrap::Application;
use crate::kernel::error::Result;
use crate::provider::{ConstructProvider, ServiceProvider};

fn local_app() -> Application {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut config = serde_json::Map::new();
    config.insert("app".into(), json!({ "env": "local", "name": "Keel" }));
    Application::builder()
        .base_path(dir.path())
        .environment(Arc::new(MemoryEnvironment::new()))
        .config(config)
        .build()
        .expect("Failed to build application")
}

// Only overrides `register`
struct RegisterOnly {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ServiceProvider for RegisterOnly {
    fn name(&self) -> &'static str {
        "register-only"
    }

    async fn register(&self, app: &Application) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        app.container().bind("counter", |_| Ok(42_u32));
        Ok(())
    }
}

#[tokio::test]
async fn test_default_boot_is_a_no_op() -> Result<()> {
    let app = local_app();
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = RegisterOnly { calls: calls.clone() };

    provider.boot(&app).await?;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!app.container().has("counter"));
    Ok(())
}

#[tokio::test]
async fn test_provider_driven_directly() -> Result<()> {
    let app = local_app();
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = RegisterOnly { calls: calls.clone() };

    provider.register(&app).await?;
    provider.boot(&app).await?;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*app.container().make_as::<u32>("counter")?, 42);
    Ok(())
}

#[tokio::test]
async fn test_shared_provider_via_register_arc() -> Result<()> {
    let app = local_app();
    let calls = Arc::new(AtomicUsize::new(0));
    let provider: Arc<dyn ServiceProvider> = Arc::new(RegisterOnly { calls: calls.clone() });

    app.register_arc(provider.clone())?;
    app.boot().await?;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(Arc::strong_count(&provider), 2, "Application keeps its own handle");
    Ok(())
}

struct NamedProvider {
    label: String,
}

#[async_trait]
impl ServiceProvider for NamedProvider {
    fn name(&self) -> &'static str {
        "named"
    }

    async fn register(&self, app: &Application) -> Result<()> {
        app.container().instance("label", self.label.clone());
        Ok(())
    }
}

impl ConstructProvider for NamedProvider {
    fn construct(app: &Application) -> Self {
        Self {
            label: format!("{} ({})", app.config().get_str("app.name").unwrap_or_default(), app.environment_name()),
        }
    }
}

#[test]
fn test_construct_receives_application() {
    let app = local_app();
    let provider = NamedProvider::construct(&app);
    assert_eq!(provider.label, "Keel (local)");
}
