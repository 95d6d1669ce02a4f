
#[cfg(test)]
pub(crate) mod common {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{Map, Value};

    use crate::env::MemoryEnvironment;
    use crate::kernel::bootstrap::Application;
    use crate::kernel::error::Result;
    use crate::provider::ServiceProvider;

    pub type Journal = Arc<Mutex<Vec<String>>>;

    /// Provider recording every phase it goes through into a shared journal.
    pub struct RecordingProvider {
        pub name: &'static str,
        pub journal: Journal,
        pub fail_in: Option<&'static str>,
    }

    impl RecordingProvider {
        pub fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: journal.clone(),
                fail_in: None,
            }
        }

        pub fn failing_in(mut self, phase: &'static str) -> Self {
            self.fail_in = Some(phase);
            self
        }

        fn record(&self, phase: &'static str) -> Result<()> {
            self.journal.lock().push(format!("{}:{}", phase, self.name));
            if self.fail_in == Some(phase) {
                return Err(format!("{} failed in {}", self.name, phase).into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ServiceProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn register(&self, _app: &Application) -> Result<()> {
            tokio::task::yield_now().await;
            self.record("register")
        }

        async fn boot(&self, _app: &Application) -> Result<()> {
            tokio::task::yield_now().await;
            self.record("boot")
        }
    }

    pub fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub fn tree(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected a JSON object, got {}", other),
        }
    }

    /// Application over an injected config tree and an isolated environment.
    pub fn test_app(config: Value) -> (Application, Arc<MemoryEnvironment>) {
        test_app_with_env(config, MemoryEnvironment::new())
    }

    pub fn test_app_with_env(config: Value, env: MemoryEnvironment) -> (Application, Arc<MemoryEnvironment>) {
        let env = Arc::new(env);
        let base = tempfile::tempdir().expect("Failed to create temporary directory");
        let app = Application::builder()
            .base_path(base.path())
            .environment(env.clone())
            .config(tree(config))
            .build()
            .expect("Application::build failed");
        (app, env)
    }
}
