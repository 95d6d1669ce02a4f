//! # Keel Environment
//!
//! Reads `KEY=VALUE` environment files into an [`Environment`], the
//! abstraction over process environment variables. Existing variables always
//! win over file contents.
pub mod error;
pub mod loader;
pub mod parser;
pub mod store;

pub use error::EnvError;
pub use loader::{load_file, load_str};
pub use store::{Environment, MemoryEnvironment, SystemEnvironment};
