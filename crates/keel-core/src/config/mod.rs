//! # Keel Configuration
//!
//! The [`Repository`] holds the application's configuration tree, loaded
//! from a directory of JSON, YAML or TOML files (one top-level key per file
//! stem), from a cached JSON snapshot, or injected directly. Values are read
//! with dot paths and the repository becomes read-only once the application
//! boots.
pub mod error;
pub mod format;
pub mod repository;

pub use error::ConfigSystemError;
pub use format::ConfigFormat;
pub use repository::Repository;
