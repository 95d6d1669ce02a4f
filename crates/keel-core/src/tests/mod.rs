// Crate-level integration tests
mod integration;
