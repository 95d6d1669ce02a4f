#![cfg(test)]

pub mod common;
pub mod application_tests;
pub mod config_cache_tests;
