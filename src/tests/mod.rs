//! Integration and unit tests for the clients API.
//!
//! ## Test Modules
//!
//! - **support**: shared fixtures (configs, SQLite files, log capture, requests)
//! - **api_tests**: handlers and middleware against a mocked repository
//! - **sqlite_api_tests**: the full stack against a real SQLite file
//! - **db_tests**: storage adapter queries and schema setup
//! - **repository_tests**: error classification over a mocked store
//! - **error_tests**: HTTP error mapping
//! - **config_tests**: configuration loading and validation
//!
//! Run a single module with `cargo test api_tests`.

pub mod support;
