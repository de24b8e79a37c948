//! # Clients API
//!
//! A small HTTP service for managing mailing customers: create, fetch, list and
//! delete customer records, plus a bulk "send" that retires a whole mailing.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server, routing and middleware
//! - **SQLx**: asynchronous SQLite access
//! - **Tokio**: async runtime and the cleanup timer
//! - **Tracing**: structured logging, keyed by request correlation id
//!
//! ## Request pipeline
//!
//! auth gate -> correlation id -> handler -> [`validation`] -> [`repository`] -> [`store`] -> SQLite
//!
//! ## Modules
//!
//! - [`cleanup`]: periodic soft-deletion of old customers
//! - [`config`]: layered configuration
//! - [`db`]: pool setup and schema
//! - [`error`]: HTTP error mapping
//! - [`middleware`]: authentication and correlation ids
//! - [`repository`]: typed error classification over the store
//! - [`routes`]: handlers and router assembly
//! - [`state`]: shared application state
//! - [`store`]: raw SQLite row operations
//! - [`types`]: customer model and request bodies
//! - [`validation`]: customer field rules

pub mod cleanup;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;
