//! Middleware applied in front of every route.
//!
//! The authentication gate runs first; requests that pass it are stamped with
//! a correlation id before reaching a handler.

pub mod auth;
pub mod request_id;

pub use request_id::RequestId;
