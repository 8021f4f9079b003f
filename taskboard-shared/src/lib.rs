//! # Taskboard Shared Library
//!
//! This crate contains the data layer and the security primitives used by
//! the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, task statuses, labels, tasks) and their queries
//! - `filter`: Task listing filters and the SQL they compile to
//! - `auth`: Password hashing, JWT tokens, request identity and ownership checks
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod filter;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
