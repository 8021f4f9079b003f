//! # Taskboard API Server Library
//!
//! This library provides the core functionality for the Taskboard API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request body extractor with JSON error responses
//! - `routes`: API route handlers
//! - `services`: Transactional operations behind the handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
