/// API route handlers
///
/// Handlers stay thin: extract, validate, call the matching function in
/// `crate::services`, and wrap the result. Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login and the welcome page
/// - `users`: User registration and self-service
/// - `statuses`: Task statuses
/// - `labels`: Labels
/// - `tasks`: Tasks, including filtered listing

pub mod auth;
pub mod health;
pub mod labels;
pub mod statuses;
pub mod tasks;
pub mod users;
