/// Request extractors
///
/// [`ApiJson`] replaces `axum::Json` for request bodies so that a body axum
/// can't deserialize is reported in the same `{error, message, details}`
/// shape as every other error.
///
/// ```text
/// POST /api/tasks
/// { "name": "Write release notes" }
///
/// 422 { "error": "validation_error",
///       "details": [{ "field": "taskStatusId", "message": "..." }] }
/// ```

use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON body extractor rejecting with [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
