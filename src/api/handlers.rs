//! HTTP API handlers.

use axum::Json;
use serde::Serialize;

/// Message returned by the root endpoint.
pub const ROOT_MESSAGE: &str = "BJJ Academy API is running!";

/// Root endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Human-readable status message.
    pub message: &'static str,
}

/// Root handler - always returns 200 with the fixed message.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: ROOT_MESSAGE,
    })
}
