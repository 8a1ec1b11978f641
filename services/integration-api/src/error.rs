//! HTTP error mapping
//!
//! Every flow failure reaches the caller as a 400 with a descriptive
//! `detail`. Only faults on our side (cache backend, bad configuration)
//! are reported as 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] hubspot_auth::Error),

    #[error(transparent)]
    Items(#[from] hubspot_items::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(hubspot_auth::Error::Store(_))
            | ApiError::Auth(hubspot_auth::Error::Config(_))
            | ApiError::Items(hubspot_items::Error::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// JSON error body: {"detail":"...","request_id":"req_..."}
    pub fn into_response_with_id(self, request_id: &str) -> Response {
        let body = serde_json::json!({
            "detail": self.to_string(),
            "request_id": request_id,
        });
        (
            self.status(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
