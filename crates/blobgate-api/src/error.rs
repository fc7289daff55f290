//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blobgate_core::CoreError;
use thiserror::Error;
use tracing::debug;

const NOT_FOUND_BODY: &str = "404 - File Not Found";
const INTERNAL_ERROR_BODY: &str = "500 - Internal Server Error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::MissingContentType(_) | CoreError::Proxy(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!("Responding {}: {}", status, self);

        // Details stay in the logs; clients only see the status line text
        let body = if status == StatusCode::NOT_FOUND {
            NOT_FOUND_BODY
        } else {
            INTERNAL_ERROR_BODY
        };

        (status, body).into_response()
    }
}
