//! Application error type rendered as the Podium JSON error envelope.
//!
//! Every error leaving a handler or middleware is an [`AppError`]: an HTTP
//! status paired with an [`anyhow::Error`]. The response body always has the
//! shape API consumers pattern-match on:
//!
//! ```json
//! { "success": false, "message": "Authentication required" }
//! ```
//!
//! Server errors (5xx) are logged with their cause and answered with a
//! generic message, so internal details never reach the client.

use std::fmt::{Debug, Display};

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Message returned for every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    fn with_message<M>(status: StatusCode, message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::new(status, Error::msg(message))
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn unauthorized<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::FORBIDDEN, message)
    }

    pub fn too_many_requests<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::with_message(StatusCode::TOO_MANY_REQUESTS, message)
    }

    /// The message placed in the response body.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
