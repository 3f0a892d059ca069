use axum::response::IntoResponse;
use bytes::Bytes;
use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::{environment::EncodeError, todo::TodoId};

/// What the core hands back to the framing layer: one per action.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    pub fn empty(status: StatusCode) -> Self { Self::new(status, HeaderMap::new(), Bytes::new()) }

    pub fn json(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(status, headers, body)
    }

    /// Renders `error` as an [`ErrorBody`]. If even that cannot be encoded the
    /// response degrades to a plain-text 500.
    pub fn from_error(error: &ApiError) -> Self {
        let body = ErrorBody::from(error);
        match serde_json::to_vec(&body) {
            Ok(bytes) => Self::json(error.status(), bytes),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode error body");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), e.to_string())
            }
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response { (self.status, self.headers, self.body).into_response() }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("to-do item `{id}` was not found")]
    TodoNotFound { id: TodoId },
    #[error("no route matches the request")]
    RouteNotFound,
    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TodoNotFound { .. } | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(rename = "errorDump")]
    pub error_dump: String,
    pub message: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(error: &ApiError) -> Self { Self { error_dump: format!("{error:?}"), message: error.to_string() } }
}
