//! Response envelope shared by every API endpoint
//!
//! Successful calls answer `{"status": "ok", "data": ...}`; failures answer
//! `{"status": "error", "error": {"kind": ..., "message": ...}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::error::ExplorerError;

/// Successful payload wrapper
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    status: &'static str,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { status: "ok", data }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl ExplorerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExplorerError::UnknownOption { .. }
            | ExplorerError::InvalidParameter { .. }
            | ExplorerError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ExplorerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ExplorerError::Graph(_) | ExplorerError::Table(_) | ExplorerError::ShapeMismatch(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ExplorerError::GenerationFailed { .. } | ExplorerError::Computation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        } else {
            warn!(kind = self.kind(), "rejected request: {}", self);
        }

        let body = Json(json!({
            "status": "error",
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphError;
    use crate::registry::OptionKind;

    #[test]
    fn test_status_mapping() {
        let unknown = ExplorerError::UnknownOption {
            kind: OptionKind::Generator,
            name: "Lattice".to_string(),
        };
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ExplorerError::MalformedBody("eof".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ExplorerError::Graph(GraphError::Unsupported).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ExplorerError::PayloadTooLarge("length limit exceeded".to_string()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ExplorerError::GenerationFailed { attempts: 3 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_status() {
        let response = ExplorerError::ShapeMismatch("3 vs 4".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
