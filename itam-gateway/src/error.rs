//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use itam_core::StoreError;
use serde_json::json;

use crate::storage::StorageError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// An error propagated from the record store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No route matches the request method and path.
    #[error("Not Found")]
    RouteNotFound,

    /// The request body could not be decoded into the expected payload.
    #[error("Invalid JSON")]
    InvalidJson,

    /// A path parameter or form field is missing or malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The file record exists but its blob is gone.
    #[error("File not found")]
    FileMissing,

    /// The blob store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Missing(_) => Self::FileMissing,
            StorageError::Io(e) => Self::Storage(e.to_string()),
            StorageError::Poisoned => Self::Storage(err.to_string()),
        }
    }
}

impl GatewayError {
    /// HTTP status code this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Store(StoreError::NotFound { .. })
            | GatewayError::RouteNotFound
            | GatewayError::FileMissing => StatusCode::NOT_FOUND,
            GatewayError::InvalidJson | GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Store(_) | GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use itam_core::RecordId;

    #[test]
    fn gateway_error_status_codes_map_correctly() {
        let not_found = GatewayError::Store(StoreError::NotFound { kind: "Asset", id: RecordId(1) });
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        assert_eq!(GatewayError::RouteNotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::FileMissing.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::InvalidJson.into_response().status(), StatusCode::BAD_REQUEST);

        let bad_req = GatewayError::InvalidRequest("No file uploaded".to_owned());
        assert_eq!(bad_req.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_failures_return_500() {
        let poisoned = GatewayError::Store(StoreError::Internal("lock poisoned".to_owned()));
        assert_eq!(
            poisoned.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "store internals must map to 500"
        );
        let disk = GatewayError::Storage("disk full".to_owned());
        assert_eq!(disk.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_match_wire_contract() {
        assert_eq!(GatewayError::RouteNotFound.to_string(), "Not Found");
        assert_eq!(GatewayError::InvalidJson.to_string(), "Invalid JSON");
        let missing = GatewayError::Store(StoreError::NotFound { kind: "Contract", id: RecordId(9999) });
        assert_eq!(missing.to_string(), "Contract not found");
    }

    #[test]
    fn missing_blob_maps_to_file_missing() {
        let err = GatewayError::from(StorageError::Missing("1_x_a.pdf".to_owned()));
        assert!(matches!(err, GatewayError::FileMissing));
    }
}
