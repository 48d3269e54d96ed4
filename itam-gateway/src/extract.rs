//! Request extractors that reject with [`GatewayError`] JSON bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use itam_core::RecordId;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// A JSON body decoded regardless of the request `Content-Type`.
///
/// The body is buffered in full before decoding. Any decode failure becomes
/// [`GatewayError::InvalidJson`].
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
        decode(&bytes).map(JsonBody)
    }
}

/// Decode a buffered body into `T`.
///
/// # Errors
/// Returns [`GatewayError::InvalidJson`] if the bytes are not valid JSON or
/// do not match the shape of `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, category = ?e.classify(), "rejected request body");
        GatewayError::InvalidJson
    })
}

/// The numeric `{id}` segment of a resource path.
#[derive(Debug, Clone, Copy)]
pub struct IdParam(pub RecordId);

impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
        raw.parse::<u64>()
            .map(|id| IdParam(RecordId(id)))
            .map_err(|_| GatewayError::InvalidRequest(format!("invalid id '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itam_core::NewAsset;

    #[test]
    fn decode_accepts_partial_payload() {
        let draft: NewAsset = match decode(br#"{"name":"X"}"#) {
            Ok(d) => d,
            Err(e) => panic!("decode failed: {e}"),
        };
        assert_eq!(draft.name, "X");
    }

    #[test]
    fn decode_rejects_garbage_and_wrong_shapes() {
        assert!(matches!(decode::<NewAsset>(b"not json"), Err(GatewayError::InvalidJson)));
        assert!(matches!(decode::<NewAsset>(br#""not json""#), Err(GatewayError::InvalidJson)));
        assert!(matches!(decode::<NewAsset>(b""), Err(GatewayError::InvalidJson)));
        assert!(matches!(decode::<NewAsset>(br#"{"name":1}"#), Err(GatewayError::InvalidJson)));
    }
}
