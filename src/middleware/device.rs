// src/middleware/device.rs

use axum::{
    body::{to_bytes, Bytes},
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
};

use crate::{
    common::error::AppError,
    services::gateway_service::{MAX_API_KEY_LEN, MAX_BODY_BYTES},
};

const API_KEY_HEADER: &str = "x-api-key";

/// Chave da chipeira enviada em `x-api-key`.
/// Ausente, vazia ou maior que 128 caracteres: 401.
#[derive(Debug, Clone)]
pub struct DeviceApiKey(pub String);

impl<S> FromRequestParts<S> for DeviceApiKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|key| !key.is_empty() && key.len() <= MAX_API_KEY_LEN)
            .map(|key| DeviceApiKey(key.to_string()))
            .ok_or(AppError::ApiKeyRequired)
    }
}

/// Corpo cru limitado a 512 000 bytes, conferido antes de qualquer parse.
#[derive(Debug)]
pub struct BoundedBody(pub Bytes);

fn declared_length(headers: &axum::http::HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

impl<S> FromRequest<S> for BoundedBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if declared_length(req.headers()).is_some_and(|len| len > MAX_BODY_BYTES as u64) {
            return Err(AppError::PayloadTooLarge);
        }

        let bytes = to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| AppError::PayloadTooLarge)?;

        Ok(BoundedBody(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn declared_oversize_is_rejected_without_reading() {
        let req = Request::builder()
            .header(header::CONTENT_LENGTH, (MAX_BODY_BYTES + 1).to_string())
            .body(Body::empty())
            .unwrap();
        let result = BoundedBody::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge)));
    }

    #[tokio::test]
    async fn streamed_oversize_is_rejected() {
        let req = Request::builder()
            .body(Body::from(vec![b'a'; MAX_BODY_BYTES + 1]))
            .unwrap();
        let result = BoundedBody::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge)));
    }

    #[tokio::test]
    async fn body_at_the_limit_is_accepted() {
        let req = Request::builder()
            .body(Body::from(vec![b'a'; MAX_BODY_BYTES]))
            .unwrap();
        let BoundedBody(bytes) = BoundedBody::from_request(req, &()).await.unwrap();
        assert_eq!(bytes.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn api_key_longer_than_128_is_rejected() {
        let (mut parts, _) = Request::builder()
            .header(API_KEY_HEADER, "k".repeat(MAX_API_KEY_LEN + 1))
            .body(())
            .unwrap()
            .into_parts();
        let result = DeviceApiKey::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::ApiKeyRequired)));
    }
}
