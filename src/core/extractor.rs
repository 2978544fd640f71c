use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;

/// Account id of the authenticated caller, forwarded by the upstream auth
/// gateway in the `X-Owner-Id` header. This service does not validate
/// tokens itself; the gateway terminates authentication.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-owner-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| OwnerId(v.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Missing X-Owner-Id header".to_string()))
    }
}
