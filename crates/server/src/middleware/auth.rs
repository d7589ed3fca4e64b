//! Authentication extractor.
//!
//! Provides the verified principal for route handlers. The tenant scope of
//! every protected operation comes from here — handlers must never accept a
//! tenant ID from the path, query, or body.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     CurrentUser(principal): CurrentUser,
//! ) -> impl IntoResponse {
//!     format!("tenant: {}", principal.tenant_id)
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use storepulse_core::{TenantId, UserId};

use crate::auth::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// The verified principal of an authenticated request.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Authenticated user.
    pub user_id: UserId,
    /// Tenant the user belongs to; the scope of every read and write.
    pub tenant_id: TenantId,
    /// User email from the token.
    pub email: String,
}

/// Extractor that requires a valid bearer token.
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let claims = verify_token(token, &state.config().jwt_secret)
            .map_err(|_| AppError::Unauthorized("Not authorized, token failed".to_string()))?;

        Ok(Self(Principal {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            email: claims.email,
        }))
    }
}
