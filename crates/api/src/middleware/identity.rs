//! JWT-based identity extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use inkwell_core::error::CoreError;
use inkwell_core::types::DbId;

use crate::auth::cookies::{find_cookie, SIGNATURE_COOKIE};
use crate::auth::jwt::{validate_token, JwtConfig, TokenAuthor};
use crate::error::AppError;
use crate::state::AppState;

/// The author a request acts as, or nobody.
///
/// Extraction never fails for a request without an `Authorization` header;
/// such requests are anonymous. A header that is present but unusable is
/// rejected with 401.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    author: Option<TokenAuthor>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn author(author: TokenAuthor) -> Self {
        Self {
            author: Some(author),
        }
    }

    /// The logged-in author's id, if any.
    pub fn author_id(&self) -> Option<DbId> {
        self.author.as_ref().map(|a| a.id)
    }

    /// The logged-in author, or an `UNAUTHORIZED` error.
    pub fn require(&self) -> Result<&TokenAuthor, AppError> {
        self.author.as_ref().ok_or_else(AppError::unauthenticated)
    }

    /// Resolve the identity from request headers.
    ///
    /// Accepts `Bearer <header>.<payload>` completed by the `jwt.signature`
    /// cookie, or a whole `Bearer <header>.<payload>.<signature>` token.
    pub fn from_headers(
        headers: &axum::http::HeaderMap,
        config: &JwtConfig,
    ) -> Result<Self, AppError> {
        let Some(auth_header) = headers.get(AUTHORIZATION) else {
            return Ok(Self::anonymous());
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                unauthorized("Invalid Authorization format. Expected: Bearer <token>")
            })?;

        let token = match token.split('.').count() {
            3 => token.to_string(),
            2 => {
                let signature = find_cookie(headers, SIGNATURE_COOKIE)
                    .ok_or_else(|| unauthorized("Missing jwt.signature cookie"))?;
                format!("{token}.{signature}")
            }
            _ => return Err(unauthorized("Malformed token")),
        };

        let claims =
            validate_token(&token, config).map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(Self::author(claims.author))
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Self::from_headers(&parts.headers, &state.config.jwt)?;
        if let Some(author_id) = identity.author_id() {
            tracing::debug!(%author_id, "Authenticated request");
        }
        Ok(identity)
    }
}
