//! Actix-web extractor for bearer token authentication.
//!
//! Reads `Authorization: Bearer <token>` and verifies it with the
//! `TokenService` registered as app data.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};
use tracing::warn;

use super::{Claims, TokenService};
use crate::error::{AppError, ErrorResponse};

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: &'static str,
}

impl AuthError {
    const NOT_AUTHENTICATED: Self = Self {
        status: StatusCode::UNAUTHORIZED,
        message: "Not authenticated.",
    };
    const TOKEN_NOT_FOUND: Self = Self {
        status: StatusCode::UNAUTHORIZED,
        message: "Token not found.",
    };
    const TOKEN_INVALID: Self = Self {
        status: StatusCode::FORBIDDEN,
        message: "Token is invalid or expired.",
    };
    const MISCONFIGURED: Self = Self {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Internal configuration error",
    };
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorResponse::new(self.message))
    }
}

/// Extractor that requires a valid bearer token.
///
/// ```ignore
/// async fn protected_handler(auth: BearerAuth) -> AppResult<HttpResponse> {
///     auth.require_admin()?;
///     // auth.claims carries the caller
/// }
/// ```
#[derive(Debug)]
pub struct BearerAuth {
    pub claims: Claims,
}

impl BearerAuth {
    /// Fail with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.claims.is_admin() {
            Ok(())
        } else {
            warn!(
                "Admin access denied: user={} role={}",
                self.claims.user_id, self.claims.role
            );
            Err(AppError::Forbidden(
                "Access denied: Admin role required".to_string(),
            ))
        }
    }
}

/// Second whitespace-separated part of the header value, if any.
fn token_from_header(value: &str) -> Option<&str> {
    value.split_whitespace().nth(1)
}

impl FromRequest for BearerAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let tokens = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => tokens,
            None => return ready(Err(AuthError::MISCONFIGURED)),
        };

        let header = match req.headers().get(AUTHORIZATION) {
            Some(h) => h,
            None => return ready(Err(AuthError::NOT_AUTHENTICATED)),
        };

        let token = match header.to_str().ok().and_then(token_from_header) {
            Some(t) => t,
            None => return ready(Err(AuthError::TOKEN_NOT_FOUND)),
        };

        match tokens.verify(token) {
            Ok(claims) => ready(Ok(BearerAuth { claims })),
            Err(e) => {
                warn!("Bearer token rejected: {}", e);
                ready(Err(AuthError::TOKEN_INVALID))
            }
        }
    }
}
