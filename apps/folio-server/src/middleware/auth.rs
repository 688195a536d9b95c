//! Admin authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use folio_core::ports::{AuthError, TokenClaims};
use folio_shared::ErrorResponse;

use crate::state::AppState;

/// Cookie the admin UI stores its ID token in.
pub const ADMIN_TOKEN_COOKIE: &str = "adminToken";

/// Verified admin identity extractor.
///
/// Use this in handlers to require a valid admin token:
/// ```ignore
/// async fn protected_route(admin: AdminIdentity) -> impl Responder {
///     format!("Hello, {}!", admin.uid)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub uid: String,
    pub email: Option<String>,
}

impl From<TokenClaims> for AdminIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            uid: claims.uid,
            email: claims.email,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::Misconfigured(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your admin token has expired. Please sign in again."),
            AuthError::InvalidToken(msg) => {
                tracing::debug!(reason = %msg, "Rejected admin token");
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingToken => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Provide a Bearer token or the adminToken cookie."),
            AuthError::Misconfigured(msg) => {
                tracing::error!("Token verifier misconfigured: {}", msg);
                ErrorResponse::internal_error()
            }
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Pull the raw token from the Authorization header, then the admin cookie.
fn extract_token(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

        return auth_str
            .strip_prefix("Bearer ")
            .map(|t| t.trim().to_string())
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    req.cookie(ADMIN_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

impl FromRequest for AdminIdentity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AuthenticationError(AuthError::Misconfigured(
                "application state not registered".to_string(),
            ))));
        };

        let result = extract_token(req)
            .and_then(|token| state.verifier.verify(&token))
            .map(AdminIdentity::from)
            .map_err(AuthenticationError);

        ready(result)
    }
}
