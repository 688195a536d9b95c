//! Admin authentication port.

/// Claims carried by a verified admin ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Identity-provider user id (`sub`).
    pub uid: String,
    pub email: Option<String>,
    pub exp: i64,
}

/// Verifies ID tokens issued by the external identity provider.
pub trait TokenVerifier: Send + Sync {
    /// Check signature, expiry, issuer and audience, returning the claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token verifier misconfigured: {0}")]
    Misconfigured(String),
}
