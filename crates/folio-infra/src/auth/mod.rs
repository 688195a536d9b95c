//! Admin token verification.

mod jwks;
mod jwt;

pub use jwks::{FIREBASE_JWKS_URL, JwksSource};
pub use jwt::{JwtConfig, JwtKey, JwtTokenVerifier};
