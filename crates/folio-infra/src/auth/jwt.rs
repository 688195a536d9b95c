//! JWT verification of identity-provider ID tokens.
//!
//! Tokens are expected to carry the issuer
//! `https://securetoken.google.com/<project>` and the project id as audience,
//! the shape Firebase Authentication issues.
//!
//! The provider signs with a rotating set of keys, so besides a single
//! static key the verifier accepts a JWK set and picks the key named by the
//! token header's `kid`. The set can be swapped while serving.

use std::collections::HashMap;
use std::sync::RwLock;

use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use folio_core::ports::{AuthError, TokenClaims, TokenVerifier};

const ISSUER_BASE: &str = "https://securetoken.google.com";

/// Key material used to check token signatures.
#[derive(Debug, Clone)]
pub enum JwtKey {
    /// Shared HS256 secret.
    Secret(String),
    /// RS256 public key in PEM form.
    RsaPem(String),
    /// Published key set; tokens must name their key with `kid`.
    KeySet(JwkSet),
}

/// JWT verifier configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub project_id: String,
    pub key: JwtKey,
}

impl JwtConfig {
    pub fn issuer(&self) -> String {
        format!("{ISSUER_BASE}/{}", self.project_id)
    }
}

/// Internal JWT claims structure for deserialization.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    exp: i64,
}

type KeyMap = HashMap<String, (DecodingKey, Algorithm)>;

enum Keys {
    Static(DecodingKey),
    Rotating(RwLock<KeyMap>),
}

/// Index the usable keys of `set` by key id.
fn key_map(set: &JwkSet) -> Result<KeyMap, AuthError> {
    let mut keys = HashMap::new();

    for jwk in &set.keys {
        let Some(kid) = jwk.common.key_id.clone() else {
            tracing::warn!("Skipping published key without a key id");
            continue;
        };

        let algorithm = match &jwk.algorithm {
            AlgorithmParameters::RSA(_) => Algorithm::RS256,
            AlgorithmParameters::EllipticCurve(_) => Algorithm::ES256,
            AlgorithmParameters::OctetKeyPair(_) => Algorithm::EdDSA,
            AlgorithmParameters::OctetKey(_) => Algorithm::HS256,
        };

        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthError::Misconfigured(format!("invalid published key {kid}: {e}")))?;
        keys.insert(kid, (key, algorithm));
    }

    if keys.is_empty() {
        return Err(AuthError::Misconfigured(
            "key set contains no usable keys".to_string(),
        ));
    }

    Ok(keys)
}

fn token_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

/// Verifies admin ID tokens against a fixed project.
pub struct JwtTokenVerifier {
    keys: Keys,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(config: JwtConfig) -> Result<Self, AuthError> {
        if config.project_id.is_empty() {
            return Err(AuthError::Misconfigured("project id is empty".to_string()));
        }

        let (keys, algorithm) = match &config.key {
            JwtKey::Secret(secret) => (
                Keys::Static(DecodingKey::from_secret(secret.as_bytes())),
                Algorithm::HS256,
            ),
            JwtKey::RsaPem(pem) => (
                Keys::Static(
                    DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                        AuthError::Misconfigured(format!("invalid RSA public key: {e}"))
                    })?,
                ),
                Algorithm::RS256,
            ),
            // Narrowed per token to the algorithm of the selected key.
            JwtKey::KeySet(set) => (Keys::Rotating(RwLock::new(key_map(set)?)), Algorithm::RS256),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[&config.project_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        tracing::info!(
            project_id = %config.project_id,
            rotating_keys = matches!(keys, Keys::Rotating(_)),
            "Configured admin token verifier"
        );

        Ok(Self { keys, validation })
    }

    /// Swap in a freshly published key set. Returns the number of usable keys.
    ///
    /// A set with no usable keys is rejected and the current keys are kept.
    pub fn replace_key_set(&self, set: &JwkSet) -> Result<usize, AuthError> {
        let Keys::Rotating(current) = &self.keys else {
            return Err(AuthError::Misconfigured(
                "verifier was built with a static key".to_string(),
            ));
        };

        let fresh = key_map(set)?;
        let count = fresh.len();

        let mut current = current
            .write()
            .map_err(|_| AuthError::Misconfigured("key set lock poisoned".to_string()))?;
        *current = fresh;

        Ok(count)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let data = match &self.keys {
            Keys::Static(key) => decode::<Claims>(token, key, &self.validation),
            Keys::Rotating(keys) => {
                let header = decode_header(token).map_err(token_error)?;
                let kid = header
                    .kid
                    .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

                let keys = keys
                    .read()
                    .map_err(|_| AuthError::Misconfigured("key set lock poisoned".to_string()))?;
                let (key, algorithm) = keys
                    .get(&kid)
                    .ok_or_else(|| AuthError::InvalidToken(format!("unknown key id {kid}")))?;

                let mut validation = self.validation.clone();
                validation.algorithms = vec![*algorithm];
                decode::<Claims>(token, key, &validation)
            }
        };

        data.map(|d| d.claims).map_err(token_error)
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = self.decode_claims(token)?;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(TokenClaims {
            uid: claims.sub,
            email: claims.email,
            exp: claims.exp,
        })
    }
}
