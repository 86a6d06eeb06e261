//! Compact HS256 access tokens.
//!
//! Tokens follow the JWT layout (`header.claims.signature`, base64url without
//! padding) so existing frontends can decode the claims, but only the HS256
//! algorithm is ever issued or accepted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::domain::UserRole;
use crate::config::AuthConfig;
use crate::ids::UserId;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing key rejected")]
    InvalidKey,
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Issues and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    key: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Result<Self, TokenError> {
        let key =
            HmacSha256::new_from_slice(secret.as_ref()).map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { key, ttl })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        Self::new(config.jwt_secret.as_bytes(), config.token_ttl)
    }

    pub fn sign(
        &self,
        user_id: &UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = TokenClaims {
            sub: user_id.clone(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let mut mac = self.key.clone();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (signing_input, signature) =
            token.trim().rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, claims) = signing_input
            .split_once('.')
            .filter(|(_, claims)| !claims.contains('.'))
            .ok_or(TokenError::Malformed)?;

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.key.clone();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: TokenClaims = decode_segment(claims)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
