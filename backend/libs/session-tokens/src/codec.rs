//! Compact signed token codec
//!
//! Encodes `SessionClaims` plus the registered claims (`iss`, `aud`, `sub`, `iat`, `exp`)
//! as an RS256 JWT, and decodes tokens back after checking signature, issuer, audience
//! and the `[iat, exp]` window.
//!
//! ## Security Design
//!
//! - **RS256 ONLY**: tokens whose header names any other algorithm are rejected, which
//!   rules out HS256/RS256 confusion
//! - **Closed claim shape**: the `type` marker and role are enums; unknown or missing
//!   values fail decoding instead of being trusted as strings

use chrono::{DateTime, Utc};
use error_types::AuthError;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::claims::{Identity, Role, SessionClaims, TokenType};
use crate::keys::KeyMaterialProvider;

/// JWT algorithm - the only one accepted
pub const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Why a token was rejected. Diagnostic only; callers outside the token service see a
/// single invalid-token condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("signature invalid")]
    SignatureInvalid,

    #[error("token expired")]
    ClaimsExpired,

    #[error("token issued in the future")]
    IssuedInFuture,

    #[error("issuer or audience mismatch")]
    IssuerOrAudienceMismatch,

    #[error("expected {expected} token, got {actual}")]
    TypeMismatch {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("verification key unavailable: {0}")]
    KeyUnavailable(AuthError),
}

impl From<jsonwebtoken::errors::Error> for TokenRejection {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::Crypto(_) => TokenRejection::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenRejection::ClaimsExpired,
            ErrorKind::ImmatureSignature => TokenRejection::IssuedInFuture,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                TokenRejection::IssuerOrAudienceMismatch
            }
            _ => TokenRejection::Malformed(err.to_string()),
        }
    }
}

/// Payload as it travels on the wire
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    iss: String,
    aud: String,
    sub: String,
    iat: i64,
    exp: i64,
    user_id: String,
    email: String,
    role: Role,
    session_id: String,
    #[serde(rename = "type")]
    token_type: TokenType,
}

pub struct TokenCodec {
    keys: Arc<KeyMaterialProvider>,
    issuer: String,
    audience: String,
    leeway_secs: u64,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(
        keys: Arc<KeyMaterialProvider>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        leeway_secs: u64,
    ) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.leeway = leeway_secs;

        Self {
            keys,
            issuer,
            audience,
            leeway_secs,
            validation,
        }
    }

    /// Sign `claims` into a compact token valid from `issued_at` until `expires_at`.
    pub fn sign(
        &self,
        claims: &SessionClaims,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let key = self.keys.signing_key()?;
        let identity = &claims.identity;

        let wire = WireClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: identity.user_id.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            session_id: identity.session_id.clone(),
            token_type: claims.token_type,
        };

        encode(&Header::new(JWT_ALGORITHM), &wire, key).map_err(|e| {
            tracing::error!(error = %e, token_type = %claims.token_type, "JWT signing failed");
            AuthError::TokenIssuanceFailed(e.to_string())
        })
    }

    /// Decode and validate a token string (without the `Bearer ` prefix).
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        let key = self
            .keys
            .verification_key()
            .map_err(TokenRejection::KeyUnavailable)?;

        let wire = decode::<WireClaims>(token, key, &self.validation)?.claims;

        let now = Utc::now().timestamp();
        if wire.iat > now.saturating_add(self.leeway_secs as i64) {
            return Err(TokenRejection::IssuedInFuture);
        }
        if wire.sub != wire.user_id {
            return Err(TokenRejection::Malformed(
                "subject does not match userId".to_string(),
            ));
        }

        Ok(SessionClaims {
            identity: Identity {
                user_id: wire.user_id,
                email: wire.email,
                role: wire.role,
                session_id: wire.session_id,
            },
            token_type: wire.token_type,
        })
    }
}
