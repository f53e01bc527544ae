//! Token issuance and type-checked verification
//!
//! Access and refresh tokens share one claim shape and are told apart only by the signed
//! `type` marker. Every verification path checks that marker; a refresh token presented
//! as an access token (or the reverse) is rejected even though its signature, issuer,
//! audience and expiry are all valid.

use chrono::{DateTime, Duration, Utc};
use error_types::AuthError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::claims::{Identity, SessionClaims, TokenPayload, TokenType};
use crate::codec::{TokenCodec, TokenRejection};
use crate::config::AuthConfig;
use crate::duration::parse_lifetime_secs;
use crate::keys::KeyMaterialProvider;

/// Result of one login or refresh event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub struct TokenService {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig, keys: Arc<KeyMaterialProvider>) -> Self {
        let codec = TokenCodec::new(
            keys,
            config.issuer.clone(),
            config.audience.clone(),
            config.leeway_secs,
        );
        let access_ttl = Duration::seconds(parse_lifetime_secs(&config.access_token_ttl));
        let refresh_ttl = Duration::seconds(parse_lifetime_secs(&config.refresh_token_ttl));

        tracing::info!(
            issuer = %config.issuer,
            audience = %config.audience,
            access_ttl_secs = access_ttl.num_seconds(),
            refresh_ttl_secs = refresh_ttl.num_seconds(),
            "Token service configured"
        );

        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a fresh access/refresh pair for `identity`.
    ///
    /// Fails only when the signing key is unusable (`KeyMaterialInvalid`) or signing
    /// itself fails (`TokenIssuanceFailed`).
    pub fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_token_expires_at = now
            .checked_add_signed(self.access_ttl)
            .ok_or_else(|| AuthError::TokenIssuanceFailed("access expiry overflow".into()))?;
        let refresh_token_expires_at = now
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AuthError::TokenIssuanceFailed("refresh expiry overflow".into()))?;

        let access_token = self.codec.sign(
            &SessionClaims::access(identity.clone()),
            now,
            access_token_expires_at,
        )?;
        let refresh_token = self.codec.sign(
            &SessionClaims::refresh(identity.clone()),
            now,
            refresh_token_expires_at,
        )?;

        tracing::debug!(
            user_id = %identity.user_id,
            session_id = %identity.session_id,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expires_at,
            refresh_token_expires_at,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenPayload, AuthError> {
        self.verify_as(token, TokenType::Access)
            .map_err(|rejection| reject(rejection, AuthError::AccessTokenInvalid))
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenPayload, AuthError> {
        self.verify_as(token, TokenType::Refresh)
            .map_err(|rejection| reject(rejection, AuthError::RefreshTokenInvalid))
    }

    /// Exchange a valid refresh token for a new pair with the same identity.
    ///
    /// The presented refresh token stays valid until it expires; there is no revocation
    /// store behind this service.
    pub fn refresh_token_pair(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let payload = self.verify_refresh_token(refresh_token)?;
        self.issue_token_pair(payload.identity())
    }

    fn verify_as(&self, token: &str, expected: TokenType) -> Result<TokenPayload, TokenRejection> {
        let claims = self.codec.verify(token)?;

        match (expected, claims.token_type) {
            (TokenType::Access, TokenType::Access) | (TokenType::Refresh, TokenType::Refresh) => {
                Ok(TokenPayload::verified(claims.identity))
            }
            (TokenType::Access, TokenType::Refresh) => {
                tracing::warn!(
                    user_id = %claims.identity.user_id,
                    session_id = %claims.identity.session_id,
                    "Refresh token presented as access token"
                );
                Err(TokenRejection::TypeMismatch {
                    expected,
                    actual: claims.token_type,
                })
            }
            (TokenType::Refresh, TokenType::Access) => Err(TokenRejection::TypeMismatch {
                expected,
                actual: claims.token_type,
            }),
        }
    }
}

/// Collapse a rejection into the caller-facing condition, keeping key failures distinct.
fn reject(rejection: TokenRejection, invalid: AuthError) -> AuthError {
    match rejection {
        TokenRejection::KeyUnavailable(err) => err,
        other => {
            tracing::debug!(reason = %other, "Token verification failed");
            invalid
        }
    }
}
