//! Process-scoped RSA key material
//!
//! The PEM text is handed over at startup; parsing happens at most once per key, on first
//! use or on `preload()`. `OnceCell` publishes the parsed key exactly once, so concurrent
//! first callers all observe the same instance. A parse failure is cached as well: the
//! key is never re-parsed and every caller gets the same `KeyMaterialInvalid`.
//!
//! There is no rotation; one active key pair per provider.

use error_types::AuthError;
use jsonwebtoken::{DecodingKey, EncodingKey};
use once_cell::sync::OnceCell;
use std::fmt;

use crate::config::AuthConfig;

pub struct KeyMaterialProvider {
    private_key_pem: String,
    public_key_pem: String,
    signing: OnceCell<Result<EncodingKey, AuthError>>,
    verification: OnceCell<Result<DecodingKey, AuthError>>,
}

impl KeyMaterialProvider {
    pub fn new(private_key_pem: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        Self {
            private_key_pem: private_key_pem.into(),
            public_key_pem: public_key_pem.into(),
            signing: OnceCell::new(),
            verification: OnceCell::new(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.private_key_pem.clone(), config.public_key_pem.clone())
    }

    /// Private key, used only for issuing
    pub fn signing_key(&self) -> Result<&EncodingKey, AuthError> {
        self.signing
            .get_or_init(|| {
                let pem = normalize_pem(&self.private_key_pem);
                let key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    tracing::error!(error = %e, "Failed to parse RSA private key");
                    AuthError::KeyMaterialInvalid(format!("RSA private key: {e}"))
                })?;
                tracing::info!("JWT signing key loaded");
                Ok(key)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Public key, used only for verifying signatures
    pub fn verification_key(&self) -> Result<&DecodingKey, AuthError> {
        self.verification
            .get_or_init(|| {
                let pem = normalize_pem(&self.public_key_pem);
                let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    tracing::error!(error = %e, "Failed to parse RSA public key");
                    AuthError::KeyMaterialInvalid(format!("RSA public key: {e}"))
                })?;
                tracing::info!("JWT verification key loaded");
                Ok(key)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Load both keys now so malformed key text fails at startup.
    pub fn preload(&self) -> Result<(), AuthError> {
        self.signing_key()?;
        self.verification_key()?;
        Ok(())
    }
}

impl fmt::Debug for KeyMaterialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterialProvider")
            .field("signing_loaded", &self.signing.get().is_some())
            .field("verification_loaded", &self.verification.get().is_some())
            .finish_non_exhaustive()
    }
}

/// PEM passed through env vars often arrives with literal `\n` escapes.
fn normalize_pem(pem: &str) -> String {
    pem.trim().replace("\\n", "\n")
}
