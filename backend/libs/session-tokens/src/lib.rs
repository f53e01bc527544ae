//! # Session Tokens
//!
//! Issuance and verification of RS256-signed session tokens.
//!
//! ## Modules
//! - `keys`: lazily loaded, process-scoped RSA key pair
//! - `codec`: compact JWT encode/decode with issuer, audience and time-window checks
//! - `service`: access/refresh token pairs and type-checked verification
//! - `duration`: `<integer><unit>` lifetime strings
//! - `claims`: identity, role and token type model
//!
//! ```no_run
//! use std::sync::Arc;
//! use session_tokens::{AuthConfig, Identity, KeyMaterialProvider, Role, TokenService};
//!
//! # fn run(config: AuthConfig) -> error_types::Result<()> {
//! let keys = Arc::new(KeyMaterialProvider::from_config(&config));
//! keys.preload()?;
//! let tokens = TokenService::new(&config, keys);
//!
//! let pair = tokens.issue_token_pair(&Identity {
//!     user_id: "user-1".into(),
//!     email: "tenant@example.com".into(),
//!     role: Role::Tenant,
//!     session_id: "session-1".into(),
//! })?;
//! let payload = tokens.verify_access_token(&pair.access_token)?;
//! assert_eq!(payload.role(), Role::Tenant);
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod codec;
pub mod config;
pub mod duration;
pub mod keys;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use claims::{Identity, Role, SessionClaims, TokenPayload, TokenType};
pub use codec::{TokenCodec, TokenRejection, JWT_ALGORITHM};
pub use config::AuthConfig;
pub use duration::{parse_lifetime_secs, DEFAULT_LIFETIME_SECS, MAX_LIFETIME_SECS};
pub use keys::KeyMaterialProvider;
pub use service::{TokenPair, TokenService};
