//! Configuration management
//!
//! Sources, later ones overriding earlier:
//! 1. Built-in defaults
//! 2. `config/auth-gateway.{toml,yaml,json}` (optional)
//! 3. Environment variables prefixed `AUTH_GATEWAY`, `__` between levels,
//!    e.g. `AUTH_GATEWAY__AUTH__PRIVATE_KEY_PEM`
//!
//! A `.env` file is loaded into the environment first when present.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use session_tokens::AuthConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(File::with_name("config/auth-gateway").required(false))
            .add_source(Environment::with_prefix("AUTH_GATEWAY").separator("__"));

        Self::from_builder(builder)
    }

    /// Apply defaults on top of the given sources and deserialize.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults_and_file_values() {
        let builder = config::Config::builder().add_source(File::from_str(
            r#"
            [auth]
            private_key_pem = "priv"
            public_key_pem = "pub"
            issuer = "rentals-api"
            audience = "rentals-web"
            access_token_ttl = "5m"
            "#,
            FileFormat::Toml,
        ));

        let settings = Settings::from_builder(builder).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.workers, None);
        assert_eq!(settings.auth.issuer, "rentals-api");
        assert_eq!(settings.auth.access_token_ttl, "5m");
        assert_eq!(settings.auth.refresh_token_ttl, "7d");
    }

    #[test]
    fn test_missing_auth_section_fails() {
        let builder = config::Config::builder().add_source(File::from_str(
            "[server]\nport = 9000\n",
            FileFormat::Toml,
        ));

        assert!(Settings::from_builder(builder).is_err());
    }
}
