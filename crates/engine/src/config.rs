//! Configuration loading and validation for the encryption layer.
//!
//! All values are read from environment variables at startup. Absence or
//! malformation of the secret key is a fatal condition: the process must
//! refuse to start rather than run unable to encrypt or decrypt.

use common::FieldError;
use serde::Deserialize;

use crate::key::KeyMaterial;

/// Validated encryption layer configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded 32-byte secret key (`ENCRYPTION_SECRET`).
    /// **Required.**
    pub encryption_secret: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Configuration`] if `ENCRYPTION_SECRET` is
    /// absent, empty, or the environment cannot be deserialised.
    pub fn from_env() -> Result<Self, FieldError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .map_err(|e| {
                FieldError::Configuration(format!(
                    "failed to build configuration from environment: {e}"
                ))
            })?;

        let c: Config = cfg.try_deserialize().map_err(|e| {
            FieldError::Configuration(format!("failed to deserialise configuration: {e}"))
        })?;

        c.validate()?;
        Ok(c)
    }

    /// Decode the configured secret into usable key material.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Configuration`] if the secret is not valid
    /// base64 or decodes to the wrong length.
    pub fn key_material(&self) -> Result<KeyMaterial, FieldError> {
        KeyMaterial::from_base64(&self.encryption_secret)
    }

    fn validate(&self) -> Result<(), FieldError> {
        if self.encryption_secret.trim().is_empty() {
            return Err(FieldError::Configuration(
                "ENCRYPTION_SECRET is required and must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret must never reach logs, even via a stray debug print.
        f.debug_struct("Config")
            .field("encryption_secret", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn default_level_is_info() {
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let cfg = Config {
            encryption_secret: "   ".into(),
            log_level: default_log_level(),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn key_material_from_valid_secret() {
        let cfg = Config {
            encryption_secret: STANDARD.encode([3u8; 32]),
            log_level: default_log_level(),
        };
        let key = cfg.key_material().unwrap();
        assert_eq!(key.as_bytes(), &[3u8; 32]);
    }

    #[test]
    fn key_material_from_malformed_secret_fails() {
        let cfg = Config {
            encryption_secret: "not-base64!".into(),
            log_level: default_log_level(),
        };
        assert!(matches!(
            cfg.key_material().unwrap_err(),
            FieldError::Configuration(_)
        ));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let cfg = Config {
            encryption_secret: "c3VwZXItc2VjcmV0".into(),
            log_level: default_log_level(),
        };
        let printed = format!("{cfg:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("c3VwZXI"));
    }
}
