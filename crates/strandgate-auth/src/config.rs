//! Authentication configuration

use crate::error::{AuthError, AuthResult};
use crate::types::SecurityMode;
use serde::Deserialize;

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    pub secret: String,
    /// Issuer claim stamped into and required from every token
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Token lifetime in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_issuer() -> String {
    "strandgate".to_string()
}

fn default_ttl_seconds() -> u64 {
    3600
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_issuer(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl JwtConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| default_issuer()),
            ttl_seconds: std::env::var("TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_ttl_seconds),
        }
    }

    /// Validate the configuration for the given operating mode.
    ///
    /// A missing or trivially short secret is refused in strict mode; in
    /// dev mode a throwaway secret is generated so local runs work out of
    /// the box.
    pub fn validate(&mut self, mode: SecurityMode) -> AuthResult<()> {
        if self.secret.len() < 32 {
            if mode.is_dev() {
                tracing::warn!(
                    "JWT_SECRET missing or too short; generating an ephemeral dev secret"
                );
                self.secret = generate_dev_secret();
            } else {
                return Err(AuthError::Config(
                    "JWT_SECRET must be at least 32 bytes in strict mode".to_string(),
                ));
            }
        }
        if self.issuer.trim().is_empty() {
            return Err(AuthError::Config("JWT_ISSUER must not be empty".to_string()));
        }
        if self.ttl_seconds == 0 {
            return Err(AuthError::Config(
                "TOKEN_TTL_SECONDS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn generate_dev_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_mode_refuses_short_secret() {
        let mut config = JwtConfig {
            secret: "short".to_string(),
            ..Default::default()
        };
        assert!(config.validate(SecurityMode::Strict).is_err());
    }

    #[test]
    fn test_dev_mode_generates_secret() {
        let mut config = JwtConfig::default();
        config.validate(SecurityMode::Dev).unwrap();
        assert!(config.secret.len() >= 32);
    }

    #[test]
    fn test_strict_mode_accepts_long_secret() {
        let mut config = JwtConfig {
            secret: "a".repeat(48),
            ..Default::default()
        };
        assert!(config.validate(SecurityMode::Strict).is_ok());
        assert_eq!(config.issuer, "strandgate");
        assert_eq!(config.ttl_seconds, 3600);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = JwtConfig {
            secret: "a".repeat(48),
            ttl_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate(SecurityMode::Strict).is_err());
    }
}
