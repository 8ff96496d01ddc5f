//! Shared authentication types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gateway operating mode.
///
/// `Strict` enforces origin filtering and bearer-token verification on
/// every protected route. `Dev` waves everything through and exists only
/// for local development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    Strict,
    Dev,
}

impl SecurityMode {
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl Default for SecurityMode {
    fn default() -> Self {
        Self::Strict
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Dev => write!(f, "dev"),
        }
    }
}

impl FromStr for SecurityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "dev" => Ok(Self::Dev),
            other => Err(format!("unknown security mode: {}", other)),
        }
    }
}

/// Identity extracted from a successfully verified bearer token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    /// Agent id (the `sub` claim)
    pub agent_id: String,
    /// Role carried by the token
    pub role: String,
    /// Unique token id consumed (or checked) during verification
    pub jti: String,
    /// Expiry as a unix timestamp in seconds
    pub expires_at: i64,
}

/// A freshly issued bearer token plus the metadata the client needs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until expiry
    pub expires_in: u64,
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("strict".parse::<SecurityMode>(), Ok(SecurityMode::Strict));
        assert_eq!(" DEV ".parse::<SecurityMode>(), Ok(SecurityMode::Dev));
        assert!("prod".parse::<SecurityMode>().is_err());
    }

    #[test]
    fn test_mode_default_is_strict() {
        assert_eq!(SecurityMode::default(), SecurityMode::Strict);
        assert!(!SecurityMode::default().is_dev());
    }

    #[test]
    fn test_mode_display_round_trip() {
        assert_eq!(SecurityMode::Dev.to_string(), "dev");
        assert_eq!(SecurityMode::Strict.to_string(), "strict");
    }
}
