//! Agent credential store
//!
//! A static map of agent id to shared secret and role, parsed once at
//! startup from `AGENT_API_KEYS` and immutable afterwards. Secret
//! comparison is constant-time.

use crate::error::{AuthError, AuthResult};
use std::collections::HashMap;
use subtle::ConstantTimeEq;

/// Default role assigned when an `AGENT_API_KEYS` entry has no third field
pub const DEFAULT_ROLE: &str = "agent";

/// A single registered agent credential
#[derive(Debug, Clone)]
pub struct Credential {
    pub agent_id: String,
    secret: String,
    pub role: String,
}

/// Immutable credential registry
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: HashMap<String, Credential>,
}

impl CredentialStore {
    /// Parse `agentId:secret[:role]` comma-separated entries.
    ///
    /// Malformed entries (fewer than two fields, or an empty id/secret)
    /// are skipped with a warning rather than failing startup.
    pub fn parse(raw: &str) -> Self {
        let mut credentials = HashMap::new();
        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let mut parts = entry.splitn(3, ':');
            let agent_id = parts.next().unwrap_or("").trim();
            let secret = parts.next().unwrap_or("").trim();
            let role = parts.next().map(str::trim).unwrap_or(DEFAULT_ROLE);
            if agent_id.is_empty() || secret.is_empty() {
                tracing::warn!(entry, "skipping malformed AGENT_API_KEYS entry");
                continue;
            }
            credentials.insert(
                agent_id.to_string(),
                Credential {
                    agent_id: agent_id.to_string(),
                    secret: secret.to_string(),
                    role: if role.is_empty() {
                        DEFAULT_ROLE.to_string()
                    } else {
                        role.to_string()
                    },
                },
            );
        }
        Self { credentials }
    }

    /// Load from the `AGENT_API_KEYS` environment variable
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("AGENT_API_KEYS").unwrap_or_default())
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Verify a presented secret against the stored one.
    ///
    /// Unknown agent and secret mismatch are indistinguishable to the
    /// caller. The comparison itself runs in constant time for
    /// equal-length secrets.
    pub fn verify(&self, agent_id: &str, presented: &str) -> AuthResult<&Credential> {
        let credential = self
            .credentials
            .get(agent_id)
            .ok_or(AuthError::InvalidAgentKey)?;
        let stored = credential.secret.as_bytes();
        let given = presented.as_bytes();
        if stored.len() != given.len() {
            return Err(AuthError::InvalidAgentKey);
        }
        if stored.ct_eq(given).into() {
            Ok(credential)
        } else {
            Err(AuthError::InvalidAgentKey)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_and_three_field_entries() {
        let store = CredentialStore::parse("alpha:s3cret,beta:hunter2:admin");
        assert_eq!(store.len(), 2);
        let alpha = store.verify("alpha", "s3cret").unwrap();
        assert_eq!(alpha.role, DEFAULT_ROLE);
        let beta = store.verify("beta", "hunter2").unwrap();
        assert_eq!(beta.role, "admin");
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let store = CredentialStore::parse("lonefield,:nosecret,ok:yes,, :");
        assert_eq!(store.len(), 1);
        assert!(store.verify("ok", "yes").is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let store = CredentialStore::parse("alpha:correct");
        assert!(matches!(
            store.verify("alpha", "incorrect"),
            Err(AuthError::InvalidAgentKey)
        ));
    }

    #[test]
    fn test_verify_rejects_unknown_agent() {
        let store = CredentialStore::parse("alpha:correct");
        assert!(matches!(
            store.verify("ghost", "correct"),
            Err(AuthError::InvalidAgentKey)
        ));
    }

    #[test]
    fn test_empty_env_yields_empty_store() {
        let store = CredentialStore::parse("");
        assert!(store.is_empty());
    }
}
