//! Token issuance and verification
//!
//! HS256-signed bearer tokens with issuer and expiry validation. Every
//! token carries a unique `jti`; the replay guard decides whether a jti
//! may be consumed, this module only decides whether the token itself is
//! genuine.

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{IssuedToken, VerifiedIdentity};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims stamped into every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the agent id
    pub sub: String,
    /// Role the agent authenticated with
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Unique token id; absent or empty means the token is unusable
    #[serde(default)]
    pub jti: String,
}

/// Signs and verifies bearer tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    /// Issue a token for an already-authenticated agent
    pub fn issue(&self, agent_id: &str, role: &str) -> AuthResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();
        let claims = TokenClaims {
            sub: agent_id.to_string(),
            role: role.to_string(),
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + self.config.ttl_seconds as i64,
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_in: self.config.ttl_seconds,
            jti,
        })
    }

    /// Verify signature, issuer and expiry, and require a jti.
    ///
    /// This is the cryptographic half of verification; it never touches
    /// the replay guard.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        if data.claims.jti.trim().is_empty() {
            return Err(AuthError::MissingJti);
        }
        Ok(data.claims)
    }

    /// Decode and package the claims as a [`VerifiedIdentity`]
    pub fn verify_identity(&self, token: &str) -> AuthResult<VerifiedIdentity> {
        let claims = self.decode(token)?;
        Ok(VerifiedIdentity {
            agent_id: claims.sub,
            role: claims.role,
            jti: claims.jti,
            expires_at: claims.exp,
        })
    }

    /// Token lifetime in seconds
    pub fn ttl_seconds(&self) -> u64 {
        self.config.ttl_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            issuer: "strandgate".to_string(),
            ttl_seconds: 3600,
        })
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service();
        let issued = svc.issue("agent-1", "agent").unwrap();
        assert_eq!(issued.expires_in, 3600);

        let identity = svc.verify_identity(&issued.token).unwrap();
        assert_eq!(identity.agent_id, "agent-1");
        assert_eq!(identity.role, "agent");
        assert_eq!(identity.jti, issued.jti);
    }

    #[test]
    fn test_each_issue_gets_fresh_jti() {
        let svc = service();
        let a = svc.issue("agent-1", "agent").unwrap();
        let b = svc.issue("agent-1", "agent").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = service();
        assert!(matches!(
            svc.decode("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issuer_a = service();
        let issuer_b = TokenService::new(JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            issuer: "somewhere-else".to_string(),
            ttl_seconds: 3600,
        });
        let issued = issuer_b.issue("agent-1", "agent").unwrap();
        assert!(matches!(
            issuer_a.decode(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let other = TokenService::new(JwtConfig {
            secret: "a-different-secret-also-long-enough-here".to_string(),
            issuer: "strandgate".to_string(),
            ttl_seconds: 3600,
        });
        let issued = other.issue("agent-1", "agent").unwrap();
        assert!(matches!(
            svc.decode(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // jsonwebtoken applies default leeway; back-date past it.
        let svc = TokenService::new(JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            issuer: "strandgate".to_string(),
            ttl_seconds: 3600,
        });
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "agent-1".to_string(),
            role: "agent".to_string(),
            iss: "strandgate".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-that-is-long-enough-for-hs256".as_bytes()),
        )
        .unwrap();
        assert!(matches!(svc.decode(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_token_without_jti_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        // Serialize claims without a jti field at all.
        #[derive(Serialize)]
        struct BareClaims<'a> {
            sub: &'a str,
            role: &'a str,
            iss: &'a str,
            iat: i64,
            exp: i64,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &BareClaims {
                sub: "agent-1",
                role: "agent",
                iss: "strandgate",
                iat: now,
                exp: now + 3600,
            },
            &EncodingKey::from_secret("test-secret-that-is-long-enough-for-hs256".as_bytes()),
        )
        .unwrap();
        assert!(matches!(svc.decode(&token), Err(AuthError::MissingJti)));
    }
}
