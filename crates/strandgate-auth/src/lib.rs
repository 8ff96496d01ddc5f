//! StrandGate authentication
//!
//! Agent credential verification, HS256 bearer-token issuance, and
//! single-use token enforcement via a jti replay guard.

pub mod config;
pub mod credentials;
pub mod error;
pub mod replay;
pub mod token;
pub mod types;

pub use config::JwtConfig;
pub use credentials::{Credential, CredentialStore, DEFAULT_ROLE};
pub use error::{AuthError, AuthResult};
pub use replay::{ReplayGuard, DEFAULT_SWEEP_INTERVAL};
pub use token::{TokenClaims, TokenService};
pub use types::{IssuedToken, SecurityMode, VerifiedIdentity};

/// Complete authentication service wiring credentials, tokens and the
/// replay guard together
pub struct AuthService {
    credentials: CredentialStore,
    tokens: TokenService,
    replay: ReplayGuard,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, jwt_config: JwtConfig) -> Self {
        Self {
            credentials,
            tokens: TokenService::new(jwt_config),
            replay: ReplayGuard::new(),
        }
    }

    /// Exchange agent credentials for a bearer token.
    ///
    /// The role defaults to the one registered with the credential; a
    /// requested role overrides it only for that token.
    pub fn issue_token(
        &self,
        agent_id: &str,
        api_key: &str,
        requested_role: Option<&str>,
    ) -> AuthResult<IssuedToken> {
        if agent_id.trim().is_empty() || api_key.is_empty() {
            return Err(AuthError::InvalidAgentKey);
        }
        let credential = self.credentials.verify(agent_id, api_key)?;
        let role = requested_role
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(&credential.role);
        self.tokens.issue(agent_id, role)
    }

    /// Verify a bearer token for a protected HTTP request, consuming its
    /// jti. A second presentation of the same token fails with
    /// `replay_detected`.
    pub async fn verify_bearer(&self, token: &str) -> AuthResult<VerifiedIdentity> {
        let identity = self.tokens.verify_identity(token)?;
        self.replay.consume(&identity.jti, identity.expires_at).await?;
        Ok(identity)
    }

    /// Verify a token at the websocket handshake.
    ///
    /// Runs the same cryptographic checks as [`verify_bearer`] but does
    /// not consume the jti, so the token a client just obtained can open
    /// its socket and still make one authenticated HTTP call.
    pub fn verify_handshake(&self, token: &str) -> AuthResult<VerifiedIdentity> {
        self.tokens.verify_identity(token)
    }

    /// The replay guard, for background sweeping
    pub fn replay_guard(&self) -> ReplayGuard {
        self.replay.clone()
    }

    pub fn token_ttl_seconds(&self) -> u64 {
        self.tokens.ttl_seconds()
    }
}
