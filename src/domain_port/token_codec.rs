use crate::application_port::SessionError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    /// Sign a fresh token with a new `jti`, issued now and expiring after
    /// `claims.lifetime_secs`.
    async fn issue(&self, claims: TokenClaims) -> Result<IssuedToken, SessionError>;
    /// Check signature, expiry and audience. Expiry with a valid signature
    /// yields `TokenExpired`; every other failure yields `TokenInvalid`.
    async fn verify(&self, token: &str, audience: Audience) -> Result<TokenPayload, SessionError>;
}
