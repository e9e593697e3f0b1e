use crate::domain_model::*;
use crate::domain_port::{IdentityError, StoreError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("session not found")]
    SessionNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(e) => SessionError::StoreUnavailable(e),
        }
    }
}

impl From<IdentityError> for SessionError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::Backend(e) => SessionError::InternalError(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    pub user_id: UserId,
    pub role: Vec<String>,
    pub issuer: Option<String>,
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub session_id: SessionId,
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}

#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub identity: Identity,
    pub session_id: SessionId,
}

/// Shape returned to clients after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry, epoch milliseconds.
    pub expired_at: i64,
    pub token_type: &'static str,
}

impl From<&SessionTokens> for TokenResponse {
    fn from(tokens: &SessionTokens) -> Self {
        TokenResponse {
            access_token: tokens.access_token.token.clone(),
            refresh_token: tokens.refresh_token.token.clone(),
            expired_at: tokens.access_token.payload.exp * 1000,
            token_type: "Bearer",
        }
    }
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn create_session(&self, input: CreateSessionInput)
    -> Result<SessionTokens, SessionError>;
    async fn verify_access_token(&self, token: &str) -> Result<VerifiedSession, SessionError>;
    async fn verify_refresh_token(&self, token: &str) -> Result<VerifiedSession, SessionError>;
    /// Verify an access token and require one of `roles` on the stored
    /// identity. An empty `roles` only requires a live session.
    async fn authorize(&self, token: &str, roles: &[&str])
    -> Result<VerifiedSession, SessionError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionTokens, SessionError>;
    async fn logout(&self, access_token: &str) -> Result<(), SessionError>;
    async fn list_sessions(&self, user_id: &UserId) -> Result<Vec<SessionId>, SessionError>;
}
