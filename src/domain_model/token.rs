use crate::domain_model::{SessionId, TokenId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separates access tokens from refresh tokens signed with the same key.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Access,
    Refresh,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Access => "access",
            Audience::Refresh => "refresh",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub iss: String,
    pub sub: UserId,
    pub aud: Audience,
    pub exp: i64,
    pub iat: i64,
    pub jti: TokenId,
    #[serde(rename = "sessionid")]
    pub session_id: SessionId,
    pub role: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub issuer: String,
    pub subject: UserId,
    pub audience: Audience,
    pub role: Vec<String>,
    pub session_id: SessionId,
    pub lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub payload: TokenPayload,
    pub expires_at: DateTime<Utc>,
}
