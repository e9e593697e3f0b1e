//! Store key names for a session record.
//!
//! Every call site (creation, lookup, rotation, logout) builds keys through
//! this type so the same identifiers always land on the same store entries.

use crate::domain_model::{Audience, SessionId, TokenId, UserId};

pub const FIELD_ACCESS_TOKEN: &str = "access-token";
pub const FIELD_REFRESH_TOKEN: &str = "refresh-token";
pub const FIELD_USER_ID: &str = "user-id";
pub const FIELD_SESSION_ID: &str = "session-id";

#[derive(Debug, Clone, Default)]
pub struct KeySpace {
    prefix: Option<String>,
}

impl KeySpace {
    pub fn new(prefix: Option<String>) -> Self {
        let prefix = prefix.filter(|p| !p.is_empty());
        KeySpace { prefix }
    }

    fn user_root(&self, user_id: &UserId) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:user:{}", prefix, user_id),
            None => format!("user:{}", user_id),
        }
    }

    /// Set of live session ids for a user.
    pub fn user_sessions(&self, user_id: &UserId) -> String {
        format!("{}:sessions", self.user_root(user_id))
    }

    /// Hash pointing at the session's current token pointers.
    pub fn session(&self, user_id: &UserId, session_id: &SessionId) -> String {
        format!("{}:session:{}", self.user_root(user_id), session_id)
    }

    pub fn access_token(&self, user_id: &UserId, token_id: &TokenId) -> String {
        format!("{}:access-token:{}", self.user_root(user_id), token_id)
    }

    pub fn refresh_token(&self, user_id: &UserId, token_id: &TokenId) -> String {
        format!("{}:refresh-token:{}", self.user_root(user_id), token_id)
    }

    pub fn token(&self, audience: Audience, user_id: &UserId, token_id: &TokenId) -> String {
        match audience {
            Audience::Access => self.access_token(user_id, token_id),
            Audience::Refresh => self.refresh_token(user_id, token_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_without_prefix() {
        let keys = KeySpace::new(None);
        let user = UserId::from("U1");
        let sid: SessionId = "6f1c2f0e-3d7b-4d8a-9a52-1f4e5d6c7b8a".parse().unwrap();
        let jti: TokenId = "0b9e7c1a-2f3d-4e5f-8a9b-0c1d2e3f4a5b".parse().unwrap();

        assert_eq!(keys.user_sessions(&user), "user:U1:sessions");
        assert_eq!(
            keys.session(&user, &sid),
            "user:U1:session:6f1c2f0e-3d7b-4d8a-9a52-1f4e5d6c7b8a"
        );
        assert_eq!(
            keys.access_token(&user, &jti),
            "user:U1:access-token:0b9e7c1a-2f3d-4e5f-8a9b-0c1d2e3f4a5b"
        );
        assert_eq!(
            keys.refresh_token(&user, &jti),
            "user:U1:refresh-token:0b9e7c1a-2f3d-4e5f-8a9b-0c1d2e3f4a5b"
        );
    }

    #[test]
    fn test_keys_with_prefix() {
        let keys = KeySpace::new(Some("auth".to_string()));
        let user = UserId::from("U1");
        assert_eq!(keys.user_sessions(&user), "auth:user:U1:sessions");
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let keys = KeySpace::new(Some(String::new()));
        assert_eq!(keys.user_sessions(&UserId::from("U1")), "user:U1:sessions");
    }

    #[test]
    fn test_token_key_follows_audience() {
        let keys = KeySpace::new(None);
        let user = UserId::from("U1");
        let jti = TokenId::new();
        assert_eq!(
            keys.token(Audience::Access, &user, &jti),
            keys.access_token(&user, &jti)
        );
        assert_eq!(
            keys.token(Audience::Refresh, &user, &jti),
            keys.refresh_token(&user, &jti)
        );
        assert_ne!(
            keys.access_token(&user, &jti),
            keys.refresh_token(&user, &jti)
        );
    }
}
