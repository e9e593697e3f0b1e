use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Issuer used when `create_session` is given none.
    pub default_issuer: String,
    /// Issuer stamped on pairs minted by rotation.
    pub refresh_issuer: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            access_ttl: Duration::from_secs(60 * 60),
            refresh_ttl: Duration::from_secs(60 * 60 * 24 * 30),
            default_issuer: "iss-undefined".to_string(),
            refresh_issuer: "website".to_string(),
        }
    }
}

/// Session state machine over a token codec, a key-value store and the
/// identity store.
///
/// A live session is four records: the user's membership set, the session
/// pointer, and one pointer per live token. A token verifies only while its
/// pointer exists, so deleting pointers revokes tokens whose signatures are
/// still good.
pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    store: Arc<dyn KvStore>,
    identity_repo: Arc<dyn IdentityRepo>,
    keys: KeySpace,
    cfg: SessionConfig,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        store: Arc<dyn KvStore>,
        identity_repo: Arc<dyn IdentityRepo>,
        keys: KeySpace,
        cfg: SessionConfig,
    ) -> Self {
        Self {
            token_codec,
            store,
            identity_repo,
            keys,
            cfg,
        }
    }

    async fn save_session_record(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        access: &TokenPayload,
        refresh: &TokenPayload,
    ) -> Result<(), SessionError> {
        let sid = session_id.to_string();
        let session_key = self.keys.session(user_id, session_id);
        let access_key = self.keys.access_token(user_id, &access.jti);
        let refresh_key = self.keys.refresh_token(user_id, &refresh.jti);

        let pointer = [
            (FIELD_USER_ID, user_id.as_str()),
            (FIELD_SESSION_ID, sid.as_str()),
        ];
        self.store.hash_set(&refresh_key, &pointer).await?;
        self.store.expire(&refresh_key, self.cfg.refresh_ttl).await?;

        self.store.hash_set(&access_key, &pointer).await?;
        self.store.expire(&access_key, self.cfg.access_ttl).await?;

        self.store
            .hash_set(
                &session_key,
                &[
                    (FIELD_REFRESH_TOKEN, refresh_key.as_str()),
                    (FIELD_ACCESS_TOKEN, access_key.as_str()),
                    (FIELD_USER_ID, user_id.as_str()),
                ],
            )
            .await?;
        self.store.expire(&session_key, self.cfg.refresh_ttl).await?;

        // Membership last: a listed session always has its pointer.
        self.store
            .set_add(&self.keys.user_sessions(user_id), &sid)
            .await?;

        debug!(%user_id, session_id = %sid, "session record written");
        Ok(())
    }

    /// Signature check, then pointer lookup, then identity lookup.
    async fn verify(
        &self,
        token: &str,
        audience: Audience,
    ) -> Result<(TokenPayload, VerifiedSession), SessionError> {
        let payload = self.token_codec.verify(token, audience).await?;

        let pointer_key = self.keys.token(audience, &payload.sub, &payload.jti);
        let stored = self
            .store
            .hash_get(&pointer_key, FIELD_SESSION_ID)
            .await?
            .ok_or(SessionError::SessionNotFound)?;
        if stored.parse::<SessionId>().ok() != Some(payload.session_id) {
            warn!(
                user_id = %payload.sub,
                session_id = %payload.session_id,
                "token pointer names a different session"
            );
            return Err(SessionError::SessionNotFound);
        }

        let identity = self
            .identity_repo
            .lookup_identity(UniqueColumn::Id, payload.sub.as_str())
            .await?
            .ok_or(SessionError::UserNotFound)?;

        let session_id = payload.session_id;
        Ok((
            payload,
            VerifiedSession {
                identity,
                session_id,
            },
        ))
    }

    /// Delete whatever token pointers the session pointer currently names.
    async fn clear_token_pointers(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<(), SessionError> {
        let session = self
            .store
            .hash_get_all(&self.keys.session(user_id, session_id))
            .await?;
        for field in [FIELD_ACCESS_TOKEN, FIELD_REFRESH_TOKEN] {
            if let Some(key) = session.get(field) {
                self.store.delete(key).await?;
            }
        }
        Ok(())
    }

    async fn clear_session(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<(), SessionError> {
        self.store
            .delete(&self.keys.session(user_id, session_id))
            .await?;
        self.store
            .set_remove(&self.keys.user_sessions(user_id), &session_id.to_string())
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn create_session(
        &self,
        input: CreateSessionInput,
    ) -> Result<SessionTokens, SessionError> {
        let CreateSessionInput {
            user_id,
            role,
            issuer,
            session_id,
        } = input;
        let session_id = session_id.unwrap_or_else(SessionId::new);
        let issuer = issuer.unwrap_or_else(|| self.cfg.default_issuer.clone());

        let access_token = self
            .token_codec
            .issue(TokenClaims {
                issuer: issuer.clone(),
                subject: user_id.clone(),
                audience: Audience::Access,
                role: role.clone(),
                session_id,
                lifetime_secs: self.cfg.access_ttl.as_secs(),
            })
            .await?;
        let refresh_token = self
            .token_codec
            .issue(TokenClaims {
                issuer,
                subject: user_id.clone(),
                audience: Audience::Refresh,
                role,
                session_id,
                lifetime_secs: self.cfg.refresh_ttl.as_secs(),
            })
            .await?;

        self.save_session_record(
            &user_id,
            &session_id,
            &access_token.payload,
            &refresh_token.payload,
        )
        .await?;

        info!(%user_id, %session_id, "session created");
        Ok(SessionTokens {
            session_id,
            access_token,
            refresh_token,
        })
    }

    async fn verify_access_token(&self, token: &str) -> Result<VerifiedSession, SessionError> {
        let (_, verified) = self.verify(token, Audience::Access).await?;
        Ok(verified)
    }

    async fn verify_refresh_token(&self, token: &str) -> Result<VerifiedSession, SessionError> {
        let (_, verified) = self.verify(token, Audience::Refresh).await?;
        Ok(verified)
    }

    async fn authorize(
        &self,
        token: &str,
        roles: &[&str],
    ) -> Result<VerifiedSession, SessionError> {
        let verified = self.verify_access_token(token).await?;
        if !roles.is_empty() && !verified.identity.has_any_role(roles) {
            return Err(SessionError::Forbidden);
        }
        Ok(verified)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionTokens, SessionError> {
        let (payload, verified) = self.verify(refresh_token, Audience::Refresh).await?;
        let user_id = payload.sub;
        let session_id = verified.session_id;

        // Only the caller whose delete removes the pointer may rotate.
        let refresh_key = self.keys.refresh_token(&user_id, &payload.jti);
        let claimed = self.store.delete(&refresh_key).await?;
        if !claimed {
            warn!(%user_id, %session_id, "refresh token rotated by a concurrent request");
            return Err(SessionError::SessionNotFound);
        }
        // A logout may have cleared the session after the claim.
        let current = self
            .store
            .hash_get(&self.keys.session(&user_id, &session_id), FIELD_REFRESH_TOKEN)
            .await?;
        if current.as_deref() != Some(refresh_key.as_str()) {
            warn!(%user_id, %session_id, "session ended during rotation");
            return Err(SessionError::SessionNotFound);
        }
        self.clear_token_pointers(&user_id, &session_id).await?;

        let tokens = self
            .create_session(CreateSessionInput {
                user_id: verified.identity.id,
                role: verified.identity.role,
                issuer: Some(self.cfg.refresh_issuer.clone()),
                session_id: Some(session_id),
            })
            .await?;

        info!(%user_id, %session_id, "session rotated");
        Ok(tokens)
    }

    async fn logout(&self, access_token: &str) -> Result<(), SessionError> {
        let (payload, verified) = self.verify(access_token, Audience::Access).await?;
        let user_id = payload.sub;
        let session_id = verified.session_id;

        let claimed = self
            .store
            .delete(&self.keys.access_token(&user_id, &payload.jti))
            .await?;
        if !claimed {
            return Err(SessionError::SessionNotFound);
        }
        self.clear_token_pointers(&user_id, &session_id).await?;
        self.clear_session(&user_id, &session_id).await?;

        info!(%user_id, %session_id, "session logged out");
        Ok(())
    }

    async fn list_sessions(&self, user_id: &UserId) -> Result<Vec<SessionId>, SessionError> {
        let members_key = self.keys.user_sessions(user_id);
        let members = self.store.set_members(&members_key).await?;

        let mut live = Vec::with_capacity(members.len());
        for member in members {
            let Ok(session_id) = member.parse::<SessionId>() else {
                warn!(%user_id, session_id = %member, "dropping unparseable session id");
                self.store.set_remove(&members_key, &member).await?;
                continue;
            };
            let session_key = self.keys.session(user_id, &session_id);
            if self.store.hash_get(&session_key, FIELD_USER_ID).await?.is_some() {
                live.push(session_id);
                continue;
            }
            warn!(%user_id, %session_id, "pruning expired session");
            self.store.set_remove(&members_key, &member).await?;
            // A rotation may have rewritten the pointer since the read above.
            if self.store.hash_get(&session_key, FIELD_USER_ID).await?.is_some() {
                self.store.set_add(&members_key, &member).await?;
                live.push(session_id);
            }
        }
        live.sort();
        Ok(live)
    }
}
