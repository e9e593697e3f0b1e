use crate::application_port::SessionError;
use crate::domain_model::*;
use crate::domain_port::TokenCodec;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// HMAC-SHA-512 block size.
pub const SIGNING_KEY_LEN: usize = 64;

#[derive(Clone)]
pub struct JwtConfig {
    pub signing_key: Vec<u8>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("signing_key", &format_args!("<{} bytes>", self.signing_key.len()))
            .finish()
    }
}

impl JwtConfig {
    /// Read the raw HMAC key written by the `keygen` binary.
    pub fn load_signing_key(path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        let key = std::fs::read(path).map_err(|e| {
            anyhow!(
                "signing key not readable at {:?} ({}), generate one with `keygen`",
                path,
                e
            )
        })?;
        if key.is_empty() {
            return Err(anyhow!(
                "signing key at {:?} is empty, generate one with `keygen`",
                path
            ));
        }
        Ok(key)
    }

    /// Write a fresh random key to `path`. Never overwrites an existing file.
    pub fn generate_key_file(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut key = [0u8; SIGNING_KEY_LEN];
        rand::rng().fill_bytes(&mut key);

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| anyhow!("cannot create key file {:?}: {}", path, e))?;
        file.write_all(&key)?;
        file.sync_all()?;
        Ok(())
    }

    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(JwtConfig {
            signing_key: Self::load_signing_key(path)?,
        })
    }
}

/// HMAC-SHA-512 token codec. The key is fixed for the life of the value.
pub struct JwtHs512Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtHs512Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs512Codec {
            encoding_key: EncodingKey::from_secret(&cfg.signing_key),
            decoding_key: DecodingKey::from_secret(&cfg.signing_key),
        }
    }

    fn sign(&self, payload: &TokenPayload) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS512), payload, &self.encoding_key)
            .map_err(|e| SessionError::InternalError(e.to_string()))
    }

    fn validation(audience: Audience) -> Validation {
        let mut v = Validation::new(Algorithm::HS512);
        v.validate_exp = true;
        v.leeway = 0;
        v.set_audience(&[audience.as_str()]);
        v.set_required_spec_claims(&["exp", "sub", "aud"]);
        v
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs512Codec {
    async fn issue(&self, claims: TokenClaims) -> Result<IssuedToken, SessionError> {
        let iat_dt = Utc::now();
        let iat = iat_dt.timestamp();
        let exp = iat + claims.lifetime_secs as i64;
        let payload = TokenPayload {
            iss: claims.issuer,
            sub: claims.subject,
            aud: claims.audience,
            exp,
            iat,
            jti: TokenId::new(),
            session_id: claims.session_id,
            role: claims.role,
        };
        let token = self.sign(&payload)?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| SessionError::InternalError(format!("expiry out of range: {exp}")))?;
        Ok(IssuedToken {
            token,
            payload,
            expires_at,
        })
    }

    async fn verify(&self, token: &str, audience: Audience) -> Result<TokenPayload, SessionError> {
        let data = decode::<TokenPayload>(token, &self.decoding_key, &Self::validation(audience))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::TokenInvalid,
            })?;
        let payload = data.claims;
        if payload.aud != audience || payload.sub.as_str().is_empty() {
            return Err(SessionError::TokenInvalid);
        }
        Ok(payload)
    }
}
