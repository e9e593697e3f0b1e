use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::KeySpace;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

/// Session service wired from settings. The signing key is read once here,
/// before any request is served.
pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    /// Set when the identity backend is `memory`, so callers can seed users.
    pub memory_identities: Option<MemoryIdentityRepo>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let jwt_config = JwtConfig::from_key_file(&settings.session.key_path)?;
        info!(?jwt_config, key_path = %settings.session.key_path, "signing key loaded");
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs512Codec::new(jwt_config));

        let store: Arc<dyn KvStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryKvStore::new()),
            "redis" => {
                let url = settings
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.redis_url is required for redis"))?;
                Arc::new(RedisKvStore::connect(url).await?)
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let mut memory_identities = None;
        let identity_repo: Arc<dyn IdentityRepo> = match settings.identity.backend.as_str() {
            "memory" => {
                let repo = MemoryIdentityRepo::new();
                memory_identities = Some(repo.clone());
                Arc::new(repo)
            }
            "mysql" => {
                let url = settings
                    .identity
                    .mysql_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("identity.mysql_url is required for mysql"))?;
                Arc::new(MySqlIdentityRepo::connect(url).await?)
            }
            other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
        };

        let session_config = SessionConfig {
            access_ttl: Duration::from_secs(settings.session.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.session.refresh_ttl_secs),
            default_issuer: settings.session.issuer.clone(),
            refresh_issuer: settings.session.refresh_issuer.clone(),
        };
        debug!(?session_config);

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            token_codec,
            store,
            identity_repo,
            KeySpace::new(settings.session.key_prefix.clone()),
            session_config,
        ));

        Ok(Server {
            session_service,
            memory_identities,
        })
    }
}
