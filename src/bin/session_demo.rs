//! Walks one session through create, verify, rotate and logout against the
//! backends named in the settings file. Needs a key from `keygen` first.
//!
//! $ cargo run --bin session_demo -- --settings=settings/dev.toml

use sessionkeep::application_port::*;
use sessionkeep::domain_model::*;
use sessionkeep::logger::*;
use sessionkeep::server::*;
use sessionkeep::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let server = Server::try_new(&project_settings).await?;
    let sessions = server.session_service.clone();

    let user_id = UserId::from("f3f4d3c2-4d5d-4c6e-9f3e-8c7a6b5a4d1e");
    if let Some(identities) = &server.memory_identities {
        identities.insert(
            Identity {
                id: user_id.clone(),
                role: vec!["user".to_string()],
            },
            Some("demo@example.com".to_string()),
        );
    }

    let tokens = sessions
        .create_session(CreateSessionInput {
            user_id: user_id.clone(),
            role: vec!["user".to_string()],
            issuer: Some("demo".to_string()),
            session_id: None,
        })
        .await?;
    info!(session_id = %tokens.session_id, "created");
    let response = serde_json::to_string(&TokenResponse::from(&tokens))?;
    debug!(%response, "bearer response");

    let verified = sessions
        .verify_access_token(&tokens.access_token.token)
        .await?;
    info!(identity = ?verified.identity, "access token verified");

    let rotated = sessions
        .refresh_session(&tokens.refresh_token.token)
        .await?;
    info!(session_id = %rotated.session_id, "rotated");

    match sessions.verify_access_token(&tokens.access_token.token).await {
        Err(e) => info!(error = %e, "old access token rejected"),
        Ok(_) => warn!("old access token still verifies"),
    }

    let live = sessions.list_sessions(&user_id).await?;
    info!(?live, "sessions before logout");
    sessions.logout(&rotated.access_token.token).await?;
    let live = sessions.list_sessions(&user_id).await?;
    info!(?live, "sessions after logout");

    match sessions.logout(&rotated.access_token.token).await {
        Err(e) => info!(error = %e, "second logout rejected"),
        Ok(_) => warn!("second logout succeeded"),
    }

    Ok(())
}
