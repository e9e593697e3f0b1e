//! Writes a new HMAC-SHA-512 signing key.
//!
//! $ cargo run --bin keygen -- auth.key

use sessionkeep::application_impl::JwtConfig;
use sessionkeep::logger::*;
use sessionkeep::settings::*;

fn main() -> anyhow::Result<()> {
    let _logger = Logger::new_bootstrap();
    let cli = KeygenCli::parse();

    if std::path::Path::new(&cli.target).exists() {
        error!(target_path = %cli.target, "key already exists, pick another target to generate a new key");
        std::process::exit(1);
    }

    JwtConfig::generate_key_file(&cli.target)?;
    info!(target_path = %cli.target, "signing key written");
    Ok(())
}
