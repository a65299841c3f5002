mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use skland_api::metrics::unix_now;
use tracing::info;

use skland_sync::app::{self, AccountFactory};
use skland_sync::config::{AppConfig, LogConfig};
use skland_sync::credentials::JsonCredentialStore;
use skland_sync::logging::init_logging;
use skland_sync::projection::AccountData;

use crate::cli::{Cli, Command};

fn load_config(explicit: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    let path = AppConfig::resolve_path(explicit);
    AppConfig::load(&path).with_context(|| format!("loading {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let config = load_config(cli.config.as_deref())?;
            let (logging, _guard) = init_logging(&config.log)?;
            info!(version = env!("CARGO_PKG_VERSION"), "skland-sync starting");
            app::run_service(config, Some(Arc::new(logging))).await?;
        }

        Command::Login { token, credentials } => {
            let (_logging, _guard) = init_logging(&LogConfig::default())?;
            let credentials = match credentials {
                Some(path) => path,
                None => AppConfig::credentials_path_at(&AppConfig::resolve_path(
                    cli.config.as_deref(),
                ))?,
            };
            info!(path = %credentials.display(), "Storing session");
            let store = JsonCredentialStore::new(credentials);
            let bindings = app::login(&token, &store).await?;
            if bindings.is_empty() {
                anyhow::bail!("no Arknights character is bound to this account");
            }
            println!("{}", app::render_account_entries(&token, &bindings)?);
        }

        Command::Sign { uid } => {
            let config = load_config(cli.config.as_deref())?;
            let (_logging, _guard) = init_logging(&config.log)?;
            let factory = AccountFactory::new(config)?;

            for coordinator in app::select_accounts(&factory, uid.as_deref()).await? {
                let result = coordinator.sign_in().await;
                let awards: Vec<String> = result
                    .awards
                    .iter()
                    .map(|a| format!("{}x{}", a.name, a.count))
                    .collect();
                println!(
                    "{} ({}): {} {}",
                    coordinator.account().nickname,
                    coordinator.uid(),
                    result.message,
                    awards.join(", ")
                );
            }
        }

        Command::Status { uid } => {
            let config = load_config(cli.config.as_deref())?;
            let (_logging, _guard) = init_logging(&config.log)?;
            let factory = AccountFactory::new(config)?;

            let now = unix_now();
            let accounts: Vec<_> = app::poll_once(&factory, uid.as_deref())
                .await?
                .iter()
                .map(|c| {
                    json!({
                        "uid": c.uid(),
                        "status": c.status(),
                        "data": c.snapshot().map(|s| AccountData::project(&s, now)),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
    }

    Ok(())
}
