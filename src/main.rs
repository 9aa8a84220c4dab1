use anyhow::Context;
use tracing_subscriber::EnvFilter;

use smart_deals_api::config::app_config::{AppConfig, ServiceAccount};
use smart_deals_api::config::mongo_config::setup_mongo;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let service_account = ServiceAccount::load(&config.service_account_path)
        .context("loading Firebase service account")?;
    tracing::info!(
        project = %service_account.project_id,
        client = %service_account.client_email,
        "Firebase credentials loaded"
    );

    let client = setup_mongo(&config.mongodb_url)
        .await
        .context("connecting to MongoDB")?;

    tracing::info!(port = config.port, policy = ?config.auth_policy, "Smart deals service listening");
    let _rocket = smart_deals_api::build_rocket(&config, &service_account, &client)
        .launch()
        .await?;

    Ok(())
}
