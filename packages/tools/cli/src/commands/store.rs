//! 사용자 저장소 명령어

use pmd_auth_core::store::PgUserStore;
use pmd_auth_core::{AuthConfig, User};
use serde_json::json;

use crate::output::OutputFormat;

async fn open_store() -> anyhow::Result<PgUserStore> {
    let config = AuthConfig::from_env()?;
    tracing::debug!(config = ?config, "opening identity store");

    let store = PgUserStore::connect(&config.store_uri, &config.store_database, config.connect_timeout).await?;
    Ok(store)
}

pub async fn init(format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store().await?;
    store.ensure_schema().await?;

    format.print(&json!({ "status": "ok" }), || "users table ready".to_string())
}

pub async fn add_user(
    format: OutputFormat,
    email: &str,
    name: &str,
    provider_id: &str,
    picture: &str,
) -> anyhow::Result<()> {
    let store = open_store().await?;

    let user = User::new(provider_id, email, name).with_picture(picture);
    store.insert(&user).await?;
    tracing::info!(user_id = %user.id, "user registered");

    format.print(&user, || user.id.to_hex())
}
