//! 토큰 명령어

use chrono::Duration;
use pmd_auth_core::{bootstrap, UserId};
use serde::Serialize;

use crate::output::OutputFormat;

#[derive(Serialize)]
struct IssuedToken<'a> {
    user_id: String,
    token: &'a str,
    valid_hours: i64,
}

pub async fn issue(format: OutputFormat, user: &str, hours: i64) -> anyhow::Result<()> {
    let user_id = UserId::parse(user)?;

    bootstrap::init_auth_lib().await;
    let engine = bootstrap::global().engine()?;

    let user = engine.resolve_user(&user_id).await?;
    let validity = Duration::try_hours(hours)
        .ok_or_else(|| anyhow::anyhow!("--hours out of range: {}", hours))?;
    let token = engine.generate_token(&user, validity)?;

    let issued = IssuedToken {
        user_id: user.id.to_hex(),
        token: &token,
        valid_hours: hours,
    };
    format.print(&issued, || token.clone())
}

pub async fn verify(format: OutputFormat, token: &str) -> anyhow::Result<()> {
    bootstrap::init_auth_lib().await;

    let user = bootstrap::validate_token(token).await?;
    format.print(&user, || {
        format!("{} <{}> (id: {}, status: {})", user.name, user.email, user.id, user.status)
    })
}
