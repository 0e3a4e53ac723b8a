//! 상태 확인 명령어

use pmd_auth_core::bootstrap;

use crate::output::OutputFormat;

pub async fn run(format: OutputFormat) -> anyhow::Result<()> {
    bootstrap::init_auth_lib().await;

    let status = bootstrap::global().status();
    format.print(&status, || match &status {
        pmd_auth_core::HealthStatus::Healthy => "healthy".to_string(),
        pmd_auth_core::HealthStatus::Uninitialized => "uninitialized".to_string(),
        pmd_auth_core::HealthStatus::Failed { code, message } => format!("failed [{}]: {}", code, message),
    })?;

    bootstrap::health_check()?;
    Ok(())
}
