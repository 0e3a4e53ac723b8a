//! pmd-auth CLI (`pmd-auth`)
//!
//! 토큰 발급/검증과 사용자 저장소 관리를 위한 운영 도구입니다.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "pmd-auth")]
#[command(author, version, about = "pmd-auth CLI - issue and verify bearer tokens", long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────
    /// Initialize the auth library and report its status
    Health,

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────
    /// Issue a token for an existing user
    Issue {
        /// User ID (24 hex characters)
        #[arg(long)]
        user: String,

        /// Validity in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },

    /// Validate a token and print the resolved user
    Verify {
        /// Token string
        token: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Store
    // ─────────────────────────────────────────────────────────────────────────
    /// Create the users table
    InitStore,

    /// Register a user
    AddUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        /// External login provider ID
        #[arg(long, default_value = "")]
        provider_id: String,

        /// Avatar URL
        #[arg(long, default_value = "")]
        picture: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화 (stdout은 명령 출력용이므로 stderr로)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pmd_auth=info,pmd_auth_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 명령 실행
    match cli.command {
        Commands::Health => commands::health::run(cli.format).await,

        Commands::Issue { user, hours } => commands::token::issue(cli.format, &user, hours).await,
        Commands::Verify { token } => commands::token::verify(cli.format, &token).await,

        Commands::InitStore => commands::store::init(cli.format).await,
        Commands::AddUser {
            email,
            name,
            provider_id,
            picture,
        } => commands::store::add_user(cli.format, &email, &name, &provider_id, &picture).await,
    }
}
