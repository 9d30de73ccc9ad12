use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pr_review_app::config::{AppConfig, LogFormat};
use pr_review_app::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "pr-review-app", version, about = "AI review of GitHub pull requests")]
struct Cli {
    /// Optional config file (TOML, YAML or JSON); environment variables take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(config.log_format);
    info!("Starting PR review app");

    let state = AppState::from_config(&config).context("Failed to initialize services")?;
    info!(
        review_enabled = config.review_enabled(),
        review_mode = ?config.review_mode,
        "Services initialized"
    );

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server_host))?;
    info!("Server listening on {}", addr);
    info!("Webhook URL: http://{}/webhook", addr);
    info!("Review API: http://{}/api/review", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pr_review_app=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
