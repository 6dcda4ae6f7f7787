use clap::Parser as _;
use promptgate::{AppState, build_router, config::Config};
use tokio::net::TcpListener;
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
pub async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let config = Config::parse().validate()?;
    info!(
        port = config.port,
        upstream = ?config.upstream(),
        "Starting chat gateway"
    );

    let app_state = AppState::new(&config);
    let router = build_router(app_state);

    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Chat gateway listening on {}", bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
