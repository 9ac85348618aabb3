use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use feedback_backend_lib::{
    config::Settings,
    router,
    storage::FlatFileStorage,
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "feedback-backend", about = "Feedback board web service")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize configuration
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load().or_else(|_| Settings::load_from("config/default.toml"))?,
    };
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Create storage
    let storage = FlatFileStorage::new(&settings.data_dir)?;

    // Create application state and the router
    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(storage, settings));
    let app = router::create_router(state);

    // Start the server
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
