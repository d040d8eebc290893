use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ridgeline::{http, AppConfig, AppState};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ridgeline::Error> {
    let config = AppConfig::load();
    info!(port = config.port, "initializing state");

    let state = AppState::new(config).await?;
    http::serve(state).await
}
