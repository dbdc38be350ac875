use std::path::PathBuf;
use std::sync::Arc;

use hamming_core::{Config, Session};
use hamming_web::{AppState, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var_os("HAMMING_CONFIG").map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let addr = std::env::var("HAMMING_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());

    let session = Arc::new(Session::from_config(&config)?);
    let app = router(AppState { session });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, max_file_bytes = config.max_file_bytes, level = %config.level, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
