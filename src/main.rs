use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use storeit_core::{CoreConfig, FileService};

/// Main entry point for the StoreIt server
///
/// Loads configuration from the environment, opens the local document store, bucket and
/// identity file, then serves the REST API until Ctrl-C.
///
/// # Environment Variables
/// - `STOREIT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `STOREIT_DATA_DIR` and the other `STOREIT_*` variables read by [`CoreConfig::from_env`]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storeit_run=info".parse()?)
                .add_directive("storeit_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("STOREIT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_env()?);
    tracing::info!(data_dir = %cfg.data_dir().display(), "++ Opening StoreIt data");
    let files = FileService::local(cfg)?;

    let app = api_rest::router(AppState { files });

    tracing::info!("++ Starting StoreIt REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("StoreIt REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
