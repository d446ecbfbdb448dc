use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};

use pharmacy_agent::api::RestApi;
use pharmacy_agent::config::{load_config, DEFAULT_CONFIG_FILE};
use pharmacy_agent::notify::Notifier;
use pharmacy_agent::storage::PatientStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = load_config(Path::new(DEFAULT_CONFIG_FILE))?;
    let addr = config.socket_addr()?;

    info!("Starting Pharmacy Voice Agent");
    info!(path = %config.storage.data_file.display(), "Data file");
    info!(path = %config.storage.notifications_file.display(), "Notifications file");

    let store = Arc::new(PatientStore::new(&config.storage.data_file));
    let notifier = Arc::new(Notifier::new(&config.storage.notifications_file));
    let api = RestApi::new(Arc::clone(&store), Arc::clone(&notifier));

    let port = config.server.port;
    info!("Health check: http://localhost:{}/health", port);
    info!("Patients endpoint: http://localhost:{}/patients", port);
    info!("Notifications endpoint: http://localhost:{}/notifications", port);

    // Create a channel for shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let (bound, server) = warp::serve(api.routes())
        .try_bind_with_graceful_shutdown(addr, async move {
            shutdown_rx.await.ok();
            info!("Shutting down server...");
        })?;
    info!(addr = %bound, "Ready to receive webhooks");

    let server_handle = tokio::spawn(server);

    // Wait for Ctrl+C
    signal::ctrl_c().await?;
    info!("Ctrl+C received, starting graceful shutdown");

    shutdown_tx.send(()).ok();

    if let Err(e) = server_handle.await {
        error!(error = %e, "Server task failed");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharmacy_agent=debug,warp=info"));

    let fmt_layer = fmt::layer().with_target(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
