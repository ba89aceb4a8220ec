use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daylog::{config::AppConfig, create_app, AppState, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing()?;

    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    let logger = Arc::new(
        Logger::new(&config.logging).context("failed to initialise application logger")?,
    );
    info!(path = %logger.path().display(), "Application logger ready");

    let app = create_app(AppState {
        logger: logger.clone(),
    });

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    logger.close();
    served?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

// Diagnostics go to stderr so stdout carries only application log lines.
fn init_tracing() -> Result<()> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let subscriber = tracing_subscriber::registry();

    match log_format.as_str() {
        "json" => {
            subscriber
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
        _ => {
            subscriber
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
    }

    Ok(())
}
