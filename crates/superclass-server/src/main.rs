//! superclass-server - REST API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use superclass_classifiers::{ClassifierFactory, DEFAULT_TIMEOUT};
use superclass_core::{ClassificationPipeline, Settings};
use superclass_extractors::ExtractorRegistry;
use superclass_server::{create_server, AppState, ServerConfig};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,superclass=debug";

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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
}

/// `RUST_LOG` wins, then `LOG_LEVEL`, then the default filter.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            std::env::var("LOG_LEVEL")
                .map_err(|e| e.to_string())
                .and_then(|level| EnvFilter::try_new(level).map_err(|e| e.to_string()))
        })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(env_filter());

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let settings = Settings::from_env()?;

    info!(
        upload_dir = %config.upload_dir.display(),
        provider = %settings.provider,
        model = %settings.model.model,
        has_api_key = settings.model.has_api_key(),
        max_cost = config.max_cost,
        max_latency_secs = config.max_latency_secs,
        "Server configuration loaded"
    );

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let registry = Arc::new(ExtractorRegistry::with_defaults()?);
    let backends = Arc::new(ClassifierFactory::new(DEFAULT_TIMEOUT)?);
    let pipeline = ClassificationPipeline::new(registry, backends);
    info!(formats = ?pipeline.supported_formats(), "Extractors registered");

    let addr: SocketAddr = config.addr().parse()?;
    let app = create_server(AppState::new(pipeline, settings, config));

    info!("Starting superclass-server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
