//! Biztime Service entry point.

use biztime_service::config::BiztimeConfig;
use biztime_service::startup::Application;
use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = BiztimeConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = %config.service_version,
        otlp_endpoint = ?config.otlp_endpoint,
        "Starting biztime-service"
    );

    // Log configuration (mask sensitive values)
    tracing::info!(
        service_name = %config.service_name,
        http_addr = %config.common.socket_addr(),
        db_max_connections = %config.database.max_connections,
        db_min_connections = %config.database.min_connections,
        "Configuration loaded"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    app.run_with_shutdown(shutdown_signal()).await.map_err(|e| {
        tracing::error!(error = %e, "Application error");
        e
    })?;

    tracing::info!("Service shutdown complete");
    Ok(())
}
