//! Application startup and lifecycle management.

use crate::config::BiztimeConfig;
use crate::handlers::{self, companies, invoices};
use crate::services::{
    init_metrics, CompanyRepository, CompanyStore, Database, HealthCheck, InvoiceAggregator,
    InvoiceRepository, InvoiceStore,
};
use axum::{middleware, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
};
use service_core::observability::init_http_metrics;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Stores are trait objects so the router can run
/// against any backend.
#[derive(Clone)]
pub struct AppState {
    pub service_name: Arc<str>,
    pub companies: Arc<dyn CompanyStore>,
    pub invoices: Arc<dyn InvoiceStore>,
    pub aggregator: InvoiceAggregator,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    pub fn new(
        service_name: &str,
        companies: Arc<dyn CompanyStore>,
        invoices: Arc<dyn InvoiceStore>,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        let aggregator = InvoiceAggregator::new(companies.clone(), invoices.clone());
        Self {
            service_name: Arc::from(service_name),
            companies,
            invoices,
            aggregator,
            health,
        }
    }
}

/// All routes with the shared middleware stack applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/companies/:code",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::delete_company),
        )
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    db: Database,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: BiztimeConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    /// Use this in tests when migrations are already applied by the test harness.
    pub async fn build_without_migrations(config: BiztimeConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: BiztimeConfig, run_migrations: bool) -> Result<Self, AppError> {
        init_metrics();
        if let Err(e) = init_http_metrics() {
            tracing::warn!(error = %e, "HTTP metrics recorder unavailable");
        }

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let companies: Arc<dyn CompanyStore> =
            Arc::new(CompanyRepository::new(db.pool().clone()));
        let invoices: Arc<dyn InvoiceStore> = Arc::new(InvoiceRepository::new(db.pool().clone()));
        let state = AppState::new(
            &config.service_name,
            companies,
            invoices,
            Arc::new(db.clone()),
        );

        // Port 0 picks a free port, which the tests rely on.
        let http_addr = config.common.socket_addr();
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "Biztime service listener bound");

        Ok(Self {
            http_port,
            http_listener,
            db,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then let in-flight requests finish.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state);

        tracing::info!(
            service = "biztime-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            "Service ready to accept connections"
        );

        axum::serve(self.http_listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
