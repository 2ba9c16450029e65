//! API server entry point.

use std::sync::Arc;
use std::time::Duration;

use api::config::Config;
use auth::TokenService;
use axum::Router;
use orders::{InMemoryOrderRepository, OrderOrchestrator};
use services::{HttpCartService, HttpIdentityService, HttpInventoryService};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(app: Router, addr: String) {
    tracing::info!(%addr, "starting API server");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build application state for the configured deployment
    let config = Config::from_env();
    let app = match config.remote_services() {
        Some((product_url, cart_url, identity_url)) => {
            let timeout = Duration::from_secs(config.upstream_timeout_secs);
            let inventory = HttpInventoryService::new(product_url, timeout)
                .expect("failed to build product service client");
            let carts = HttpCartService::new(cart_url, timeout)
                .expect("failed to build cart service client");
            let identity = HttpIdentityService::new(identity_url, timeout)
                .expect("failed to build identity service client");

            let tokens = Arc::new(TokenService::new(
                &config.jwt_secret,
                config.access_ttl_secs,
                config.refresh_ttl_secs,
            ));
            let orchestrator =
                OrderOrchestrator::new(carts, identity, inventory, InMemoryOrderRepository::new())
                    .with_rollback_on_failure(config.rollback_on_failure);

            let state = Arc::new(api::AppState {
                orchestrator,
                tokens,
                directory: None,
            });
            tracing::info!(%product_url, %cart_url, %identity_url, "running against remote collaborators");
            api::create_app(state, metrics_handle)
        }
        None => {
            let (state, services) = api::create_default_state(&config);
            api::seed_demo_data(&services);
            tracing::info!("running with in-process collaborators");
            api::create_app(state, metrics_handle)
        }
    };

    // 4. Start server
    serve(app, config.addr()).await;
}
