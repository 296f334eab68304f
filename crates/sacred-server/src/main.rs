//! `SacredSecret` server entry point.
//!
//! Builds the registrar from configuration, then starts the Axum HTTP server
//! with graceful shutdown on SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use sacred_core::{MemoryRegistrar, Registrar};
use sacred_server::config::{RegistrarKind, ServerConfig};
use sacred_server::routes;
use sacred_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env().context("invalid configuration")?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(registrar = ?config.registrar, "SacredSecret sign-up server starting");

    let registrar = build_registrar(&config.registrar)?;
    let state = Arc::new(AppState::new(registrar));
    let app = build_router(state, config.allowed_origin.as_deref())?;

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "SacredSecret server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("SacredSecret server stopped");
    Ok(())
}

/// Construct the configured registrar.
fn build_registrar(kind: &RegistrarKind) -> anyhow::Result<Arc<dyn Registrar>> {
    match kind {
        RegistrarKind::Memory => {
            info!("using in-memory registrar (accounts will not persist)");
            Ok(Arc::new(MemoryRegistrar::new()))
        }
        #[cfg(feature = "upstream")]
        RegistrarKind::Upstream { url } => {
            info!(url = %url, "forwarding registrations upstream");
            let registrar = sacred_server::upstream::UpstreamRegistrar::new(url.as_str())
                .context("failed to build upstream registrar")?;
            Ok(Arc::new(registrar))
        }
        #[cfg(not(feature = "upstream"))]
        RegistrarKind::Upstream { .. } => {
            anyhow::bail!("upstream registrar requested but feature 'upstream' is not enabled");
        }
    }
}

/// Build the Axum router with all routes and middleware.
fn build_router(state: Arc<AppState>, allowed_origin: Option<&str>) -> anyhow::Result<Router> {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid SACRED_ALLOWED_ORIGIN '{origin}'"))?,
        ),
        None => AllowOrigin::from(Any),
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // Caps in-flight `/v1/signup` requests, per-keystroke `validate` calls
    // included, so a burst cannot flood the engine or the registrar.
    let signup_routes = Router::new()
        .nest("/v1/signup", routes::signup::router())
        .layer(tower::limit::ConcurrencyLimitLayer::new(64));

    Ok(Router::new()
        .merge(signup_routes)
        .nest("/v1/sys", routes::sys::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
