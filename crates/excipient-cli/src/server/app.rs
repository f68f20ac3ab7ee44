//! Axum application setup.

use axum::{Router, routing::get};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers;
use super::state::AppState;
use crate::web::static_handler;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/drug-autocomplete/", get(handlers::drug_autocomplete))
        .route("/drug-autocomplete", get(handlers::drug_autocomplete))
        .route("/search/", get(handlers::search_stream))
        .route("/search", get(handlers::search_stream))
        .route("/search/results/", get(handlers::search_results))
        .route("/search/results", get(handlers::search_results))
        .route(
            "/excipient-categories/",
            get(handlers::excipient_categories),
        )
        .route("/excipient-categories", get(handlers::excipient_categories));

    Router::new()
        .nest("/api", api_routes)
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server and run until Ctrl+C or SIGTERM.
pub async fn run_server(
    state: AppState,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let address = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

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
            Ok(mut sig) => {
                sig.recv().await;
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

    info!("Shutting down gracefully");
}
