use super::handlers;
use crate::config::RelayConfig;
use crate::domain::policy::ImportSettings;
use crate::domain::ports::CrmApi;
use crate::utils::error::Result;
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Immutable state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub import_api_key: Option<String>,
    /// `None` until the CRM base URL and token are both configured.
    pub crm: Option<Arc<dyn CrmApi>>,
    pub settings: Arc<ImportSettings>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        import_api_key: Option<String>,
        crm: Option<Arc<dyn CrmApi>>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            import_api_key,
            crm,
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let crm = config
            .crm
            .client()?
            .map(|client| Arc::new(client) as Arc<dyn CrmApi>);
        Ok(Self::new(
            config.import_api_key.clone(),
            crm,
            config.import.clone(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::get_health))
        .route("/leads", post(handlers::post_leads))
        .layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("lead-relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("lead-relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {}", e);
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
                tracing::warn!("failed to listen for SIGTERM: {}", e);
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
    tracing::info!("shutdown signal received");
}
