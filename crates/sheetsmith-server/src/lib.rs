pub mod api;
pub mod config;
pub mod error;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use sheetsmith_ai::{CellMapClient, FillOrchestrator};
use sheetsmith_core::EditorSession;

use crate::config::Config;
use crate::store::SessionStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub fill: Arc<FillOrchestrator>,
    pub grid_rows: usize,
    pub grid_cols: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = CellMapClient::new(config.cellmap_backend_url.clone())?;
        let fill = FillOrchestrator::new(client, config.ai_default_model.clone())
            .with_settle(config.ai_settle);

        Ok(Self {
            sessions: Arc::new(SessionStore::new()),
            fill: Arc::new(fill),
            grid_rows: config.grid_rows,
            grid_cols: config.grid_cols,
        })
    }

    /// A blank session at the configured size
    pub fn new_session(&self) -> EditorSession {
        EditorSession::new(self.grid_rows, self.grid_cols)
    }
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the server with the given configuration
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        backend = %config.cellmap_backend_url,
        "Server listening on {}",
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
