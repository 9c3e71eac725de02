//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{debug_room_presence, get_message_history, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Bind address of the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Community messaging server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state);
/// server.run(ServerConfig::default()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/communities", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/messages", get(get_message_history))
            .route("/debug/rooms/{room_id}", get(debug_room_presence))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `config` and serve until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Server listening on {}", listener.local_addr()?);
        tracing::info!(
            "Connect to: ws://{}/ws/communities?communityId=<id>",
            bind_addr
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Once `shutdown` resolves every live connection is closed through the
    /// room registry.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let registry = self.state.registry.clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let closed = registry.close_all();
                tracing::info!("Closed {} live connection(s)", closed);
            })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
