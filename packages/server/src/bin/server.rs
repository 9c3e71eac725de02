//! Community messaging server.
//!
//! Run with:
//! ```not_rust
//! TSUDOI_TOKEN_SECRET=change-me cargo run --bin tsudoi-server
//! cargo run --bin tsudoi-server -- --host 0.0.0.0 --port 3000 --token-secret change-me
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tsudoi_server::{
    domain::grouping_window,
    infrastructure::{
        identity::TokenIdentityProvider, message_pusher::WebSocketBroadcaster,
        registry::InMemoryRoomRegistry, repository::SqliteStore,
    },
    ui::{AppState, ConnectionSettings, Server, ServerConfig},
    usecase::{
        AuthorizeConnectionUseCase, ConnectParticipantUseCase, DEFAULT_PAGE_SIZE,
        DisconnectParticipantUseCase, GetMessageHistoryUseCase, SendMessageUseCase,
    },
};
use tsudoi_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "tsudoi-server")]
#[command(about = "Real-time community messaging server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TSUDOI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TSUDOI_PORT", default_value = "8080")]
    port: u16,

    /// SQLite database URL
    #[arg(long, env = "TSUDOI_DATABASE_URL", default_value = "sqlite://tsudoi.db")]
    database_url: String,

    /// Secret used to verify bearer tokens (HS256)
    #[arg(long, env = "TSUDOI_TOKEN_SECRET", hide_env_values = true)]
    token_secret: String,

    /// Messages per history page
    #[arg(long, env = "TSUDOI_HISTORY_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    history_page_size: usize,

    /// Frames that may wait for a slow client before it is dropped
    #[arg(long, env = "TSUDOI_OUTBOUND_BUFFER", default_value = "64")]
    outbound_buffer: usize,

    /// Seconds a single socket write may take before the client is dropped
    #[arg(long, env = "TSUDOI_WRITE_TIMEOUT_SECS", default_value = "10")]
    write_timeout_secs: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "TSUDOI_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Clock and storage
    // 2. Identity provider
    // 3. Room registry and broadcaster
    // 4. UseCases
    // 5. AppState and server

    // 1. Clock and storage (SQLite)
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = match SqliteStore::connect(&args.database_url, clock.clone()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.migrate().await {
        tracing::error!("Failed to migrate database: {}", e);
        std::process::exit(1);
    }

    // 2. Identity provider (HS256 bearer tokens, users from the store)
    let identity_provider = Arc::new(TokenIdentityProvider::new(
        store.clone(),
        args.token_secret.into_bytes(),
        clock.clone(),
    ));

    // 3. Room registry and broadcaster
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let broadcaster = Arc::new(WebSocketBroadcaster::new(registry.clone()));

    // 4. UseCases
    let connection = ConnectionSettings {
        outbound_buffer: args.outbound_buffer,
        write_timeout: Duration::from_secs(args.write_timeout_secs),
    };
    let authorize_connection_usecase =
        Arc::new(AuthorizeConnectionUseCase::new(identity_provider));
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        registry.clone(),
        connection.outbound_buffer,
    ));
    let disconnect_participant_usecase =
        Arc::new(DisconnectParticipantUseCase::new(registry.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(store.clone(), broadcaster));
    let get_message_history_usecase = Arc::new(GetMessageHistoryUseCase::new(
        store,
        clock,
        args.history_page_size,
        grouping_window(),
    ));

    // 5. Create and run the server
    let server = Server::new(AppState {
        authorize_connection_usecase,
        connect_participant_usecase,
        disconnect_participant_usecase,
        send_message_usecase,
        get_message_history_usecase,
        registry,
        connection,
    });
    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    if let Err(e) = server.run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
