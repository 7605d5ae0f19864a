//! Game session server for one room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin boardwalk-server
//! cargo run --bin boardwalk-server -- --host 0.0.0.0 --port 3000 --code FRIDAY
//! ```

use std::sync::Arc;

use boardwalk_server::{
    common::logger::setup_logger,
    domain::{ContentStore, MessagePusher, PersistenceGateway},
    infrastructure::{
        persistence::{DisabledGateway, RestGateway},
        pusher::WebSocketMessagePusher,
    },
    ui::Server,
    usecase::bootstrap_session,
};
use clap::Parser;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "WebSocket session server for a Monopoly-style board game", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Join code of the room; generated when omitted
    #[arg(short = 'c', long)]
    code: Option<String>,

    /// Maximum number of players in the room (2..=6)
    #[arg(long, default_value = "6")]
    max_players: usize,

    /// Base URL of the persistence backend; persistence is disabled when
    /// omitted
    #[arg(long, env = "BOARDWALK_PERSISTENCE_URL")]
    persistence_url: Option<String>,

    /// API key for the persistence backend
    #[arg(long, env = "BOARDWALK_PERSISTENCE_KEY")]
    persistence_key: Option<String>,
}

/// Six uppercase hex characters, easy to read out loud.
fn generate_room_code() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_uppercase()
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let code = args.code.unwrap_or_else(generate_room_code);
    let max_players = args.max_players.clamp(2, 6);

    // Initialize dependencies in order:
    // 1. PersistenceGateway
    // 2. MessagePusher
    // 3. ContentStore
    // 4. GameSession
    // 5. Server
    let gateway: Arc<dyn PersistenceGateway> =
        match (args.persistence_url, args.persistence_key) {
            (Some(url), Some(key)) => {
                tracing::info!("persistence enabled against {}", url);
                Arc::new(RestGateway::new(url, key))
            }
            _ => {
                tracing::info!("persistence not configured; rejoin will be unavailable");
                Arc::new(DisabledGateway)
            }
        };
    let pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
    let content = Arc::new(ContentStore::bundled());

    let session = bootstrap_session(&code, max_players, gateway, pusher, content).await;
    tracing::info!("Room {} created!", code);

    let server = Server::new(Arc::new(session));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Failed to run server: {}", e);
        std::process::exit(1);
    }
}
