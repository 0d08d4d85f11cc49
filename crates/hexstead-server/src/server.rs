//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::service::{ChannelNotifier, GameService};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use hexstead_core::PlayerId;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All live matches
    pub service: GameService,
    /// Outbound fan-out to connections
    pub notifier: Arc<ChannelNotifier>,
    /// The match and seat each connection acts as
    pub attachments: DashMap<Uuid, (String, PlayerId)>,
}

impl ServerState {
    pub fn new() -> Self {
        let notifier = Arc::new(ChannelNotifier::new());
        Self {
            service: GameService::new(notifier.clone()),
            notifier,
            attachments: DashMap::new(),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hexstead server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a connection ID and register its outgoing channel
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.notifier.register_connection(connection_id, tx);

    // Send welcome message
    let welcome = ServerMessage::Welcome { connection_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text.into())).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                    handle_message(connection_id, client_msg, &state);
                } else {
                    warn!("Invalid message from {}: {}", connection_id, text);
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(data)) => {
                state
                    .notifier
                    .send_to(connection_id, ServerMessage::Pong);
                let _ = data;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    state.attachments.remove(&connection_id);
    state.notifier.remove_connection(connection_id);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateGame { player_names } => {
            match state.service.create_game(player_names, connection_id) {
                Ok(game_id) => {
                    state
                        .notifier
                        .send_to(connection_id, ServerMessage::GameCreated { game_id });
                }
                Err(e) => send_error(state, connection_id, e.to_string()),
            }
        }

        ClientMessage::JoinGame { game_id, player_id } => {
            match state.service.join_game(&game_id, player_id, connection_id) {
                Ok(()) => {
                    state
                        .attachments
                        .insert(connection_id, (game_id.clone(), player_id));
                    state
                        .notifier
                        .send_to(connection_id, ServerMessage::Joined { game_id, player_id });
                }
                Err(e) => send_error(state, connection_id, e.to_string()),
            }
        }

        ClientMessage::SubmitMove { game_move } => {
            let Some(attachment) = state.attachments.get(&connection_id) else {
                send_error(state, connection_id, "join a game first".to_string());
                return;
            };
            let (game_id, player_id) = attachment.value().clone();
            drop(attachment);

            if let Err(e) = state.service.submit_move(&game_id, game_move, player_id) {
                send_error(state, connection_id, e.to_string());
            }
        }

        ClientMessage::Ping => {
            state.notifier.send_to(connection_id, ServerMessage::Pong);
        }
    }
}

/// Report a failed request back to the requesting connection.
fn send_error(state: &Arc<ServerState>, connection_id: Uuid, message: String) {
    error!("Request from {} failed: {}", connection_id, message);
    state
        .notifier
        .send_to(connection_id, ServerMessage::Error { message });
}
