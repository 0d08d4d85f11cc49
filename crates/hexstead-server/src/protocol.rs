//! WebSocket protocol messages for Hexstead multiplayer.

use hexstead_core::GameUpdate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a match with a fixed, ordered player list
    CreateGame { player_names: Vec<String> },

    /// Attach this connection to a match as one of its seats
    JoinGame { game_id: String, player_id: u8 },

    /// Submit a move for the attached seat.
    ///
    /// Kept as raw JSON so unrecognized move shapes reach the game
    /// service and come back as a proper rule violation.
    SubmitMove { game_move: serde_json::Value },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the assigned connection ID
    Welcome { connection_id: Uuid },

    /// Match created; the creator is already subscribed to its updates
    GameCreated { game_id: String },

    /// Attached to a match seat
    Joined { game_id: String, player_id: u8 },

    /// A broadcast from the rules engine
    Update(GameUpdate),

    /// A request failed
    Error { message: String },

    /// Pong response
    Pong,
}
