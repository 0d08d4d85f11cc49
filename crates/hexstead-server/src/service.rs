//! Match registry and broadcast fan-out.
//!
//! `GameService` is the inbound boundary of the rules engine: it owns
//! every live match, resolves match identifiers, parses raw move
//! payloads, and hands them to the controller. `ChannelNotifier` is the
//! outbound boundary: it fans controller broadcasts out to the match's
//! connections, fire-and-forget.

use dashmap::DashMap;
use hexstead_core::{GameController, GameError, GameMove, GameUpdate, PlayerId, ProgressNotifier};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::ServerMessage;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no such game: {0}")]
    NoSuchGame(String),

    #[error("no seat {0} in this game")]
    NoSuchSeat(u8),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Rule(#[from] GameError),
}

/// Delivers game updates to the connections attached to each match.
///
/// Delivery uses unbounded senders and ignores failures, so a slow or
/// dropped connection never blocks move execution.
#[derive(Default)]
pub struct ChannelNotifier {
    /// Outgoing message channel per connection
    senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Connections subscribed to each match
    members: DashMap<String, Vec<Uuid>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connection(&self, id: Uuid, sender: mpsc::UnboundedSender<ServerMessage>) {
        self.senders.insert(id, sender);
    }

    pub fn remove_connection(&self, id: Uuid) {
        self.senders.remove(&id);
        for mut members in self.members.iter_mut() {
            members.retain(|&connection| connection != id);
        }
    }

    /// Subscribe a connection to a match's broadcasts.
    pub fn subscribe(&self, game_id: &str, connection: Uuid) {
        let mut members = self.members.entry(game_id.to_string()).or_default();
        if !members.contains(&connection) {
            members.push(connection);
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, connection: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&connection) {
            let _ = sender.send(msg);
        }
    }
}

impl ProgressNotifier for ChannelNotifier {
    fn notify(&self, game_id: &str, update: GameUpdate) {
        let Some(members) = self.members.get(game_id) else {
            return;
        };
        for &connection in members.iter() {
            self.send_to(connection, ServerMessage::Update(update.clone()));
        }
    }
}

/// Registry of live matches.
pub struct GameService {
    games: DashMap<String, GameController>,
    notifier: Arc<ChannelNotifier>,
}

impl GameService {
    pub fn new(notifier: Arc<ChannelNotifier>) -> Self {
        Self {
            games: DashMap::new(),
            notifier,
        }
    }

    /// Create a match with a fixed, ordered player list.
    ///
    /// The creating connection is subscribed before the controller is
    /// built, so it receives the initial state and turn-order
    /// broadcasts.
    pub fn create_game(
        &self,
        player_names: Vec<String>,
        creator: Uuid,
    ) -> Result<String, ServiceError> {
        if player_names.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "player list cannot be empty".to_string(),
            ));
        }
        if player_names.iter().any(|name| name.trim().is_empty()) {
            return Err(ServiceError::InvalidRequest(
                "player name cannot be empty".to_string(),
            ));
        }

        let game_id = Uuid::new_v4().to_string();
        self.notifier.subscribe(&game_id, creator);
        let notifier: Arc<dyn ProgressNotifier> = self.notifier.clone();
        let controller = GameController::new(game_id.clone(), player_names, notifier);
        self.games.insert(game_id.clone(), controller);
        Ok(game_id)
    }

    /// Attach a connection to an existing match seat.
    pub fn join_game(
        &self,
        game_id: &str,
        player_id: PlayerId,
        connection: Uuid,
    ) -> Result<(), ServiceError> {
        let game = self
            .games
            .get(game_id)
            .ok_or_else(|| ServiceError::NoSuchGame(game_id.to_string()))?;
        if player_id as usize >= game.players().len() {
            return Err(ServiceError::NoSuchSeat(player_id));
        }
        drop(game);

        self.notifier.subscribe(game_id, connection);
        Ok(())
    }

    /// Parse and apply a move for a seat of a match.
    ///
    /// Success means the state mutated and broadcasts went out through
    /// the notifier; failure means nothing changed.
    pub fn submit_move(
        &self,
        game_id: &str,
        game_move: serde_json::Value,
        player_id: PlayerId,
    ) -> Result<(), ServiceError> {
        let mut game = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::NoSuchGame(game_id.to_string()))?;

        let game_move: GameMove = serde_json::from_value(game_move)
            .map_err(|e| GameError::UnsupportedMove(e.to_string()))?;

        game.make_move(game_move, player_id)?;
        Ok(())
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}
