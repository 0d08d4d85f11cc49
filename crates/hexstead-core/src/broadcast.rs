//! Broadcast payloads and the progress-notifier capability.
//!
//! After every successful mutation the controller assembles one of the
//! update payloads below and pushes it through a [`ProgressNotifier`].
//! Delivery is fire-and-forget: the notifier's return is ignored and the
//! game-state mutation never waits on it.

use crate::board::{Hexagon, PlayerId, Structure};
use crate::player::{Player, ResourceHand};
use serde::{Deserialize, Serialize};

/// Public view of a player, embedded in broadcast payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub victory_points: u32,
    pub resources: ResourceHand,
}

impl PlayerSummary {
    pub fn of(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            victory_points: player.victory_points,
            resources: player.resources.clone(),
        }
    }
}

/// One intersection in a state snapshot.
///
/// Ids are reassigned densely in table order, independent of the
/// board's storage coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionState {
    pub owner: Option<PlayerSummary>,
    pub structure: Structure,
    pub id: usize,
}

/// One connection in a state snapshot, addressed by its stable edge id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub owner: Option<PlayerSummary>,
    pub id: usize,
}

/// The full broadcastable game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub hexagons: Vec<Hexagon>,
    pub intersections: Vec<IntersectionState>,
    /// Sorted by connection id ascending, no duplicates
    pub connections: Vec<ConnectionState>,
    /// The currently active turn-order sequence
    pub players: Vec<PlayerSummary>,
    pub setup_phase: bool,
}

/// An update pushed to every participant of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GameUpdate {
    /// The turn-order sequence changed
    TurnOrder { players: Vec<PlayerSummary> },
    /// Canonical state after a mutation
    State(StateSnapshot),
    /// The match concluded
    GameOver { winner: PlayerSummary },
}

/// Capability for delivering updates to a match's participants.
///
/// Implementations must not block: the controller calls this from
/// inside move execution and ignores delivery failures.
pub trait ProgressNotifier: Send + Sync {
    fn notify(&self, game_id: &str, update: GameUpdate);
}

/// Notifier that drops every update, for headless use and tests
#[derive(Debug, Default)]
pub struct NullNotifier;

impl ProgressNotifier for NullNotifier {
    fn notify(&self, _game_id: &str, _update: GameUpdate) {}
}
