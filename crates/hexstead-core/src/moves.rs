//! Moves that players can submit.
//!
//! Inbound payloads arrive as a tagged union over the four supported
//! move kinds; anything else fails to deserialize and is surfaced as an
//! unsupported move at the boundary that parsed it.

use serde::{Deserialize, Serialize};

/// A player-submitted move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GameMove {
    /// Roll the dice, distributing resources for the given sum
    RollDice { dice_roll: u8 },
    /// Build a road on a connection
    BuildRoad { connection_id: usize },
    /// Build a village on an intersection
    BuildVillage { intersection_id: usize },
    /// End the current turn
    EndTurn,
}
