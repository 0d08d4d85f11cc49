//! Hexstead - rules engine for a settlement-building board game
//!
//! This crate provides the authoritative game logic for Hexstead:
//! - Board representation with hexagon tiles, intersections, and connections
//! - Player state and resource management
//! - The move-validation and execution state machine
//! - Broadcast payloads and the progress-notifier seam
//!
//! # Architecture
//!
//! One [`GameController`] is created per match and owns all of its
//! gameplay state. Inbound moves are validated against turn order,
//! phase, and cost before any mutation; after each successful move the
//! controller pushes the canonical state to the match's participants
//! through a [`ProgressNotifier`]. Transport, sessions, and delivery
//! live in the server crate.
//!
//! # Modules
//!
//! - [`board`]: tiles, intersections, connections, and placement rules
//! - [`player`]: inventories, building costs, and victory points
//! - [`moves`]: the inbound move payloads
//! - [`broadcast`]: outbound payloads and the notifier capability
//! - [`game`]: the per-match state machine

pub mod board;
pub mod broadcast;
pub mod game;
pub mod moves;
pub mod player;

// Re-export commonly used types
pub use board::{Board, Connection, Hexagon, Intersection, PlayerId, Resource, Structure, TileKind};
pub use broadcast::{
    ConnectionState, GameUpdate, IntersectionState, NullNotifier, PlayerSummary, ProgressNotifier,
    StateSnapshot,
};
pub use game::{GameController, GameError, GamePhase};
pub use moves::GameMove;
pub use player::{costs, Player, ResourceHand};
