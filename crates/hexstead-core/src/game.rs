//! Core game state machine.
//!
//! This module contains the [`GameController`], which owns one board and
//! the match's players, validates and applies submitted moves, and
//! pushes the resulting state to the match's participants.

use crate::board::{Board, PlayerId};
use crate::broadcast::{
    ConnectionState, GameUpdate, IntersectionState, PlayerSummary, ProgressNotifier, StateSnapshot,
};
use crate::moves::GameMove;
use crate::player::{costs, Player};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

/// Victory points needed to win
const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Game phase
///
/// Setup runs until the snake turn order is exhausted, Main until a
/// village placement reaches the victory threshold. Finished is
/// terminal: every later move is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    Main,
    Finished { winner: PlayerId },
}

/// Rule violations raised by [`GameController::make_move`].
///
/// All variants are client-caused; none leaves partially applied state
/// behind. Several messages carry the first player's display name
/// rather than the offender's, which callers have come to rely on.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("game is already over: {0}")]
    GameAlreadyOver(String),

    #[error("not the active player: {0}")]
    NotActivePlayer(String),

    #[error("invalid game move: {0}")]
    InvalidMove(String),

    #[error("unsupported game move: {0}")]
    UnsupportedMove(String),
}

/// The rules engine for a single match.
///
/// One controller exists per match and owns all of its gameplay state;
/// `make_move` takes `&mut self`, so moves on the same match are
/// serialized while different matches proceed independently.
pub struct GameController {
    game_id: String,
    board: Board,
    players: Vec<Player>,
    /// Snake order for setup: forward then reversed, consumed from the front
    setup_turn_order: VecDeque<PlayerId>,
    /// Round-robin order for the main phase, rotated by EndTurn
    turn_order: VecDeque<PlayerId>,
    phase: GamePhase,
    notifier: Arc<dyn ProgressNotifier>,
}

impl GameController {
    /// Create a match with an ordered, non-empty player list.
    ///
    /// Computes both turn orders and immediately broadcasts the starting
    /// state and the setup turn order to all participants.
    pub fn new(
        game_id: impl Into<String>,
        player_names: Vec<String>,
        notifier: Arc<dyn ProgressNotifier>,
    ) -> Self {
        assert!(!player_names.is_empty(), "match needs at least one player");

        let players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name))
            .collect();

        let turn_order: VecDeque<PlayerId> = players.iter().map(|p| p.id).collect();
        let mut setup_turn_order = turn_order.clone();
        setup_turn_order.extend(players.iter().rev().map(|p| p.id));

        let controller = Self {
            game_id: game_id.into(),
            board: Board::standard(),
            players,
            setup_turn_order,
            turn_order,
            phase: GamePhase::Setup,
            notifier,
        };

        controller.broadcast_state();
        controller.broadcast_turn_order(&controller.setup_turn_order);
        controller
    }

    /// Validate and apply a move for the acting player.
    ///
    /// Every rule violation is raised before any state changes; a failed
    /// move leaves the board, inventories, and turn orders untouched.
    pub fn make_move(&mut self, game_move: GameMove, player: PlayerId) -> Result<(), GameError> {
        if matches!(self.phase, GamePhase::Finished { .. }) {
            return Err(GameError::GameAlreadyOver(self.players[0].name.clone()));
        }

        match game_move {
            GameMove::RollDice { dice_roll } => self.roll_dice(dice_roll, player),
            GameMove::BuildRoad { connection_id } => self.build_road(connection_id, player),
            GameMove::BuildVillage { intersection_id } => {
                self.build_village(intersection_id, player)
            }
            GameMove::EndTurn => self.end_turn(player),
        }
    }

    fn roll_dice(&mut self, dice_roll: u8, player: PlayerId) -> Result<(), GameError> {
        if matches!(self.phase, GamePhase::Setup) {
            return Err(GameError::InvalidMove(
                "cannot roll the dice during the setup phase".to_string(),
            ));
        }
        if self.turn_order.front() != Some(&player) {
            return Err(self.not_active_player());
        }
        if !(2..=12).contains(&dice_roll) {
            return Err(GameError::InvalidMove(
                "dice roll must be between 2 and 12".to_string(),
            ));
        }

        for (recipient, resource) in self.board.payouts_for_roll(dice_roll) {
            self.players[recipient as usize].resources.add(resource, 1);
        }

        // Re-broadcasts the setup-phase order, which is empty once the
        // main phase begins. Clients tolerate this; see the tests.
        self.broadcast_turn_order(&self.setup_turn_order);
        Ok(())
    }

    fn build_road(&mut self, connection_id: usize, player: PlayerId) -> Result<(), GameError> {
        if matches!(self.phase, GamePhase::Setup) {
            if self.setup_turn_order.front() != Some(&player) {
                return Err(self.not_active_player());
            }
            if !self.board.add_road(player, connection_id) {
                return Err(GameError::InvalidMove("cannot build here: BuildRoad".into()));
            }

            // The road ends a setup turn; villages leave the queue alone.
            self.setup_turn_order.pop_front();
            if self.setup_turn_order.is_empty() {
                self.phase = GamePhase::Main;
                self.board.set_setup_phase(false);
            }
            self.broadcast_state();
            return Ok(());
        }

        if self.turn_order.front() != Some(&player) {
            return Err(self.not_active_player());
        }
        if !self.players[player as usize].resources_sufficient(&costs::road()) {
            return Err(GameError::InvalidMove(
                "not enough resources: BuildRoad".into(),
            ));
        }
        if !self.board.add_road(player, connection_id) {
            return Err(GameError::InvalidMove("cannot build here: BuildRoad".into()));
        }
        self.players[player as usize].pay(&costs::road());
        self.broadcast_state();
        Ok(())
    }

    fn build_village(
        &mut self,
        intersection_id: usize,
        player: PlayerId,
    ) -> Result<(), GameError> {
        if matches!(self.phase, GamePhase::Setup) {
            if self.setup_turn_order.front() != Some(&player) {
                return Err(self.not_active_player());
            }
            if !self.board.add_village(player, intersection_id) {
                return Err(GameError::InvalidMove(
                    "cannot build here: BuildVillage".into(),
                ));
            }
            self.players[player as usize].increase_victory_points(1);
            self.broadcast_state();
            return Ok(());
        }

        if self.turn_order.front() != Some(&player) {
            return Err(self.not_active_player());
        }
        if !self.players[player as usize].resources_sufficient(&costs::village()) {
            return Err(GameError::InvalidMove(
                "not enough resources: BuildVillage".into(),
            ));
        }
        if !self.board.add_village(player, intersection_id) {
            return Err(GameError::InvalidMove(
                "cannot build here: BuildVillage".into(),
            ));
        }
        self.players[player as usize].pay(&costs::village());
        self.players[player as usize].increase_victory_points(1);
        self.broadcast_state();

        if self.players[player as usize].victory_points >= VICTORY_POINTS_TO_WIN {
            self.phase = GamePhase::Finished { winner: player };
            self.notifier.notify(
                &self.game_id,
                GameUpdate::GameOver {
                    winner: PlayerSummary::of(&self.players[player as usize]),
                },
            );
        }
        Ok(())
    }

    fn end_turn(&mut self, player: PlayerId) -> Result<(), GameError> {
        if matches!(self.phase, GamePhase::Setup) {
            return Err(self.not_active_player());
        }
        if self.turn_order.front() != Some(&player) {
            return Err(self.not_active_player());
        }

        let finished = self.turn_order.pop_front().expect("turn order is non-empty");
        self.turn_order.push_back(finished);
        self.broadcast_turn_order(&self.turn_order);
        Ok(())
    }

    // ==================== Broadcasting ====================

    /// Assemble the canonical broadcast view of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        let hexagons = self.board.hexagons().to_vec();

        let mut intersections = Vec::new();
        let mut id = 0;
        for row in self.board.intersections() {
            for intersection in row.iter().flatten() {
                intersections.push(IntersectionState {
                    owner: intersection
                        .owner
                        .map(|p| PlayerSummary::of(&self.players[p as usize])),
                    structure: intersection.structure,
                    id,
                });
                id += 1;
            }
        }

        // Canonical (min, max) keys iterate in id order already.
        let connections = self
            .board
            .connections()
            .values()
            .map(|connection| ConnectionState {
                owner: connection
                    .owner
                    .map(|p| PlayerSummary::of(&self.players[p as usize])),
                id: connection.id,
            })
            .collect();

        let setup_phase = matches!(self.phase, GamePhase::Setup);
        let players = if setup_phase {
            self.summaries(&self.setup_turn_order)
        } else {
            self.summaries(&self.turn_order)
        };

        StateSnapshot {
            hexagons,
            intersections,
            connections,
            players,
            setup_phase,
        }
    }

    fn broadcast_state(&self) {
        self.notifier
            .notify(&self.game_id, GameUpdate::State(self.snapshot()));
    }

    fn broadcast_turn_order(&self, order: &VecDeque<PlayerId>) {
        self.notifier.notify(
            &self.game_id,
            GameUpdate::TurnOrder {
                players: self.summaries(order),
            },
        );
    }

    fn summaries(&self, order: &VecDeque<PlayerId>) -> Vec<PlayerSummary> {
        order
            .iter()
            .map(|&id| PlayerSummary::of(&self.players[id as usize]))
            .collect()
    }

    fn not_active_player(&self) -> GameError {
        GameError::NotActivePlayer(self.players[0].name.clone())
    }

    // ==================== Queries ====================

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_gameover(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// The winner once the match has concluded
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn setup_turn_order(&self) -> &VecDeque<PlayerId> {
        &self.setup_turn_order
    }

    pub fn turn_order(&self) -> &VecDeque<PlayerId> {
        &self.turn_order
    }
}
