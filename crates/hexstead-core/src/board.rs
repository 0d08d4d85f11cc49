//! Game board representation: hexagon tiles, intersections, and connections.
//!
//! This module contains:
//! - Resource and tile types
//! - The sparse 6x11 intersection grid and the connection (edge) set
//! - Placement legality checks (occupancy, spacing, road adjacency)
//! - Dice-roll resource payout computation
//!
//! The board performs no turn or phase authorization; that is the
//! controller's job. It only answers whether a placement is spatially
//! legal and who gets paid for a given roll.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Player identifier (seat index in the match's player list)
pub type PlayerId = u8;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

/// Type of hexagon tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Desert - never produces
    Desert,
}

impl TileKind {
    /// Get the resource this tile pays out, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileKind::Resource(r) => Some(*r),
            TileKind::Desert => None,
        }
    }
}

/// A single hexagon tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hexagon {
    /// Stable tile id (0..=18 in reading order)
    pub id: usize,
    /// What the tile produces
    pub kind: TileKind,
    /// Dice sum that triggers production (None for the desert)
    pub distribution: Option<u8>,
    /// Number token shown on the tile (None for the desert)
    pub roll_value: Option<u8>,
}

/// What's built on an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Structure {
    /// Nothing built
    #[default]
    Empty,
    /// Village (1 VP, one payout per adjacent tile production)
    Village,
    /// City upgrade of a village
    City,
}

/// A board node where a village may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Intersection {
    pub structure: Structure,
    pub owner: Option<PlayerId>,
}

impl Intersection {
    pub fn is_occupied(&self) -> bool {
        self.owner.is_some()
    }
}

/// An edge between two intersections where a road may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Stable edge id, symmetric across the two endpoint orderings
    pub id: usize,
    pub owner: Option<PlayerId>,
}

/// Number of intersection grid rows
const GRID_ROWS: usize = 6;

/// Hexagons per tile row, top to bottom
const HEX_ROW_COUNTS: [usize; 5] = [3, 4, 5, 4, 3];

/// Leftmost intersection column touched by the first tile of each row
const HEX_ROW_OFFSETS: [usize; 5] = [2, 1, 0, 1, 2];

/// Valid column span of an intersection grid row.
///
/// Rows hold 7, 9, 11, 11, 9, 7 intersections (54 total), mirroring the
/// coastline of the 3-4-5-4-3 tile layout.
fn col_span(row: usize) -> std::ops::RangeInclusive<usize> {
    match row {
        0 | 5 => 2..=8,
        1 | 4 => 1..=9,
        2 | 3 => 0..=10,
        _ => 1..=0,
    }
}

fn is_valid_cell(row: usize, col: usize) -> bool {
    row < GRID_ROWS && col_span(row).contains(&col)
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    /// All tiles in reading order
    hexagons: Vec<Hexagon>,
    /// Six intersections around each tile (parallel to `hexagons`)
    hexagon_nodes: Vec<[usize; 6]>,
    /// Sparse 6x11 intersection table
    intersections: Vec<Vec<Option<Intersection>>>,
    /// Grid coordinate of each dense node index
    node_coords: Vec<(usize, usize)>,
    /// Undirected edges keyed by canonical (min, max) node pair
    connections: BTreeMap<(usize, usize), Connection>,
    /// Endpoint pair of each connection id
    edge_endpoints: Vec<(usize, usize)>,
    /// Mirrors the controller's phase for placement-rule differences
    setup_phase: bool,
}

impl Board {
    /// Create a board with the fixed beginner layout from the rulebook.
    pub fn standard() -> Self {
        let kinds: [(TileKind, Option<u8>); 19] = [
            (TileKind::Resource(Resource::Ore), Some(10)),
            (TileKind::Resource(Resource::Wool), Some(2)),
            (TileKind::Resource(Resource::Lumber), Some(9)),
            (TileKind::Resource(Resource::Grain), Some(12)),
            (TileKind::Resource(Resource::Brick), Some(6)),
            (TileKind::Resource(Resource::Wool), Some(4)),
            (TileKind::Resource(Resource::Brick), Some(10)),
            (TileKind::Resource(Resource::Grain), Some(9)),
            (TileKind::Resource(Resource::Lumber), Some(11)),
            (TileKind::Desert, None),
            (TileKind::Resource(Resource::Lumber), Some(3)),
            (TileKind::Resource(Resource::Ore), Some(8)),
            (TileKind::Resource(Resource::Lumber), Some(8)),
            (TileKind::Resource(Resource::Ore), Some(3)),
            (TileKind::Resource(Resource::Grain), Some(4)),
            (TileKind::Resource(Resource::Wool), Some(5)),
            (TileKind::Resource(Resource::Brick), Some(5)),
            (TileKind::Resource(Resource::Grain), Some(6)),
            (TileKind::Resource(Resource::Wool), Some(11)),
        ];
        Self::from_layout(&kinds)
    }

    /// Create a board with randomized tile kinds and number tokens.
    ///
    /// Shuffles the standard pools (4 lumber, 4 grain, 4 wool, 3 ore,
    /// 3 brick, 1 desert; tokens 2-12 with the usual multiplicities)
    /// with the provided RNG for deterministic generation when needed.
    pub fn random_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut kinds: Vec<TileKind> = Vec::with_capacity(19);
        for (resource, count) in [
            (Resource::Lumber, 4),
            (Resource::Grain, 4),
            (Resource::Wool, 4),
            (Resource::Ore, 3),
            (Resource::Brick, 3),
        ] {
            kinds.extend(std::iter::repeat(TileKind::Resource(resource)).take(count));
        }
        kinds.push(TileKind::Desert);
        kinds.shuffle(rng);

        let mut numbers: Vec<u8> = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];
        numbers.shuffle(rng);

        let mut layout: [(TileKind, Option<u8>); 19] = [(TileKind::Desert, None); 19];
        let mut next_number = numbers.into_iter();
        for (slot, kind) in layout.iter_mut().zip(kinds) {
            *slot = match kind {
                TileKind::Desert => (kind, None),
                TileKind::Resource(_) => (kind, next_number.next()),
            };
        }
        Self::from_layout(&layout)
    }

    fn from_layout(layout: &[(TileKind, Option<u8>)]) -> Self {
        // Dense node enumeration: row-major over valid cells.
        let mut node_coords = Vec::new();
        let mut intersections = vec![vec![None; 11]; GRID_ROWS];
        for row in 0..GRID_ROWS {
            for col in col_span(row) {
                node_coords.push((row, col));
                intersections[row][col] = Some(Intersection::default());
            }
        }

        // Edges in (min, max) sorted order; the position is the id.
        let mut connections = BTreeMap::new();
        let mut edge_endpoints = Vec::new();
        for a in 0..node_coords.len() {
            for b in Self::node_neighbors(&node_coords, a) {
                if b > a {
                    let id = edge_endpoints.len();
                    edge_endpoints.push((a, b));
                    connections.insert((a, b), Connection { id, owner: None });
                }
            }
        }

        // Tiles and the six intersections around each.
        let mut hexagons = Vec::with_capacity(layout.len());
        let mut hexagon_nodes = Vec::with_capacity(layout.len());
        let mut id = 0;
        for (hex_row, &count) in HEX_ROW_COUNTS.iter().enumerate() {
            let offset = HEX_ROW_OFFSETS[hex_row];
            for j in 0..count {
                let (kind, number) = layout[id];
                hexagons.push(Hexagon {
                    id,
                    kind,
                    distribution: number,
                    roll_value: number,
                });
                let left = offset + 2 * j;
                let mut nodes = [0usize; 6];
                for k in 0..3 {
                    nodes[k] = Self::index_of(&node_coords, hex_row, left + k);
                    nodes[k + 3] = Self::index_of(&node_coords, hex_row + 1, left + k);
                }
                hexagon_nodes.push(nodes);
                id += 1;
            }
        }

        Self {
            hexagons,
            hexagon_nodes,
            intersections,
            node_coords,
            connections,
            edge_endpoints,
            setup_phase: true,
        }
    }

    fn index_of(node_coords: &[(usize, usize)], row: usize, col: usize) -> usize {
        node_coords
            .iter()
            .position(|&(r, c)| r == row && c == col)
            .expect("grid cell is a valid intersection")
    }

    /// Dense node indices adjacent to node `a` on the grid.
    ///
    /// Horizontal edges join consecutive valid cells of a row; vertical
    /// edges join rows `r` and `r + 1` where the column parity matches
    /// the row parity (the vertical sides of the zigzag).
    fn node_neighbors(node_coords: &[(usize, usize)], a: usize) -> Vec<usize> {
        let (row, col) = node_coords[a];
        let mut candidates = Vec::with_capacity(3);
        if col > 0 && is_valid_cell(row, col - 1) {
            candidates.push((row, col - 1));
        }
        if is_valid_cell(row, col + 1) {
            candidates.push((row, col + 1));
        }
        if row > 0 && (row - 1) % 2 == col % 2 && is_valid_cell(row - 1, col) {
            candidates.push((row - 1, col));
        }
        if row % 2 == col % 2 && is_valid_cell(row + 1, col) {
            candidates.push((row + 1, col));
        }
        candidates
            .into_iter()
            .map(|(r, c)| Self::index_of(node_coords, r, c))
            .collect()
    }

    // ==================== Placement ====================

    /// Claim a connection for a player's road.
    ///
    /// Fails when the id is unknown, the connection is already claimed,
    /// or it has no legal adjacency to the player's holdings. During the
    /// setup phase the connection must touch one of the player's own
    /// villages (the one just placed); afterwards touching any of the
    /// player's structures or roads suffices.
    pub fn add_road(&mut self, player: PlayerId, connection_id: usize) -> bool {
        let Some(&(a, b)) = self.edge_endpoints.get(connection_id) else {
            return false;
        };
        if self.connections[&(a, b)].owner.is_some() {
            return false;
        }

        let endpoint_owned = [a, b]
            .iter()
            .any(|&n| self.node(n).is_some_and(|i| i.owner == Some(player)));
        let legal = if self.setup_phase {
            endpoint_owned
        } else {
            endpoint_owned || self.road_touches(player, a) || self.road_touches(player, b)
        };
        if !legal {
            return false;
        }

        self.connections
            .get_mut(&(a, b))
            .expect("endpoint pair resolved from edge table")
            .owner = Some(player);
        true
    }

    /// Place a village for a player on an intersection.
    ///
    /// Fails when the id is unknown, the intersection is occupied, or a
    /// neighboring intersection is occupied (the spacing rule: no two
    /// villages within one connection of each other).
    pub fn add_village(&mut self, player: PlayerId, intersection_id: usize) -> bool {
        if self
            .node(intersection_id)
            .map_or(true, |i| i.is_occupied())
        {
            return false;
        }
        let spaced = Self::node_neighbors(&self.node_coords, intersection_id)
            .into_iter()
            .all(|n| self.node(n).map_or(true, |i| !i.is_occupied()));
        if !spaced {
            return false;
        }

        let (row, col) = self.node_coords[intersection_id];
        self.intersections[row][col] = Some(Intersection {
            structure: Structure::Village,
            owner: Some(player),
        });
        true
    }

    /// Whether any connection incident to `node` is the player's road
    fn road_touches(&self, player: PlayerId, node: usize) -> bool {
        Self::node_neighbors(&self.node_coords, node)
            .into_iter()
            .any(|n| {
                let key = (node.min(n), node.max(n));
                self.connections
                    .get(&key)
                    .is_some_and(|c| c.owner == Some(player))
            })
    }

    // ==================== Resource payout ====================

    /// Resource payouts for a dice roll.
    ///
    /// Every hexagon whose distribution matches the roll pays one unit
    /// of its resource per adjacent owned intersection; a player with
    /// two villages on the same tile is paid twice.
    pub fn payouts_for_roll(&self, roll: u8) -> Vec<(PlayerId, Resource)> {
        let mut payouts = Vec::new();
        for (hexagon, nodes) in self.hexagons.iter().zip(&self.hexagon_nodes) {
            if hexagon.distribution != Some(roll) {
                continue;
            }
            let Some(resource) = hexagon.kind.resource() else {
                continue;
            };
            for &node in nodes {
                if let Some(owner) = self.node(node).and_then(|i| i.owner) {
                    payouts.push((owner, resource));
                }
            }
        }
        payouts
    }

    // ==================== Queries ====================

    /// Toggle setup-phase placement rules
    pub fn set_setup_phase(&mut self, setup: bool) {
        self.setup_phase = setup;
    }

    pub fn is_setup_phase(&self) -> bool {
        self.setup_phase
    }

    /// All tiles in reading order
    pub fn hexagons(&self) -> &[Hexagon] {
        &self.hexagons
    }

    /// The six intersections around a tile
    pub fn hexagon_intersections(&self, hexagon_id: usize) -> Option<&[usize; 6]> {
        self.hexagon_nodes.get(hexagon_id)
    }

    /// The sparse intersection table
    pub fn intersections(&self) -> &[Vec<Option<Intersection>>] {
        &self.intersections
    }

    /// All connections, keyed by canonical (min, max) node pair
    pub fn connections(&self) -> &BTreeMap<(usize, usize), Connection> {
        &self.connections
    }

    /// Number of intersections on the board
    pub fn intersection_count(&self) -> usize {
        self.node_coords.len()
    }

    /// Canonical connection id for a pair of intersection indices.
    ///
    /// Symmetric: `(i, j)` and `(j, i)` resolve to the same id.
    pub fn connection_id(&self, i: usize, j: usize) -> Option<usize> {
        self.connections.get(&(i.min(j), i.max(j))).map(|c| c.id)
    }

    /// Endpoint intersections of a connection id
    pub fn connection_endpoints(&self, connection_id: usize) -> Option<(usize, usize)> {
        self.edge_endpoints.get(connection_id).copied()
    }

    /// Intersection state by dense node index
    pub fn node(&self, index: usize) -> Option<&Intersection> {
        let &(row, col) = self.node_coords.get(index)?;
        self.intersections[row][col].as_ref()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
