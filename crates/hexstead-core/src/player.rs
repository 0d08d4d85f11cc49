//! Player state and resource management.
//!
//! This module contains:
//! - ResourceHand for managing resource counts
//! - Building costs
//! - Player identity, inventory, and victory points

use crate::board::{PlayerId, Resource};
use serde::{Deserialize, Serialize};

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Brick => self.brick += amount,
            Resource::Lumber => self.lumber += amount,
            Resource::Ore => self.ore += amount,
            Resource::Grain => self.grain += amount,
            Resource::Wool => self.wool += amount,
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.brick >= cost.brick
            && self.lumber >= cost.lumber
            && self.ore >= cost.ore
            && self.grain >= cost.grain
            && self.wool >= cost.wool
    }

    /// Subtract a cost (panics if insufficient)
    pub fn subtract(&mut self, cost: &ResourceHand) {
        assert!(self.can_afford(cost), "Cannot afford this cost");
        self.brick -= cost.brick;
        self.lumber -= cost.lumber;
        self.ore -= cost.ore;
        self.grain -= cost.grain;
        self.wool -= cost.wool;
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a village: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn village() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Seat index in the match's player list
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current resources
    pub resources: ResourceHand,
    /// Score from built villages
    pub victory_points: u32,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            resources: ResourceHand::new(),
            victory_points: 0,
        }
    }

    /// Whether the inventory covers a cost
    pub fn resources_sufficient(&self, cost: &ResourceHand) -> bool {
        self.resources.can_afford(cost)
    }

    /// Debit a cost from the inventory
    pub fn pay(&mut self, cost: &ResourceHand) {
        self.resources.subtract(cost);
    }

    /// Award victory points
    pub fn increase_victory_points(&mut self, amount: u32) {
        self.victory_points += amount;
    }
}
