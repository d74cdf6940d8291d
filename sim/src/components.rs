//! ECS Components for the Voxel Quest simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World-space position (x = east/west, y = up, z = north/south).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// Distance ignoring the vertical axis.
    pub fn horizontal_distance_to(&self, other: Vec3) -> f32 {
        let dx = other.x - self.0.x;
        let dz = other.z - self.0.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Yaw (radians) an entity is turned towards, measured from +z.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Facing(pub f32);

// ============================================================================
// HOSTILE ENTITY COMPONENTS
// ============================================================================

/// Unique identifier for a hostile entity.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Marker for hostile, player-pursuing entities.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Hit points of a hostile entity. May drop to zero or below on the killing shot.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyHealth(pub i32);

impl EnemyHealth {
    pub fn is_alive(&self) -> bool {
        self.0 > 0
    }

    /// Subtract `amount`, returning true when this hit was lethal.
    pub fn damage(&mut self, amount: i32) -> bool {
        self.0 -= amount;
        !self.is_alive()
    }
}

impl Default for EnemyHealth {
    fn default() -> Self {
        Self(3)
    }
}

/// Pursuit speed in units per second, rolled once per spawn.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PursuitSpeed(pub f32);

impl Default for PursuitSpeed {
    fn default() -> Self {
        Self(1.8)
    }
}

/// Seconds until this entity may deal contact damage again.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DamageCooldown(pub f32);

impl DamageCooldown {
    pub fn tick(&mut self, dt: f32) {
        self.0 -= dt;
    }

    pub fn is_ready(&self) -> bool {
        self.0 <= 0.0
    }
}

// ============================================================================
// RESOURCE NODE COMPONENTS
// ============================================================================

/// Unique identifier for a collectible resource node.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Collectible crystal resting above the terrain.
///
/// `base_y` is the resting height used for pickup; the rendered `Position`
/// bobs around it.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResourceNode {
    pub base_y: f32,
    pub phase: f32,
}

impl ResourceNode {
    /// Position used for pickup checks.
    pub fn anchor(&self, pos: &Position) -> Vec3 {
        Vec3::new(pos.0.x, self.base_y, pos.0.z)
    }

    /// Vertical bob offset at `time` seconds.
    pub fn bob_offset(&self, time: f32, rate: f32, amplitude: f32) -> f32 {
        (time * rate + self.phase).sin() * amplitude
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete hostile entity.
#[derive(Bundle, Default)]
pub struct EnemyBundle {
    pub id: EnemyId,
    pub marker: Enemy,
    pub position: Position,
    pub facing: Facing,
    pub health: EnemyHealth,
    pub speed: PursuitSpeed,
    pub cooldown: DamageCooldown,
}

impl EnemyBundle {
    pub fn new(id: u32, position: Vec3, health: i32, speed: f32) -> Self {
        Self {
            id: EnemyId(id),
            marker: Enemy,
            position: Position(position),
            facing: Facing::default(),
            health: EnemyHealth(health),
            speed: PursuitSpeed(speed),
            cooldown: DamageCooldown::default(),
        }
    }
}

/// Bundle for spawning a resource node.
#[derive(Bundle, Default)]
pub struct NodeBundle {
    pub id: NodeId,
    pub position: Position,
    pub node: ResourceNode,
}

impl NodeBundle {
    pub fn new(id: u32, position: Vec3) -> Self {
        Self {
            id: NodeId(id),
            position: Position(position),
            node: ResourceNode {
                base_y: position.y,
                phase: id as f32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_health_lethal_hit() {
        let mut health = EnemyHealth(3);
        assert!(!health.damage(1));
        assert!(!health.damage(1));
        assert!(health.damage(1));
        assert!(!health.is_alive());
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let pos = Position::new(0.0, 10.0, 0.0);
        assert!((pos.horizontal_distance_to(Vec3::new(3.0, -5.0, 4.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_node_anchor_uses_base_height() {
        let bundle = NodeBundle::new(4, Vec3::new(1.5, 3.3, -2.5));
        let bobbed = Position::new(1.5, 3.4, -2.5);
        assert_eq!(bundle.node.anchor(&bobbed), Vec3::new(1.5, 3.3, -2.5));
        assert_eq!(bundle.node.phase, 4.0);
    }
}
