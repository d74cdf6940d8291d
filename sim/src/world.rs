//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable, read-only view of the
//! simulation state for the rendering and HUD layers.

use crate::components::*;
use crate::session::{PlayerState, SessionClock, SessionPhase};
use crate::systems::ai::{Contact, FrameContacts};
use crate::terrain::VoxelWorld;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Numbers shown on the HUD. Health is clamped at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub health: i32,
    pub score: u32,
    pub resources: u32,
    pub kills: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub elapsed_seconds: u32,
}

impl HudSnapshot {
    pub fn from_state(player: &PlayerState, clock: &SessionClock) -> Self {
        Self {
            health: player.displayed_health(),
            score: player.score,
            resources: player.resources,
            kills: player.kills,
            combo: player.combo,
            max_combo: player.max_combo,
            elapsed_seconds: clock.whole_seconds(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vy: f32,
}

/// Snapshot of a single hostile entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Yaw towards the player, radians.
    pub facing: f32,
    pub health: i32,
}

/// Snapshot of a resource node at its bobbed position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Frames stepped this session.
    pub tick: u64,
    /// Elapsed session time in seconds.
    pub time: f64,
    pub phase: SessionPhase,
    pub hud: HudSnapshot,
    pub player: PlayerSnapshot,
    /// Hostile entities, ordered by id.
    pub enemies: Vec<EnemySnapshot>,
    /// Resource nodes, ordered by id.
    pub nodes: Vec<NodeSnapshot>,
    /// Player-built blocks in placement order.
    pub blocks: Vec<BlockSnapshot>,
    /// Contact hits landed on the player during the last frame.
    pub contacts: Vec<Contact>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World) -> Self {
        let mut enemy_query = world.query_filtered::<(&EnemyId, &Position, &Facing, &EnemyHealth), With<Enemy>>();
        let mut enemies: Vec<EnemySnapshot> = enemy_query
            .iter(world)
            .map(|(id, pos, facing, health)| EnemySnapshot {
                id: id.0,
                x: pos.0.x,
                y: pos.0.y,
                z: pos.0.z,
                facing: facing.0,
                health: health.0,
            })
            .collect();
        enemies.sort_by_key(|e| e.id);

        let mut node_query = world.query_filtered::<(&NodeId, &Position), With<ResourceNode>>();
        let mut nodes: Vec<NodeSnapshot> = node_query
            .iter(world)
            .map(|(id, pos)| NodeSnapshot {
                id: id.0,
                x: pos.0.x,
                y: pos.0.y,
                z: pos.0.z,
            })
            .collect();
        nodes.sort_by_key(|n| n.id);

        let blocks = world
            .resource::<VoxelWorld>()
            .built_cells()
            .iter()
            .map(|cell| BlockSnapshot {
                x: cell.x,
                y: cell.y,
                z: cell.z,
            })
            .collect();

        let clock = *world.resource::<SessionClock>();
        let player = world.resource::<PlayerState>();

        Self {
            tick: clock.tick,
            time: clock.elapsed,
            phase: *world.resource::<SessionPhase>(),
            hud: HudSnapshot::from_state(player, &clock),
            player: PlayerSnapshot {
                x: player.position.x,
                y: player.position.y,
                z: player.position.z,
                vy: player.velocity_y,
            },
            enemies,
            nodes,
            blocks,
            contacts: world.resource::<FrameContacts>().0.clone(),
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
