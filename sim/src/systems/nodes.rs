//! Resource node systems - spawning, bobbing and pickup of crystals.

use crate::components::*;
use crate::config::SimConfig;
use crate::session::{PlayerState, SessionClock};
use crate::systems::scheduler::{TaskKind, TaskQueue};
use crate::systems::spawner::{random_column, IdAllocator};
use crate::telemetry::{EventBuffer, SimEvent};
use crate::terrain::terrain_height;
use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

/// Roll a new node at a random column, resting `node_hover` above the terrain.
/// Overlap with existing nodes is allowed.
pub fn roll_node(rng: &mut impl Rng, ids: &mut IdAllocator, config: &SimConfig) -> NodeBundle {
    let column = random_column(rng, config.world_radius - config.node_margin);
    let y = terrain_height(column.x, column.y) as f32 + config.node_hover;
    let position = Vec3::new(column.x as f32 + 0.5, y, column.y as f32 + 0.5);
    NodeBundle::new(ids.next_node(), position)
}

/// System that bobs every node around its resting height. Cosmetic only.
pub fn node_bob_system(
    clock: Res<SessionClock>,
    config: Res<SimConfig>,
    mut query: Query<(&ResourceNode, &mut Position)>,
) {
    let time = clock.elapsed as f32;
    for (node, mut pos) in query.iter_mut() {
        pos.0.y = node.base_y + node.bob_offset(time, config.bob_rate, config.bob_amplitude);
    }
}

/// System that collects every node within reach of the player.
///
/// Each pickup grants one resource plus the score reward and schedules one
/// replacement after `node_respawn_seconds`. Pickup ignores the node ceiling.
pub fn node_pickup_system(
    mut commands: Commands,
    clock: Res<SessionClock>,
    config: Res<SimConfig>,
    mut player: ResMut<PlayerState>,
    mut events: ResMut<EventBuffer>,
    mut tasks: ResMut<TaskQueue>,
    query: Query<(Entity, &NodeId, &ResourceNode, &Position)>,
) {
    let reach = player.position;
    for (entity, id, node, pos) in query.iter() {
        if node.anchor(pos).distance(reach) >= config.pickup_radius {
            continue;
        }

        commands.entity(entity).despawn();
        player.resources += 1;
        player.score += config.node_reward;
        tasks.schedule(clock.elapsed + config.node_respawn_seconds, TaskKind::RespawnNode);
        events.push(SimEvent::CollectCrystal {
            reward: config.node_reward,
            crystals: player.resources,
        });
        tracing::debug!(id = id.0, resources = player.resources, "node collected");
    }
}
