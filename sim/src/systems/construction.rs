//! Construction - spending resources to stack blocks onto the voxel world.

use crate::config::SimConfig;
use crate::session::PlayerState;
use crate::systems::movement::PlayerInput;
use crate::telemetry::{EventBuffer, SimEvent};
use crate::terrain::{column_of, VoxelWorld};
use bevy_ecs::prelude::*;
use glam::{IVec3, Vec3};

/// Cell a block would be placed in: `reach` units ahead of `eye` along the
/// horizontal part of `look`, on top of whatever that column already holds.
pub fn build_target(eye: Vec3, look: Vec3, reach: f32, voxels: &VoxelWorld) -> IVec3 {
    let column = column_of(eye.x + look.x * reach, eye.z + look.z * reach);
    IVec3::new(column.x, voxels.ground_height_at(column.x, column.y), column.y)
}

/// Place a block at `cell` if the player can afford it and the cell is free.
/// Returns false with no state change otherwise.
pub fn try_place(world: &mut World, cell: IVec3) -> bool {
    let (cost, bonus) = {
        let config = world.resource::<SimConfig>();
        (config.build_cost, config.build_score)
    };
    if world.resource::<PlayerState>().resources < cost {
        return false;
    }
    if !world.resource_mut::<VoxelWorld>().place(cell) {
        return false;
    }

    let mut player = world.resource_mut::<PlayerState>();
    player.resources -= cost;
    player.score += bonus;
    let remaining = player.resources;

    world.resource_mut::<EventBuffer>().push(SimEvent::BuildBlock {
        x: cell.x,
        y: cell.y,
        z: cell.z,
    });
    tracing::debug!(x = cell.x, y = cell.y, z = cell.z, remaining, "block built");
    true
}

/// Build in front of the player using the current look direction.
pub fn try_build(world: &mut World) -> Option<IVec3> {
    let eye = world.resource::<PlayerState>().position;
    let look = world.resource::<PlayerInput>().look;
    let reach = world.resource::<SimConfig>().build_reach;
    let cell = build_target(eye, look, reach, world.resource::<VoxelWorld>());
    try_place(world, cell).then_some(cell)
}
