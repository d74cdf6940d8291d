//! Movement system - integrates the player body under input and gravity and
//! resolves it against the voxel ground.

use crate::config::SimConfig;
use crate::session::PlayerState;
use crate::terrain::VoxelWorld;
use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Resource containing the (clamped) delta time for the current frame.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Per-frame input written by the host.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Buffered jump request; consumed on the next ground contact.
    pub jump: bool,
    /// Camera forward vector.
    pub look: Vec3,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            forward: false,
            back: false,
            left: false,
            right: false,
            jump: false,
            look: Vec3::NEG_Z,
        }
    }
}

impl PlayerInput {
    /// (forward, right) movement intent, each in -1..=1.
    pub fn move_axes(&self) -> (f32, f32) {
        let forward = self.forward as i32 - self.back as i32;
        let right = self.right as i32 - self.left as i32;
        (forward as f32, right as f32)
    }

    /// Horizontal forward and right unit vectors derived from `look`.
    pub fn horizontal_basis(&self) -> (Vec3, Vec3) {
        let forward = Vec3::new(self.look.x, 0.0, self.look.z).normalize_or_zero();
        let right = Vec3::new(-forward.z, 0.0, forward.x);
        (forward, right)
    }

    pub fn request_jump(&mut self) {
        self.jump = true;
    }

    /// Clear held keys and any pending jump, keeping the look direction.
    pub fn release(&mut self) {
        *self = Self {
            look: self.look,
            ..Default::default()
        };
    }
}

/// Advance the player body by `dt` seconds.
pub fn integrate_player(
    player: &mut PlayerState,
    input: &mut PlayerInput,
    voxels: &VoxelWorld,
    config: &SimConfig,
    dt: f32,
) {
    let (move_forward, move_right) = input.move_axes();
    let (forward, right) = input.horizontal_basis();
    let step = config.player_speed * dt;
    player.position += forward * (move_forward * step) + right * (move_right * step);

    let ground_y = voxels.ground_height_at_pos(player.position.x, player.position.z) as f32 + config.eye_height;

    player.velocity_y += config.gravity * dt;
    player.position.y += player.velocity_y * dt;

    if player.position.y < ground_y {
        player.position.y = ground_y;
        player.velocity_y = 0.0;
        if input.jump {
            player.velocity_y = config.jump_force;
            input.jump = false;
        }
    }

    let limit = config.player_bound();
    player.position.x = player.position.x.clamp(-limit, limit);
    player.position.z = player.position.z.clamp(-limit, limit);
}

/// System that moves the player each frame.
pub fn player_physics_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    voxels: Res<VoxelWorld>,
    mut input: ResMut<PlayerInput>,
    mut player: ResMut<PlayerState>,
) {
    integrate_player(&mut player, &mut input, &voxels, &config, dt.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::terrain_height;

    fn setup() -> (SimConfig, VoxelWorld) {
        let config = SimConfig::default();
        let voxels = VoxelWorld::generate(config.world_radius);
        (config, voxels)
    }

    fn standing(config: &SimConfig, voxels: &VoxelWorld) -> PlayerState {
        let y = voxels.ground_height_at(0, 0) as f32 + config.eye_height;
        PlayerState::new(config, Vec3::new(0.5, y, 0.5))
    }

    #[test]
    fn test_falls_and_lands_on_ground() {
        let (config, voxels) = setup();
        let mut player = PlayerState::new(&config, Vec3::new(0.5, 20.0, 0.5));
        let mut input = PlayerInput::default();
        for _ in 0..200 {
            integrate_player(&mut player, &mut input, &voxels, &config, 0.05);
        }
        let ground = (terrain_height(0, 0) + 1) as f32 + config.eye_height;
        assert!((player.position.y - ground).abs() < 1e-4);
        assert_eq!(player.velocity_y, 0.0);
    }

    #[test]
    fn test_jump_only_on_ground_contact() {
        let (config, voxels) = setup();
        let mut player = standing(&config, &voxels);
        player.position.y += 5.0;
        let mut input = PlayerInput::default();
        input.request_jump();

        // Airborne: request stays buffered and does not alter velocity.
        integrate_player(&mut player, &mut input, &voxels, &config, 0.05);
        assert!(input.jump);
        assert!(player.velocity_y < 0.0);

        for _ in 0..40 {
            integrate_player(&mut player, &mut input, &voxels, &config, 0.05);
            if !input.jump {
                break;
            }
        }
        assert!(!input.jump);
        assert_eq!(player.velocity_y, config.jump_force);
    }

    #[test]
    fn test_forward_follows_look_direction() {
        let (config, voxels) = setup();
        let mut player = standing(&config, &voxels);
        let mut input = PlayerInput {
            forward: true,
            look: Vec3::new(1.0, -0.5, 0.0),
            ..Default::default()
        };
        integrate_player(&mut player, &mut input, &voxels, &config, 0.05);
        assert!((player.position.x - (0.5 + config.player_speed * 0.05)).abs() < 1e-4);
        assert!((player.position.z - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_right_is_perpendicular() {
        let input = PlayerInput::default();
        let (forward, right) = input.horizontal_basis();
        assert_eq!(forward, Vec3::NEG_Z);
        assert_eq!(right, Vec3::X);
    }

    #[test]
    fn test_position_clamped_to_world() {
        let (config, voxels) = setup();
        let mut player = standing(&config, &voxels);
        player.position.x = 100.0;
        player.position.z = -100.0;
        let mut input = PlayerInput::default();
        integrate_player(&mut player, &mut input, &voxels, &config, 0.05);
        assert_eq!(player.position.x, config.player_bound());
        assert_eq!(player.position.z, -config.player_bound());
    }

    #[test]
    fn test_physics_system_reads_resources() {
        let (config, voxels) = setup();
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.05));
        world.insert_resource(PlayerState::new(&config, Vec3::new(0.5, 30.0, 0.5)));
        world.insert_resource(config);
        world.insert_resource(voxels);
        world.insert_resource(PlayerInput::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(player_physics_system);
        schedule.run(&mut world);

        let player = world.resource::<PlayerState>();
        assert!(player.position.y < 30.0);
        assert!(player.velocity_y < 0.0);
    }
}
