//! Simulation tuning.
//!
//! All gameplay constants live in [`SimConfig`], which is inserted into the ECS
//! world as a resource. Partial JSON documents override only the fields they
//! name; everything else keeps the defaults below.

use crate::error::SimError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for world size, physics, spawning and scoring.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Half-extent of the generated square world, in cells.
    pub world_radius: i32,

    // Player physics
    pub player_speed: f32,
    pub jump_force: f32,
    /// Vertical acceleration (negative = down).
    pub gravity: f32,
    /// Camera height above the ground surface.
    pub eye_height: f32,
    /// Height above ground the player is dropped from at session start.
    pub spawn_height: f32,
    /// Upper bound on the per-frame delta fed to physics, AI and spawners.
    pub max_frame_delta: f32,
    pub start_health: i32,

    // Win condition
    pub target_survival_seconds: f64,
    pub target_resources: u32,

    // Resource nodes
    pub initial_nodes: usize,
    /// Live node ceiling; spawns are suppressed at or above it.
    pub node_cap: usize,
    pub node_spawn_seconds: f32,
    /// Delay between a pickup and its replacement spawn.
    pub node_respawn_seconds: f64,
    pub node_reward: u32,
    pub pickup_radius: f32,
    /// Resting height of a node above its column's terrain height.
    pub node_hover: f32,
    /// Nodes spawn no closer than this many cells to the world edge.
    pub node_margin: i32,
    pub bob_amplitude: f32,
    /// Bob angular rate in radians per second.
    pub bob_rate: f32,

    // Hostile entities
    pub enemy_spawn_seconds: f32,
    /// Hard ceiling on the live entity cap.
    pub enemy_max: usize,
    /// Live entity cap at elapsed = 0.
    pub enemy_base_cap: usize,
    /// Seconds of survival per additional permitted entity.
    pub enemy_cap_step_seconds: f64,
    pub enemy_margin: i32,
    pub enemy_base_speed: f32,
    pub enemy_speed_spread: f32,
    pub enemy_health: i32,
    pub enemy_half_height: f32,
    pub enemy_half_width: f32,
    pub contact_range: f32,
    pub contact_damage: i32,
    pub contact_cooldown: f32,

    // Combat
    pub fire_range: f32,
    pub shot_damage: i32,
    pub kill_score: u32,
    pub combo_bonus: u32,
    /// Inclusive window between kills that keeps a combo alive.
    pub combo_window_ms: f64,

    // Construction
    pub build_cost: u32,
    pub build_score: u32,
    /// Distance ahead of the player a block is placed.
    pub build_reach: f32,

    pub min_name_len: usize,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_radius: 34,
            player_speed: 9.0,
            jump_force: 10.0,
            gravity: -25.0,
            eye_height: 0.8,
            spawn_height: 2.0,
            max_frame_delta: 0.05,
            start_health: 100,
            target_survival_seconds: 90.0,
            target_resources: 12,
            initial_nodes: 22,
            node_cap: 22,
            node_spawn_seconds: 2.8,
            node_respawn_seconds: 2.8,
            node_reward: 25,
            pickup_radius: 1.1,
            node_hover: 1.3,
            node_margin: 6,
            bob_amplitude: 0.15,
            bob_rate: 2.0,
            enemy_spawn_seconds: 4.8,
            enemy_max: 18,
            enemy_base_cap: 6,
            enemy_cap_step_seconds: 10.0,
            enemy_margin: 3,
            enemy_base_speed: 1.8,
            enemy_speed_spread: 0.9,
            enemy_health: 3,
            enemy_half_height: 0.65,
            enemy_half_width: 0.45,
            contact_range: 1.5,
            contact_damage: 8,
            contact_cooldown: 1.0,
            fire_range: 45.0,
            shot_damage: 1,
            kill_score: 35,
            combo_bonus: 5,
            combo_window_ms: 3000.0,
            build_cost: 2,
            build_score: 8,
            build_reach: 3.0,
            min_name_len: 3,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Default configuration with a fixed RNG seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Live hostile cap after `elapsed` seconds: one more every
    /// `enemy_cap_step_seconds`, never above `enemy_max`.
    pub fn enemy_cap(&self, elapsed: f64) -> usize {
        let steps = (elapsed.max(0.0) / self.enemy_cap_step_seconds).floor() as usize;
        self.enemy_max.min(self.enemy_base_cap + steps)
    }

    /// Largest |x| / |z| the player may occupy.
    pub fn player_bound(&self) -> f32 {
        (self.world_radius - 1) as f32
    }
}
