//! Spawner / difficulty controller.
//!
//! Two independent accumulators drive hostile and resource spawning. The
//! hostile cap grows with survival time (see [`SimConfig::enemy_cap`]).

use crate::components::*;
use crate::config::SimConfig;
use crate::session::SessionClock;
use crate::systems::ai::roll_enemy;
use crate::systems::movement::DeltaTime;
use crate::systems::nodes::roll_node;
use bevy_ecs::prelude::*;
use glam::IVec2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Seedable RNG shared by every spawner.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Monotonic id counters for spawned entities.
#[derive(Resource, Debug, Clone, Default)]
pub struct IdAllocator {
    next_enemy: u32,
    next_node: u32,
}

impl IdAllocator {
    pub fn next_enemy(&mut self) -> u32 {
        let id = self.next_enemy;
        self.next_enemy += 1;
        id
    }

    pub fn next_node(&mut self) -> u32 {
        let id = self.next_node;
        self.next_node += 1;
        id
    }
}

/// Spawn accumulators, in seconds since each last fired.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SpawnTimers {
    pub enemy: f32,
    pub node: f32,
}

/// Random column with both coordinates in `[-radius, radius)`.
pub fn random_column(rng: &mut impl Rng, radius: i32) -> IVec2 {
    let r = radius as f32;
    let x = ((rng.gen::<f32>() * 2.0 - 1.0) * r).floor() as i32;
    let z = ((rng.gen::<f32>() * 2.0 - 1.0) * r).floor() as i32;
    IVec2::new(x, z)
}

/// System that advances both spawn timers and spawns when due and under cap.
pub fn spawner_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    clock: Res<SessionClock>,
    config: Res<SimConfig>,
    mut timers: ResMut<SpawnTimers>,
    mut rng: ResMut<SimRng>,
    mut ids: ResMut<IdAllocator>,
    enemies: Query<(), With<Enemy>>,
    nodes: Query<(), With<ResourceNode>>,
) {
    timers.enemy += dt.0;
    timers.node += dt.0;

    let enemy_cap = config.enemy_cap(clock.elapsed);
    if timers.enemy >= config.enemy_spawn_seconds && enemies.iter().count() < enemy_cap {
        timers.enemy = 0.0;
        let bundle = roll_enemy(&mut rng.0, &mut ids, &config);
        tracing::debug!(id = bundle.id.0, cap = enemy_cap, "enemy spawned");
        commands.spawn(bundle);
    }

    if timers.node >= config.node_spawn_seconds && nodes.iter().count() < config.node_cap {
        timers.node = 0.0;
        let bundle = roll_node(&mut rng.0, &mut ids, &config);
        tracing::debug!(id = bundle.id.0, "node spawned");
        commands.spawn(bundle);
    }
}
