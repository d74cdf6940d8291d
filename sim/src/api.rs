//! Public API for the simulation.
//!
//! This module provides the main interface for a host (renderer, input layer,
//! network client) to drive the simulation.
//!
//! ## Session Lifecycle
//!
//! `Idle -> Running -> Ended -> Idle`. [`SimWorld::start`] only succeeds from
//! Idle and only after the [`SessionSink`] handshake succeeds.
//! [`SimWorld::restart`] only succeeds from Ended. Stepping, firing and
//! building outside Running are no-ops.
//!
//! ## Variable Timestep
//!
//! `step(dt)` runs exactly one frame. Physics, AI and spawn timers see `dt`
//! clamped to `max_frame_delta`; the session clock accumulates `dt` as given.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::session::*;
use crate::systems::*;
use crate::telemetry::{EventBuffer, SessionSink, SessionTicket, SimEvent};
use crate::terrain::{terrain_height, TerrainSnapshot, VoxelWorld};
use crate::world::{HudSnapshot, Snapshot};
use bevy_ecs::prelude::*;
use glam::{IVec3, Vec3};

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Starting, ending and restarting sessions
/// - Stepping the simulation forward
/// - Player actions (fire, build)
/// - Extracting state snapshots and telemetry
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    /// Final tally of the last session that ended, until restart.
    summary: Option<SessionSummary>,
    /// Whether `summary` has been handed to a sink.
    summary_reported: bool,
}

impl SimWorld {
    /// Create a new idle simulation world.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new idle simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();

        let voxels = VoxelWorld::generate(config.world_radius);
        let spawn = spawn_point(&voxels, &config);

        world.insert_resource(DeltaTime(config.max_frame_delta));
        world.insert_resource(SessionClock::default());
        world.insert_resource(SessionPhase::Idle);
        world.insert_resource(PlayerState::new(&config, spawn));
        world.insert_resource(PlayerInput::default());
        world.insert_resource(SimRng::from_seed(config.seed));
        world.insert_resource(IdAllocator::default());
        world.insert_resource(SpawnTimers::default());
        world.insert_resource(TaskQueue::default());
        world.insert_resource(EventBuffer::default());
        world.insert_resource(FrameContacts::default());
        world.insert_resource(voxels);
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                player_physics_system,
                node_bob_system,
                node_pickup_system,
                task_queue_system,
                enemy_pursuit_system,
                spawner_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            summary: None,
            summary_reported: false,
        }
    }

    /// Create an idle world from a (possibly partial) JSON configuration.
    pub fn from_json_config(json: &str) -> Result<Self, SimError> {
        Ok(Self::with_config(SimConfig::from_json_str(json)?))
    }

    /// Start a session for `player_name`.
    ///
    /// Fails without touching the world if the phase is not Idle, the trimmed
    /// name is too short, or the sink's handshake fails.
    pub fn start(&mut self, sink: &mut dyn SessionSink, player_name: &str) -> Result<SessionTicket, SimError> {
        let phase = self.phase();
        if phase != SessionPhase::Idle {
            return Err(SimError::InvalidTransition { from: phase });
        }

        let name = player_name.trim();
        let min = self.config().min_name_len;
        if name.chars().count() < min {
            return Err(SimError::InvalidPlayerName { min });
        }

        let ticket = sink.begin(name)?;

        self.reset();
        self.seed_nodes();
        *self.world.resource_mut::<SessionPhase>() = SessionPhase::Running;
        self.world
            .resource_mut::<EventBuffer>()
            .push(SimEvent::SessionReady { player: name.to_string() });

        tracing::info!(
            player = name,
            session = ?ticket.session_id,
            nodes = self.node_count(),
            "session started"
        );
        Ok(ticket)
    }

    /// Start a session with no external service.
    pub fn start_offline(&mut self, player_name: &str) -> Result<SessionTicket, SimError> {
        self.start(&mut crate::telemetry::OfflineSink, player_name)
    }

    /// Step the simulation forward by one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if !self.phase().is_running() {
            return;
        }

        let dt = dt.max(0.0);
        let clamped = dt.min(self.config().max_frame_delta);
        self.world.resource_mut::<DeltaTime>().0 = clamped;
        self.world.resource_mut::<SessionClock>().advance(dt as f64);

        self.schedule.run(&mut self.world);

        let outcome = evaluate_outcome(
            self.world.resource::<PlayerState>(),
            self.elapsed(),
            self.world.resource::<SimConfig>(),
        );
        if let Some(result) = outcome {
            self.end(result);
        }
    }

    fn end(&mut self, result: SessionResult) {
        let summary = SessionSummary::new(
            result,
            self.world.resource::<PlayerState>(),
            self.world.resource::<SessionClock>(),
        );
        *self.world.resource_mut::<SessionPhase>() = SessionPhase::Ended(result);
        self.world.resource_mut::<PlayerInput>().release();

        tracing::info!(
            result = result.as_str(),
            score = summary.score,
            crystals = summary.crystals,
            kills = summary.enemies_defeated,
            seconds = summary.survived_seconds,
            max_combo = summary.max_combo,
            "session ended"
        );
        self.summary = Some(summary);
        self.summary_reported = false;
    }

    /// Leave the Ended phase and return to Idle with an empty arena.
    /// Returns false (and does nothing) from any other phase.
    pub fn restart(&mut self) -> bool {
        if !matches!(self.phase(), SessionPhase::Ended(_)) {
            return false;
        }
        self.reset();
        self.summary = None;
        self.summary_reported = false;
        *self.world.resource_mut::<SessionPhase>() = SessionPhase::Idle;
        tracing::info!("session reset");
        true
    }

    /// Clear every per-session collection and put the player back at spawn.
    fn reset(&mut self) {
        let mut entities = self.world.query_filtered::<Entity, Or<(With<Enemy>, With<ResourceNode>)>>();
        let doomed: Vec<Entity> = entities.iter(&self.world).collect();
        for entity in doomed {
            self.world.despawn(entity);
        }

        self.world.resource_mut::<VoxelWorld>().clear_built();
        let config = self.config().clone();
        let spawn = spawn_point(self.world.resource::<VoxelWorld>(), &config);

        self.world.insert_resource(PlayerState::new(&config, spawn));
        self.world.insert_resource(SessionClock::default());
        self.world.insert_resource(IdAllocator::default());
        self.world.insert_resource(SpawnTimers::default());
        self.world.insert_resource(FrameContacts::default());
        self.world.resource_mut::<TaskQueue>().clear();
        self.world.resource_mut::<EventBuffer>().clear();
        self.world.resource_mut::<PlayerInput>().release();
    }

    fn seed_nodes(&mut self) {
        let count = self.config().initial_nodes;
        let bundles: Vec<NodeBundle> = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let config = world.resource::<SimConfig>().clone();
            let mut ids = world.resource_mut::<IdAllocator>();
            (0..count).map(|_| roll_node(&mut rng.0, &mut ids, &config)).collect()
        });
        self.world.spawn_batch(bundles);
    }

    /// Fire a hit-scan shot along `ray`.
    pub fn fire(&mut self, ray: &Ray) -> ShotOutcome {
        if !self.phase().is_running() {
            return ShotOutcome::Miss;
        }
        fire_hitscan(&mut self.world, ray)
    }

    /// Ray from the player's eye along the camera look direction.
    pub fn camera_ray(&self) -> Ray {
        let eye = self.player().position;
        Ray::new(eye, self.world.resource::<PlayerInput>().look)
    }

    pub fn fire_from_camera(&mut self) -> ShotOutcome {
        let ray = self.camera_ray();
        self.fire(&ray)
    }

    /// Place a block in front of the player. Returns the cell on success.
    pub fn build(&mut self) -> Option<IVec3> {
        if !self.phase().is_running() {
            return None;
        }
        try_build(&mut self.world)
    }

    /// Forward buffered events to `sink`, then the final summary if the
    /// session ended since the last pump. Returns the number of events sent.
    ///
    /// A failed `finish` is logged; the summary stays available either way.
    pub fn pump(&mut self, sink: &mut dyn SessionSink) -> usize {
        let events = self.drain_events();
        for event in &events {
            sink.record(event);
        }

        if !self.summary_reported {
            if let Some(summary) = &self.summary {
                self.summary_reported = true;
                if let Err(err) = sink.finish(summary) {
                    tracing::warn!(%err, "session result was not persisted");
                }
            }
        }
        events.len()
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world.resource_mut::<EventBuffer>().drain()
    }

    pub fn phase(&self) -> SessionPhase {
        *self.world.resource::<SessionPhase>()
    }

    /// Final tally of the ended session, if any.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn player(&self) -> &PlayerState {
        self.world.resource::<PlayerState>()
    }

    pub fn player_mut(&mut self) -> Mut<'_, PlayerState> {
        self.world.resource_mut::<PlayerState>()
    }

    pub fn input(&self) -> &PlayerInput {
        self.world.resource::<PlayerInput>()
    }

    pub fn input_mut(&mut self) -> Mut<'_, PlayerInput> {
        self.world.resource_mut::<PlayerInput>()
    }

    /// Replace the held input, keeping any jump request already buffered.
    pub fn set_input(&mut self, input: PlayerInput) {
        let mut current = self.input_mut();
        let jump = current.jump || input.jump;
        *current = PlayerInput { jump, ..input };
    }

    pub fn request_jump(&mut self) {
        self.input_mut().request_jump();
    }

    pub fn voxels(&self) -> &VoxelWorld {
        self.world.resource::<VoxelWorld>()
    }

    /// Get the number of live hostile entities.
    pub fn enemy_count(&mut self) -> usize {
        let mut query = self.world.query_filtered::<(), With<Enemy>>();
        query.iter(&self.world).count()
    }

    /// Get the number of live resource nodes.
    pub fn node_count(&mut self) -> usize {
        let mut query = self.world.query_filtered::<(), With<ResourceNode>>();
        query.iter(&self.world).count()
    }

    /// Spawn a hostile entity on the terrain at `(x, z)`. Returns its id.
    pub fn spawn_enemy_at(&mut self, x: f32, z: f32) -> u32 {
        let config = self.config().clone();
        let id = self.world.resource_mut::<IdAllocator>().next_enemy();
        let position = Vec3::new(x, enemy_ground_y(x, z, &config), z);
        self.world.spawn(EnemyBundle::new(
            id,
            position,
            config.enemy_health,
            config.enemy_base_speed,
        ));
        id
    }

    /// Spawn a resource node resting above the terrain at `(x, z)`. Returns its id.
    pub fn spawn_node_at(&mut self, x: f32, z: f32) -> u32 {
        let hover = self.config().node_hover;
        let id = self.world.resource_mut::<IdAllocator>().next_node();
        let column = crate::terrain::column_of(x, z);
        let y = terrain_height(column.x, column.y) as f32 + hover;
        self.world.spawn(NodeBundle::new(id, Vec3::new(x, y, z)));
        id
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        snapshot_to_json_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::from_state(self.player(), self.world.resource::<SessionClock>())
    }

    /// Get the generated terrain heights (for initial world display).
    pub fn terrain_snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot::from_world(self.voxels())
    }

    /// Get terrain snapshot as JSON.
    pub fn terrain_snapshot_json(&self) -> String {
        terrain_to_json_string(&self.terrain_snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SessionClock>().tick
    }

    /// Get the elapsed session time.
    pub fn elapsed(&self) -> f64 {
        self.world.resource::<SessionClock>().elapsed
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Player eye position at session start: above the origin column.
fn spawn_point(voxels: &VoxelWorld, config: &SimConfig) -> Vec3 {
    Vec3::new(0.0, voxels.ground_height_at(0, 0) as f32 + config.spawn_height, 0.0)
}
