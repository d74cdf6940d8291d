//! Voxel Quest - Simulation Core
//!
//! A deterministic, frame-driven ECS simulation of a voxel survival arena:
//! survive, collect crystals, fight off pursuers and stack blocks.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod session;
pub mod systems;
pub mod telemetry;
pub mod terrain;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::SimConfig;
pub use error::SimError;
pub use session::{PlayerState, SessionClock, SessionPhase, SessionResult, SessionSummary};
pub use systems::*;
pub use telemetry::{EventBuffer, OfflineSink, SessionSink, SessionTicket, SimEvent};
pub use terrain::{terrain_height, TerrainSnapshot, VoxelWorld};
pub use world::{HudSnapshot, Snapshot};
