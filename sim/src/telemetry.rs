//! Telemetry events and the seam to the external session service.
//!
//! The simulation never touches the network. It buffers [`SimEvent`]s during a
//! frame, and the host forwards them to a [`SessionSink`] with
//! [`crate::SimWorld::pump`]. Delivery is fire-and-forget: the simulation
//! never looks at the outcome of `record`.

use crate::error::SimError;
use crate::session::SessionSummary;
use crate::systems::serialization::summary_to_json_string;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A discrete gameplay event worth reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    SessionReady { player: String },
    CollectCrystal { reward: u32, crystals: u32 },
    DamageTaken { amount: i32, health: i32 },
    EnemyDefeated { combo: u32 },
    BuildBlock { x: i32, y: i32, z: i32 },
}

impl SimEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SimEvent::SessionReady { .. } => "session_ready",
            SimEvent::CollectCrystal { .. } => "collect_crystal",
            SimEvent::DamageTaken { .. } => "damage_taken",
            SimEvent::EnemyDefeated { .. } => "enemy_defeated",
            SimEvent::BuildBlock { .. } => "build_block",
        }
    }

    pub fn event_value(&self) -> i64 {
        match self {
            SimEvent::CollectCrystal { reward, .. } => *reward as i64,
            SimEvent::DamageTaken { amount, .. } => *amount as i64,
            SimEvent::SessionReady { .. }
            | SimEvent::EnemyDefeated { .. }
            | SimEvent::BuildBlock { .. } => 1,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            SimEvent::SessionReady { player } => json!({ "player": player }),
            SimEvent::CollectCrystal { crystals, .. } => json!({ "crystals": crystals }),
            SimEvent::DamageTaken { health, .. } => json!({ "health": health }),
            SimEvent::EnemyDefeated { combo } => json!({ "combo": combo }),
            SimEvent::BuildBlock { x, y, z } => json!({ "x": x, "y": y, "z": z }),
        }
    }

    /// Wire form: `{ event_type, event_value, payload }`.
    pub fn to_wire(&self) -> Value {
        json!({
            "event_type": self.event_type(),
            "event_value": self.event_value(),
            "payload": self.payload(),
        })
    }
}

/// Events produced since the last drain.
#[derive(Resource, Debug, Default)]
pub struct EventBuffer {
    events: Vec<SimEvent>,
}

impl EventBuffer {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Identifiers handed back by a successful start handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTicket {
    pub player_id: Option<i64>,
    pub session_id: Option<i64>,
}

/// External session service (registration, telemetry, persistence).
pub trait SessionSink {
    /// Register the player and open a session. The simulation only starts
    /// running once this succeeds.
    fn begin(&mut self, player_name: &str) -> Result<SessionTicket, SimError>;

    /// Report a gameplay event. Failures are the sink's business.
    fn record(&mut self, event: &SimEvent);

    /// Persist the final summary.
    fn finish(&mut self, summary: &SessionSummary) -> Result<(), SimError>;
}

/// Sink that keeps everything local and only logs.
#[derive(Debug, Default)]
pub struct OfflineSink;

impl SessionSink for OfflineSink {
    fn begin(&mut self, player_name: &str) -> Result<SessionTicket, SimError> {
        tracing::info!(player = player_name, "offline session opened");
        Ok(SessionTicket::default())
    }

    fn record(&mut self, event: &SimEvent) {
        tracing::trace!(event_type = event.event_type(), value = event.event_value(), "event");
    }

    fn finish(&mut self, summary: &SessionSummary) -> Result<(), SimError> {
        let body = summary_to_json_string(summary).map_err(|err| SimError::Persist(err.to_string()))?;
        tracing::info!(result = summary.result.as_str(), %body, "offline session closed");
        Ok(())
    }
}
