//! Session state: the phase machine, the player's stats and win/loss rules.

use crate::config::SimConfig;
use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionResult {
    Victory,
    Defeat,
}

impl SessionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionResult::Victory => "victory",
            SessionResult::Defeat => "defeat",
        }
    }
}

/// Lifecycle phase. Idle → Running → Ended → Idle; nothing else is legal.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Ended(SessionResult),
}

impl SessionPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, SessionPhase::Running)
    }
}

/// Session clock. `elapsed` accumulates the unclamped frame delta.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SessionClock {
    pub tick: u64,
    pub elapsed: f64,
}

impl SessionClock {
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed += dt;
    }

    /// Whole seconds survived so far.
    pub fn whole_seconds(&self) -> u32 {
        self.elapsed.max(0.0).floor() as u32
    }
}

/// Everything the session tracks about the player.
///
/// `health` may dip below zero on the frame the player dies; displays clamp it.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Eye position.
    pub position: Vec3,
    pub velocity_y: f32,
    pub health: i32,
    pub score: u32,
    pub resources: u32,
    pub kills: u32,
    pub combo: u32,
    pub max_combo: u32,
    /// Session time (seconds) of the most recent kill.
    pub last_kill_at: Option<f64>,
}

impl PlayerState {
    pub fn new(config: &SimConfig, position: Vec3) -> Self {
        Self {
            position,
            velocity_y: 0.0,
            health: config.start_health,
            score: 0,
            resources: 0,
            kills: 0,
            combo: 0,
            max_combo: 0,
            last_kill_at: None,
        }
    }

    pub fn displayed_health(&self) -> i32 {
        self.health.max(0)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Record a kill at session time `now` and return the resulting combo.
    ///
    /// Kills at most `window_ms` apart extend the combo; a longer gap
    /// restarts it at 1.
    pub fn register_kill(&mut self, now: f64, window_ms: f64) -> u32 {
        self.combo = match self.last_kill_at {
            Some(last) if (now - last) * 1000.0 <= window_ms => self.combo + 1,
            _ => 1,
        };
        self.last_kill_at = Some(now);
        self.max_combo = self.max_combo.max(self.combo);
        self.kills += 1;
        self.combo
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&SimConfig::default(), Vec3::ZERO)
    }
}

/// Decide whether the session ends this frame. Defeat takes precedence;
/// victory needs both the survival time and the resource target at once.
pub fn evaluate_outcome(player: &PlayerState, elapsed: f64, config: &SimConfig) -> Option<SessionResult> {
    if player.is_dead() {
        Some(SessionResult::Defeat)
    } else if elapsed >= config.target_survival_seconds && player.resources >= config.target_resources {
        Some(SessionResult::Victory)
    } else {
        None
    }
}

/// Final tally handed to the persistence layer. Field names match the
/// backend's session-end body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub result: SessionResult,
    pub score: u32,
    pub crystals: u32,
    pub enemies_defeated: u32,
    pub survived_seconds: u32,
    pub max_combo: u32,
}

impl SessionSummary {
    pub fn new(result: SessionResult, player: &PlayerState, clock: &SessionClock) -> Self {
        Self {
            result,
            score: player.score,
            crystals: player.resources,
            enemies_defeated: player.kills,
            survived_seconds: clock.whole_seconds(),
            max_combo: player.max_combo,
        }
    }
}
