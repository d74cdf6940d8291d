//! Deferred work queue.
//!
//! One-shot tasks (currently node respawns) are stored with the session time
//! they fall due and drained once per frame. The queue lives in the ECS world
//! and is cleared on every session reset, so nothing scheduled in one session
//! can fire into the next.
//!
//! A due respawn always spawns, even at `node_cap`: the cap is enforced by the
//! spawner alone, so the live count can briefly reach `node_cap + 1`.

use crate::config::SimConfig;
use crate::session::SessionClock;
use crate::systems::nodes::roll_node;
use crate::systems::spawner::{IdAllocator, SimRng};
use bevy_ecs::prelude::*;

/// Kind of deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    RespawnNode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTask {
    pub due_at: f64,
    pub kind: TaskKind,
}

/// Pending one-shot tasks.
#[derive(Resource, Debug, Default)]
pub struct TaskQueue {
    tasks: Vec<ScheduledTask>,
}

impl TaskQueue {
    pub fn schedule(&mut self, due_at: f64, kind: TaskKind) {
        self.tasks.push(ScheduledTask { due_at, kind });
    }

    /// Remove and return every task due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: f64) -> Vec<ScheduledTask> {
        let mut due: Vec<ScheduledTask> = Vec::new();
        self.tasks.retain(|task| {
            if task.due_at <= now {
                due.push(*task);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_at.total_cmp(&b.due_at));
        due
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

/// System that runs due tasks against the current world.
pub fn task_queue_system(
    mut commands: Commands,
    clock: Res<SessionClock>,
    config: Res<SimConfig>,
    mut queue: ResMut<TaskQueue>,
    mut rng: ResMut<SimRng>,
    mut ids: ResMut<IdAllocator>,
) {
    for task in queue.take_due(clock.elapsed) {
        match task.kind {
            TaskKind::RespawnNode => {
                let bundle = roll_node(&mut rng.0, &mut ids, &config);
                tracing::debug!(id = bundle.id.0, "node respawned");
                commands.spawn(bundle);
            }
        }
    }
}
