//! ECS Systems for the arena simulation.
//!
//! Systems contain the game logic that operates on components and resources.
//!
//! ## Frame Order
//!
//! One frame runs a single chained schedule, in this order:
//!
//! 1. `player_physics_system` - input, gravity, ground snap, world bounds
//! 2. `node_bob_system` - cosmetic node bobbing
//! 3. `node_pickup_system` - collects nodes in reach, schedules respawns
//! 4. `task_queue_system` - runs deferred tasks that have fallen due
//! 5. `enemy_pursuit_system` - hostile steering and contact damage
//! 6. `spawner_system` - spawn timers and difficulty cap
//!
//! Termination is evaluated by [`crate::SimWorld::step`] after the schedule.
//! Shooting and building are discrete actions in [`combat`] and
//! [`construction`], not systems.

pub mod ai;
pub mod combat;
pub mod construction;
pub mod movement;
pub mod nodes;
pub mod scheduler;
pub mod serialization;
pub mod spawner;

pub use ai::*;
pub use combat::*;
pub use construction::*;
pub use movement::*;
pub use nodes::*;
pub use scheduler::*;
pub use serialization::*;
pub use spawner::*;
