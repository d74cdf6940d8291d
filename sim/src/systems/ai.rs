//! Hostile entity AI - spawning, pursuit and contact damage.
//!
//! Entities walk straight at the player over the natural terrain. They ignore
//! player-built blocks for both placement and navigation, snapping to
//! [`terrain_height`] at every step.

use crate::components::*;
use crate::config::SimConfig;
use crate::session::PlayerState;
use crate::systems::movement::DeltaTime;
use crate::systems::spawner::{random_column, IdAllocator};
use crate::telemetry::{EventBuffer, SimEvent};
use crate::terrain::{column_of, terrain_height};
use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Below this horizontal distance an entity stops steering.
const ARRIVAL_EPSILON: f32 = 0.01;

/// Contact damage dealt during the most recent frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct FrameContacts(pub Vec<Contact>);

/// One contact hit on the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub enemy: u32,
    pub damage: i32,
}

/// Ground-snapped height of an entity standing at `(x, z)`.
pub fn enemy_ground_y(x: f32, z: f32, config: &SimConfig) -> f32 {
    let column = column_of(x, z);
    terrain_height(column.x, column.y) as f32 + config.enemy_half_height
}

/// Roll a new entity at a random column with a speed drawn from
/// `[base, base + spread)`.
pub fn roll_enemy(rng: &mut impl Rng, ids: &mut IdAllocator, config: &SimConfig) -> EnemyBundle {
    let column = random_column(rng, config.world_radius - config.enemy_margin);
    let (x, z) = (column.x as f32 + 0.5, column.y as f32 + 0.5);
    let position = Vec3::new(x, enemy_ground_y(x, z, config), z);
    let speed = config.enemy_base_speed + rng.gen::<f32>() * config.enemy_speed_spread;
    EnemyBundle::new(ids.next_enemy(), position, config.enemy_health, speed)
}

/// Advance one entity towards `target` and return the contact damage it
/// deals this frame, if any.
///
/// Contact range is measured horizontally, before this frame's move.
pub fn pursue(
    pos: &mut Position,
    facing: &mut Facing,
    speed: f32,
    cooldown: &mut DamageCooldown,
    target: Vec3,
    dt: f32,
    config: &SimConfig,
) -> Option<i32> {
    let dx = target.x - pos.0.x;
    let dz = target.z - pos.0.z;
    let distance = pos.horizontal_distance_to(target);

    if distance > ARRIVAL_EPSILON {
        pos.0.x += dx / distance * speed * dt;
        pos.0.z += dz / distance * speed * dt;
        pos.0.y = enemy_ground_y(pos.0.x, pos.0.z, config);
        facing.0 = (target.x - pos.0.x).atan2(target.z - pos.0.z);
    }

    cooldown.tick(dt);
    if distance < config.contact_range && cooldown.is_ready() {
        cooldown.0 = config.contact_cooldown;
        Some(config.contact_damage)
    } else {
        None
    }
}

/// System that steers every hostile entity and applies contact damage.
pub fn enemy_pursuit_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    mut player: ResMut<PlayerState>,
    mut events: ResMut<EventBuffer>,
    mut contacts: ResMut<FrameContacts>,
    mut query: Query<(&EnemyId, &mut Position, &mut Facing, &PursuitSpeed, &mut DamageCooldown), With<Enemy>>,
) {
    contacts.0.clear();
    let target = player.position;

    for (id, mut pos, mut facing, speed, mut cooldown) in query.iter_mut() {
        let Some(damage) = pursue(&mut pos, &mut facing, speed.0, &mut cooldown, target, dt.0, &config) else {
            continue;
        };

        player.health -= damage;
        contacts.0.push(Contact { enemy: id.0, damage });
        events.push(SimEvent::DamageTaken {
            amount: damage,
            health: player.health,
        });
        tracing::debug!(enemy = id.0, health = player.health, "contact damage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::spawner::SimRng;

    fn ai_world(player_at: Vec3) -> World {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.05));
        world.insert_resource(PlayerState::new(&config, player_at));
        world.insert_resource(config);
        world.insert_resource(EventBuffer::default());
        world.insert_resource(FrameContacts::default());
        world
    }

    fn run(world: &mut World, frames: usize) {
        let mut schedule = Schedule::default();
        schedule.add_systems(enemy_pursuit_system);
        for _ in 0..frames {
            schedule.run(world);
        }
    }

    #[test]
    fn test_roll_enemy_stats() {
        let config = SimConfig::default();
        let mut rng = SimRng::from_seed(Some(9));
        let mut ids = IdAllocator::default();
        for i in 0..50 {
            let bundle = roll_enemy(&mut rng.0, &mut ids, &config);
            assert_eq!(bundle.id.0, i);
            assert_eq!(bundle.health.0, 3);
            assert!(bundle.speed.0 >= 1.8 && bundle.speed.0 < 2.7);
            let p = bundle.position.0;
            assert!(p.x.abs() <= 31.5 && p.z.abs() <= 31.5);
            assert!((p.y - enemy_ground_y(p.x, p.z, &config)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_enemy_moves_towards_player_and_snaps() {
        let mut world = ai_world(Vec3::new(10.5, 6.0, 0.5));
        let config = SimConfig::default();
        let start = Vec3::new(0.5, enemy_ground_y(0.5, 0.5, &config), 0.5);
        let enemy = world.spawn(EnemyBundle::new(0, start, 3, 2.0)).id();

        run(&mut world, 1);

        let pos = world.get::<Position>(enemy).unwrap().0;
        assert!((pos.x - 0.6).abs() < 1e-5);
        assert!((pos.z - 0.5).abs() < 1e-5);
        assert!((pos.y - enemy_ground_y(pos.x, pos.z, &config)).abs() < 1e-5);
        let facing = world.get::<Facing>(enemy).unwrap().0;
        assert!((facing - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_contact_damage_is_periodic() {
        let mut world = ai_world(Vec3::new(0.5, 6.0, 0.5));
        world.spawn(EnemyBundle::new(0, Vec3::new(1.5, 4.0, 0.5), 3, 0.0));

        run(&mut world, 1);
        assert_eq!(world.resource::<PlayerState>().health, 92);
        assert_eq!(world.resource::<FrameContacts>().0, vec![Contact { enemy: 0, damage: 8 }]);

        // Cooldown of 1s: no damage for the next 19 frames.
        run(&mut world, 19);
        assert_eq!(world.resource::<PlayerState>().health, 92);
        assert!(world.resource::<FrameContacts>().0.is_empty());

        run(&mut world, 2);
        assert_eq!(world.resource::<PlayerState>().health, 84);
        assert_eq!(world.resource::<EventBuffer>().len(), 2);
    }

    #[test]
    fn test_no_damage_out_of_range() {
        let mut world = ai_world(Vec3::new(0.5, 6.0, 0.5));
        world.spawn(EnemyBundle::new(0, Vec3::new(4.5, 4.0, 0.5), 3, 0.0));
        run(&mut world, 30);
        assert_eq!(world.resource::<PlayerState>().health, 100);
    }

    #[test]
    fn test_contact_ignores_height_difference() {
        // Horizontal range only: standing on a tall tower does not protect.
        let mut world = ai_world(Vec3::new(0.5, 40.0, 0.5));
        world.spawn(EnemyBundle::new(0, Vec3::new(1.0, 4.0, 0.5), 3, 0.0));
        run(&mut world, 1);
        assert_eq!(world.resource::<PlayerState>().health, 92);
    }
}
