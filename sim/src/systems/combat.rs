//! Combat - hit-scan shots against hostile entities and combo scoring.
//!
//! Shots are discrete actions, not per-frame systems. A shot picks the nearest
//! entity whose bounding box the ray crosses, deals `shot_damage`, and on a
//! kill scores `kill_score + (combo - 1) * combo_bonus`.
//!
//! Terrain and built blocks do not occlude shots.

use crate::components::*;
use crate::config::SimConfig;
use crate::session::{PlayerState, SessionClock};
use crate::telemetry::{EventBuffer, SimEvent};
use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Distance along the ray to an axis-aligned box, if it is hit.
    /// A ray starting inside the box reports its exit distance.
    pub fn intersect_box(&self, center: Vec3, half_extents: Vec3) -> Option<f32> {
        let min = center - half_extents;
        let max = center + half_extents;
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            if dir.abs() < f32::EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (min[axis] - origin) / dir;
            let t2 = (max[axis] - origin) / dir;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_near > t_far || t_far < 0.0 {
            None
        } else if t_near >= 0.0 {
            Some(t_near)
        } else {
            Some(t_far)
        }
    }
}

/// What a shot did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Miss,
    Hit { enemy: u32, remaining: i32 },
    Kill { enemy: u32, combo: u32, points: u32 },
}

/// Nearest live entity hit by `ray` within `fire_range`.
pub fn find_target(world: &mut World, ray: &Ray) -> Option<(Entity, f32)> {
    let config = world.resource::<SimConfig>();
    let half = Vec3::new(config.enemy_half_width, config.enemy_half_height, config.enemy_half_width);
    let range = config.fire_range;

    let mut query = world.query_filtered::<(Entity, &Position, &EnemyHealth), With<Enemy>>();
    query
        .iter(world)
        .filter(|(_, _, health)| health.is_alive())
        .filter_map(|(entity, pos, _)| ray.intersect_box(pos.0, half).map(|t| (entity, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, t)| *t <= range)
}

/// Reduce an entity's health, despawning it when it reaches zero.
///
/// Returns `Some(true)` on death, `Some(false)` if it survived and `None`
/// if the entity is not a live hostile.
pub fn apply_enemy_damage(world: &mut World, entity: Entity, amount: i32) -> Option<bool> {
    let mut health = world.get_mut::<EnemyHealth>(entity)?;
    let died = health.damage(amount);
    if died {
        world.despawn(entity);
    }
    Some(died)
}

/// Damage `entity` and, if it dies, credit the kill to the player.
pub fn strike(world: &mut World, entity: Entity, amount: i32) -> ShotOutcome {
    let Some(id) = world.get::<EnemyId>(entity).copied() else {
        return ShotOutcome::Miss;
    };

    match apply_enemy_damage(world, entity, amount) {
        None => ShotOutcome::Miss,
        Some(false) => {
            let remaining = world.get::<EnemyHealth>(entity).map_or(0, |h| h.0);
            ShotOutcome::Hit { enemy: id.0, remaining }
        }
        Some(true) => {
            let (window, base, bonus) = {
                let config = world.resource::<SimConfig>();
                (config.combo_window_ms, config.kill_score, config.combo_bonus)
            };
            let now = world.resource::<SessionClock>().elapsed;

            let mut player = world.resource_mut::<PlayerState>();
            let combo = player.register_kill(now, window);
            let points = base + (combo - 1) * bonus;
            player.score += points;
            let kills = player.kills;

            world.resource_mut::<EventBuffer>().push(SimEvent::EnemyDefeated { combo });
            tracing::debug!(enemy = id.0, combo, kills, "enemy defeated");
            ShotOutcome::Kill { enemy: id.0, combo, points }
        }
    }
}

/// Fire a hit-scan shot along `ray`.
pub fn fire_hitscan(world: &mut World, ray: &Ray) -> ShotOutcome {
    let Some((entity, _)) = find_target(world, ray) else {
        return ShotOutcome::Miss;
    };
    let damage = world.resource::<SimConfig>().shot_damage;
    strike(world, entity, damage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combat_world(elapsed: f64) -> World {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(SessionClock { tick: 0, elapsed });
        world.insert_resource(PlayerState::new(&config, Vec3::new(0.0, 5.0, 0.0)));
        world.insert_resource(config);
        world.insert_resource(EventBuffer::default());
        world
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_ray_box_intersection() {
        let ray = forward_ray();
        let t = ray.intersect_box(Vec3::new(0.0, 5.0, -10.0), Vec3::splat(0.5)).unwrap();
        assert!((t - 9.5).abs() < 1e-5);
        assert!(ray.intersect_box(Vec3::new(3.0, 5.0, -10.0), Vec3::splat(0.5)).is_none());
        assert!(ray.intersect_box(Vec3::new(0.0, 5.0, 10.0), Vec3::splat(0.5)).is_none());
        // Starting inside reports the exit distance.
        let inside = ray.intersect_box(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5)).unwrap();
        assert!((inside - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_enemy_takes_the_shot() {
        let mut world = combat_world(0.0);
        let far = world.spawn(EnemyBundle::new(0, Vec3::new(0.0, 5.0, -20.0), 3, 2.0)).id();
        let near = world.spawn(EnemyBundle::new(1, Vec3::new(0.0, 5.0, -8.0), 3, 2.0)).id();

        let outcome = fire_hitscan(&mut world, &forward_ray());
        assert_eq!(outcome, ShotOutcome::Hit { enemy: 1, remaining: 2 });
        assert_eq!(world.get::<EnemyHealth>(near).unwrap().0, 2);
        assert_eq!(world.get::<EnemyHealth>(far).unwrap().0, 3);
    }

    #[test]
    fn test_out_of_range_is_miss() {
        let mut world = combat_world(0.0);
        world.spawn(EnemyBundle::new(0, Vec3::new(0.0, 5.0, -46.0), 3, 2.0));
        assert_eq!(fire_hitscan(&mut world, &forward_ray()), ShotOutcome::Miss);
        assert_eq!(world.resource::<PlayerState>().score, 0);
    }

    #[test]
    fn test_kill_scores_and_despawns() {
        let mut world = combat_world(4.0);
        let enemy = world.spawn(EnemyBundle::new(7, Vec3::new(0.0, 5.0, -5.0), 1, 2.0)).id();

        let outcome = fire_hitscan(&mut world, &forward_ray());
        assert_eq!(outcome, ShotOutcome::Kill { enemy: 7, combo: 1, points: 35 });
        assert!(world.get::<EnemyHealth>(enemy).is_none());

        let player = world.resource::<PlayerState>();
        assert_eq!(player.kills, 1);
        assert_eq!(player.score, 35);
        assert_eq!(
            world.resource::<EventBuffer>().events(),
            &[SimEvent::EnemyDefeated { combo: 1 }]
        );
    }

    #[test]
    fn test_combo_bonus_for_rapid_kills() {
        let mut world = combat_world(10.0);
        world.spawn(EnemyBundle::new(0, Vec3::new(0.0, 5.0, -5.0), 1, 2.0));
        world.spawn(EnemyBundle::new(1, Vec3::new(0.0, 5.0, -6.0), 1, 2.0));
        world.spawn(EnemyBundle::new(2, Vec3::new(0.0, 5.0, -7.0), 1, 2.0));

        fire_hitscan(&mut world, &forward_ray());
        world.resource_mut::<SessionClock>().elapsed = 12.0;
        let second = fire_hitscan(&mut world, &forward_ray());
        assert_eq!(second, ShotOutcome::Kill { enemy: 1, combo: 2, points: 40 });

        world.resource_mut::<SessionClock>().elapsed = 15.5;
        let third = fire_hitscan(&mut world, &forward_ray());
        assert_eq!(third, ShotOutcome::Kill { enemy: 2, combo: 1, points: 35 });

        let player = world.resource::<PlayerState>();
        assert_eq!(player.max_combo, 2);
        assert_eq!(player.score, 110);
    }

    #[test]
    fn test_apply_damage_on_missing_entity() {
        let mut world = combat_world(0.0);
        let enemy = world.spawn(EnemyBundle::new(0, Vec3::ZERO, 1, 2.0)).id();
        assert_eq!(apply_enemy_damage(&mut world, enemy, 1), Some(true));
        assert_eq!(apply_enemy_damage(&mut world, enemy, 1), None);
    }
}
