use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use vq_sim::{terrain_height, Ray, SimConfig, SimWorld, VoxelWorld};

fn bench_height_field(c: &mut Criterion) {
    c.bench_function("terrain_height_70x70", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for x in -35..35 {
                for z in -35..35 {
                    sum += terrain_height(black_box(x), black_box(z)) as i64;
                }
            }
            black_box(sum)
        })
    });
}

fn bench_world_generation(c: &mut Criterion) {
    c.bench_function("voxel_world_generate", |b| {
        b.iter(|| black_box(VoxelWorld::generate(black_box(34)).generated_count()))
    });
}

/// Steady-state frame with a full arena: max enemies plus every node.
fn bench_crowded_frame(c: &mut Criterion) {
    let mut sim = SimWorld::with_config(SimConfig {
        target_resources: u32::MAX,
        ..SimConfig::seeded(7)
    });
    if sim.start_offline("bench").is_err() {
        return;
    }
    sim.player_mut().health = i32::MAX / 2;
    for i in 0..18 {
        let angle = i as f32 / 18.0 * std::f32::consts::TAU;
        sim.spawn_enemy_at(angle.cos() * 25.0, angle.sin() * 25.0);
    }
    sim.input_mut().forward = true;

    c.bench_function("crowded_frame", |b| {
        b.iter(|| {
            sim.step(black_box(0.016));
            sim.drain_events();
        })
    });
}

fn bench_hitscan(c: &mut Criterion) {
    let mut sim = SimWorld::with_config(SimConfig {
        enemy_health: i32::MAX,
        ..SimConfig::seeded(9)
    });
    if sim.start_offline("bench").is_err() {
        return;
    }
    for i in 0..18 {
        sim.spawn_enemy_at(-9.0 + i as f32, -20.0);
    }
    let eye = sim.player().position;

    c.bench_function("hitscan_18_targets", |b| {
        b.iter(|| black_box(sim.fire(&Ray::new(eye, black_box(Vec3::new(0.0, -0.1, -1.0))))))
    });
}

criterion_group!(
    benches,
    bench_height_field,
    bench_world_generation,
    bench_crowded_frame,
    bench_hitscan
);
criterion_main!(benches);
