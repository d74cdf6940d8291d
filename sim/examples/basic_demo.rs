//! Basic demonstration of the Voxel Quest simulation.
//!
//! Run with: cargo run --example basic_demo

use glam::Vec3;
use vq_sim::{OfflineSink, Ray, SimConfig, SimWorld};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== Voxel Quest - Simulation Demo ===\n");

    let mut sim = SimWorld::with_config(SimConfig::seeded(2024));
    let mut sink = OfflineSink;
    if let Err(err) = sim.start(&mut sink, "demo-bot") {
        eprintln!("could not start: {err}");
        return;
    }

    // A scripted bot: circle the arena, shoot whatever is closest, build when rich.
    println!("Running until the session ends (max 120 seconds at 20 frames/sec)...\n");
    for frame in 0..2400u32 {
        let heading = frame as f32 * 0.004;
        {
            let mut input = sim.input_mut();
            input.forward = frame % 200 < 150;
            input.look = Vec3::new(heading.sin(), 0.0, -heading.cos());
        }
        if frame % 60 == 0 {
            sim.request_jump();
        }

        if frame % 10 == 0 {
            let snapshot = sim.snapshot();
            let eye = sim.player().position;
            let nearest = snapshot
                .enemies
                .iter()
                .map(|e| Vec3::new(e.x, e.y, e.z))
                .min_by(|a, b| a.distance(eye).total_cmp(&b.distance(eye)));
            if let Some(target) = nearest {
                let outcome = sim.fire(&Ray::new(eye, target - eye));
                println!("  t={:>5.1}s shot: {:?}", sim.elapsed(), outcome);
            }
        }

        if sim.player().resources >= 6 {
            if let Some(cell) = sim.build() {
                println!("  t={:>5.1}s built block at {}", sim.elapsed(), cell);
            }
        }

        sim.step(0.05);
        sim.pump(&mut sink);

        if (frame + 1) % 200 == 0 {
            let hud = sim.hud();
            println!(
                "--- t={}s hp={} score={} crystals={} kills={} max_combo={} ---",
                hud.elapsed_seconds, hud.health, hud.score, hud.resources, hud.kills, hud.max_combo
            );
        }

        if !sim.phase().is_running() {
            break;
        }
    }

    match sim.summary() {
        Some(summary) => {
            println!("\n=== Session Summary ===\n");
            println!("{}", serde_json::to_string_pretty(summary).unwrap());
        }
        None => println!("\nSession still running after the demo budget."),
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}
