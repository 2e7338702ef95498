use bevy_stable_fluid::{FluidConfig, FluidSim, ObstacleKind, ObstacleOptions};
use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec2;

fn bench_step(c: &mut Criterion) {
    let mut sim = FluidSim::cpu(128, 128, FluidConfig::default()).expect("cpu sim");
    sim.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::radius(0.08));
    sim.seed_velocity(|uv| Vec2::new(uv.y - 0.5, 0.5 - uv.x));

    let pointer = sim.pointer();
    pointer.press(Vec2::new(0.25, 0.25));

    let mut x = 0.25;
    c.bench_function("step_128x128_20iters", |b| {
        b.iter(|| {
            x = if x > 0.75 { 0.25 } else { x + 0.005 };
            pointer.move_to(Vec2::new(x, 0.25));
            sim.step(1.0 / 60.0)
        })
    });

    c.bench_function("render_128x128", |b| b.iter(|| sim.render().width()));
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
