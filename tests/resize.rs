use bevy_stable_fluid::{FluidConfig, FluidSim, Grid, ObstacleKind, ObstacleOptions};
use glam::Vec2;

fn sim(width: u32, height: u32, config: FluidConfig) -> FluidSim {
    FluidSim::cpu(width, height, config).expect("cpu simulation builds")
}

fn assert_extent(sim: &FluidSim, expected: (u32, u32)) {
    assert_eq!(sim.velocity().read().extent(), expected);
    assert_eq!(sim.velocity().write().extent(), expected);
    assert_eq!(sim.pressure().read().extent(), expected);
    assert_eq!(sim.pressure().write().extent(), expected);
    assert_eq!(sim.divergence().extent(), expected);
    assert_eq!(sim.obstacle_mask().extent(), expected);
}

#[test]
fn every_field_follows_the_grid() {
    let mut fluid = sim(640, 480, FluidConfig::default().with_sim_scale(2.0));
    assert_eq!(fluid.grid(), Grid { width: 320, height: 240 });
    assert_extent(&fluid, (320, 240));

    fluid.resize(Some(1000), Some(600)).expect("resize");
    assert_eq!(fluid.grid(), Grid { width: 500, height: 300 });
    assert_extent(&fluid, (500, 300));
    assert_eq!((fluid.surface().width(), fluid.surface().height()), (1000, 600));
}

#[test]
fn fractional_scale_floors() {
    let mut fluid = sim(64, 64, FluidConfig::default().with_sim_scale(3.0));
    fluid.resize(Some(1000), Some(600)).expect("resize");
    assert_extent(&fluid, (333, 200));
}

#[test]
fn missing_dimension_is_kept() {
    let mut fluid = sim(120, 80, FluidConfig::default());
    fluid.resize(None, Some(40)).expect("resize");
    assert_eq!(fluid.grid(), Grid { width: 120, height: 40 });
    fluid.resize(Some(60), None).expect("resize");
    assert_eq!(fluid.grid(), Grid { width: 60, height: 40 });
}

#[test]
fn resize_starts_from_rest() {
    let mut fluid = sim(48, 48, FluidConfig::default());
    fluid.seed_velocity(|uv| (uv - Vec2::splat(0.5)) * 4.0);
    fluid.step(1.0 / 60.0);
    assert!(fluid.pressure().read().values().iter().any(|p| *p != 0.0));

    fluid.resize(Some(40), Some(30)).expect("resize");
    assert!(fluid.velocity().read().values().iter().all(|v| *v == 0.0));
    assert!(fluid.pressure().read().values().iter().all(|p| *p == 0.0));
    assert!(fluid.divergence().values().iter().all(|d| *d == 0.0));
}

#[test]
fn obstacles_survive_resize() {
    let mut fluid = sim(64, 64, FluidConfig::default());
    fluid.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::radius(0.1));

    fluid.resize(Some(100), Some(50)).expect("resize");
    assert_eq!(fluid.obstacles().len(), 1);
    assert!(fluid.obstacle_mask().texel(50, 25).x > 0.9);
    assert_eq!(fluid.obstacle_mask().texel(2, 2).x, 0.0);
}
