use bevy_stable_fluid::obstacle::{rebuild_mask, DEFAULT_OBSTACLE_RADIUS};
use bevy_stable_fluid::{
    Backend, CpuBackend, FluidConfig, FluidSim, Grid, KernelKind, Obstacle, ObstacleKind,
    ObstacleOptions, ShaderSources,
};

fn sim(width: u32, height: u32) -> FluidSim {
    FluidSim::cpu(width, height, FluidConfig::default())
        .expect("cpu simulation builds")
}

#[test]
fn overlapping_obstacles_add_up() {
    let mut fluid = sim(64, 64);
    let options = ObstacleOptions::radius(0.1);
    fluid.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, options);
    fluid.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, options);

    let centre = fluid.obstacle_mask().texel(32, 32).x;
    assert!((centre - 2.0).abs() < 1e-5, "centre is {centre}");
}

#[test]
fn insertion_order_does_not_matter() {
    let a = (0.3, 0.4, ObstacleOptions::radius(0.12));
    let b = (0.4, 0.45, ObstacleOptions::radius(0.08));

    let mut forward = sim(64, 48);
    forward.add_obstacle(ObstacleKind::Circle, a.0, a.1, a.2);
    forward.add_obstacle(ObstacleKind::Circle, b.0, b.1, b.2);

    let mut reversed = sim(64, 48);
    reversed.add_obstacle(ObstacleKind::Circle, b.0, b.1, b.2);
    reversed.add_obstacle(ObstacleKind::Circle, a.0, a.1, a.2);

    assert_eq!(
        forward.obstacle_mask().values(),
        reversed.obstacle_mask().values()
    );
}

#[test]
fn rebuilding_gives_the_same_mask() {
    let sources = ShaderSources::embedded();
    let mut backend = CpuBackend::new();
    let kernel = backend
        .compile_kernel(
            KernelKind::Obstacle,
            sources.vertex(),
            sources.fragment(KernelKind::Obstacle),
        )
        .expect("obstacle kernel compiles");

    let grid = Grid { width: 40, height: 30 };
    let obstacles = [
        Obstacle::new(ObstacleKind::Circle, 0.25, 0.5, ObstacleOptions::radius(0.1)),
        Obstacle::new(ObstacleKind::Circle, 0.3, 0.55, ObstacleOptions::default()),
    ];

    let first = rebuild_mask(&mut backend, &kernel, grid, &obstacles).expect("mask");
    let second = rebuild_mask(&mut backend, &kernel, grid, &obstacles).expect("mask");
    assert_ne!(first.id(), second.id());
    assert_eq!(first.values(), second.values());
    assert!(first.values().iter().any(|w| *w > 1.0));
}

#[test]
fn same_size_resize_keeps_the_mask() {
    let mut fluid = sim(50, 40);
    fluid.add_obstacle(ObstacleKind::Circle, 0.6, 0.3, ObstacleOptions::radius(0.15));
    let before = fluid.obstacle_mask().values().to_vec();

    fluid.resize(None, None).expect("resize");
    assert_eq!(fluid.obstacle_mask().values(), before.as_slice());
}

#[test]
fn unusable_radius_falls_back_to_default() {
    let missing = Obstacle::new(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::default());
    let zero = Obstacle::new(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::radius(0.0));
    let negative = Obstacle::new(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::radius(-1.0));
    for obstacle in [missing, zero, negative] {
        assert_eq!(obstacle.radius, DEFAULT_OBSTACLE_RADIUS);
    }

    let mut fluid = sim(64, 64);
    let added = fluid.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::default());
    assert_eq!(added.radius, 0.05);
    assert_eq!(fluid.obstacles(), &[added]);
}

#[test]
fn obstacles_are_round_on_screen() {
    // 2:1 grid, one cell per pixel
    let mut fluid = sim(200, 100);
    fluid.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::radius(0.1));
    let mask = fluid.obstacle_mask();

    for y in [49, 50] {
        assert!((mask.texel(106, y).x - 1.0).abs() < 1e-5);
        assert!((mask.texel(93, y).x - 1.0).abs() < 1e-5);
        assert_eq!(mask.texel(112, y).x, 0.0);
        assert_eq!(mask.texel(87, y).x, 0.0);
    }
    for x in [99, 100] {
        assert!((mask.texel(x, 56).x - 1.0).abs() < 1e-5);
        assert!((mask.texel(x, 43).x - 1.0).abs() < 1e-5);
        assert_eq!(mask.texel(x, 61).x, 0.0);
        assert_eq!(mask.texel(x, 38).x, 0.0);
    }
}

#[test]
fn clearing_obstacles_empties_the_mask() {
    let mut fluid = sim(32, 32);
    fluid.add_obstacle(ObstacleKind::Circle, 0.5, 0.5, ObstacleOptions::radius(0.2));
    assert!(fluid.obstacle_mask().values().iter().any(|w| *w > 0.0));

    fluid.clear_obstacles();
    assert!(fluid.obstacles().is_empty());
    assert!(fluid.obstacle_mask().values().iter().all(|w| *w == 0.0));
}
