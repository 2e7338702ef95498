use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_stable_fluid::{
    screen_to_uv, FluidConfig, FluidPlugin, FluidSim, FrameDriver, ObstacleKind, ObstacleOptions,
    RunState,
};

const OBSTACLE_RADIUS: f32 = 0.06;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, FrameTimeDiagnosticsPlugin::default()))
        .add_plugins(
            FluidPlugin::default()
                // half-resolution grid keeps the CPU backend interactive
                .with_config(FluidConfig::default().with_sim_scale(2.0))
                .with_obstacle(0.5, 0.5, 0.08)
                .with_obstacle(0.3, 0.65, 0.05),
        )
        .add_systems(Startup, setup)
        .add_systems(Update, (place_obstacle, keyboard_controls, log_fps))
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d::default());
    info!("drag with the left button, right-click to drop an obstacle, C clears, Space pauses");
}

fn place_obstacle(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    sim: Option<ResMut<FluidSim>>,
) {
    if !buttons.just_pressed(MouseButton::Right) {
        return;
    }
    let Some(mut sim) = sim else { return };
    let Ok(window) = windows.single() else { return };
    let Some(cursor) = window.cursor_position() else { return };

    let uv = screen_to_uv(cursor.x, cursor.y, window.width(), window.height());
    let obstacle = sim.add_obstacle(
        ObstacleKind::Circle,
        uv.x,
        uv.y,
        ObstacleOptions::radius(OBSTACLE_RADIUS),
    );
    info!("obstacle #{} at ({:.2}, {:.2})", sim.obstacles().len(), obstacle.position.x, obstacle.position.y);
}

fn keyboard_controls(
    keys: Res<ButtonInput<KeyCode>>,
    sim: Option<ResMut<FluidSim>>,
    mut driver: ResMut<FrameDriver>,
) {
    if keys.just_pressed(KeyCode::Space) {
        match driver.state() {
            RunState::Running => driver.stop(),
            RunState::Stopped => driver.resume(),
        }
    }
    if keys.just_pressed(KeyCode::KeyC) {
        if let Some(mut sim) = sim {
            sim.clear_obstacles();
        }
    }
}

fn log_fps(diagnostics: Res<DiagnosticsStore>, mut counter: Local<u32>) {
    *counter += 1;
    if *counter >= 120 {
        *counter = 0;

        if let Some(fps_diag) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(avg) = fps_diag.average() {
                info!("==== Average FPS over last ~2 s: {:.1} ====", avg);
            }
        }
    }
}
