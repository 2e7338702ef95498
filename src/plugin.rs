use std::path::PathBuf;

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::{PrimaryWindow, WindowResized};

use crate::assets::ShaderSources;
use crate::config::FluidConfig;
use crate::cpu::backend::CpuBackend;
use crate::driver::FrameDriver;
use crate::input::{screen_to_uv, PointerHandle};
use crate::obstacle::{Obstacle, ObstacleKind, ObstacleOptions};
use crate::solver::FluidSim;

// ==================== resources ======================================

/// Input-side handle to the simulation's pointer state.
#[derive(Resource, Clone)]
pub struct FluidPointer(pub PointerHandle);

/// Image the display surface is copied into every frame.
#[derive(Resource)]
pub struct FluidCanvas {
    pub image: Handle<Image>,
}

#[derive(Component)]
pub struct FluidSprite;

#[derive(Resource, Clone)]
struct FluidSettings {
    config: FluidConfig,
    shader_dir: Option<PathBuf>,
    obstacles: Vec<Obstacle>,
}

// =====================================================================

// ========================== systems ==================================

fn blank_image(width: u32, height: u32) -> Image {
    Image::new_fill(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 255],
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::default(),
    )
}

// Startup: build the sim at the window's size, fatal on failure
fn init_fluid_sim(
    mut commands: Commands,
    settings: Res<FluidSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut images: ResMut<Assets<Image>>,
    mut exit: EventWriter<AppExit>,
) {
    let (width, height) = match windows.single() {
        Ok(w) => ((w.width() as u32).max(1), (w.height() as u32).max(1)),
        Err(_) => (512, 512),
    };

    let sources = match &settings.shader_dir {
        Some(dir) => ShaderSources::load(dir),
        None => Ok(ShaderSources::embedded()),
    };
    let built = sources.and_then(|sources| {
        FluidSim::new(CpuBackend::new(), &sources, width, height, settings.config)
    });
    let mut sim = match built {
        Ok(sim) => sim,
        Err(e) => {
            error!("fluid simulation failed to initialise: {e}");
            exit.write(AppExit::error());
            return;
        }
    };

    for o in &settings.obstacles {
        sim.add_obstacle(
            o.kind,
            o.position.x,
            o.position.y,
            ObstacleOptions::radius(o.radius),
        );
    }

    let image = images.add(blank_image(width, height));
    commands.spawn((
        Sprite {
            image: image.clone(),
            custom_size: Some(Vec2::new(width as f32, height as f32)),
            ..default()
        },
        FluidSprite,
    ));
    commands.insert_resource(FluidPointer(sim.pointer()));
    commands.insert_resource(FluidCanvas { image });
    commands.insert_resource(sim);
}

fn track_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    pointer: Option<Res<FluidPointer>>,
) {
    let Some(pointer) = pointer else { return };
    let Ok(window) = windows.single() else { return };

    let Some(cursor) = window.cursor_position() else {
        pointer.0.leave();
        return;
    };
    let uv = screen_to_uv(cursor.x, cursor.y, window.width(), window.height());

    if buttons.just_pressed(MouseButton::Left) {
        pointer.0.press(uv);
    } else {
        pointer.0.move_to(uv);
    }
    if buttons.just_released(MouseButton::Left) {
        pointer.0.release();
    }
}

fn resize_fluid(
    mut events: EventReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    sim: Option<ResMut<FluidSim>>,
    mut sprites: Query<&mut Sprite, With<FluidSprite>>,
    mut exit: EventWriter<AppExit>,
) {
    let Ok(primary) = primary.single() else { return };
    let Some(resized) = events.read().filter(|e| e.window == primary).last() else {
        return;
    };
    let Some(mut sim) = sim else { return };

    let (width, height) = ((resized.width as u32).max(1), (resized.height as u32).max(1));
    if let Err(e) = sim.resize(Some(width), Some(height)) {
        error!("fluid simulation failed to resize to {width}x{height}: {e}");
        exit.write(AppExit::error());
        return;
    }
    for mut sprite in &mut sprites {
        sprite.custom_size = Some(Vec2::new(width as f32, height as f32));
    }
}

// Update: one simulation tick, then copy the rendered frame into the canvas image
fn advance_fluid(
    sim: Option<ResMut<FluidSim>>,
    canvas: Option<Res<FluidCanvas>>,
    mut driver: ResMut<FrameDriver>,
    time: Res<Time<Real>>,
    mut images: ResMut<Assets<Image>>,
) {
    let (Some(mut sim), Some(canvas)) = (sim, canvas) else {
        return;
    };

    let now_ms = time.elapsed_secs_f64() * 1000.0;
    let Some(frame) = driver.tick(&mut *sim, now_ms) else {
        return;
    };
    let Some(image) = images.get_mut(&canvas.image) else {
        return;
    };

    let size = Extent3d {
        width: frame.surface.width(),
        height: frame.surface.height(),
        depth_or_array_layers: 1,
    };
    // reuse the pixel buffer until the surface changes size
    let bytes = frame.surface.pixels().len() * 4;
    if image.texture_descriptor.size == size {
        if let Some(data) = image.data.as_mut().filter(|d| d.len() == bytes) {
            frame.surface.write_top_down(data);
            return;
        }
    }
    debug!("fluid canvas reallocated at {}x{}", size.width, size.height);
    *image = Image::new(
        size,
        TextureDimension::D2,
        frame.surface.to_top_down_bytes(),
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::default(),
    );
}

// =====================================================================

// Plugin

#[derive(Default)]
pub struct FluidPlugin {
    pub config: FluidConfig,
    /// Load kernel sources from here instead of the embedded copies.
    pub shader_dir: Option<PathBuf>,
    pub obstacles: Vec<Obstacle>,
}

impl FluidPlugin {
    pub fn with_config(mut self, config: FluidConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    pub fn with_obstacle(mut self, x: f32, y: f32, radius: f32) -> Self {
        self.obstacles.push(Obstacle::new(
            ObstacleKind::Circle,
            x,
            y,
            ObstacleOptions::radius(radius),
        ));
        self
    }
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(FluidSettings {
            config: self.config,
            shader_dir: self.shader_dir.clone(),
            obstacles: self.obstacles.clone(),
        })
        .init_resource::<FrameDriver>()
        .add_systems(Startup, init_fluid_sim)
        .add_systems(Update, (track_pointer, resize_fluid, advance_fluid).chain());
    }
}
