use bevy::log::debug;
use glam::Vec2;

use crate::compute::backend::Backend;
use crate::compute::ffi::ObstacleUniforms;
use crate::compute::kernels::{Blend, Pass, PassTarget};
use crate::error::FluidError;
use crate::field::{ChannelLayout, Field, Grid};

pub const DEFAULT_OBSTACLE_RADIUS: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ObstacleKind {
    #[default]
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObstacleOptions {
    pub radius: Option<f32>,
}

impl ObstacleOptions {
    pub fn radius(radius: f32) -> Self {
        Self {
            radius: Some(radius),
        }
    }
}

/// A static solid, positioned in normalized grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub position: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, y: f32, options: ObstacleOptions) -> Self {
        // a missing, zero or negative radius falls back to the default
        let radius = options
            .radius
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_OBSTACLE_RADIUS);
        Self {
            kind,
            position: Vec2::new(x, y),
            radius,
        }
    }

    fn uniforms(&self, grid: Grid) -> ObstacleUniforms {
        ObstacleUniforms {
            point: self.position.to_array(),
            radius: self.radius,
            aspect: grid.aspect(),
        }
    }
}

/// Append-only, insertion-ordered set of obstacles.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

/// Render `obstacles` additively into `mask`, which is cleared first.
/// The result depends only on the obstacle set and the mask's extent.
pub fn render_mask<B: Backend>(
    backend: &mut B,
    kernel: &B::Kernel,
    mask: &mut Field,
    obstacles: &[Obstacle],
) {
    let (width, height) = mask.extent();
    let grid = Grid { width, height };

    backend.clear(mask);
    for obstacle in obstacles {
        let pass = Pass::Obstacle {
            params: obstacle.uniforms(grid),
        };
        backend.run_pass(kernel, &pass, PassTarget::Field(mask), Blend::Additive);
    }
    debug!(
        "obstacle mask rebuilt at {}x{} from {} obstacle(s)",
        width,
        height,
        obstacles.len()
    );
}

/// Fresh single-channel mask at `grid` resolution.
pub fn rebuild_mask<B: Backend>(
    backend: &mut B,
    kernel: &B::Kernel,
    grid: Grid,
    obstacles: &[Obstacle],
) -> Result<Field, FluidError> {
    let mut mask = backend.create_field(grid.width, grid.height, ChannelLayout::Scalar)?;
    render_mask(backend, kernel, &mut mask, obstacles);
    Ok(mask)
}
