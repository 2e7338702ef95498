// Stable-fluids pipeline: splat -> advect -> divergence -> jacobi x N -> project.
use bevy::log::{debug, info};
use bevy::prelude::Resource;
use glam::Vec2;

use crate::assets::ShaderSources;
use crate::compute::backend::{compile_kernels, Backend, Capabilities};
use crate::compute::ffi::{AdvectUniforms, PressureViewUniforms, SplatUniforms, StencilUniforms};
use crate::compute::kernels::{Blend, DisplaySurface, KernelSet, Pass, PassTarget};
use crate::config::FluidConfig;
use crate::cpu::backend::CpuBackend;
use crate::cpu::sampler::cell_uv;
use crate::error::FluidError;
use crate::field::{ChannelLayout, Field, Grid, PingPong};
use crate::input::PointerHandle;
use crate::obstacle::{render_mask, Obstacle, ObstacleKind, ObstacleOptions, ObstacleSet};

struct SimFields {
    velocity: PingPong,
    pressure: PingPong,
    divergence: Field,
    obstacle_mask: Field,
}

impl SimFields {
    fn allocate<B: Backend>(backend: &mut B, grid: Grid) -> Result<Self, FluidError> {
        let mut make = |layout| backend.create_field(grid.width, grid.height, layout);
        Ok(Self {
            velocity: PingPong::new(make(ChannelLayout::Vector)?, make(ChannelLayout::Vector)?),
            pressure: PingPong::new(make(ChannelLayout::Scalar)?, make(ChannelLayout::Scalar)?),
            divergence: make(ChannelLayout::Scalar)?,
            obstacle_mask: make(ChannelLayout::Scalar)?,
        })
    }
}

#[derive(Resource)]
pub struct FluidSim<B: Backend = CpuBackend> {
    backend: B,
    kernels: KernelSet<B::Kernel>,
    config: FluidConfig,
    surface: DisplaySurface,
    grid: Grid,
    velocity: PingPong,
    pressure: PingPong,
    divergence: Field,
    obstacle_mask: Field,
    obstacles: ObstacleSet,
    obstacle_color: [f32; 3],
    pointer: PointerHandle,
}

impl FluidSim<CpuBackend> {
    /// CPU backend with the embedded kernel sources.
    pub fn cpu(surface_width: u32, surface_height: u32, config: FluidConfig) -> Result<Self, FluidError> {
        Self::new(
            CpuBackend::new(),
            &ShaderSources::embedded(),
            surface_width,
            surface_height,
            config,
        )
    }
}

/// The display surface is a render target too and obeys the same limits as fields.
fn check_surface(capabilities: Capabilities, width: u32, height: u32) -> Result<(), FluidError> {
    let incomplete = |reason: String| FluidError::TargetIncomplete {
        width,
        height,
        reason,
    };
    if width == 0 || height == 0 {
        return Err(incomplete("zero-sized display surface".into()));
    }
    let max = capabilities.max_extent;
    if width > max || height > max {
        return Err(incomplete(format!(
            "display surface exceeds the {max} texel limit"
        )));
    }
    Ok(())
}

impl<B: Backend> FluidSim<B> {
    pub fn new(
        mut backend: B,
        sources: &ShaderSources,
        surface_width: u32,
        surface_height: u32,
        config: FluidConfig,
    ) -> Result<Self, FluidError> {
        config.validate()?;
        if !backend.capabilities().float_render_targets {
            return Err(FluidError::CapabilityMissing("floating-point render targets"));
        }
        check_surface(backend.capabilities(), surface_width, surface_height)?;

        let kernels = compile_kernels(&mut backend, sources)?;
        let grid = Grid::from_surface(surface_width, surface_height, config.sim_scale);
        let fields = SimFields::allocate(&mut backend, grid)?;

        info!(
            "fluid sim: {}x{} grid for a {}x{} surface, {} pressure iterations",
            grid.width, grid.height, surface_width, surface_height, config.pressure_iters
        );

        let mut sim = Self {
            backend,
            kernels,
            surface: DisplaySurface::new(surface_width, surface_height),
            grid,
            velocity: fields.velocity,
            pressure: fields.pressure,
            divergence: fields.divergence,
            obstacle_mask: fields.obstacle_mask,
            obstacles: ObstacleSet::default(),
            obstacle_color: config.view.obstacle_color,
            pointer: PointerHandle::new(),
            config,
        };
        sim.refresh_mask();
        Ok(sim)
    }

    /// Recreate every field for a new surface size. `None` keeps that dimension.
    /// All state is zeroed and the obstacle mask is re-rendered; on error the
    /// previous fields are left untouched.
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> Result<(), FluidError> {
        let width = width.unwrap_or(self.surface.width());
        let height = height.unwrap_or(self.surface.height());
        check_surface(self.backend.capabilities(), width, height)?;
        let grid = Grid::from_surface(width, height, self.config.sim_scale);
        let fields = SimFields::allocate(&mut self.backend, grid)?;

        self.surface.resize(width, height);
        self.grid = grid;
        self.velocity = fields.velocity;
        self.pressure = fields.pressure;
        self.divergence = fields.divergence;
        self.obstacle_mask = fields.obstacle_mask;
        self.refresh_mask();

        debug!("resized to {}x{} (grid {}x{})", width, height, grid.width, grid.height);
        Ok(())
    }

    pub fn add_obstacle(
        &mut self,
        kind: ObstacleKind,
        x: f32,
        y: f32,
        options: ObstacleOptions,
    ) -> Obstacle {
        let obstacle = Obstacle::new(kind, x, y, options);
        self.obstacles.push(obstacle);
        self.refresh_mask();
        obstacle
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        self.refresh_mask();
    }

    fn refresh_mask(&mut self) {
        render_mask(
            &mut self.backend,
            &self.kernels.obstacle,
            &mut self.obstacle_mask,
            self.obstacles.as_slice(),
        );
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let stencil = StencilUniforms::new(self.grid.texel());

        // 1) pointer force
        if let Some(impulse) = self.pointer.take_impulse() {
            let force = impulse.delta * self.config.splat.force;
            let (read, write) = self.velocity.split();
            let pass = Pass::Splat {
                target: read,
                params: SplatUniforms {
                    point: impulse.position.to_array(),
                    radius: self.config.splat.radius,
                    aspect: self.grid.aspect(),
                    color: [force.x, force.y, 0.0, 0.0],
                },
            };
            self.backend
                .run_pass(&self.kernels.splat, &pass, PassTarget::Field(write), Blend::Replace);
            self.velocity.swap();
        }

        // 2) self-advection, dissipation normalized to 60 Hz
        {
            let (read, write) = self.velocity.split();
            let pass = Pass::Advect {
                velocity: read,
                source: read,
                obstacles: &self.obstacle_mask,
                params: AdvectUniforms {
                    dt,
                    dissipation: self.config.dissipation_vel.powf(dt * 60.0),
                    _pad: [0.0; 2],
                },
            };
            self.backend
                .run_pass(&self.kernels.advect, &pass, PassTarget::Field(write), Blend::Replace);
            self.velocity.swap();
        }

        // 3) divergence
        self.compute_divergence(stencil);

        // 4) pressure, warm-started from the previous frame
        for _ in 0..self.config.pressure_iters {
            let (read, write) = self.pressure.split();
            let pass = Pass::Jacobi {
                pressure: read,
                divergence: &self.divergence,
                obstacles: &self.obstacle_mask,
                params: stencil,
            };
            self.backend
                .run_pass(&self.kernels.jacobi, &pass, PassTarget::Field(write), Blend::Replace);
            self.pressure.swap();
        }

        // 5) projection
        {
            let (read, write) = self.velocity.split();
            let pass = Pass::Gradient {
                velocity: read,
                pressure: self.pressure.read(),
                obstacles: &self.obstacle_mask,
                params: stencil,
            };
            self.backend
                .run_pass(&self.kernels.gradient, &pass, PassTarget::Field(write), Blend::Replace);
            self.velocity.swap();
        }
    }

    fn compute_divergence(&mut self, stencil: StencilUniforms) {
        let pass = Pass::Divergence {
            velocity: self.velocity.read(),
            obstacles: &self.obstacle_mask,
            params: stencil,
        };
        self.backend.run_pass(
            &self.kernels.divergence,
            &pass,
            PassTarget::Field(&mut self.divergence),
            Blend::Replace,
        );
    }

    /// Draw the pressure field to the display surface. Simulation state is only read.
    pub fn render(&mut self) -> &DisplaySurface {
        let [r, g, b] = self.obstacle_color;
        let pass = Pass::PressureView {
            pressure: self.pressure.read(),
            obstacles: &self.obstacle_mask,
            params: PressureViewUniforms {
                obstacle_color: [r, g, b, 1.0],
                gain: self.config.view.pressure_gain,
                _pad: [0.0; 3],
            },
        };
        self.backend.run_pass(
            &self.kernels.pressure_view,
            &pass,
            PassTarget::Display(&mut self.surface),
            Blend::Replace,
        );
        &self.surface
    }

    pub fn set_obstacle_color(&mut self, color: [f32; 3]) {
        self.obstacle_color = color;
    }

    /// Overwrite the current velocity with `f(uv)` at every cell centre.
    pub fn seed_velocity(&mut self, f: impl Fn(Vec2) -> Vec2) {
        let Grid { width, height } = self.grid;
        let field = self.velocity.read_mut();
        for y in 0..height {
            for x in 0..width {
                let v = f(cell_uv(x, y, width, height));
                field.set_texel(x, y, v.extend(0.0).extend(0.0));
            }
        }
    }

    pub fn velocity_at(&self, uv: Vec2) -> Vec2 {
        self.velocity.read().sample(uv).truncate().truncate()
    }

    /// Mean |div v| of the current velocity over interior cells.
    /// Reuses the divergence scratch field, which `step` recomputes anyway.
    pub fn mean_abs_divergence(&mut self) -> f32 {
        self.compute_divergence(StencilUniforms::new(self.grid.texel()));

        let Grid { width, height } = self.grid;
        let border = u32::from(width > 2 && height > 2);
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for y in border..height - border {
            for x in border..width - border {
                sum += f64::from(self.divergence.texel(x, y).x.abs());
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { (sum / count as f64) as f32 }
    }

    pub fn pointer(&self) -> PointerHandle {
        self.pointer.clone()
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn velocity(&self) -> &PingPong {
        &self.velocity
    }

    pub fn pressure(&self) -> &PingPong {
        &self.pressure
    }

    pub fn divergence(&self) -> &Field {
        &self.divergence
    }

    pub fn obstacle_mask(&self) -> &Field {
        &self.obstacle_mask
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.obstacles.as_slice()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
