use std::mem::size_of;

use crate::compute::ffi::{
    AdvectUniforms, ObstacleUniforms, PressureViewUniforms, SplatUniforms, StencilUniforms,
};
use crate::field::Field;

/// Shared traversal stage: one full-screen triangle per pass.
pub const VERTEX_ASSET: &str = "vertex/fullscreen.wgsl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    PressureView,
    Advect,
    Divergence,
    Gradient,
    Jacobi,
    Splat,
    Obstacle,
}

impl KernelKind {
    pub const ALL: [KernelKind; 7] = [
        KernelKind::PressureView,
        KernelKind::Advect,
        KernelKind::Divergence,
        KernelKind::Gradient,
        KernelKind::Jacobi,
        KernelKind::Splat,
        KernelKind::Obstacle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KernelKind::PressureView => "pressure",
            KernelKind::Advect => "advect",
            KernelKind::Divergence => "divergence",
            KernelKind::Gradient => "gradient",
            KernelKind::Jacobi => "jacobi",
            KernelKind::Splat => "splat",
            KernelKind::Obstacle => "obstacle",
        }
    }

    pub fn asset_path(self) -> &'static str {
        match self {
            KernelKind::PressureView => "fragments/pressure.wgsl",
            KernelKind::Advect => "fragments/advect.wgsl",
            KernelKind::Divergence => "fragments/divergence.wgsl",
            KernelKind::Gradient => "fragments/gradient.wgsl",
            KernelKind::Jacobi => "fragments/jacobi.wgsl",
            KernelKind::Splat => "fragments/splat.wgsl",
            KernelKind::Obstacle => "fragments/obstacle.wgsl",
        }
    }

    /// Size of the host-side uniform block filled for this kernel.
    pub fn uniform_size(self) -> usize {
        match self {
            KernelKind::PressureView => size_of::<PressureViewUniforms>(),
            KernelKind::Advect => size_of::<AdvectUniforms>(),
            KernelKind::Divergence | KernelKind::Gradient | KernelKind::Jacobi => {
                size_of::<StencilUniforms>()
            }
            KernelKind::Splat => size_of::<SplatUniforms>(),
            KernelKind::Obstacle => size_of::<ObstacleUniforms>(),
        }
    }

    /// Bindings the fragment stage has to declare for this kernel's parameter schema.
    pub fn bindings(self) -> &'static [&'static str] {
        match self {
            KernelKind::PressureView => &["params", "u_pressure", "u_obstacles", "u_sampler"],
            KernelKind::Advect => &[
                "params",
                "u_velocity",
                "u_source",
                "u_obstacles",
                "u_sampler",
            ],
            KernelKind::Divergence => &["params", "u_velocity", "u_obstacles", "u_sampler"],
            KernelKind::Gradient => &[
                "params",
                "u_velocity",
                "u_pressure",
                "u_obstacles",
                "u_sampler",
            ],
            KernelKind::Jacobi => &[
                "params",
                "u_pressure",
                "u_divergence",
                "u_obstacles",
                "u_sampler",
            ],
            KernelKind::Splat => &["params", "u_target", "u_sampler"],
            KernelKind::Obstacle => &["params"],
        }
    }
}

/// One kernel invocation: the sampled inputs and the uniform block, typed per kernel.
#[derive(Debug, Clone, Copy)]
pub enum Pass<'a> {
    Splat {
        target: &'a Field,
        params: SplatUniforms,
    },
    Advect {
        velocity: &'a Field,
        source: &'a Field,
        obstacles: &'a Field,
        params: AdvectUniforms,
    },
    Divergence {
        velocity: &'a Field,
        obstacles: &'a Field,
        params: StencilUniforms,
    },
    Jacobi {
        pressure: &'a Field,
        divergence: &'a Field,
        obstacles: &'a Field,
        params: StencilUniforms,
    },
    Gradient {
        velocity: &'a Field,
        pressure: &'a Field,
        obstacles: &'a Field,
        params: StencilUniforms,
    },
    Obstacle {
        params: ObstacleUniforms,
    },
    PressureView {
        pressure: &'a Field,
        obstacles: &'a Field,
        params: PressureViewUniforms,
    },
}

impl Pass<'_> {
    pub fn kind(&self) -> KernelKind {
        match self {
            Pass::Splat { .. } => KernelKind::Splat,
            Pass::Advect { .. } => KernelKind::Advect,
            Pass::Divergence { .. } => KernelKind::Divergence,
            Pass::Jacobi { .. } => KernelKind::Jacobi,
            Pass::Gradient { .. } => KernelKind::Gradient,
            Pass::Obstacle { .. } => KernelKind::Obstacle,
            Pass::PressureView { .. } => KernelKind::PressureView,
        }
    }

    /// Raw uniform bytes, as a GPU backend would upload them.
    pub fn uniform_bytes(&self) -> &[u8] {
        match self {
            Pass::Splat { params, .. } => bytemuck::bytes_of(params),
            Pass::Advect { params, .. } => bytemuck::bytes_of(params),
            Pass::Divergence { params, .. }
            | Pass::Jacobi { params, .. }
            | Pass::Gradient { params, .. } => bytemuck::bytes_of(params),
            Pass::Obstacle { params } => bytemuck::bytes_of(params),
            Pass::PressureView { params, .. } => bytemuck::bytes_of(params),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Replace,
    Additive,
}

/// The presentation target: RGBA8 at display resolution.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    width: u32,
    height: u32,
    pub(crate) pixels: Vec<[u8; 4]>,
}

impl DisplaySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0, 0, 0, 255]; width as usize * height as usize];
    }

    /// Pixel at (x, y), y measured from the bottom row.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Rows flipped to top-down order, ready for an image upload.
    pub fn to_top_down_bytes(&self) -> Vec<u8> {
        let mut out = vec![0; self.pixels.len() * 4];
        self.write_top_down(&mut out);
        out
    }

    /// Same as `to_top_down_bytes`, into an existing buffer of exactly
    /// `width * height * 4` bytes.
    pub fn write_top_down(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.pixels.len() * 4);
        let row = self.width as usize;
        if row == 0 {
            return;
        }
        for (dst, src) in out
            .chunks_exact_mut(row * 4)
            .zip(self.pixels.chunks_exact(row).rev())
        {
            dst.copy_from_slice(bytemuck::cast_slice(src));
        }
    }
}

pub enum PassTarget<'a> {
    Field(&'a mut Field),
    Display(&'a mut DisplaySurface),
}

/// Compiled handles for every fragment kernel.
#[derive(Debug)]
pub struct KernelSet<K> {
    pub pressure_view: K,
    pub advect: K,
    pub divergence: K,
    pub gradient: K,
    pub jacobi: K,
    pub splat: K,
    pub obstacle: K,
}
