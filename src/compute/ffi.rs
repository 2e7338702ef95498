use bytemuck::{Pod, Zeroable};

// Uniform blocks, one per kernel. Layouts match the `Params` structs in
// assets/shaders/fragments/*.wgsl (16-byte aligned, no glam types).

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SplatUniforms {
    pub point: [f32; 2],
    pub radius: f32,
    pub aspect: f32,
    pub color: [f32; 4], // w unused
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct AdvectUniforms {
    pub dt: f32,
    pub dissipation: f32, // already raised to the frame-time power
    pub _pad: [f32; 2],
}

/// Shared by divergence, jacobi and gradient.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct StencilUniforms {
    pub texel: [f32; 2],
    pub _pad: [f32; 2],
}

impl StencilUniforms {
    pub fn new(texel: [f32; 2]) -> Self {
        Self {
            texel,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ObstacleUniforms {
    pub point: [f32; 2],
    pub radius: f32,
    pub aspect: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PressureViewUniforms {
    pub obstacle_color: [f32; 4],
    pub gain: f32,
    pub _pad: [f32; 3],
}
