// Reference backend: kernels run on the CPU, one rayon task per row.
use bevy::log::debug;
use glam::Vec4;
use rayon::prelude::*;

use crate::compute::backend::{Backend, Capabilities};
use crate::compute::kernels::{Blend, KernelKind, Pass, PassTarget};
use crate::compute::wgsl::{self, KernelLayout};
use crate::cpu::kernels::shade;
use crate::cpu::sampler::cell_uv;
use crate::error::FluidError;
use crate::field::{ChannelLayout, Field, FieldId};

/// A validated kernel. Passes are evaluated by the native twin of its
/// fragment stage; the reflected layout fixes what a pass has to supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuKernel {
    layout: KernelLayout,
}

impl CpuKernel {
    pub fn kind(&self) -> KernelKind {
        self.layout.kind
    }

    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }
}

#[derive(Debug)]
pub struct CpuBackend {
    capabilities: Capabilities,
    next_field: u64,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::default())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            next_field: 0,
        }
    }
}

impl Backend for CpuBackend {
    type Kernel = CpuKernel;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn compile_kernel(
        &mut self,
        kind: KernelKind,
        vertex: &str,
        fragment: &str,
    ) -> Result<CpuKernel, FluidError> {
        let layout = wgsl::compile_kernel(kind, vertex, fragment)?;
        debug!(
            "compiled kernel `{}`: {} binding(s), {}-byte uniform block",
            kind.name(),
            layout.slots.len(),
            layout.uniform_size
        );
        Ok(CpuKernel { layout })
    }

    fn create_field(
        &mut self,
        width: u32,
        height: u32,
        layout: ChannelLayout,
    ) -> Result<Field, FluidError> {
        let incomplete = |reason: String| FluidError::TargetIncomplete {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(incomplete("zero-sized attachment".into()));
        }
        let max = self.capabilities.max_extent;
        if width > max || height > max {
            return Err(incomplete(format!("extent exceeds the {max} texel limit")));
        }

        let id = FieldId(self.next_field);
        self.next_field += 1;
        Ok(Field::zeroed(id, width, height, layout))
    }

    fn clear(&mut self, field: &mut Field) {
        field.data.fill(0.0);
    }

    fn run_pass(&mut self, kernel: &CpuKernel, pass: &Pass<'_>, target: PassTarget<'_>, blend: Blend) {
        debug_assert_eq!(kernel.kind(), pass.kind(), "kernel/pass mismatch");
        debug_assert_eq!(
            pass.uniform_bytes().len(),
            kernel.layout.uniform_size,
            "uniform block does not match the kernel layout"
        );

        match target {
            PassTarget::Field(dest) => {
                let (width, height) = dest.extent();
                let ch = dest.layout().channels();
                dest.data
                    .par_chunks_mut(width as usize * ch)
                    .enumerate()
                    .for_each(|(y, row)| {
                        for (x, cell) in row.chunks_exact_mut(ch).enumerate() {
                            let v = shade(pass, cell_uv(x as u32, y as u32, width, height));
                            for (c, out) in cell.iter_mut().enumerate() {
                                match blend {
                                    Blend::Replace => *out = v[c],
                                    Blend::Additive => *out += v[c],
                                }
                            }
                        }
                    });
            }
            PassTarget::Display(surface) => {
                let (width, height) = (surface.width(), surface.height());
                if width == 0 || height == 0 {
                    return;
                }
                surface
                    .pixels
                    .par_chunks_mut(width as usize)
                    .enumerate()
                    .for_each(|(y, row)| {
                        for (x, px) in row.iter_mut().enumerate() {
                            let v = shade(pass, cell_uv(x as u32, y as u32, width, height));
                            let rgba = to_rgba8(v);
                            match blend {
                                Blend::Replace => *px = rgba,
                                Blend::Additive => {
                                    for (dst, src) in px.iter_mut().zip(rgba) {
                                        *dst = dst.saturating_add(src);
                                    }
                                }
                            }
                        }
                    });
            }
        }
    }
}

fn to_rgba8(v: Vec4) -> [u8; 4] {
    let q = (v.clamp(Vec4::ZERO, Vec4::ONE) * 255.0 + 0.5).to_array();
    [q[0] as u8, q[1] as u8, q[2] as u8, q[3] as u8]
}
