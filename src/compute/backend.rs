use crate::assets::ShaderSources;
use crate::compute::kernels::{Blend, KernelKind, KernelSet, Pass, PassTarget};
use crate::error::FluidError;
use crate::field::{ChannelLayout, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Floating-point fields can be rendered into (RG16F / R16F targets).
    pub float_render_targets: bool,
    /// Largest width or height a field may have.
    pub max_extent: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            float_render_targets: true,
            max_extent: 8192,
        }
    }
}

/// Executes kernels over 2D fields.
///
/// A pass must look atomic to the caller: when `run_pass` returns every cell
/// of the target has been written exactly once.
pub trait Backend: Send + Sync + 'static {
    type Kernel: Send + Sync + 'static;

    fn capabilities(&self) -> Capabilities;

    /// Build a program from the shared vertex stage and one fragment stage.
    fn compile_kernel(
        &mut self,
        kind: KernelKind,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self::Kernel, FluidError>;

    /// Zeroed storage, sampled bilinearly with clamp-to-edge addressing.
    fn create_field(
        &mut self,
        width: u32,
        height: u32,
        layout: ChannelLayout,
    ) -> Result<Field, FluidError>;

    fn clear(&mut self, field: &mut Field);

    fn run_pass(
        &mut self,
        kernel: &Self::Kernel,
        pass: &Pass<'_>,
        target: PassTarget<'_>,
        blend: Blend,
    );
}

pub fn compile_kernels<B: Backend>(
    backend: &mut B,
    sources: &ShaderSources,
) -> Result<KernelSet<B::Kernel>, FluidError> {
    let vertex = sources.vertex();
    let mut compile = |kind: KernelKind| backend.compile_kernel(kind, vertex, sources.fragment(kind));

    Ok(KernelSet {
        pressure_view: compile(KernelKind::PressureView)?,
        advect: compile(KernelKind::Advect)?,
        divergence: compile(KernelKind::Divergence)?,
        gradient: compile(KernelKind::Gradient)?,
        jacobi: compile(KernelKind::Jacobi)?,
        splat: compile(KernelKind::Splat)?,
        obstacle: compile(KernelKind::Obstacle)?,
    })
}
