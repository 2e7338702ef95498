pub mod assets;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod input;
pub mod obstacle;
pub mod plugin;
pub mod solver;

pub mod compute {
    pub mod backend;
    pub mod ffi;
    pub mod kernels;
    pub mod wgsl;
}

pub mod cpu {
    pub mod backend;
    pub mod kernels;
    pub mod sampler;
}

pub use assets::ShaderSources;
pub use compute::backend::{Backend, Capabilities};
pub use compute::kernels::{DisplaySurface, KernelKind};
pub use compute::wgsl::KernelLayout;
pub use config::{FluidConfig, SplatConfig, ViewConfig};
pub use cpu::backend::CpuBackend;
pub use driver::{clamp_frame_dt, FrameDriver, RenderedFrame, RunState, MAX_FRAME_DT};
pub use error::FluidError;
pub use field::{ChannelLayout, Field, FieldId, Grid, PingPong};
pub use input::{screen_to_uv, Impulse, PointerHandle, PointerState};
pub use obstacle::{Obstacle, ObstacleKind, ObstacleOptions};
pub use plugin::FluidPlugin;
pub use solver::FluidSim;
