/// Errors raised while building a simulation.
///
/// Every variant is fatal at construction (or resize) time: nothing in the
/// per-frame loop can fail once a `FluidSim` exists.
#[derive(Debug, thiserror::Error)]
pub enum FluidError {
    #[error("backend lacks a required capability: {0}")]
    CapabilityMissing(&'static str),

    #[error("failed to load kernel source `{asset}`: {status}")]
    AssetLoad { asset: String, status: String },

    #[error("kernel `{kernel}` failed to compile: {log}")]
    Compile { kernel: &'static str, log: String },

    #[error("kernel `{kernel}` failed to link: {log}")]
    Link { kernel: &'static str, log: String },

    #[error("render target {width}x{height} is incomplete: {reason}")]
    TargetIncomplete {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
