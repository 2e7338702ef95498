use std::path::Path;

use bevy::log::debug;
use rayon::prelude::*;

use crate::compute::kernels::{KernelKind, VERTEX_ASSET};
use crate::error::FluidError;

/// Source text of the shared vertex stage and the seven fragment kernels.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    vertex: String,
    fragments: [String; 7], // indexed by KernelKind discriminant
}

impl ShaderSources {
    /// Sources compiled into the crate from `assets/shaders`.
    pub fn embedded() -> Self {
        Self {
            vertex: include_str!("../assets/shaders/vertex/fullscreen.wgsl").to_owned(),
            fragments: [
                include_str!("../assets/shaders/fragments/pressure.wgsl").to_owned(),
                include_str!("../assets/shaders/fragments/advect.wgsl").to_owned(),
                include_str!("../assets/shaders/fragments/divergence.wgsl").to_owned(),
                include_str!("../assets/shaders/fragments/gradient.wgsl").to_owned(),
                include_str!("../assets/shaders/fragments/jacobi.wgsl").to_owned(),
                include_str!("../assets/shaders/fragments/splat.wgsl").to_owned(),
                include_str!("../assets/shaders/fragments/obstacle.wgsl").to_owned(),
            ],
        }
    }

    /// Read all eight sources below `root`. Reads run concurrently; the first
    /// failure (in asset order) is reported with the asset's relative path.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, FluidError> {
        let root = root.as_ref();
        let mut paths = vec![VERTEX_ASSET];
        paths.extend(KernelKind::ALL.iter().map(|k| k.asset_path()));

        let loaded: Vec<Result<String, FluidError>> = paths
            .par_iter()
            .map(|asset| {
                std::fs::read_to_string(root.join(asset)).map_err(|e| FluidError::AssetLoad {
                    asset: (*asset).to_owned(),
                    status: format!("{:?}: {}", e.kind(), e),
                })
            })
            .collect();

        let mut texts = loaded.into_iter().collect::<Result<Vec<_>, _>>()?.into_iter();
        debug!("loaded {} kernel sources from {}", paths.len(), root.display());

        let mut next = || texts.next().unwrap_or_default();
        let vertex = next();
        let fragments = std::array::from_fn(|_| next());
        Ok(Self { vertex, fragments })
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self, kind: KernelKind) -> &str {
        &self.fragments[kind as usize]
    }

    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex = source.into();
        self
    }

    pub fn with_fragment(mut self, kind: KernelKind, source: impl Into<String>) -> Self {
        self.fragments[kind as usize] = source.into();
        self
    }
}
