use std::collections::HashSet;

use bevy_stable_fluid::compute::ffi::{
    AdvectUniforms, ObstacleUniforms, PressureViewUniforms, SplatUniforms, StencilUniforms,
};
use bevy_stable_fluid::compute::kernels::Pass;
use bevy_stable_fluid::{
    Backend, ChannelLayout, CpuBackend, DisplaySurface, FluidConfig, FluidSim, KernelKind,
    ObstacleKind, ObstacleOptions, ShaderSources,
};

#[test]
fn uniform_blocks_are_16_byte_aligned() {
    let sizes = [
        std::mem::size_of::<SplatUniforms>(),
        std::mem::size_of::<AdvectUniforms>(),
        std::mem::size_of::<StencilUniforms>(),
        std::mem::size_of::<ObstacleUniforms>(),
        std::mem::size_of::<PressureViewUniforms>(),
    ];
    assert_eq!(sizes, [32, 16, 16, 16, 32]);
}

#[test]
fn pass_exposes_its_uniform_bytes() {
    let mut backend = CpuBackend::new();
    let field = backend
        .create_field(4, 4, ChannelLayout::Scalar)
        .expect("field");

    let params = StencilUniforms::new([0.25, 0.25]);
    let pass = Pass::Jacobi {
        pressure: &field,
        divergence: &field,
        obstacles: &field,
        params,
    };
    assert_eq!(pass.kind(), KernelKind::Jacobi);
    assert_eq!(pass.uniform_bytes(), bytemuck::bytes_of(&params));

    let pass = Pass::Obstacle {
        params: ObstacleUniforms {
            point: [0.5, 0.5],
            radius: 0.1,
            aspect: 1.0,
        },
    };
    assert_eq!(pass.kind(), KernelKind::Obstacle);
    assert_eq!(pass.uniform_bytes().len(), 16);
}

#[test]
fn kernel_catalog_is_consistent() {
    let names: HashSet<_> = KernelKind::ALL.iter().map(|k| k.name()).collect();
    assert_eq!(names.len(), KernelKind::ALL.len());

    for kind in KernelKind::ALL {
        assert_eq!(kind.asset_path(), format!("fragments/{}.wgsl", kind.name()));
        assert_eq!(kind.bindings()[0], "params");
    }
}

#[test]
fn embedded_sources_compile_for_every_kernel() {
    let sources = ShaderSources::embedded();
    let mut backend = CpuBackend::new();
    for kind in KernelKind::ALL {
        let kernel = backend.compile_kernel(kind, sources.vertex(), sources.fragment(kind));
        assert!(kernel.is_ok(), "{} failed", kind.name());
    }
}

#[test]
fn compiled_kernels_reflect_their_bindings() {
    let sources = ShaderSources::embedded();
    let mut backend = CpuBackend::new();
    for kind in KernelKind::ALL {
        let kernel = backend
            .compile_kernel(kind, sources.vertex(), sources.fragment(kind))
            .expect("embedded kernel compiles");
        let layout = kernel.layout();
        assert_eq!(kernel.kind(), kind);
        assert_eq!(layout.slot("params"), Some((0, 0)), "{}", kind.name());
        assert_eq!(layout.uniform_size, kind.uniform_size(), "{}", kind.name());
        for name in kind.bindings() {
            assert!(layout.slot(name).is_some(), "{} lacks {name}", kind.name());
        }
    }
}

#[test]
fn fields_get_distinct_ids() {
    let mut backend = CpuBackend::new();
    let a = backend.create_field(8, 8, ChannelLayout::Vector).expect("field");
    let b = backend.create_field(8, 8, ChannelLayout::Vector).expect("field");
    assert_ne!(a.id(), b.id());
    assert!(a.same_shape(&b));
    assert!(backend.create_field(0, 8, ChannelLayout::Scalar).is_err());
}

#[test]
fn display_bytes_are_top_down() {
    let surface = DisplaySurface::new(2, 2);
    let bytes = surface.to_top_down_bytes();
    assert_eq!(bytes.len(), 16);
    assert!(bytes.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn display_bytes_are_written_in_place() {
    let mut sim = FluidSim::cpu(8, 8, FluidConfig::default()).expect("cpu simulation builds");
    sim.set_obstacle_color([1.0, 0.0, 0.0]);
    sim.add_obstacle(ObstacleKind::Circle, 0.5, 0.1, ObstacleOptions::radius(0.15));
    let surface = sim.render();

    let mut buffer = vec![0xAA; 8 * 8 * 4];
    surface.write_top_down(&mut buffer);
    assert_eq!(buffer, surface.to_top_down_bytes());

    let rows: Vec<&[u8]> = buffer.chunks_exact(8 * 4).collect();
    let first: &[u8] = bytemuck::cast_slice(&surface.pixels()[..8]);
    let last: &[u8] = bytemuck::cast_slice(&surface.pixels()[56..]);
    assert_ne!(first, last);
    assert_eq!(rows[7], first);
    assert_eq!(rows[0], last);
}
