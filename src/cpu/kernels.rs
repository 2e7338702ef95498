// Per-cell evaluation of the fragment kernels in assets/shaders/fragments.
// Each function is the CPU twin of the WGSL `fs_main` of the same name.

use glam::{Vec2, Vec3, Vec4};

use crate::compute::ffi::{
    AdvectUniforms, ObstacleUniforms, PressureViewUniforms, SplatUniforms, StencilUniforms,
};
use crate::compute::kernels::Pass;
use crate::field::Field;

pub(crate) fn shade(pass: &Pass<'_>, uv: Vec2) -> Vec4 {
    match *pass {
        Pass::Splat { target, ref params } => splat(target, params, uv),
        Pass::Advect {
            velocity,
            source,
            obstacles,
            ref params,
        } => advect(velocity, source, obstacles, params, uv),
        Pass::Divergence {
            velocity,
            obstacles,
            ref params,
        } => divergence(velocity, obstacles, params, uv),
        Pass::Jacobi {
            pressure,
            divergence,
            obstacles,
            ref params,
        } => jacobi(pressure, divergence, obstacles, params, uv),
        Pass::Gradient {
            velocity,
            pressure,
            obstacles,
            ref params,
        } => gradient(velocity, pressure, obstacles, params, uv),
        Pass::Obstacle { ref params } => obstacle(params, uv),
        Pass::PressureView {
            pressure,
            obstacles,
            ref params,
        } => pressure_view(pressure, obstacles, params, uv),
    }
}

#[inline]
fn solid_at(obstacles: &Field, uv: Vec2) -> f32 {
    obstacles.sample(uv).x.clamp(0.0, 1.0)
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn splat(target: &Field, params: &SplatUniforms, uv: Vec2) -> Vec4 {
    let mut p = uv - Vec2::from(params.point);
    p.x *= params.aspect;

    let color = Vec3::new(params.color[0], params.color[1], params.color[2]);
    let splat = (-p.length_squared() / params.radius).exp() * color;
    (target.sample(uv).truncate() + splat).extend(1.0)
}

fn advect(
    velocity: &Field,
    source: &Field,
    obstacles: &Field,
    params: &AdvectUniforms,
    uv: Vec2,
) -> Vec4 {
    let v = velocity.sample(uv).truncate().truncate();
    let coord = uv - params.dt * v;

    let open = 1.0 - solid_at(obstacles, uv);
    let q = source.sample(coord).truncate().truncate();
    (q * params.dissipation * open).extend(0.0).extend(1.0)
}

fn divergence(velocity: &Field, obstacles: &Field, params: &StencilUniforms, uv: Vec2) -> Vec4 {
    let tx = Vec2::new(params.texel[0], 0.0);
    let ty = Vec2::new(0.0, params.texel[1]);
    let open_at = |at: Vec2| 1.0 - solid_at(obstacles, at);

    let c = velocity.sample(uv);
    let mut l = velocity.sample(uv - tx).x * open_at(uv - tx);
    let mut r = velocity.sample(uv + tx).x * open_at(uv + tx);
    let mut b = velocity.sample(uv - ty).y * open_at(uv - ty);
    let mut t = velocity.sample(uv + ty).y * open_at(uv + ty);

    // walls reflect the normal component
    if uv.x - tx.x < 0.0 {
        l = -c.x;
    }
    if uv.x + tx.x > 1.0 {
        r = -c.x;
    }
    if uv.y - ty.y < 0.0 {
        b = -c.y;
    }
    if uv.y + ty.y > 1.0 {
        t = -c.y;
    }

    let div = (r - l) / (2.0 * tx.x) + (t - b) / (2.0 * ty.y);
    Vec4::new(div, 0.0, 0.0, 1.0)
}

/// Pressure at `at`, pulled toward `centre` where the neighbour is solid.
#[inline]
fn neighbour_pressure(pressure: &Field, obstacles: &Field, at: Vec2, centre: f32) -> f32 {
    let p = pressure.sample(at).x;
    let solid = solid_at(obstacles, at);
    p + (centre - p) * solid
}

fn jacobi(
    pressure: &Field,
    divergence: &Field,
    obstacles: &Field,
    params: &StencilUniforms,
    uv: Vec2,
) -> Vec4 {
    let tx = Vec2::new(params.texel[0], 0.0);
    let ty = Vec2::new(0.0, params.texel[1]);

    let pc = pressure.sample(uv).x;
    let pl = neighbour_pressure(pressure, obstacles, uv - tx, pc);
    let pr = neighbour_pressure(pressure, obstacles, uv + tx, pc);
    let pb = neighbour_pressure(pressure, obstacles, uv - ty, pc);
    let pt = neighbour_pressure(pressure, obstacles, uv + ty, pc);
    let div = divergence.sample(uv).x;

    let wx = 1.0 / (tx.x * tx.x);
    let wy = 1.0 / (ty.y * ty.y);
    let p = (wx * (pl + pr) + wy * (pb + pt) - div) / (2.0 * wx + 2.0 * wy);
    Vec4::new(p, 0.0, 0.0, 1.0)
}

fn gradient(
    velocity: &Field,
    pressure: &Field,
    obstacles: &Field,
    params: &StencilUniforms,
    uv: Vec2,
) -> Vec4 {
    let tx = Vec2::new(params.texel[0], 0.0);
    let ty = Vec2::new(0.0, params.texel[1]);

    let pc = pressure.sample(uv).x;
    let pl = neighbour_pressure(pressure, obstacles, uv - tx, pc);
    let pr = neighbour_pressure(pressure, obstacles, uv + tx, pc);
    let pb = neighbour_pressure(pressure, obstacles, uv - ty, pc);
    let pt = neighbour_pressure(pressure, obstacles, uv + ty, pc);

    let grad = Vec2::new((pr - pl) / (2.0 * tx.x), (pt - pb) / (2.0 * ty.y));
    let v = velocity.sample(uv).truncate().truncate();
    let open = 1.0 - solid_at(obstacles, uv);
    ((v - grad) * open).extend(0.0).extend(1.0)
}

fn obstacle(params: &ObstacleUniforms, uv: Vec2) -> Vec4 {
    let mut p = uv - Vec2::from(params.point);
    p.x *= params.aspect;

    let w = 1.0 - smoothstep(params.radius * 0.8, params.radius, p.length());
    Vec4::new(w, 0.0, 0.0, 1.0)
}

fn pressure_view(
    pressure: &Field,
    obstacles: &Field,
    params: &PressureViewUniforms,
    uv: Vec2,
) -> Vec4 {
    let p = pressure.sample(uv).x * params.gain;
    let solid = solid_at(obstacles, uv);

    let heat = Vec3::new(p.max(0.0), p.abs() * 0.2, (-p).max(0.0)).clamp(Vec3::ZERO, Vec3::ONE);
    let tint = Vec3::new(
        params.obstacle_color[0],
        params.obstacle_color[1],
        params.obstacle_color[2],
    );
    heat.lerp(tint, solid).extend(1.0)
}
