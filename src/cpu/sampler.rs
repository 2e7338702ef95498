use glam::{Vec2, Vec4};

use crate::field::Field;

impl Field {
    /// Bilinear sample with clamp-to-edge addressing, uv in [0,1]² with
    /// cell (i, j) centred on ((i+0.5)/w, (j+0.5)/h).
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let x = uv.x * self.width() as f32 - 0.5;
        let y = uv.y * self.height() as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let max_x = self.width() as i64 - 1;
        let max_y = self.height() as i64 - 1;
        let cx = |v: f32| (v as i64).clamp(0, max_x) as u32;
        let cy = |v: f32| (v as i64).clamp(0, max_y) as u32;
        let (i0, i1) = (cx(x0), cx(x0 + 1.0));
        let (j0, j1) = (cy(y0), cy(y0 + 1.0));

        let bottom = self.texel(i0, j0).lerp(self.texel(i1, j0), fx);
        let top = self.texel(i0, j1).lerp(self.texel(i1, j1), fx);
        bottom.lerp(top, fy)
    }
}

#[inline]
pub fn cell_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    )
}
