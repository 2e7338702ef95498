// grid-resident sample buffers and their double-buffered pairing
use glam::Vec4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Scalar, // R
    Vector, // RG
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Scalar => 1,
            ChannelLayout::Vector => 2,
        }
    }
}

/// Identity of a backing allocation, handed out by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u64);

#[derive(Debug, Clone)]
pub struct Field {
    id: FieldId,
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pub(crate) data: Vec<f32>, // row-major, row 0 at the bottom
}

impl Field {
    /// Zero-initialized storage. Backends call this after validating the extent.
    pub fn zeroed(id: FieldId, width: u32, height: u32, layout: ChannelLayout) -> Self {
        let len = width as usize * height as usize * layout.channels();
        Self {
            id,
            width,
            height,
            layout,
            data: vec![0.0; len],
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Cell value, unused channels read as zero.
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        let ch = self.layout.channels();
        let base = (y as usize * self.width as usize + x as usize) * ch;
        let mut out = Vec4::ZERO;
        for c in 0..ch {
            out[c] = self.data[base + c];
        }
        out
    }

    /// Overwrite one cell. Intended for seeding state, not for per-frame work.
    pub fn set_texel(&mut self, x: u32, y: u32, value: Vec4) {
        let ch = self.layout.channels();
        let base = (y as usize * self.width as usize + x as usize) * ch;
        for c in 0..ch {
            self.data[base + c] = value[c];
        }
    }

    pub fn same_shape(&self, other: &Field) -> bool {
        self.extent() == other.extent() && self.layout == other.layout
    }
}

/// Two fields of identical shape; one is sampled while the other is rendered into.
#[derive(Debug)]
pub struct PingPong {
    fields: [Field; 2],
    read: usize,
}

impl PingPong {
    pub fn new(a: Field, b: Field) -> Self {
        debug_assert!(a.same_shape(&b), "ping-pong halves must share a shape");
        debug_assert_ne!(a.id(), b.id(), "ping-pong halves must be distinct");
        Self {
            fields: [a, b],
            read: 0,
        }
    }

    pub fn read(&self) -> &Field {
        &self.fields[self.read]
    }

    pub fn write(&self) -> &Field {
        &self.fields[1 - self.read]
    }

    pub fn read_mut(&mut self) -> &mut Field {
        &mut self.fields[self.read]
    }

    /// Borrow the read half immutably and the write half mutably at once.
    pub fn split(&mut self) -> (&Field, &mut Field) {
        let (a, b) = self.fields.split_at_mut(1);
        if self.read == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }

    pub fn extent(&self) -> (u32, u32) {
        self.fields[0].extent()
    }
}

/// Simulation resolution derived from the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
}

impl Grid {
    pub fn from_surface(surface_width: u32, surface_height: u32, sim_scale: f32) -> Self {
        let scale = sim_scale.max(1.0);
        let downsample = |v: u32| ((v as f32 / scale).floor() as u32).max(1);
        Self {
            width: downsample(surface_width),
            height: downsample(surface_height),
        }
    }

    pub fn texel(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
