use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;

/// Pointer in normalized grid space, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub down: bool,
    pub position: Vec2,
    pub delta: Vec2, // displacement not yet turned into a splat
}

/// Pending force injection taken from the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub position: Vec2,
    pub delta: Vec2,
}

/// Shared pointer state. Input callbacks write through one handle while the
/// solver consumes through another; consumption is a single locked read-and-reset.
#[derive(Debug, Clone, Default)]
pub struct PointerHandle(Arc<Mutex<PointerState>>);

impl PointerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PointerState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn press(&self, uv: Vec2) {
        let mut p = self.lock();
        p.down = true;
        p.position = uv;
        p.delta = Vec2::ZERO;
    }

    pub fn move_to(&self, uv: Vec2) {
        let mut p = self.lock();
        let step = uv - p.position;
        p.delta += step;
        p.position = uv;
    }

    pub fn release(&self) {
        self.lock().down = false;
    }

    pub fn leave(&self) {
        self.lock().down = false;
    }

    pub fn snapshot(&self) -> PointerState {
        *self.lock()
    }

    /// The pending impulse if the pointer is down; the delta is zeroed in the same critical section.
    pub fn take_impulse(&self) -> Option<Impulse> {
        let mut p = self.lock();
        if !p.down {
            return None;
        }
        let delta = std::mem::take(&mut p.delta);
        Some(Impulse {
            position: p.position,
            delta,
        })
    }
}

/// Screen coordinates (origin top-left, y down) to uv (origin bottom-left).
pub fn screen_to_uv(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(x / width, 1.0 - y / height)
}
