use bevy::log::debug;
use bevy::prelude::Resource;

use crate::compute::backend::Backend;
use crate::compute::kernels::DisplaySurface;
use crate::solver::FluidSim;

/// Upper bound on the simulated interval of a single frame, in seconds.
pub const MAX_FRAME_DT: f32 = 0.033;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Stopped,
}

/// Step size for a measured frame interval: capped at `MAX_FRAME_DT`, and
/// `time_step` when the interval is zero, negative or not a number.
pub fn clamp_frame_dt(elapsed_secs: f64, time_step: f32) -> f32 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return time_step;
    }
    (elapsed_secs as f32).min(MAX_FRAME_DT)
}

pub struct RenderedFrame<'a> {
    pub frame: u64,
    pub dt: f32,
    pub surface: &'a DisplaySurface,
}

/// Caller-driven animation loop: whoever owns the clock calls `tick` once per frame.
#[derive(Resource, Debug, Default)]
pub struct FrameDriver {
    state: RunState,
    last_time_ms: Option<f64>,
    frame: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
    }

    /// The first tick after resuming uses the configured fixed step.
    pub fn resume(&mut self) {
        self.state = RunState::Running;
        self.last_time_ms = None;
    }

    /// Step and render `sim` for a frame stamped `now_ms` (milliseconds).
    pub fn tick<'s, B: Backend>(
        &mut self,
        sim: &'s mut FluidSim<B>,
        now_ms: f64,
    ) -> Option<RenderedFrame<'s>> {
        if self.state == RunState::Stopped {
            return None;
        }

        let time_step = sim.config().time_step;
        let elapsed = self
            .last_time_ms
            .replace(now_ms)
            .map(|last| (now_ms - last) / 1000.0);
        if !elapsed.is_some_and(|s| s.is_finite() && s > 0.0) {
            debug!("frame {}: no usable interval, stepping {time_step}s", self.frame);
        }
        let dt = clamp_frame_dt(elapsed.unwrap_or(f64::NAN), time_step);

        sim.step(dt);
        let surface = sim.render();
        self.frame += 1;

        Some(RenderedFrame {
            frame: self.frame,
            dt,
            surface,
        })
    }
}
