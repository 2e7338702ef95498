use crate::error::FluidError;

/// Pointer force injection. The defaults are the values the solver was tuned with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatConfig {
    pub force: f32,  // gain from normalized pointer delta to uv/s
    pub radius: f32, // gaussian falloff, in squared uv units
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            force: 500.0,
            radius: 0.02,
        }
    }
}

/// Presentation of the pressure field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub obstacle_color: [f32; 3],
    pub pressure_gain: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            obstacle_color: [1.0, 1.0, 1.0],
            pressure_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidConfig {
    /// 1 = display resolution, >1 downsamples the simulation grid.
    pub sim_scale: f32,
    /// Velocity kept per 1/60 s.
    pub dissipation_vel: f32,
    pub pressure_iters: u32,
    /// Fallback step used when the measured frame interval is unusable.
    pub time_step: f32,
    pub splat: SplatConfig,
    pub view: ViewConfig,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            sim_scale: 1.0,
            dissipation_vel: 0.999,
            pressure_iters: 20,
            time_step: 1.0 / 60.0,
            splat: SplatConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl FluidConfig {
    pub fn with_sim_scale(mut self, sim_scale: f32) -> Self {
        self.sim_scale = sim_scale;
        self
    }

    pub fn with_dissipation(mut self, dissipation_vel: f32) -> Self {
        self.dissipation_vel = dissipation_vel;
        self
    }

    pub fn with_pressure_iters(mut self, pressure_iters: u32) -> Self {
        self.pressure_iters = pressure_iters;
        self
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn validate(&self) -> Result<(), FluidError> {
        if !self.sim_scale.is_finite() || self.sim_scale < 1.0 {
            return Err(FluidError::InvalidConfig(format!(
                "sim_scale must be >= 1, got {}",
                self.sim_scale
            )));
        }
        if !(self.dissipation_vel > 0.0 && self.dissipation_vel <= 1.0) {
            return Err(FluidError::InvalidConfig(format!(
                "dissipation_vel must be in (0, 1], got {}",
                self.dissipation_vel
            )));
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(FluidError::InvalidConfig(format!(
                "time_step must be > 0, got {}",
                self.time_step
            )));
        }
        if !self.splat.force.is_finite() {
            return Err(FluidError::InvalidConfig("splat force must be finite".into()));
        }
        if !self.splat.radius.is_finite() || self.splat.radius <= 0.0 {
            return Err(FluidError::InvalidConfig(format!(
                "splat radius must be > 0, got {}",
                self.splat.radius
            )));
        }
        Ok(())
    }
}
