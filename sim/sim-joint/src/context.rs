//! Per-step data shared by every joint during one solve.

use sim_types::{PositionCorrection, Result, SimError, SolverConfig};

/// Step parameters handed to each joint phase.
///
/// Built once per step and validated on construction, so the solve phases
/// themselves never fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverContext {
    timestep: f64,
    baumgarte_factor: f64,
    warm_starting: bool,
    position_correction: PositionCorrection,
}

impl SolverContext {
    /// Build the context for a step of length `timestep`.
    pub fn new(timestep: f64, config: &SolverConfig) -> Result<Self> {
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(SimError::InvalidTimestep(timestep));
        }
        config.validate()?;

        Ok(Self {
            timestep,
            baumgarte_factor: config.baumgarte_factor,
            warm_starting: config.warm_starting,
            position_correction: config.position_correction,
        })
    }

    /// Step length in seconds.
    #[must_use]
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Inverse step length.
    #[must_use]
    pub fn inv_timestep(&self) -> f64 {
        1.0 / self.timestep
    }

    /// Stabilization factor.
    #[must_use]
    pub fn baumgarte_factor(&self) -> f64 {
        self.baumgarte_factor
    }

    /// Gain turning a position error into a bias velocity: `BETA / dt`.
    #[must_use]
    pub fn bias_gain(&self) -> f64 {
        self.baumgarte_factor / self.timestep
    }

    /// Whether impulses carry over between steps.
    #[must_use]
    pub fn warm_starting(&self) -> bool {
        self.warm_starting
    }

    /// Drift correction technique.
    #[must_use]
    pub fn position_correction(&self) -> PositionCorrection {
        self.position_correction
    }
}
