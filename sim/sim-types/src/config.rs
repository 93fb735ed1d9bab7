//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How positional drift in joints is corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionCorrection {
    /// Feed a fraction of the position error into the velocity solve as a
    /// bias velocity. Cheap, but adds energy.
    Baumgarte,
    /// Leave velocities untouched and correct poses directly in a separate
    /// position pass after integration.
    NonLinearGaussSeidel,
    /// Apply both the velocity bias and the position pass.
    #[default]
    Combined,
}

impl PositionCorrection {
    /// Whether the velocity solve includes the Baumgarte bias.
    #[must_use]
    pub const fn uses_velocity_bias(self) -> bool {
        matches!(self, Self::Baumgarte | Self::Combined)
    }

    /// Whether the position pass runs.
    #[must_use]
    pub const fn uses_position_pass(self) -> bool {
        matches!(self, Self::NonLinearGaussSeidel | Self::Combined)
    }
}

/// Configuration for the joint solver.
///
/// # Example
///
/// ```
/// use sim_types::{PositionCorrection, SolverConfig};
///
/// let config = SolverConfig::default()
///     .iterations(12, 3)
///     .baumgarte_factor(0.1)
///     .position_correction(PositionCorrection::NonLinearGaussSeidel);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.velocity_iterations, 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Number of velocity iterations per step.
    pub velocity_iterations: usize,
    /// Number of position iterations per step.
    pub position_iterations: usize,
    /// Fraction of positional error corrected per step through the velocity
    /// bias (`BETA`). Must lie in `[0, 1]`.
    pub baumgarte_factor: f64,
    /// Seed each step with the previous step's impulses.
    pub warm_starting: bool,
    /// Drift correction technique.
    pub position_correction: PositionCorrection,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            velocity_iterations: 8,
            position_iterations: 4,
            baumgarte_factor: 0.2,
            warm_starting: true,
            position_correction: PositionCorrection::Combined,
        }
    }
}

impl SolverConfig {
    /// Configuration tuned for real-time use.
    #[must_use]
    pub fn realtime() -> Self {
        Self {
            velocity_iterations: 4,
            position_iterations: 2,
            ..Default::default()
        }
    }

    /// Configuration favoring convergence over speed.
    #[must_use]
    pub fn accurate() -> Self {
        Self {
            velocity_iterations: 32,
            position_iterations: 8,
            baumgarte_factor: 0.1,
            ..Default::default()
        }
    }

    /// Set the number of solver iterations.
    #[must_use]
    pub fn iterations(mut self, velocity: usize, position: usize) -> Self {
        self.velocity_iterations = velocity;
        self.position_iterations = position;
        self
    }

    /// Set the stabilization factor.
    #[must_use]
    pub fn baumgarte_factor(mut self, beta: f64) -> Self {
        self.baumgarte_factor = beta;
        self
    }

    /// Enable or disable warm starting.
    #[must_use]
    pub fn warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }

    /// Set the drift correction technique.
    #[must_use]
    pub fn position_correction(mut self, technique: PositionCorrection) -> Self {
        self.position_correction = technique;
        self
    }

    /// Validate the solver configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.velocity_iterations == 0 {
            return Err(crate::SimError::invalid_config(
                "velocity_iterations must be at least 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.baumgarte_factor) {
            return Err(crate::SimError::invalid_config(
                "baumgarte_factor must be between 0 and 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.warm_starting);
        assert_eq!(config.position_correction, PositionCorrection::Combined);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(SolverConfig::realtime().validate().is_ok());
        assert!(SolverConfig::accurate().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(SolverConfig::default().iterations(0, 4).validate().is_err());
        assert!(SolverConfig::default().baumgarte_factor(1.5).validate().is_err());
        assert!(SolverConfig::default().baumgarte_factor(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_position_correction_flags() {
        assert!(PositionCorrection::Baumgarte.uses_velocity_bias());
        assert!(!PositionCorrection::Baumgarte.uses_position_pass());
        assert!(!PositionCorrection::NonLinearGaussSeidel.uses_velocity_bias());
        assert!(PositionCorrection::NonLinearGaussSeidel.uses_position_pass());
        assert!(PositionCorrection::Combined.uses_velocity_bias());
        assert!(PositionCorrection::Combined.uses_position_pass());
    }
}
