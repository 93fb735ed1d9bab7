//! Linear velocity motor for the slider joint.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_types::{Result, SimError};

/// A velocity motor driving the relative slide speed along the joint axis.
///
/// The motor targets `speed` (m/s, body B relative to body A along the axis)
/// and may apply at most `max_force` (N). Within one step the accumulated
/// motor impulse is clamped to `±max_force * dt`.
///
/// # Example
///
/// ```
/// use sim_joint::SliderMotor;
///
/// let motor = SliderMotor::new(2.0, 10.0).unwrap();
/// assert_eq!(motor.max_impulse(0.1), 1.0);
/// assert!(SliderMotor::new(2.0, -1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliderMotor {
    speed: f64,
    max_force: f64,
}

impl Default for SliderMotor {
    fn default() -> Self {
        Self {
            speed: 0.0,
            max_force: 0.0,
        }
    }
}

impl SliderMotor {
    /// Create a motor with a target speed and force bound.
    pub fn new(speed: f64, max_force: f64) -> Result<Self> {
        Self::check_speed(speed)?;
        Self::check_force(max_force)?;
        Ok(Self { speed, max_force })
    }

    fn check_speed(speed: f64) -> Result<()> {
        if speed.is_finite() {
            Ok(())
        } else {
            Err(SimError::non_finite("motor speed"))
        }
    }

    fn check_force(max_force: f64) -> Result<()> {
        if max_force.is_finite() && max_force >= 0.0 {
            Ok(())
        } else {
            Err(SimError::InvalidMotorForce(max_force))
        }
    }

    /// Target speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Maximum force.
    #[must_use]
    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    /// Replace the target speed.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        Self::check_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Replace the force bound.
    pub fn set_max_force(&mut self, max_force: f64) -> Result<()> {
        Self::check_force(max_force)?;
        self.max_force = max_force;
        Ok(())
    }

    /// Largest impulse the motor may accumulate over a step of `dt`.
    #[must_use]
    pub fn max_impulse(&self, dt: f64) -> f64 {
        self.max_force * dt
    }

    /// Clamp an accumulated impulse to the step bound.
    #[must_use]
    pub fn clamp_impulse(&self, impulse: f64, dt: f64) -> f64 {
        let bound = self.max_impulse(dt);
        impulse.clamp(-bound, bound)
    }
}
