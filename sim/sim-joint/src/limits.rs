//! Translation limits for the slider joint.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_types::{Result, SimError};

/// Lower and upper bounds on the slider displacement along its axis.
///
/// Unlike a clamping setter, invalid bounds are rejected: a limit pair that
/// reaches the solver always satisfies `lower <= upper`.
///
/// # Example
///
/// ```
/// use sim_joint::SliderLimits;
///
/// let limits = SliderLimits::new(-1.0, 1.0).unwrap();
/// assert_eq!(limits.range(), 2.0);
///
/// let state = limits.violation(1.5);
/// assert!(state.upper && !state.lower);
///
/// assert!(SliderLimits::new(2.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliderLimits {
    lower: f64,
    upper: f64,
}

impl Default for SliderLimits {
    fn default() -> Self {
        Self {
            lower: -1.0,
            upper: 1.0,
        }
    }
}

impl SliderLimits {
    /// Create new limits, failing if `lower > upper` or either bound is NaN.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        Self::check(lower, upper)?;
        Ok(Self { lower, upper })
    }

    /// Create symmetric limits `[-bound, bound]`.
    pub fn symmetric(bound: f64) -> Result<Self> {
        Self::new(-bound.abs(), bound.abs())
    }

    fn check(lower: f64, upper: f64) -> Result<()> {
        // NaN fails the comparison, so it is rejected here too.
        if lower <= upper {
            Ok(())
        } else {
            Err(SimError::InvalidLimits { lower, upper })
        }
    }

    /// Lower bound.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Length of the allowed travel.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Replace the lower bound.
    pub fn set_lower(&mut self, lower: f64) -> Result<()> {
        Self::check(lower, self.upper)?;
        self.lower = lower;
        Ok(())
    }

    /// Replace the upper bound.
    pub fn set_upper(&mut self, upper: f64) -> Result<()> {
        Self::check(self.lower, upper)?;
        self.upper = upper;
        Ok(())
    }

    /// Check if a displacement is within limits.
    #[must_use]
    pub fn contains(&self, displacement: f64) -> bool {
        displacement >= self.lower && displacement <= self.upper
    }

    /// Signed distance to the lower bound, `displacement - lower`.
    #[must_use]
    pub fn lower_error(&self, displacement: f64) -> f64 {
        displacement - self.lower
    }

    /// Signed distance to the upper bound, `upper - displacement`.
    #[must_use]
    pub fn upper_error(&self, displacement: f64) -> f64 {
        self.upper - displacement
    }

    /// Which bounds are reached at `displacement`.
    ///
    /// A bound counts as reached when its signed distance is zero or
    /// negative, so a body resting exactly on a bound stays constrained.
    #[must_use]
    pub fn violation(&self, displacement: f64) -> LimitViolation {
        LimitViolation {
            lower: self.lower_error(displacement) <= 0.0,
            upper: self.upper_error(displacement) <= 0.0,
        }
    }
}

/// Which limit bounds are currently reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LimitViolation {
    /// Displacement at or below the lower bound.
    pub lower: bool,
    /// Displacement at or above the upper bound.
    pub upper: bool,
}

impl LimitViolation {
    /// Neither bound reached.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            lower: false,
            upper: false,
        }
    }

    /// Whether any bound is reached.
    #[must_use]
    pub fn any(&self) -> bool {
        self.lower || self.upper
    }
}
