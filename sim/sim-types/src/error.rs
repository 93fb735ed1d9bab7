//! Error types for joint and solver configuration.
//!
//! Only construction and configuration can fail. The per-step solve phases
//! never return errors; degenerate numerics are neutralized in place.

use thiserror::Error;

/// Errors that can occur while configuring bodies, joints, or the solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Invalid body ID referenced.
    #[error("invalid body ID: {0}")]
    InvalidBodyId(u64),

    /// Invalid joint ID referenced.
    #[error("invalid joint ID: {0}")]
    InvalidJointId(u64),

    /// A joint was asked to connect a body to itself.
    #[error("joint connects body {0} to itself")]
    SameBody(u64),

    /// Joint axis has zero length or is not finite.
    #[error("degenerate joint axis: {reason}")]
    DegenerateAxis {
        /// Description of the axis problem.
        reason: String,
    },

    /// Lower limit above upper limit, or a bound is NaN.
    #[error("invalid limits: lower {lower} must not exceed upper {upper}")]
    InvalidLimits {
        /// Requested lower bound.
        lower: f64,
        /// Requested upper bound.
        upper: f64,
    },

    /// Motor force bound negative or not finite.
    #[error("invalid max motor force: {0} (must be non-negative and finite)")]
    InvalidMotorForce(f64),

    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Invalid mass properties.
    #[error("invalid mass properties: {reason}")]
    InvalidMassProperties {
        /// Description of what's wrong.
        reason: String,
    },

    /// A NaN or infinite value reached an input.
    #[error("non-finite value in {what}")]
    NonFiniteInput {
        /// Which input was rejected.
        what: String,
    },
}

impl SimError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMassProperties {
            reason: reason.into(),
        }
    }

    /// Create a degenerate axis error.
    #[must_use]
    pub fn degenerate_axis(reason: impl Into<String>) -> Self {
        Self::DegenerateAxis {
            reason: reason.into(),
        }
    }

    /// Create a non-finite input error.
    #[must_use]
    pub fn non_finite(what: impl Into<String>) -> Self {
        Self::NonFiniteInput { what: what.into() }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::InvalidTimestep(_) | Self::InvalidLimits { .. }
        )
    }

    /// Check if this error refers to a missing body or joint.
    #[must_use]
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, Self::InvalidBodyId(_) | Self::InvalidJointId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidLimits {
            lower: 2.0,
            upper: 1.0,
        };
        assert!(err.to_string().contains("lower 2"));

        let err = SimError::InvalidMotorForce(-3.0);
        assert!(err.to_string().contains("-3"));

        let err = SimError::degenerate_axis("zero length");
        assert!(err.to_string().contains("zero length"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(SimError::invalid_config("bad").is_config_error());
        assert!(SimError::InvalidTimestep(0.0).is_config_error());
        assert!(SimError::InvalidBodyId(4).is_lookup_error());
        assert!(!SimError::InvalidMotorForce(-1.0).is_lookup_error());
    }
}
