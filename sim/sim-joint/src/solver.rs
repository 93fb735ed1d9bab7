//! Sequential-impulse driver for a [`JointSet`].
//!
//! One step runs in two halves around position integration:
//!
//! 1. [`ConstraintSolver::solve_velocities`]: every joint computes its
//!    effective masses and biases, re-applies last step's impulses when warm
//!    starting is enabled, then all joints are iterated in storage order.
//! 2. The caller integrates body positions from the corrected velocities.
//! 3. [`ConstraintSolver::solve_positions`]: when the configured correction
//!    uses a position pass, joints are iterated again on positions directly.
//!
//! Iteration order is the joint storage order, so results are reproducible
//! for a given insertion history.

use sim_types::{BodySet, Result, SolverConfig};
use tracing::{debug, trace};

use crate::context::SolverContext;
use crate::joint::JointConstraint;
use crate::joint_set::JointSet;

/// Summary of one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverStats {
    /// Number of joints processed.
    pub joints: usize,
    /// Number of iterations run over the whole set.
    pub iterations: usize,
    /// Whether accumulated impulses were re-applied first.
    pub warm_started: bool,
}

/// Iterative joint solver.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSolver {
    config: SolverConfig,
}

impl ConstraintSolver {
    /// Create a solver, validating the configuration.
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: SolverConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Correct body velocities so every joint is satisfied at velocity level.
    ///
    /// Queued wake-ups from the joint set are applied first.
    pub fn solve_velocities(
        &self,
        joints: &mut JointSet,
        bodies: &mut BodySet,
        timestep: f64,
    ) -> Result<SolverStats> {
        let ctx = SolverContext::new(timestep, &self.config)?;
        joints.wake_up_pending(bodies);

        for (_, joint) in joints.iter_mut() {
            joint.init_before_solve(bodies, &ctx);
        }

        let warm_started = ctx.warm_starting();
        if warm_started {
            for (_, joint) in joints.iter_mut() {
                joint.warm_start(bodies);
            }
        }

        for iteration in 0..self.config.velocity_iterations {
            trace!(iteration, "velocity iteration");
            for (_, joint) in joints.iter_mut() {
                joint.solve_velocity_constraint(bodies, &ctx);
            }
        }

        let stats = SolverStats {
            joints: joints.len(),
            iterations: self.config.velocity_iterations,
            warm_started,
        };
        debug!(?stats, timestep, "velocity solve finished");
        Ok(stats)
    }

    /// Remove residual drift by moving bodies directly.
    ///
    /// Does nothing under pure Baumgarte correction.
    pub fn solve_positions(
        &self,
        joints: &mut JointSet,
        bodies: &mut BodySet,
        timestep: f64,
    ) -> Result<SolverStats> {
        let ctx = SolverContext::new(timestep, &self.config)?;
        if !ctx.position_correction().uses_position_pass() {
            return Ok(SolverStats {
                joints: joints.len(),
                ..SolverStats::default()
            });
        }

        for iteration in 0..self.config.position_iterations {
            trace!(iteration, "position iteration");
            for (_, joint) in joints.iter_mut() {
                joint.solve_position_constraint(bodies, &ctx);
            }
        }

        let stats = SolverStats {
            joints: joints.len(),
            iterations: self.config.position_iterations,
            warm_started: false,
        };
        debug!(?stats, timestep, "position solve finished");
        Ok(stats)
    }
}
