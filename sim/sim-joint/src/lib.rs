//! Impulse-based joint constraints for rigid-body simulation.
//!
//! Joints connect two bodies of a [`BodySet`] and remove relative degrees of
//! freedom. They are solved with sequential impulses: each joint row computes
//! the impulse that cancels its velocity error, clamps the accumulated total
//! where the row is one-sided, and applies it to both bodies before the next
//! row is visited.
//!
//! # Joint Types
//!
//! - [`SliderJoint`]: translation along one axis, with optional limits and a
//!   velocity motor (prismatic joint)
//! - [`BallSocketJoint`]: anchors coincide, rotation is free
//! - [`FixedJoint`]: anchors coincide and orientation is locked
//!
//! # Solve Protocol
//!
//! Every joint implements [`JointConstraint`], called by
//! [`ConstraintSolver`] in four phases per step:
//!
//! ```text
//! init_before_solve          effective masses, biases, limit state
//! warm_start                 re-apply last step's impulses
//! solve_velocity_constraint  x velocity_iterations
//!   (caller integrates positions)
//! solve_position_constraint  x position_iterations
//! ```
//!
//! Drift is corrected with a Baumgarte bias, with a non-linear position
//! pass, or with both, selected by [`PositionCorrection`].
//!
//! # Example
//!
//! ```
//! use sim_joint::{ConstraintSolver, JointSet, SliderJointInfo, SolverConfig};
//! use sim_types::{BodySet, MassProperties, Pose, RigidBody, Twist};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bodies = BodySet::new();
//! let rail = bodies.insert(RigidBody::fixed(Pose::identity()));
//! let cart = bodies.insert(
//!     RigidBody::new(Pose::identity(), MassProperties::sphere(1.0, 0.25))
//!         .unwrap()
//!         .with_twist(Twist::linear(Vector3::new(3.0, 1.0, 0.0))),
//! );
//!
//! // Cart slides along X between -1 and 1.
//! let info = SliderJointInfo::limited(rail, cart, Point3::origin(), Vector3::x(), -1.0, 1.0);
//! let mut joints = JointSet::new();
//! joints.insert(info, &bodies, false).unwrap();
//!
//! let solver = ConstraintSolver::new(SolverConfig::default()).unwrap();
//! let dt = 1.0 / 60.0;
//! solver.solve_velocities(&mut joints, &mut bodies, dt).unwrap();
//! for (_, body) in bodies.iter_mut() {
//!     body.integrate_position(dt);
//! }
//! solver.solve_positions(&mut joints, &mut bodies, dt).unwrap();
//!
//! let cart = bodies.get(cart).unwrap();
//! assert!(cart.twist.linear.y.abs() < 1e-9);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-joint/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod angular_lock;
mod ball_socket;
mod basis;
mod context;
mod fixed;
mod joint;
mod joint_set;
mod limits;
mod masses;
mod motor;
mod point;
mod slider;
mod solver;

pub use ball_socket::{BallSocketJoint, BallSocketJointInfo};
pub use basis::orthonormal_basis;
pub use context::SolverContext;
pub use fixed::{FixedJoint, FixedJointInfo};
pub use joint::{Joint, JointConstraint, JointInfo, JointType};
pub use joint_set::JointSet;
pub use limits::{LimitViolation, SliderLimits};
pub use motor::SliderMotor;
pub use slider::{SliderJoint, SliderJointInfo};
pub use solver::{ConstraintSolver, SolverStats};

// Re-export the shared vocabulary used in every signature.
pub use sim_types::{
    BodyId, BodySet, JointId, PositionCorrection, Result, RigidBody, SimError, SolverConfig,
};
