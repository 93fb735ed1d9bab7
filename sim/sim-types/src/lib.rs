//! Core types for the joint-constraint layer.
//!
//! This crate provides the data the joint solver reads and writes:
//!
//! - [`RigidBody`] - Pose, velocity, inverse mass and inertia of one body
//! - [`BodySet`] - Owning store of bodies, addressed by [`BodyId`] handles
//! - [`JointId`] - Handle to a joint in a joint registry
//! - [`SolverConfig`] - Iteration counts, stabilization factor, warm starting
//! - [`SimError`] - Configuration-time failures
//!
//! # Handles
//!
//! Bodies and joints live in a generational [`Arena`]. A handle records the
//! slot and the generation it was issued for, so a handle to a removed body
//! resolves to `None` even after the slot is reused. Joints therefore never
//! own the bodies they connect.
//!
//! # Coordinate System
//!
//! Consistent with the CortenForge ecosystem:
//!
//! - X: right
//! - Y: forward
//! - Z: up
//! - Right-handed
//!
//! # Example
//!
//! ```
//! use sim_types::{BodySet, MassProperties, Pose, RigidBody, Twist};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bodies = BodySet::new();
//! let ground = bodies.insert(RigidBody::fixed(Pose::identity()));
//! let ball = bodies.insert(
//!     RigidBody::new(
//!         Pose::from_position(Point3::new(0.0, 0.0, 1.0)),
//!         MassProperties::sphere(1.0, 0.1),
//!     )
//!     .unwrap()
//!     .with_twist(Twist::linear(Vector3::new(0.0, 0.0, -1.0))),
//! );
//!
//! assert!(!bodies.get(ground).unwrap().is_dynamic());
//! assert_eq!(bodies.get(ball).unwrap().twist.linear.z, -1.0);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_possible_truncation,  // slot indices fit in u32
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod arena;
mod body;
mod body_set;
mod config;
mod error;
mod joint;

pub use arena::{Arena, Index};
pub use body::{BodyId, MassProperties, Pose, RigidBody, Twist};
pub use body_set::BodySet;
pub use config::{PositionCorrection, SolverConfig};
pub use error::SimError;
pub use joint::JointId;

// Re-export math types for convenience
pub use nalgebra::{Matrix2, Matrix3, Point3, UnitQuaternion, Vector2, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_body_set_handles_survive_other_removals() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(RigidBody::fixed(Pose::identity()));
        let b = bodies.insert(RigidBody::fixed(Pose::from_position(Point3::new(
            1.0, 0.0, 0.0,
        ))));

        bodies.remove(a);
        let c = bodies.insert(RigidBody::fixed(Pose::identity()));

        assert_eq!(bodies.get(b).unwrap().pose.position.x, 1.0);
        assert!(bodies.get(a).is_none());
        assert!(bodies.get(c).is_some());
    }

    #[test]
    fn test_pose_transform() {
        let pose = Pose::from_position_rotation(
            Point3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );

        let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));

        assert!((world.x - 1.0).abs() < 1e-10);
        assert!((world.y - 1.0).abs() < 1e-10);
    }
}
