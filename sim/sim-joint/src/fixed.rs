//! Fixed joint: anchors coincide and relative orientation is locked.

use nalgebra::{Point3, Vector3};
use sim_types::{BodyId, BodySet, RigidBody, Result, SimError};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::angular_lock::AngularLockPart;
use crate::context::SolverContext;
use crate::joint::{JointConstraint, JointType};
use crate::masses::BodyMasses;
use crate::point::PointPart;

/// Construction parameters for a [`FixedJoint`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedJointInfo {
    /// First body.
    pub body_a: BodyId,
    /// Second body.
    pub body_b: BodyId,
    /// Shared anchor point in world space.
    pub anchor: Point3<f64>,
}

impl FixedJointInfo {
    /// Create a new fixed joint description.
    #[must_use]
    pub fn new(body_a: BodyId, body_b: BodyId, anchor: Point3<f64>) -> Self {
        Self {
            body_a,
            body_b,
            anchor,
        }
    }
}

/// A fixed (weld) joint removing all 6 relative degrees of freedom.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedJoint {
    body_a: BodyId,
    body_b: BodyId,
    point: PointPart,
    rotation: AngularLockPart,
    masses: BodyMasses,
    active: bool,
}

impl FixedJoint {
    /// Build the joint from its info and the two bodies' current state.
    pub fn new(info: &FixedJointInfo, body_a: &RigidBody, body_b: &RigidBody) -> Result<Self> {
        if info.body_a == info.body_b {
            return Err(SimError::SameBody(info.body_a.raw()));
        }
        if !info.anchor.iter().all(|x| x.is_finite()) {
            return Err(SimError::non_finite("fixed joint anchor"));
        }

        Ok(Self {
            body_a: info.body_a,
            body_b: info.body_b,
            point: PointPart::new(&info.anchor, body_a, body_b),
            rotation: AngularLockPart::new(&body_a.pose.rotation, &body_b.pose.rotation),
            masses: BodyMasses::default(),
            active: false,
        })
    }

    /// Accumulated impulse keeping the anchors together.
    #[must_use]
    pub fn translation_impulse(&self) -> &Vector3<f64> {
        self.point.impulse()
    }

    /// Accumulated impulse of the rotation lock.
    #[must_use]
    pub fn rotation_impulse(&self) -> &Vector3<f64> {
        self.rotation.impulse()
    }

    /// Current anchor separation, or `None` if a body is missing.
    #[must_use]
    pub fn separation(&self, bodies: &BodySet) -> Option<Vector3<f64>> {
        Some(self.point.separation(bodies.get(self.body_a)?, bodies.get(self.body_b)?))
    }

    /// Current orientation error, or `None` if a body is missing.
    #[must_use]
    pub fn rotation_error(&self, bodies: &BodySet) -> Option<Vector3<f64>> {
        let body_a = bodies.get(self.body_a)?;
        let body_b = bodies.get(self.body_b)?;
        Some(self.rotation.error(&body_a.pose.rotation, &body_b.pose.rotation))
    }
}

impl JointConstraint for FixedJoint {
    fn body_a(&self) -> BodyId {
        self.body_a
    }

    fn body_b(&self) -> BodyId {
        self.body_b
    }

    fn joint_type(&self) -> JointType {
        JointType::Fixed
    }

    fn init_before_solve(&mut self, bodies: &BodySet, ctx: &SolverContext) {
        let (Some(body_a), Some(body_b)) = (bodies.get(self.body_a), bodies.get(self.body_b)) else {
            warn!(
                body_a = %self.body_a,
                body_b = %self.body_b,
                "fixed joint body missing, skipping"
            );
            self.active = false;
            return;
        };

        self.masses = BodyMasses::new(body_a, body_b);
        self.point.prepare(body_a, body_b, &self.masses, ctx);
        self.rotation.prepare(body_a, body_b, &self.masses, ctx);
        if !ctx.warm_starting() {
            self.point.reset();
            self.rotation.reset();
        }
        self.active = true;
    }

    fn warm_start(&mut self, bodies: &mut BodySet) {
        if !self.active {
            return;
        }
        if let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) {
            self.point.warm_start(body_a, body_b, &self.masses);
            self.rotation.warm_start(body_a, body_b, &self.masses);
        }
    }

    fn solve_velocity_constraint(&mut self, bodies: &mut BodySet, _ctx: &SolverContext) {
        if !self.active {
            return;
        }
        if let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) {
            self.point.solve_velocity(body_a, body_b, &self.masses);
            self.rotation.solve_velocity(body_a, body_b, &self.masses);
        }
    }

    fn solve_position_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext) {
        if !self.active || !ctx.position_correction().uses_position_pass() {
            return;
        }
        if let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) {
            let masses = BodyMasses::new(body_a, body_b);
            self.point.solve_position(body_a, body_b, &masses);
            let masses = BodyMasses::new(body_a, body_b);
            self.rotation.solve_position(body_a, body_b, &masses);
        }
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}
