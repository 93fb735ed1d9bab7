//! Three-row constraint that locks relative orientation.
//!
//! Shared by the slider and fixed joints. The constraint is
//! `C = 2 vec(q_b q₀⁻¹ q_a⁻¹) = 0`, where `q₀ = q_a⁻¹ q_b` is the relative
//! orientation captured at construction, expressed in body A's frame. The
//! error is measured in world space, so the Jacobian is `[0, -I, 0, I]` and
//! the effective mass is `K = I_a⁻¹ + I_b⁻¹`.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use sim_types::RigidBody;
use tracing::trace;

use crate::basis::{invert3, rotation_error};
use crate::context::SolverContext;
use crate::masses::BodyMasses;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AngularLockPart {
    /// `q_b0⁻¹ q_a0`, the inverse of the relative orientation at construction.
    initial_relative_inv: UnitQuaternion<f64>,
    inverse_mass: Matrix3<f64>,
    bias: Vector3<f64>,
    impulse: Vector3<f64>,
}

impl AngularLockPart {
    pub fn new(rotation_a: &UnitQuaternion<f64>, rotation_b: &UnitQuaternion<f64>) -> Self {
        Self {
            initial_relative_inv: rotation_b.inverse() * rotation_a,
            inverse_mass: Matrix3::zeros(),
            bias: Vector3::zeros(),
            impulse: Vector3::zeros(),
        }
    }

    pub fn impulse(&self) -> &Vector3<f64> {
        &self.impulse
    }

    pub fn reset(&mut self) {
        self.impulse = Vector3::zeros();
    }

    fn effective_inverse_mass(masses: &BodyMasses) -> Matrix3<f64> {
        if !masses.any_dynamic() {
            return Matrix3::zeros();
        }
        match invert3(&(masses.inv_inertia_a + masses.inv_inertia_b)) {
            Some(inverse) => inverse,
            None => {
                trace!("rotation lock mass matrix singular, skipping");
                Matrix3::zeros()
            }
        }
    }

    pub fn error(
        &self,
        rotation_a: &UnitQuaternion<f64>,
        rotation_b: &UnitQuaternion<f64>,
    ) -> Vector3<f64> {
        rotation_error(rotation_a, rotation_b, &self.initial_relative_inv)
    }

    pub fn prepare(
        &mut self,
        body_a: &RigidBody,
        body_b: &RigidBody,
        masses: &BodyMasses,
        ctx: &SolverContext,
    ) {
        self.inverse_mass = Self::effective_inverse_mass(masses);
        self.bias = if ctx.position_correction().uses_velocity_bias() {
            self.error(&body_a.pose.rotation, &body_b.pose.rotation) * ctx.bias_gain()
        } else {
            Vector3::zeros()
        };
    }

    pub fn warm_start(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, masses: &BodyMasses) {
        masses.apply_a(body_a, &Vector3::zeros(), &-self.impulse);
        masses.apply_b(body_b, &Vector3::zeros(), &self.impulse);
    }

    pub fn solve_velocity(
        &mut self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        masses: &BodyMasses,
    ) {
        let jv = body_b.twist.angular - body_a.twist.angular;
        let delta = self.inverse_mass * (-jv - self.bias);
        self.impulse += delta;

        masses.apply_a(body_a, &Vector3::zeros(), &-delta);
        masses.apply_b(body_b, &Vector3::zeros(), &delta);
    }

    /// Correct the orientation error directly, using masses captured from
    /// the current poses.
    pub fn solve_position(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        masses: &BodyMasses,
    ) {
        let inverse_mass = Self::effective_inverse_mass(masses);
        let error = self.error(&body_a.pose.rotation, &body_b.pose.rotation);
        let lambda = inverse_mass * (-error);

        masses.displace_a(body_a, &Vector3::zeros(), &-lambda);
        masses.displace_b(body_b, &Vector3::zeros(), &lambda);
    }
}
