//! Three-row constraint that keeps two anchor points coincident.
//!
//! Shared by the ball-socket and fixed joints. With lever arms `r_a`, `r_b`
//! the constraint is `C = x_b + r_b - x_a - r_a = 0` and the effective mass
//! is `K = (m_a⁻¹ + m_b⁻¹) I - [r_a] I_a⁻¹ [r_a] - [r_b] I_b⁻¹ [r_b]`.

use nalgebra::{Matrix3, Point3, Vector3};
use sim_types::RigidBody;
use tracing::trace;

use crate::basis::invert3;
use crate::context::SolverContext;
use crate::masses::BodyMasses;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointPart {
    local_anchor_a: Vector3<f64>,
    local_anchor_b: Vector3<f64>,
    r_a: Vector3<f64>,
    r_b: Vector3<f64>,
    inverse_mass: Matrix3<f64>,
    bias: Vector3<f64>,
    impulse: Vector3<f64>,
}

impl PointPart {
    pub fn new(anchor: &Point3<f64>, body_a: &RigidBody, body_b: &RigidBody) -> Self {
        Self {
            local_anchor_a: body_a.pose.inverse_transform_point(anchor).coords,
            local_anchor_b: body_b.pose.inverse_transform_point(anchor).coords,
            r_a: Vector3::zeros(),
            r_b: Vector3::zeros(),
            inverse_mass: Matrix3::zeros(),
            bias: Vector3::zeros(),
            impulse: Vector3::zeros(),
        }
    }

    pub fn local_anchor_a(&self) -> &Vector3<f64> {
        &self.local_anchor_a
    }

    pub fn local_anchor_b(&self) -> &Vector3<f64> {
        &self.local_anchor_b
    }

    pub fn impulse(&self) -> &Vector3<f64> {
        &self.impulse
    }

    pub fn reset(&mut self) {
        self.impulse = Vector3::zeros();
    }

    /// World-space separation of the two anchors.
    pub fn separation(&self, body_a: &RigidBody, body_b: &RigidBody) -> Vector3<f64> {
        let r_a = body_a.pose.rotation * self.local_anchor_a;
        let r_b = body_b.pose.rotation * self.local_anchor_b;
        (body_b.pose.position + r_b) - (body_a.pose.position + r_a)
    }

    fn effective_inverse_mass(
        r_a: &Vector3<f64>,
        r_b: &Vector3<f64>,
        masses: &BodyMasses,
    ) -> Matrix3<f64> {
        if !masses.any_dynamic() {
            return Matrix3::zeros();
        }
        let skew_a = r_a.cross_matrix();
        let skew_b = r_b.cross_matrix();
        let k = Matrix3::from_diagonal_element(masses.inv_mass_sum())
            - skew_a * masses.inv_inertia_a * skew_a
            - skew_b * masses.inv_inertia_b * skew_b;

        match invert3(&k) {
            Some(inverse) => inverse,
            None => {
                trace!("point constraint mass matrix singular, skipping");
                Matrix3::zeros()
            }
        }
    }

    pub fn prepare(
        &mut self,
        body_a: &RigidBody,
        body_b: &RigidBody,
        masses: &BodyMasses,
        ctx: &SolverContext,
    ) {
        self.r_a = body_a.pose.rotation * self.local_anchor_a;
        self.r_b = body_b.pose.rotation * self.local_anchor_b;
        self.inverse_mass = Self::effective_inverse_mass(&self.r_a, &self.r_b, masses);
        self.bias = if ctx.position_correction().uses_velocity_bias() {
            self.separation(body_a, body_b) * ctx.bias_gain()
        } else {
            Vector3::zeros()
        };
    }

    fn apply(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        masses: &BodyMasses,
        impulse: &Vector3<f64>,
    ) {
        masses.apply_a(body_a, &-impulse, &-self.r_a.cross(impulse));
        masses.apply_b(body_b, impulse, &self.r_b.cross(impulse));
    }

    pub fn warm_start(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, masses: &BodyMasses) {
        self.apply(body_a, body_b, masses, &self.impulse);
    }

    pub fn solve_velocity(
        &mut self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        masses: &BodyMasses,
    ) {
        let jv = body_b.twist.velocity_at_point(&self.r_b)
            - body_a.twist.velocity_at_point(&self.r_a);
        let delta = self.inverse_mass * (-jv - self.bias);
        self.impulse += delta;
        self.apply(body_a, body_b, masses, &delta);
    }

    /// Remove the anchor separation directly, using masses captured from the
    /// current poses.
    pub fn solve_position(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        masses: &BodyMasses,
    ) {
        let r_a = body_a.pose.rotation * self.local_anchor_a;
        let r_b = body_b.pose.rotation * self.local_anchor_b;
        let inverse_mass = Self::effective_inverse_mass(&r_a, &r_b, masses);
        let lambda = inverse_mass * (-self.separation(body_a, body_b));

        masses.displace_a(body_a, &-lambda, &-r_a.cross(&lambda));
        masses.displace_b(body_b, &lambda, &r_b.cross(&lambda));
    }
}
