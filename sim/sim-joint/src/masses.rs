//! Inverse masses of a joint's two bodies, cached for one step.

use nalgebra::{Matrix3, Vector3};
use sim_types::RigidBody;

/// Inverse mass and world-space inverse inertia of both bodies.
///
/// Captured in `init_before_solve` and reused by warm starting and every
/// velocity iteration. The position pass captures a fresh copy from the
/// post-integration poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BodyMasses {
    pub inv_mass_a: f64,
    pub inv_mass_b: f64,
    pub inv_inertia_a: Matrix3<f64>,
    pub inv_inertia_b: Matrix3<f64>,
    pub dynamic_a: bool,
    pub dynamic_b: bool,
}

impl Default for BodyMasses {
    fn default() -> Self {
        Self {
            inv_mass_a: 0.0,
            inv_mass_b: 0.0,
            inv_inertia_a: Matrix3::zeros(),
            inv_inertia_b: Matrix3::zeros(),
            dynamic_a: false,
            dynamic_b: false,
        }
    }
}

impl BodyMasses {
    pub fn new(body_a: &RigidBody, body_b: &RigidBody) -> Self {
        Self {
            inv_mass_a: body_a.inv_mass(),
            inv_mass_b: body_b.inv_mass(),
            inv_inertia_a: body_a.world_inv_inertia(),
            inv_inertia_b: body_b.world_inv_inertia(),
            dynamic_a: body_a.is_dynamic(),
            dynamic_b: body_b.is_dynamic(),
        }
    }

    pub fn inv_mass_sum(&self) -> f64 {
        self.inv_mass_a + self.inv_mass_b
    }

    pub fn any_dynamic(&self) -> bool {
        self.dynamic_a || self.dynamic_b
    }

    /// Change body A's velocity by an impulse expressed in world space.
    pub fn apply_a(&self, body: &mut RigidBody, linear: &Vector3<f64>, angular: &Vector3<f64>) {
        if self.dynamic_a {
            body.twist.linear += linear * self.inv_mass_a;
            body.twist.angular += self.inv_inertia_a * angular;
        }
    }

    /// Change body B's velocity by an impulse expressed in world space.
    pub fn apply_b(&self, body: &mut RigidBody, linear: &Vector3<f64>, angular: &Vector3<f64>) {
        if self.dynamic_b {
            body.twist.linear += linear * self.inv_mass_b;
            body.twist.angular += self.inv_inertia_b * angular;
        }
    }

    /// Move body A by a pseudo-impulse.
    pub fn displace_a(&self, body: &mut RigidBody, linear: &Vector3<f64>, angular: &Vector3<f64>) {
        if self.dynamic_a {
            body.displace(&(linear * self.inv_mass_a), &(self.inv_inertia_a * angular));
        }
    }

    /// Move body B by a pseudo-impulse.
    pub fn displace_b(&self, body: &mut RigidBody, linear: &Vector3<f64>, angular: &Vector3<f64>) {
        if self.dynamic_b {
            body.displace(&(linear * self.inv_mass_b), &(self.inv_inertia_b * angular));
        }
    }
}
