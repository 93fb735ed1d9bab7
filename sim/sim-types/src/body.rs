//! Rigid body types consumed by the joint solver.
//!
//! A [`RigidBody`] carries the state that constraint solves read and write:
//! pose, twist, inverse mass, and inverse inertia. The body position is its
//! center of mass, so lever arms are measured from [`Pose::position`].

use nalgebra::{Matrix3, Point3, Quaternion, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::Index;

/// Handle to a rigid body stored in a [`BodySet`](crate::BodySet).
///
/// Handles never own the body. A handle whose body was removed stops
/// resolving instead of aliasing a newer body in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub Index);

impl BodyId {
    /// Create a body ID from raw slot and generation values.
    #[must_use]
    pub const fn from_raw_parts(slot: u32, generation: u32) -> Self {
        Self(Index::from_raw_parts(slot, generation))
    }

    /// Get the underlying arena index.
    #[must_use]
    pub const fn index(self) -> Index {
        self.0
    }

    /// Raw value suitable for error messages and logs.
    #[must_use]
    pub const fn raw(self) -> u64 {
        let (slot, generation) = self.0.into_raw_parts();
        ((generation as u64) << 32) | slot as u64
    }
}

impl From<Index> for BodyId {
    fn from(index: Index) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "Body({slot}v{generation})")
    }
}

/// Position and orientation of a rigid body.
///
/// # Example
///
/// ```
/// use sim_types::Pose;
/// use nalgebra::{Point3, Vector3};
///
/// let pose = Pose::from_position(Point3::new(1.0, 2.0, 3.0));
/// let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert_eq!(world, Point3::new(2.0, 2.0, 3.0));
/// assert_eq!(pose.transform_vector(&Vector3::x()), Vector3::x());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Center of mass in world coordinates.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Identity pose at the origin.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Pose with the given position and no rotation.
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Pose from position and rotation.
    #[must_use]
    pub const fn from_position_rotation(
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self { position, rotation }
    }

    /// Transform a point from local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.position + self.rotation * local.coords
    }

    /// Rotate a vector from local to world coordinates.
    #[must_use]
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * local
    }

    /// Transform a point from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation.inverse() * (world - self.position))
    }

    /// Rotate a vector from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_vector(&self, world: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * world
    }

    /// Check that every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|x| x.is_finite())
            && self.rotation.coords.iter().all(|x| x.is_finite())
    }
}

/// Linear and angular velocity of a rigid body, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Twist {
    /// Linear velocity of the center of mass (m/s).
    pub linear: Vector3<f64>,
    /// Angular velocity (rad/s).
    pub angular: Vector3<f64>,
}

impl Default for Twist {
    fn default() -> Self {
        Self::zero()
    }
}

impl Twist {
    /// Create a twist from linear and angular parts.
    #[must_use]
    pub const fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }

    /// Zero velocity.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
        }
    }

    /// Pure linear velocity.
    #[must_use]
    pub fn linear(v: Vector3<f64>) -> Self {
        Self {
            linear: v,
            angular: Vector3::zeros(),
        }
    }

    /// Pure angular velocity.
    #[must_use]
    pub fn angular(omega: Vector3<f64>) -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: omega,
        }
    }

    /// Velocity of a point at `offset` from the center of mass.
    #[must_use]
    pub fn velocity_at_point(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        self.linear + self.angular.cross(offset)
    }

    /// Check that every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.linear.iter().all(|x| x.is_finite()) && self.angular.iter().all(|x| x.is_finite())
    }
}

/// Mass and rotational inertia of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassProperties {
    /// Total mass in kg. Zero or infinity means static.
    pub mass: f64,
    /// Inertia tensor about the center of mass in local coordinates (kg·m²).
    pub inertia: Matrix3<f64>,
}

impl MassProperties {
    /// Create mass properties with given values.
    #[must_use]
    pub const fn new(mass: f64, inertia: Matrix3<f64>) -> Self {
        Self { mass, inertia }
    }

    /// Mass properties of an immovable body.
    #[must_use]
    pub fn infinite() -> Self {
        Self {
            mass: f64::INFINITY,
            inertia: Matrix3::zeros(),
        }
    }

    /// Uniform solid sphere: I = (2/5) m r².
    #[must_use]
    pub fn sphere(mass: f64, radius: f64) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self {
            mass,
            inertia: Matrix3::from_diagonal_element(i),
        }
    }

    /// Uniform solid box given its half extents.
    #[must_use]
    pub fn box_shape(mass: f64, half_extents: Vector3<f64>) -> Self {
        let x2 = 4.0 * half_extents.x * half_extents.x;
        let y2 = 4.0 * half_extents.y * half_extents.y;
        let z2 = 4.0 * half_extents.z * half_extents.z;

        Self {
            mass,
            inertia: Matrix3::from_diagonal(&Vector3::new(
                mass * (y2 + z2) / 12.0,
                mass * (x2 + z2) / 12.0,
                mass * (x2 + y2) / 12.0,
            )),
        }
    }

    /// Inverse mass, 0 for static bodies.
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        if self.is_static() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Inverse inertia tensor in local coordinates.
    ///
    /// Static bodies and singular tensors yield zero, which locks rotation.
    #[must_use]
    pub fn inverse_inertia(&self) -> Matrix3<f64> {
        if self.is_static() {
            return Matrix3::zeros();
        }
        self.inertia.try_inverse().unwrap_or_else(Matrix3::zeros)
    }

    /// Check if this represents a static (immovable) body.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0 || self.mass.is_infinite()
    }

    /// Validate that the mass properties are physically valid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.mass < 0.0 || self.mass.is_nan() {
            return Err(crate::SimError::invalid_mass(
                "mass must be non-negative or infinity",
            ));
        }

        if !self.inertia.iter().all(|x| x.is_finite()) {
            return Err(crate::SimError::invalid_mass(
                "inertia tensor must be finite",
            ));
        }

        let eigenvalues = self.inertia.symmetric_eigenvalues();
        if eigenvalues.iter().any(|&e| e < -1e-10) {
            return Err(crate::SimError::invalid_mass(
                "inertia tensor must be positive semi-definite",
            ));
        }

        Ok(())
    }
}

/// A rigid body as seen by the constraint solver.
///
/// # Example
///
/// ```
/// use sim_types::{MassProperties, Pose, RigidBody, Twist};
/// use nalgebra::{Point3, Vector3};
///
/// let mut body = RigidBody::new(
///     Pose::from_position(Point3::new(0.0, 0.0, 1.0)),
///     MassProperties::sphere(2.0, 0.5),
/// )
/// .unwrap();
///
/// body.apply_impulse(&Vector3::new(2.0, 0.0, 0.0), &Vector3::zeros());
/// assert_eq!(body.twist.linear.x, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// Current pose. Position is the center of mass.
    pub pose: Pose,
    /// Current velocity.
    pub twist: Twist,
    inv_mass: f64,
    local_inv_inertia: Matrix3<f64>,
    sleeping: bool,
}

impl RigidBody {
    /// Create a body at rest.
    ///
    /// Fails when the mass properties or the pose are invalid.
    pub fn new(pose: Pose, mass: MassProperties) -> crate::Result<Self> {
        mass.validate()?;
        if !pose.is_finite() {
            return Err(crate::SimError::non_finite("body pose"));
        }

        Ok(Self {
            pose,
            twist: Twist::zero(),
            inv_mass: mass.inverse_mass(),
            local_inv_inertia: mass.inverse_inertia(),
            sleeping: false,
        })
    }

    /// Create an immovable body.
    #[must_use]
    pub fn fixed(pose: Pose) -> Self {
        Self {
            pose,
            twist: Twist::zero(),
            inv_mass: 0.0,
            local_inv_inertia: Matrix3::zeros(),
            sleeping: false,
        }
    }

    /// Set the initial velocity.
    #[must_use]
    pub fn with_twist(mut self, twist: Twist) -> Self {
        self.twist = twist;
        self
    }

    /// Inverse mass, 0 for static bodies.
    #[must_use]
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Inverse inertia tensor in body coordinates.
    #[must_use]
    pub fn local_inv_inertia(&self) -> &Matrix3<f64> {
        &self.local_inv_inertia
    }

    /// Inverse inertia tensor rotated into world coordinates: R I⁻¹ Rᵀ.
    #[must_use]
    pub fn world_inv_inertia(&self) -> Matrix3<f64> {
        let rotation = self.pose.rotation.to_rotation_matrix();
        rotation.matrix() * self.local_inv_inertia * rotation.matrix().transpose()
    }

    /// Whether the body responds to impulses at all.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.inv_mass > 0.0 || self.local_inv_inertia.iter().any(|x| *x != 0.0)
    }

    /// Apply a linear impulse at the center of mass and an angular impulse.
    pub fn apply_impulse(&mut self, linear: &Vector3<f64>, angular: &Vector3<f64>) {
        if !self.is_dynamic() {
            return;
        }
        self.twist.linear += linear * self.inv_mass;
        self.twist.angular += self.world_inv_inertia() * angular;
    }

    /// Move the body by a pseudo-displacement without touching its velocity.
    ///
    /// `angular` is a small rotation vector applied through the first-order
    /// quaternion update `q + ½ (0, ω) q`, followed by renormalization.
    pub fn displace(&mut self, linear: &Vector3<f64>, angular: &Vector3<f64>) {
        self.pose.position += linear;

        let current = *self.pose.rotation.quaternion();
        let delta = Quaternion::from_parts(0.0, *angular) * current * 0.5;
        self.pose.rotation = UnitQuaternion::new_normalize(current + delta);
    }

    /// Advance the pose by the current velocity (semi-implicit Euler).
    pub fn integrate_position(&mut self, dt: f64) {
        let linear = self.twist.linear * dt;
        let angular = self.twist.angular * dt;
        self.displace(&linear, &angular);
    }

    /// Whether the body is asleep.
    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Put the body to sleep and clear its velocity.
    pub fn sleep(&mut self) {
        self.sleeping = true;
        self.twist = Twist::zero();
    }

    /// Wake the body up.
    pub fn wake_up(&mut self) {
        self.sleeping = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pose_roundtrip_point() {
        let pose = Pose::from_position_rotation(
            Point3::new(1.0, -2.0, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let local = Point3::new(0.3, 0.7, -1.1);
        let back = pose.inverse_transform_point(&pose.transform_point(&local));

        assert_relative_eq!(back, local, epsilon = 1e-12);
    }

    #[test]
    fn test_twist_velocity_at_point() {
        let twist = Twist::new(Vector3::x(), Vector3::new(0.0, 0.0, 1.0));
        let v = twist.velocity_at_point(&Vector3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(v, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_mass_properties_static() {
        let props = MassProperties::infinite();
        assert!(props.is_static());
        assert_eq!(props.inverse_mass(), 0.0);
        assert_eq!(props.inverse_inertia(), Matrix3::zeros());
    }

    #[test]
    fn test_mass_properties_validate() {
        assert!(MassProperties::sphere(1.0, 0.5).validate().is_ok());
        assert!(MassProperties::new(-1.0, Matrix3::identity()).validate().is_err());
        assert!(MassProperties::new(f64::NAN, Matrix3::identity()).validate().is_err());
        assert!(MassProperties::new(1.0, -Matrix3::identity()).validate().is_err());
    }

    #[test]
    fn test_world_inv_inertia_rotates() {
        let props = MassProperties::new(1.0, Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 4.0)));
        let pose = Pose::from_position_rotation(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let body = RigidBody::new(pose, props).unwrap();
        let world = body.world_inv_inertia();

        // Local x and y swap under a quarter turn about z.
        assert_relative_eq!(world[(0, 0)], 0.5, epsilon = 1e-12);
        assert_relative_eq!(world[(1, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(world[(2, 2)], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_body_ignores_impulses() {
        let mut body = RigidBody::fixed(Pose::identity());
        body.apply_impulse(&Vector3::new(5.0, 0.0, 0.0), &Vector3::new(0.0, 1.0, 0.0));

        assert!(!body.is_dynamic());
        assert_eq!(body.twist, Twist::zero());
    }

    #[test]
    fn test_displace_keeps_unit_rotation() {
        let mut body = RigidBody::new(Pose::identity(), MassProperties::sphere(1.0, 1.0)).unwrap();
        body.displace(&Vector3::new(0.1, 0.0, 0.0), &Vector3::new(0.0, 0.0, 0.05));

        assert_relative_eq!(body.pose.position.x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(body.pose.rotation.quaternion().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.pose.rotation.angle(), 0.05, epsilon = 1e-3);
    }

    #[test]
    fn test_sleep_and_wake() {
        let mut body = RigidBody::new(Pose::identity(), MassProperties::sphere(1.0, 1.0))
            .unwrap()
            .with_twist(Twist::linear(Vector3::x()));
        body.sleep();
        assert!(body.is_sleeping());
        assert_eq!(body.twist, Twist::zero());

        body.wake_up();
        assert!(!body.is_sleeping());
    }

    #[test]
    fn test_body_id_display() {
        let id = BodyId::from_raw_parts(3, 1);
        assert_eq!(id.to_string(), "Body(3v1)");
        assert_eq!(id.raw(), (1_u64 << 32) | 3);
    }
}
