//! Slider joint: relative translation along one axis, nothing else.
//!
//! # Constraint Formulation
//!
//! With lever arms `r_a`, `r_b` from each center of mass to its anchor, the
//! relative displacement is `u = x_b + r_b - x_a - r_a`. The world axis `a`
//! and its completing vectors `n1`, `n2` rotate with body A.
//!
//! | Rows | Constraint                         | Kind                 |
//! |------|------------------------------------|----------------------|
//! | 2    | `u · n1 = 0`, `u · n2 = 0`         | equality             |
//! | 3    | relative orientation fixed         | equality             |
//! | 1    | `u · a >= lower`                   | inequality, optional |
//! | 1    | `u · a <= upper`                   | inequality, optional |
//! | 1    | `a · (v_b - v_a) = speed`          | bounded, optional    |
//!
//! Because `n1` rides on body A, the translational rows see body A's
//! rotation through the lever `(r_a + u)`, while body B uses `r_b`.
//!
//! # Example
//!
//! ```
//! use sim_joint::{JointConstraint, SliderJoint, SliderJointInfo, SolverContext};
//! use sim_types::{BodySet, MassProperties, Pose, RigidBody, SolverConfig};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bodies = BodySet::new();
//! let a = bodies.insert(
//!     RigidBody::new(Pose::identity(), MassProperties::sphere(1.0, 0.5)).unwrap(),
//! );
//! let b = bodies.insert(
//!     RigidBody::new(
//!         Pose::from_position(Point3::new(2.0, 0.0, 0.0)),
//!         MassProperties::sphere(1.0, 0.5),
//!     )
//!     .unwrap(),
//! );
//!
//! let anchor = Point3::new(1.0, 0.0, 0.0);
//! let info = SliderJointInfo::limited(a, b, anchor, Vector3::x(), -1.0, 1.0);
//! let mut joint =
//!     SliderJoint::new(&info, bodies.get(a).unwrap(), bodies.get(b).unwrap()).unwrap();
//!
//! let ctx = SolverContext::new(1.0 / 60.0, &SolverConfig::default()).unwrap();
//! joint.init_before_solve(&bodies, &ctx);
//! joint.warm_start(&mut bodies);
//! joint.solve_velocity_constraint(&mut bodies, &ctx);
//!
//! assert_eq!(joint.translation(&bodies), Some(0.0));
//! ```

use nalgebra::{Matrix2, Point3, Vector2, Vector3};
use sim_types::{BodyId, BodySet, RigidBody, Result, SimError};
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::angular_lock::AngularLockPart;
use crate::basis::{bilinear, invert2, invert_scalar, orthonormal_basis, quadratic};
use crate::context::SolverContext;
use crate::joint::{JointConstraint, JointType};
use crate::limits::{LimitViolation, SliderLimits};
use crate::masses::BodyMasses;
use crate::motor::SliderMotor;

// ============================================================================
// Construction info
// ============================================================================

/// Construction parameters for a [`SliderJoint`].
///
/// Anchor and axis are given in world space at creation time. The values are
/// validated when the joint is built, not here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliderJointInfo {
    /// First body. The slider axis rides on this body.
    pub body_a: BodyId,
    /// Second body.
    pub body_b: BodyId,
    /// Shared anchor point in world space.
    pub anchor: Point3<f64>,
    /// Slider axis in world space. Need not be normalized.
    pub axis: Vector3<f64>,
    /// Whether the translation limits are active.
    pub limit_enabled: bool,
    /// Lower translation limit along the axis.
    pub lower_limit: f64,
    /// Upper translation limit along the axis.
    pub upper_limit: f64,
    /// Whether the motor is active.
    pub motor_enabled: bool,
    /// Target relative speed of body B along the axis.
    pub motor_speed: f64,
    /// Maximum force the motor may apply.
    pub max_motor_force: f64,
}

impl SliderJointInfo {
    /// A slider with neither limits nor motor.
    #[must_use]
    pub fn new(body_a: BodyId, body_b: BodyId, anchor: Point3<f64>, axis: Vector3<f64>) -> Self {
        let limits = SliderLimits::default();
        let motor = SliderMotor::default();
        Self {
            body_a,
            body_b,
            anchor,
            axis,
            limit_enabled: false,
            lower_limit: limits.lower(),
            upper_limit: limits.upper(),
            motor_enabled: false,
            motor_speed: motor.speed(),
            max_motor_force: motor.max_force(),
        }
    }

    /// A slider with translation limits and no motor.
    #[must_use]
    pub fn limited(
        body_a: BodyId,
        body_b: BodyId,
        anchor: Point3<f64>,
        axis: Vector3<f64>,
        lower: f64,
        upper: f64,
    ) -> Self {
        Self::new(body_a, body_b, anchor, axis).with_limits(lower, upper)
    }

    /// A slider with translation limits and a motor.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn limited_with_motor(
        body_a: BodyId,
        body_b: BodyId,
        anchor: Point3<f64>,
        axis: Vector3<f64>,
        lower: f64,
        upper: f64,
        motor_speed: f64,
        max_motor_force: f64,
    ) -> Self {
        Self::limited(body_a, body_b, anchor, axis, lower, upper)
            .with_motor(motor_speed, max_motor_force)
    }

    /// Enable limits with the given bounds.
    #[must_use]
    pub fn with_limits(mut self, lower: f64, upper: f64) -> Self {
        self.limit_enabled = true;
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    /// Enable the motor with the given speed and force bound.
    #[must_use]
    pub fn with_motor(mut self, speed: f64, max_force: f64) -> Self {
        self.motor_enabled = true;
        self.motor_speed = speed;
        self.max_motor_force = max_force;
        self
    }
}

// ============================================================================
// Per-step geometry
// ============================================================================

/// World-space geometry of the slider for the current poses.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SliderFrame {
    axis: Vector3<f64>,
    n1: Vector3<f64>,
    n2: Vector3<f64>,
    u: Vector3<f64>,
    ra_u_n1: Vector3<f64>,
    ra_u_n2: Vector3<f64>,
    ra_u_axis: Vector3<f64>,
    rb_n1: Vector3<f64>,
    rb_n2: Vector3<f64>,
    rb_axis: Vector3<f64>,
}

impl SliderFrame {
    fn compute(joint: &SliderJoint, body_a: &RigidBody, body_b: &RigidBody) -> Self {
        let rotation_a = &body_a.pose.rotation;
        let axis = rotation_a * joint.local_axis;
        let n1 = rotation_a * joint.local_n1;
        let n2 = rotation_a * joint.local_n2;

        let r_a = rotation_a * joint.local_anchor_a;
        let r_b = body_b.pose.rotation * joint.local_anchor_b;
        let u = (body_b.pose.position - body_a.pose.position) + r_b - r_a;

        // Body A's anchor follows the sliding point.
        let ra_u = r_a + u;

        Self {
            axis,
            n1,
            n2,
            u,
            ra_u_n1: ra_u.cross(&n1),
            ra_u_n2: ra_u.cross(&n2),
            ra_u_axis: ra_u.cross(&axis),
            rb_n1: r_b.cross(&n1),
            rb_n2: r_b.cross(&n2),
            rb_axis: r_b.cross(&axis),
        }
    }

    fn translation(&self) -> f64 {
        self.u.dot(&self.axis)
    }

    fn perpendicular_error(&self) -> Vector2<f64> {
        Vector2::new(self.u.dot(&self.n1), self.u.dot(&self.n2))
    }

    fn perpendicular_mass(&self, masses: &BodyMasses) -> Matrix2<f64> {
        let sum = masses.inv_mass_sum();
        let (ia, ib) = (&masses.inv_inertia_a, &masses.inv_inertia_b);

        let k11 = sum + quadratic(ia, &self.ra_u_n1) + quadratic(ib, &self.rb_n1);
        let k12 =
            bilinear(&self.ra_u_n1, ia, &self.ra_u_n2) + bilinear(&self.rb_n1, ib, &self.rb_n2);
        let k21 =
            bilinear(&self.ra_u_n2, ia, &self.ra_u_n1) + bilinear(&self.rb_n2, ib, &self.rb_n1);
        let k22 = sum + quadratic(ia, &self.ra_u_n2) + quadratic(ib, &self.rb_n2);

        Matrix2::new(k11, k12, k21, k22)
    }

    fn perpendicular_inverse_mass(&self, masses: &BodyMasses) -> Matrix2<f64> {
        if !masses.any_dynamic() {
            return Matrix2::zeros();
        }
        match invert2(&self.perpendicular_mass(masses)) {
            Some(inverse) => inverse,
            None => {
                trace!("slider translation mass matrix singular, skipping");
                Matrix2::zeros()
            }
        }
    }

    fn axial_mass(&self, masses: &BodyMasses) -> f64 {
        masses.inv_mass_sum()
            + quadratic(&masses.inv_inertia_a, &self.ra_u_axis)
            + quadratic(&masses.inv_inertia_b, &self.rb_axis)
    }

    /// Jacobian row `[-dir, -lever_a, dir, lever_b]` applied to both twists.
    fn row_velocity(
        dir: &Vector3<f64>,
        lever_a: &Vector3<f64>,
        lever_b: &Vector3<f64>,
        body_a: &RigidBody,
        body_b: &RigidBody,
    ) -> f64 {
        dir.dot(&body_b.twist.linear) + lever_b.dot(&body_b.twist.angular)
            - dir.dot(&body_a.twist.linear)
            - lever_a.dot(&body_a.twist.angular)
    }

    /// Impulse of the two perpendicular rows, as linear and angular parts for
    /// body A then body B.
    fn perpendicular_impulse(
        &self,
        lambda: &Vector2<f64>,
    ) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let linear = self.n1 * lambda.x + self.n2 * lambda.y;
        let angular_a = self.ra_u_n1 * lambda.x + self.ra_u_n2 * lambda.y;
        let angular_b = self.rb_n1 * lambda.x + self.rb_n2 * lambda.y;
        (-linear, -angular_a, linear, angular_b)
    }
}

// ============================================================================
// Slider Joint
// ============================================================================

/// A slider (prismatic) joint between two rigid bodies.
///
/// Removes the two translational degrees of freedom perpendicular to the axis
/// and all three rotational ones. Translation along the axis may be bounded
/// by [`SliderLimits`] and driven by a [`SliderMotor`].
///
/// Accumulated impulses persist between steps for warm starting. They are
/// cleared whenever the sub-constraint they belong to is toggled, its bounds
/// change, or a limit stops or starts being violated.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderJoint {
    body_a: BodyId,
    body_b: BodyId,

    // Fixed at construction.
    local_anchor_a: Vector3<f64>,
    local_anchor_b: Vector3<f64>,
    local_axis: Vector3<f64>,
    local_n1: Vector3<f64>,
    local_n2: Vector3<f64>,
    rotation: AngularLockPart,

    limits: SliderLimits,
    limit_enabled: bool,
    motor: SliderMotor,
    motor_enabled: bool,

    // Per-step state. `frame` is `None` when a body handle did not resolve.
    frame: Option<SliderFrame>,
    masses: BodyMasses,
    perpendicular_inverse_mass: Matrix2<f64>,
    perpendicular_bias: Vector2<f64>,
    limit_inverse_mass: f64,
    motor_inverse_mass: f64,
    lower_bias: f64,
    upper_bias: f64,
    violation: LimitViolation,

    impulse_perpendicular: Vector2<f64>,
    impulse_lower: f64,
    impulse_upper: f64,
    impulse_motor: f64,
}

impl SliderJoint {
    /// Build a slider joint from its info and the two bodies' current state.
    ///
    /// Fails when both handles name the same body, when the axis has no
    /// direction, when the anchor is not finite, or when the limit or motor
    /// values are invalid.
    pub fn new(info: &SliderJointInfo, body_a: &RigidBody, body_b: &RigidBody) -> Result<Self> {
        if info.body_a == info.body_b {
            return Err(SimError::SameBody(info.body_a.raw()));
        }
        if !info.anchor.iter().all(|x| x.is_finite()) {
            return Err(SimError::non_finite("slider anchor"));
        }
        if !info.axis.iter().all(|x| x.is_finite()) {
            return Err(SimError::degenerate_axis("slider axis is not finite"));
        }
        let axis = info
            .axis
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| SimError::degenerate_axis("slider axis has zero length"))?;

        let limits = SliderLimits::new(info.lower_limit, info.upper_limit)?;
        let motor = SliderMotor::new(info.motor_speed, info.max_motor_force)?;

        let local_axis = body_a.pose.inverse_transform_vector(&axis);
        let (local_n1, local_n2) = orthonormal_basis(&local_axis);

        Ok(Self {
            body_a: info.body_a,
            body_b: info.body_b,
            local_anchor_a: body_a.pose.inverse_transform_point(&info.anchor).coords,
            local_anchor_b: body_b.pose.inverse_transform_point(&info.anchor).coords,
            local_axis,
            local_n1,
            local_n2,
            rotation: AngularLockPart::new(&body_a.pose.rotation, &body_b.pose.rotation),
            limits,
            limit_enabled: info.limit_enabled,
            motor,
            motor_enabled: info.motor_enabled,
            frame: None,
            masses: BodyMasses::default(),
            perpendicular_inverse_mass: Matrix2::zeros(),
            perpendicular_bias: Vector2::zeros(),
            limit_inverse_mass: 0.0,
            motor_inverse_mass: 0.0,
            lower_bias: 0.0,
            upper_bias: 0.0,
            violation: LimitViolation::none(),
            impulse_perpendicular: Vector2::zeros(),
            impulse_lower: 0.0,
            impulse_upper: 0.0,
            impulse_motor: 0.0,
        })
    }

    /// Anchor in body A coordinates.
    #[must_use]
    pub fn local_anchor_a(&self) -> &Vector3<f64> {
        &self.local_anchor_a
    }

    /// Anchor in body B coordinates.
    #[must_use]
    pub fn local_anchor_b(&self) -> &Vector3<f64> {
        &self.local_anchor_b
    }

    /// Unit slider axis in body A coordinates.
    #[must_use]
    pub fn local_axis(&self) -> &Vector3<f64> {
        &self.local_axis
    }

    /// World-space frame `[axis, n1, n2]` for body A's current orientation.
    #[must_use]
    pub fn world_basis(&self, body_a: &RigidBody) -> [Vector3<f64>; 3] {
        let rotation = &body_a.pose.rotation;
        [
            rotation * self.local_axis,
            rotation * self.local_n1,
            rotation * self.local_n2,
        ]
    }

    /// Current displacement along the axis, or `None` if a body is missing.
    #[must_use]
    pub fn translation(&self, bodies: &BodySet) -> Option<f64> {
        let body_a = bodies.get(self.body_a)?;
        let body_b = bodies.get(self.body_b)?;
        Some(SliderFrame::compute(self, body_a, body_b).translation())
    }

    /// Current displacement perpendicular to the axis, which the joint drives
    /// to zero.
    #[must_use]
    pub fn perpendicular_error(&self, bodies: &BodySet) -> Option<Vector2<f64>> {
        let body_a = bodies.get(self.body_a)?;
        let body_b = bodies.get(self.body_b)?;
        Some(SliderFrame::compute(self, body_a, body_b).perpendicular_error())
    }

    /// Current orientation error relative to construction.
    #[must_use]
    pub fn rotation_error(&self, bodies: &BodySet) -> Option<Vector3<f64>> {
        let body_a = bodies.get(self.body_a)?;
        let body_b = bodies.get(self.body_b)?;
        Some(self.rotation.error(&body_a.pose.rotation, &body_b.pose.rotation))
    }

    // ------------------------------------------------------------------------
    // Limits
    // ------------------------------------------------------------------------

    /// Whether the translation limits are active.
    #[must_use]
    pub fn is_limit_enabled(&self) -> bool {
        self.limit_enabled
    }

    /// Enable or disable the translation limits.
    pub fn enable_limit(&mut self, enabled: bool) {
        if self.limit_enabled != enabled {
            self.limit_enabled = enabled;
            self.reset_limits();
        }
    }

    /// Current translation limits.
    #[must_use]
    pub fn limits(&self) -> &SliderLimits {
        &self.limits
    }

    /// Lower translation limit.
    #[must_use]
    pub fn min_translation_limit(&self) -> f64 {
        self.limits.lower()
    }

    /// Set the lower translation limit. Fails if it would exceed the upper.
    pub fn set_min_translation_limit(&mut self, lower: f64) -> Result<()> {
        if lower != self.limits.lower() {
            self.limits.set_lower(lower)?;
            self.reset_limits();
        }
        Ok(())
    }

    /// Upper translation limit.
    #[must_use]
    pub fn max_translation_limit(&self) -> f64 {
        self.limits.upper()
    }

    /// Set the upper translation limit. Fails if it would fall below the lower.
    pub fn set_max_translation_limit(&mut self, upper: f64) -> Result<()> {
        if upper != self.limits.upper() {
            self.limits.set_upper(upper)?;
            self.reset_limits();
        }
        Ok(())
    }

    /// Which bounds were reached at the last `init_before_solve`.
    #[must_use]
    pub fn limit_violation(&self) -> LimitViolation {
        self.violation
    }

    /// Clear both accumulated limit impulses.
    pub fn reset_limits(&mut self) {
        debug!(body_a = %self.body_a, body_b = %self.body_b, "slider limit impulses reset");
        self.impulse_lower = 0.0;
        self.impulse_upper = 0.0;
    }

    // ------------------------------------------------------------------------
    // Motor
    // ------------------------------------------------------------------------

    /// Whether the motor is active.
    #[must_use]
    pub fn is_motor_enabled(&self) -> bool {
        self.motor_enabled
    }

    /// Enable or disable the motor.
    pub fn enable_motor(&mut self, enabled: bool) {
        if self.motor_enabled != enabled {
            self.motor_enabled = enabled;
            debug!(body_a = %self.body_a, body_b = %self.body_b, "slider motor impulse reset");
            self.impulse_motor = 0.0;
        }
    }

    /// Current motor settings.
    #[must_use]
    pub fn motor(&self) -> &SliderMotor {
        &self.motor
    }

    /// Target motor speed.
    #[must_use]
    pub fn motor_speed(&self) -> f64 {
        self.motor.speed()
    }

    /// Set the target motor speed.
    pub fn set_motor_speed(&mut self, speed: f64) -> Result<()> {
        self.motor.set_speed(speed)
    }

    /// Maximum motor force.
    #[must_use]
    pub fn max_motor_force(&self) -> f64 {
        self.motor.max_force()
    }

    /// Set the maximum motor force. Negative or non-finite values are rejected.
    pub fn set_max_motor_force(&mut self, max_force: f64) -> Result<()> {
        self.motor.set_max_force(max_force)
    }

    /// Force the motor applied over the last step of length `timestep`.
    #[must_use]
    pub fn motor_force(&self, timestep: f64) -> f64 {
        if timestep > 0.0 {
            self.impulse_motor / timestep
        } else {
            0.0
        }
    }

    // ------------------------------------------------------------------------
    // Accumulated impulses
    // ------------------------------------------------------------------------

    /// Accumulated impulse of the two perpendicular rows.
    #[must_use]
    pub fn translation_impulse(&self) -> &Vector2<f64> {
        &self.impulse_perpendicular
    }

    /// Accumulated impulse of the rotation lock.
    #[must_use]
    pub fn rotation_impulse(&self) -> &Vector3<f64> {
        self.rotation.impulse()
    }

    /// Accumulated lower limit impulse, never negative.
    #[must_use]
    pub fn lower_limit_impulse(&self) -> f64 {
        self.impulse_lower
    }

    /// Accumulated upper limit impulse, never negative.
    #[must_use]
    pub fn upper_limit_impulse(&self) -> f64 {
        self.impulse_upper
    }

    /// Accumulated motor impulse.
    #[must_use]
    pub fn motor_impulse(&self) -> f64 {
        self.impulse_motor
    }

    fn reset_impulses(&mut self) {
        self.impulse_perpendicular = Vector2::zeros();
        self.rotation.reset();
        self.impulse_lower = 0.0;
        self.impulse_upper = 0.0;
        self.impulse_motor = 0.0;
    }

    // ------------------------------------------------------------------------
    // Velocity sub-steps
    // ------------------------------------------------------------------------

    fn solve_perpendicular(
        &mut self,
        frame: &SliderFrame,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    ) {
        let jv = Vector2::new(
            SliderFrame::row_velocity(&frame.n1, &frame.ra_u_n1, &frame.rb_n1, body_a, body_b),
            SliderFrame::row_velocity(&frame.n2, &frame.ra_u_n2, &frame.rb_n2, body_a, body_b),
        );
        let delta = self.perpendicular_inverse_mass * (-jv - self.perpendicular_bias);
        self.impulse_perpendicular += delta;

        let (linear_a, angular_a, linear_b, angular_b) = frame.perpendicular_impulse(&delta);
        self.masses.apply_a(body_a, &linear_a, &angular_a);
        self.masses.apply_b(body_b, &linear_b, &angular_b);
    }

    fn solve_lower_limit(
        &mut self,
        frame: &SliderFrame,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    ) {
        let jv = SliderFrame::row_velocity(
            &frame.axis,
            &frame.ra_u_axis,
            &frame.rb_axis,
            body_a,
            body_b,
        );
        let delta = self.limit_inverse_mass * (-jv - self.lower_bias);

        let previous = self.impulse_lower;
        self.impulse_lower = (previous + delta).max(0.0);
        let delta = self.impulse_lower - previous;

        self.masses
            .apply_a(body_a, &(-frame.axis * delta), &(-frame.ra_u_axis * delta));
        self.masses
            .apply_b(body_b, &(frame.axis * delta), &(frame.rb_axis * delta));
    }

    fn solve_upper_limit(
        &mut self,
        frame: &SliderFrame,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
    ) {
        let jv = -SliderFrame::row_velocity(
            &frame.axis,
            &frame.ra_u_axis,
            &frame.rb_axis,
            body_a,
            body_b,
        );
        let delta = self.limit_inverse_mass * (-jv - self.upper_bias);

        let previous = self.impulse_upper;
        self.impulse_upper = (previous + delta).max(0.0);
        let delta = self.impulse_upper - previous;

        self.masses
            .apply_a(body_a, &(frame.axis * delta), &(frame.ra_u_axis * delta));
        self.masses
            .apply_b(body_b, &(-frame.axis * delta), &(-frame.rb_axis * delta));
    }

    fn solve_motor(
        &mut self,
        frame: &SliderFrame,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        ctx: &SolverContext,
    ) {
        let jv = frame.axis.dot(&body_a.twist.linear) - frame.axis.dot(&body_b.twist.linear);
        let delta = self.motor_inverse_mass * (-jv - self.motor.speed());

        let previous = self.impulse_motor;
        self.impulse_motor = self
            .motor
            .clamp_impulse(previous + delta, ctx.timestep());
        let delta = self.impulse_motor - previous;

        self.masses
            .apply_a(body_a, &(frame.axis * delta), &Vector3::zeros());
        self.masses
            .apply_b(body_b, &(-frame.axis * delta), &Vector3::zeros());
    }
}

impl JointConstraint for SliderJoint {
    fn body_a(&self) -> BodyId {
        self.body_a
    }

    fn body_b(&self) -> BodyId {
        self.body_b
    }

    fn joint_type(&self) -> JointType {
        JointType::Slider
    }

    fn init_before_solve(&mut self, bodies: &BodySet, ctx: &SolverContext) {
        let (Some(body_a), Some(body_b)) = (bodies.get(self.body_a), bodies.get(self.body_b)) else {
            warn!(
                body_a = %self.body_a,
                body_b = %self.body_b,
                "slider joint body missing, skipping"
            );
            self.frame = None;
            return;
        };

        let masses = BodyMasses::new(body_a, body_b);
        let frame = SliderFrame::compute(self, body_a, body_b);
        let gain = ctx.bias_gain();

        self.perpendicular_inverse_mass = frame.perpendicular_inverse_mass(&masses);
        self.rotation.prepare(body_a, body_b, &masses, ctx);
        self.perpendicular_bias = if ctx.position_correction().uses_velocity_bias() {
            frame.perpendicular_error() * gain
        } else {
            Vector2::zeros()
        };

        let translation = frame.translation();
        let violation = if self.limit_enabled {
            self.limits.violation(translation)
        } else {
            LimitViolation::none()
        };
        if violation.lower != self.violation.lower {
            trace!(translation, "slider lower limit transition");
            self.impulse_lower = 0.0;
        }
        if violation.upper != self.violation.upper {
            trace!(translation, "slider upper limit transition");
            self.impulse_upper = 0.0;
        }
        self.violation = violation;

        // Limits have no position pass, so their bias always applies.
        self.lower_bias = self.limits.lower_error(translation) * gain;
        self.upper_bias = self.limits.upper_error(translation) * gain;
        self.limit_inverse_mass = if masses.any_dynamic() {
            invert_scalar(frame.axial_mass(&masses))
        } else {
            0.0
        };
        self.motor_inverse_mass = invert_scalar(masses.inv_mass_sum());

        if !ctx.warm_starting() {
            self.reset_impulses();
        }

        self.masses = masses;
        self.frame = Some(frame);
    }

    fn warm_start(&mut self, bodies: &mut BodySet) {
        let Some(frame) = self.frame else {
            return;
        };
        let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) else {
            return;
        };

        let limit = if self.limit_enabled {
            self.impulse_upper - self.impulse_lower
        } else {
            0.0
        };
        let motor = if self.motor_enabled {
            self.impulse_motor
        } else {
            0.0
        };

        let (mut linear_a, mut angular_a, mut linear_b, mut angular_b) =
            frame.perpendicular_impulse(&self.impulse_perpendicular);
        linear_a += frame.axis * (limit + motor);
        angular_a += frame.ra_u_axis * limit;
        linear_b -= frame.axis * (limit + motor);
        angular_b -= frame.rb_axis * limit;

        self.masses.apply_a(body_a, &linear_a, &angular_a);
        self.masses.apply_b(body_b, &linear_b, &angular_b);
        self.rotation.warm_start(body_a, body_b, &self.masses);
    }

    fn solve_velocity_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext) {
        let Some(frame) = self.frame else {
            return;
        };
        let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) else {
            return;
        };

        self.solve_perpendicular(&frame, body_a, body_b);
        self.rotation.solve_velocity(body_a, body_b, &self.masses);

        if self.limit_enabled {
            if self.violation.lower {
                self.solve_lower_limit(&frame, body_a, body_b);
            }
            if self.violation.upper {
                self.solve_upper_limit(&frame, body_a, body_b);
            }
        }

        if self.motor_enabled {
            self.solve_motor(&frame, body_a, body_b, ctx);
        }
    }

    fn solve_position_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext) {
        if self.frame.is_none() || !ctx.position_correction().uses_position_pass() {
            return;
        }
        let Some((body_a, body_b)) = bodies.pair_mut(self.body_a, self.body_b) else {
            return;
        };

        let masses = BodyMasses::new(body_a, body_b);
        let frame = SliderFrame::compute(self, body_a, body_b);
        let lambda = frame.perpendicular_inverse_mass(&masses) * (-frame.perpendicular_error());

        let (linear_a, angular_a, linear_b, angular_b) = frame.perpendicular_impulse(&lambda);
        masses.displace_a(body_a, &linear_a, &angular_a);
        masses.displace_b(body_b, &linear_b, &angular_b);

        // Orientations moved, so the inertia tensors are re-read.
        let masses = BodyMasses::new(body_a, body_b);
        self.rotation.solve_position(body_a, body_b, &masses);
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}
