//! Geometry helpers shared by the joint constraints.

use nalgebra::{Matrix2, Matrix3, UnitQuaternion, Vector3};

/// Complete a unit axis into a right-handed orthonormal frame `{axis, n1, n2}`.
///
/// The seed vector is the world axis least aligned with `axis` (smallest
/// absolute component, ties going to x, then y, then z). Its component along
/// `axis` is removed, which leaves a vector of length at least `sqrt(2/3)`,
/// so the result never degenerates.
///
/// ```
/// use sim_joint::orthonormal_basis;
/// use nalgebra::Vector3;
///
/// let (n1, n2) = orthonormal_basis(&Vector3::x());
/// assert_eq!(n1, Vector3::y());
/// assert_eq!(n2, Vector3::z());
/// ```
#[must_use]
pub fn orthonormal_basis(axis: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let abs = axis.abs();
    let seed_index = if abs.x <= abs.y && abs.x <= abs.z {
        0
    } else if abs.y <= abs.z {
        1
    } else {
        2
    };
    let mut seed = Vector3::zeros();
    seed[seed_index] = 1.0;

    let n1 = (seed - axis * axis.dot(&seed)).normalize();
    let n2 = axis.cross(&n1);
    (n1, n2)
}

/// Invert a 2×2 effective-mass matrix, or `None` when it is singular.
pub(crate) fn invert2(k: &Matrix2<f64>) -> Option<Matrix2<f64>> {
    k.try_inverse()
        .filter(|inv| inv.iter().all(|x| x.is_finite()))
}

/// Invert a 3×3 effective-mass matrix, or `None` when it is singular.
pub(crate) fn invert3(k: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    k.try_inverse()
        .filter(|inv| inv.iter().all(|x| x.is_finite()))
}

/// Invert a scalar effective mass, 0 when it is not positive.
pub(crate) fn invert_scalar(k: f64) -> f64 {
    if k > 0.0 && k.is_finite() {
        1.0 / k
    } else {
        0.0
    }
}

/// Small-angle rotation error between two orientations, relative to the
/// body-frame relative orientation `q_a⁻¹ q_b` captured at construction.
///
/// `initial_relative_inv` is `q_b0⁻¹ q_a0`. Returns the world-space vector
/// `2 * vec(q_b * initial_relative_inv * q_a⁻¹)`, taking the shortest arc.
/// It stays zero while both bodies rotate together.
pub(crate) fn rotation_error(
    rotation_a: &UnitQuaternion<f64>,
    rotation_b: &UnitQuaternion<f64>,
    initial_relative_inv: &UnitQuaternion<f64>,
) -> Vector3<f64> {
    let error = rotation_b * initial_relative_inv * rotation_a.inverse();
    let imag = error.imag();
    if error.w < 0.0 {
        -2.0 * imag
    } else {
        2.0 * imag
    }
}

/// Quadratic form `v · M v`.
pub(crate) fn quadratic(m: &Matrix3<f64>, v: &Vector3<f64>) -> f64 {
    v.dot(&(m * v))
}

/// Bilinear form `a · M b`.
pub(crate) fn bilinear(a: &Vector3<f64>, m: &Matrix3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(&(m * b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_orthonormal(axis: &Vector3<f64>) {
        let (n1, n2) = orthonormal_basis(axis);
        assert_relative_eq!(n1.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n2.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(axis.dot(&n1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(axis.dot(&n2), 0.0, epsilon = 1e-12);
        assert_relative_eq!(n1.dot(&n2), 0.0, epsilon = 1e-12);
        assert_relative_eq!(axis.cross(&n1), n2, epsilon = 1e-12);
    }

    #[test]
    fn test_basis_for_world_axes() {
        assert_orthonormal(&Vector3::x());
        assert_orthonormal(&Vector3::y());
        assert_orthonormal(&Vector3::z());
        assert_orthonormal(&-Vector3::z());
    }

    #[test]
    fn test_basis_nearly_parallel_to_seed() {
        // Almost along x: seed must not be x.
        let axis = Vector3::new(1.0, 1e-9, 1e-9).normalize();
        assert_orthonormal(&axis);
    }

    #[test]
    fn test_basis_tie_break() {
        // All components equal in magnitude: x wins.
        let axis = Vector3::new(1.0, 1.0, 1.0).normalize();
        let (n1, _) = orthonormal_basis(&axis);
        assert!(n1.x > 0.0);
        assert_orthonormal(&axis);
    }

    #[test]
    fn test_singular_inverses() {
        assert!(invert2(&Matrix2::zeros()).is_none());
        assert!(invert3(&Matrix3::zeros()).is_none());
        assert_eq!(invert_scalar(0.0), 0.0);
        assert_eq!(invert_scalar(f64::NAN), 0.0);
        assert_eq!(invert_scalar(4.0), 0.25);
        assert!(invert3(&Matrix3::identity()).is_some());
    }

    #[test]
    fn test_rotation_error_small_angle() {
        let a = UnitQuaternion::identity();
        let b = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.01);
        let err = rotation_error(&a, &b, &UnitQuaternion::identity());

        assert_relative_eq!(err.z, 0.01, epsilon = 1e-6);
        assert_relative_eq!(err.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_error_relative_to_initial() {
        let a0 = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3);
        let b0 = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.7) * a0;
        let initial = b0.inverse() * a0;

        assert_relative_eq!(rotation_error(&a0, &b0, &initial).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_error_zero_when_pair_rotates_together() {
        let a0 = UnitQuaternion::identity();
        let b0 = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let initial = b0.inverse() * a0;

        let turn = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        let err = rotation_error(&(turn * a0), &(turn * b0), &initial);
        assert_relative_eq!(err.norm(), 0.0, epsilon = 1e-12);

        // A small extra twist of B shows up as a world-space error.
        let nudge = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.01);
        let err = rotation_error(&(turn * a0), &(nudge * turn * b0), &initial);
        assert_relative_eq!(err, Vector3::new(0.0, 0.01, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_error_shortest_arc() {
        let a = UnitQuaternion::identity();
        let b = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2);
        let flipped = UnitQuaternion::new_unchecked(-b.into_inner());
        let err = rotation_error(&a, &flipped, &UnitQuaternion::identity());

        assert!(err.z > 0.0);
    }
}
