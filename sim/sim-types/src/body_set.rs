//! Storage for rigid bodies addressed by [`BodyId`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::body::{BodyId, RigidBody};

/// A set of rigid bodies.
///
/// The set owns the bodies. Joints and other collaborators hold [`BodyId`]
/// handles that stop resolving once a body is removed.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodySet {
    bodies: Arena<RigidBody>,
}

impl BodySet {
    /// Create an empty body set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Add a body and return its handle.
    pub fn insert(&mut self, body: RigidBody) -> BodyId {
        BodyId(self.bodies.insert(body))
    }

    /// Remove a body.
    ///
    /// Joints attached to it must be removed by the joint registry as well.
    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        self.bodies.remove(id.0)
    }

    /// Whether the handle still resolves.
    #[must_use]
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains(id.0)
    }

    /// Shared access to a body.
    #[must_use]
    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.0)
    }

    /// Mutable access to a body.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.0)
    }

    /// Shared access to a body.
    ///
    /// Fails with [`SimError::InvalidBodyId`](crate::SimError::InvalidBodyId) for a stale handle.
    pub fn try_get(&self, id: BodyId) -> crate::Result<&RigidBody> {
        self.get(id)
            .ok_or(crate::SimError::InvalidBodyId(id.raw()))
    }

    /// Mutable access to two distinct bodies at once.
    ///
    /// Returns `None` if either handle is stale or both name the same body.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut RigidBody, &mut RigidBody)> {
        match self.bodies.get2_mut(a.0, b.0) {
            (Some(first), Some(second)) => Some((first, second)),
            _ => None,
        }
    }

    /// Iterate over bodies in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().map(|(index, body)| (BodyId(index), body))
    }

    /// Iterate mutably over bodies in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut RigidBody)> {
        self.bodies
            .iter_mut()
            .map(|(index, body)| (BodyId(index), body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{MassProperties, Pose};
    use nalgebra::{Point3, Vector3};

    fn ball(x: f64) -> RigidBody {
        RigidBody::new(
            Pose::from_position(Point3::new(x, 0.0, 0.0)),
            MassProperties::sphere(1.0, 0.5),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_remove() {
        let mut set = BodySet::new();
        let a = set.insert(ball(0.0));
        let b = set.insert(ball(1.0));
        assert_eq!(set.len(), 2);

        let removed = set.remove(a).unwrap();
        assert_eq!(removed.pose.position.x, 0.0);
        assert!(!set.contains(a));
        assert!(set.contains(b));
        assert!(set.try_get(a).is_err());
    }

    #[test]
    fn test_pair_mut() {
        let mut set = BodySet::new();
        let a = set.insert(ball(0.0));
        let b = set.insert(ball(1.0));

        let (body_a, body_b) = set.pair_mut(b, a).unwrap();
        body_a.twist.linear = Vector3::x();
        body_b.twist.linear = -Vector3::x();

        assert_eq!(set.get(b).unwrap().twist.linear, Vector3::x());
        assert_eq!(set.get(a).unwrap().twist.linear, -Vector3::x());
        assert!(set.pair_mut(a, a).is_none());
    }
}
