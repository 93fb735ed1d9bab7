//! Registry of joints addressed by [`JointId`].

use std::collections::BTreeSet;

use sim_types::{Arena, BodyId, BodySet, JointId, Result, SimError};
use tracing::debug;

use crate::joint::{Joint, JointConstraint, JointInfo};

/// A set of joints.
///
/// Joints refer to bodies by handle. Editing a joint through
/// [`get_mut`](Self::get_mut) or removing it can queue its bodies for
/// wake-up; the queue is drained onto a [`BodySet`] by
/// [`wake_up_pending`](Self::wake_up_pending).
///
/// # Example
///
/// ```
/// use sim_joint::{JointSet, SliderJointInfo};
/// use sim_types::{BodySet, MassProperties, Pose, RigidBody};
/// use nalgebra::{Point3, Vector3};
///
/// let mut bodies = BodySet::new();
/// let a = bodies.insert(RigidBody::fixed(Pose::identity()));
/// let b = bodies.insert(
///     RigidBody::new(Pose::identity(), MassProperties::sphere(1.0, 0.5)).unwrap(),
/// );
///
/// let mut joints = JointSet::new();
/// let id = joints
///     .insert(SliderJointInfo::new(a, b, Point3::origin(), Vector3::x()), &bodies, true)
///     .unwrap();
///
/// joints.get_mut(id, true).unwrap().as_slider_mut().unwrap().enable_motor(true);
/// joints.wake_up_pending(&mut bodies);
///
/// assert_eq!(joints.remove_joints_attached_to(b, false).len(), 1);
/// assert!(joints.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JointSet {
    joints: Arena<Joint>,
    to_wake_up: BTreeSet<BodyId>,
}

impl JointSet {
    /// Create an empty joint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Build a joint from `info` against the current body state and store it.
    ///
    /// Fails if either body handle is stale or the joint parameters are
    /// invalid.
    pub fn insert(
        &mut self,
        info: impl Into<JointInfo>,
        bodies: &BodySet,
        wake_up: bool,
    ) -> Result<JointId> {
        let info = info.into();
        let body_a = bodies.try_get(info.body_a())?;
        let body_b = bodies.try_get(info.body_b())?;
        let joint = Joint::new(&info, body_a, body_b)?;

        if wake_up {
            self.queue_wake_up(&joint);
        }
        let id = JointId(self.joints.insert(joint));
        debug!(joint = %id, kind = ?info.joint_type(), "joint inserted");
        Ok(id)
    }

    fn queue_wake_up(&mut self, joint: &Joint) {
        self.to_wake_up.insert(joint.body_a());
        self.to_wake_up.insert(joint.body_b());
    }

    /// Whether the handle still resolves.
    #[must_use]
    pub fn contains(&self, id: JointId) -> bool {
        self.joints.contains(id.0)
    }

    /// Shared access to a joint.
    #[must_use]
    pub fn get(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    /// Shared access to a joint, failing with [`SimError::InvalidJointId`].
    pub fn try_get(&self, id: JointId) -> Result<&Joint> {
        self.get(id).ok_or(SimError::InvalidJointId(id.raw()))
    }

    /// Mutable access to a joint.
    ///
    /// With `wake_up_connected_bodies`, both attached bodies are queued for
    /// wake-up, since a configuration change may set them in motion.
    pub fn get_mut(&mut self, id: JointId, wake_up_connected_bodies: bool) -> Option<&mut Joint> {
        let joint = self.joints.get_mut(id.0)?;
        if wake_up_connected_bodies {
            self.to_wake_up.insert(joint.body_a());
            self.to_wake_up.insert(joint.body_b());
        }
        Some(joint)
    }

    /// Remove a joint, optionally queueing its bodies for wake-up.
    pub fn remove(&mut self, id: JointId, wake_up: bool) -> Option<Joint> {
        let joint = self.joints.remove(id.0)?;
        if wake_up {
            self.queue_wake_up(&joint);
        }
        debug!(joint = %id, "joint removed");
        Some(joint)
    }

    /// Remove every joint attached to `body`, returning their handles.
    ///
    /// Call this alongside [`BodySet::remove`] so no joint outlives its body.
    pub fn remove_joints_attached_to(&mut self, body: BodyId, wake_up: bool) -> Vec<JointId> {
        let doomed = self.joints_with(body);
        for id in &doomed {
            self.remove(*id, wake_up);
        }
        doomed
    }

    /// Handles of every joint attached to `body`, in storage order.
    #[must_use]
    pub fn joints_with(&self, body: BodyId) -> Vec<JointId> {
        self.joints
            .iter()
            .filter(|(_, joint)| joint.is_attached_to(body))
            .map(|(index, _)| JointId(index))
            .collect()
    }

    /// Iterate over joints in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter().map(|(index, joint)| (JointId(index), joint))
    }

    /// Iterate mutably over joints in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (JointId, &mut Joint)> {
        self.joints
            .iter_mut()
            .map(|(index, joint)| (JointId(index), joint))
    }

    /// Bodies queued for wake-up.
    pub fn pending_wake_ups(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.to_wake_up.iter().copied()
    }

    /// Wake every queued body that still exists, then clear the queue.
    pub fn wake_up_pending(&mut self, bodies: &mut BodySet) {
        for id in std::mem::take(&mut self.to_wake_up) {
            if let Some(body) = bodies.get_mut(id) {
                body.wake_up();
            }
        }
    }

    /// Memory used by the stored joints.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.joints.iter().map(|(_, joint)| joint.size_in_bytes()).sum()
    }
}
