//! The joint family and its four-phase solve protocol.

use sim_types::{BodyId, BodySet, RigidBody, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ball_socket::{BallSocketJoint, BallSocketJointInfo};
use crate::context::SolverContext;
use crate::fixed::{FixedJoint, FixedJointInfo};
use crate::slider::{SliderJoint, SliderJointInfo};

/// The solve protocol every joint implements.
///
/// Per step the solver calls [`init_before_solve`](Self::init_before_solve)
/// once, then [`warm_start`](Self::warm_start) once if warm starting is
/// enabled, then [`solve_velocity_constraint`](Self::solve_velocity_constraint)
/// for each velocity iteration. After positions are integrated it calls
/// [`solve_position_constraint`](Self::solve_position_constraint) for each
/// position iteration.
///
/// None of the phases fail. A joint whose bodies no longer resolve skips the
/// step, and a singular effective mass skips the affected rows.
pub trait JointConstraint {
    /// First body.
    fn body_a(&self) -> BodyId;

    /// Second body.
    fn body_b(&self) -> BodyId;

    /// The joint variant.
    fn joint_type(&self) -> JointType;

    /// Compute world-space geometry, effective masses and biases.
    fn init_before_solve(&mut self, bodies: &BodySet, ctx: &SolverContext);

    /// Re-apply the impulses accumulated during the previous step.
    fn warm_start(&mut self, bodies: &mut BodySet);

    /// Run one sequential-impulse iteration over every row of the joint.
    fn solve_velocity_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext);

    /// Run one position-correction iteration.
    fn solve_position_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext);

    /// Memory used by this joint instance.
    fn size_in_bytes(&self) -> usize;

    /// Whether the joint attaches to `body`.
    fn is_attached_to(&self, body: BodyId) -> bool {
        self.body_a() == body || self.body_b() == body
    }
}

/// Type of joint constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointType {
    /// Ball-and-socket joint (3 rotational DOF).
    BallSocket,
    /// Slider joint (1 translational DOF).
    Slider,
    /// Fixed joint (0 DOF).
    Fixed,
}

impl JointType {
    /// Get the number of degrees of freedom for this joint type.
    #[must_use]
    pub fn dof(&self) -> usize {
        match self {
            Self::Fixed => 0,
            Self::Slider => 1,
            Self::BallSocket => 3,
        }
    }

    /// Get the number of constrained DOF (6 - dof).
    #[must_use]
    pub fn constrained_dof(&self) -> usize {
        6 - self.dof()
    }
}

/// Description of any joint in the family.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointInfo {
    /// Ball-and-socket joint.
    BallSocket(BallSocketJointInfo),
    /// Slider joint.
    Slider(SliderJointInfo),
    /// Fixed joint.
    Fixed(FixedJointInfo),
}

impl JointInfo {
    /// First body.
    #[must_use]
    pub fn body_a(&self) -> BodyId {
        match self {
            Self::BallSocket(info) => info.body_a,
            Self::Slider(info) => info.body_a,
            Self::Fixed(info) => info.body_a,
        }
    }

    /// Second body.
    #[must_use]
    pub fn body_b(&self) -> BodyId {
        match self {
            Self::BallSocket(info) => info.body_b,
            Self::Slider(info) => info.body_b,
            Self::Fixed(info) => info.body_b,
        }
    }

    /// The joint variant described.
    #[must_use]
    pub fn joint_type(&self) -> JointType {
        match self {
            Self::BallSocket(_) => JointType::BallSocket,
            Self::Slider(_) => JointType::Slider,
            Self::Fixed(_) => JointType::Fixed,
        }
    }
}

impl From<BallSocketJointInfo> for JointInfo {
    fn from(info: BallSocketJointInfo) -> Self {
        Self::BallSocket(info)
    }
}

impl From<SliderJointInfo> for JointInfo {
    fn from(info: SliderJointInfo) -> Self {
        Self::Slider(info)
    }
}

impl From<FixedJointInfo> for JointInfo {
    fn from(info: FixedJointInfo) -> Self {
        Self::Fixed(info)
    }
}

/// A joint of any supported type.
///
/// The per-step phases dispatch with a `match`, keeping the family closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Joint {
    /// Ball-and-socket joint.
    BallSocket(BallSocketJoint),
    /// Slider joint.
    Slider(SliderJoint),
    /// Fixed joint.
    Fixed(FixedJoint),
}

impl Joint {
    /// Build a joint from its description and the two bodies' current state.
    pub fn new(info: &JointInfo, body_a: &RigidBody, body_b: &RigidBody) -> Result<Self> {
        Ok(match info {
            JointInfo::BallSocket(info) => {
                Self::BallSocket(BallSocketJoint::new(info, body_a, body_b)?)
            }
            JointInfo::Slider(info) => Self::Slider(SliderJoint::new(info, body_a, body_b)?),
            JointInfo::Fixed(info) => Self::Fixed(FixedJoint::new(info, body_a, body_b)?),
        })
    }

    /// The slider joint, if this is one.
    #[must_use]
    pub fn as_slider(&self) -> Option<&SliderJoint> {
        match self {
            Self::Slider(joint) => Some(joint),
            _ => None,
        }
    }

    /// The slider joint, mutably, if this is one.
    pub fn as_slider_mut(&mut self) -> Option<&mut SliderJoint> {
        match self {
            Self::Slider(joint) => Some(joint),
            _ => None,
        }
    }

    /// The ball-socket joint, if this is one.
    #[must_use]
    pub fn as_ball_socket(&self) -> Option<&BallSocketJoint> {
        match self {
            Self::BallSocket(joint) => Some(joint),
            _ => None,
        }
    }

    /// The fixed joint, if this is one.
    #[must_use]
    pub fn as_fixed(&self) -> Option<&FixedJoint> {
        match self {
            Self::Fixed(joint) => Some(joint),
            _ => None,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $joint:ident => $body:expr) => {
        match $self {
            Joint::BallSocket($joint) => $body,
            Joint::Slider($joint) => $body,
            Joint::Fixed($joint) => $body,
        }
    };
}

impl JointConstraint for Joint {
    fn body_a(&self) -> BodyId {
        dispatch!(self, joint => joint.body_a())
    }

    fn body_b(&self) -> BodyId {
        dispatch!(self, joint => joint.body_b())
    }

    fn joint_type(&self) -> JointType {
        dispatch!(self, joint => joint.joint_type())
    }

    fn init_before_solve(&mut self, bodies: &BodySet, ctx: &SolverContext) {
        dispatch!(self, joint => joint.init_before_solve(bodies, ctx));
    }

    fn warm_start(&mut self, bodies: &mut BodySet) {
        dispatch!(self, joint => joint.warm_start(bodies));
    }

    fn solve_velocity_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext) {
        dispatch!(self, joint => joint.solve_velocity_constraint(bodies, ctx));
    }

    fn solve_position_constraint(&mut self, bodies: &mut BodySet, ctx: &SolverContext) {
        dispatch!(self, joint => joint.solve_position_constraint(bodies, ctx));
    }

    fn size_in_bytes(&self) -> usize {
        dispatch!(self, joint => joint.size_in_bytes())
    }
}
