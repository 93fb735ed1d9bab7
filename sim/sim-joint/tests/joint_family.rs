//! Mixed joint sets: registry behaviour and the non-slider joints.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use common::World;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use sim_joint::{
    BallSocketJointInfo, FixedJointInfo, Joint, JointConstraint, JointType, PositionCorrection,
    SimError, SliderJointInfo, SolverConfig,
};
use sim_types::{MassProperties, Pose, RigidBody, Twist};

fn ball(position: Point3<f64>) -> RigidBody {
    RigidBody::new(Pose::from_position(position), MassProperties::sphere(1.0, 0.25)).unwrap()
}

#[test]
fn pendulum_keeps_its_length() {
    let mut world = World::new(SolverConfig::accurate());
    let pivot = world.add_body(RigidBody::fixed(Pose::identity()));
    let bob = world.add_body(ball(Point3::new(1.0, 0.0, 0.0)));
    let id = world.add_joint(BallSocketJointInfo::new(pivot, bob, Point3::origin()));
    world.push(bob, Vector3::new(0.0, 0.0, -9.81));
    world.run(120);

    let joint = world.joints.get(id).and_then(Joint::as_ball_socket).unwrap();
    assert!(joint.separation(&world.bodies).unwrap().norm() < 1e-3);
    // The bob has swung down.
    assert!(world.body(bob).pose.position.z < -0.1);
}

#[test]
fn welded_pair_moves_as_one() {
    let mut world = World::new(SolverConfig::accurate());
    let push = Twist::linear(Vector3::new(1.0, 0.0, 0.0));
    let a = world.add_body(ball(Point3::origin()).with_twist(push));
    let b = world.add_body(ball(Point3::new(0.0, 1.0, 0.0)));
    let id = world.add_joint(FixedJointInfo::new(a, b, Point3::new(0.0, 0.5, 0.0)));
    world.run(60);

    // Off-center push: the pair drifts and spins together.
    let (body_a, body_b) = (world.body(a), world.body(b));
    assert_relative_eq!(
        body_a.twist.linear + body_b.twist.linear,
        Vector3::new(1.0, 0.0, 0.0),
        epsilon = 1e-9
    );
    assert!((body_a.twist.angular - body_b.twist.angular).norm() < 1e-2);
    assert!(body_a.twist.angular.z > 0.1);

    let joint = world.joints.get(id).and_then(Joint::as_fixed).unwrap();
    assert!(joint.separation(&world.bodies).unwrap().norm() < 1e-3);
    assert!(joint.rotation_error(&world.bodies).unwrap().norm() < 1e-3);
}

#[test]
fn weld_between_turned_bodies_spins_rigidly() {
    let mut world = World::new(SolverConfig::accurate());
    let quarter_z = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
    let omega = Vector3::new(1.0, 0.0, 0.0);
    let a = world.add_body(ball(Point3::origin()).with_twist(Twist::angular(omega)));
    // Rigid rotation about the x axis through the origin.
    let b = world.add_body(
        RigidBody::new(
            Pose::from_position_rotation(Point3::new(0.0, 1.0, 0.0), quarter_z),
            MassProperties::sphere(1.0, 0.25),
        )
        .unwrap()
        .with_twist(Twist::new(Vector3::new(0.0, 0.0, 1.0), omega)),
    );
    let id = world.add_joint(FixedJointInfo::new(a, b, Point3::new(0.0, 0.5, 0.0)));

    let relative =
        |world: &World| world.body(a).pose.rotation.inverse() * world.body(b).pose.rotation;
    let initial = relative(&world);
    world.run(60);

    assert!(relative(&world).angle_to(&initial) < 1e-2);
    assert!((world.body(a).twist.angular - world.body(b).twist.angular).norm() < 1e-2);
    assert!(world.body(a).twist.angular.x > 0.5);

    let joint = world.joints.get(id).and_then(Joint::as_fixed).unwrap();
    assert!(joint.separation(&world.bodies).unwrap().norm() < 1e-3);
    assert!(joint.rotation_error(&world.bodies).unwrap().norm() < 1e-3);
}

#[test]
fn chain_of_mixed_joints_solves_in_order() {
    let mut world = World::new(SolverConfig::default());
    let ground = world.add_body(RigidBody::fixed(Pose::identity()));
    let cart = world.add_body(ball(Point3::origin()));
    let arm = world.add_body(ball(Point3::new(0.0, 0.0, -1.0)));

    let slider = world.add_joint(SliderJointInfo::limited(
        ground,
        cart,
        Point3::origin(),
        Vector3::x(),
        -2.0,
        2.0,
    ));
    let socket = world.add_joint(BallSocketJointInfo::new(cart, arm, Point3::new(0.0, 0.0, -0.5)));
    world.push(arm, Vector3::new(3.0, 0.0, -9.81));
    world.run(90);

    let order: Vec<_> = world.joints.iter().map(|(id, _)| id).collect();
    assert_eq!(order, vec![slider, socket]);

    let cart_pos = world.body(cart).pose.position;
    assert!(cart_pos.y.abs() < 1e-3 && cart_pos.z.abs() < 1e-3);
    assert!(cart_pos.x > 0.0 && cart_pos.x <= 2.0 + 0.1);
    assert_eq!(world.joints.get(socket).unwrap().joint_type(), JointType::BallSocket);
}

#[test]
fn removing_a_body_drops_its_joints() {
    let mut world = World::new(SolverConfig::default());
    let a = world.add_body(RigidBody::fixed(Pose::identity()));
    let b = world.add_body(ball(Point3::new(1.0, 0.0, 0.0)));
    let c = world.add_body(ball(Point3::new(2.0, 0.0, 0.0)));
    world.add_joint(SliderJointInfo::new(a, b, Point3::origin(), Vector3::x()));
    let bc = world.add_joint(BallSocketJointInfo::new(b, c, Point3::new(1.5, 0.0, 0.0)));
    let ac = world.add_joint(FixedJointInfo::new(a, c, Point3::new(2.0, 0.0, 0.0)));

    world.bodies.remove(b);
    let removed = world.joints.remove_joints_attached_to(b, true);
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&bc));
    assert_eq!(world.joints.len(), 1);
    assert!(world.joints.contains(ac));

    // The stale handle is rejected and the surviving joint still steps.
    let err = world
        .joints
        .insert(BallSocketJointInfo::new(b, c, Point3::origin()), &world.bodies, false)
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidBodyId(_)));
    world.run(5);
}

#[test]
fn joint_with_missing_body_is_skipped() {
    let mut world = World::new(SolverConfig::default());
    let a = world.add_body(RigidBody::fixed(Pose::identity()));
    let b = world.add_body(ball(Point3::new(0.0, 0.0, -1.0)));
    world.add_joint(BallSocketJointInfo::new(a, b, Point3::new(0.0, 0.0, -0.5)));
    world.push(b, Vector3::new(0.0, 0.0, -9.81));

    // Removing the body alone leaves an inert joint behind.
    world.bodies.remove(b);
    world.run(3);
    assert_eq!(world.joints.len(), 1);
}

#[test]
fn editing_a_joint_wakes_its_bodies() {
    let mut world = World::new(SolverConfig::default());
    let a = world.add_body(RigidBody::fixed(Pose::identity()));
    let b = world.add_body(ball(Point3::origin()));
    let id = world.add_joint(SliderJointInfo::new(a, b, Point3::origin(), Vector3::x()));
    world.run(1);
    world.bodies.get_mut(b).unwrap().sleep();

    world
        .joints
        .get_mut(id, true)
        .and_then(Joint::as_slider_mut)
        .unwrap()
        .enable_motor(true);
    assert!(world.body(b).is_sleeping());

    world.step();
    assert!(!world.body(b).is_sleeping());
}

fn kind(err: &SimError) -> &'static str {
    match err {
        SimError::DegenerateAxis { .. } => "axis",
        SimError::InvalidLimits { .. } => "limits",
        SimError::InvalidMotorForce(_) => "motor",
        SimError::SameBody(_) => "same body",
        SimError::NonFiniteInput { .. } => "non-finite",
        _ => "other",
    }
}

#[test]
fn invalid_configurations_are_rejected() {
    let mut world = World::new(SolverConfig::default());
    let a = world.add_body(RigidBody::fixed(Pose::identity()));
    let b = world.add_body(ball(Point3::origin()));

    let cases = [
        (SliderJointInfo::new(a, b, Point3::origin(), Vector3::zeros()), "axis"),
        (SliderJointInfo::limited(a, b, Point3::origin(), Vector3::x(), 1.0, -1.0), "limits"),
        (
            SliderJointInfo::new(a, b, Point3::origin(), Vector3::x()).with_motor(1.0, -2.0),
            "motor",
        ),
        (SliderJointInfo::new(a, a, Point3::origin(), Vector3::x()), "same body"),
        (
            SliderJointInfo::new(a, b, Point3::new(f64::NAN, 0.0, 0.0), Vector3::x()),
            "non-finite",
        ),
    ];

    for (info, expected) in cases {
        let err = world.joints.insert(info, &world.bodies, false).unwrap_err();
        assert_eq!(kind(&err), expected, "unexpected error: {err}");
    }
    assert!(world.joints.is_empty());

    let bad = SolverConfig::default().iterations(0, 4);
    assert!(bad.validate().unwrap_err().is_config_error());
    let baumgarte_only = SolverConfig::default().position_correction(PositionCorrection::Baumgarte);
    assert!(baumgarte_only.validate().is_ok());
}
