//! Benchmarks for the joint solver.
//!
//! Run with: `cargo bench -p sim-joint`
//!
//! Measures one full step (velocity solve, integration, position solve)
//! for chains of slider-connected carts of increasing length.

#![allow(
    missing_docs,
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::ignored_unit_patterns
)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::{Point3, Vector3};
use sim_joint::{BodySet, ConstraintSolver, JointSet, SliderJointInfo, SolverConfig};
use sim_types::{MassProperties, Pose, RigidBody, Twist};

const DT: f64 = 1.0 / 60.0;

/// A fixed base followed by `n` carts, each riding on the previous one.
///
/// Axes alternate between X and Y and every slider is limited, so the
/// limit rows stay active once the chain spreads out.
fn slider_chain(n: usize) -> (BodySet, JointSet) {
    let mut bodies = BodySet::new();
    let mut joints = JointSet::new();
    let mut previous = bodies.insert(RigidBody::fixed(Pose::identity()));

    for i in 0..n {
        let position = Point3::new(0.0, 0.0, -(i as f64 + 1.0));
        let cart = bodies.insert(
            RigidBody::new(Pose::from_position(position), MassProperties::sphere(1.0, 0.25))
                .unwrap()
                .with_twist(Twist::linear(Vector3::new(1.0, -1.0, 0.5))),
        );
        let axis = if i % 2 == 0 { Vector3::x() } else { Vector3::y() };
        let info = SliderJointInfo::limited(previous, cart, position, axis, -0.5, 0.5)
            .with_motor(0.2, 5.0);
        joints.insert(info, &bodies, false).unwrap();
        previous = cart;
    }

    (bodies, joints)
}

fn step(solver: &ConstraintSolver, joints: &mut JointSet, bodies: &mut BodySet) {
    solver.solve_velocities(joints, bodies, DT).unwrap();
    for (_, body) in bodies.iter_mut() {
        body.integrate_position(DT);
    }
    solver.solve_positions(joints, bodies, DT).unwrap();
}

fn bench_slider_chain(c: &mut Criterion) {
    let solver = ConstraintSolver::new(SolverConfig::default()).unwrap();
    let mut group = c.benchmark_group("slider_chain_step");

    for &n in &[1, 8, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let (mut bodies, mut joints) = slider_chain(n);
            b.iter(|| {
                step(&solver, &mut joints, &mut bodies);
                black_box(&bodies);
            });
        });
    }

    group.finish();
}

fn bench_single_phase(c: &mut Criterion) {
    let solver = ConstraintSolver::new(SolverConfig::accurate()).unwrap();
    let (mut bodies, mut joints) = slider_chain(64);

    c.bench_function("slider_velocity_solve_64", |b| {
        b.iter(|| black_box(solver.solve_velocities(&mut joints, &mut bodies, DT).unwrap()));
    });
    c.bench_function("slider_position_solve_64", |b| {
        b.iter(|| black_box(solver.solve_positions(&mut joints, &mut bodies, DT).unwrap()));
    });
}

criterion_group!(benches, bench_slider_chain, bench_single_phase);
criterion_main!(benches);
