//! Minimal stepping loop shared by the integration tests.

#![allow(dead_code)]

use nalgebra::Vector3;
use sim_joint::{BodyId, BodySet, ConstraintSolver, JointId, JointInfo, JointSet, SolverConfig};
use sim_types::RigidBody;

pub const DT: f64 = 1.0 / 60.0;

/// Bodies, joints and a solver, stepped with semi-implicit Euler.
pub struct World {
    pub bodies: BodySet,
    pub joints: JointSet,
    pub solver: ConstraintSolver,
    forces: Vec<(BodyId, Vector3<f64>)>,
}

impl World {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            bodies: BodySet::new(),
            joints: JointSet::new(),
            solver: ConstraintSolver::new(config).unwrap(),
            forces: Vec::new(),
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.bodies.insert(body)
    }

    pub fn add_joint(&mut self, info: impl Into<JointInfo>) -> JointId {
        self.joints.insert(info, &self.bodies, true).unwrap()
    }

    /// Apply a constant force to `body` on every subsequent step.
    pub fn push(&mut self, body: BodyId, force: Vector3<f64>) {
        self.forces.push((body, force));
    }

    pub fn body(&self, id: BodyId) -> &RigidBody {
        self.bodies.get(id).unwrap()
    }

    pub fn step(&mut self) {
        for (id, force) in &self.forces {
            if let Some(body) = self.bodies.get_mut(*id) {
                body.twist.linear += force * body.inv_mass() * DT;
            }
        }

        self.solver
            .solve_velocities(&mut self.joints, &mut self.bodies, DT)
            .unwrap();
        for (_, body) in self.bodies.iter_mut() {
            body.integrate_position(DT);
        }
        self.solver
            .solve_positions(&mut self.joints, &mut self.bodies, DT)
            .unwrap();
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }
}
