use nalgebra::{Vector3, Vector4};

use crate::control::allocation::AllocationMatrix;
use crate::control::controller::Controller;
use crate::dynamics::state::{RigidBodyState, RotorCommand, Setpoint, G};
use crate::error::NumericalError;
use crate::vehicle::VehicleParameters;

// ---------------------------------------------------------------------------
// Hover PD law + allocation
// ---------------------------------------------------------------------------

/// Per-axis PD gains for the position and attitude loops.
///
/// The attitude loop runs an order of magnitude stiffer than the position
/// loop; it has to, since the position loop can only act through the
/// attitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGains {
    pub kp_pos: Vector3<f64>,
    pub kd_pos: Vector3<f64>,
    pub kp_att: Vector3<f64>,
    pub kd_att: Vector3<f64>,
}

impl Default for ControlGains {
    /// Tuning that settles the reference airframe to a 1 m hover step in
    /// about 1.5 s without rotor saturation.
    fn default() -> Self {
        Self {
            kp_pos: Vector3::new(1.0, 1.0, 15.0),
            kd_pos: Vector3::new(2.0, 2.0, 7.0),
            kp_att: Vector3::new(200.0, 200.0, 100.0),
            kd_att: Vector3::new(20.0, 20.0, 10.0),
        }
    }
}

/// Closed-loop hover law: a PD position/attitude feedback feeding the
/// minimum-norm allocation solve.
///
/// Stateless on purpose (no integral terms, no filters): the adaptive
/// integrator re-evaluates the loop at trial points it may reject, and a
/// stateful law would accumulate a distorted history.
pub struct ControlAllocator {
    gains: ControlGains,
    allocation: AllocationMatrix,
    mass: f64,
}

impl ControlAllocator {
    pub fn new(params: &VehicleParameters, gains: ControlGains) -> Result<Self, NumericalError> {
        Ok(Self {
            gains,
            allocation: AllocationMatrix::new(params)?,
            mass: params.mass,
        })
    }

    /// The factored allocation matrix, exposing any degeneracy diagnostic.
    pub fn allocation(&self) -> &AllocationMatrix {
        &self.allocation
    }

    /// Desired specific force and body torque from the tracking errors.
    ///
    /// The specific force carries a gravity feedforward so that zero error
    /// demands exactly hover thrust. The attitude target is level, which
    /// reduces the attitude errors to the negated state.
    pub fn feedback(
        &self,
        state: &RigidBodyState,
        setpoint: &Setpoint,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let e_pos = setpoint.pos - state.pos;
        let e_vel = setpoint.vel - state.vel;
        let u1 = self.gains.kp_pos.component_mul(&e_pos)
            + self.gains.kd_pos.component_mul(&e_vel)
            + Vector3::new(0.0, 0.0, G);

        let e_att = -state.att;
        let e_omega = -state.omega;
        let torque = self.gains.kp_att.component_mul(&e_att)
            + self.gains.kd_att.component_mul(&e_omega);

        (u1, torque)
    }

    /// Full evaluation: feedback errors → `[m·u1_z, τ]` demand → rotor
    /// speeds. Only the vertical specific-force component reaches the
    /// demand; lateral position is served indirectly through the attitude
    /// loop.
    pub fn compute(&self, state: &RigidBodyState, setpoint: &Setpoint) -> RotorCommand {
        let (u1, torque) = self.feedback(state, setpoint);
        let demand = Vector4::new(self.mass * u1.z, torque.x, torque.y, torque.z);
        self.allocation.solve(&demand)
    }
}

impl Controller for ControlAllocator {
    fn command(&self, _t: f64, state: &RigidBodyState, setpoint: &Setpoint) -> RotorCommand {
        self.compute(state, setpoint)
    }

    fn name(&self) -> &str {
        "hover-pd-allocator"
    }
}
