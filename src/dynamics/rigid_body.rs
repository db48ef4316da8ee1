use nalgebra::{Matrix3, Vector3};

use crate::dynamics::attitude::{euler_rates, rotation_matrix};
use crate::dynamics::state::{RigidBodyState, RotorCommand, StateDeriv, G};
use crate::error::{NumericalError, SimError};
use crate::vehicle::VehicleParameters;

// ---------------------------------------------------------------------------
// 12-state rigid-body equations of motion
// ---------------------------------------------------------------------------

/// Free-flight plant model for a four-rotor rigid body.
///
/// Forces and torques carried:
/// - per-rotor thrust kf·ω² along body +Z, applied at the rotor position
/// - per-rotor aerodynamic reaction torque ±km·ω² about body +Z
/// - linear drag −Cd·v in the inertial frame
/// - angular drag −Cτ·ω in the body frame
/// - uniform gravity
///
/// There is no ground: the vehicle falls freely below z = 0 like above it.
pub struct RigidBodyModel {
    params: VehicleParameters,
    inertia_inv: Matrix3<f64>,   // cached at construction, hot-loop invariant
}

impl RigidBodyModel {
    pub fn new(params: VehicleParameters) -> Result<Self, NumericalError> {
        let inertia_inv = params
            .inertia
            .try_inverse()
            .ok_or(NumericalError::SingularInertia)?;
        Ok(Self { params, inertia_inv })
    }

    pub fn params(&self) -> &VehicleParameters {
        &self.params
    }

    /// Evaluate the state derivative for given rotor speeds.
    ///
    /// Translational dynamics run in the inertial frame, rotational
    /// dynamics in the body frame via Euler's rigid-body equation
    /// `ω̇ = I⁻¹(τ − ω × Iω)`.
    pub fn derivative(
        &self,
        state: &RigidBodyState,
        command: &RotorCommand,
    ) -> Result<StateDeriv, SimError> {
        for (index, speed) in command.speeds.iter().enumerate() {
            if *speed < 0.0 {
                return Err(NumericalError::NegativeRotorSpeed { index, speed: *speed }.into());
            }
        }

        // Rotor thrust and torque, body frame. Thrust applied off the
        // center of mass contributes lever-arm torque; the z-offset of a
        // rotor drops out because thrust is parallel to body Z.
        let mut thrust = 0.0;
        let mut torque = Vector3::zeros();
        for (rotor, speed) in self.params.rotors.iter().zip(command.speeds.iter()) {
            let f = rotor.thrust(*speed);
            thrust += f;
            torque += rotor.position.cross(&Vector3::new(0.0, 0.0, f));
            torque.z += rotor.reaction_torque(*speed);
        }

        let r = rotation_matrix(state.att.x, state.att.y, state.att.z);
        let drag_force = -(self.params.linear_drag * state.vel);
        let drag_torque = -(self.params.angular_drag * state.omega);

        let gravity = Vector3::new(0.0, 0.0, -G);
        let dvel = gravity + (r * Vector3::new(0.0, 0.0, thrust) + drag_force) / self.params.mass;

        let i_omega = self.params.inertia * state.omega;
        let domega = self.inertia_inv * (torque - state.omega.cross(&i_omega) + drag_torque);

        let datt = euler_rates(&state.att, &state.omega)?;

        Ok(StateDeriv { dpos: state.vel, dvel, datt, domega })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn reference_model() -> RigidBodyModel {
        let params = presets::reference_quad().into_parameters().unwrap();
        RigidBodyModel::new(params).unwrap()
    }

    #[test]
    fn powered_down_at_rest_is_pure_free_fall() {
        let model = reference_model();
        let d = model
            .derivative(&RigidBodyState::zeros(), &RotorCommand::zeros())
            .unwrap();
        assert_relative_eq!(d.dvel, Vector3::new(0.0, 0.0, -G), epsilon = 1e-12);
        assert_relative_eq!(d.dpos.norm(), 0.0, epsilon = 1e-15);
        assert_relative_eq!(d.datt.norm(), 0.0, epsilon = 1e-15);
        assert_relative_eq!(d.domega.norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn uniform_hover_speed_cancels_gravity() {
        let model = reference_model();
        let cmd = RotorCommand::uniform(model.params().hover_speed());
        let d = model.derivative(&RigidBodyState::zeros(), &cmd).unwrap();
        // Vertical balance is exact; the mismatched kf leave a torque
        // residual but no vertical force error.
        assert_relative_eq!(d.dvel.z, 0.0, epsilon = 1e-10);
        assert!(
            d.domega.norm() > 0.0,
            "asymmetric rotors at a uniform speed should torque the body"
        );
    }

    #[test]
    fn drag_opposes_motion() {
        let model = reference_model();
        let mut state = RigidBodyState::zeros();
        state.vel = Vector3::new(2.0, 0.0, 0.0);
        let d = model.derivative(&state, &RotorCommand::zeros()).unwrap();
        // Cd_x = 0.1, m = 1.4
        assert_relative_eq!(d.dvel.x, -0.1 * 2.0 / 1.4, epsilon = 1e-12);

        let mut state = RigidBodyState::zeros();
        state.omega = Vector3::new(0.0, 0.0, 1.0);
        let d = model.derivative(&state, &RotorCommand::zeros()).unwrap();
        assert!(d.domega.z < 0.0, "angular drag should brake the spin");
    }

    #[test]
    fn thrust_tilts_with_the_body() {
        let model = reference_model();
        let mut state = RigidBodyState::zeros();
        state.att.x = 0.3;   // positive roll leans thrust toward -Y
        let cmd = RotorCommand::uniform(model.params().hover_speed());
        let d = model.derivative(&state, &cmd).unwrap();
        assert!(d.dvel.y < 0.0);
        assert!(d.dvel.z < 0.0, "tilted thrust no longer carries full weight");
    }

    #[test]
    fn single_rotor_torques_roll_pitch_and_yaw() {
        let model = reference_model();
        // Rotor 2 sits on the +Y arm and spins counter-clockwise.
        let mut speeds = RotorCommand::zeros();
        speeds.speeds[2] = 400.0;
        let d = model.derivative(&RigidBodyState::zeros(), &speeds).unwrap();
        assert!(d.domega.x > 0.0, "+Y thrust should roll positive");
        assert!(d.domega.z > 0.0, "counter-clockwise rotor should yaw positive");
    }

    #[test]
    fn negative_rotor_speed_is_fatal() {
        let model = reference_model();
        let mut cmd = RotorCommand::zeros();
        cmd.speeds[1] = -5.0;
        match model.derivative(&RigidBodyState::zeros(), &cmd) {
            Err(SimError::Numerical(NumericalError::NegativeRotorSpeed { index, .. })) => {
                assert_eq!(index, 1)
            }
            other => panic!("expected NegativeRotorSpeed, got {other:?}"),
        }
    }

    #[test]
    fn gimbal_lock_propagates_from_the_kinematics() {
        let model = reference_model();
        let mut state = RigidBodyState::zeros();
        state.att.y = FRAC_PI_2;
        assert!(matches!(
            model.derivative(&state, &RotorCommand::zeros()),
            Err(SimError::Numerical(NumericalError::GimbalLock { .. }))
        ));
    }

    #[test]
    fn singular_inertia_is_rejected_at_construction() {
        let mut params = presets::reference_quad().into_parameters().unwrap();
        params.inertia = Matrix3::zeros();
        assert!(matches!(
            RigidBodyModel::new(params),
            Err(NumericalError::SingularInertia)
        ));
    }
}
