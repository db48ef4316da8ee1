use nalgebra::{SVector, Vector3, Vector4};

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

/// Standard gravity, m/s². Shared by the plant and the control law's
/// feedforward term so hover is an exact equilibrium.
pub const G: f64 = 9.81;

/// Flat 12-component state vector consumed by the integrator:
/// `[p, v, (φ θ ψ), ω]`.
pub type StateVector = SVector<f64, 12>;

// ---------------------------------------------------------------------------
// Rigid-body state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyState {
    pub pos: Vector3<f64>,     // m, inertial, Z up
    pub vel: Vector3<f64>,     // m/s, inertial
    pub att: Vector3<f64>,     // rad, roll-pitch-yaw (φ, θ, ψ)
    pub omega: Vector3<f64>,   // rad/s, body frame angular velocity
}

impl RigidBodyState {
    /// At rest at the inertial origin, level.
    pub fn zeros() -> Self {
        Self {
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            att: Vector3::zeros(),
            omega: Vector3::zeros(),
        }
    }

    /// At rest and level at a given position.
    pub fn at_rest(pos: Vector3<f64>) -> Self {
        Self { pos, ..Self::zeros() }
    }

    pub fn roll(&self) -> f64 {
        self.att.x
    }

    pub fn pitch(&self) -> f64 {
        self.att.y
    }

    pub fn yaw(&self) -> f64 {
        self.att.z
    }

    /// Combined roll/pitch excursion from level, rad.
    pub fn tilt(&self) -> f64 {
        self.att.x.hypot(self.att.y)
    }

    pub fn from_vector(x: &StateVector) -> Self {
        Self {
            pos: Vector3::new(x[0], x[1], x[2]),
            vel: Vector3::new(x[3], x[4], x[5]),
            att: Vector3::new(x[6], x[7], x[8]),
            omega: Vector3::new(x[9], x[10], x[11]),
        }
    }

    pub fn to_vector(&self) -> StateVector {
        StateVector::from([
            self.pos.x, self.pos.y, self.pos.z,
            self.vel.x, self.vel.y, self.vel.z,
            self.att.x, self.att.y, self.att.z,
            self.omega.x, self.omega.y, self.omega.z,
        ])
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct StateDeriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,     // acceleration, inertial frame
    pub datt: Vector3<f64>,     // Euler-angle rates
    pub domega: Vector3<f64>,   // angular acceleration, body frame
}

impl StateDeriv {
    pub fn to_vector(&self) -> StateVector {
        StateVector::from([
            self.dpos.x, self.dpos.y, self.dpos.z,
            self.dvel.x, self.dvel.y, self.dvel.z,
            self.datt.x, self.datt.y, self.datt.z,
            self.domega.x, self.domega.y, self.domega.z,
        ])
    }
}

// ---------------------------------------------------------------------------
// Setpoint and rotor command
// ---------------------------------------------------------------------------

/// Tracking target for the control law. The attitude target is always
/// "level": roll, pitch, yaw and body rates are regulated to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    pub pos: Vector3<f64>,   // m, inertial
    pub vel: Vector3<f64>,   // m/s, inertial
}

impl Setpoint {
    /// Hold a position with zero velocity.
    pub fn hover(pos: Vector3<f64>) -> Self {
        Self { pos, vel: Vector3::zeros() }
    }
}

/// Angular speeds commanded to the four rotors, rad/s. Non-negative: the
/// rotors are fixed-pitch and cannot thrust downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorCommand {
    pub speeds: Vector4<f64>,
}

impl RotorCommand {
    pub fn zeros() -> Self {
        Self { speeds: Vector4::zeros() }
    }

    /// The same speed on all four rotors.
    pub fn uniform(speed: f64) -> Self {
        Self { speeds: Vector4::repeat(speed) }
    }

    /// Largest commanded speed, rad/s.
    pub fn max_speed(&self) -> f64 {
        self.speeds.iter().cloned().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_vector_round_trip() {
        let state = RigidBodyState {
            pos: Vector3::new(1.0, 2.0, 3.0),
            vel: Vector3::new(-0.1, 0.2, -0.3),
            att: Vector3::new(0.01, -0.02, 0.5),
            omega: Vector3::new(0.4, -0.5, 0.6),
        };
        let back = RigidBodyState::from_vector(&state.to_vector());
        assert_eq!(state, back);
    }

    #[test]
    fn vector_layout_is_pos_vel_att_omega() {
        let mut state = RigidBodyState::zeros();
        state.att.y = 0.7;
        state.omega.z = -1.1;
        let x = state.to_vector();
        assert_eq!(x[7], 0.7, "pitch should land in slot 7");
        assert_eq!(x[11], -1.1, "yaw rate should land in slot 11");
    }

    #[test]
    fn hover_setpoint_has_zero_velocity() {
        let sp = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(sp.vel, Vector3::zeros());
        assert_eq!(sp.pos.z, 1.0);
    }

    #[test]
    fn tilt_combines_roll_and_pitch() {
        let mut state = RigidBodyState::zeros();
        state.att.x = 0.3;
        state.att.y = 0.4;
        assert!((state.tilt() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn uniform_command_fills_all_rotors() {
        let cmd = RotorCommand::uniform(850.0);
        assert_eq!(cmd.speeds, Vector4::repeat(850.0));
        assert_eq!(cmd.max_speed(), 850.0);
    }
}
