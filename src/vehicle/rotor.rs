use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Rotors and point masses
// ---------------------------------------------------------------------------

/// Rotor spin direction about body +Z, viewed from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    CounterClockwise,
    Clockwise,
}

impl SpinDirection {
    /// Sign of the aerodynamic reaction torque about body +Z.
    pub fn sign(self) -> f64 {
        match self {
            SpinDirection::CounterClockwise => 1.0,
            SpinDirection::Clockwise => -1.0,
        }
    }
}

/// Geometry and aerodynamic coefficients of a single rotor.
///
/// Each rotor is allowed its own `kf`/`km`: manufacturing spread between
/// nominally identical propellers is exactly the asymmetry the allocator
/// has to absorb.
#[derive(Debug, Clone, Copy)]
pub struct RotorSpec {
    /// Hub position in the body frame, m.
    pub position: Vector3<f64>,
    /// Thrust coefficient, N·s²/rad²: thrust = kf · ω².
    pub kf: f64,
    /// Reaction-torque coefficient, N·m·s²/rad²: torque = ±km · ω².
    pub km: f64,
    /// Blade spin direction.
    pub spin: SpinDirection,
}

impl RotorSpec {
    pub fn new(position: Vector3<f64>, kf: f64, km: f64, spin: SpinDirection) -> Self {
        Self { position, kf, km, spin }
    }

    /// Thrust along body +Z for a given angular speed, N.
    pub fn thrust(&self, speed: f64) -> f64 {
        self.kf * speed * speed
    }

    /// Signed reaction torque about body +Z for a given angular speed, N·m.
    pub fn reaction_torque(&self, speed: f64) -> f64 {
        self.spin.sign() * self.km * speed * speed
    }
}

/// A discrete point mass of the airframe, in the body frame.
#[derive(Debug, Clone, Copy)]
pub struct MassElement {
    /// Mass, kg.
    pub mass: f64,
    /// Position in the body frame, m.
    pub position: Vector3<f64>,
}

impl MassElement {
    pub fn new(mass: f64, position: Vector3<f64>) -> Self {
        Self { mass, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_signs_are_opposite() {
        assert_eq!(SpinDirection::CounterClockwise.sign(), 1.0);
        assert_eq!(SpinDirection::Clockwise.sign(), -1.0);
    }

    #[test]
    fn thrust_grows_quadratically() {
        let rotor = RotorSpec::new(
            Vector3::new(0.15, 0.0, 0.0),
            3e-6,
            1e-7,
            SpinDirection::CounterClockwise,
        );
        assert_eq!(rotor.thrust(100.0), 4.0 * rotor.thrust(50.0));
    }

    #[test]
    fn reaction_torque_follows_spin() {
        let ccw = RotorSpec::new(Vector3::zeros(), 3e-6, 1e-7, SpinDirection::CounterClockwise);
        let cw = RotorSpec::new(Vector3::zeros(), 3e-6, 1e-7, SpinDirection::Clockwise);
        assert!(ccw.reaction_torque(500.0) > 0.0);
        assert!(cw.reaction_torque(500.0) < 0.0);
        assert_eq!(ccw.reaction_torque(500.0), -cw.reaction_torque(500.0));
    }
}
