use crate::dynamics::state::{RigidBodyState, RotorCommand, Setpoint};

// ---------------------------------------------------------------------------
// Controller trait
// ---------------------------------------------------------------------------

/// A rotor-command law queried by the simulation loop.
///
/// Implementations must be pure: the same `(t, state, setpoint)` always
/// yields the same command. The adaptive integrator evaluates the loop at
/// trial points it may reject, so any internal mutation would see a
/// distorted time history.
pub trait Controller {
    /// Rotor speeds for the current state and tracking target.
    fn command(&self, t: f64, state: &RigidBodyState, setpoint: &Setpoint) -> RotorCommand;

    /// Label used in reports.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Open-loop law: the same rotor speeds at every instant. Useful for
/// free-fall and step-response studies.
pub struct FixedCommand(pub RotorCommand);

impl Controller for FixedCommand {
    fn command(&self, _t: f64, _state: &RigidBodyState, _setpoint: &Setpoint) -> RotorCommand {
        self.0
    }

    fn name(&self) -> &str {
        "fixed-command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_command_ignores_the_state() {
        let law = FixedCommand(RotorCommand::uniform(300.0));
        let mut state = RigidBodyState::zeros();
        let sp = Setpoint::hover(nalgebra::Vector3::new(0.0, 0.0, 5.0));
        let a = law.command(0.0, &state, &sp);
        state.pos.z = -40.0;
        let b = law.command(3.5, &state, &sp);
        assert_eq!(a, b);
    }
}
