pub mod attitude;
pub mod rigid_body;
pub mod state;

pub use attitude::{euler_rate_matrix, euler_rates, rotation_matrix};
pub use rigid_body::RigidBodyModel;
pub use state::{RigidBodyState, RotorCommand, Setpoint, StateDeriv, StateVector, G};
