pub mod control;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod sim;
pub mod vehicle;

// One-stop imports for the common closed-loop workflow
pub mod types {
    pub use crate::control::{ControlAllocator, ControlGains, Controller, FixedCommand};
    pub use crate::dynamics::state::{RigidBodyState, RotorCommand, Setpoint, StateVector, G};
    pub use crate::dynamics::RigidBodyModel;
    pub use crate::error::{ConfigError, IntegrationError, NumericalError, SimError};
    pub use crate::sim::{simulate, simulate_with, SimOptions, StepMethod, Trajectory};
    pub use crate::vehicle::{
        MassElement, RotorSpec, SpinDirection, VehicleBuilder, VehicleConfig, VehicleParameters,
    };
}
