pub mod mass;
pub mod params;
pub mod rotor;

pub use mass::{aggregate, MassProperties};
pub use params::{presets, VehicleBuilder, VehicleConfig, VehicleParameters};
pub use rotor::{MassElement, RotorSpec, SpinDirection};
