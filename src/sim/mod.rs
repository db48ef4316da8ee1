pub mod integrator;
pub mod runner;

pub use integrator::{rk4_step, rkf45_step, StepMethod};
pub use runner::{simulate, simulate_with, SimOptions, Trajectory};
