use nalgebra::{Matrix3, Vector3};

use quad_sim::control::Controller;
use quad_sim::sim::{simulate_with, SimOptions};
use quad_sim::types::{RigidBodyModel, RigidBodyState, RotorCommand, Setpoint};
use quad_sim::vehicle::{RotorSpec, SpinDirection, VehicleBuilder};

/// Thrust-only bang-bang altitude law: every rotor at climb power below the
/// target altitude, idle power above it. There is no attitude loop, so this
/// only flies a symmetric airframe; it exists to show a hand-rolled law
/// plugged in through the `Controller` trait, and to make the case for the
/// PD allocator by limit-cycling where the PD law settles.
struct BangBangAltitude {
    climb_speed: f64,
    idle_speed: f64,
}

impl Controller for BangBangAltitude {
    fn command(&self, _t: f64, state: &RigidBodyState, setpoint: &Setpoint) -> RotorCommand {
        if state.pos.z < setpoint.pos.z {
            RotorCommand::uniform(self.climb_speed)
        } else {
            RotorCommand::uniform(self.idle_speed)
        }
    }

    fn name(&self) -> &str {
        "bang-bang-altitude"
    }
}

fn main() {
    // Perfectly symmetric airframe: uniform speeds produce zero net torque,
    // so the missing attitude loop never gets exercised.
    let kf = 3.0e-6;
    let km = 1.0e-7;
    let rotors = [
        RotorSpec::new(Vector3::new(0.18, 0.0, 0.0), kf, km, SpinDirection::CounterClockwise),
        RotorSpec::new(Vector3::new(-0.18, 0.0, 0.0), kf, km, SpinDirection::Clockwise),
        RotorSpec::new(Vector3::new(0.0, 0.18, 0.0), kf, km, SpinDirection::CounterClockwise),
        RotorSpec::new(Vector3::new(0.0, -0.18, 0.0), kf, km, SpinDirection::Clockwise),
    ];
    let params = VehicleBuilder::new("symmetric-demo", rotors)
        .mass_element(1.0, Vector3::zeros())
        .mass_element(0.1, Vector3::new(0.18, 0.0, 0.0))
        .mass_element(0.1, Vector3::new(-0.18, 0.0, 0.0))
        .mass_element(0.1, Vector3::new(0.0, 0.18, 0.0))
        .mass_element(0.1, Vector3::new(0.0, -0.18, 0.0))
        .body_inertia(Matrix3::from_diagonal(&Vector3::new(0.005, 0.005, 0.009)))
        .linear_drag(Matrix3::from_diagonal(&Vector3::new(0.1, 0.1, 0.2)))
        .angular_drag(Matrix3::from_diagonal(&Vector3::new(0.01, 0.01, 0.02)))
        .build()
        .into_parameters()
        .expect("symmetric airframe must aggregate");

    let hover_speed = params.hover_speed();
    let model = RigidBodyModel::new(params).expect("inertia must invert");

    let controller = BangBangAltitude {
        climb_speed: 1.03 * hover_speed,
        idle_speed: 0.97 * hover_speed,
    };

    let setpoint = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
    let eval_times: Vec<f64> = (0..=800).map(|i| i as f64 * 0.01).collect();

    println!("Simulating with {} controller...", controller.name());
    let trajectory = simulate_with(
        &model,
        &controller,
        &RigidBodyState::zeros(),
        (0.0, 8.0),
        &eval_times,
        &setpoint,
        &SimOptions::default(),
    )
    .expect("bang-bang scenario inputs are valid");

    let peak = trajectory.states.iter().map(|s| s.pos.z).fold(0.0_f64, f64::max);
    let crossings = trajectory
        .states
        .windows(2)
        .filter(|w| {
            (w[0].pos.z - setpoint.pos.z).signum() != (w[1].pos.z - setpoint.pos.z).signum()
        })
        .count();
    let final_state = trajectory.last_state().expect("run records samples");

    println!("Peak altitude: {:.3} m (target {:.1} m)", peak, setpoint.pos.z);
    println!("Setpoint crossings: {} (bang-bang limit cycle)", crossings);
    println!(
        "Final altitude: {:.3} m, residual tilt {:.2e} rad",
        final_state.pos.z,
        final_state.tilt()
    );
    println!("Trajectory points: {}", trajectory.len());
}
