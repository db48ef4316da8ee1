use nalgebra::Vector3;

use quad_sim::control::ControlGains;
use quad_sim::io::csv;
use quad_sim::io::json::{self, RunSummary};
use quad_sim::sim::{simulate, SimOptions};
use quad_sim::types::{RigidBodyModel, RigidBodyState, Setpoint};
use quad_sim::vehicle::presets;

fn main() {
    let params = presets::reference_quad()
        .into_parameters()
        .expect("reference airframe must aggregate");
    let model = RigidBodyModel::new(params).expect("reference inertia must invert");

    // Step to a 1 m hover, sampled at 100 Hz for plotting.
    let setpoint = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
    let eval_times: Vec<f64> = (0..=500).map(|i| i as f64 * 0.01).collect();

    println!("Simulating {} ...", model.params().name);
    let trajectory = simulate(
        &model,
        ControlGains::default(),
        &RigidBodyState::zeros(),
        (0.0, 5.0),
        &eval_times,
        &setpoint,
        &SimOptions::default(),
    )
    .expect("hover scenario inputs are valid");

    let summary = RunSummary::from_trajectory(&trajectory, &setpoint);
    println!(
        "Final altitude: {:.4} m (target {:.1} m, error {:.2e} m)",
        summary.final_altitude, setpoint.pos.z, summary.final_position_error
    );
    println!("Max tilt: {:.4} deg", summary.max_tilt_deg);
    println!("Max rotor speed: {:.1} rad/s", summary.max_rotor_speed);
    println!(
        "Integrator: {} steps, {} samples, success = {}",
        summary.steps, summary.samples, summary.success
    );

    csv::write_trajectory_file("hover_trajectory.csv", &trajectory)
        .expect("Failed to write CSV");
    json::write_summary_file("hover_summary.json", model.params(), &summary)
        .expect("Failed to write JSON");

    println!("Exported: hover_trajectory.csv, hover_summary.json");
}
