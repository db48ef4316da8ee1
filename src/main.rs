use nalgebra::Vector3;

use quad_sim::control::{ControlAllocator, ControlGains};
use quad_sim::sim::{simulate_with, SimOptions, Trajectory};
use quad_sim::types::{RigidBodyModel, RigidBodyState, Setpoint, SpinDirection};
use quad_sim::vehicle::presets;

fn main() {
    // -----------------------------------------------------------------------
    // Vehicle: asymmetric reference quadrotor
    // -----------------------------------------------------------------------
    let params = presets::reference_quad()
        .into_parameters()
        .expect("reference airframe must aggregate");
    let model = RigidBodyModel::new(params).expect("reference inertia must invert");
    let params = model.params();

    let allocator = ControlAllocator::new(params, ControlGains::default())
        .expect("allocation matrix must factor");

    // Original design-study scenario: step from the origin to a 1 m hover.
    let setpoint = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
    let tspan = (0.0, 5.0);
    let eval_times: Vec<f64> = (0..=50).map(|i| i as f64 * 0.1).collect();

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let trajectory = simulate_with(
        &model,
        &allocator,
        &RigidBodyState::zeros(),
        tspan,
        &eval_times,
        &setpoint,
        &SimOptions::default(),
    )
    .expect("hover scenario inputs are valid");

    // -----------------------------------------------------------------------
    // Analyze trajectory
    // -----------------------------------------------------------------------
    let rise = trajectory
        .times
        .iter()
        .zip(&trajectory.states)
        .find(|(_, s)| s.pos.z >= 0.9 * setpoint.pos.z);

    let peak = trajectory
        .states
        .iter()
        .zip(&trajectory.times)
        .max_by(|a, b| a.0.pos.z.partial_cmp(&b.0.pos.z).unwrap());

    let max_tilt = trajectory
        .states
        .iter()
        .map(|s| s.tilt())
        .fold(0.0_f64, f64::max);

    let max_rotor = trajectory
        .commands
        .iter()
        .map(|c| c.max_speed())
        .fold(0.0_f64, f64::max);

    let settle = settle_time(&trajectory, &setpoint, 0.01);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  QUADROTOR HOVER SIMULATION — {}", params.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Total mass:    {:>8.3} kg    Hover thrust: {:>8.2} N",
        params.mass,
        params.hover_thrust()
    );
    println!(
        "  CoM offset:    {:>8.4} m     Hover speed:  {:>8.1} rad/s",
        params.com.norm(),
        params.hover_speed()
    );
    println!(
        "  Inertia diag:  [{:.4}, {:.4}, {:.4}] kg m^2",
        params.inertia[(0, 0)],
        params.inertia[(1, 1)],
        params.inertia[(2, 2)]
    );
    println!();
    println!("  Rotor    x (m)     y (m)     kf (N s^2)    km (N m s^2)   spin");
    for (i, r) in params.rotors.iter().enumerate() {
        println!(
            "  {:>5}  {:>8.3}  {:>8.3}    {:>9.2e}    {:>10.3e}   {}",
            i,
            r.position.x,
            r.position.y,
            r.kf,
            r.km,
            match r.spin {
                SpinDirection::CounterClockwise => "CCW",
                SpinDirection::Clockwise => "CW",
            }
        );
    }
    println!();

    println!("  Control Allocation");
    println!("  ──────────────────────────────────────────────────────────────────");
    match allocator.allocation().degeneracy() {
        Some(d) => println!("  WARNING: {}", d),
        None => {
            println!("  Allocation matrix is full rank: all four axes independently commanded")
        }
    }
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    match rise {
        Some((t, s)) => {
            println!("  RISE      t={:>5.1}s   z={:>6.3}m   (90% of setpoint)", t, s.pos.z)
        }
        None => println!("  RISE      never reached 90% of the setpoint"),
    }
    if let Some((s, t)) = peak {
        println!(
            "  PEAK      t={:>5.1}s   z={:>6.3}m   overshoot {:>5.1}%",
            t,
            s.pos.z,
            (s.pos.z / setpoint.pos.z - 1.0) * 100.0
        );
    }
    match settle {
        Some(t) => println!("  SETTLE    t={:>5.1}s   position error inside 1 cm from here on", t),
        None => println!("  SETTLE    position error never settled inside 1 cm"),
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    if let Some(last) = trajectory.last_state() {
        println!(
            "  Final altitude:   {:>9.4} m   (target {:.1} m)",
            last.pos.z, setpoint.pos.z
        );
        println!(
            "  Final pos error:  {:>9.2e} m   residual speed {:.2e} m/s",
            (setpoint.pos - last.pos).norm(),
            last.vel.norm()
        );
    }
    println!("  Max tilt:         {:>9.4} deg", max_tilt.to_degrees());
    println!("  Max rotor speed:  {:>9.1} rad/s", max_rotor);
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>6}  {:>8}  {:>9}  {:>10}  {:>11}  {:>6}",
        "t (s)", "z (m)", "vz (m/s)", "tilt (deg)", "max w (r/s)", "phase"
    );
    println!("  {}", "─".repeat(62));

    let stride = (trajectory.len() / 20).max(1);
    for i in 0..trajectory.len() {
        if i % stride != 0 && i != trajectory.len() - 1 {
            continue;
        }
        let t = trajectory.times[i];
        let s = &trajectory.states[i];
        let cmd = &trajectory.commands[i];
        let phase = if (s.pos.z - setpoint.pos.z).abs() < 0.02 && s.vel.z.abs() < 0.05 {
            "HOLD"
        } else if s.vel.z >= 0.0 {
            "CLIMB"
        } else {
            "DESC"
        };
        println!(
            "  {:>6.2}  {:>8.4}  {:>9.4}  {:>10.4}  {:>11.1}  {:>6}",
            t,
            s.pos.z,
            s.vel.z,
            s.tilt().to_degrees(),
            cmd.max_speed(),
            phase
        );
    }

    println!();
    if trajectory.success {
        println!(
            "  Simulation: {} samples, {} integrator steps (adaptive RKF45)",
            trajectory.len(),
            trajectory.steps
        );
    } else if let Some(failure) = &trajectory.failure {
        println!(
            "  SIMULATION FAILED after {} steps: {}",
            trajectory.steps, failure
        );
    }
    println!("====================================================================");
    println!();
}

/// First time after which the position error stays inside `tol` metres.
fn settle_time(trajectory: &Trajectory, setpoint: &Setpoint, tol: f64) -> Option<f64> {
    let last_bad = trajectory
        .times
        .iter()
        .zip(&trajectory.states)
        .rev()
        .find(|(_, s)| (setpoint.pos - s.pos).norm() > tol);
    match last_bad {
        // Settled from the very first sample.
        None => trajectory.times.first().copied(),
        Some((t_bad, _)) => trajectory.times.iter().find(|&&t| t > *t_bad).copied(),
    }
}
