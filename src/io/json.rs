use std::io::{self, Write};

use crate::dynamics::state::Setpoint;
use crate::sim::runner::Trajectory;
use crate::vehicle::VehicleParameters;

/// Summary statistics computed from a closed-loop run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub flight_time: f64,
    pub samples: usize,
    pub final_altitude: f64,
    pub final_position_error: f64,
    pub max_speed: f64,
    pub max_tilt_deg: f64,
    pub max_rotor_speed: f64,
    pub steps: usize,
    pub success: bool,
    pub failure: Option<String>,
}

impl RunSummary {
    /// Compute summary statistics against the commanded setpoint.
    ///
    /// Works on partial trajectories too: a run that failed before its
    /// first sample reports zeros rather than panicking.
    pub fn from_trajectory(trajectory: &Trajectory, setpoint: &Setpoint) -> Self {
        let last = trajectory.states.last();

        let max_speed = trajectory
            .states
            .iter()
            .map(|s| s.vel.norm())
            .fold(0.0_f64, f64::max);

        let max_tilt = trajectory
            .states
            .iter()
            .map(|s| s.tilt())
            .fold(0.0_f64, f64::max);

        let max_rotor_speed = trajectory
            .commands
            .iter()
            .map(|c| c.max_speed())
            .fold(0.0_f64, f64::max);

        RunSummary {
            flight_time: trajectory.times.last().copied().unwrap_or(0.0),
            samples: trajectory.len(),
            final_altitude: last.map_or(0.0, |s| s.pos.z),
            final_position_error: last.map_or(0.0, |s| (setpoint.pos - s.pos).norm()),
            max_speed,
            max_tilt_deg: max_tilt.to_degrees(),
            max_rotor_speed,
            steps: trajectory.steps,
            success: trajectory.success,
            failure: trajectory.failure.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Write a run summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    params: &VehicleParameters,
    summary: &RunSummary,
) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"vehicle\": {{")?;
    writeln!(writer, "    \"name\": \"{}\",", params.name)?;
    writeln!(writer, "    \"mass_kg\": {:.4},", params.mass)?;
    writeln!(writer, "    \"hover_thrust_n\": {:.4},", params.hover_thrust())?;
    writeln!(writer, "    \"hover_speed_rad_s\": {:.2}", params.hover_speed())?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"run\": {{")?;
    writeln!(writer, "    \"success\": {},", summary.success)?;
    writeln!(writer, "    \"steps\": {},", summary.steps)?;
    writeln!(writer, "    \"samples\": {},", summary.samples)?;
    match &summary.failure {
        Some(message) => writeln!(writer, "    \"failure\": \"{}\"", message)?,
        None => writeln!(writer, "    \"failure\": null")?,
    }
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"performance\": {{")?;
    writeln!(writer, "    \"flight_time_s\": {:.2},", summary.flight_time)?;
    writeln!(writer, "    \"final_altitude_m\": {:.4},", summary.final_altitude)?;
    writeln!(
        writer,
        "    \"final_position_error_m\": {:.6},",
        summary.final_position_error
    )?;
    writeln!(writer, "    \"max_speed_ms\": {:.3},", summary.max_speed)?;
    writeln!(writer, "    \"max_tilt_deg\": {:.3},", summary.max_tilt_deg)?;
    writeln!(
        writer,
        "    \"max_rotor_speed_rad_s\": {:.2}",
        summary.max_rotor_speed
    )?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write a run summary JSON to a file.
pub fn write_summary_file(
    path: &str,
    params: &VehicleParameters,
    summary: &RunSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, params, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{RigidBodyState, RotorCommand};
    use crate::error::IntegrationError;
    use crate::vehicle::presets;
    use nalgebra::Vector3;

    fn hover_trajectory() -> Trajectory {
        let mut climbing = RigidBodyState::zeros();
        climbing.pos.z = 0.6;
        climbing.vel.z = 1.2;
        climbing.att.x = 0.01;
        let mut settled = RigidBodyState::zeros();
        settled.pos.z = 0.999;
        Trajectory {
            times: vec![0.0, 1.0, 5.0],
            states: vec![RigidBodyState::zeros(), climbing, settled],
            commands: vec![
                RotorCommand::uniform(1190.0),
                RotorCommand::uniform(1120.0),
                RotorCommand::uniform(1071.0),
            ],
            success: true,
            steps: 640,
            failure: None,
        }
    }

    #[test]
    fn summary_reads_the_final_sample() {
        let sp = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
        let s = RunSummary::from_trajectory(&hover_trajectory(), &sp);
        assert_eq!(s.samples, 3);
        assert!((s.flight_time - 5.0).abs() < 1e-12);
        assert!((s.final_altitude - 0.999).abs() < 1e-12);
        assert!((s.final_position_error - 0.001).abs() < 1e-9);
        assert!((s.max_speed - 1.2).abs() < 1e-12);
        assert!((s.max_rotor_speed - 1190.0).abs() < 1e-12);
        assert!(s.success);
        assert!(s.failure.is_none());
    }

    #[test]
    fn empty_trajectory_does_not_panic() {
        let traj = Trajectory {
            times: vec![],
            states: vec![],
            commands: vec![],
            success: false,
            steps: 3,
            failure: Some(IntegrationError::NonFiniteState { t: 0.01 }),
        };
        let sp = Setpoint::hover(Vector3::zeros());
        let s = RunSummary::from_trajectory(&traj, &sp);
        assert_eq!(s.samples, 0);
        assert_eq!(s.flight_time, 0.0);
        assert!(s.failure.unwrap().contains("non-finite"));
    }

    #[test]
    fn json_output_is_valid() {
        let params = presets::reference_quad().into_parameters().unwrap();
        let sp = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
        let summary = RunSummary::from_trajectory(&hover_trajectory(), &sp);

        let mut buf = Vec::new();
        write_summary(&mut buf, &params, &summary).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"vehicle\""));
        assert!(json.contains("\"reference-quad\""));
        assert!(json.contains("\"failure\": null"));
        assert!(json.contains("\"final_altitude_m\""));
    }

    #[test]
    fn failure_message_lands_in_the_json() {
        let params = presets::reference_quad().into_parameters().unwrap();
        let traj = Trajectory {
            failure: Some(IntegrationError::StepBudgetExceeded { steps: 50, t: 0.2 }),
            success: false,
            ..hover_trajectory()
        };
        let sp = Setpoint::hover(Vector3::new(0.0, 0.0, 1.0));
        let summary = RunSummary::from_trajectory(&traj, &sp);

        let mut buf = Vec::new();
        write_summary(&mut buf, &params, &summary).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"success\": false"));
        assert!(json.contains("step budget"));
    }
}
