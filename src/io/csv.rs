use std::io::{self, Write};

use crate::sim::runner::Trajectory;

/// Write a sampled trajectory to CSV format.
///
/// Columns: time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z,
///          roll, pitch, yaw, omega_x, omega_y, omega_z,
///          rotor_0, rotor_1, rotor_2, rotor_3
///
/// Angles are in radians, rotor speeds in rad/s. One row per recorded
/// sample; a failed run simply yields fewer rows.
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &Trajectory) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,\
         roll,pitch,yaw,omega_x,omega_y,omega_z,\
         rotor_0,rotor_1,rotor_2,rotor_3"
    )?;

    for ((t, s), cmd) in trajectory
        .times
        .iter()
        .zip(&trajectory.states)
        .zip(&trajectory.commands)
    {
        writeln!(
            writer,
            "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
             {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
             {:.2},{:.2},{:.2},{:.2}",
            t,
            s.pos.x, s.pos.y, s.pos.z,
            s.vel.x, s.vel.y, s.vel.z,
            s.att.x, s.att.y, s.att.z,
            s.omega.x, s.omega.y, s.omega.z,
            cmd.speeds[0], cmd.speeds[1], cmd.speeds[2], cmd.speeds[3],
        )?;
    }

    Ok(())
}

/// Write a trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: &str, trajectory: &Trajectory) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{RigidBodyState, RotorCommand};
    use nalgebra::Vector3;

    fn two_sample_trajectory() -> Trajectory {
        let mut second = RigidBodyState::zeros();
        second.pos = Vector3::new(0.0, 0.0, 0.42);
        second.vel = Vector3::new(0.0, 0.0, 1.5);
        second.att = Vector3::new(0.001, -0.002, 0.0);
        Trajectory {
            times: vec![0.0, 0.5],
            states: vec![RigidBodyState::zeros(), second],
            commands: vec![RotorCommand::uniform(1100.0), RotorCommand::uniform(1050.0)],
            success: true,
            steps: 120,
            failure: None,
        }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut buf = Vec::new();
        write_trajectory(&mut buf, &two_sample_trajectory()).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0.0000,"));
        assert!(lines[2].contains("0.420000"));
    }

    #[test]
    fn every_row_has_all_columns() {
        let mut buf = Vec::new();
        write_trajectory(&mut buf, &two_sample_trajectory()).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let columns = output.lines().next().unwrap().split(',').count();
        for line in output.lines() {
            assert_eq!(line.split(',').count(), columns, "ragged row: {line}");
        }
        assert_eq!(columns, 17);
    }
}
