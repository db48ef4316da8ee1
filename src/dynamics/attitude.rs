use nalgebra::{Matrix3, Vector3};

use crate::error::NumericalError;

// ---------------------------------------------------------------------------
// Attitude kinematics (roll-pitch-yaw Euler angles)
// ---------------------------------------------------------------------------

/// The Euler-rate map has a 1/cos(θ) in it; below this bound on |cos θ| the
/// parameterization is treated as singular and rejected.
pub const GIMBAL_LOCK_COS_MIN: f64 = 1e-6;

/// Body→inertial rotation matrix for roll-pitch-yaw angles (Z-Y-X
/// convention: yaw about inertial Z, then pitch, then roll).
///
/// A thrust vector `f` in the body frame appears as `R · f` in the
/// inertial frame.
pub fn rotation_matrix(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    let (sphi, cphi) = roll.sin_cos();
    let (sth, cth) = pitch.sin_cos();
    let (spsi, cpsi) = yaw.sin_cos();

    Matrix3::new(
        cth * cpsi, sphi * sth * cpsi - cphi * spsi, cphi * sth * cpsi + sphi * spsi,
        cth * spsi, sphi * sth * spsi + cphi * cpsi, cphi * sth * spsi - sphi * cpsi,
        -sth,       sphi * cth,                      cphi * cth,
    )
}

/// Matrix W(φ, θ) mapping body angular velocity to Euler-angle rates:
/// `(φ̇, θ̇, ψ̇) = W · ω`.
///
/// Singular at θ = ±90°, where roll and yaw align and the Euler angles
/// stop being a chart. That is a modeling limit, not a recoverable
/// condition, so it surfaces as an error.
pub fn euler_rate_matrix(roll: f64, pitch: f64) -> Result<Matrix3<f64>, NumericalError> {
    let cth = pitch.cos();
    if cth.abs() < GIMBAL_LOCK_COS_MIN {
        return Err(NumericalError::GimbalLock { pitch });
    }
    let (sphi, cphi) = roll.sin_cos();
    let tth = pitch.tan();

    Ok(Matrix3::new(
        1.0, sphi * tth, cphi * tth,
        0.0, cphi,       -sphi,
        0.0, sphi / cth, cphi / cth,
    ))
}

/// Euler-angle rates for a given attitude and body angular velocity.
pub fn euler_rates(
    att: &Vector3<f64>,
    omega: &Vector3<f64>,
) -> Result<Vector3<f64>, NumericalError> {
    Ok(euler_rate_matrix(att.x, att.y)? * omega)
}
