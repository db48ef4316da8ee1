use nalgebra::SVector;

use crate::error::SimError;

// ---------------------------------------------------------------------------
// Runge-Kutta steppers over flat state vectors
// ---------------------------------------------------------------------------

/// How the driver advances time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepMethod {
    /// Embedded RKF45 pair with step-size control from `SimOptions`
    /// tolerances.
    Adaptive,
    /// Classic RK4 at a constant step, s. No error control.
    Fixed(f64),
}

/// Result of one trial RKF45 step.
#[derive(Debug, Clone)]
pub struct StepOutcome<const N: usize> {
    /// Fifth-order solution at `t + h`.
    pub state: SVector<f64, N>,
    /// Embedded fourth/fifth-order difference, the local error estimate.
    pub error: SVector<f64, N>,
}

/// Single fixed RK4 step.
pub fn rk4_step<const N: usize, F>(
    f: &F,
    t: f64,
    x: &SVector<f64, N>,
    h: f64,
) -> Result<SVector<f64, N>, SimError>
where
    F: Fn(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, SimError>,
{
    let k1 = f(t, x)?;
    let k2 = f(t + h * 0.5, &(x + k1 * (h * 0.5)))?;
    let k3 = f(t + h * 0.5, &(x + k2 * (h * 0.5)))?;
    let k4 = f(t + h, &(x + k3 * h))?;
    Ok(x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0))
}

/// Single Runge-Kutta-Fehlberg 4(5) step.
///
/// Six RHS evaluations yield both a fifth-order solution and an embedded
/// fourth-order one; their difference estimates the local truncation
/// error. The fifth-order solution is the one propagated.
pub fn rkf45_step<const N: usize, F>(
    f: &F,
    t: f64,
    x: &SVector<f64, N>,
    h: f64,
) -> Result<StepOutcome<N>, SimError>
where
    F: Fn(f64, &SVector<f64, N>) -> Result<SVector<f64, N>, SimError>,
{
    let k1 = f(t, x)?;
    let k2 = f(t + h * 0.25, &(x + k1 * (h * 0.25)))?;
    let k3 = f(
        t + h * (3.0 / 8.0),
        &(x + k1 * (3.0 * h / 32.0) + k2 * (9.0 * h / 32.0)),
    )?;
    let k4 = f(
        t + h * (12.0 / 13.0),
        &(x + k1 * (1932.0 * h / 2197.0) - k2 * (7200.0 * h / 2197.0)
            + k3 * (7296.0 * h / 2197.0)),
    )?;
    let k5 = f(
        t + h,
        &(x + k1 * (439.0 * h / 216.0) - k2 * (8.0 * h) + k3 * (3680.0 * h / 513.0)
            - k4 * (845.0 * h / 4104.0)),
    )?;
    let k6 = f(
        t + h * 0.5,
        &(x - k1 * (8.0 * h / 27.0) + k2 * (2.0 * h) - k3 * (3544.0 * h / 2565.0)
            + k4 * (1859.0 * h / 4104.0)
            - k5 * (11.0 * h / 40.0)),
    )?;

    let x5 = x + (k1 * (16.0 / 135.0)
        + k3 * (6656.0 / 12825.0)
        + k4 * (28561.0 / 56430.0)
        - k5 * (9.0 / 50.0)
        + k6 * (2.0 / 55.0))
        * h;
    let x4 = x + (k1 * (25.0 / 216.0) + k3 * (1408.0 / 2565.0) + k4 * (2197.0 / 4104.0)
        - k5 * (1.0 / 5.0))
        * h;

    let error = &x5 - &x4;
    Ok(StepOutcome { state: x5, error })
}

/// Scaled RMS norm of the error estimate, scipy-style: each component is
/// divided by `atol + rtol · max(|xᵢ|, |xᵢ_new|)`, and a value ≤ 1 means
/// the step meets tolerance.
pub fn error_norm<const N: usize>(
    error: &SVector<f64, N>,
    x_old: &SVector<f64, N>,
    x_new: &SVector<f64, N>,
    rel_tol: f64,
    abs_tol: f64,
) -> f64 {
    let mut acc = 0.0;
    for i in 0..N {
        let scale = abs_tol + rel_tol * x_old[i].abs().max(x_new[i].abs());
        let e = error[i] / scale;
        acc += e * e;
    }
    (acc / N as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumericalError;
    use approx::assert_relative_eq;
    use nalgebra::SVector;
    use std::f64::consts::{E, TAU};

    type V1 = SVector<f64, 1>;
    type V2 = SVector<f64, 2>;

    fn decay(_t: f64, x: &V1) -> Result<V1, SimError> {
        Ok(-x)
    }

    // x'' = -x written as a first-order pair
    fn oscillator(_t: f64, x: &V2) -> Result<V2, SimError> {
        Ok(V2::new(x[1], -x[0]))
    }

    #[test]
    fn rkf45_integrates_exponential_decay() {
        let mut x = V1::new(1.0);
        let h = 0.01;
        for i in 0..100 {
            x = rkf45_step(&decay, i as f64 * h, &x, h).unwrap().state;
        }
        assert_relative_eq!(x[0], 1.0 / E, epsilon = 1e-10);
    }

    #[test]
    fn rk4_integrates_a_full_oscillator_period() {
        let mut x = V2::new(1.0, 0.0);
        let n = 10_000;
        let h = TAU / n as f64;
        for i in 0..n {
            x = rk4_step(&oscillator, i as f64 * h, &x, h).unwrap();
        }
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn error_estimate_shrinks_at_fifth_order() {
        let x = V1::new(1.0);
        let coarse = rkf45_step(&decay, 0.0, &x, 0.2).unwrap().error[0].abs();
        let fine = rkf45_step(&decay, 0.0, &x, 0.1).unwrap().error[0].abs();
        // Halving h should cut the 5th-order estimate by roughly 2^5.
        assert!(
            fine < coarse / 16.0,
            "error did not shrink as expected: coarse {coarse:.3e}, fine {fine:.3e}"
        );
    }

    #[test]
    fn error_norm_blends_absolute_and_relative_scales() {
        let error = V1::new(1e-7);
        let x = V1::new(1.0);
        let norm = error_norm(&error, &x, &x, 1e-6, 1e-9);
        assert_relative_eq!(norm, 1e-7 / (1e-9 + 1e-6), epsilon = 1e-12);

        // Near zero state the absolute floor takes over.
        let z = V1::new(0.0);
        let norm = error_norm(&error, &z, &z, 1e-6, 1e-9);
        assert_relative_eq!(norm, 1e-7 / 1e-9, epsilon = 1e-12);
    }

    #[test]
    fn rhs_failures_propagate_out_of_the_stepper() {
        let failing = |_t: f64, _x: &V1| -> Result<V1, SimError> {
            Err(NumericalError::SingularInertia.into())
        };
        assert!(rkf45_step(&failing, 0.0, &V1::new(1.0), 0.1).is_err());
        assert!(rk4_step(&failing, 0.0, &V1::new(1.0), 0.1).is_err());
    }
}
