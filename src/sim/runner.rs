use crate::control::{ControlAllocator, ControlGains, Controller};
use crate::dynamics::rigid_body::RigidBodyModel;
use crate::dynamics::state::{RigidBodyState, RotorCommand, Setpoint, StateVector};
use crate::error::{ConfigError, IntegrationError, SimError};
use super::integrator::{error_norm, rk4_step, rkf45_step, StepMethod};

// ---------------------------------------------------------------------------
// Step-size control constants
// ---------------------------------------------------------------------------

const STEP_SAFETY: f64 = 0.9;
const STEP_GROW_MAX: f64 = 5.0;
const STEP_SHRINK_MIN: f64 = 0.1;

// ---------------------------------------------------------------------------
// Simulation options
// ---------------------------------------------------------------------------

/// Integration options for a run.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub method: StepMethod,
    /// Relative tolerance for the adaptive error test.
    pub rel_tol: f64,
    /// Absolute tolerance floor for the adaptive error test.
    pub abs_tol: f64,
    /// First trial step, s.
    pub initial_step: f64,
    /// Error control giving up: a shrink below this step fails the run.
    pub min_step: f64,
    /// Upper bound on any single step, s.
    pub max_step: f64,
    /// Attempted-step budget; exceeding it fails the run.
    pub max_steps: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            method: StepMethod::Adaptive,
            rel_tol: 1e-6,
            abs_tol: 1e-9,
            initial_step: 1e-3,
            min_step: 1e-10,
            max_step: f64::INFINITY,
            max_steps: 200_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// Product of a run: states and rotor commands sampled at the requested
/// times, plus integrator diagnostics.
///
/// Integration failures do not surface as `Err`: the runner returns the
/// partial trajectory with `success` cleared and the cause in `failure`,
/// so callers can still report and plot what happened before the failure.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// Sample times, s. A prefix of the requested evaluation grid.
    pub times: Vec<f64>,
    pub states: Vec<RigidBodyState>,
    /// Rotor command the control law issued at each sample time.
    pub commands: Vec<RotorCommand>,
    pub success: bool,
    /// Steps attempted by the integrator, accepted or not.
    pub steps: usize,
    pub failure: Option<IntegrationError>,
}

impl Trajectory {
    fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            states: Vec::with_capacity(n),
            commands: Vec::with_capacity(n),
            success: true,
            steps: 0,
            failure: None,
        }
    }

    fn record(&mut self, t: f64, state: RigidBodyState, command: RotorCommand) {
        self.times.push(t);
        self.states.push(state);
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last_state(&self) -> Option<&RigidBodyState> {
        self.states.last()
    }
}

// ---------------------------------------------------------------------------
// Closed-loop driver
// ---------------------------------------------------------------------------

fn validate(
    tspan: (f64, f64),
    eval_times: &[f64],
    options: &SimOptions,
) -> Result<(), ConfigError> {
    let (t0, tf) = tspan;
    if !(tf > t0) {
        return Err(ConfigError::BadTimeSpan { t0, tf });
    }
    for i in 1..eval_times.len() {
        if !(eval_times[i] > eval_times[i - 1]) {
            return Err(ConfigError::EvalTimesNotAscending { index: i });
        }
    }
    if let (Some(&first), Some(&last)) = (eval_times.first(), eval_times.last()) {
        if first < t0 {
            return Err(ConfigError::EvalTimeOutOfSpan { t: first, t0, tf });
        }
        if last > tf {
            return Err(ConfigError::EvalTimeOutOfSpan { t: last, t0, tf });
        }
    }
    let step = match options.method {
        StepMethod::Fixed(dt) => dt,
        StepMethod::Adaptive => options.initial_step,
    };
    if !(step > 0.0) {
        return Err(ConfigError::NonPositiveStepSize { value: step });
    }
    Ok(())
}

/// Integrate the closed loop over `tspan`, sampling at `eval_times`.
///
/// The control law is re-evaluated inside every RHS call, so trial steps
/// the error control rejects never leak into the recorded history. Steps
/// are clamped to land exactly on each evaluation time; there is no
/// interpolation between steps.
///
/// Numerical pathologies in the model (gimbal lock, negative commanded
/// speeds) abort with `Err`. Integrator breakdowns (budget, step
/// underflow, non-finite state) come back as a failed `Trajectory`.
pub fn simulate_with(
    model: &RigidBodyModel,
    controller: &dyn Controller,
    initial: &RigidBodyState,
    tspan: (f64, f64),
    eval_times: &[f64],
    setpoint: &Setpoint,
    options: &SimOptions,
) -> Result<Trajectory, SimError> {
    validate(tspan, eval_times, options)?;
    let (t0, tf) = tspan;
    let t_eps = (tf - t0) * 1e-12;

    let rhs = |t: f64, x: &StateVector| -> Result<StateVector, SimError> {
        let state = RigidBodyState::from_vector(x);
        let command = controller.command(t, &state, setpoint);
        Ok(model.derivative(&state, &command)?.to_vector())
    };

    let mut trajectory = Trajectory::with_capacity(eval_times.len());
    let mut t = t0;
    let mut x = initial.to_vector();
    let mut next_eval = 0;

    // Samples requested at the very start of the span.
    while next_eval < eval_times.len() && (eval_times[next_eval] - t).abs() <= t_eps {
        let state = RigidBodyState::from_vector(&x);
        let command = controller.command(t, &state, setpoint);
        trajectory.record(eval_times[next_eval], state, command);
        next_eval += 1;
    }

    let mut h = match options.method {
        StepMethod::Fixed(dt) => dt,
        StepMethod::Adaptive => options.initial_step,
    };
    let mut steps = 0;

    let failure = loop {
        if tf - t <= t_eps {
            break None;
        }
        if steps >= options.max_steps {
            break Some(IntegrationError::StepBudgetExceeded { steps, t });
        }

        // Clamp the trial step to the span end and the next sample time.
        let mut h_try = h.min(options.max_step).min(tf - t);
        if next_eval < eval_times.len() {
            h_try = h_try.min(eval_times[next_eval] - t);
        }

        steps += 1;
        let accepted = match options.method {
            StepMethod::Fixed(_) => Some(rk4_step(&rhs, t, &x, h_try)?),
            StepMethod::Adaptive => {
                let out = rkf45_step(&rhs, t, &x, h_try)?;
                let err = error_norm(&out.error, &x, &out.state, options.rel_tol, options.abs_tol);
                if err <= 1.0 {
                    // err = 0 sends the factor to infinity; the clamp caps it.
                    let factor =
                        (STEP_SAFETY * err.powf(-0.2)).clamp(STEP_SHRINK_MIN, STEP_GROW_MAX);
                    h = h_try * factor;
                    Some(out.state)
                } else {
                    let factor = if err.is_finite() {
                        (STEP_SAFETY * err.powf(-0.2)).clamp(STEP_SHRINK_MIN, 1.0)
                    } else {
                        STEP_SHRINK_MIN
                    };
                    h = h_try * factor;
                    if h < options.min_step {
                        break Some(IntegrationError::StepSizeUnderflow { t, h });
                    }
                    None
                }
            }
        };

        if let Some(x_new) = accepted {
            t += h_try;
            x = x_new;
            if !x.iter().all(|v| v.is_finite()) {
                break Some(IntegrationError::NonFiniteState { t });
            }
            while next_eval < eval_times.len() && (eval_times[next_eval] - t).abs() <= t_eps {
                let state = RigidBodyState::from_vector(&x);
                let command = controller.command(t, &state, setpoint);
                trajectory.record(eval_times[next_eval], state, command);
                next_eval += 1;
            }
        }
    };

    trajectory.steps = steps;
    if let Some(error) = failure {
        trajectory.success = false;
        trajectory.failure = Some(error);
    }
    Ok(trajectory)
}

/// Convenience wrapper: build the PD hover allocator for this vehicle and
/// run the closed loop.
pub fn simulate(
    model: &RigidBodyModel,
    gains: ControlGains,
    initial: &RigidBodyState,
    tspan: (f64, f64),
    eval_times: &[f64],
    setpoint: &Setpoint,
    options: &SimOptions,
) -> Result<Trajectory, SimError> {
    let controller = ControlAllocator::new(model.params(), gains)?;
    simulate_with(model, &controller, initial, tspan, eval_times, setpoint, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
