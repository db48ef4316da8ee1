use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors in the vehicle description or the requested time grid.
///
/// These are caller mistakes detected at setup; they always abort the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The mass-element list was empty.
    #[error("mass element list is empty")]
    EmptyMassList,

    /// A mass element carried a non-positive (or non-finite) mass.
    #[error("mass element {index} must have positive mass, got {mass}")]
    NonPositiveElementMass {
        /// Index of the offending element.
        index: usize,
        /// The rejected mass value.
        mass: f64,
    },

    /// The aggregated mass was not positive.
    #[error("total vehicle mass must be positive, got {mass}")]
    NonPositiveTotalMass { mass: f64 },

    /// The combined inertia tensor has a zero or negative eigenvalue.
    #[error("inertia tensor is not positive-definite (smallest eigenvalue {min_eigenvalue:.3e})")]
    InertiaNotPositiveDefinite { min_eigenvalue: f64 },

    /// The integration span was empty or reversed.
    #[error("time span must satisfy t0 < tf, got ({t0}, {tf})")]
    BadTimeSpan { t0: f64, tf: f64 },

    /// A fixed or initial step size was zero or negative.
    #[error("step size must be positive, got {value}")]
    NonPositiveStepSize { value: f64 },

    /// Evaluation times must be strictly ascending.
    #[error("evaluation times must be strictly ascending (violated at index {index})")]
    EvalTimesNotAscending { index: usize },

    /// An evaluation time fell outside the integration span.
    #[error("evaluation time {t} lies outside the time span [{t0}, {tf}]")]
    EvalTimeOutOfSpan { t: f64, t0: f64, tf: f64 },
}

/// Numerical pathologies that make the model equations meaningless.
///
/// Fatal at first occurrence: the run aborts rather than continuing with
/// `inf`/`NaN` contamination.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    /// The inertia tensor could not be inverted at model construction.
    #[error("inertia tensor is singular and cannot be inverted")]
    SingularInertia,

    /// The Euler-rate kinematics are singular near ±90° pitch.
    #[error("euler-rate kinematics are singular near ±90° pitch (pitch = {pitch:.6} rad)")]
    GimbalLock {
        /// Pitch angle at which the singularity was hit, rad.
        pitch: f64,
    },

    /// A rotor was commanded with a negative angular speed.
    #[error("rotor {index} commanded with negative speed {speed}")]
    NegativeRotorSpeed { index: usize, speed: f64 },

    /// SVD of the allocation matrix did not converge.
    #[error("singular value decomposition of the allocation matrix did not converge")]
    SvdFailed,
}

/// Integrator failures. Never thrown across the runner boundary: the runner
/// catches these and returns them inside the `Trajectory` so callers can
/// still inspect the partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// The step budget ran out before reaching the end of the span.
    #[error("integrator exceeded the step budget of {steps} steps at t = {t:.6}")]
    StepBudgetExceeded { steps: usize, t: f64 },

    /// Error control shrank the step below the configured minimum.
    #[error("integrator failed to converge: step size underflowed to {h:.3e} at t = {t:.6}")]
    StepSizeUnderflow { t: f64, h: f64 },

    /// The state picked up an `inf` or `NaN` component.
    #[error("integration produced a non-finite state at t = {t:.6}")]
    NonFiniteState { t: f64 },
}

/// Top-level error for all fallible operations in this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Numerical(#[from] NumericalError),
}
