use nalgebra::{Matrix3, Vector3};

use crate::error::ConfigError;
use crate::vehicle::mass::{aggregate, MassProperties};
use crate::vehicle::rotor::{MassElement, RotorSpec, SpinDirection};

// ---------------------------------------------------------------------------
// Airframe description
// ---------------------------------------------------------------------------

/// Raw description of an airframe: where the mass sits and where the rotors
/// bolt on, all in one shared body frame with an arbitrary origin.
///
/// A `VehicleConfig` is inert data. Turning it into something the dynamics
/// can use goes through [`VehicleParameters::new`], which aggregates the
/// mass properties and re-expresses the rotor geometry about the center of
/// mass.
#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub name: String,
    /// Point masses of the airframe.
    pub mass_elements: Vec<MassElement>,
    /// Inertia of the central body about its own center, kg·m².
    pub body_inertia: Matrix3<f64>,
    /// The four rotors, positions in the same frame as the mass elements.
    pub rotors: [RotorSpec; 4],
    /// Linear drag gain matrix Cd: force = −Cd·v, N·s/m.
    pub linear_drag: Matrix3<f64>,
    /// Angular drag gain matrix Cτ: torque = −Cτ·ω, N·m·s/rad.
    pub angular_drag: Matrix3<f64>,
}

impl VehicleConfig {
    /// Aggregate and validate, consuming the config.
    pub fn into_parameters(self) -> Result<VehicleParameters, ConfigError> {
        VehicleParameters::new(self)
    }
}

/// Builder for [`VehicleConfig`].
pub struct VehicleBuilder {
    name: String,
    mass_elements: Vec<MassElement>,
    body_inertia: Matrix3<f64>,
    rotors: [RotorSpec; 4],
    linear_drag: Matrix3<f64>,
    angular_drag: Matrix3<f64>,
}

impl VehicleBuilder {
    /// Start from a name and the four rotors; everything else defaults to
    /// zero and can be layered on.
    pub fn new(name: impl Into<String>, rotors: [RotorSpec; 4]) -> Self {
        Self {
            name: name.into(),
            mass_elements: Vec::new(),
            body_inertia: Matrix3::zeros(),
            rotors,
            linear_drag: Matrix3::zeros(),
            angular_drag: Matrix3::zeros(),
        }
    }

    /// Add one point mass (kg, body-frame position in m).
    pub fn mass_element(mut self, mass: f64, position: Vector3<f64>) -> Self {
        self.mass_elements.push(MassElement::new(mass, position));
        self
    }

    pub fn body_inertia(mut self, inertia: Matrix3<f64>) -> Self {
        self.body_inertia = inertia;
        self
    }

    pub fn linear_drag(mut self, cd: Matrix3<f64>) -> Self {
        self.linear_drag = cd;
        self
    }

    pub fn angular_drag(mut self, ctau: Matrix3<f64>) -> Self {
        self.angular_drag = ctau;
        self
    }

    pub fn build(self) -> VehicleConfig {
        VehicleConfig {
            name: self.name,
            mass_elements: self.mass_elements,
            body_inertia: self.body_inertia,
            rotors: self.rotors,
            linear_drag: self.linear_drag,
            angular_drag: self.angular_drag,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived parameters
// ---------------------------------------------------------------------------

/// Validated, center-of-mass-referenced parameters consumed by the dynamics
/// and the allocator.
///
/// Rotor positions here are relative to the aggregate center of mass, not
/// to the frame the config was written in.
#[derive(Debug, Clone)]
pub struct VehicleParameters {
    pub name: String,
    /// Total mass, kg.
    pub mass: f64,
    /// Center of mass in the original config frame, m. Kept for reporting.
    pub com: Vector3<f64>,
    /// Inertia tensor about the center of mass, kg·m².
    pub inertia: Matrix3<f64>,
    /// Rotors with positions re-expressed about the center of mass.
    pub rotors: [RotorSpec; 4],
    pub linear_drag: Matrix3<f64>,
    pub angular_drag: Matrix3<f64>,
}

impl VehicleParameters {
    /// Aggregate mass properties, check the inertia tensor is usable, and
    /// shift the rotor geometry to the center of mass.
    ///
    /// The inertia tensor is symmetric by construction, so its eigenvalues
    /// are real and positive-definiteness reduces to the smallest one being
    /// positive.
    pub fn new(config: VehicleConfig) -> Result<Self, ConfigError> {
        let MassProperties { mass, com, inertia } =
            aggregate(&config.mass_elements, &config.body_inertia)?;

        let eigenvalues = inertia.symmetric_eigenvalues();
        let min_eigenvalue = eigenvalues.iter().cloned().fold(f64::INFINITY, f64::min);
        if !(min_eigenvalue > 0.0) {
            return Err(ConfigError::InertiaNotPositiveDefinite { min_eigenvalue });
        }

        let mut rotors = config.rotors;
        for rotor in &mut rotors {
            rotor.position -= com;
        }

        Ok(Self {
            name: config.name,
            mass,
            com,
            inertia,
            rotors,
            linear_drag: config.linear_drag,
            angular_drag: config.angular_drag,
        })
    }

    /// Total thrust needed to hold altitude level, N.
    pub fn hover_thrust(&self) -> f64 {
        self.mass * crate::dynamics::state::G
    }

    /// Uniform rotor speed whose combined thrust equals the hover thrust,
    /// rad/s. A useful scale even for asymmetric rotor sets.
    pub fn hover_speed(&self) -> f64 {
        let kf_total: f64 = self.rotors.iter().map(|r| r.kf).sum();
        (self.hover_thrust() / kf_total).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Reference airframe: a 1 kg center body with four 0.1 kg arm-tip
    /// masses on a 0.15 m / 0.2 m cross, and rotors whose coefficients are
    /// deliberately mismatched a few percent between arms.
    ///
    /// Hover thrust is about 13.7 N, hover speed about 1070 rad/s.
    pub fn reference_quad() -> VehicleConfig {
        use SpinDirection::{Clockwise, CounterClockwise};
        let rotors = [
            RotorSpec::new(Vector3::new(0.15, 0.0, 0.0), 3.0e-6, 1.0e-7, CounterClockwise),
            RotorSpec::new(Vector3::new(-0.15, 0.0, 0.0), 3.1e-6, 1.05e-7, Clockwise),
            RotorSpec::new(Vector3::new(0.0, 0.2, 0.0), 2.9e-6, 0.95e-7, CounterClockwise),
            RotorSpec::new(Vector3::new(0.0, -0.2, 0.0), 3.0e-6, 1.0e-7, Clockwise),
        ];
        VehicleBuilder::new("reference-quad", rotors)
            .mass_element(1.0, Vector3::zeros())
            .mass_element(0.1, Vector3::new(0.15, 0.0, 0.0))
            .mass_element(0.1, Vector3::new(-0.15, 0.0, 0.0))
            .mass_element(0.1, Vector3::new(0.0, 0.2, 0.0))
            .mass_element(0.1, Vector3::new(0.0, -0.2, 0.0))
            .body_inertia(Matrix3::from_diagonal(&Vector3::new(0.005, 0.005, 0.009)))
            .linear_drag(Matrix3::from_diagonal(&Vector3::new(0.1, 0.1, 0.2)))
            .angular_drag(Matrix3::from_diagonal(&Vector3::new(0.01, 0.01, 0.02)))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_quad_aggregates_cleanly() {
        let params = presets::reference_quad().into_parameters().unwrap();
        assert_relative_eq!(params.mass, 1.4, epsilon = 1e-12);
        assert_relative_eq!(params.com.norm(), 0.0, epsilon = 1e-12);
        let eigs = params.inertia.symmetric_eigenvalues();
        assert!(eigs.iter().all(|&e| e > 0.0), "inertia must be positive-definite: {eigs:?}");
    }

    #[test]
    fn reference_quad_hover_scale() {
        let params = presets::reference_quad().into_parameters().unwrap();
        assert_relative_eq!(params.hover_thrust(), 1.4 * 9.81, epsilon = 1e-12);
        // 4 rotors, kf ≈ 3e-6 each
        let speed = params.hover_speed();
        assert!((1000.0..1200.0).contains(&speed), "hover speed {speed} rad/s out of expected band");
    }

    #[test]
    fn rotors_are_re_expressed_about_the_center_of_mass() {
        // Drop the -X arm mass so the center of mass shifts toward +X.
        let mut config = presets::reference_quad();
        config.mass_elements.remove(2);
        let original_rotor0 = config.rotors[0].position;
        let params = config.into_parameters().unwrap();
        assert!(params.com.x > 0.0);
        assert_relative_eq!(
            params.rotors[0].position.x,
            original_rotor0.x - params.com.x,
            epsilon = 1e-12
        );
    }

    #[test]
    fn degenerate_inertia_is_rejected() {
        // A single point mass has no inertia about itself.
        let rotors = presets::reference_quad().rotors;
        let config = VehicleBuilder::new("point", rotors)
            .mass_element(1.0, Vector3::zeros())
            .build();
        match config.into_parameters() {
            Err(ConfigError::InertiaNotPositiveDefinite { .. }) => {}
            other => panic!("expected InertiaNotPositiveDefinite, got {other:?}"),
        }
    }

    #[test]
    fn builder_round_trip() {
        let rotors = presets::reference_quad().rotors;
        let config = VehicleBuilder::new("test", rotors)
            .mass_element(0.5, Vector3::new(0.0, 0.0, 0.01))
            .mass_element(0.5, Vector3::new(0.0, 0.0, -0.01))
            .body_inertia(Matrix3::identity())
            .linear_drag(Matrix3::from_diagonal(&Vector3::new(0.1, 0.1, 0.2)))
            .build();
        assert_eq!(config.name, "test");
        assert_eq!(config.mass_elements.len(), 2);
        assert_eq!(config.angular_drag, Matrix3::zeros());
    }
}
