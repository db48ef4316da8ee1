use nalgebra::{Matrix3, Vector3};

use crate::error::ConfigError;
use crate::vehicle::rotor::MassElement;

// ---------------------------------------------------------------------------
// Mass aggregation
// ---------------------------------------------------------------------------

/// Aggregated mass properties of the assembled airframe, about its own
/// center of mass.
#[derive(Debug, Clone, PartialEq)]
pub struct MassProperties {
    /// Total mass, kg.
    pub mass: f64,
    /// Center of mass in the body frame of the original element positions, m.
    pub com: Vector3<f64>,
    /// Inertia tensor about the center of mass, kg·m².
    pub inertia: Matrix3<f64>,
}

/// Reduce a set of point masses plus a central-body inertia to total mass,
/// center of mass and the inertia tensor about that center.
///
/// Point-mass contributions use the parallel-axis theorem in outer-product
/// form: m · ((r·r)·I₃ − r·rᵀ) for r measured from the aggregate center of
/// mass. The central-body tensor is assumed to already sit at the center
/// and is added as-is.
pub fn aggregate(
    elements: &[MassElement],
    body_inertia: &Matrix3<f64>,
) -> Result<MassProperties, ConfigError> {
    if elements.is_empty() {
        return Err(ConfigError::EmptyMassList);
    }
    for (index, element) in elements.iter().enumerate() {
        // `!(x > 0)` also rejects NaN
        if !(element.mass > 0.0) {
            return Err(ConfigError::NonPositiveElementMass { index, mass: element.mass });
        }
    }

    let mass: f64 = elements.iter().map(|e| e.mass).sum();
    if !(mass > 0.0) {
        return Err(ConfigError::NonPositiveTotalMass { mass });
    }

    let com = elements
        .iter()
        .fold(Vector3::zeros(), |acc, e| acc + e.position * e.mass)
        / mass;

    let mut inertia = *body_inertia;
    for element in elements {
        let r = element.position - com;
        inertia += element.mass * (r.dot(&r) * Matrix3::identity() - r * r.transpose());
    }

    Ok(MassProperties { mass, com, inertia })
}
