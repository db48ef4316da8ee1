use std::fmt;

use nalgebra::{Matrix4, RowVector4, Vector4, SVD};

use crate::dynamics::state::RotorCommand;
use crate::error::NumericalError;
use crate::vehicle::VehicleParameters;

// ---------------------------------------------------------------------------
// Control allocation: net thrust/torque ↔ squared rotor speeds
// ---------------------------------------------------------------------------

/// Singular values at or below `σ_max · RANK_TOL_REL` count as zero when
/// building the pseudoinverse.
pub const RANK_TOL_REL: f64 = 1e-10;

/// Iteration cap handed to the SVD; a 4×4 converges in far fewer.
const SVD_MAX_ITER: usize = 250;

/// Diagnostic raised when the rotor geometry cannot span all four control
/// axes (thrust, roll, pitch, yaw). Allocation still works in the
/// least-squares sense, so this is a warning carried alongside the matrix,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationDegeneracy {
    /// Effective rank of the allocation matrix.
    pub rank: usize,
    /// Singular values treated as zero.
    pub dropped: usize,
    /// Absolute cutoff that was applied.
    pub threshold: f64,
}

impl fmt::Display for AllocationDegeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocation matrix has rank {} of 4 ({} singular value(s) below {:.3e}); \
             some thrust/torque axes are not independently controllable",
            self.rank, self.dropped, self.threshold
        )
    }
}

/// The linear map B from squared rotor speeds to net body demand
/// `[total thrust, roll torque, pitch torque, yaw torque]`, together with
/// its cached Moore-Penrose pseudoinverse.
///
/// Rows of B, with rotor positions relative to the center of mass:
/// - thrust:       kfᵢ
/// - roll torque:  kfᵢ · yᵢ
/// - pitch torque: −kfᵢ · xᵢ
/// - yaw torque:   ±kmᵢ
#[derive(Debug, Clone)]
pub struct AllocationMatrix {
    matrix: Matrix4<f64>,
    pinv: Matrix4<f64>,
    degeneracy: Option<AllocationDegeneracy>,
}

impl AllocationMatrix {
    /// Build B from the rotor geometry and factor it once. The SVD route
    /// keeps degenerate layouts (collinear rotors, matched-spin pairs)
    /// usable instead of blowing up on a singular inverse.
    pub fn new(params: &VehicleParameters) -> Result<Self, NumericalError> {
        let r = &params.rotors;
        let matrix = Matrix4::from_rows(&[
            RowVector4::new(r[0].kf, r[1].kf, r[2].kf, r[3].kf),
            RowVector4::new(
                r[0].kf * r[0].position.y,
                r[1].kf * r[1].position.y,
                r[2].kf * r[2].position.y,
                r[3].kf * r[3].position.y,
            ),
            RowVector4::new(
                -r[0].kf * r[0].position.x,
                -r[1].kf * r[1].position.x,
                -r[2].kf * r[2].position.x,
                -r[3].kf * r[3].position.x,
            ),
            RowVector4::new(
                r[0].spin.sign() * r[0].km,
                r[1].spin.sign() * r[1].km,
                r[2].spin.sign() * r[2].km,
                r[3].spin.sign() * r[3].km,
            ),
        ]);

        let svd = SVD::try_new(matrix, true, true, f64::EPSILON, SVD_MAX_ITER)
            .ok_or(NumericalError::SvdFailed)?;
        let u = svd.u.ok_or(NumericalError::SvdFailed)?;
        let v_t = svd.v_t.ok_or(NumericalError::SvdFailed)?;

        let sigma_max = svd.singular_values.max();
        let threshold = sigma_max * RANK_TOL_REL;
        let mut sigma_inv = Matrix4::zeros();
        let mut rank = 0;
        for i in 0..4 {
            let sigma = svd.singular_values[i];
            if sigma > threshold {
                sigma_inv[(i, i)] = 1.0 / sigma;
                rank += 1;
            }
        }
        let pinv = v_t.transpose() * sigma_inv * u.transpose();

        let degeneracy = (rank < 4).then_some(AllocationDegeneracy {
            rank,
            dropped: 4 - rank,
            threshold,
        });

        Ok(Self { matrix, pinv, degeneracy })
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// `Some` when the geometry leaves control axes uncontrollable.
    pub fn degeneracy(&self) -> Option<&AllocationDegeneracy> {
        self.degeneracy.as_ref()
    }

    /// Minimum-norm least-squares rotor speeds for a demanded
    /// `[thrust, τx, τy, τz]`. Negative squared speeds are clamped to zero
    /// before the square root, trading torque fidelity for physical
    /// commands.
    pub fn solve(&self, demand: &Vector4<f64>) -> RotorCommand {
        let squared = self.pinv * demand;
        RotorCommand { speeds: squared.map(|w2| w2.max(0.0).sqrt()) }
    }

    /// Forward map: what net thrust/torque a command actually produces.
    pub fn apply(&self, command: &RotorCommand) -> Vector4<f64> {
        self.matrix * command.speeds.map(|w| w * w)
    }
}
