/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Back-calculation of couplings through a least-squares alignment tensor.

use crate::bonds::BondRegistry;
use crate::{DIPOLAR_CONST, FailResult};

use rdc2_array_types::V3;
use rdc2_linalg::{least_squares_svd, CMatrix};
use rdc2_structure::Cell;
use slice_of_array::prelude::*;

/// The five independent components of the traceless symmetric alignment
/// (Saupe) tensor. Exists only for the duration of one fit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AlignmentTensor {
    pub s_xx: f64,
    pub s_yy: f64,
    pub s_xy: f64,
    pub s_xz: f64,
    pub s_yz: f64,
}

impl AlignmentTensor {
    /// The zz component, fixed by the trace-zero constraint.
    pub fn s_zz(&self) -> f64
    { -self.s_xx - self.s_yy }
}

/// Per-step output of the fitter: values only, never derivatives.
#[derive(Debug, Clone)]
pub struct SvdOutput {
    /// One back-calculated coupling per bond.
    pub couplings: Vec<f64>,
    pub tensor: AlignmentTensor,
}

/// Fits the alignment tensor that best reproduces the experimental
/// couplings, and back-calculates each bond's coupling from the fit.
///
/// The dense solve is not decomposed across workers, so this strategy
/// always runs serially no matter what parallelism the caller configured.
#[derive(Debug)]
pub struct SvdFitter {
    registry: BondRegistry,
}

impl SvdFitter {
    pub fn new(registry: BondRegistry) -> SvdFitter {
        SvdFitter { registry }
    }

    pub fn registry(&self) -> &BondRegistry
    { &self.registry }

    /// Solve `min || A S - b ||^2` for the 5-component tensor parameter
    /// vector `S`, where row `i` of `A` is built from bond `i`'s unit
    /// orientation vector and `b_i` is the experimental coupling in units
    /// of that bond's `Dmax`. Back-calculated couplings are `(A S)_i`
    /// rescaled by `Dmax_i`.
    ///
    /// Orientations that span fewer than 5 independent directions make the
    /// problem rank-deficient; the solve then degrades to the minimum-norm
    /// solution without reporting an error.
    pub fn compute(&self, positions: &[V3], cell: &Cell) -> FailResult<SvdOutput> {
        let bonds = self.registry.bonds();
        assert_eq!(
            positions.len(), self.registry.num_particles(),
            "wrong number of positions for the configured bonds",
        );

        let mut rows: Vec<[f64; 5]> = Vec::with_capacity(bonds.len());
        let mut rhs = Vec::with_capacity(bonds.len());
        let mut dmax = Vec::with_capacity(bonds.len());
        for (index, bond) in bonds.iter().enumerate() {
            let delta = cell.min_image_displacement(positions[2 * index], positions[2 * index + 1]);
            let d = delta.norm();
            let max = -DIPOLAR_CONST * bond.gyrom * bond.scale;
            let mu = delta / d;

            rows.push(coefficient_row(mu));
            dmax.push(max / (d * d * d));

            let coupling = bond.coupling.expect("(BUG) svd fitter built without couplings!");
            rhs.push(coupling / dmax[index]);
        }

        let matrix = CMatrix::from_flat(bonds.len(), 5, rows.flat().to_vec());
        let solution = least_squares_svd(matrix, &rhs)?;
        let tensor = AlignmentTensor {
            s_xx: solution[0],
            s_yy: solution[1],
            s_xy: solution[2],
            s_xz: solution[3],
            s_yz: solution[4],
        };

        let couplings = {
            rows.iter().zip(&dmax)
                .map(|(row, dmax)| back_calculate(row, &tensor) * dmax)
                .collect()
        };
        Ok(SvdOutput { couplings, tensor })
    }
}

/// The design-matrix row of a unit bond orientation.
fn coefficient_row(mu: V3) -> [f64; 5] {
    [
        mu[0] * mu[0] - mu[2] * mu[2],
        mu[1] * mu[1] - mu[2] * mu[2],
        2.0 * mu[0] * mu[1],
        2.0 * mu[0] * mu[2],
        2.0 * mu[1] * mu[2],
    ]
}

fn back_calculate(row: &[f64; 5], tensor: &AlignmentTensor) -> f64 {
    let AlignmentTensor { s_xx, s_yy, s_xy, s_xz, s_yz } = *tensor;
    row[0] * s_xx + row[1] * s_yy + row[2] * s_xy + row[3] * s_xz + row[4] * s_yz
}
