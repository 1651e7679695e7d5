/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Periodic simulation cell, reduced to the one primitive the coupling
//! kernel needs: the minimum-image displacement between two positions.

#[macro_use]
extern crate failure;
#[cfg(test)]
#[macro_use]
extern crate rdc2_assert_close;

use failure::Error;
use rdc2_array_types::{dot, inv, M33, V3};

/// Defines a vector basis for periodic boundary conditions in three dimensions.
///
/// Rows of the matrix are cell vectors; fractional row vectors multiply the
/// matrix from the left to produce cartesian data, and multiply the
/// (precomputed) inverse to go back.
#[derive(Debug, Clone)]
pub struct Cell {
    matrix: M33,
    inverse: M33,
}

// Manual impl that doesn't compare the inverse.
impl PartialEq<Cell> for Cell {
    fn eq(&self, other: &Cell) -> bool {
        let Cell { ref matrix, inverse: _ } = *self;
        matrix == &other.matrix
    }
}

impl Cell {
    /// Create a cell from a matrix whose rows are the cell vectors.
    ///
    /// Rejects singular matrices, and cells of sufficiently large skew that
    /// rounding in fractional space would not be a valid nearest-image
    /// search (see [`Cell::min_image_displacement`]).
    pub fn new(matrix: &M33) -> Result<Cell, Error> {
        ensure!(matrix.det().abs() > 1e-12, "cell matrix is singular");

        let cell = Cell { matrix: *matrix, inverse: inv(matrix) };
        ensure!(!cell.is_large_skew(), "cell is too skewed for image finding");
        Ok(cell)
    }

    /// Create an orthorhombic cell with the given side lengths.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Cell, Error> {
        Cell::new(&M33([
            V3([a, 0.0, 0.0]),
            V3([0.0, b, 0.0]),
            V3([0.0, 0.0, c]),
        ]))
    }

    /// Matrix where cell vectors are rows.
    #[inline]
    pub fn matrix(&self) -> &M33
    { &self.matrix }

    /// Get the (precomputed) inverse of the matrix where cell vectors are rows.
    #[inline]
    pub fn inverse_matrix(&self) -> &M33
    { &self.inverse }

    #[inline]
    pub fn vectors(&self) -> &[V3; 3]
    { &self.matrix.0 }

    /// Get the (positive) volume of the cell.
    pub fn volume(&self) -> f64
    { self.matrix.det().abs() }

    /// Cartesian to fractional coordinates.
    #[inline]
    pub fn to_frac(&self, cart: V3) -> V3
    { cart * &self.inverse }

    /// Fractional to cartesian coordinates.
    #[inline]
    pub fn to_cart(&self, frac: V3) -> V3
    { frac * &self.matrix }

    /// Get the minimum-image displacement from `a` to `b`.
    ///
    /// The image search is performed by rounding in fractional space, which
    /// finds the true nearest image for every lattice that the constructor's
    /// skew check admits.
    pub fn min_image_displacement(&self, a: V3, b: V3) -> V3 {
        let frac = self.to_frac(b - a);
        self.to_cart(frac.map(|x| x - x.round()))
    }

    // Rounding each fractional coordinate independently can pick a wrong
    // image when a cell vector has a large projection onto another. A quarter
    // length is comfortably conservative for the near-orthogonal cells
    // simulation engines hand us.
    fn is_large_skew(&self) -> bool {
        let vs = self.vectors();
        for i in 0..3 {
            for j in 0..3 {
                if i != j && dot(&vs[i], &vs[j]).abs() > 0.25 * vs[j].sqnorm() {
                    return true;
                }
            }
        }
        false
    }
}
