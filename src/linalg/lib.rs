/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The linear-algebra collaborator: SVD-based least squares via LAPACKe.

#[macro_use]
extern crate failure;
#[cfg(test)]
#[macro_use]
extern crate rdc2_assert_close;
extern crate lapack_src;

use failure::Error;
use ndarray::Array2;

/// Owned, contiguous, C-order matrix data.
///
/// Convenient for interfacing with LAPACKe, which tends to assume that
/// one of the strides is equal to 1.
#[derive(Debug, Clone)]
pub struct CMatrix(
    // invariant: .strides[1] == 1
    // invariant: .strides[0] == .cols()
    Array2<f64>,
);

impl CMatrix {
    /// Build a matrix from row-major data. Panics on a length mismatch.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> CMatrix {
        assert_eq!(rows * cols, data.len(), "flat data of the wrong length");
        CMatrix(Array2::from_shape_vec((rows, cols), data).expect("(BUG) bad shape!"))
    }

    pub fn rows(&self) -> usize { self.0.dim().0 }
    pub fn cols(&self) -> usize { self.0.dim().1 }
    pub fn stride(&self) -> usize { self.cols() }

    pub fn c_order_data(&self) -> &[f64]
    { self.0.as_slice().expect("(BUG) not c-order!!") }

    pub fn c_order_data_mut(&mut self) -> &mut [f64]
    { self.0.as_slice_mut().expect("(BUG) not c-order!!") }

    pub fn into_inner(self) -> Array2<f64> { self.0 }
}

impl From<Array2<f64>> for CMatrix {
    fn from(arr: Array2<f64>) -> CMatrix {
        if arr.is_standard_layout() {
            CMatrix(arr)
        } else {
            let dim = arr.raw_dim();
            let data = arr.iter().cloned().collect();
            CMatrix(Array2::from_shape_vec(dim, data).expect("(BUG) bad shape!"))
        }
    }
}

/// Minimizes the 2-norm of `matrix * x - rhs` using LAPACKe's dgelss.
///
/// Singular values below machine precision (relative to the largest) are
/// treated as zero, so a rank-deficient matrix silently yields the
/// minimum-norm solution rather than an error. An `Err` is only returned
/// when the underlying SVD iteration fails to converge.
pub fn least_squares_svd(mut matrix: CMatrix, rhs: &[f64]) -> Result<Vec<f64>, Error> {
    assert_eq!(matrix.rows(), rhs.len(), "rhs has the wrong length");

    let layout = lapacke::Layout::RowMajor;

    let m = matrix.rows() as i32;
    let n = matrix.cols() as i32;
    let lda = matrix.stride() as i32;

    let rcond = -1f64; // use machine precision

    // lapacke hates size-zero arrays
    assert_ne!(m, 0, "cannot solve with an empty matrix");
    assert_ne!(n, 0, "cannot solve with an empty matrix");

    // for row-major dgelss with one rhs column, b is a max(m, n) column
    let mut b = vec![0f64; usize::max(m as usize, n as usize)];
    b[..rhs.len()].copy_from_slice(rhs);

    {
        let a = matrix.c_order_data_mut();

        let mut s = vec![0f64; i32::min(m, n) as usize];
        let s = &mut s;

        let mut rank = 0;
        let rank = &mut rank;

        match unsafe { lapacke::dgelss(layout, m, n, 1, a, lda, &mut b, 1, s, rcond, rank) } {
            0 => { /* okey dokey */ },
            info if info < 0 => panic!("bad arg number {} to dgelss", -info),
            info => bail!("error during SVD ({} non-converging elements)", info),
        }
    } // end borrows

    b.truncate(n as usize);
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn well_determined() {
        // [2 0; 0 4] x = [2; 8]
        let matrix = CMatrix::from_flat(2, 2, vec![2.0, 0.0, 0.0, 4.0]);
        let x = least_squares_svd(matrix, &[2.0, 8.0]).unwrap();
        assert_close!(abs=1e-12, x, vec![1.0, 2.0]);
    }

    #[test]
    fn overdetermined_consistent() {
        for _ in 0..100 {
            let mut rng = rand::thread_rng();
            let r = rng.gen_range(1, 20);
            let c = rng.gen_range(1, r + 1);

            let a = Array2::from_shape_fn((r, c), |_| 1.0 - 2.0 * rng.gen::<f64>());
            let x: Vec<f64> = (0..c).map(|_| 1.0 - 2.0 * rng.gen::<f64>()).collect();
            let b: Vec<f64> = a.genrows().into_iter()
                .map(|row| row.iter().zip(&x).map(|(p, q)| p * q).sum())
                .collect();

            // a consistent system is solved exactly, not just in least squares
            let solved = match least_squares_svd(a.into(), &b) {
                Ok(solved) => solved,
                Err(_) => panic!("SVD convergence failure for size {:?}", (r, c)),
            };
            assert_close!(abs=1e-8, solved, x);
        }
    }

    #[test]
    fn least_squares_residual() {
        // no x satisfies this; the least-squares answer is the mean
        let matrix = CMatrix::from_flat(3, 1, vec![1.0, 1.0, 1.0]);
        let x = least_squares_svd(matrix, &[1.0, 2.0, 6.0]).unwrap();
        assert_close!(abs=1e-12, x, vec![3.0]);
    }

    #[test]
    fn rank_deficient_is_silent() {
        // duplicated column; dgelss returns the minimum-norm solution
        let matrix = CMatrix::from_flat(2, 2, vec![1.0, 1.0, 1.0, 1.0]);
        let x = least_squares_svd(matrix, &[2.0, 2.0]).unwrap();
        assert_close!(abs=1e-10, x, vec![1.0, 1.0]);
    }
}
