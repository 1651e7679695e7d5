/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Fixed-size vector and matrix types for cartesian geometry.
//!
//! Only the handful of operations the coupling kernel actually performs are
//! provided; this is deliberately not a general linear algebra library.
//! Vectors multiply matrices from the left (`v * &m`), i.e. vectors are rows.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::ops::{Deref, DerefMut};

/// A 3-dimensional vector with operations for linear algebra.
#[derive(Copy, Clone, PartialEq, Default)]
pub struct V3(pub [f64; 3]);

/// A dense 3x3 matrix, stored as rows.
#[derive(Copy, Clone, PartialEq, Default)]
pub struct M33(pub [V3; 3]);

// ---------------------------------------------------------------------------
// Both types behave generally like their backing array type.

impl Deref for V3 {
    type Target = [f64; 3];

    #[inline(always)]
    fn deref(&self) -> &Self::Target
    { &self.0 }
}

impl DerefMut for V3 {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target
    { &mut self.0 }
}

impl Deref for M33 {
    type Target = [V3; 3];

    #[inline(always)]
    fn deref(&self) -> &Self::Target
    { &self.0 }
}

impl DerefMut for M33 {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target
    { &mut self.0 }
}

// forward the debug impls without a surrounding "V3(...)", so that debug
// output of nested data remains valid JSON and Python
impl fmt::Debug for V3 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(&self.0, f) }
}

impl fmt::Debug for M33 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(&self.0, f) }
}

// ---------------------------------------------------------------------------

impl V3 {
    /// Get a zero vector.
    #[inline(always)]
    pub fn zero() -> V3
    { V3([0.0; 3]) }

    /// Construct a vector from a function on indices.
    #[inline(always)]
    pub fn from_fn<F>(mut f: F) -> V3
    where F: FnMut(usize) -> f64,
    { V3([f(0), f(1), f(2)]) }

    /// Get the inner product of two vectors.
    ///
    /// It is recommended you write this as `V3::dot(a, b)`.
    #[inline(always)]
    pub fn dot(a: &V3, b: &V3) -> f64
    { a[0] * b[0] + a[1] * b[1] + a[2] * b[2] }

    /// Get the squared 2-norm.
    #[inline(always)]
    pub fn sqnorm(&self) -> f64
    { V3::dot(self, self) }

    /// Get the 2-norm.
    #[inline(always)]
    pub fn norm(&self) -> f64
    { self.sqnorm().sqrt() }

    /// Get the unit vector along `self`.
    #[inline]
    pub fn unit(&self) -> V3
    { *self / self.norm() }

    /// Apply a function to each element.
    #[inline(always)]
    pub fn map<F>(self, mut f: F) -> V3
    where F: FnMut(f64) -> f64,
    { V3([f(self[0]), f(self[1]), f(self[2])]) }
}

/// Get the inner product of two vectors.
#[inline(always)]
pub fn dot(a: &V3, b: &V3) -> f64
{ V3::dot(a, b) }

impl M33 {
    /// Get a zero matrix.
    #[inline(always)]
    pub fn zero() -> M33
    { M33([V3::zero(); 3]) }

    /// Get the identity matrix.
    #[inline(always)]
    pub fn eye() -> M33
    { M33::from_fn(|r, c| (r == c) as i32 as f64) }

    /// Construct a matrix from a function on (row, column) indices.
    #[inline]
    pub fn from_fn<F>(mut f: F) -> M33
    where F: FnMut(usize, usize) -> f64,
    { M33([
        V3::from_fn(|c| f(0, c)),
        V3::from_fn(|c| f(1, c)),
        V3::from_fn(|c| f(2, c)),
    ]) }

    /// Get the outer product `a ⊗ b`, the matrix with entries `a[r] * b[c]`.
    #[inline]
    pub fn outer(a: &V3, b: &V3) -> M33
    { M33::from_fn(|r, c| a[r] * b[c]) }

    /// Get the transpose.
    #[inline]
    pub fn t(&self) -> M33
    { M33::from_fn(|r, c| self[c][r]) }

    /// Get the determinant.
    pub fn det(&self) -> f64 {
        let [a, b, c] = self.0;
        a[0] * (b[1] * c[2] - b[2] * c[1])
            - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// View the matrix as nested plain arrays, for comparisons in tests.
    #[inline]
    pub fn unvee(&self) -> [[f64; 3]; 3]
    { [self[0].0, self[1].0, self[2].0] }
}

/// Get the inverse of a matrix.
///
/// Computed by the adjugate formula, which is plenty at this size; the
/// caller is responsible for not handing in a singular matrix.
pub fn inv(m: &M33) -> M33 {
    let cofactor = |r: usize, c: usize| {
        let (r1, r2) = ((r + 1) % 3, (r + 2) % 3);
        let (c1, c2) = ((c + 1) % 3, (c + 2) % 3);
        m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]
    };
    let det = m.det();
    // adjugate is the transposed cofactor matrix
    M33::from_fn(|r, c| cofactor(c, r) / det)
}

// ---------------------------------------------------------------------------
// arithmetic operators

impl Add for V3 {
    type Output = V3;

    #[inline(always)]
    fn add(self, other: V3) -> V3
    { V3::from_fn(|i| self[i] + other[i]) }
}

impl Sub for V3 {
    type Output = V3;

    #[inline(always)]
    fn sub(self, other: V3) -> V3
    { V3::from_fn(|i| self[i] - other[i]) }
}

impl Neg for V3 {
    type Output = V3;

    #[inline(always)]
    fn neg(self) -> V3
    { self.map(|x| -x) }
}

impl Mul<f64> for V3 {
    type Output = V3;

    #[inline(always)]
    fn mul(self, factor: f64) -> V3
    { self.map(|x| x * factor) }
}

impl Mul<V3> for f64 {
    type Output = V3;

    #[inline(always)]
    fn mul(self, v: V3) -> V3
    { v * self }
}

impl Div<f64> for V3 {
    type Output = V3;

    #[inline(always)]
    fn div(self, divisor: f64) -> V3
    { self.map(|x| x / divisor) }
}

impl AddAssign for V3 {
    #[inline(always)]
    fn add_assign(&mut self, other: V3)
    { *self = *self + other; }
}

impl SubAssign for V3 {
    #[inline(always)]
    fn sub_assign(&mut self, other: V3)
    { *self = *self - other; }
}

impl MulAssign<f64> for V3 {
    #[inline(always)]
    fn mul_assign(&mut self, factor: f64)
    { *self = *self * factor; }
}

impl DivAssign<f64> for V3 {
    #[inline(always)]
    fn div_assign(&mut self, divisor: f64)
    { *self = *self / divisor; }
}

/// Row vector times matrix.
impl<'a> Mul<&'a M33> for V3 {
    type Output = V3;

    #[inline]
    fn mul(self, m: &'a M33) -> V3
    { V3::from_fn(|c| self[0] * m[0][c] + self[1] * m[1][c] + self[2] * m[2][c]) }
}

impl Add for M33 {
    type Output = M33;

    #[inline]
    fn add(self, other: M33) -> M33
    { M33([self[0] + other[0], self[1] + other[1], self[2] + other[2]]) }
}

impl Sub for M33 {
    type Output = M33;

    #[inline]
    fn sub(self, other: M33) -> M33
    { M33([self[0] - other[0], self[1] - other[1], self[2] - other[2]]) }
}

impl AddAssign for M33 {
    #[inline]
    fn add_assign(&mut self, other: M33)
    { *self = *self + other; }
}

impl Mul<f64> for M33 {
    type Output = M33;

    #[inline]
    fn mul(self, factor: f64) -> M33
    { M33([self[0] * factor, self[1] * factor, self[2] * factor]) }
}

impl<'a, 'b> Mul<&'b M33> for &'a M33 {
    type Output = M33;

    #[inline]
    fn mul(self, other: &'b M33) -> M33
    { M33([self[0] * other, self[1] * other, self[2] * other]) }
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_norms() {
        let a = V3([1.0, 2.0, 2.0]);
        let b = V3([3.0, -1.0, 0.5]);
        assert_eq!(V3::dot(&a, &b), 2.0);
        assert_eq!(a.sqnorm(), 9.0);
        assert_eq!(a.norm(), 3.0);
        assert_eq!(a.unit().norm(), 1.0);
    }

    #[test]
    fn outer_product() {
        let m = M33::outer(&V3([1.0, 2.0, 3.0]), &V3([4.0, 5.0, 6.0]));
        assert_eq!(m[0].0, [4.0, 5.0, 6.0]);
        assert_eq!(m[1].0, [8.0, 10.0, 12.0]);
        assert_eq!(m[2].0, [12.0, 15.0, 18.0]);
    }

    #[test]
    fn row_vector_convention() {
        let m = M33([
            V3([1.0, 2.0, 0.0]),
            V3([0.0, 1.0, 0.0]),
            V3([0.0, 0.0, 1.0]),
        ]);
        // v * m reads v as a row vector
        assert_eq!((V3([1.0, 1.0, 1.0]) * &m).0, [1.0, 3.0, 1.0]);
    }

    #[test]
    fn inverse() {
        let m = M33([
            V3([2.0, 0.0, 1.0]),
            V3([0.5, 3.0, 0.0]),
            V3([0.0, -1.0, 4.0]),
        ]);
        let prod = &m * &inv(&m);
        let eye = M33::eye();
        for r in 0..3 {
            for c in 0..3 {
                assert!((prod[r][c] - eye[r][c]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn determinant() {
        assert_eq!(M33::eye().det(), 1.0);
        let m = M33([
            V3([2.0, 0.0, 0.0]),
            V3([0.0, 3.0, 0.0]),
            V3([0.0, 0.0, 4.0]),
        ]);
        assert_eq!(m.det(), 24.0);
        assert_eq!((&m * &inv(&m)).unvee(), M33::eye().unvee());
    }
}
