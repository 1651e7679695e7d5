/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

#[macro_use]
extern crate failure;
use std::fmt;

pub const DEFAULT_REL_TOL: f64 = 1e-9;

/// Assert that two values are approximately equal.
///
/// Accepts optional leading `rel=` and `abs=` tolerances; with neither,
/// a relative tolerance of [`DEFAULT_REL_TOL`] applies. Trailing format
/// arguments are appended to the panic message.
///
/// ```
/// # #[macro_use] extern crate rdc2_assert_close;
/// # fn main() {
/// assert_close!(1.0, 1.0 + 1e-12);
/// assert_close!(rel=1e-3, abs=1e-6, 2.0, 2.001);
/// assert_close!(abs=1e-6, 0.0, 1e-8, "near zero in step {}", 3);
/// # }
/// ```
#[macro_export]
macro_rules! assert_close {
    (@imp [$rel:expr, $abs:expr] $a:expr, $b:expr $(,)*) => {
        $crate::assert_close!(@imp [$rel, $abs] $a, $b, "not nearly equal!")
    };
    (@imp [$rel:expr, $abs:expr] $a:expr, $b:expr, $($fmt:tt)+) => {
        match (&$a, &$b, $crate::Tolerances { rel: $rel, abs: $abs }) {
            (a, b, tol) => {
                if let Err(e) = $crate::CheckClose::check_close(a, b, tol) {
                    panic!(
                        "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                        format!($($fmt)+), tol.rel, tol.abs, a, b, e,
                    );
                }
            }
        }
    };
    (rel=$rel:expr, abs=$abs:expr, $($rest:tt)+) => {
        $crate::assert_close!(@imp [$rel, $abs] $($rest)+)
    };
    (abs=$abs:expr, rel=$rel:expr, $($rest:tt)+) => {
        $crate::assert_close!(@imp [$rel, $abs] $($rest)+)
    };
    (rel=$rel:expr, $($rest:tt)+) => {
        $crate::assert_close!(@imp [$rel, 0.0] $($rest)+)
    };
    (abs=$abs:expr, $($rest:tt)+) => {
        $crate::assert_close!(@imp [$crate::DEFAULT_REL_TOL, $abs] $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::assert_close!(@imp [$crate::DEFAULT_REL_TOL, 0.0] $($rest)+)
    };
}

/// `assert_close!` that only runs in debug builds.
#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[derive(Debug, Copy, Clone)]
pub struct Tolerances {
    pub rel: f64,
    pub abs: f64,
}

/// The first pair of scalars that failed the comparison.
#[derive(Debug, Fail)]
pub struct CheckCloseError {
    pub left: f64,
    pub right: f64,
}

impl fmt::Display for CheckCloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed at:\n  left: {:?}\n right: {:?}", self.left, self.right)
    }
}

/// Test that all scalars of self and other are close.
pub trait CheckClose<Rhs: ?Sized = Self>: fmt::Debug {
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError>;
}

// comparison semantics follow Python's math.isclose
fn is_close(a: f64, b: f64, Tolerances { rel, abs }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    // infinities of equal sign compare close; of opposite sign, not
    if a == b { return true; }
    if a.is_infinite() || b.is_infinite() { return false; }

    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

impl CheckClose for f64 {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        match is_close(*self, *other, tol) {
            true => Ok(()),
            false => Err(CheckCloseError { left: *self, right: *other }),
        }
    }
}

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { CheckClose::check_close(*self, *other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        assert_eq!(self.len(), other.len(), "length mismatch in assert_close!");
        self.iter().zip(other)
            .map(|(a, b)| a.check_close(b, tol))
            .collect()
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { (&self[..]).check_close(&other[..], tol) }
}

impl<T: CheckClose> CheckClose<[T]> for Vec<T> {
    fn check_close(&self, other: &[T], tol: Tolerances) -> Result<(), CheckCloseError>
    { (&self[..]).check_close(other, tol) }
}

impl<T: CheckClose> CheckClose<Vec<T>> for [T] {
    fn check_close(&self, other: &Vec<T>, tol: Tolerances) -> Result<(), CheckCloseError>
    { self.check_close(&other[..], tol) }
}

macro_rules! gen_array_impls {
    ($($n:tt)*) => {
        $(
        impl<T: CheckClose> CheckClose for [T; $n] {
            fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
            { (&self[..]).check_close(&other[..], tol) }
        }
        )*
    };
}

gen_array_impls! {
    0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16
}
