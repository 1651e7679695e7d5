/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Facade over the workspace members.
//!
//! Host engines normally depend on this crate alone: build a
//! [`kernel::config::Settings`], turn it into a [`kernel::Rdc`], and call
//! the chosen evaluator once per step with the current positions and cell.

pub use rdc2_array_types as array_types;
pub use rdc2_kernel as kernel;
#[cfg(feature = "svd-support")]
pub use rdc2_linalg as linalg;
pub use rdc2_structure as structure;

pub use rdc2_kernel::{FailResult, Rdc};
