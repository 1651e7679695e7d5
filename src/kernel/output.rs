/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Descriptions of the observables the host engine should register.

/// One named scalar observable.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// `<label>_<index>`, 0-based.
    pub name: String,
    /// Whether the value comes with per-particle derivatives and a virial.
    pub with_derivatives: bool,
    /// Couplings are plain scalars, not angles; they never wrap.
    pub periodic: bool,
}

/// The components for a registry of `num_bonds` bonds, in bond order.
pub fn components(label: &str, num_bonds: usize, with_derivatives: bool) -> Vec<Component> {
    (0..num_bonds)
        .map(|index| Component {
            name: format!("{}_{}", label, index),
            with_derivatives,
            periodic: false,
        })
        .collect()
}
