/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The bond registry: the fixed set of atom pairs a coupling is computed for.

use crate::config::{ConfigError, Settings};

/// One configured pair of particles.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    /// Opaque particle identifiers, as the host engine numbers them.
    pub atom_a: usize,
    pub atom_b: usize,
    /// Product of the two nuclei's gyromagnetic ratios.
    pub gyrom: f64,
    /// Concentration/alignment scaling factor.
    pub scale: f64,
    /// Experimental coupling target; present in svd mode only.
    pub coupling: Option<f64>,
}

/// The ordered, immutable collection of configured bonds.
///
/// Built once at configuration time; evaluators hold it for their whole
/// lifetime and never mutate it.
#[derive(Debug, Clone)]
pub struct BondRegistry {
    bonds: Vec<Bond>,
}

impl BondRegistry {
    /// Validate the settings and build the registry.
    ///
    /// All configuration errors surface here, before any evaluation ever
    /// runs: wrong atoms-group arity (citing the 1-based group index), a
    /// coefficient count that is neither one nor the number of bonds, and
    /// missing or partial experimental couplings in svd mode.
    pub fn from_settings(settings: &Settings) -> Result<BondRegistry, ConfigError> {
        for (i, group) in settings.atoms.iter().enumerate() {
            if group.len() != 2 {
                return Err(ConfigError::BadAtomsGroup { index: i + 1, len: group.len() });
            }
        }
        let num_bonds = settings.atoms.len();

        let gyrom = settings.gyrom.resolve(num_bonds, "gyrom")?;
        let scale = settings.scale.resolve(num_bonds, "scale")?;

        // couplings are only meaningful to the fitter; no broadcast
        let coupling: Vec<Option<f64>> = match settings.svd {
            true => match settings.coupling.len() {
                0 => return Err(ConfigError::MissingCouplings),
                len if len != num_bonds => return Err(ConfigError::WrongCount {
                    keyword: "coupling",
                    expected: num_bonds,
                    actual: len,
                }),
                _ => settings.coupling.iter().copied().map(Some).collect(),
            },
            false => vec![None; num_bonds],
        };

        let bonds: Vec<Bond> = {
            settings.atoms.iter().zip(gyrom).zip(scale).zip(coupling)
                .map(|(((group, gyrom), scale), coupling)| Bond {
                    atom_a: group[0],
                    atom_b: group[1],
                    gyrom, scale, coupling,
                }).collect()
        };

        for (i, bond) in bonds.iter().enumerate() {
            info!(
                "the {}th bond dipolar coupling is calculated from atoms {} and {}; \
                 gyromagnetic product is {}, scaling factor is {}",
                i + 1, bond.atom_a, bond.atom_b, bond.gyrom, bond.scale,
            );
        }

        Ok(BondRegistry { bonds })
    }

    /// Build a registry directly from resolved bonds.
    pub fn from_bonds(bonds: Vec<Bond>) -> BondRegistry {
        BondRegistry { bonds }
    }

    pub fn len(&self) -> usize { self.bonds.len() }
    pub fn is_empty(&self) -> bool { self.bonds.is_empty() }
    pub fn bonds(&self) -> &[Bond] { &self.bonds }

    /// Number of participating particles. Evaluators take one position per
    /// participating particle, bond `i` owning indices `2i` and `2i + 1`.
    pub fn num_particles(&self) -> usize { 2 * self.bonds.len() }
}
