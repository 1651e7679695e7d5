/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Residual dipolar couplings between configured pairs of nuclei.
//!
//! The coupling between two nuclear spins depends on the angle between the
//! inter-nuclear vector and the external field axis (taken to be z). In
//! isotropic media it averages to zero; under partial alignment it becomes
//! measurable, and is computed here per bond as
//!
//! ```text
//! D = Dmax * 0.5 * (3 cos^2(theta) - 1)
//! ```
//!
//! where `Dmax` collects the physical prefactor, the gyromagnetic ratio
//! product of the two nuclei, a per-bond scale factor, and the inverse cube
//! of the bond length.
//!
//! Two evaluation strategies exist, fixed at construction:
//!
//! * [`direct::DirectEvaluator`] computes each coupling analytically along
//!   with its exact gradients on both particles and a per-bond virial
//!   contribution, partitioned over a worker pool.
//! * [`svd::SvdFitter`] (feature `svd-support`) fits the 5-parameter
//!   alignment tensor that best reproduces a set of experimental couplings
//!   and back-calculates couplings from the fit. Values only, no forces.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[cfg(test)]
#[macro_use]
extern crate rdc2_assert_close;

pub mod bonds;
pub mod config;
pub mod direct;
pub mod output;
#[cfg(feature = "svd-support")]
pub mod svd;

pub type FailResult<T> = Result<T, failure::Error>;

/// Physical prefactor `mu_0 h / (8 pi^3)` of the dipolar interaction, in
/// internal units (gyromagnetic ratios in C.G.S., distances in the engine's
/// length unit).
pub const DIPOLAR_CONST: f64 = 0.3356806;

/// Common gyromagnetic ratios and ratio products (C.G.S.), for use as
/// `gyrom` values.
pub mod gyromag {
    pub const H1: f64 = 26.7513;
    pub const C13: f64 = 6.7261;
    pub const N15: f64 = -2.7116;

    // products for the usual bond types
    pub const NH: f64 = -72.5388;
    pub const CH: f64 = 179.9319;
    pub const CN: f64 = -18.2385;
    pub const CC: f64 = 45.2404;
}

/// A configured coupling evaluator.
///
/// The variant is chosen once from the settings and fixed for the object's
/// lifetime; only the direct variant is capable of producing derivatives,
/// which is reflected in the variants' APIs rather than in runtime flags.
#[derive(Debug)]
pub enum Rdc {
    Direct(direct::DirectEvaluator),
    #[cfg(feature = "svd-support")]
    Svd(svd::SvdFitter),
}

impl Rdc {
    pub fn from_settings(settings: &config::Settings) -> FailResult<Rdc> {
        let registry = bonds::BondRegistry::from_settings(settings)?;
        if settings.svd {
            #[cfg(not(feature = "svd-support"))]
            {
                return Err(config::ConfigError::SvdUnavailable.into());
            }
            #[cfg(feature = "svd-support")]
            {
                return Ok(Rdc::Svd(svd::SvdFitter::new(registry)));
            }
        }
        Ok(Rdc::Direct(direct::DirectEvaluator::new(registry, settings.serial)))
    }

    pub fn registry(&self) -> &bonds::BondRegistry {
        match self {
            Rdc::Direct(evaluator) => evaluator.registry(),
            #[cfg(feature = "svd-support")]
            Rdc::Svd(fitter) => fitter.registry(),
        }
    }

    /// Whether evaluation produces per-particle derivatives and a virial.
    pub fn supports_derivatives(&self) -> bool {
        match self {
            Rdc::Direct(_) => true,
            #[cfg(feature = "svd-support")]
            Rdc::Svd(_) => false,
        }
    }

    /// The observable components to register with the host, one per bond.
    pub fn components(&self, label: &str) -> Vec<output::Component> {
        output::components(label, self.registry().len(), self.supports_derivatives())
    }
}
