/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The parsed configuration surface.
//!
//! Keyword parsing itself belongs to the host engine; what arrives here is
//! the already-grouped data, modeled as a deserializable struct so that any
//! config transport (YAML in the tests) can produce it.

/// A per-bond coefficient: either one value broadcast to every bond, or
/// exactly one value per bond. Any other count is a configuration error.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PerBond {
    Broadcast(f64),
    Each(Vec<f64>),
}

impl PerBond {
    /// Resolve to one value per bond, enforcing the broadcast-or-exact rule.
    pub fn resolve(&self, num_bonds: usize, keyword: &'static str) -> Result<Vec<f64>, ConfigError> {
        match self {
            PerBond::Broadcast(value) => Ok(vec![*value; num_bonds]),
            PerBond::Each(values) => {
                if values.len() != num_bonds {
                    return Err(ConfigError::WrongCount {
                        keyword,
                        expected: num_bonds,
                        actual: values.len(),
                    });
                }
                Ok(values.clone())
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// The numbered atom groups; each group holds the two particles of one
    /// bond, in order.
    pub atoms: Vec<Vec<usize>>,

    /// Product of the gyromagnetic ratios of the two nuclei of each bond.
    /// Absent means zero, matching the host's unset-keyword behavior.
    #[serde(default = "_settings__gyrom")]
    pub gyrom: PerBond,

    /// Scaling factor taking concentration and other effects into account.
    #[serde(default = "_settings__scale")]
    pub scale: PerBond,

    /// Experimental couplings; required, one per bond, in svd mode.
    #[serde(default)]
    pub coupling: Vec<f64>,

    /// Force single-worker evaluation.
    #[serde(default)]
    pub serial: bool,

    /// Back-calculate couplings through the least-squares tensor fit
    /// instead of evaluating them directly.
    #[serde(default)]
    pub svd: bool,
}
fn _settings__gyrom() -> PerBond { PerBond::Broadcast(0.0) }
fn _settings__scale() -> PerBond { PerBond::Broadcast(1.0) }

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "atoms group {} has the wrong number of atoms (expected 2, got {})", index, len)]
    BadAtomsGroup { index: usize, len: usize },

    #[fail(display = "found wrong number of {} values (expected {}, got {})", keyword, expected, actual)]
    WrongCount { keyword: &'static str, expected: usize, actual: usize },

    #[fail(display = "svd mode requires one experimental coupling per bond, but none were given")]
    MissingCouplings,

    #[fail(display = "svd mode was requested, but this build has no linear-algebra support \
                      (enable the `svd-support` feature)")]
    SvdUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_round_trip() {
        let settings: Settings = serde_yaml::from_str(r#"
atoms: [[20, 21], [37, 38], [56, 57]]
gyrom: -72.5388
scale: [1.0, 1.0, 0.5]
serial: true
"#).unwrap();
        assert_eq!(settings.atoms.len(), 3);
        assert_eq!(settings.gyrom, PerBond::Broadcast(-72.5388));
        assert_eq!(settings.scale, PerBond::Each(vec![1.0, 1.0, 0.5]));
        assert!(settings.serial);
        assert!(!settings.svd);
        assert!(settings.coupling.is_empty());
    }

    #[test]
    fn defaults() {
        let settings: Settings = serde_yaml::from_str("atoms: [[1, 2]]").unwrap();
        assert_eq!(settings.gyrom, PerBond::Broadcast(0.0));
        assert_eq!(settings.scale, PerBond::Broadcast(1.0));
        assert!(!settings.serial);
        assert!(!settings.svd);
    }

    #[test]
    fn broadcast_equals_explicit() {
        let broadcast = PerBond::Broadcast(2.5).resolve(3, "scale").unwrap();
        let explicit = PerBond::Each(vec![2.5, 2.5, 2.5]).resolve(3, "scale").unwrap();
        assert_eq!(broadcast, explicit);
    }

    #[test]
    fn wrong_count_is_rejected() {
        let err = PerBond::Each(vec![1.0, 2.0]).resolve(3, "gyrom").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gyrom"), "{}", message);
        assert!(message.contains("expected 3"), "{}", message);
    }
}
