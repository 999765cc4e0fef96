//! Reference parameter values for the lac repressor system.
//!
//! Operator binding energies and repressor copy numbers are keyed by name.
//! A `Constants` record is never modified in place; `with_operator` returns a
//! new record.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Nonspecific binding sites on the E. coli genome.
pub const N_NONSPECIFIC_SITES: f64 = 4.6e6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    /// Repressor-operator binding energies (k_BT).
    /// Source: Garcia & Phillips, PNAS 2011
    pub operators: BTreeMap<String, f64>,

    /// Repressors per cell for each strain.
    pub repressor_copy_numbers: BTreeMap<String, f64>,

    /// IPTG dissociation constant of the active repressor (µM).
    /// Source: Razo-Mejia et al., Cell Systems 2018
    pub ka: f64,

    /// IPTG dissociation constant of the inactive repressor (µM).
    pub ki: f64,

    /// Inactive/active energy difference (k_BT).
    pub ep_ai: f64,

    /// IPTG binding sites per repressor.
    pub n_sites: u32,

    /// Nonspecific binding sites.
    pub n_ns: f64,
}

impl Default for Constants {
    fn default() -> Self {
        let operators = [("O1", -15.3), ("O2", -13.9), ("O3", -9.7), ("Oid", -17.0)];
        let strains = [
            ("HG104", 22.0),
            ("RBS1147", 60.0),
            ("RBS446", 124.0),
            ("RBS1027", 260.0),
            ("RBS1", 1220.0),
            ("RBS1L", 1740.0),
        ];

        Self {
            operators: operators
                .iter()
                .map(|&(name, ep)| (name.to_string(), ep))
                .collect(),
            repressor_copy_numbers: strains
                .iter()
                .map(|&(name, r)| (name.to_string(), r))
                .collect(),
            ka: 139.0,
            ki: 0.53,
            ep_ai: 4.5,
            n_sites: 2,
            n_ns: N_NONSPECIFIC_SITES,
        }
    }
}

impl Constants {
    /// Load constants from a JSON file. Missing fields take default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let constants: Self = serde_json::from_str(&contents)?;
        info!(path = ?path.as_ref(), "loaded constants");
        Ok(constants)
    }

    /// Load from JSON or fall back to the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_json_file(path.as_ref()) {
            Ok(constants) => constants,
            Err(e) => {
                warn!(path = ?path.as_ref(), error = %e, "using default constants");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn operator_energy(&self, operator: &str) -> Result<f64> {
        self.operators
            .get(operator)
            .copied()
            .ok_or_else(|| Error::UnknownOperator(operator.to_string()))
    }

    pub fn repressor_copy_number(&self, strain: &str) -> Result<f64> {
        self.repressor_copy_numbers
            .get(strain)
            .copied()
            .ok_or_else(|| Error::UnknownStrain(strain.to_string()))
    }

    /// Copy of these constants with an operator added or replaced.
    pub fn with_operator(&self, operator: &str, ep_r: f64) -> Self {
        let mut constants = self.clone();
        constants.operators.insert(operator.to_string(), ep_r);
        constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let constants = Constants::default();
        assert_eq!(constants.operator_energy("O1").unwrap(), -15.3);
        assert_eq!(constants.operator_energy("Oid").unwrap(), -17.0);
        assert_eq!(constants.repressor_copy_number("RBS1027").unwrap(), 260.0);
        assert_eq!(constants.n_sites, 2);
        assert_eq!(constants.n_ns, 4.6e6);
    }

    #[test]
    fn test_unknown_names() {
        let constants = Constants::default();
        assert!(matches!(
            constants.operator_energy("O4"),
            Err(Error::UnknownOperator(name)) if name == "O4"
        ));
        assert!(matches!(
            constants.repressor_copy_number("MG1655"),
            Err(Error::UnknownStrain(_))
        ));
    }

    #[test]
    fn test_with_operator_leaves_original() {
        let constants = Constants::default();
        let extended = constants.with_operator("O2", -14.0);
        assert_eq!(constants.operator_energy("O2").unwrap(), -13.9);
        assert_eq!(extended.operator_energy("O2").unwrap(), -14.0);
    }

    #[test]
    fn test_json_round_trip() {
        let constants = Constants::default().with_operator("Omut", -12.1);
        let json = constants.to_json().unwrap();
        let parsed: Constants = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, constants);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: Constants = serde_json::from_str(r#"{"ka": 200.0}"#).unwrap();
        assert_eq!(parsed.ka, 200.0);
        assert_eq!(parsed.ki, 0.53);
        assert_eq!(parsed.operator_energy("O3").unwrap(), -9.7);
    }

    #[test]
    fn test_shipped_constants_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/constants.json");
        let constants = Constants::from_json_file(path).unwrap();
        assert_eq!(constants, Constants::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let constants = Constants::load_or_default("/nonexistent/constants.json");
        assert_eq!(constants, Constants::default());
        assert!(matches!(
            Constants::from_json_file("/nonexistent/constants.json"),
            Err(Error::Io(_))
        ));
    }
}
