//! Data collapse onto the Bohr parameter.
//!
//! Measured fold-changes map back to an empirical Bohr parameter, and the
//! shift in Bohr parameter between a mutant and a reference splits into
//! additive contributions from the allosteric state, the repressor count and
//! the binding energy:
//!     ΔF = -ln(pact / pact_ref) - ln(R / R_ref) + (ep_r - ep_r_ref)

use ndarray::{ArrayD, Zip};

use crate::error::{Error, Result};
use crate::quantity::{broadcast_shape, Quantity};
use crate::repression::SimpleRepression;

/// Bohr parameter implied by a measured fold-change, `-ln(1/fc - 1)`.
pub fn empirical_bohr(fold_change: f64) -> Result<f64> {
    if !(fold_change > 0.0 && fold_change < 1.0) {
        return Err(Error::InvalidParameter {
            name: "fold_change",
            value: fold_change,
            reason: "must be in (0, 1)",
        });
    }
    Ok(-(1.0 / fold_change - 1.0).ln())
}

/// Empirical Bohr parameter of every sample, e.g. posterior draws of the
/// fold-change for one measurement.
pub fn empirical_bohr_samples(fold_changes: &[f64]) -> Result<Vec<f64>> {
    fold_changes.iter().map(|&fc| empirical_bohr(fc)).collect()
}

/// Decomposition of a Bohr-parameter shift relative to a reference.
#[derive(Clone, Debug)]
pub struct DeltaBohr {
    /// F - F_ref.
    pub total: ArrayD<f64>,
    /// -ln(pact / pact_ref).
    pub allosteric: ArrayD<f64>,
    /// -ln(R / R_ref).
    pub repressors: ArrayD<f64>,
    /// ep_r - ep_r_ref.
    pub binding: ArrayD<f64>,
}

impl SimpleRepression {
    /// Shift in Bohr parameter of this model relative to `reference`.
    ///
    /// Both models are broadcast against each other.
    pub fn delta_bohr(&self, reference: &SimpleRepression) -> Result<DeltaBohr> {
        let bohr = Quantity::from(self.bohr_parameter()?);
        let bohr_ref = Quantity::from(reference.bohr_parameter()?);
        let pact = Quantity::from(self.active_probability()?);
        let pact_ref = Quantity::from(reference.active_probability()?);

        let shape = broadcast_shape([&bohr, &bohr_ref])?;
        let (p, p_ref) = (self.params(), reference.params());

        let total = Zip::from(bohr.broadcast_to(&shape)?)
            .and(bohr_ref.broadcast_to(&shape)?)
            .map_collect(|&f, &f_ref| f - f_ref);
        let allosteric = Zip::from(pact.broadcast_to(&shape)?)
            .and(pact_ref.broadcast_to(&shape)?)
            .map_collect(|&pact, &pact_ref| -(pact / pact_ref).ln());
        let repressors = Zip::from(p.repressors.broadcast_to(&shape)?)
            .and(p_ref.repressors.broadcast_to(&shape)?)
            .map_collect(|&r, &r_ref| -(r / r_ref).ln());
        let binding = Zip::from(p.ep_r.broadcast_to(&shape)?)
            .and(p_ref.ep_r.broadcast_to(&shape)?)
            .map_collect(|&ep, &ep_ref| ep - ep_ref);

        Ok(DeltaBohr {
            total,
            allosteric,
            repressors,
            binding,
        })
    }
}
