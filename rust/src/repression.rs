//! Simple repression with an allosteric repressor.
//!
//! Fold-change in gene expression for a single repressor binding site:
//!     fc = 1 / (1 + pact · (R / N_NS) · exp(-ep_r))
//!
//! Every parameter combination collapses onto one free-energy coordinate,
//! the Bohr parameter
//!     F = -ln(pact) - ln(R / N_NS) + ep_r
//! with fc = 1 / (1 + exp(-F)).

use ndarray::{ArrayD, Zip};

use crate::constants::{Constants, N_NONSPECIFIC_SITES};
use crate::error::{Error, Result};
use crate::mwc::{validate_allosteric, Mwc};
use crate::quantity::{broadcast_shape, Quantity};

/// Fold-change for a given active probability.
#[inline]
pub fn fold_change(pact: f64, repressors: f64, ep_r: f64, n_ns: f64) -> f64 {
    1.0 / (1.0 + pact * (repressors / n_ns) * (-ep_r).exp())
}

/// Bohr parameter (k_BT) for a given active probability.
#[inline]
pub fn bohr_parameter(pact: f64, repressors: f64, ep_r: f64, n_ns: f64) -> f64 {
    -pact.ln() - (repressors / n_ns).ln() + ep_r
}

/// Inputs to the repression model.
///
/// Any of the `Quantity` fields may be an array; they are broadcast together
/// when the model is built.
#[derive(Clone, Debug)]
pub struct RepressionParameters {
    /// Repressor copy number per cell.
    pub repressors: Quantity,
    /// Repressor-operator binding energy (k_BT).
    pub ep_r: Quantity,
    /// Effector dissociation constant, active state.
    pub ka: Quantity,
    /// Effector dissociation constant, inactive state.
    pub ki: Quantity,
    /// Inactive/active energy difference (k_BT).
    pub ep_ai: Quantity,
    /// Effector concentration.
    pub effector_conc: Quantity,
    /// Number of effector binding sites.
    pub n_sites: u32,
    /// Number of nonspecific binding sites on the genome.
    pub n_ns: f64,
}

impl RepressionParameters {
    /// Parameters with two effector sites and the E. coli nonspecific background.
    pub fn new(
        repressors: impl Into<Quantity>,
        ep_r: impl Into<Quantity>,
        ka: impl Into<Quantity>,
        ki: impl Into<Quantity>,
        ep_ai: impl Into<Quantity>,
        effector_conc: impl Into<Quantity>,
    ) -> Self {
        Self {
            repressors: repressors.into(),
            ep_r: ep_r.into(),
            ka: ka.into(),
            ki: ki.into(),
            ep_ai: ep_ai.into(),
            effector_conc: effector_conc.into(),
            n_sites: 2,
            n_ns: N_NONSPECIFIC_SITES,
        }
    }

    /// Parameters for a named operator using reference allosteric constants.
    pub fn from_constants(
        constants: &Constants,
        operator: &str,
        repressors: impl Into<Quantity>,
        effector_conc: impl Into<Quantity>,
    ) -> Result<Self> {
        let ep_r = constants.operator_energy(operator)?;
        Ok(Self {
            n_sites: constants.n_sites,
            n_ns: constants.n_ns,
            ..Self::new(
                repressors,
                ep_r,
                constants.ka,
                constants.ki,
                constants.ep_ai,
                effector_conc,
            )
        })
    }

    pub fn with_n_sites(mut self, n_sites: u32) -> Self {
        self.n_sites = n_sites;
        self
    }

    pub fn with_n_ns(mut self, n_ns: f64) -> Self {
        self.n_ns = n_ns;
        self
    }

    /// Check the physical domain of every parameter and return the broadcast
    /// shape of the model's outputs.
    pub fn validate(&self) -> Result<Vec<usize>> {
        self.repressors
            .require("repressors", "must be positive and finite", |v| {
                v > 0.0 && v.is_finite()
            })?;
        self.ep_r.require("ep_r", "must be finite", f64::is_finite)?;
        validate_allosteric(
            &self.ka,
            &self.ki,
            &self.ep_ai,
            &self.effector_conc,
            self.n_sites,
        )?;
        if !(self.n_ns > 0.0 && self.n_ns.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "n_ns",
                value: self.n_ns,
                reason: "must be positive and finite",
            });
        }

        broadcast_shape([
            &self.repressors,
            &self.ep_r,
            &self.ka,
            &self.ki,
            &self.ep_ai,
            &self.effector_conc,
        ])
    }
}

/// Validated simple-repression model over a broadcast parameter grid.
#[derive(Clone, Debug)]
pub struct SimpleRepression {
    params: RepressionParameters,
    mwc: Mwc,
    shape: Vec<usize>,
}

impl SimpleRepression {
    pub fn new(params: RepressionParameters) -> Result<Self> {
        let shape = params.validate()?;
        let mwc = Mwc::new(
            params.ka.clone(),
            params.ki.clone(),
            params.ep_ai.clone(),
            params.effector_conc.clone(),
            params.n_sites,
        )?;
        Ok(Self { params, mwc, shape })
    }

    pub fn params(&self) -> &RepressionParameters {
        &self.params
    }

    /// Broadcast shape of `fold_change`, `bohr_parameter` and
    /// `active_probability`.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Active-state probability broadcast to the model's shape.
    pub fn active_probability(&self) -> Result<ArrayD<f64>> {
        let pact = Quantity::from(self.mwc.pact()?);
        Ok(pact.broadcast_to(&self.shape)?.to_owned())
    }

    pub fn fold_change(&self) -> Result<ArrayD<f64>> {
        let n_ns = self.params.n_ns;
        self.map_with_pact(|pact, r, ep_r| fold_change(pact, r, ep_r, n_ns))
    }

    pub fn bohr_parameter(&self) -> Result<ArrayD<f64>> {
        let n_ns = self.params.n_ns;
        self.map_with_pact(|pact, r, ep_r| bohr_parameter(pact, r, ep_r, n_ns))
    }

    fn map_with_pact<F>(&self, f: F) -> Result<ArrayD<f64>>
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let pact = Quantity::from(self.mwc.pact()?);
        let shape = &self.shape;
        Ok(Zip::from(pact.broadcast_to(shape)?)
            .and(self.params.repressors.broadcast_to(shape)?)
            .and(self.params.ep_r.broadcast_to(shape)?)
            .map_collect(|&pact, &r, &ep_r| f(pact, r, ep_r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    fn wild_type(c: impl Into<Quantity>) -> SimpleRepression {
        SimpleRepression::new(RepressionParameters::new(260.0, -13.9, 139.0, 0.53, 4.5, c))
            .unwrap()
    }

    #[test]
    fn test_wild_type_leakiness() {
        let fc = wild_type(0.0).fold_change().unwrap();
        let leak = fc.iter().copied().next().unwrap();
        assert!(leak > 0.002 && leak < 0.02, "leakiness {leak}");
    }

    #[test]
    fn test_wild_type_induced() {
        let fc = wild_type(1000.0).fold_change().unwrap();
        let induced = fc.iter().copied().next().unwrap();
        assert!(induced > 0.85 && induced <= 1.0, "induced fold-change {induced}");
    }

    #[test]
    fn test_round_trip_through_bohr() {
        let c = Array1::logspace(10.0, -2.0, 4.0, 50);
        let model = wild_type(c);
        let fc = model.fold_change().unwrap();
        let bohr = model.bohr_parameter().unwrap();

        for (&fc, &f) in fc.iter().zip(bohr.iter()) {
            assert_relative_eq!(fc, 1.0 / (1.0 + (-f).exp()), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_monotone_in_repressors() {
        let r = Array1::logspace(10.0, 0.0, 4.0, 40);
        let model =
            SimpleRepression::new(RepressionParameters::new(r, -13.9, 139.0, 0.53, 4.5, 50.0))
                .unwrap();
        let fc = model.fold_change().unwrap();
        for w in fc.as_slice().unwrap().windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_stronger_binding_represses_more() {
        let ep = vec![-17.0, -15.3, -13.9, -9.7];
        let model =
            SimpleRepression::new(RepressionParameters::new(260.0, ep, 139.0, 0.53, 4.5, 0.0))
                .unwrap();
        let fc = model.fold_change().unwrap();
        for w in fc.as_slice().unwrap().windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_two_dimensional_grid() {
        // posterior chain as a column against a concentration row
        let ka = array![[120.0], [139.0], [160.0]];
        let c = vec![0.0, 10.0, 100.0, 1000.0];
        let params = RepressionParameters {
            ka: Quantity::from(ka),
            ..RepressionParameters::new(260.0, -13.9, 139.0, 0.53, 4.5, c)
        };
        let model = SimpleRepression::new(params).unwrap();
        assert_eq!(model.shape(), &[3, 4]);

        let fc = model.fold_change().unwrap();
        assert_eq!(fc.shape(), &[3, 4]);
        // Leakiness does not depend on ka
        assert_relative_eq!(fc[[0, 0]], fc[[2, 0]], max_relative = 1e-12);

        let pact = model.active_probability().unwrap();
        assert_eq!(pact.shape(), &[3, 4]);
    }

    #[test]
    fn test_fold_change_in_unit_interval() {
        let r = vec![1.0, 10.0, 100.0, 1e4];
        let params = RepressionParameters::new(r, -20.0, 139.0, 0.53, -2.0, 0.0);
        let fc = SimpleRepression::new(params).unwrap().fold_change().unwrap();
        assert!(fc.iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn test_from_constants() {
        let constants = Constants::default();
        let params = RepressionParameters::from_constants(&constants, "O2", 260.0, 0.0).unwrap();
        assert_eq!(params.ep_r.as_scalar(), Some(-13.9));
        assert_eq!(params.n_sites, 2);

        let err = RepressionParameters::from_constants(&constants, "O4", 260.0, 0.0).unwrap_err();
        assert!(matches!(err, Error::UnknownOperator(_)));
    }

    #[test]
    fn test_invalid_parameters() {
        let params = RepressionParameters::new(0.0, -13.9, 139.0, 0.53, 4.5, 0.0);
        assert!(matches!(
            SimpleRepression::new(params),
            Err(Error::InvalidParameter { name: "repressors", .. })
        ));

        let params = RepressionParameters::new(260.0, f64::NAN, 139.0, 0.53, 4.5, 0.0);
        assert!(matches!(
            SimpleRepression::new(params),
            Err(Error::InvalidParameter { name: "ep_r", .. })
        ));

        let params = RepressionParameters::new(260.0, -13.9, 139.0, 0.53, 4.5, 0.0).with_n_ns(0.0);
        assert!(matches!(
            SimpleRepression::new(params),
            Err(Error::InvalidParameter { name: "n_ns", .. })
        ));

        let params =
            RepressionParameters::new(vec![1.0, 2.0], -13.9, 139.0, 0.53, 4.5, vec![0.0; 3]);
        assert!(matches!(
            SimpleRepression::new(params),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
