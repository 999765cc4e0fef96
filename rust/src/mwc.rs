//! Two-state (MWC) allosteric repressor.
//!
//! The repressor is either active (binds DNA) or inactive. Both states bind
//! the effector at `n_sites` identical, independent sites with dissociation
//! constants `ka` (active) and `ki` (inactive). `ep_ai` is the free-energy
//! difference between the inactive and active states in k_BT units.

use ndarray::{ArrayD, Zip};

use crate::error::{Error, Result};
use crate::quantity::{broadcast_shape, Quantity};

/// Probability that the repressor is in the active state.
///
/// Evaluated as
///     1 / (1 + exp(-ep_ai) * ((1 + c/ki) / (1 + c/ka))^n)
/// which equals `(1 + c/ka)^n / ((1 + c/ka)^n + exp(-ep_ai) (1 + c/ki)^n)`
/// without overflowing at large `c`.
#[inline]
pub fn active_probability(c: f64, ka: f64, ki: f64, ep_ai: f64, n_sites: u32) -> f64 {
    let ratio = (1.0 + c / ki) / (1.0 + c / ka);
    1.0 / (1.0 + (-ep_ai).exp() * pow_sites(ratio, n_sites))
}

/// Active probability in the limit of saturating effector.
#[inline]
pub fn saturated_active_probability(ka: f64, ki: f64, ep_ai: f64, n_sites: u32) -> f64 {
    1.0 / (1.0 + (-ep_ai).exp() * pow_sites(ka / ki, n_sites))
}

/// `x^n` for a site count; site counts beyond `i32::MAX` use `powf`.
#[inline]
pub(crate) fn pow_sites(x: f64, n_sites: u32) -> f64 {
    match i32::try_from(n_sites) {
        Ok(n) => x.powi(n),
        Err(_) => x.powf(f64::from(n_sites)),
    }
}

/// Check the allosteric parameters shared by [`Mwc`] and the repression model.
pub(crate) fn validate_allosteric(
    ka: &Quantity,
    ki: &Quantity,
    ep_ai: &Quantity,
    effector_conc: &Quantity,
    n_sites: u32,
) -> Result<()> {
    ka.require("ka", "must be positive and finite", |v| v > 0.0 && v.is_finite())?;
    ki.require("ki", "must be positive and finite", |v| v > 0.0 && v.is_finite())?;
    ep_ai.require("ep_ai", "must be finite", f64::is_finite)?;
    effector_conc.require("effector_conc", "must be non-negative and finite", |v| {
        v >= 0.0 && v.is_finite()
    })?;
    if n_sites == 0 {
        return Err(Error::InvalidParameter {
            name: "n_sites",
            value: 0.0,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// MWC description of an allosteric repressor over a (broadcast) grid.
#[derive(Clone, Debug)]
pub struct Mwc {
    ka: Quantity,
    ki: Quantity,
    ep_ai: Quantity,
    effector_conc: Quantity,
    n_sites: u32,
    shape: Vec<usize>,
}

impl Mwc {
    /// Build a validated MWC model.
    ///
    /// # Arguments
    /// * `ka` - Effector dissociation constant of the active state
    /// * `ki` - Effector dissociation constant of the inactive state
    /// * `ep_ai` - Inactive/active energy difference (k_BT)
    /// * `effector_conc` - Effector concentration, same units as `ka`/`ki`
    /// * `n_sites` - Number of effector binding sites
    pub fn new(
        ka: impl Into<Quantity>,
        ki: impl Into<Quantity>,
        ep_ai: impl Into<Quantity>,
        effector_conc: impl Into<Quantity>,
        n_sites: u32,
    ) -> Result<Self> {
        let ka = ka.into();
        let ki = ki.into();
        let ep_ai = ep_ai.into();
        let effector_conc = effector_conc.into();

        validate_allosteric(&ka, &ki, &ep_ai, &effector_conc, n_sites)?;
        let shape = broadcast_shape([&ka, &ki, &ep_ai, &effector_conc])?;

        Ok(Self {
            ka,
            ki,
            ep_ai,
            effector_conc,
            n_sites,
            shape,
        })
    }

    /// Broadcast shape of the model's outputs.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn n_sites(&self) -> u32 {
        self.n_sites
    }

    /// Active-state probability at every grid point.
    pub fn pact(&self) -> Result<ArrayD<f64>> {
        let shape = &self.shape;
        let n_sites = self.n_sites;
        Ok(Zip::from(self.effector_conc.broadcast_to(shape)?)
            .and(self.ka.broadcast_to(shape)?)
            .and(self.ki.broadcast_to(shape)?)
            .and(self.ep_ai.broadcast_to(shape)?)
            .map_collect(|&c, &ka, &ki, &ep_ai| active_probability(c, ka, ki, ep_ai, n_sites)))
    }

    /// Active-state probability at saturating effector.
    ///
    /// Independent of `effector_conc`, so the shape only covers `ka`, `ki`
    /// and `ep_ai`.
    pub fn saturation(&self) -> Result<ArrayD<f64>> {
        let shape = broadcast_shape([&self.ka, &self.ki, &self.ep_ai])?;
        let n_sites = self.n_sites;
        Ok(Zip::from(self.ka.broadcast_to(&shape)?)
            .and(self.ki.broadcast_to(&shape)?)
            .and(self.ep_ai.broadcast_to(&shape)?)
            .map_collect(|&ka, &ki, &ep_ai| saturated_active_probability(ka, ki, ep_ai, n_sites)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_effector_limit() {
        // Bitwise equal to the two-state Boltzmann weight
        for &ep_ai in &[-3.0, 0.0, 1.0, 4.5] {
            let p = active_probability(0.0, 139.0, 0.53, ep_ai, 2);
            assert_eq!(p, 1.0 / (1.0 + f64::exp(-ep_ai)));
        }
    }

    #[test]
    fn test_matches_unreduced_form() {
        let (ka, ki, ep_ai): (f64, f64, f64) = (139.0, 0.53, 4.5);
        for &c in &[0.1, 1.0, 25.0, 500.0] {
            let num = (1.0 + c / ka).powi(2);
            let den = num + (-ep_ai).exp() * (1.0 + c / ki).powi(2);
            let p = active_probability(c, ka, ki, ep_ai, 2);
            assert!((p - num / den).abs() < 1e-12);
        }
    }

    #[test]
    fn test_converges_to_saturation() {
        let sat = saturated_active_probability(139.0, 0.53, 4.5, 2);
        let p = active_probability(1e12, 139.0, 0.53, 4.5, 2);
        assert!((p - sat).abs() / sat < 1e-8);
    }

    #[test]
    fn test_stable_at_huge_concentration() {
        let p = active_probability(1e300, 139.0, 0.53, 4.5, 4);
        assert!(p.is_finite());
        assert!(p > 0.0 && p <= 1.0);
    }

    #[test]
    fn test_huge_site_count_keeps_sign_of_exponent() {
        // ratio > 1 for ka > ki, so the inactive state takes over
        let n_sites = u32::MAX;
        assert_eq!(active_probability(10.0, 139.0, 0.53, 4.5, n_sites), 0.0);
        assert_eq!(saturated_active_probability(139.0, 0.53, 4.5, n_sites), 0.0);
        assert_eq!(pow_sites(2.0, 3), 8.0);
        assert_eq!(pow_sites(1.0, n_sites), 1.0);
    }

    #[test]
    fn test_pact_over_grid() {
        let c = vec![0.0, 1.0, 10.0, 100.0, 1000.0];
        let mwc = Mwc::new(139.0, 0.53, 4.5, c, 2).unwrap();
        assert_eq!(mwc.shape(), &[5]);

        let pact = mwc.pact().unwrap();
        // Effector binds the inactive state more tightly, so activity drops
        for w in pact.as_slice().unwrap().windows(2) {
            assert!(w[1] < w[0]);
        }
        assert!(pact.iter().all(|&p| p > 0.0 && p <= 1.0));

        let sat = mwc.saturation().unwrap();
        assert_eq!(sat.ndim(), 0);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            Mwc::new(0.0, 0.53, 4.5, 1.0, 2),
            Err(Error::InvalidParameter { name: "ka", .. })
        ));
        assert!(matches!(
            Mwc::new(139.0, -0.53, 4.5, 1.0, 2),
            Err(Error::InvalidParameter { name: "ki", .. })
        ));
        assert!(matches!(
            Mwc::new(139.0, 0.53, 4.5, vec![1.0, -1.0], 2),
            Err(Error::InvalidParameter { name: "effector_conc", .. })
        ));
        assert!(matches!(
            Mwc::new(139.0, 0.53, 4.5, 1.0, 0),
            Err(Error::InvalidParameter { name: "n_sites", .. })
        ));
        assert!(matches!(
            Mwc::new(vec![1.0, 2.0], 0.53, 4.5, vec![1.0, 2.0, 3.0], 2),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
