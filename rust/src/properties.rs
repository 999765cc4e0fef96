//! Dose-response properties of the induction profile.
//!
//! For fixed repressor copy number, binding energy and allosteric constants
//! the fold-change rises (or falls) monotonically from the leakiness at zero
//! effector to the saturation at saturating effector. The EC50 is the
//! concentration halfway between the two, and the effective Hill coefficient
//! is the steepness of the normalized response there.

use ndarray::{ArrayD, Zip};
use tracing::debug;

use crate::error::Result;
use crate::mwc::{active_probability, pow_sites, saturated_active_probability};
use crate::quantity::broadcast_shape;
use crate::repression::{fold_change, SimpleRepression};

/// Properties at one point of the parameter grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointProperties {
    pub leakiness: f64,
    pub saturation: f64,
    pub dynamic_range: f64,
    pub ec50: f64,
    pub effective_hill: f64,
}

/// Induction properties over the broadcast grid of
/// `(repressors, ep_r, ka, ki, ep_ai)`.
#[derive(Clone, Debug)]
pub struct Properties {
    pub leakiness: ArrayD<f64>,
    pub saturation: ArrayD<f64>,
    pub dynamic_range: ArrayD<f64>,
    pub ec50: ArrayD<f64>,
    pub effective_hill: ArrayD<f64>,
}

/// Induction profile of a single architecture.
#[derive(Clone, Copy, Debug)]
pub struct Architecture {
    pub repressors: f64,
    pub ep_r: f64,
    pub ka: f64,
    pub ki: f64,
    pub ep_ai: f64,
    pub n_sites: u32,
    pub n_ns: f64,
}

impl Architecture {
    /// `(R / N_NS) · exp(-ep_r)`, the repression strength of a fully active pool.
    fn repression_weight(&self) -> f64 {
        (self.repressors / self.n_ns) * (-self.ep_r).exp()
    }

    fn pact(&self, c: f64) -> f64 {
        active_probability(c, self.ka, self.ki, self.ep_ai, self.n_sites)
    }

    fn saturated_pact(&self) -> f64 {
        saturated_active_probability(self.ka, self.ki, self.ep_ai, self.n_sites)
    }

    pub fn fold_change(&self, c: f64) -> f64 {
        fold_change(self.pact(c), self.repressors, self.ep_r, self.n_ns)
    }

    pub fn leakiness(&self) -> f64 {
        self.fold_change(0.0)
    }

    pub fn saturation(&self) -> f64 {
        fold_change(self.saturated_pact(), self.repressors, self.ep_r, self.n_ns)
    }

    /// `saturation - leakiness`, evaluated as
    ///     x (p0 - ps) / ((1 + x p0) (1 + x ps))
    /// so it stays resolved when both ends round to 1.
    pub fn dynamic_range(&self) -> f64 {
        let x = self.repression_weight();
        let (p0, ps) = (self.pact(0.0), self.saturated_pact());
        let fc = |p| fold_change(p, self.repressors, self.ep_r, self.n_ns);
        x * (p0 - ps) * fc(p0) * fc(ps)
    }

    /// Effector concentration at which the fold-change is halfway between
    /// leakiness and saturation.
    ///
    /// The midpoint fold-change corresponds to the active probability
    ///     p* = (p0 + ps + 2 x p0 ps) / (2 + x (p0 + ps))
    /// with `x` the repression weight, and inverting the MWC ratio gives
    ///     r   = (exp(-ep_ai) · p* / (1 - p*))^(1/n)
    ///     c50 = (r - 1) / (1/ka - r/ki)
    /// which holds for any number of binding sites.
    ///
    /// Returns `NaN` when the response is flat (`ka == ki`, or repression
    /// too weak to register).
    pub fn ec50(&self) -> f64 {
        if self.ka == self.ki || self.dynamic_range() == 0.0 {
            return f64::NAN;
        }
        let x = self.repression_weight();
        let (p0, ps) = (self.pact(0.0), self.saturated_pact());
        let p_star = (p0 + ps + 2.0 * x * p0 * ps) / (2.0 + x * (p0 + ps));
        if !(p_star > 0.0 && p_star < 1.0) {
            return f64::NAN;
        }

        let odds = (-self.ep_ai).exp() * p_star / (1.0 - p_star);
        let r = odds.powf(1.0 / f64::from(self.n_sites));
        let ec50 = (r - 1.0) / (1.0 / self.ka - r / self.ki);
        if ec50 > 0.0 && ec50.is_finite() {
            ec50
        } else {
            f64::NAN
        }
    }

    /// `-d pact / d ln c`.
    fn pact_log_slope(&self, c: f64) -> f64 {
        let l = (-self.ep_ai).exp();
        let pact = self.pact(c);

        // s = (1 + c/ki) / (1 + c/ka) and its derivative in c
        let s = (1.0 + c / self.ki) / (1.0 + c / self.ka);
        let ds = (1.0 / self.ki - 1.0 / self.ka) / (1.0 + c / self.ka).powi(2);

        c * l
            * pact.powi(2)
            * f64::from(self.n_sites)
            * pow_sites(s, self.n_sites.saturating_sub(1))
            * ds
    }

    /// Slope of the fold-change with respect to `ln c`.
    pub fn log_sensitivity(&self, c: f64) -> f64 {
        let fc = self.fold_change(c);
        self.repression_weight() * fc.powi(2) * self.pact_log_slope(c)
    }

    /// Effective Hill coefficient: `4 · d fc / d ln c / (sat - leak)` at the EC50.
    ///
    /// This is twice the log-log slope of the normalized response
    /// `(fc - leak) / (sat - leak)` at its midpoint, and equals `h` for a
    /// Hill function `c^h / (K^h + c^h)`. The repression weight cancels
    /// between numerator and denominator and is divided out analytically.
    pub fn effective_hill(&self) -> f64 {
        let ec50 = self.ec50();
        if !ec50.is_finite() {
            return f64::NAN;
        }
        let (p0, ps) = (self.pact(0.0), self.saturated_pact());
        let fc = |p| fold_change(p, self.repressors, self.ep_r, self.n_ns);
        4.0 * fc(self.pact(ec50)).powi(2) * self.pact_log_slope(ec50)
            / ((p0 - ps) * fc(p0) * fc(ps))
    }

    pub fn properties(&self) -> PointProperties {
        PointProperties {
            leakiness: self.leakiness(),
            saturation: self.saturation(),
            dynamic_range: self.dynamic_range(),
            ec50: self.ec50(),
            effective_hill: self.effective_hill(),
        }
    }
}

impl SimpleRepression {
    /// Leakiness, saturation, dynamic range, EC50 and effective Hill
    /// coefficient.
    ///
    /// The model's effector concentration is ignored; the output shape is the
    /// broadcast of the remaining parameters.
    pub fn compute_properties(&self) -> Result<Properties> {
        let p = self.params();
        let shape = broadcast_shape([&p.repressors, &p.ep_r, &p.ka, &p.ki, &p.ep_ai])?;
        let (n_sites, n_ns) = (p.n_sites, p.n_ns);

        let points = Zip::from(p.repressors.broadcast_to(&shape)?)
            .and(p.ep_r.broadcast_to(&shape)?)
            .and(p.ka.broadcast_to(&shape)?)
            .and(p.ki.broadcast_to(&shape)?)
            .and(p.ep_ai.broadcast_to(&shape)?)
            .map_collect(|&repressors, &ep_r, &ka, &ki, &ep_ai| {
                Architecture {
                    repressors,
                    ep_r,
                    ka,
                    ki,
                    ep_ai,
                    n_sites,
                    n_ns,
                }
                .properties()
            });

        let flat = points.iter().filter(|pt| pt.ec50.is_nan()).count();
        if flat > 0 {
            debug!(flat, total = points.len(), "no induction response at some grid points");
        }

        Ok(Properties {
            leakiness: points.mapv(|pt| pt.leakiness),
            saturation: points.mapv(|pt| pt.saturation),
            dynamic_range: points.mapv(|pt| pt.dynamic_range),
            ec50: points.mapv(|pt| pt.ec50),
            effective_hill: points.mapv(|pt| pt.effective_hill),
        })
    }
}
