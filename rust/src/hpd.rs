//! Highest-posterior-density intervals from empirical samples.
//!
//! The HPD interval is approximated by the narrowest window of sorted
//! samples spanning `floor(mass · n)` steps. Only contiguous windows are
//! considered, so the result is the HPD of a unimodal density; disjoint
//! regions of a multimodal sample are not resolved.

use ndarray::{Array1, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

/// Narrowest interval containing `mass` of a sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CredibleInterval {
    pub lower: f64,
    pub upper: f64,
    pub mass: f64,
}

impl CredibleInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// One credible interval per grid point, typically around a model curve.
#[derive(Clone, Debug, PartialEq)]
pub struct CredibleBand {
    pub lower: Array1<f64>,
    pub upper: Array1<f64>,
    pub mass: f64,
}

/// Compute the HPD interval of `samples` at probability `mass`.
///
/// # Algorithm
/// 1. Sort a copy of the samples ascending: s[0..n]
/// 2. k = floor(mass · n)
/// 3. For each start i in 0..n-k, width = s[i+k] - s[i]
/// 4. Return the window of minimal width; ties go to the smallest lower bound
///
/// # Errors
/// * `InvalidMass` if `mass` is not in (0, 1)
/// * `InvalidParameter` if a sample is NaN
/// * `InsufficientSamples` if `n < 2` or `k < 1`
pub fn compute_hpd(samples: &[f64], mass: f64) -> Result<CredibleInterval> {
    if !(mass > 0.0 && mass < 1.0) {
        return Err(Error::InvalidMass(mass));
    }
    if let Some(&value) = samples.iter().find(|v| v.is_nan()) {
        return Err(Error::InvalidParameter {
            name: "samples",
            value,
            reason: "must not contain NaN",
        });
    }

    let n = samples.len();
    let span = (mass * n as f64).floor() as usize;
    if n < 2 || span < 1 {
        return Err(Error::InsufficientSamples { n, span });
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    // span < n because mass < 1, so there is at least one window
    let mut best = 0;
    let mut best_width = f64::INFINITY;
    for i in 0..n - span {
        let width = sorted[i + span] - sorted[i];
        if width < best_width {
            best = i;
            best_width = width;
        }
    }

    Ok(CredibleInterval {
        lower: sorted[best],
        upper: sorted[best + span],
        mass,
    })
}

/// HPD interval of every column of a draws × grid matrix.
///
/// Rows are posterior draws, columns are grid points (e.g. effector
/// concentrations). Columns are summarized in parallel.
pub fn compute_hpd_columns(draws: ArrayView2<f64>, mass: f64) -> Result<CredibleBand> {
    if !(mass > 0.0 && mass < 1.0) {
        return Err(Error::InvalidMass(mass));
    }

    let intervals: Vec<CredibleInterval> = (0..draws.ncols())
        .into_par_iter()
        .map(|j| {
            let column = draws.column(j).to_vec();
            compute_hpd(&column, mass)
        })
        .collect::<Result<_>>()?;

    debug!(
        columns = intervals.len(),
        draws = draws.nrows(),
        mass,
        "computed HPD band"
    );

    Ok(CredibleBand {
        lower: intervals.iter().map(|ci| ci.lower).collect(),
        upper: intervals.iter().map(|ci| ci.upper).collect(),
        mass,
    })
}
