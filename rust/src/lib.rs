//! Thermodynamic model of simple repression by an allosteric (MWC) repressor.
//!
//! Provides:
//! - Mwc: active-state probability of the repressor
//! - SimpleRepression: fold-change, Bohr parameter and induction properties
//!   over broadcast parameter grids
//! - compute_hpd / compute_hpd_columns: HPD summaries of posterior draws
//! - empirical_bohr / delta_bohr: collapse of measurements onto the Bohr
//!   parameter
//! - Constants: reference parameter values
//!
//! With the `python` feature the crate builds the `mwc_repression` Python
//! extension module.

mod collapse;
mod constants;
mod error;
mod hpd;
mod mwc;
mod properties;
mod quantity;
mod repression;

#[cfg(feature = "python")]
mod python;

pub use collapse::{empirical_bohr, empirical_bohr_samples, DeltaBohr};
pub use constants::{Constants, N_NONSPECIFIC_SITES};
pub use error::{Error, Result};
pub use hpd::{compute_hpd, compute_hpd_columns, CredibleBand, CredibleInterval};
pub use mwc::{active_probability, saturated_active_probability, Mwc};
pub use properties::{Architecture, PointProperties, Properties};
pub use quantity::{broadcast_shape, Quantity};
pub use repression::{bohr_parameter, fold_change, RepressionParameters, SimpleRepression};
