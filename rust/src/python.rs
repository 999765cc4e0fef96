//! Python bindings.
//!
//! Plotting code passes floats or numpy arrays for every model parameter and
//! gets numpy arrays back; broadcasting follows the same rules as numpy.

use numpy::{
    IntoPyArray, PyArray1, PyArrayDyn, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArrayDyn,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::collapse;
use crate::constants::Constants;
use crate::error::Error;
use crate::hpd;
use crate::mwc::Mwc;
use crate::quantity::Quantity;
use crate::repression::{RepressionParameters, SimpleRepression};

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Accept a float64 numpy array or a Python float.
///
/// Arrays are tried first: `f64` extraction goes through `__float__`, which
/// size-1 arrays implement, and would drop their shape.
fn quantity(value: &PyAny) -> PyResult<Quantity> {
    if let Ok(array) = value.extract::<PyReadonlyArrayDyn<f64>>() {
        return Ok(Quantity::from(array.as_array().to_owned()));
    }
    Ok(Quantity::scalar(value.extract::<f64>()?))
}

#[allow(clippy::too_many_arguments)]
fn build_model(
    repressors: &PyAny,
    ep_r: &PyAny,
    ka: &PyAny,
    ki: &PyAny,
    ep_ai: &PyAny,
    effector_conc: Quantity,
    n_sites: u32,
    n_ns: f64,
) -> PyResult<SimpleRepression> {
    let params = RepressionParameters::new(
        quantity(repressors)?,
        quantity(ep_r)?,
        quantity(ka)?,
        quantity(ki)?,
        quantity(ep_ai)?,
        effector_conc,
    )
    .with_n_sites(n_sites)
    .with_n_ns(n_ns);
    Ok(SimpleRepression::new(params)?)
}

/// Probability that the repressor is active.
#[pyfunction]
#[pyo3(signature = (ka, ki, ep_ai, effector_conc, n_sites=2))]
fn active_probability<'py>(
    py: Python<'py>,
    ka: &PyAny,
    ki: &PyAny,
    ep_ai: &PyAny,
    effector_conc: &PyAny,
    n_sites: u32,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let mwc = Mwc::new(
        quantity(ka)?,
        quantity(ki)?,
        quantity(ep_ai)?,
        quantity(effector_conc)?,
        n_sites,
    )?;
    Ok(mwc.pact()?.into_pyarray(py))
}

/// Fold-change in gene expression.
#[pyfunction]
#[pyo3(signature = (repressors, ep_r, ka, ki, ep_ai, effector_conc, n_sites=2, n_ns=4.6e6))]
#[allow(clippy::too_many_arguments)]
fn fold_change<'py>(
    py: Python<'py>,
    repressors: &PyAny,
    ep_r: &PyAny,
    ka: &PyAny,
    ki: &PyAny,
    ep_ai: &PyAny,
    effector_conc: &PyAny,
    n_sites: u32,
    n_ns: f64,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let model = build_model(
        repressors,
        ep_r,
        ka,
        ki,
        ep_ai,
        quantity(effector_conc)?,
        n_sites,
        n_ns,
    )?;
    Ok(model.fold_change()?.into_pyarray(py))
}

/// Bohr parameter (k_BT).
#[pyfunction]
#[pyo3(signature = (repressors, ep_r, ka, ki, ep_ai, effector_conc, n_sites=2, n_ns=4.6e6))]
#[allow(clippy::too_many_arguments)]
fn bohr_parameter<'py>(
    py: Python<'py>,
    repressors: &PyAny,
    ep_r: &PyAny,
    ka: &PyAny,
    ki: &PyAny,
    ep_ai: &PyAny,
    effector_conc: &PyAny,
    n_sites: u32,
    n_ns: f64,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let model = build_model(
        repressors,
        ep_r,
        ka,
        ki,
        ep_ai,
        quantity(effector_conc)?,
        n_sites,
        n_ns,
    )?;
    Ok(model.bohr_parameter()?.into_pyarray(py))
}

/// Induction properties.
///
/// # Returns
/// * Dict with keys "leakiness", "saturation", "dynamic_range", "EC50",
///   "effective_hill"
#[pyfunction]
#[pyo3(signature = (repressors, ep_r, ka, ki, ep_ai, n_sites=2, n_ns=4.6e6))]
#[allow(clippy::too_many_arguments)]
fn compute_properties<'py>(
    py: Python<'py>,
    repressors: &PyAny,
    ep_r: &PyAny,
    ka: &PyAny,
    ki: &PyAny,
    ep_ai: &PyAny,
    n_sites: u32,
    n_ns: f64,
) -> PyResult<&'py PyDict> {
    let model = build_model(
        repressors,
        ep_r,
        ka,
        ki,
        ep_ai,
        Quantity::scalar(0.0),
        n_sites,
        n_ns,
    )?;
    let props = model.compute_properties()?;

    let dict = PyDict::new(py);
    dict.set_item("leakiness", props.leakiness.into_pyarray(py))?;
    dict.set_item("saturation", props.saturation.into_pyarray(py))?;
    dict.set_item("dynamic_range", props.dynamic_range.into_pyarray(py))?;
    dict.set_item("EC50", props.ec50.into_pyarray(py))?;
    dict.set_item("effective_hill", props.effective_hill.into_pyarray(py))?;
    Ok(dict)
}

/// HPD interval of a sample.
///
/// # Returns
/// * Tuple of (lower, upper)
#[pyfunction]
fn compute_hpd(samples: PyReadonlyArray1<f64>, mass: f64) -> PyResult<(f64, f64)> {
    let samples = samples.as_array().to_vec();
    let ci = hpd::compute_hpd(&samples, mass)?;
    Ok((ci.lower, ci.upper))
}

/// Column-wise HPD band of a (n_draws, n_points) matrix.
///
/// # Returns
/// * Tuple of (lower, upper) arrays of length n_points
#[pyfunction]
fn compute_hpd_columns<'py>(
    py: Python<'py>,
    draws: PyReadonlyArray2<f64>,
    mass: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let band = hpd::compute_hpd_columns(draws.as_array(), mass)?;
    Ok((band.lower.into_pyarray(py), band.upper.into_pyarray(py)))
}

/// Empirical Bohr parameter of measured fold-changes.
#[pyfunction]
fn empirical_bohr<'py>(
    py: Python<'py>,
    fold_change: PyReadonlyArray1<f64>,
) -> PyResult<&'py PyArray1<f64>> {
    let fold_change = fold_change.as_array().to_vec();
    let bohr = collapse::empirical_bohr_samples(&fold_change)?;
    Ok(PyArray1::from_vec(py, bohr))
}

/// Reference constants as a flat dict keyed by operator, strain and
/// parameter name.
#[pyfunction]
#[pyo3(signature = (path=None))]
fn load_constants(py: Python<'_>, path: Option<&str>) -> PyResult<PyObject> {
    let constants = match path {
        Some(path) => Constants::from_json_file(path)?,
        None => Constants::default(),
    };

    let dict = PyDict::new(py);
    for (operator, ep_r) in &constants.operators {
        dict.set_item(operator, ep_r)?;
    }
    for (strain, r) in &constants.repressor_copy_numbers {
        dict.set_item(strain, r)?;
    }
    dict.set_item("Ka", constants.ka)?;
    dict.set_item("Ki", constants.ki)?;
    dict.set_item("ep_AI", constants.ep_ai)?;
    dict.set_item("n_sites", constants.n_sites)?;
    dict.set_item("Nns", constants.n_ns)?;
    Ok(dict.into())
}

/// Python module definition
#[pymodule]
fn mwc_repression(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(active_probability, m)?)?;
    m.add_function(wrap_pyfunction!(fold_change, m)?)?;
    m.add_function(wrap_pyfunction!(bohr_parameter, m)?)?;
    m.add_function(wrap_pyfunction!(compute_properties, m)?)?;
    m.add_function(wrap_pyfunction!(compute_hpd, m)?)?;
    m.add_function(wrap_pyfunction!(compute_hpd_columns, m)?)?;
    m.add_function(wrap_pyfunction!(empirical_bohr, m)?)?;
    m.add_function(wrap_pyfunction!(load_constants, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::types::PyFloat;

    #[test]
    fn test_size_one_array_keeps_shape() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let array: &PyAny = PyArray1::from_vec(py, vec![2.5]);
            let q = quantity(array).unwrap();
            assert_eq!(q.shape(), &[1]);
            assert_eq!(q.as_scalar(), None);

            let float: &PyAny = PyFloat::new(py, 2.5);
            let q = quantity(float).unwrap();
            assert_eq!(q.as_scalar(), Some(2.5));

            assert!(quantity(py.None().as_ref(py)).is_err());
        });
    }
}
