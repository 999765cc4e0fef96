//! Scalar-or-array model inputs with numpy-style broadcasting.
//!
//! Every input to the model is stored as an n-dimensional array; a scalar is
//! the 0-d array. Shapes combine the way numpy combines them: right-aligned,
//! each axis equal or 1.

use ndarray::{arr0, Array1, Array2, ArrayD, ArrayViewD, IxDyn};

use crate::error::{Error, Result};

/// A scalar or an array of `f64` values.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity(ArrayD<f64>);

impl Quantity {
    pub fn scalar(value: f64) -> Self {
        Self(arr0(value).into_dyn())
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn is_scalar(&self) -> bool {
        self.0.ndim() == 0
    }

    /// The value of a 0-d quantity, `None` for arrays.
    pub fn as_scalar(&self) -> Option<f64> {
        if self.is_scalar() {
            self.0.iter().next().copied()
        } else {
            None
        }
    }

    pub fn view(&self) -> ArrayViewD<'_, f64> {
        self.0.view()
    }

    pub fn into_inner(self) -> ArrayD<f64> {
        self.0
    }

    /// View this quantity with the given (already broadcast-compatible) shape.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<ArrayViewD<'_, f64>> {
        self.0
            .broadcast(IxDyn(shape))
            .ok_or_else(|| Error::ShapeMismatch {
                left: shape.to_vec(),
                right: self.shape().to_vec(),
            })
    }

    /// Fail with `InvalidParameter` on the first element rejected by `valid`.
    pub(crate) fn require(
        &self,
        name: &'static str,
        reason: &'static str,
        valid: impl Fn(f64) -> bool,
    ) -> Result<()> {
        match self.0.iter().find(|&&v| !valid(v)) {
            Some(&value) => Err(Error::InvalidParameter { name, value, reason }),
            None => Ok(()),
        }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}

impl From<Vec<f64>> for Quantity {
    fn from(values: Vec<f64>) -> Self {
        Self(Array1::from(values).into_dyn())
    }
}

impl From<&[f64]> for Quantity {
    fn from(values: &[f64]) -> Self {
        Self(Array1::from(values.to_vec()).into_dyn())
    }
}

impl From<Array1<f64>> for Quantity {
    fn from(values: Array1<f64>) -> Self {
        Self(values.into_dyn())
    }
}

impl From<Array2<f64>> for Quantity {
    fn from(values: Array2<f64>) -> Self {
        Self(values.into_dyn())
    }
}

impl From<ArrayD<f64>> for Quantity {
    fn from(values: ArrayD<f64>) -> Self {
        Self(values)
    }
}

/// Broadcast two shapes together.
fn broadcast_pair(left: &[usize], right: &[usize]) -> Result<Vec<usize>> {
    let ndim = left.len().max(right.len());
    let mut shape = vec![1; ndim];

    for axis in 0..ndim {
        // Axes are aligned from the right; missing leading axes act as 1.
        let l = if axis < left.len() { left[left.len() - 1 - axis] } else { 1 };
        let r = if axis < right.len() { right[right.len() - 1 - axis] } else { 1 };

        shape[ndim - 1 - axis] = match (l, r) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(Error::ShapeMismatch {
                    left: left.to_vec(),
                    right: right.to_vec(),
                })
            }
        };
    }

    Ok(shape)
}

/// Compute the common broadcast shape of a set of quantities.
///
/// An empty set broadcasts to the scalar shape `[]`.
pub fn broadcast_shape<'a, I>(quantities: I) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = &'a Quantity>,
{
    quantities
        .into_iter()
        .try_fold(Vec::new(), |acc, q| broadcast_pair(&acc, q.shape()))
}
