//! Dense 3-D sample grids
//!
//! [`Grid3`] is a rank-3 dense tensor of `f64` stored row-major in a flat
//! vector; [`Mask3`] is the boolean counterpart used for focus masks. Both
//! have compile-time-known rank: shapes are a `(n0, n1, n2)` triple, never
//! a dynamically-shaped nest of arrays.

use serde::{Deserialize, Serialize};

use crate::types::{PlanError, PlanResult};

/// A dense 3-D tensor of `f64`, row-major (`k` fastest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid3 {
    dims: (usize, usize, usize),
    data: Vec<f64>,
}

impl Grid3 {
    /// All-zero grid
    pub fn zeros(n0: usize, n1: usize, n2: usize) -> Self {
        Self {
            dims: (n0, n1, n2),
            data: vec![0.0; n0 * n1 * n2],
        }
    }

    /// Grid filled with a constant
    pub fn filled(n0: usize, n1: usize, n2: usize, value: f64) -> Self {
        Self {
            dims: (n0, n1, n2),
            data: vec![value; n0 * n1 * n2],
        }
    }

    /// Wrap an existing flat buffer; fails when the length does not match
    pub fn from_vec(dims: (usize, usize, usize), data: Vec<f64>) -> PlanResult<Self> {
        let expected = dims.0 * dims.1 * dims.2;
        if data.len() != expected {
            return Err(PlanError::DimensionMismatch(format!(
                "grid data has {} samples, dims {:?} require {}",
                data.len(),
                dims,
                expected
            )));
        }
        Ok(Self { dims, data })
    }

    /// Build element-wise from an index function
    pub fn from_fn(
        n0: usize,
        n1: usize,
        n2: usize,
        mut f: impl FnMut(usize, usize, usize) -> f64,
    ) -> Self {
        let mut g = Self::zeros(n0, n1, n2);
        for i in 0..n0 {
            for j in 0..n1 {
                for k in 0..n2 {
                    g.data[(i * n1 + j) * n2 + k] = f(i, j, k);
                }
            }
        }
        g
    }

    /// Shape triple
    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the grid holds no samples
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims.1 + j) * self.dims.2 + k
    }

    /// Sample at `(i, j, k)`
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.idx(i, j, k)]
    }

    /// Set sample at `(i, j, k)`
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = self.idx(i, j, k);
        self.data[idx] = value;
    }

    /// Flat view of the samples
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat view
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Element-wise map into a new grid
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Grid3 {
        Grid3 {
            dims: self.dims,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Largest finite sample, or NaN when none exists
    pub fn max_finite(&self) -> f64 {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::NAN, f64::max)
    }
}

/// A dense 3-D boolean field with the same layout as [`Grid3`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask3 {
    dims: (usize, usize, usize),
    data: Vec<bool>,
}

impl Mask3 {
    /// All-false mask
    pub fn falses(n0: usize, n1: usize, n2: usize) -> Self {
        Self {
            dims: (n0, n1, n2),
            data: vec![false; n0 * n1 * n2],
        }
    }

    /// Build element-wise from an index predicate
    pub fn from_fn(
        n0: usize,
        n1: usize,
        n2: usize,
        mut f: impl FnMut(usize, usize, usize) -> bool,
    ) -> Self {
        let mut m = Self::falses(n0, n1, n2);
        for i in 0..n0 {
            for j in 0..n1 {
                for k in 0..n2 {
                    m.data[(i * n1 + j) * n2 + k] = f(i, j, k);
                }
            }
        }
        m
    }

    /// Shape triple
    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    #[inline]
    fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims.1 + j) * self.dims.2 + k
    }

    /// Value at `(i, j, k)`
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> bool {
        self.data[self.idx(i, j, k)]
    }

    /// Set value at `(i, j, k)`
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: bool) {
        let idx = self.idx(i, j, k);
        self.data[idx] = value;
    }

    /// Flat view
    pub fn data(&self) -> &[bool] {
        &self.data
    }

    /// Number of true entries
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Element-wise OR with another mask of the same shape
    pub fn or_assign(&mut self, other: &Mask3) -> PlanResult<()> {
        self.check_dims(other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a |= *b;
        }
        Ok(())
    }

    /// Element-wise AND with another mask of the same shape
    pub fn and_assign(&mut self, other: &Mask3) -> PlanResult<()> {
        self.check_dims(other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a &= *b;
        }
        Ok(())
    }

    fn check_dims(&self, other: &Mask3) -> PlanResult<()> {
        if self.dims != other.dims {
            return Err(PlanError::DimensionMismatch(format!(
                "mask dims {:?} vs {:?}",
                self.dims, other.dims
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indexing() {
        let mut g = Grid3::zeros(2, 3, 4);
        assert_eq!(g.dims(), (2, 3, 4));
        assert_eq!(g.len(), 24);
        g.set(1, 2, 3, 7.5);
        assert_eq!(g.get(1, 2, 3), 7.5);
        assert_eq!(g.data()[23], 7.5);
    }

    #[test]
    fn test_grid_from_vec_shape_check() {
        let err = Grid3::from_vec((2, 2, 2), vec![0.0; 7]).unwrap_err();
        assert!(matches!(err, PlanError::DimensionMismatch(_)));
        assert!(Grid3::from_vec((2, 2, 2), vec![0.0; 8]).is_ok());
    }

    #[test]
    fn test_grid_from_fn() {
        let g = Grid3::from_fn(2, 2, 2, |i, j, k| (i * 4 + j * 2 + k) as f64);
        assert_eq!(g.get(0, 0, 0), 0.0);
        assert_eq!(g.get(1, 1, 1), 7.0);
    }

    #[test]
    fn test_grid_max_finite() {
        let g = Grid3::from_vec((1, 1, 3), vec![1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(g.max_finite(), 3.0);
        let empty = Grid3::zeros(0, 0, 0);
        assert!(empty.max_finite().is_nan());
    }

    #[test]
    fn test_mask_ops() {
        let mut a = Mask3::from_fn(2, 2, 1, |i, _, _| i == 0);
        let b = Mask3::from_fn(2, 2, 1, |_, j, _| j == 0);
        a.or_assign(&b).unwrap();
        assert_eq!(a.count_true(), 3);
        a.and_assign(&b).unwrap();
        assert_eq!(a.count_true(), 2);
    }

    #[test]
    fn test_mask_dims_mismatch() {
        let mut a = Mask3::falses(2, 2, 2);
        let b = Mask3::falses(2, 2, 3);
        assert!(a.or_assign(&b).is_err());
    }
}
