//! Labeled, unit-bearing coordinate axes and grid construction
//!
//! An [`Axis`] is a monotonic 1-D coordinate sequence with a symbolic id, a
//! display name, and a length unit — the leaf primitive every sampled grid
//! and volume is built on. The free functions [`ndgrid`] / [`meshgrid`]
//! expand three axes into full 3-D coordinate grids, optionally pushing
//! every grid point through an affine transform.
//!
//! All mutating-looking operations (`rescale`) are pure: they return a new
//! `Axis` and leave the receiver untouched.

use serde::{Deserialize, Serialize};

use crate::grid::Grid3;
use crate::transform::Matrix4;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// A labeled 1-D coordinate sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Short symbolic name, e.g. `"x"` or `"lat"`
    pub id: String,
    /// Display label
    pub name: String,
    /// Length unit of `values`
    pub units: LengthUnit,
    values: Vec<f64>,
}

impl Axis {
    /// Create an axis from strictly monotonic coordinate values
    pub fn new(id: impl Into<String>, values: Vec<f64>, units: LengthUnit) -> PlanResult<Self> {
        let id = id.into();
        if values.is_empty() {
            return Err(PlanError::InvalidArgument(format!(
                "axis {:?} needs at least one value",
                id
            )));
        }
        if !is_strictly_monotonic(&values) {
            return Err(PlanError::InvalidArgument(format!(
                "axis {:?} values must be strictly monotonic",
                id
            )));
        }
        Ok(Self {
            name: id.clone(),
            id,
            units,
            values,
        })
    }

    /// Create an axis from an evenly spaced range with `n` samples
    pub fn linspace(
        id: impl Into<String>,
        start: f64,
        stop: f64,
        n: usize,
        units: LengthUnit,
    ) -> PlanResult<Self> {
        if n < 1 {
            return Err(PlanError::InvalidArgument(
                "linspace needs at least one sample".into(),
            ));
        }
        let values = if n == 1 {
            vec![start]
        } else {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n).map(|i| start + step * i as f64).collect()
        };
        Axis::new(id, values, units)
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the axis holds no samples (never, by construction)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coordinate values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at index `i`
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// `[min, max]` of the coordinate range
    pub fn extent(&self) -> [f64; 2] {
        let first = self.values[0];
        let last = self.values[self.values.len() - 1];
        if first <= last {
            [first, last]
        } else {
            [last, first]
        }
    }

    /// Mean absolute sample spacing; 0 for a single-sample axis
    pub fn spacing(&self) -> f64 {
        let n = self.values.len();
        if n < 2 {
            return 0.0;
        }
        (self.values[n - 1] - self.values[0]).abs() / (n as f64 - 1.0)
    }

    /// Return a copy expressed in `units`; a no-op copy when units already
    /// match
    pub fn rescale(&self, units: LengthUnit) -> Axis {
        if units == self.units {
            return self.clone();
        }
        let f = LengthUnit::factor(self.units, units);
        Axis {
            id: self.id.clone(),
            name: self.name.clone(),
            units,
            values: self.values.iter().map(|&v| v * f).collect(),
        }
    }

    /// Continuous (fractional) sample index of coordinate `x`.
    ///
    /// Values between samples interpolate linearly inside the enclosing
    /// cell; values beyond either end extrapolate linearly from the edge
    /// cell, so out-of-range queries yield indices `< 0` or `> len - 1`
    /// and can be detected by the caller's boundary policy.
    pub fn fractional_index(&self, x: f64) -> f64 {
        let v = &self.values;
        let n = v.len();
        if n == 1 {
            return 0.0;
        }
        let ascending = v[n - 1] >= v[0];
        let j = if ascending {
            v.partition_point(|&a| a <= x)
        } else {
            v.partition_point(|&a| a >= x)
        }
        .clamp(1, n - 1);
        let (x0, x1) = (v[j - 1], v[j]);
        (j - 1) as f64 + (x - x0) / (x1 - x0)
    }

    /// Voxel-boundary coordinates: midpoints between adjacent samples,
    /// extrapolated by half a spacing at both ends. A single-sample axis
    /// gets unit-width edges around its value.
    pub fn edges(&self) -> Vec<f64> {
        let v = &self.values;
        let n = v.len();
        if n == 1 {
            return vec![v[0] - 0.5, v[0] + 0.5];
        }
        let mut out = Vec::with_capacity(n + 1);
        out.push(v[0] - (v[1] - v[0]) / 2.0);
        for i in 1..n {
            out.push((v[i - 1] + v[i]) / 2.0);
        }
        out.push(v[n - 1] + (v[n - 1] - v[n - 2]) / 2.0);
        out
    }
}

fn is_strictly_monotonic(v: &[f64]) -> bool {
    if v.len() < 2 {
        return true;
    }
    let increasing = v[1] > v[0];
    v.windows(2).all(|w| {
        if increasing {
            w[1] > w[0]
        } else {
            w[1] < w[0]
        }
    })
}

// ---------------------------------------------------------------------------
// Grid construction
// ---------------------------------------------------------------------------

/// Expand three axes into full 3-D coordinate grids in axes order.
///
/// Output grids have shape `(len0, len1, len2)`. With a matrix, every grid
/// point is pushed through the transform and the three output grids carry
/// the transformed x/y/z components.
pub fn ndgrid(coords: &[Axis; 3], matrix: Option<&Matrix4>) -> [Grid3; 3] {
    let (n0, n1, n2) = (coords[0].len(), coords[1].len(), coords[2].len());
    let mut gx = Grid3::zeros(n0, n1, n2);
    let mut gy = Grid3::zeros(n0, n1, n2);
    let mut gz = Grid3::zeros(n0, n1, n2);
    for i in 0..n0 {
        for j in 0..n1 {
            for k in 0..n2 {
                let mut p = [coords[0].get(i), coords[1].get(j), coords[2].get(k)];
                if let Some(m) = matrix {
                    p = m.transform_point(p);
                }
                gx.set(i, j, k, p[0]);
                gy.set(i, j, k, p[1]);
                gz.set(i, j, k, p[2]);
            }
        }
    }
    [gx, gy, gz]
}

/// Like [`ndgrid`] with the first two dimensions swapped: output shape is
/// `(len1, len0, len2)`
pub fn meshgrid(coords: &[Axis; 3], matrix: Option<&Matrix4>) -> [Grid3; 3] {
    let (n0, n1, n2) = (coords[0].len(), coords[1].len(), coords[2].len());
    let mut gx = Grid3::zeros(n1, n0, n2);
    let mut gy = Grid3::zeros(n1, n0, n2);
    let mut gz = Grid3::zeros(n1, n0, n2);
    for j in 0..n1 {
        for i in 0..n0 {
            for k in 0..n2 {
                let mut p = [coords[0].get(i), coords[1].get(j), coords[2].get(k)];
                if let Some(m) = matrix {
                    p = m.transform_point(p);
                }
                gx.set(j, i, k, p[0]);
                gy.set(j, i, k, p[1]);
                gz.set(j, i, k, p[2]);
            }
        }
    }
    [gx, gy, gz]
}

/// Vectorized grid: every grid point as an `[x, y, z]` triple in row-major
/// (`k` fastest) order, optionally transformed
pub fn ndgrid_points(coords: &[Axis; 3], matrix: Option<&Matrix4>) -> Vec<[f64; 3]> {
    let mut out = Vec::with_capacity(coords[0].len() * coords[1].len() * coords[2].len());
    for i in 0..coords[0].len() {
        for j in 0..coords[1].len() {
            for k in 0..coords[2].len() {
                let mut p = [coords[0].get(i), coords[1].get(j), coords[2].get(k)];
                if let Some(m) = matrix {
                    p = m.transform_point(p);
                }
                out.push(p);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn axis(id: &str, values: &[f64]) -> Axis {
        Axis::new(id, values.to_vec(), LengthUnit::Mm).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_values() {
        assert!(Axis::new("x", vec![], LengthUnit::Mm).is_err());
        assert!(Axis::new("x", vec![0.0, 1.0, 1.0], LengthUnit::Mm).is_err());
        assert!(Axis::new("x", vec![0.0, 2.0, 1.0], LengthUnit::Mm).is_err());
        assert!(Axis::new("x", vec![2.0, 1.0, 0.0], LengthUnit::Mm).is_ok());
    }

    #[test]
    fn test_linspace() {
        let a = Axis::linspace("x", -1.0, 1.0, 5, LengthUnit::Mm).unwrap();
        assert_eq!(a.values(), &[-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_relative_eq!(a.spacing(), 0.5);
    }

    #[test]
    fn test_extent() {
        assert_eq!(axis("x", &[-2.0, 0.0, 3.0]).extent(), [-2.0, 3.0]);
        assert_eq!(axis("x", &[3.0, 0.0, -2.0]).extent(), [-2.0, 3.0]);
    }

    #[test]
    fn test_rescale_roundtrip() {
        let a = axis("x", &[-1.0, 0.0, 2.5]);
        let b = a.rescale(LengthUnit::M).rescale(LengthUnit::Mm);
        for (u, v) in a.values().iter().zip(b.values()) {
            assert_relative_eq!(u, v, epsilon = 1e-12);
        }
        assert_eq!(b.units, LengthUnit::Mm);
    }

    #[test]
    fn test_rescale_values() {
        let a = axis("x", &[1.0, 2.0]).rescale(LengthUnit::M);
        assert_relative_eq!(a.values()[0], 1e-3);
        assert_relative_eq!(a.values()[1], 2e-3);
    }

    #[test]
    fn test_fractional_index_interior() {
        let a = axis("x", &[0.0, 1.0, 3.0]);
        assert_relative_eq!(a.fractional_index(0.0), 0.0);
        assert_relative_eq!(a.fractional_index(0.5), 0.5);
        assert_relative_eq!(a.fractional_index(2.0), 1.5);
        assert_relative_eq!(a.fractional_index(3.0), 2.0);
    }

    #[test]
    fn test_fractional_index_out_of_range() {
        let a = axis("x", &[0.0, 1.0, 2.0]);
        assert!(a.fractional_index(-0.5) < 0.0);
        assert!(a.fractional_index(2.5) > 2.0);
    }

    #[test]
    fn test_fractional_index_descending() {
        let a = axis("z", &[2.0, 1.0, 0.0]);
        assert_relative_eq!(a.fractional_index(2.0), 0.0);
        assert_relative_eq!(a.fractional_index(1.5), 0.5);
        assert_relative_eq!(a.fractional_index(0.0), 2.0);
    }

    #[test]
    fn test_edges() {
        let a = axis("x", &[0.0, 1.0, 2.0]);
        assert_eq!(a.edges(), vec![-0.5, 0.5, 1.5, 2.5]);
        let single = axis("x", &[4.0]);
        assert_eq!(single.edges(), vec![3.5, 4.5]);
    }

    #[test]
    fn test_ndgrid_values() {
        let coords = [
            axis("x", &[0.0, 1.0]),
            axis("y", &[10.0, 20.0, 30.0]),
            axis("z", &[5.0]),
        ];
        let [gx, gy, gz] = ndgrid(&coords, None);
        assert_eq!(gx.dims(), (2, 3, 1));
        assert_eq!(gx.get(1, 2, 0), 1.0);
        assert_eq!(gy.get(1, 2, 0), 30.0);
        assert_eq!(gz.get(0, 0, 0), 5.0);
    }

    #[test]
    fn test_meshgrid_swaps_first_dims() {
        let coords = [
            axis("x", &[0.0, 1.0]),
            axis("y", &[10.0, 20.0, 30.0]),
            axis("z", &[5.0]),
        ];
        let [gx, gy, _] = meshgrid(&coords, None);
        assert_eq!(gx.dims(), (3, 2, 1));
        assert_eq!(gx.get(2, 1, 0), 1.0);
        assert_eq!(gy.get(2, 1, 0), 30.0);
    }

    #[test]
    fn test_ndgrid_with_transform() {
        let coords = [
            axis("x", &[1.0]),
            axis("y", &[0.0]),
            axis("z", &[0.0]),
        ];
        let m = Matrix4::rot_z(PI / 2.0);
        let [gx, gy, gz] = ndgrid(&coords, Some(&m));
        assert_relative_eq!(gx.get(0, 0, 0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(gy.get(0, 0, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(gz.get(0, 0, 0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ndgrid_points_order() {
        let coords = [
            axis("x", &[0.0, 1.0]),
            axis("y", &[0.0, 1.0]),
            axis("z", &[0.0]),
        ];
        let pts = ndgrid_points(&coords, None);
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[0], [0.0, 0.0, 0.0]);
        assert_eq!(pts[1], [0.0, 1.0, 0.0]);
        assert_eq!(pts[3], [1.0, 1.0, 0.0]);
    }
}
