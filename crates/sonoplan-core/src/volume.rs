//! Volumetric fields and affine resampling
//!
//! A [`Volume`] is a dense 3-D field sampled over three [`Axis`] objects,
//! with a local-to-scene placement matrix. Resampling onto a new grid goes
//! through [`Volume::transform`]: every destination grid point is mapped
//! into the source volume's local frame and the source data interpolated
//! there. The source volume is never mutated — a transform always yields a
//! new owned `Volume`.
//!
//! Every interpolation query carries an explicit [`OutOfBounds`] policy;
//! there is no implicit extrapolation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::axis::{self, Axis};
use crate::grid::Grid3;
use crate::transform::Matrix4;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// Interpolation kernel for volume sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpMethod {
    /// Nearest-neighbor lookup
    Nearest,
    /// Trilinear interpolation
    Linear,
    /// Separable Catmull-Rom on a 4x4x4 neighborhood, in index space
    Cubic,
    /// Alias of `Cubic` (kept for method-name compatibility)
    Spline,
}

impl Default for InterpMethod {
    fn default() -> Self {
        InterpMethod::Linear
    }
}

/// Boundary policy for queries outside the sampled extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfBounds {
    /// Clamp the query to the nearest edge sample
    Clamp,
    /// Return the given fill value (commonly NaN)
    Fill(f64),
}

/// Tolerance for treating a query as on-grid at the extent boundary
const EDGE_EPS: f64 = 1e-9;

/// A 3-D sampled field over three axes with a scene placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Short symbolic identifier
    pub id: String,
    /// Display name
    pub name: String,
    data: Grid3,
    coords: [Axis; 3],
    /// Local-to-scene placement transform
    pub matrix: Matrix4,
    /// Free-form annotations
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    /// Length unit shared by all three axes
    pub units: LengthUnit,
}

impl Volume {
    /// Create a volume; fails when the data shape does not match the axis
    /// lengths. Axis units are harmonized to the first axis's unit.
    pub fn new(
        id: impl Into<String>,
        data: Grid3,
        coords: [Axis; 3],
        matrix: Matrix4,
    ) -> PlanResult<Self> {
        let dims = data.dims();
        let expected = (coords[0].len(), coords[1].len(), coords[2].len());
        if dims != expected {
            return Err(PlanError::DimensionMismatch(format!(
                "volume data dims {:?} do not match axis lengths {:?}",
                dims, expected
            )));
        }
        let units = coords[0].units;
        let coords = [
            coords[0].clone(),
            coords[1].rescale(units),
            coords[2].rescale(units),
        ];
        let id = id.into();
        Ok(Self {
            name: id.clone(),
            id,
            data,
            coords,
            matrix,
            attrs: HashMap::new(),
            units,
        })
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Shape triple
    pub fn dims(&self) -> (usize, usize, usize) {
        self.data.dims()
    }

    /// Sampled data
    pub fn data(&self) -> &Grid3 {
        &self.data
    }

    /// The three coordinate axes
    pub fn coords(&self) -> &[Axis; 3] {
        &self.coords
    }

    /// Axis for dimension `d`
    pub fn axis(&self, d: usize) -> &Axis {
        &self.coords[d]
    }

    /// Sample at integer indices
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data.get(i, j, k)
    }

    /// Copy expressed in `units`: axes rescaled, matrix translation scaled
    pub fn rescale(&self, units: LengthUnit) -> Volume {
        if units == self.units {
            return self.clone();
        }
        let f = LengthUnit::factor(self.units, units);
        let mut out = self.clone();
        out.units = units;
        out.coords = [
            self.coords[0].rescale(units),
            self.coords[1].rescale(units),
            self.coords[2].rescale(units),
        ];
        let t = self.matrix.translation_part();
        out.matrix.set_translation([t[0] * f, t[1] * f, t[2] * f]);
        out
    }

    /// Interpolate the field at a point given in the volume's local frame
    /// (same units as the axes)
    pub fn interp(&self, p: [f64; 3], method: InterpMethod, oob: OutOfBounds) -> f64 {
        let (n0, n1, n2) = self.dims();
        let n = [n0, n1, n2];
        let mut fi = [0.0; 3];
        for d in 0..3 {
            fi[d] = self.coords[d].fractional_index(p[d]);
            let hi = (n[d] - 1) as f64;
            if fi[d] < -EDGE_EPS || fi[d] > hi + EDGE_EPS {
                match oob {
                    OutOfBounds::Fill(v) => return v,
                    OutOfBounds::Clamp => fi[d] = fi[d].clamp(0.0, hi),
                }
            } else {
                fi[d] = fi[d].clamp(0.0, hi);
            }
        }
        match method {
            InterpMethod::Nearest => {
                let i = fi[0].round() as usize;
                let j = fi[1].round() as usize;
                let k = fi[2].round() as usize;
                self.data.get(i, j, k)
            }
            InterpMethod::Linear => self.interp_linear(fi),
            InterpMethod::Cubic | InterpMethod::Spline => self.interp_cubic(fi),
        }
    }

    fn interp_linear(&self, fi: [f64; 3]) -> f64 {
        let (n0, n1, n2) = self.dims();
        let n = [n0, n1, n2];
        let mut i0 = [0usize; 3];
        let mut t = [0.0; 3];
        for d in 0..3 {
            if n[d] == 1 {
                i0[d] = 0;
                t[d] = 0.0;
            } else {
                let f = fi[d].floor().min((n[d] - 2) as f64).max(0.0);
                i0[d] = f as usize;
                t[d] = fi[d] - f;
            }
        }
        let mut acc = 0.0;
        for di in 0..2 {
            for dj in 0..2 {
                for dk in 0..2 {
                    let w = weight1(t[0], di) * weight1(t[1], dj) * weight1(t[2], dk);
                    if w == 0.0 {
                        continue;
                    }
                    let i = (i0[0] + di).min(n[0] - 1);
                    let j = (i0[1] + dj).min(n[1] - 1);
                    let k = (i0[2] + dk).min(n[2] - 1);
                    acc += w * self.data.get(i, j, k);
                }
            }
        }
        acc
    }

    fn interp_cubic(&self, fi: [f64; 3]) -> f64 {
        let (n0, n1, n2) = self.dims();
        let n = [n0, n1, n2];
        let mut base = [0isize; 3];
        let mut w = [[0.0; 4]; 3];
        for d in 0..3 {
            let f = fi[d].floor();
            base[d] = f as isize - 1;
            w[d] = catmull_rom_weights(fi[d] - f);
        }
        let mut acc = 0.0;
        for (a, wa) in w[0].iter().enumerate() {
            for (b, wb) in w[1].iter().enumerate() {
                for (c, wc) in w[2].iter().enumerate() {
                    let weight = wa * wb * wc;
                    if weight == 0.0 {
                        continue;
                    }
                    let i = clamp_index(base[0] + a as isize, n[0]);
                    let j = clamp_index(base[1] + b as isize, n[1]);
                    let k = clamp_index(base[2] + c as isize, n[2]);
                    acc += weight * self.data.get(i, j, k);
                }
            }
        }
        acc
    }

    /// Resample onto a destination grid.
    ///
    /// `matrix` maps the destination grid's local coordinates into the
    /// scene frame. For every destination grid point the source-local
    /// location is `source.matrix⁻¹ · matrix · p` (falling back to the
    /// pseudo-inverse when the placement has no true inverse) and the
    /// source data is interpolated there. Returns a new volume with
    /// `coords = target_coords` (harmonized to the source's units) and the
    /// given placement; the source is left untouched.
    pub fn transform(
        &self,
        target_coords: &[Axis; 3],
        matrix: &Matrix4,
        method: InterpMethod,
        oob: OutOfBounds,
    ) -> PlanResult<Volume> {
        let tc = [
            target_coords[0].rescale(self.units),
            target_coords[1].rescale(self.units),
            target_coords[2].rescale(self.units),
        ];
        let src_inv = match self.matrix.invert() {
            Ok(inv) => inv,
            Err(_) => self.matrix.pseudo_invert()?,
        };
        let combined = src_inv.mul(matrix);

        let (n0, n1, n2) = (tc[0].len(), tc[1].len(), tc[2].len());
        let mut out = Grid3::zeros(n0, n1, n2);
        for i in 0..n0 {
            let x = tc[0].get(i);
            for j in 0..n1 {
                let y = tc[1].get(j);
                for k in 0..n2 {
                    let p = combined.transform_point([x, y, tc[2].get(k)]);
                    out.set(i, j, k, self.interp(p, method, oob));
                }
            }
        }

        let mut vol = Volume::new(self.id.clone(), out, tc, *matrix)?;
        vol.name = self.name.clone();
        vol.attrs = self.attrs.clone();
        Ok(vol)
    }

    /// Voxel-boundary coordinates per axis (midpoints between samples,
    /// extrapolated half a spacing at the ends)
    pub fn edges(&self) -> [Vec<f64>; 3] {
        [
            self.coords[0].edges(),
            self.coords[1].edges(),
            self.coords[2].edges(),
        ]
    }

    /// Full grids of voxel-corner coordinates, optionally mapped through a
    /// transform (the volume's own placement, typically)
    pub fn edge_grid(&self, matrix: Option<&Matrix4>) -> PlanResult<[Grid3; 3]> {
        let e = self.edges();
        let coords = [
            Axis::new(self.coords[0].id.clone(), e[0].clone(), self.units)?,
            Axis::new(self.coords[1].id.clone(), e[1].clone(), self.units)?,
            Axis::new(self.coords[2].id.clone(), e[2].clone(), self.units)?,
        ];
        Ok(axis::ndgrid(&coords, matrix))
    }
}

#[inline]
fn weight1(t: f64, side: usize) -> f64 {
    if side == 0 {
        1.0 - t
    } else {
        t
    }
}

#[inline]
fn clamp_index(i: isize, n: usize) -> usize {
    i.clamp(0, n as isize - 1) as usize
}

/// Catmull-Rom basis weights for the four nodes around parameter `t` in
/// `[0, 1)`
fn catmull_rom_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        -0.5 * t3 + t2 - 0.5 * t,
        1.5 * t3 - 2.5 * t2 + 1.0,
        -1.5 * t3 + 2.0 * t2 + 0.5 * t,
        0.5 * t3 - 0.5 * t2,
    ]
}
