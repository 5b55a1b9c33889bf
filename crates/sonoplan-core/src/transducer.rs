//! Transducer arrays
//!
//! A [`Transducer`] owns an ordered set of [`Element`]s expressed in the
//! array's local frame, plus a placement matrix mapping that local frame
//! into the scene. Multiple arrays can be merged into one by re-expressing
//! every element in a shared reference frame.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::{matrix2xyz, Element};
use crate::transform::Matrix4;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// Which frame a merge re-expresses elements in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeReference {
    /// The first array's placement frame
    First,
    /// The entry-wise average of all placement frames, with the averaged
    /// basis re-orthonormalized
    Average,
}

/// A transducer array with a scene placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transducer {
    /// Short symbolic identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Elements in the array's local frame
    pub elements: Vec<Element>,
    /// Drive frequency, Hz
    pub frequency: f64,
    /// Length unit of element positions and the matrix translation
    pub units: LengthUnit,
    /// Local-to-scene placement transform
    pub matrix: Matrix4,
    /// Free-form annotations
    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

impl Transducer {
    /// Create an array from elements, harmonizing element units to the
    /// array's
    pub fn new(
        id: impl Into<String>,
        elements: Vec<Element>,
        frequency: f64,
        units: LengthUnit,
    ) -> PlanResult<Self> {
        if frequency <= 0.0 {
            return Err(PlanError::InvalidArgument(
                "transducer frequency must be positive".into(),
            ));
        }
        let id = id.into();
        let elements = elements.into_iter().map(|e| e.rescale(units)).collect();
        Ok(Self {
            name: id.clone(),
            id,
            elements,
            frequency,
            units,
            matrix: Matrix4::identity(),
            attrs: HashMap::new(),
        })
    }

    /// Override the placement matrix
    pub fn with_matrix(mut self, matrix: Matrix4) -> Self {
        self.matrix = matrix;
        self
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of elements
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Scene-frame matrix of element `i`: placement composed with the
    /// element's local frame
    pub fn element_matrix(&self, i: usize) -> PlanResult<Matrix4> {
        let e = self.elements.get(i).ok_or_else(|| {
            PlanError::InvalidArgument(format!(
                "element index {} out of range ({} elements)",
                i,
                self.elements.len()
            ))
        })?;
        Ok(self.matrix.mul(&e.matrix()))
    }

    /// Scene-frame positions of all elements
    pub fn element_positions(&self) -> Vec<[f64; 3]> {
        self.elements
            .iter()
            .map(|e| self.matrix.transform_point(e.position()))
            .collect()
    }

    /// Copy expressed in `units`: elements rescaled, matrix translation
    /// scaled by the conversion factor
    pub fn rescale(&self, units: LengthUnit) -> Transducer {
        if units == self.units {
            return self.clone();
        }
        let f = LengthUnit::factor(self.units, units);
        let mut out = self.clone();
        out.units = units;
        out.elements = self.elements.iter().map(|e| e.rescale(units)).collect();
        let t = self.matrix.translation_part();
        out.matrix.set_translation([t[0] * f, t[1] * f, t[2] * f]);
        out
    }

    /// Merge several arrays into one by re-expressing every element in a
    /// common reference frame. Element order follows the input order;
    /// indices are reassigned sequentially.
    pub fn merge(xdcs: &[Transducer], reference: MergeReference) -> PlanResult<Transducer> {
        let first = xdcs.first().ok_or_else(|| {
            PlanError::InvalidArgument("merge needs at least one transducer".into())
        })?;
        let units = first.units;
        let rescaled: Vec<Transducer> = xdcs.iter().map(|x| x.rescale(units)).collect();

        if rescaled.iter().any(|x| x.frequency != first.frequency) {
            tracing::warn!(
                frequency = first.frequency,
                "merging transducers with differing frequencies; keeping the first"
            );
        }

        let ref_matrix = match reference {
            MergeReference::First => rescaled[0].matrix,
            MergeReference::Average => {
                let mut acc = [[0.0; 4]; 4];
                for x in &rescaled {
                    for (r, row) in acc.iter_mut().enumerate() {
                        for (c, v) in row.iter_mut().enumerate() {
                            *v += x.matrix.m[r][c];
                        }
                    }
                }
                let n = rescaled.len() as f64;
                for row in acc.iter_mut() {
                    for v in row.iter_mut() {
                        *v /= n;
                    }
                }
                // An averaged basis is generally not a valid frame until
                // re-orthonormalized.
                Matrix4::from_rows(acc).orthonormalized()?
            }
        };
        let ref_inv = ref_matrix.invert()?;

        let mut elements = Vec::new();
        for x in &rescaled {
            for e in &x.elements {
                let local = ref_inv.mul(&x.matrix).mul(&e.matrix());
                let (px, py, pz, az, el, roll) = matrix2xyz(&local);
                let mut merged = e.clone();
                merged.index = elements.len();
                merged.x = px;
                merged.y = py;
                merged.z = pz;
                merged.az = az;
                merged.el = el;
                merged.roll = roll;
                elements.push(merged);
            }
        }

        let id = format!("{}_merged", first.id);
        let mut out = Transducer::new(id, elements, first.frequency, units)?;
        out.matrix = ref_matrix;
        out.name = format!("{} (merged)", first.name);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn linear_array(id: &str, n: usize, pitch: f64) -> Transducer {
        let offset = (n as f64 - 1.0) / 2.0 * pitch;
        let elements = (0..n)
            .map(|i| {
                Element::new(
                    i,
                    [i as f64 * pitch - offset, 0.0, 0.0],
                    [0.0; 3],
                    LengthUnit::Mm,
                )
            })
            .collect();
        Transducer::new(id, elements, 1.0e6, LengthUnit::Mm).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_frequency() {
        assert!(Transducer::new("t", vec![], 0.0, LengthUnit::Mm).is_err());
    }

    #[test]
    fn test_element_positions_identity_placement() {
        let t = linear_array("t", 4, 0.3);
        let pos = t.element_positions();
        assert_eq!(pos.len(), 4);
        assert_relative_eq!(pos[0][0] + pos[3][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(pos[1][0] - pos[0][0], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_element_positions_with_placement() {
        let t = linear_array("t", 2, 1.0)
            .with_matrix(Matrix4::translation([0.0, 0.0, 10.0]));
        let pos = t.element_positions();
        assert_relative_eq!(pos[0][2], 10.0);
        assert_relative_eq!(pos[1][2], 10.0);
    }

    #[test]
    fn test_element_matrix_out_of_range() {
        let t = linear_array("t", 2, 1.0);
        assert!(t.element_matrix(5).is_err());
    }

    #[test]
    fn test_rescale_scales_matrix_translation() {
        let t = linear_array("t", 2, 1.0)
            .with_matrix(Matrix4::translation([0.0, 0.0, 10.0]));
        let r = t.rescale(LengthUnit::M);
        assert_relative_eq!(r.matrix.translation_part()[2], 0.01);
        assert_relative_eq!(r.elements[0].x, -0.5e-3);
    }

    #[test]
    fn test_merge_first_preserves_world_positions() {
        let a = linear_array("a", 2, 1.0);
        let b = linear_array("b", 2, 1.0)
            .with_matrix(Matrix4::translation([0.0, 5.0, 0.0]));
        let world_before: Vec<[f64; 3]> = a
            .element_positions()
            .into_iter()
            .chain(b.element_positions())
            .collect();

        let merged = Transducer::merge(&[a, b], MergeReference::First).unwrap();
        assert_eq!(merged.num_elements(), 4);
        let world_after = merged.element_positions();
        for (p, q) in world_before.iter().zip(world_after.iter()) {
            for d in 0..3 {
                assert_relative_eq!(p[d], q[d], epsilon = 1e-10);
            }
        }
        // indices reassigned sequentially
        let idx: Vec<usize> = merged.elements.iter().map(|e| e.index).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_merge_average_frame_is_orthonormal() {
        let a = linear_array("a", 2, 1.0).with_matrix(Matrix4::rot_z(0.2));
        let b = linear_array("b", 2, 1.0).with_matrix(Matrix4::rot_z(-0.6));
        let merged = Transducer::merge(&[a, b], MergeReference::Average).unwrap();
        let m = merged.matrix;
        for i in 0..3 {
            assert_relative_eq!(crate::transform::norm(m.column(i)), 1.0, epsilon = 1e-10);
            for j in (i + 1)..3 {
                assert_relative_eq!(
                    crate::transform::dot(m.column(i), m.column(j)),
                    0.0,
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn test_merge_average_preserves_world_positions() {
        let a = linear_array("a", 3, 0.5).with_matrix(Matrix4::rot_y(PI / 8.0));
        let b = linear_array("b", 3, 0.5)
            .with_matrix(Matrix4::rot_y(-PI / 8.0).mul(&Matrix4::translation([1.0, 0.0, 0.0])));
        let world_before: Vec<[f64; 3]> = a
            .element_positions()
            .into_iter()
            .chain(b.element_positions())
            .collect();
        let merged = Transducer::merge(&[a, b], MergeReference::Average).unwrap();
        let world_after = merged.element_positions();
        for (p, q) in world_before.iter().zip(world_after.iter()) {
            for d in 0..3 {
                assert_relative_eq!(p[d], q[d], epsilon = 1e-9);
            }
        }
    }
}
