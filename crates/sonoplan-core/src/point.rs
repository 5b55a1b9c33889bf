//! Target points
//!
//! A [`Point`] holds one or more colocated 3-D positions sharing a single
//! frame and unit — a focal pattern's sub-foci, for example, live in one
//! `Point` with N positions. Points have value semantics: operations
//! return new points and never alias the input.

use serde::{Deserialize, Serialize};

use crate::transform::Matrix4;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// One or more positions in a shared frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Short symbolic identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional RGB display color, each channel in `[0, 1]`
    pub color: Option<[f64; 3]>,
    /// Display radius, in `units`
    pub radius: f64,
    /// Axis-id labels for the three position rows
    pub dims: [String; 3],
    /// Length unit of all positions
    pub units: LengthUnit,
    positions: Vec<[f64; 3]>,
}

impl Point {
    /// A single-position point
    pub fn new(id: impl Into<String>, position: [f64; 3], units: LengthUnit) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            color: None,
            radius: 1.0,
            dims: ["x".into(), "y".into(), "z".into()],
            units,
            positions: vec![position],
        }
    }

    /// A point holding several colocated positions; fails on an empty set
    pub fn with_positions(
        id: impl Into<String>,
        positions: Vec<[f64; 3]>,
        units: LengthUnit,
    ) -> PlanResult<Self> {
        if positions.is_empty() {
            return Err(PlanError::InvalidArgument(
                "point needs at least one position".into(),
            ));
        }
        let mut p = Self::new(id, positions[0], units);
        p.positions = positions;
        Ok(p)
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// First (primary) position
    pub fn position(&self) -> [f64; 3] {
        self.positions[0]
    }

    /// All positions
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Number of colocated positions
    pub fn num_points(&self) -> usize {
        self.positions.len()
    }

    /// Copy expressed in `units`; positions and radius are scaled
    pub fn rescale(&self, units: LengthUnit) -> Point {
        if units == self.units {
            return self.clone();
        }
        let f = LengthUnit::factor(self.units, units);
        let mut out = self.clone();
        out.units = units;
        out.radius *= f;
        for p in &mut out.positions {
            *p = [p[0] * f, p[1] * f, p[2] * f];
        }
        out
    }

    /// Copy with every position shifted by `offset`
    pub fn translated(&self, offset: [f64; 3]) -> Point {
        let mut out = self.clone();
        for p in &mut out.positions {
            *p = [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]];
        }
        out
    }

    /// Copy with every position mapped through a transform
    pub fn transformed(&self, matrix: &Matrix4) -> Point {
        let mut out = self.clone();
        for p in &mut out.positions {
            *p = matrix.transform_point(*p);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_new_defaults() {
        let p = Point::new("focus", [0.0, 0.0, 50.0], LengthUnit::Mm);
        assert_eq!(p.name, "focus");
        assert_eq!(p.position(), [0.0, 0.0, 50.0]);
        assert_eq!(p.num_points(), 1);
        assert_eq!(p.dims, ["x", "y", "z"]);
    }

    #[test]
    fn test_with_positions_rejects_empty() {
        assert!(Point::with_positions("p", vec![], LengthUnit::Mm).is_err());
    }

    #[test]
    fn test_rescale_scales_positions_and_radius() {
        let p = Point::new("p", [1.0, 2.0, 3.0], LengthUnit::Mm);
        let q = p.rescale(LengthUnit::M);
        assert_relative_eq!(q.position()[0], 1e-3);
        assert_relative_eq!(q.position()[2], 3e-3);
        assert_relative_eq!(q.radius, 1e-3);
        // original untouched
        assert_eq!(p.position(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_transformed_does_not_alias() {
        let p = Point::new("p", [1.0, 0.0, 0.0], LengthUnit::Mm);
        let q = p.transformed(&Matrix4::rot_z(PI / 2.0));
        assert_relative_eq!(q.position()[1], 1.0, epsilon = 1e-12);
        assert_eq!(p.position(), [1.0, 0.0, 0.0]);
    }
}
