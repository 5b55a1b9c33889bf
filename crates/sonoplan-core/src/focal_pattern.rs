//! Focal patterns
//!
//! Expands one nominal target into the ordered set of steered sub-foci a
//! treatment actually sonicates: either the target itself, or a radial
//! "wheel" of evenly spaced spokes around it in the array's x/y plane at
//! the target depth.
//!
//! The family is a closed tagged union; serialization writes the variant
//! into a `class` discriminator field.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::point::Point;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// A steering pattern expanding one nominal focus into N sub-foci
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum FocalPattern {
    /// Sonicate the nominal target only
    SinglePoint,
    /// A radial wheel of spokes around the target
    Wheel {
        /// Include the nominal target itself as a focus
        center: bool,
        /// Number of spokes, evenly spaced in azimuth
        num_spokes: usize,
        /// Radial offset of each spoke, in `units`
        spoke_radius: f64,
        /// Unit of `spoke_radius`
        units: LengthUnit,
    },
}

impl Default for FocalPattern {
    fn default() -> Self {
        FocalPattern::SinglePoint
    }
}

impl FocalPattern {
    /// Number of foci this pattern produces
    pub fn num_foci(&self) -> usize {
        match self {
            FocalPattern::SinglePoint => 1,
            FocalPattern::Wheel {
                center, num_spokes, ..
            } => num_spokes + usize::from(*center),
        }
    }

    /// Expand `target` into the ordered focus list.
    ///
    /// Wheel spokes come first at angles `2πk / num_spokes` for
    /// `k = 0..num_spokes`, offset in the target frame's x/y plane; the
    /// center point, when requested, comes last. Returned points never
    /// alias the input.
    pub fn targets(&self, target: &Point) -> PlanResult<Vec<Point>> {
        match self {
            FocalPattern::SinglePoint => Ok(vec![target.clone()]),
            FocalPattern::Wheel {
                center,
                num_spokes,
                spoke_radius,
                units,
            } => {
                if *num_spokes == 0 {
                    return Err(PlanError::InvalidArgument(
                        "wheel pattern needs at least one spoke".into(),
                    ));
                }
                if *spoke_radius <= 0.0 {
                    return Err(PlanError::InvalidArgument(format!(
                        "wheel spoke radius must be positive, got {}",
                        spoke_radius
                    )));
                }
                let r = spoke_radius * LengthUnit::factor(*units, target.units);
                let mut foci = Vec::with_capacity(self.num_foci());
                for k in 0..*num_spokes {
                    let theta = TAU * k as f64 / *num_spokes as f64;
                    let mut p = target.translated([r * theta.cos(), r * theta.sin(), 0.0]);
                    p.id = format!("{}_spoke_{}", target.id, k);
                    p.name = format!("{} spoke {}", target.name, k);
                    foci.push(p);
                }
                if *center {
                    let mut c = target.clone();
                    c.id = format!("{}_center", target.id);
                    c.name = format!("{} center", target.name);
                    foci.push(c);
                }
                Ok(foci)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_point_copies_target() {
        let target = Point::new("t", [1.0, 2.0, 3.0], LengthUnit::Mm);
        let foci = FocalPattern::SinglePoint.targets(&target).unwrap();
        assert_eq!(foci.len(), 1);
        assert_eq!(foci[0].position(), [1.0, 2.0, 3.0]);
        assert_eq!(FocalPattern::SinglePoint.num_foci(), 1);
    }

    #[test]
    fn test_wheel_four_spokes_with_center() {
        let pattern = FocalPattern::Wheel {
            center: true,
            num_spokes: 4,
            spoke_radius: 0.002,
            units: LengthUnit::M,
        };
        assert_eq!(pattern.num_foci(), 5);

        let target = Point::new("t", [0.0, 0.0, 0.0], LengthUnit::M);
        let foci = pattern.targets(&target).unwrap();
        assert_eq!(foci.len(), 5);
        // spokes at 0, 90, 180, 270 degrees, radius 2 mm
        let expected = [
            [0.002, 0.0, 0.0],
            [0.0, 0.002, 0.0],
            [-0.002, 0.0, 0.0],
            [0.0, -0.002, 0.0],
        ];
        for (focus, want) in foci.iter().zip(expected.iter()) {
            for d in 0..3 {
                assert_relative_eq!(focus.position()[d], want[d], epsilon = 1e-12);
            }
        }
        // center last, at the target itself
        assert_eq!(foci[4].position(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_wheel_converts_radius_units() {
        let pattern = FocalPattern::Wheel {
            center: false,
            num_spokes: 1,
            spoke_radius: 0.002,
            units: LengthUnit::M,
        };
        let target = Point::new("t", [0.0, 0.0, 30.0], LengthUnit::Mm);
        let foci = pattern.targets(&target).unwrap();
        assert_relative_eq!(foci[0].position()[0], 2.0, epsilon = 1e-12);
        assert_eq!(foci[0].units, LengthUnit::Mm);
        // depth preserved
        assert_relative_eq!(foci[0].position()[2], 30.0);
    }

    #[test]
    fn test_wheel_validation() {
        let no_spokes = FocalPattern::Wheel {
            center: true,
            num_spokes: 0,
            spoke_radius: 1.0,
            units: LengthUnit::Mm,
        };
        let target = Point::new("t", [0.0; 3], LengthUnit::Mm);
        assert!(no_spokes.targets(&target).is_err());

        let bad_radius = FocalPattern::Wheel {
            center: true,
            num_spokes: 4,
            spoke_radius: 0.0,
            units: LengthUnit::Mm,
        };
        assert!(bad_radius.targets(&target).is_err());
    }

    #[test]
    fn test_serde_class_tag() {
        let pattern = FocalPattern::Wheel {
            center: true,
            num_spokes: 4,
            spoke_radius: 0.002,
            units: LengthUnit::M,
        };
        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["class"], "wheel");
        assert_eq!(json["num_spokes"], 4);
        let back: FocalPattern = serde_json::from_value(json).unwrap();
        assert_eq!(back, pattern);

        let single = serde_json::to_value(FocalPattern::SinglePoint).unwrap();
        assert_eq!(single["class"], "single_point");
    }
}
