//! Length units and conversion factors
//!
//! All positioned entities in the crate (axes, points, elements,
//! transducers, volumes) carry a [`LengthUnit`] tag. Conversions are exact
//! powers of ten; anything that is not a recognized length unit fails with
//! [`PlanError::InvalidUnit`](crate::types::PlanError::InvalidUnit) at
//! parse time instead of propagating a bad scale factor.

use serde::{Deserialize, Serialize};

use crate::types::{PlanError, PlanResult};

/// Recognized length units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Meters
    M,
    /// Centimeters
    Cm,
    /// Millimeters
    Mm,
    /// Micrometers
    Um,
}

impl Default for LengthUnit {
    fn default() -> Self {
        LengthUnit::Mm
    }
}

impl LengthUnit {
    /// Scale of one unit expressed in meters
    pub fn meters(self) -> f64 {
        match self {
            LengthUnit::M => 1.0,
            LengthUnit::Cm => 1e-2,
            LengthUnit::Mm => 1e-3,
            LengthUnit::Um => 1e-6,
        }
    }

    /// Multiplicative factor converting values in `from` to values in `to`
    pub fn factor(from: LengthUnit, to: LengthUnit) -> f64 {
        if from == to {
            1.0
        } else {
            from.meters() / to.meters()
        }
    }

    /// Parse a unit tag such as `"mm"` or `"m"`
    pub fn parse(s: &str) -> PlanResult<LengthUnit> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(LengthUnit::M),
            "cm" => Ok(LengthUnit::Cm),
            "mm" => Ok(LengthUnit::Mm),
            "um" | "\u{00b5}m" => Ok(LengthUnit::Um),
            other => Err(PlanError::InvalidUnit(other.to_string())),
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthUnit::M => write!(f, "m"),
            LengthUnit::Cm => write!(f, "cm"),
            LengthUnit::Mm => write!(f, "mm"),
            LengthUnit::Um => write!(f, "um"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_units() {
        assert_eq!(LengthUnit::parse("m").unwrap(), LengthUnit::M);
        assert_eq!(LengthUnit::parse("MM").unwrap(), LengthUnit::Mm);
        assert_eq!(LengthUnit::parse(" cm ").unwrap(), LengthUnit::Cm);
        assert_eq!(LengthUnit::parse("um").unwrap(), LengthUnit::Um);
    }

    #[test]
    fn test_parse_invalid_unit() {
        let err = LengthUnit::parse("furlong").unwrap_err();
        assert_eq!(err, PlanError::InvalidUnit("furlong".to_string()));
    }

    #[test]
    fn test_factor() {
        assert_eq!(LengthUnit::factor(LengthUnit::M, LengthUnit::Mm), 1000.0);
        assert_eq!(LengthUnit::factor(LengthUnit::Mm, LengthUnit::M), 1e-3);
        assert_eq!(LengthUnit::factor(LengthUnit::Cm, LengthUnit::Cm), 1.0);
    }

    #[test]
    fn test_factor_roundtrip() {
        let f = LengthUnit::factor(LengthUnit::Mm, LengthUnit::M)
            * LengthUnit::factor(LengthUnit::M, LengthUnit::Mm);
        assert!((f - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_display_parse_roundtrip() {
        for u in [LengthUnit::M, LengthUnit::Cm, LengthUnit::Mm, LengthUnit::Um] {
            assert_eq!(LengthUnit::parse(&u.to_string()).unwrap(), u);
        }
    }
}
