//! Per-element apodization weights
//!
//! Amplitude scaling of each element's drive signal, in `[0, 1]`. The
//! family is a closed tagged union: a uniform all-ones weighting, and an
//! angular cutoff that silences elements whose normal points too far away
//! from the focus.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::transducer::Transducer;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// How per-element amplitude weights are computed for a focus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ApodMethod {
    /// All elements at full amplitude
    Uniform,
    /// Elements whose angular deviation to the focus exceeds `max_angle`
    /// are switched off
    MaxAngle {
        /// Cutoff angle between element normal and focus direction,
        /// radians
        max_angle: f64,
    },
}

impl Default for ApodMethod {
    fn default() -> Self {
        ApodMethod::Uniform
    }
}

impl ApodMethod {
    /// Compute one weight per element, each in `[0, 1]`
    pub fn calc_apod(&self, xdc: &Transducer, focus: &Point) -> PlanResult<Vec<f64>> {
        match self {
            ApodMethod::Uniform => Ok(vec![1.0; xdc.num_elements()]),
            ApodMethod::MaxAngle { max_angle } => {
                if *max_angle <= 0.0 {
                    return Err(PlanError::InvalidArgument(format!(
                        "apodization cutoff angle must be positive, got {}",
                        max_angle
                    )));
                }
                let xdc_m = xdc.rescale(LengthUnit::M);
                let target = focus.rescale(LengthUnit::M).position();
                Ok(xdc_m
                    .elements
                    .iter()
                    .map(|e| {
                        let angle = e.angle_to_point(target, Some(&xdc_m.matrix));
                        if angle <= *max_angle {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect())
            }
        }
    }
}
