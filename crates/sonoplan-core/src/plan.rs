//! Source plan assembly
//!
//! Bundles everything the external acoustic solver (and persistence)
//! consumes from the planner: the transducer, the focal pattern, the
//! expanded focus list, and one row of delays (seconds) and apodization
//! weights (`[0, 1]`) per focus.

use serde::{Deserialize, Serialize};

use crate::apodization::ApodMethod;
use crate::delays::DelayMethod;
use crate::focal_pattern::FocalPattern;
use crate::materials::MaterialMaps;
use crate::point::Point;
use crate::transducer::Transducer;
use crate::types::{PlanError, PlanResult};

/// Per-focus drive settings for a transducer array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePlan {
    /// The array the plan drives
    pub transducer: Transducer,
    /// The pattern that produced `targets`
    pub focal_pattern: FocalPattern,
    /// Expanded foci, one per plan row
    pub targets: Vec<Point>,
    /// Delays in seconds, `[num_foci][num_elements]`
    pub delays: Vec<Vec<f64>>,
    /// Amplitude weights in `[0, 1]`, `[num_foci][num_elements]`
    pub apodizations: Vec<Vec<f64>>,
}

impl SourcePlan {
    /// Number of foci (plan rows)
    pub fn num_foci(&self) -> usize {
        self.targets.len()
    }

    /// Number of elements (plan columns)
    pub fn num_elements(&self) -> usize {
        self.transducer.num_elements()
    }

    /// Check the row/column shape and the delay/apodization ranges
    pub fn validate(&self) -> PlanResult<()> {
        let rows = self.targets.len();
        let cols = self.transducer.num_elements();
        if self.delays.len() != rows || self.apodizations.len() != rows {
            return Err(PlanError::DimensionMismatch(format!(
                "plan has {} foci but {} delay rows and {} apodization rows",
                rows,
                self.delays.len(),
                self.apodizations.len()
            )));
        }
        for (f, (d, a)) in self.delays.iter().zip(self.apodizations.iter()).enumerate() {
            if d.len() != cols || a.len() != cols {
                return Err(PlanError::DimensionMismatch(format!(
                    "focus {} has {} delays and {} apodizations for {} elements",
                    f,
                    d.len(),
                    a.len(),
                    cols
                )));
            }
            if d.iter().any(|&v| !v.is_finite() || v < 0.0) {
                return Err(PlanError::InvalidArgument(format!(
                    "focus {} has a negative or non-finite delay",
                    f
                )));
            }
            if a.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
                return Err(PlanError::InvalidArgument(format!(
                    "focus {} has an apodization weight outside [0, 1]",
                    f
                )));
            }
        }
        Ok(())
    }
}

/// Plan delays and apodizations for every focus of a pattern.
///
/// Rows are ordered exactly like `pattern.targets(target)`.
pub fn plan_sources(
    xdc: &Transducer,
    pattern: &FocalPattern,
    target: &Point,
    delay_method: &DelayMethod,
    apod_method: &ApodMethod,
    materials: Option<&MaterialMaps>,
) -> PlanResult<SourcePlan> {
    let targets = pattern.targets(target)?;
    let mut delays = Vec::with_capacity(targets.len());
    let mut apodizations = Vec::with_capacity(targets.len());
    for focus in &targets {
        delays.push(delay_method.calc_delays(xdc, focus, materials)?);
        apodizations.push(apod_method.calc_apod(xdc, focus)?);
    }
    tracing::debug!(
        foci = targets.len(),
        elements = xdc.num_elements(),
        "assembled source plan"
    );
    let plan = SourcePlan {
        transducer: xdc.clone(),
        focal_pattern: pattern.clone(),
        targets,
        delays,
        apodizations,
    };
    plan.validate()?;
    Ok(plan)
}
