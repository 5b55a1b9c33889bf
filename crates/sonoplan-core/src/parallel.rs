//! Parallel batch planning
//!
//! Rayon-based fan-out of the per-focus planning work. Enable with the
//! `parallel` feature flag:
//!
//! ```toml
//! [dependencies]
//! sonoplan-core = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! Each focus's delay and apodization rows are independent of every other
//! focus, so the pattern expansion parallelizes across foci with no shared
//! mutable state. Row order is identical to the sequential
//! [`plan_sources`](crate::plan::plan_sources).

use rayon::prelude::*;

use crate::apodization::ApodMethod;
use crate::delays::DelayMethod;
use crate::focal_pattern::FocalPattern;
use crate::materials::MaterialMaps;
use crate::plan::SourcePlan;
use crate::point::Point;
use crate::transducer::Transducer;
use crate::types::PlanResult;

/// Parallel variant of [`plan_sources`](crate::plan::plan_sources): one
/// rayon task per focus
pub fn plan_sources_par(
    xdc: &Transducer,
    pattern: &FocalPattern,
    target: &Point,
    delay_method: &DelayMethod,
    apod_method: &ApodMethod,
    materials: Option<&MaterialMaps>,
) -> PlanResult<SourcePlan> {
    let targets = pattern.targets(target)?;
    let rows: Vec<(Vec<f64>, Vec<f64>)> = targets
        .par_iter()
        .map(|focus| {
            let delays = delay_method.calc_delays(xdc, focus, materials)?;
            let apod = apod_method.calc_apod(xdc, focus)?;
            Ok((delays, apod))
        })
        .collect::<PlanResult<Vec<_>>>()?;

    let (delays, apodizations) = rows.into_iter().unzip();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::plan::plan_sources;
    use crate::units::LengthUnit;

    fn small_array() -> Transducer {
        let elements = (0..8)
            .map(|i| {
                Element::new(
                    i,
                    [i as f64 * 0.4 - 1.4, 0.0, 0.0],
                    [0.0; 3],
                    LengthUnit::Mm,
                )
            })
            .collect();
        Transducer::new("xdc", elements, 1.0e6, LengthUnit::Mm).unwrap()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let xdc = small_array();
        let target = Point::new("t", [0.0, 0.0, 25.0], LengthUnit::Mm);
        let pattern = FocalPattern::Wheel {
            center: true,
            num_spokes: 6,
            spoke_radius: 1.5,
            units: LengthUnit::Mm,
        };
        let delay = DelayMethod::Direct { c0: Some(1540.0) };
        let apod = ApodMethod::Uniform;

        let seq = plan_sources(&xdc, &pattern, &target, &delay, &apod, None).unwrap();
        let par = plan_sources_par(&xdc, &pattern, &target, &delay, &apod, None).unwrap();
        assert_eq!(par.delays, seq.delays);
        assert_eq!(par.apodizations, seq.apodizations);
        assert_eq!(par.targets, seq.targets);
    }

    #[test]
    fn test_parallel_propagates_errors() {
        let xdc = small_array();
        let target = Point::new("t", [0.0, 0.0, 25.0], LengthUnit::Mm);
        let err = plan_sources_par(
            &xdc,
            &FocalPattern::SinglePoint,
            &target,
            &DelayMethod::Direct { c0: None },
            &ApodMethod::Uniform,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, crate::types::PlanError::MaterialNotFound(_)));
    }
}
