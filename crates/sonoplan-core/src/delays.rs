//! Per-element beamforming delays
//!
//! Computes the time offsets applied to each element's drive signal so
//! that all wavefronts arrive at the focus together. Two methods:
//!
//! - **Direct** — straight-line time of flight through a single speed of
//!   sound, either a fixed constant or the reference material's.
//! - **Raytraced** — the straight element-to-focus path is subdivided and
//!   the heterogeneous "sound_speed" volume sampled along it; the travel
//!   time uses the mean sampled speed.
//!
//! Both methods normalize the result so the last-arriving element has
//! zero delay: `min(delays) == 0` and every delay is non-negative.
//! Normalization happens only after all per-element values are computed.
//!
//! Path samples falling outside the sound-speed volume become NaN and are
//! excluded from the mean; a path with no in-bounds sample at all is a
//! typed `OutOfBoundsSample` error. Boundary truncation therefore never
//! silently biases a delay.

use serde::{Deserialize, Serialize};

use crate::materials::{MaterialMaps, SOUND_SPEED};
use crate::point::Point;
use crate::transducer::Transducer;
use crate::transform;
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;
use crate::volume::{InterpMethod, OutOfBounds, Volume};

/// Default step length for ray integration, meters
pub const DEFAULT_INTERP_SPACING: f64 = 1e-4;

/// How per-element delays are computed for a focus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum DelayMethod {
    /// Straight-line time of flight through a homogeneous speed of sound.
    /// With `c0 = None` the reference material's speed is used, which
    /// requires material maps to be supplied.
    Direct {
        /// Fixed speed of sound in m/s, or `None` for the reference
        /// material's
        c0: Option<f64>,
    },
    /// Time of flight integrated through the heterogeneous "sound_speed"
    /// property volume
    Raytraced {
        /// Kernel used to sample the sound-speed volume along the path
        interp_method: InterpMethod,
        /// Step length along the path, meters
        interp_spacing: f64,
    },
}

impl Default for DelayMethod {
    fn default() -> Self {
        DelayMethod::Direct { c0: None }
    }
}

impl DelayMethod {
    /// Compute one delay per element (seconds) focusing `xdc` on `focus`
    pub fn calc_delays(
        &self,
        xdc: &Transducer,
        focus: &Point,
        materials: Option<&MaterialMaps>,
    ) -> PlanResult<Vec<f64>> {
        match self {
            DelayMethod::Direct { c0 } => {
                let c = match c0 {
                    Some(c) => *c,
                    None => {
                        materials
                            .ok_or_else(|| PlanError::MaterialNotFound(SOUND_SPEED.to_string()))?
                            .reference
                            .sound_speed
                    }
                };
                if c <= 0.0 {
                    return Err(PlanError::InvalidArgument(format!(
                        "sound speed must be positive, got {}",
                        c
                    )));
                }
                direct_delays(xdc, focus, c)
            }
            DelayMethod::Raytraced {
                interp_method,
                interp_spacing,
            } => {
                if *interp_spacing <= 0.0 {
                    return Err(PlanError::InvalidArgument(format!(
                        "ray step length must be positive, got {}",
                        interp_spacing
                    )));
                }
                let maps = materials
                    .ok_or_else(|| PlanError::MaterialNotFound(SOUND_SPEED.to_string()))?;
                let sound_speed = maps.get(SOUND_SPEED)?;
                raytraced_delays(xdc, focus, sound_speed, *interp_method, *interp_spacing)
            }
        }
    }
}

/// Straight-line time of flight: `delay_i = max_j(tof_j) - tof_i`
fn direct_delays(xdc: &Transducer, focus: &Point, c: f64) -> PlanResult<Vec<f64>> {
    let xdc_m = xdc.rescale(LengthUnit::M);
    let target = focus.rescale(LengthUnit::M).position();
    let tofs: Vec<f64> = xdc_m
        .elements
        .iter()
        .map(|e| e.distance_to_point(target, Some(&xdc_m.matrix)) / c)
        .collect();
    Ok(normalize_arrivals(&tofs))
}

/// Ray-integrated time of flight through a heterogeneous sound-speed field
fn raytraced_delays(
    xdc: &Transducer,
    focus: &Point,
    sound_speed: &Volume,
    method: InterpMethod,
    spacing: f64,
) -> PlanResult<Vec<f64>> {
    let xdc_m = xdc.rescale(LengthUnit::M);
    let target = focus.rescale(LengthUnit::M).position();
    let vol = sound_speed.rescale(LengthUnit::M);
    let to_local = match vol.matrix.invert() {
        Ok(inv) => inv,
        Err(_) => vol.matrix.pseudo_invert()?,
    };

    let mut tofs = Vec::with_capacity(xdc_m.num_elements());
    for e in &xdc_m.elements {
        let start = xdc_m.matrix.transform_point(e.position());
        let path = transform::sub(target, start);
        let len = transform::norm(path);
        let steps = (len / spacing).ceil().max(1.0) as usize;

        let mut sum = 0.0;
        let mut count = 0usize;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let p = transform::add(start, transform::scale(path, t));
            let local = to_local.transform_point(p);
            let c = vol.interp(local, method, OutOfBounds::Fill(f64::NAN));
            if c.is_finite() && c > 0.0 {
                sum += c;
                count += 1;
            }
        }
        if count == 0 {
            return Err(PlanError::OutOfBoundsSample(format!(
                "ray from element {} lies entirely outside the sound-speed volume",
                e.index
            )));
        }
        let mean_c = sum / count as f64;
        tofs.push(len / mean_c);
    }
    Ok(normalize_arrivals(&tofs))
}

/// Turn raw times of flight into non-negative delays with the
/// last-arriving element at zero
fn normalize_arrivals(tofs: &[f64]) -> Vec<f64> {
    let max_tof = tofs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    tracing::debug!(
        elements = tofs.len(),
        max_tof_us = max_tof * 1e6,
        "normalizing beamforming delays"
    );
    tofs.iter().map(|&t| max_tof - t).collect()
}
