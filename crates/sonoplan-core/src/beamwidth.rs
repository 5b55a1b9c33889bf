//! Beam geometry metrics
//!
//! Measures the spatial extent of a computed field around the focus: the
//! voxels exceeding a cutoff are lifted to world coordinates, projected
//! onto one or two requested axes, and the maximum pairwise distance
//! between their convex-hull vertices is reported as the beamwidth,
//! together with a fit mask of voxels within half that width of the focus.
//!
//! A numerically degenerate hull (collinear inliers) is retried once with
//! a small deterministic jitter before reporting `NaN` with a reason — a
//! robustness workaround kept intentionally narrow.

use serde::{Deserialize, Serialize};

use crate::grid::Mask3;
use crate::point::Point;
use crate::types::{PlanError, PlanResult};
use crate::volume::Volume;

/// Result of a beamwidth measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beamwidth {
    /// Maximum extent of the above-cutoff region along the requested axes;
    /// `NaN` when the hull stayed degenerate after the jitter retry
    pub width: f64,
    /// Voxels within `width / 2` of the focus along the requested axes
    pub fit_mask: Mask3,
    /// Why the width is `NaN`, when it is
    pub reason: Option<String>,
}

/// Measure the beamwidth of `volume` around `focus`.
///
/// `dims` selects one or two world axes (0 = x, 1 = y, 2 = z) to measure
/// along. `mask` optionally restricts which voxels may count as inliers.
/// Fails with `InsufficientPoints` when fewer than `dims.len() + 1` voxels
/// exceed `cutoff`.
pub fn beamwidth(
    volume: &Volume,
    focus: &Point,
    cutoff: f64,
    dims: &[usize],
    mask: Option<&Mask3>,
) -> PlanResult<Beamwidth> {
    if dims.is_empty() || dims.len() > 2 || dims.iter().any(|&d| d > 2) {
        return Err(PlanError::InvalidArgument(format!(
            "beamwidth dims must name one or two axes in 0..3, got {:?}",
            dims
        )));
    }
    if dims.len() == 2 && dims[0] == dims[1] {
        return Err(PlanError::InvalidArgument(
            "beamwidth dims must be distinct".into(),
        ));
    }
    let (n0, n1, n2) = volume.dims();
    if let Some(m) = mask {
        if m.dims() != (n0, n1, n2) {
            return Err(PlanError::DimensionMismatch(format!(
                "mask dims {:?} do not match volume dims {:?}",
                m.dims(),
                (n0, n1, n2)
            )));
        }
    }

    let focus = focus.rescale(volume.units);
    let fpos = focus.position();
    let fproj = project(fpos, dims);

    // World-frame projections of every voxel, and the above-cutoff inliers
    let mut projections = Vec::with_capacity(n0 * n1 * n2);
    let mut inliers = Vec::new();
    for i in 0..n0 {
        for j in 0..n1 {
            for k in 0..n2 {
                let local = [
                    volume.axis(0).get(i),
                    volume.axis(1).get(j),
                    volume.axis(2).get(k),
                ];
                let world = volume.matrix.transform_point(local);
                let proj = project(world, dims);
                projections.push(proj);
                let selected = mask.map_or(true, |m| m.get(i, j, k));
                let v = volume.get(i, j, k);
                if selected && v.is_finite() && v > cutoff {
                    inliers.push(proj);
                }
            }
        }
    }

    let needed = dims.len() + 1;
    if inliers.len() < needed {
        return Err(PlanError::InsufficientPoints {
            needed,
            got: inliers.len(),
        });
    }

    let width = match hull_width(&inliers, dims.len()) {
        Some(w) => w,
        None => {
            // Degenerate hull: perturb by at most half the grid spacing and
            // try once more.
            let amp = 0.5 * min_spacing(volume);
            tracing::warn!(
                points = inliers.len(),
                jitter = amp,
                "degenerate beam hull, retrying with jitter"
            );
            let jittered = jitter(&inliers, amp);
            match hull_width(&jittered, dims.len()) {
                Some(w) => w,
                None => {
                    let reason = "convex hull degenerate after jitter retry".to_string();
                    return Ok(Beamwidth {
                        width: f64::NAN,
                        fit_mask: Mask3::falses(n0, n1, n2),
                        reason: Some(reason),
                    });
                }
            }
        }
    };

    let half = width / 2.0;
    let mut fit_mask = Mask3::falses(n0, n1, n2);
    let mut idx = 0;
    for i in 0..n0 {
        for j in 0..n1 {
            for k in 0..n2 {
                let p = projections[idx];
                idx += 1;
                let d = ((p[0] - fproj[0]).powi(2) + (p[1] - fproj[1]).powi(2)).sqrt();
                fit_mask.set(i, j, k, d <= half);
            }
        }
    }

    Ok(Beamwidth {
        width,
        fit_mask,
        reason: None,
    })
}

fn project(p: [f64; 3], dims: &[usize]) -> [f64; 2] {
    match dims.len() {
        1 => [p[dims[0]], 0.0],
        _ => [p[dims[0]], p[dims[1]]],
    }
}

/// Maximum pairwise distance between convex-hull vertices, or `None` when
/// the hull is degenerate for the requested dimensionality
fn hull_width(points: &[[f64; 2]], ndims: usize) -> Option<f64> {
    if ndims == 1 {
        let min = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
        return Some(max - min);
    }
    let hull = convex_hull_2d(points);
    if hull.len() < 3 {
        return None;
    }
    let mut best = 0.0f64;
    for (i, a) in hull.iter().enumerate() {
        for b in hull.iter().skip(i + 1) {
            let d = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
            best = best.max(d);
        }
    }
    Some(best)
}

/// Andrew's monotone chain; returns hull vertices in counter-clockwise
/// order. Collinear point sets collapse to fewer than three vertices.
fn convex_hull_2d(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut p = points.to_vec();
    p.sort_by(|a, b| {
        a[0].partial_cmp(&b[0])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a[1].partial_cmp(&b[1]).unwrap_or(std::cmp::Ordering::Equal))
    });
    p.dedup();
    if p.len() < 3 {
        return p;
    }

    fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
        (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
    }

    let mut lower: Vec<[f64; 2]> = Vec::new();
    for &pt in &p {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], pt) <= 0.0
        {
            lower.pop();
        }
        lower.push(pt);
    }
    let mut upper: Vec<[f64; 2]> = Vec::new();
    for &pt in p.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], pt) <= 0.0
        {
            upper.pop();
        }
        upper.push(pt);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn min_spacing(volume: &Volume) -> f64 {
    let s = (0..3)
        .map(|d| volume.axis(d).spacing())
        .filter(|&s| s > 0.0)
        .fold(f64::INFINITY, f64::min);
    if s.is_finite() {
        s
    } else {
        1e-6
    }
}

/// Deterministic pseudo-random perturbation in `[-amp, amp]` per
/// coordinate (32-bit LCG; reproducible across runs)
fn jitter(points: &[[f64; 2]], amp: f64) -> Vec<[f64; 2]> {
    let mut state: u32 = points.len() as u32 | 1;
    let mut next = || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state as f64 / u32::MAX as f64) * 2.0 - 1.0
    };
    points
        .iter()
        .map(|p| [p[0] + amp * next(), p[1] + amp * next()])
        .collect()
}
