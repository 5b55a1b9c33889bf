//! Focus-centered geometry
//!
//! Builds an orthonormal frame whose z axis points at the focus, and
//! derives scalar fields over a grid from it: per-voxel offsets in the
//! focus frame, anisotropic distance from the focus, and boolean focus
//! masks. Distances along the beam axis can be de-weighted with an aspect
//! ratio to account for oblong focal spots.

use serde::{Deserialize, Serialize};

use crate::axis::{self, Axis};
use crate::grid::{Grid3, Mask3};
use crate::point::Point;
use crate::transform::{self, Matrix4};
use crate::types::{PlanError, PlanResult};
use crate::units::LengthUnit;

/// Default distance aspect ratio for focus masks: the beam axis counts a
/// tenth of the lateral axes
pub const DEFAULT_MASK_ASPECT: [f64; 3] = [1.0, 1.0, 10.0];

/// Origin choice for the focus frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterOn {
    /// Frame origin at the focus point
    Focus,
    /// Frame origin at the world origin
    Origin,
}

/// Comparison operator for focus masking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskOp {
    /// `distance_from_focus > threshold`
    Gt,
    /// `distance_from_focus >= threshold`
    Ge,
    /// `distance_from_focus < threshold`
    Lt,
    /// `distance_from_focus <= threshold`
    Le,
}

impl MaskOp {
    fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            MaskOp::Gt => value > threshold,
            MaskOp::Ge => value >= threshold,
            MaskOp::Lt => value < threshold,
            MaskOp::Le => value <= threshold,
        }
    }

    /// True for the operators that select the neighborhood of the focus
    fn selects_inside(self) -> bool {
        matches!(self, MaskOp::Lt | MaskOp::Le)
    }
}

/// Build the focus frame: z toward the focus, x the azimuthal in-plane
/// direction, y completing the right-handed basis.
///
/// With `CenterOn::Focus` the frame origin sits at the focus point, with
/// `CenterOn::Origin` at the world origin. A focus at the origin has no
/// defined direction and fails with `DegenerateFocus`.
pub fn focus_matrix(focus: &Point, center_on: CenterOn) -> PlanResult<Matrix4> {
    let f = focus.position();
    let zvec = transform::normalize(f).ok_or(PlanError::DegenerateFocus)?;
    let az = -zvec[0].atan2(zvec[2]);
    let xvec = [az.cos(), 0.0, az.sin()];
    let yvec = transform::cross(zvec, xvec);
    let origin = match center_on {
        CenterOn::Focus => f,
        CenterOn::Origin => [0.0; 3],
    };
    Ok(Matrix4::from_basis(xvec, yvec, zvec, origin))
}

/// Coordinates of every grid point expressed in the focus-centered frame.
///
/// Returns the three offset fields (along the focus frame's x, y, and z)
/// with the grid's shape. Axes and focus are first rescaled to `units`.
pub fn offset_grid(
    coords: &[Axis; 3],
    focus: &Point,
    units: LengthUnit,
) -> PlanResult<[Grid3; 3]> {
    let coords = [
        coords[0].rescale(units),
        coords[1].rescale(units),
        coords[2].rescale(units),
    ];
    let focus = focus.rescale(units);
    let inv = focus_matrix(&focus, CenterOn::Focus)?.invert()?;
    Ok(axis::ndgrid(&coords, Some(&inv)))
}

/// Anisotropic Euclidean distance from the focus over a grid:
/// `sqrt(sum((offset_i / aspect_i)^2))`. An isotropic `[1, 1, 1]` aspect
/// gives plain Euclidean distance.
pub fn dist_from_focus(
    coords: &[Axis; 3],
    focus: &Point,
    aspect: [f64; 3],
) -> PlanResult<Grid3> {
    if aspect.iter().any(|&a| a <= 0.0) {
        return Err(PlanError::InvalidArgument(format!(
            "aspect ratio components must be positive, got {:?}",
            aspect
        )));
    }
    let [dx, dy, dz] = offset_grid(coords, focus, focus.units)?;
    let (n0, n1, n2) = dx.dims();
    Ok(Grid3::from_fn(n0, n1, n2, |i, j, k| {
        let a = dx.get(i, j, k) / aspect[0];
        let b = dy.get(i, j, k) / aspect[1];
        let c = dz.get(i, j, k) / aspect[2];
        (a * a + b * b + c * c).sqrt()
    }))
}

/// Boolean focus mask: OR across all foci of `dist <op> distance`,
/// intersected with `z > zmin` when `zmin` is finite.
///
/// For the inside-selecting operators (`Lt`, `Le`) a non-positive
/// `distance` is rejected at validation rather than yielding an empty
/// mask.
pub fn mask_focus(
    coords: &[Axis; 3],
    foci: &[Point],
    distance: f64,
    op: MaskOp,
    aspect: [f64; 3],
    zmin: f64,
) -> PlanResult<Mask3> {
    if foci.is_empty() {
        return Err(PlanError::InvalidArgument(
            "mask_focus needs at least one focus".into(),
        ));
    }
    if op.selects_inside() && distance <= 0.0 {
        return Err(PlanError::InvalidArgument(format!(
            "focus mask distance must be positive, got {}",
            distance
        )));
    }

    let (n0, n1, n2) = (coords[0].len(), coords[1].len(), coords[2].len());
    let mut mask = Mask3::falses(n0, n1, n2);
    for focus in foci {
        let dist = dist_from_focus(coords, focus, aspect)?;
        let one = Mask3::from_fn(n0, n1, n2, |i, j, k| op.apply(dist.get(i, j, k), distance));
        mask.or_assign(&one)?;
    }

    if zmin.is_finite() {
        let zcut = Mask3::from_fn(n0, n1, n2, |_, _, k| coords[2].get(k) > zmin);
        mask.and_assign(&zcut)?;
    }
    Ok(mask)
}
