//! Transducer elements
//!
//! A single radiating element with a position and an orientation given as
//! three intrinsic rotation angles: azimuth about Y, elevation about the
//! rotated X', roll about the twice-rotated Z''. [`Element::matrix`]
//! composes these into the element's frame matrix; [`matrix2xyz`] is the
//! documented inverse.
//!
//! The angle recovery is singular at `el = ±π/2` (gimbal lock): there the
//! azimuth and roll axes coincide and only their sum is observable. The
//! round-trip guarantee therefore holds for `el` strictly inside
//! `(-π/2, π/2)`; callers steering elements to the poles must carry the
//! angles themselves.

use serde::{Deserialize, Serialize};

use crate::transform::{self, Matrix4};
use crate::units::LengthUnit;

/// A single transducer element in its array's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Position of the element within its array
    pub index: usize,
    /// Position along the array's x axis
    pub x: f64,
    /// Position along the array's y axis
    pub y: f64,
    /// Position along the array's z axis
    pub z: f64,
    /// Azimuth rotation about Y, radians
    pub az: f64,
    /// Elevation rotation about the azimuth-rotated X, radians
    pub el: f64,
    /// Roll rotation about the element normal, radians
    pub roll: f64,
    /// Element width, in `units`
    pub width: f64,
    /// Element length, in `units`
    pub length: f64,
    /// Sampled electro-acoustic impulse response (may be empty)
    #[serde(default)]
    pub impulse_response: Vec<f64>,
    /// Sample period of `impulse_response`, seconds
    #[serde(default)]
    pub impulse_dt: f64,
    /// Physical connector pin, when assigned
    #[serde(default)]
    pub pin: Option<usize>,
    /// Length unit of positions and extents
    pub units: LengthUnit,
}

impl Element {
    /// Create an element at `position` with orientation `(az, el, roll)`
    pub fn new(index: usize, position: [f64; 3], orientation: [f64; 3], units: LengthUnit) -> Self {
        Self {
            index,
            x: position[0],
            y: position[1],
            z: position[2],
            az: orientation[0],
            el: orientation[1],
            roll: orientation[2],
            width: 1.0,
            length: 1.0,
            impulse_response: Vec::new(),
            impulse_dt: 0.0,
            pin: None,
            units,
        }
    }

    /// Element position as a triple
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Frame matrix `[Raz * Rel * Rroll | t]`: azimuth about Y, elevation
    /// about the rotated X, roll about the twice-rotated Z
    pub fn matrix(&self) -> Matrix4 {
        let mut m = Matrix4::rot_y(self.az)
            .mul(&Matrix4::rot_x(self.el))
            .mul(&Matrix4::rot_z(self.roll));
        m.set_translation(self.position());
        m
    }

    /// Unit normal of the element face (third basis column), optionally
    /// re-expressed through a global transform
    pub fn normal(&self, transform: Option<&Matrix4>) -> [f64; 3] {
        let m = match transform {
            Some(t) => t.mul(&self.matrix()),
            None => self.matrix(),
        };
        m.column(2)
    }

    /// Euclidean distance from the element to `target`, optionally after
    /// mapping the element through a global transform
    pub fn distance_to_point(&self, target: [f64; 3], transform: Option<&Matrix4>) -> f64 {
        let pos = match transform {
            Some(t) => t.transform_point(self.position()),
            None => self.position(),
        };
        transform::norm(transform::sub(target, pos))
    }

    /// Angular deviation (radians) between the element normal and the
    /// direction to `target`; 0 when the target sits on the beam axis
    pub fn angle_to_point(&self, target: [f64; 3], transform: Option<&Matrix4>) -> f64 {
        let m = match transform {
            Some(t) => t.mul(&self.matrix()),
            None => self.matrix(),
        };
        let v = transform::sub(target, m.translation_part());
        match transform::normalize(v) {
            Some(vhat) => {
                let n = m.column(2);
                transform::dot(n, vhat).clamp(-1.0, 1.0).acos()
            }
            None => 0.0,
        }
    }

    /// Copy expressed in `units`; position and extents are scaled
    pub fn rescale(&self, units: LengthUnit) -> Element {
        if units == self.units {
            return self.clone();
        }
        let f = LengthUnit::factor(self.units, units);
        let mut out = self.clone();
        out.units = units;
        out.x *= f;
        out.y *= f;
        out.z *= f;
        out.width *= f;
        out.length *= f;
        out
    }
}

/// Recover `(x, y, z, az, el, roll)` from a frame matrix built by
/// [`Element::matrix`].
///
/// `az = atan2(m02, m22)`, `el = -atan2(m12, hypot(m22, m02))`, and roll
/// from the second row of the rotation block (the first basis column
/// projected onto the azimuth/elevation-rotated frame). Exact inverse for
/// `el` inside `(-π/2, π/2)`; at `el = ±π/2` the decomposition is
/// singular and a representative `(az, roll)` pair is returned.
pub fn matrix2xyz(m: &Matrix4) -> (f64, f64, f64, f64, f64, f64) {
    let t = m.translation_part();
    let az = m.m[0][2].atan2(m.m[2][2]);
    let el = -m.m[1][2].atan2((m.m[2][2] * m.m[2][2] + m.m[0][2] * m.m[0][2]).sqrt());
    let roll = m.m[1][0].atan2(m.m[1][1]);
    (t[0], t[1], t[2], az, el, roll)
}
