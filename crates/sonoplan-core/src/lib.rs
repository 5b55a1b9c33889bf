//! # Focused-Ultrasound Beam Planning Core
//!
//! This crate provides the geometric transform and beamforming-delay
//! engine for focused-ultrasound treatment planning: coordinate axes and
//! affine transforms, focus-centered frames, element-to-target
//! time-of-flight (including ray integration through heterogeneous
//! speed-of-sound fields), focal-pattern expansion, and volumetric
//! resampling via affine matrices and selectable interpolation kernels.
//!
//! ## Overview
//!
//! - **Geometry**: [`axis::Axis`], [`transform::Matrix4`],
//!   [`point::Point`], [`element::Element`], [`transducer::Transducer`]
//! - **Volumes**: [`volume::Volume`] resampling, [`grid::Grid3`] tensors,
//!   [`materials::MaterialMaps`] property fields
//! - **Focus geometry**: [`focus`] frames/masks, [`beamwidth`] metrics
//! - **Beamforming**: [`delays::DelayMethod`],
//!   [`apodization::ApodMethod`], [`focal_pattern::FocalPattern`],
//!   [`plan::SourcePlan`]
//!
//! The acoustic solver, tissue segmentation, and persistence are external
//! collaborators: this crate prepares their inputs (delay/apodization
//! arrays, transducer geometry) and consumes their outputs (property and
//! pressure volumes) without owning any wire format or file I/O.
//!
//! ## Example
//!
//! ```rust
//! use sonoplan_core::prelude::*;
//!
//! // A small linear array, 0.5 mm pitch
//! let elements: Vec<Element> = (0..8)
//!     .map(|i| Element::new(i, [i as f64 * 0.5 - 1.75, 0.0, 0.0], [0.0; 3], LengthUnit::Mm))
//!     .collect();
//! let xdc = Transducer::new("array", elements, 1.0e6, LengthUnit::Mm).unwrap();
//!
//! // Focus 30 mm ahead of the array
//! let target = Point::new("target", [0.0, 0.0, 30.0], LengthUnit::Mm);
//!
//! // Direct time-of-flight delays at 1540 m/s
//! let method = DelayMethod::Direct { c0: Some(1540.0) };
//! let delays = method.calc_delays(&xdc, &target, None).unwrap();
//! assert_eq!(delays.len(), 8);
//! let min = delays.iter().copied().fold(f64::INFINITY, f64::min);
//! assert_eq!(min, 0.0);
//! ```
//!
//! All geometry is synchronous, pure math over immutable inputs; batch
//! work parallelizes across independent foci (see the `parallel` feature).

pub mod apodization;
pub mod axis;
pub mod beamwidth;
pub mod config;
pub mod delays;
pub mod element;
pub mod focal_pattern;
pub mod focus;
pub mod grid;
pub mod materials;
pub mod plan;
pub mod point;
pub mod transducer;
pub mod transform;
pub mod types;
pub mod units;
pub mod volume;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Commonly used types, re-exported
pub mod prelude {
    pub use crate::apodization::ApodMethod;
    pub use crate::axis::Axis;
    pub use crate::beamwidth::{beamwidth, Beamwidth};
    pub use crate::config::PlanConfig;
    pub use crate::delays::DelayMethod;
    pub use crate::element::Element;
    pub use crate::focal_pattern::FocalPattern;
    pub use crate::focus::{
        dist_from_focus, focus_matrix, mask_focus, offset_grid, CenterOn, MaskOp,
    };
    pub use crate::grid::{Grid3, Mask3};
    pub use crate::materials::{MaterialMaps, MaterialReference};
    pub use crate::plan::{plan_sources, SourcePlan};
    pub use crate::point::Point;
    pub use crate::transducer::{MergeReference, Transducer};
    pub use crate::transform::Matrix4;
    pub use crate::types::{PlanError, PlanResult};
    pub use crate::units::LengthUnit;
    pub use crate::volume::{InterpMethod, OutOfBounds, Volume};
}
