//! Core result and error types for beam planning
//!
//! This module defines the crate-wide error taxonomy. Every geometry or
//! interpolation failure surfaces as a typed [`PlanError`] rather than a
//! silently wrong number; the only locally-recovered failure in the crate
//! is the documented jitter-and-retry inside the beamwidth computation.

use thiserror::Error;

/// Result type for planning operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur during geometry, delay, or resampling operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Unrecognized or incompatible length unit
    #[error("unrecognized length unit: {0:?}")]
    InvalidUnit(String),

    /// Focus coincides with the frame origin; the beam azimuth is undefined
    #[error("focus lies at the frame origin; beam direction is undefined")]
    DegenerateFocus,

    /// Grid/array shape mismatch between coordinates and data
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A required named material-property volume is absent
    #[error("material property volume not found: {0:?}")]
    MaterialNotFound(String),

    /// Interpolation query outside the source volume extent
    #[error("sample outside source volume extent: {0}")]
    OutOfBoundsSample(String),

    /// Convex hull needs at least d+1 non-degenerate points
    #[error("insufficient points: need at least {needed}, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    /// Matrix has no true inverse
    #[error("matrix is singular")]
    SingularMatrix,

    /// Caller-supplied argument failed validation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
