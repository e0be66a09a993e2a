//! Error types with rich diagnostics using miette
//!
//! A failed segment aborts the rest of its dimension. Segments committed
//! before the failure stay in the sink.

use miette::Diagnostic;
use thiserror::Error;

use crate::definition::DimensionKind;
use crate::style::StyleProperty;
use crate::types::NumericError;

/// Result alias used throughout the layout engine
pub type Result<T, E = LayoutError> = std::result::Result<T, E>;

// ============================================================================
// Layout Errors
// ============================================================================

/// Errors that abort the stroke of one dimension
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("degenerate geometry in segment {segment}: {reason}")]
    #[diagnostic(
        code(dimstroke::layout::degenerate_geometry),
        help("check for coincident points, a zero sweep or a zero radius")
    )]
    DegenerateGeometry { segment: usize, reason: &'static str },

    #[error("text metrics returned an invalid size for {text:?} in segment {segment}")]
    #[diagnostic(code(dimstroke::layout::measurement_failure))]
    MeasurementFailure {
        segment: usize,
        text: String,
        #[source]
        source: NumericError,
    },

    #[error("{kind:?} dimension needs at least {required} points, got {found}")]
    #[diagnostic(code(dimstroke::layout::too_few_points))]
    TooFewPoints {
        kind: DimensionKind,
        required: usize,
        found: usize,
    },

    #[error("no strategy registered for {kind:?} dimensions")]
    #[diagnostic(
        code(dimstroke::layout::no_strategy),
        help("register one with StrategyRegistry::register")
    )]
    NoStrategy { kind: DimensionKind },

    #[error("override for {property:?} in segment {segment} is not a {expected}")]
    #[diagnostic(code(dimstroke::layout::invalid_style))]
    InvalidStyle {
        property: StyleProperty,
        segment: usize,
        expected: &'static str,
    },
}

impl LayoutError {
    /// Segment the error was raised in, when it belongs to one
    pub fn segment(&self) -> Option<usize> {
        match self {
            LayoutError::DegenerateGeometry { segment, .. }
            | LayoutError::MeasurementFailure { segment, .. }
            | LayoutError::InvalidStyle { segment, .. } => Some(*segment),
            LayoutError::TooFewPoints { .. } | LayoutError::NoStrategy { .. } => None,
        }
    }
}
