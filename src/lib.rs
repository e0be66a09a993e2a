//! dimstroke - layout engine for engineering-drawing dimensions
//!
//! Turns a [`DimensionDefinition`] (measured points, an orientation frame and
//! per-segment text settings) plus a [`StyleConfiguration`] into drawable
//! [`Primitive`]s: dimension lines and arcs, witness lines, terminators,
//! leaders and positioned text.
//!
//! This crate is organized into modules:
//! - `definition`: Dimension kinds, points and text descriptors
//! - `style`: Style configuration and per-segment overrides
//! - `metrics`: Text measurement
//! - `format`: Measurement strings
//! - `layout`: Fit classification, text placement and line generation
//! - `strategy`: Per-kind layout and the strategy registry
//! - `output`: Primitives and sinks
//! - `errors`: Error types

pub mod definition;
pub mod errors;
pub mod format;
pub mod layout;
pub mod log;
pub mod metrics;
pub mod output;
pub mod strategy;
pub mod style;
pub mod types;

pub use definition::{DimensionDefinition, DimensionKind, Justification, TextDescriptor};
pub use errors::{LayoutError, Result};
pub use metrics::{MonospaceMetrics, ProportionalMetrics, TextBlockMetrics, TextMetrics};
pub use output::{LineRole, Primitive, Sink, TrimCode};
pub use strategy::{DimensionStrategy, Strategy, StrategyRegistry};
pub use style::{OverrideTable, StyleConfiguration, StyleResolver};

/// Lay out one dimension with the built-in strategies.
///
/// Primitives reach `sink` one segment at a time. When a segment fails the
/// error is returned and only the segments before it have been emitted.
pub fn stroke(
    def: &DimensionDefinition,
    resolver: &dyn StyleResolver,
    metrics: &dyn TextMetrics,
    sink: &mut dyn Sink,
) -> Result<()> {
    StrategyRegistry::default().stroke(def, resolver, metrics, sink)
}
