//! Layout context - state scoped to one stroke call

use glam::DVec3;

use crate::errors::{LayoutError, Result};
use crate::metrics::{TextBlockMetrics, TextMetrics};
use crate::output::{Primitive, Sink};
use crate::style::StyleConfiguration;
use crate::types::{Frame, Length};

/// Fit classification of one segment.
///
/// `push_text_outside` and `fit_terms_inside` can only be set while
/// `all_dont_fit` is set; the setters enforce this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FitState {
    all_dont_fit: bool,
    fit_terms_inside: bool,
    push_text_outside: bool,
    text_not_fit: bool,
}

impl FitState {
    /// Everything fits
    pub fn fits() -> Self {
        Self::default()
    }

    pub fn all_dont_fit(&self) -> bool {
        self.all_dont_fit
    }

    pub fn fit_terms_inside(&self) -> bool {
        self.fit_terms_inside
    }

    pub fn push_text_outside(&self) -> bool {
        self.push_text_outside
    }

    pub fn text_not_fit(&self) -> bool {
        self.text_not_fit
    }

    /// Clearing the overflow also clears the flags that depend on it
    pub fn set_all_dont_fit(&mut self, value: bool) {
        self.all_dont_fit = value;
        if !value {
            self.fit_terms_inside = false;
            self.push_text_outside = false;
        }
    }

    /// Ignored unless the segment overflows
    pub fn set_fit_terms_inside(&mut self, value: bool) {
        self.fit_terms_inside = value && self.all_dont_fit;
    }

    /// Pushing text out of the span marks the segment as overflowing
    pub fn set_push_text_outside(&mut self, value: bool) {
        if value {
            self.all_dont_fit = true;
        }
        self.push_text_outside = value;
    }

    pub fn set_text_not_fit(&mut self, value: bool) {
        self.text_not_fit = value;
    }

    pub fn is_consistent(&self) -> bool {
        (!self.push_text_outside || self.all_dont_fit)
            && (!self.fit_terms_inside || self.all_dont_fit)
    }
}

/// Running stack offsets
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StackState {
    /// Offset contributed by the segment laid out last
    pub height: f64,
    /// Sum over committed stacked segments
    pub total: f64,
}

/// Running sweep of angular location dimensions
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SweepAccumulator {
    total: f64,
}

impl SweepAccumulator {
    /// Add one segment's sweep and return the sweep from the first ray
    pub fn accumulate(&mut self, sweep: f64) -> f64 {
        self.total += sweep;
        self.total
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Mutable state threaded through every layout step of one stroke.
///
/// Primitives are buffered per segment and only reach the sink once the
/// segment completes, so a failing segment leaves nothing behind.
pub struct LayoutContext<'a> {
    /// Style resolved for the current segment
    pub style: StyleConfiguration,
    /// Dimension rotation
    pub frame: Frame,
    /// Screen axes in world coordinates
    pub view: Frame,
    pub segment: usize,
    pub first_segment: bool,
    pub last_segment: bool,
    pub fit: FitState,
    pub stack: StackState,
    pub sweep: SweepAccumulator,
    /// Defining points of the current segment
    pub points: [DVec3; 4],
    /// Lift applied to the current segment's line by automatic text lift
    pub text_lift: f64,
    metrics: &'a dyn TextMetrics,
    sink: &'a mut dyn Sink,
    pending: Vec<Primitive>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        style: StyleConfiguration,
        frame: Frame,
        view: Frame,
        metrics: &'a dyn TextMetrics,
        sink: &'a mut dyn Sink,
    ) -> Self {
        Self {
            style,
            frame,
            view,
            segment: 0,
            first_segment: true,
            last_segment: true,
            fit: FitState::fits(),
            stack: StackState::default(),
            sweep: SweepAccumulator::default(),
            points: [DVec3::ZERO; 4],
            text_lift: 0.0,
            metrics,
            sink,
            pending: Vec::new(),
        }
    }

    /// Buffer a primitive for the current segment
    pub fn emit(&mut self, primitive: Primitive) {
        self.pending.push(primitive);
    }

    /// Prepare for the next segment
    pub fn begin_segment(&mut self, segment: usize, first: bool, last: bool, style: StyleConfiguration) {
        self.segment = segment;
        self.first_segment = first;
        self.last_segment = last;
        self.style = style;
        self.fit = FitState::fits();
        self.text_lift = 0.0;
        self.pending.clear();
    }

    /// Hand the segment's primitives to the sink
    pub fn commit_segment(&mut self) {
        for primitive in self.pending.drain(..) {
            self.sink.emit(primitive);
        }
    }

    /// Drop the segment's primitives
    pub fn discard_segment(&mut self) {
        self.pending.clear();
    }

    /// Measure text, rejecting sizes a renderer could not honor
    pub fn measure(&self, text: &str) -> Result<TextBlockMetrics> {
        let block = self.metrics.measure(text, &self.style);
        Length::try_non_negative(block.width.raw())
            .and_then(|_| Length::try_non_negative(block.height.raw()))
            .map_err(|source| LayoutError::MeasurementFailure {
                segment: self.segment,
                text: text.to_string(),
                source,
            })?;
        Ok(block)
    }

    pub fn degenerate(&self, reason: &'static str) -> LayoutError {
        LayoutError::DegenerateGeometry {
            segment: self.segment,
            reason,
        }
    }
}
