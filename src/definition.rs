//! Immutable input of one stroke call.

use glam::DVec3;

use crate::errors::{LayoutError, Result};
use crate::types::Frame;

/// Dimension kinds known to the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionKind {
    /// Chained linear dimension: each segment starts where the last ended
    LinearSize,
    /// Linear dimensions all measured from the first point
    LinearLocation,
    AngleSize,
    /// Angular chain that reports arc length
    ArcSize,
    AngleLocation,
    ArcLocation,
    Ordinate,
    LabelLine,
}

impl DimensionKind {
    /// Points needed before anything can be laid out
    pub fn min_points(self) -> usize {
        match self {
            DimensionKind::LinearSize | DimensionKind::LinearLocation => 2,
            DimensionKind::AngleSize
            | DimensionKind::ArcSize
            | DimensionKind::AngleLocation
            | DimensionKind::ArcLocation
            | DimensionKind::Ordinate => 3,
            DimensionKind::LabelLine => 1,
        }
    }

    pub fn is_linear(self) -> bool {
        matches!(self, DimensionKind::LinearSize | DimensionKind::LinearLocation)
    }

    pub fn is_angular(self) -> bool {
        matches!(
            self,
            DimensionKind::AngleSize
                | DimensionKind::ArcSize
                | DimensionKind::AngleLocation
                | DimensionKind::ArcLocation
        )
    }

    /// Location variants measure every segment from the first ray or point
    pub fn is_location(self) -> bool {
        matches!(
            self,
            DimensionKind::LinearLocation
                | DimensionKind::AngleLocation
                | DimensionKind::ArcLocation
        )
    }

    /// Arc kinds report arc length rather than angle
    pub fn is_arc_length(self) -> bool {
        matches!(self, DimensionKind::ArcSize | DimensionKind::ArcLocation)
    }
}

/// Placement of text along the dimension span
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Justification {
    Start,
    #[default]
    Center,
    End,
    /// Dragged by the user: distance of the text from the span start
    Manual(f64),
}

impl Justification {
    pub fn is_manual(self) -> bool {
        matches!(self, Justification::Manual(_))
    }
}

/// Per-segment text settings
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TextDescriptor {
    /// Replacement text; the measured value is used when `None`
    pub content: Option<String>,
    pub justification: Justification,
    /// Height of the dimension line above the measured points
    pub offset: f64,
    /// Vertical displacement of the text from the line
    pub offset_y: f64,
    /// Push unfit text to the right instead of the left
    pub push_right: bool,
    /// Suppress the witness line of this segment
    pub no_witness: bool,
}

impl TextDescriptor {
    pub fn with_offset(offset: f64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }
}

static DEFAULT_TEXT: TextDescriptor = TextDescriptor {
    content: None,
    justification: Justification::Center,
    offset: 0.0,
    offset_y: 0.0,
    push_right: false,
    no_witness: false,
};

/// Everything one stroke call lays out
#[derive(Clone, Debug, PartialEq)]
pub struct DimensionDefinition {
    pub kind: DimensionKind,
    pub points: Vec<DVec3>,
    /// Dimension rotation: x along the measurement, y towards the line
    pub frame: Frame,
    /// Screen axes in world coordinates
    pub view: Frame,
    pub texts: Vec<TextDescriptor>,
}

impl DimensionDefinition {
    pub fn new(kind: DimensionKind, points: Vec<DVec3>) -> Self {
        Self {
            kind,
            points,
            frame: Frame::IDENTITY,
            view: Frame::IDENTITY,
            texts: Vec::new(),
        }
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_view(mut self, view: Frame) -> Self {
        self.view = view;
        self
    }

    pub fn with_text(mut self, index: usize, text: TextDescriptor) -> Self {
        if self.texts.len() <= index {
            self.texts.resize(index + 1, TextDescriptor::default());
        }
        self.texts[index] = text;
        self
    }

    pub fn point(&self, index: usize) -> Option<DVec3> {
        self.points.get(index).copied()
    }

    /// Text descriptor of a point, defaulted when absent
    pub fn text(&self, index: usize) -> &TextDescriptor {
        self.texts.get(index).unwrap_or(&DEFAULT_TEXT)
    }

    pub fn require_points(&self, required: usize) -> Result<()> {
        if self.points.len() < required {
            return Err(LayoutError::TooFewPoints {
                kind: self.kind,
                required,
                found: self.points.len(),
            });
        }
        Ok(())
    }
}
