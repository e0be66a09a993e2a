//! Drawable primitives produced by a stroke, and the sink receiving them.

use std::fmt;

use glam::DVec3;

use crate::metrics::BlockJustification;
use crate::style::GlyphKind;
use crate::types::Frame;

/// Which ends of a segment were pulled back for a terminator glyph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrimCode {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl TrimCode {
    pub fn trims_left(self) -> bool {
        matches!(self, TrimCode::Left | TrimCode::Both)
    }

    pub fn trims_right(self) -> bool {
        matches!(self, TrimCode::Right | TrimCode::Both)
    }
}

/// What a straight segment is part of
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRole {
    DimensionLine,
    Witness,
    Leader,
    /// Line running under text that was pushed outside
    Underline,
}

/// Vertical anchor of a text run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VerticalAnchor {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Anchor point of a text run relative to its block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TextAnchor {
    pub horizontal: BlockJustification,
    pub vertical: VerticalAnchor,
}

impl TextAnchor {
    /// Left edge, vertically centered
    pub const LEFT_MIDDLE: TextAnchor = TextAnchor {
        horizontal: BlockJustification::Left,
        vertical: VerticalAnchor::Middle,
    };

    pub fn new(horizontal: BlockJustification, vertical: VerticalAnchor) -> Self {
        Self { horizontal, vertical }
    }
}

/// One drawable item
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Segment {
        p0: DVec3,
        p1: DVec3,
        trim: TrimCode,
        role: LineRole,
    },
    /// Counter-clockwise arc in the plane of `axes`, angles measured from `axes.x`
    Arc {
        center: DVec3,
        radius: f64,
        axes: Frame,
        start_angle: f64,
        end_angle: f64,
    },
    Terminator {
        point: DVec3,
        direction: DVec3,
        glyph: GlyphKind,
    },
    TextRun {
        origin: DVec3,
        direction: DVec3,
        justification: TextAnchor,
        text: String,
    },
}

impl Primitive {
    pub fn is_segment(&self, role: LineRole) -> bool {
        matches!(self, Primitive::Segment { role: r, .. } if *r == role)
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Primitive::Terminator { .. })
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Primitive::Arc { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Primitive::TextRun { .. })
    }
}

/// Receives primitives in emission order
pub trait Sink {
    fn emit(&mut self, primitive: Primitive);
}

impl Sink for Vec<Primitive> {
    fn emit(&mut self, primitive: Primitive) {
        self.push(primitive);
    }
}

struct P3(DVec3);

impl fmt::Display for P3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", round3(self.0.x), round3(self.0.y), round3(self.0.z))
    }
}

fn round3(v: f64) -> f64 {
    let v = (v * 1000.0).round() / 1000.0;
    if v == 0.0 { 0.0 } else { v }
}

/// One line per primitive, coordinates rounded to three decimals
impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Segment { p0, p1, trim, role } => {
                write!(f, "segment {:?} {} -> {} trim={:?}", role, P3(*p0), P3(*p1), trim)
            }
            Primitive::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                ..
            } => write!(
                f,
                "arc {} r={} {} -> {}",
                P3(*center),
                round3(*radius),
                round3(*start_angle),
                round3(*end_angle)
            ),
            Primitive::Terminator {
                point,
                direction,
                glyph,
            } => write!(f, "terminator {:?} at {} dir {}", glyph, P3(*point), P3(*direction)),
            Primitive::TextRun {
                origin,
                direction,
                text,
                ..
            } => write!(f, "text {:?} at {} dir {}", text, P3(*origin), P3(*direction)),
        }
    }
}
