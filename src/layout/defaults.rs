//! Default sizes and tuning constants (drawing units, inch-based)

use crate::types::Length;

pub const TEXT_HEIGHT: Length = Length::units(0.14);
pub const CHAR_WIDTH: Length = Length::units(0.08);
pub const TEXT_MARGIN: Length = Length::units(0.04);
pub const TEXT_LIFT: Length = Length::units(0.04);
pub const MIN_LEADER: Length = Length::units(0.0);
pub const WITNESS_OFFSET: Length = Length::units(0.0);
pub const WITNESS_EXTEND: Length = Length::units(0.06);
pub const TERMINATOR_WIDTH: Length = Length::units(0.08);
pub const TERMINATOR_HEIGHT: Length = Length::units(0.04);

/// Line pieces shorter than this are dropped as stubs
pub const MIN_STUB_LENGTH: f64 = 1e-6;

/// Multiples of the char width used when a length is unset
pub const LEADER_CHARS: f64 = 3.0;

/// Angular fit margin relative to the text margin
pub const ARC_FIT_MARGIN: f64 = 0.8;
/// Chord margin: terminator width plus this fraction of the text margin
pub const CHORD_MARGIN: f64 = 0.4;

/// Slant of the automatic ball-and-chain for horizontal angular text
pub const AUTO_LEADER_SLANT: f64 = 0.174_532_925;

/// sin(5°): tangents closer than this to an axis count as orthogonal
pub const ORTHOGONAL_SINE: f64 = 0.087_155_7;

/// Line spacing of multi-line text blocks, relative to text height
pub const LINE_SPACING: f64 = 0.5;
