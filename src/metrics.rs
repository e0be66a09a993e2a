//! Text measurement.
//!
//! Layout only needs the size of a text block. Hosts with real fonts supply
//! their own [`TextMetrics`]; [`ProportionalMetrics`] approximates a sans font
//! with a per-character width table.

use crate::layout::defaults;
use crate::style::StyleConfiguration;
use crate::types::Length;

/// Horizontal justification of a text block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlockJustification {
    #[default]
    Left,
    Center,
    Right,
}

/// Measured size of a text block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBlockMetrics {
    pub width: Length,
    pub height: Length,
    pub multiline: bool,
    pub justification: BlockJustification,
}

impl TextBlockMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Length(width),
            height: Length(height),
            multiline: false,
            justification: BlockJustification::Left,
        }
    }
}

/// Measures rendered text
pub trait TextMetrics {
    fn measure(&self, text: &str, style: &StyleConfiguration) -> TextBlockMetrics;
}

/// Character widths in hundredths of the char width, for ' ' through '~'.
#[rustfmt::skip]
pub const AW_CHAR: [u8; 95] = [
    45,  55,  62, 115,  90, 132, 125,  40,
    55,  55,  71, 115,  45,  48,  45,  50,
    91,  91,  91,  91,  91,  91,  91,  91,
    91,  91,  50,  50, 120, 120, 120,  78,
   142, 102, 105, 110, 115, 105,  98, 105,
   125,  58,  58, 107,  95, 145, 125, 115,
    95, 115, 107,  95,  97, 118, 102, 150,
   100,  93, 100,  58,  50,  58, 119,  72,
    72,  86,  92,  80,  92,  85,  52,  92,
    92,  47,  47,  88,  48, 135,  92,  86,
    92,  92,  69,  75,  58,  92,  80, 121,
    81,  80,  76,  91,  49,  91, 118,
];

/// Width of one line in hundredths of the char width.
/// Characters outside printable ASCII count as a full char width.
pub fn line_length_hundredths(line: &str) -> u32 {
    line.chars()
        .map(|c| {
            if (' '..='~').contains(&c) {
                AW_CHAR[(c as usize) - 0x20] as u32
            } else {
                100
            }
        })
        .sum()
}

/// Table-driven measurement in units of the style's char width and height
#[derive(Clone, Copy, Debug, Default)]
pub struct ProportionalMetrics {
    pub justification: BlockJustification,
}

impl TextMetrics for ProportionalMetrics {
    fn measure(&self, text: &str, style: &StyleConfiguration) -> TextBlockMetrics {
        let char_width = style.char_width.raw();
        let text_height = style.text_height.raw();
        let lines: Vec<&str> = text.lines().collect();
        let count = lines.len().max(1);
        let width = lines
            .iter()
            .map(|l| line_length_hundredths(l) as f64 * char_width * 0.01)
            .fold(0.0, f64::max);
        let gaps = (count - 1) as f64 * defaults::LINE_SPACING * text_height;
        TextBlockMetrics {
            width: Length(width),
            height: Length(count as f64 * text_height + gaps),
            multiline: count > 1,
            justification: if count > 1 {
                self.justification
            } else {
                BlockJustification::Left
            },
        }
    }
}

/// Fixed-size measurement: every character is exactly one char width
#[derive(Clone, Copy, Debug, Default)]
pub struct MonospaceMetrics;

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, text: &str, style: &StyleConfiguration) -> TextBlockMetrics {
        let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let count = text.lines().count().max(1);
        let h = style.text_height.raw();
        TextBlockMetrics {
            width: Length(longest as f64 * style.char_width.raw()),
            height: Length(count as f64 * h + (count - 1) as f64 * defaults::LINE_SPACING * h),
            multiline: count > 1,
            justification: BlockJustification::Left,
        }
    }
}
