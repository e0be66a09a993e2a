//! Dimension style configuration and per-segment resolution.

use std::collections::BTreeMap;

use crate::errors::{LayoutError, Result};
use crate::layout::defaults;
use crate::types::Length;

/// Which of {text, terminators} gives way first when space runs out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FitOption {
    #[default]
    MoveTermsFirst,
    MoveTextFirst,
    MoveBoth,
    MoveEither,
    KeepTextInside,
    KeepTermsOutside,
}

/// Where text sits relative to the dimension line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextLocation {
    /// Text breaks the dimension line
    #[default]
    Inline,
    Above,
    Outside,
    TopLeft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TerminatorMode {
    #[default]
    Automatic,
    Reversed,
    Inside,
    Outside,
}

/// Leader ("ball-and-chain") policy for displaced text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BallAndChainMode {
    #[default]
    None,
    On,
    Auto,
}

/// Side the leader elbow points to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ElbowAlignment {
    #[default]
    Auto,
    Left,
    Right,
}

/// Text running direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextOrientation {
    /// Follows the dimension line or arc tangent
    #[default]
    Aligned,
    /// Always screen-horizontal
    Horizontal,
}

/// Linear vertical-text policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VerticalText {
    #[default]
    Never,
    Always,
    WhenNotFit,
}

/// Terminator glyphs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GlyphKind {
    None,
    #[default]
    Arrow,
    Stroke,
    Origin,
    Dot,
}

impl GlyphKind {
    /// Numeric glyph index handed to renderers
    pub fn glyph_index(self) -> u8 {
        match self {
            GlyphKind::None => 0,
            GlyphKind::Arrow => 1,
            GlyphKind::Stroke => 2,
            GlyphKind::Origin => 3,
            GlyphKind::Dot => 4,
        }
    }
}

/// Angle display format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AngleFormat {
    #[default]
    Degrees,
    DegMin,
    DegMinSec,
    Centesimal,
    Radians,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AccuracyMode {
    #[default]
    Fixed,
    /// The accuracy value also picks the angle format
    Floating,
}

/// How label-line directions are written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DirectionMode {
    /// Counter-clockwise from the base direction
    #[default]
    Angle,
    /// Clockwise from north
    Azimuth,
    /// Quadrant bearing, e.g. N45°E
    Bearing,
}

/// Terminator glyph configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminatorStyle {
    pub left: GlyphKind,
    pub right: GlyphKind,
    /// Glyph for the very first terminator of a chain
    pub first: Option<GlyphKind>,
    /// Glyph shared by adjoining segments of a chain
    pub bowtie: Option<GlyphKind>,
    pub width: Length,
    pub height: Length,
    /// Dimension lines stop short of the glyph instead of running through it
    pub no_line_through: bool,
}

impl Default for TerminatorStyle {
    fn default() -> Self {
        Self {
            left: GlyphKind::Arrow,
            right: GlyphKind::Arrow,
            first: None,
            bowtie: None,
            width: defaults::TERMINATOR_WIDTH,
            height: defaults::TERMINATOR_HEIGHT,
            no_line_through: false,
        }
    }
}

/// Number formatting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormatStyle {
    /// Decimal places for lengths
    pub primary_accuracy: u8,
    pub angle_format: AngleFormat,
    pub angle_accuracy: u8,
    pub accuracy_mode: AccuracyMode,
    pub leading_zero: bool,
    pub trailing_zeros: bool,
    /// Multiplier applied to measured lengths
    pub scale: f64,
}

impl Default for FormatStyle {
    fn default() -> Self {
        Self {
            primary_accuracy: 2,
            angle_format: AngleFormat::Degrees,
            angle_accuracy: 0,
            accuracy_mode: AccuracyMode::Fixed,
            leading_zero: true,
            trailing_zeros: true,
            scale: 1.0,
        }
    }
}

/// Ordinate-only settings
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct OrdinateStyle {
    pub free_location: bool,
    pub start_value: f64,
    pub datum_value: Option<f64>,
    pub reverse_decrement: bool,
}

/// Label-line-only settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelLineStyle {
    pub suppress_angle: bool,
    pub suppress_length: bool,
    pub invert_labels: bool,
    pub adjacent_labels: bool,
    pub direction_mode: DirectionMode,
    /// Base direction in degrees
    pub base_direction: f64,
    pub clockwise: bool,
}

impl Default for LabelLineStyle {
    fn default() -> Self {
        Self {
            suppress_angle: false,
            suppress_length: false,
            invert_labels: false,
            adjacent_labels: true,
            direction_mode: DirectionMode::Angle,
            base_direction: 0.0,
            clockwise: false,
        }
    }
}

/// Complete style for one dimension (or one segment after resolution)
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfiguration {
    pub text_height: Length,
    pub char_width: Length,
    /// Gap kept around text
    pub text_margin: Length,
    /// Lift of text above the line for non-inline locations
    pub text_lift: Length,
    /// Minimum leader length, also used as the ordinate dog-leg length
    pub min_leader: Length,
    pub witness_offset: Length,
    pub witness_extend: Length,
    /// Explicit stack offset; computed from the text box when unset
    pub stack_offset: Option<Length>,
    /// Explicit ball-and-chain elbow length
    pub elbow_length: Option<Length>,

    pub fit_option: FitOption,
    pub text_location: TextLocation,
    pub terminator_mode: TerminatorMode,
    pub ball_and_chain: BallAndChainMode,
    pub elbow_alignment: ElbowAlignment,
    pub orientation: TextOrientation,
    pub vertical_text: VerticalText,

    pub ignore_min_leader: bool,
    pub tight_fit_text_above: bool,
    pub fit_inclined_text_box: bool,
    pub suppress_unfit_terminators: bool,
    pub extend_dim_line_under_text: bool,
    /// Lift unfit text above the line instead of pushing it sideways
    pub text_lift_when_outside: bool,
    pub no_auto_text_lift: bool,
    /// Draw the line between the witnesses even when terminators are outside
    pub joiner: bool,
    /// Location dimensions stack each segment above the previous one
    pub stacked: bool,
    pub box_text: bool,
    /// Angular: sweep runs clockwise from the start ray
    pub clockwise: bool,
    /// Angular: ray quadrant, 0 to 3
    pub quadrant: u8,
    /// Angular: chord witnesses for small arc-size dimensions
    pub chord_witnesses: bool,
    /// Angular: build the sweep frame from 3-D rays instead of the drawing plane
    pub in_3d: bool,

    pub terminators: TerminatorStyle,
    pub format: FormatStyle,
    pub ordinate: OrdinateStyle,
    pub label_line: LabelLineStyle,
}

impl Default for StyleConfiguration {
    fn default() -> Self {
        Self {
            text_height: defaults::TEXT_HEIGHT,
            char_width: defaults::CHAR_WIDTH,
            text_margin: defaults::TEXT_MARGIN,
            text_lift: defaults::TEXT_LIFT,
            min_leader: defaults::MIN_LEADER,
            witness_offset: defaults::WITNESS_OFFSET,
            witness_extend: defaults::WITNESS_EXTEND,
            stack_offset: None,
            elbow_length: None,
            fit_option: FitOption::default(),
            text_location: TextLocation::default(),
            terminator_mode: TerminatorMode::default(),
            ball_and_chain: BallAndChainMode::default(),
            elbow_alignment: ElbowAlignment::default(),
            orientation: TextOrientation::default(),
            vertical_text: VerticalText::default(),
            ignore_min_leader: false,
            tight_fit_text_above: false,
            fit_inclined_text_box: false,
            suppress_unfit_terminators: false,
            extend_dim_line_under_text: false,
            text_lift_when_outside: false,
            no_auto_text_lift: false,
            joiner: true,
            stacked: false,
            box_text: false,
            clockwise: false,
            quadrant: 0,
            chord_witnesses: false,
            in_3d: false,
            terminators: TerminatorStyle::default(),
            format: FormatStyle::default(),
            ordinate: OrdinateStyle::default(),
            label_line: LabelLineStyle::default(),
        }
    }
}

impl StyleConfiguration {
    pub fn is_horizontal_text(&self) -> bool {
        self.orientation == TextOrientation::Horizontal
    }

    pub fn is_inline(&self) -> bool {
        self.text_location == TextLocation::Inline
    }

    /// Ball-and-chain is requested outright or on demand
    pub fn wants_leader(&self) -> bool {
        self.ball_and_chain != BallAndChainMode::None
    }

    pub fn is_auto_leader(&self) -> bool {
        self.ball_and_chain == BallAndChainMode::Auto
    }

    fn apply(&mut self, property: StyleProperty, value: StyleValue, segment: usize) -> Result<()> {
        let mismatch = |expected| LayoutError::InvalidStyle {
            property,
            segment,
            expected,
        };
        match (property, value) {
            (StyleProperty::TextMargin, StyleValue::Length(v)) => self.text_margin = v,
            (StyleProperty::TextLift, StyleValue::Length(v)) => self.text_lift = v,
            (StyleProperty::MinLeader, StyleValue::Length(v)) => self.min_leader = v,
            (StyleProperty::WitnessOffset, StyleValue::Length(v)) => self.witness_offset = v,
            (StyleProperty::WitnessExtend, StyleValue::Length(v)) => self.witness_extend = v,
            (StyleProperty::StackOffset, StyleValue::Length(v)) => self.stack_offset = Some(v),
            (StyleProperty::ElbowLength, StyleValue::Length(v)) => self.elbow_length = Some(v),
            (StyleProperty::FitOption, StyleValue::Fit(v)) => self.fit_option = v,
            (StyleProperty::TextLocation, StyleValue::Location(v)) => self.text_location = v,
            (StyleProperty::TerminatorMode, StyleValue::Terminators(v)) => {
                self.terminator_mode = v
            }
            (StyleProperty::BallAndChain, StyleValue::BallAndChain(v)) => {
                self.ball_and_chain = v
            }
            (StyleProperty::Orientation, StyleValue::Orientation(v)) => self.orientation = v,
            (StyleProperty::IgnoreMinLeader, StyleValue::Flag(v)) => self.ignore_min_leader = v,
            (StyleProperty::SuppressUnfitTerminators, StyleValue::Flag(v)) => {
                self.suppress_unfit_terminators = v
            }
            (StyleProperty::Joiner, StyleValue::Flag(v)) => self.joiner = v,
            (property, _) => return Err(mismatch(property.expected())),
        }
        Ok(())
    }
}

/// Properties that may be overridden per segment
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleProperty {
    TextMargin,
    TextLift,
    MinLeader,
    WitnessOffset,
    WitnessExtend,
    StackOffset,
    ElbowLength,
    FitOption,
    TextLocation,
    TerminatorMode,
    BallAndChain,
    Orientation,
    IgnoreMinLeader,
    SuppressUnfitTerminators,
    Joiner,
}

impl StyleProperty {
    fn expected(self) -> &'static str {
        match self {
            StyleProperty::TextMargin
            | StyleProperty::TextLift
            | StyleProperty::MinLeader
            | StyleProperty::WitnessOffset
            | StyleProperty::WitnessExtend
            | StyleProperty::StackOffset
            | StyleProperty::ElbowLength => "length",
            StyleProperty::FitOption => "fit option",
            StyleProperty::TextLocation => "text location",
            StyleProperty::TerminatorMode => "terminator mode",
            StyleProperty::BallAndChain => "ball-and-chain mode",
            StyleProperty::Orientation => "text orientation",
            StyleProperty::IgnoreMinLeader
            | StyleProperty::SuppressUnfitTerminators
            | StyleProperty::Joiner => "flag",
        }
    }
}

/// Override value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StyleValue {
    Length(Length),
    Flag(bool),
    Fit(FitOption),
    Location(TextLocation),
    Terminators(TerminatorMode),
    BallAndChain(BallAndChainMode),
    Orientation(TextOrientation),
}

/// Resolves the style of one segment
pub trait StyleResolver {
    /// Dimension-wide configuration
    fn base(&self) -> &StyleConfiguration;

    /// Segment-specific override, if any
    fn override_for(&self, segment: usize, property: StyleProperty) -> Option<StyleValue>;

    /// Properties that carry overrides for `segment`
    fn overridden(&self, segment: usize) -> Vec<StyleProperty>;

    /// Base configuration with every override of `segment` applied
    fn resolve(&self, segment: usize) -> Result<StyleConfiguration> {
        let mut style = self.base().clone();
        for property in self.overridden(segment) {
            if let Some(value) = self.override_for(segment, property) {
                style.apply(property, value, segment)?;
            }
        }
        Ok(style)
    }
}

impl StyleResolver for StyleConfiguration {
    fn base(&self) -> &StyleConfiguration {
        self
    }

    fn override_for(&self, _segment: usize, _property: StyleProperty) -> Option<StyleValue> {
        None
    }

    fn overridden(&self, _segment: usize) -> Vec<StyleProperty> {
        Vec::new()
    }
}

/// Base style plus per-segment overrides
#[derive(Clone, Debug, Default)]
pub struct OverrideTable {
    pub base: StyleConfiguration,
    overrides: BTreeMap<(usize, StyleProperty), StyleValue>,
}

impl OverrideTable {
    pub fn new(base: StyleConfiguration) -> Self {
        Self {
            base,
            overrides: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, segment: usize, property: StyleProperty, value: StyleValue) -> &mut Self {
        self.overrides.insert((segment, property), value);
        self
    }
}

impl StyleResolver for OverrideTable {
    fn base(&self) -> &StyleConfiguration {
        &self.base
    }

    fn override_for(&self, segment: usize, property: StyleProperty) -> Option<StyleValue> {
        self.overrides.get(&(segment, property)).copied()
    }

    fn overridden(&self, segment: usize) -> Vec<StyleProperty> {
        self.overrides
            .range((segment, StyleProperty::TextMargin)..=(segment, StyleProperty::Joiner))
            .map(|((_, property), _)| *property)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_resolves_to_itself() {
        let style = StyleConfiguration::default();
        assert_eq!(style.resolve(3).unwrap(), style);
    }

    #[test]
    fn overrides_apply_only_to_their_segment() {
        let mut table = OverrideTable::new(StyleConfiguration::default());
        table
            .set(1, StyleProperty::FitOption, StyleValue::Fit(FitOption::MoveEither))
            .set(1, StyleProperty::TextMargin, StyleValue::Length(Length(0.25)));

        let first = table.resolve(0).unwrap();
        let second = table.resolve(1).unwrap();
        assert_eq!(first.fit_option, FitOption::MoveTermsFirst);
        assert_eq!(second.fit_option, FitOption::MoveEither);
        assert_eq!(second.text_margin, Length(0.25));
    }

    #[test]
    fn mistyped_override_is_rejected() {
        let mut table = OverrideTable::new(StyleConfiguration::default());
        table.set(0, StyleProperty::MinLeader, StyleValue::Flag(true));
        let err = table.resolve(0).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidStyle {
                property: StyleProperty::MinLeader,
                segment: 0,
                expected: "length",
            }
        );
    }

    #[test]
    fn glyph_indices_are_distinct() {
        let all = [
            GlyphKind::None,
            GlyphKind::Arrow,
            GlyphKind::Stroke,
            GlyphKind::Origin,
            GlyphKind::Dot,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.glyph_index(), b.glyph_index());
            }
        }
    }
}
