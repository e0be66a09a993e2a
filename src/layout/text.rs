//! Text position composer.
//!
//! Decides where the measurement text goes along the span, how it runs,
//! how far it sits off the line and whether a leader has to fetch it.

use glam::DVec3;

use super::context::{FitState, LayoutContext};
use super::defaults;
use super::fit::{effective_min_leaders, intersect_length};
use super::segment::ArcParams;
use crate::definition::Justification;
use crate::log::debug;
use crate::metrics::BlockJustification;
use crate::output::{Primitive, TextAnchor};
use crate::style::{ElbowAlignment, FitOption, StyleConfiguration, TerminatorMode};
use crate::types::{EPSILON, Frame, Size2, reading_direction, safe_div};

/// Text after placement
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedText {
    /// Left end of the text, vertically centered
    pub origin: DVec3,
    /// Running direction
    pub direction: DVec3,
    pub up: DVec3,
    pub size: Size2,
    pub content: String,
    /// Start of the text band along the span, margins included
    pub left_edge: f64,
    /// Length of the text band along the span
    pub extent: f64,
}

impl PlacedText {
    pub fn emit(&self, ctx: &mut LayoutContext<'_>) {
        ctx.emit(Primitive::TextRun {
            origin: self.origin,
            direction: self.direction,
            justification: TextAnchor::LEFT_MIDDLE,
            text: self.content.clone(),
        });
    }

    /// Middle of the text block
    pub fn center(&self) -> DVec3 {
        self.origin + self.direction * (self.size.x / 2.0)
    }

    /// Text ends grown by `margin`, left then right
    pub fn ends(&self, margin: f64) -> (DVec3, DVec3) {
        (
            self.origin - self.direction * margin,
            self.origin + self.direction * (self.size.x + margin),
        )
    }
}

// ============================================================================
// Offset along the span
// ============================================================================

/// What [`calc_text_offset`] needs to know about one segment
#[derive(Clone, Copy, Debug)]
pub struct OffsetRequest {
    pub justification: Justification,
    pub push_right: bool,
    /// Available length (arc length for arcs)
    pub span: f64,
    /// Length the text band claims, margins included
    pub string_len: f64,
    pub text_height: f64,
    pub angular: bool,
}

/// Offset of the text band from the span start
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextOffset {
    pub along: f64,
    /// Height of an automatic ball-and-chain, when one was chosen
    pub lift: Option<f64>,
}

/// Whether the fit state lets the text leave its justified position
fn text_must_move(style: &StyleConfiguration, fit: &FitState) -> bool {
    let allowed = style.terminator_mode == TerminatorMode::Automatic || style.is_auto_leader();
    if !allowed {
        return false;
    }
    if fit.text_not_fit() && style.fit_option != FitOption::KeepTextInside {
        return true;
    }
    fit.all_dont_fit()
        && (matches!(style.fit_option, FitOption::MoveTextFirst | FitOption::MoveBoth)
            || (fit.fit_terms_inside()
                && matches!(style.fit_option, FitOption::MoveTextFirst | FitOption::MoveEither)))
}

/// Place the text band along the span and update the fit state when it
/// gets pushed out.
pub fn calc_text_offset(style: &StyleConfiguration, fit: &mut FitState, req: &OffsetRequest) -> TextOffset {
    let cw = style.char_width.raw();
    let span = req.span;
    let len = req.string_len;

    if let Justification::Manual(along) = req.justification {
        return TextOffset { along, lift: None };
    }

    if text_must_move(style, fit) {
        if style.is_auto_leader() {
            return auto_leader_offset(style, req);
        }
        let leaders = effective_min_leaders(style, req.angular, fit.fit_terms_inside());
        let to_right =
            req.justification == Justification::End || (!req.angular && req.push_right);
        let along = if to_right {
            span + leaders.outside
        } else {
            -(len + leaders.outside)
        };
        fit.set_push_text_outside(true);
        return TextOffset { along, lift: None };
    }

    if req.angular && style.fit_option == FitOption::KeepTextInside && fit.text_not_fit() {
        fit.set_push_text_outside(true);
        return TextOffset {
            along: 0.5 * (len - span),
            lift: None,
        };
    }

    let along = match req.justification {
        Justification::Start => defaults::LEADER_CHARS * cw,
        Justification::End => span - defaults::LEADER_CHARS * cw - len,
        _ => (span - len) / 2.0,
    };
    TextOffset { along, lift: None }
}

fn auto_leader_offset(style: &StyleConfiguration, req: &OffsetRequest) -> TextOffset {
    let h = req.text_height;
    let lift_gap = style.text_lift.raw();
    if req.angular {
        let tw = style.terminators.width.raw();
        return TextOffset {
            along: (req.span - req.string_len) / 2.0,
            lift: Some(2.0 * tw + lift_gap + h / 2.0),
        };
    }
    let elbow = elbow_length(style);
    let mut along = req.span / 2.0;
    if !style.is_horizontal_text() {
        along += 0.3 * lift_gap;
    }
    let along = if req.justification == Justification::End || req.push_right {
        along + elbow
    } else {
        along - elbow - req.string_len
    };
    TextOffset {
        along,
        lift: Some(style.witness_extend.raw() + 0.5 * (h + lift_gap) + 0.5 * h),
    }
}

/// Elbow of a ball-and-chain leader
pub fn elbow_length(style: &StyleConfiguration) -> f64 {
    if let Some(len) = style.elbow_length {
        return len.raw();
    }
    let min_leader = style.min_leader.raw();
    if min_leader > 0.0 {
        min_leader
    } else {
        defaults::LEADER_CHARS * style.char_width.raw()
    }
}

/// Shift from a justification anchor to the left edge of a block
pub fn left_edge_offset(offset: f64, width: f64, block: BlockJustification) -> f64 {
    match block {
        BlockJustification::Left => offset,
        BlockJustification::Center => offset - width / 2.0,
        BlockJustification::Right => offset - width,
    }
}

/// Vertical room one stacked segment takes
pub fn stack_offset(style: &StyleConfiguration, size: Size2, check: DVec3, angular: bool) -> f64 {
    if let Some(explicit) = style.stack_offset {
        return explicit.raw();
    }
    let m = style.text_margin.raw();
    let cw = style.char_width.raw();
    let (w, h) = (size.x, size.y);
    let mut offset = if style.is_horizontal_text() {
        if (check.x * w).abs() > (check.y * h).abs() {
            safe_div(h + 2.0 * m, check.x).abs()
        } else {
            safe_div(w + 2.0 * m, check.y).abs()
        }
    } else {
        h + m
    };
    if style.box_text {
        offset += cw;
    }
    if angular || !style.is_inline() {
        offset += cw;
    }
    offset
}

/// A leader is needed to reach text dragged off the line
pub fn needs_leader(style: &StyleConfiguration, offset_y: f64, text_height: f64) -> bool {
    style.wants_leader()
        && offset_y.abs() > EPSILON
        && (style.is_auto_leader() || offset_y.abs() > text_height / 2.0)
}

// ============================================================================
// Linear placement
// ============================================================================

/// A linear segment's line, as the composer sees it
#[derive(Clone, Copy, Debug)]
pub struct LinearFrame {
    /// Start of the dimension line
    pub origin: DVec3,
    /// Unit direction from start to end
    pub direction: DVec3,
    /// Unit direction from the measured points towards the line
    pub normal: DVec3,
    /// Drawing-plane normal
    pub plane: DVec3,
}

/// Length of the text band along a linear dimension
pub fn linear_string_len(style: &StyleConfiguration, size: Size2, direction: DVec3, view: &Frame) -> f64 {
    let m = style.text_margin.raw();
    if style.is_horizontal_text() {
        intersect_length(view.to_local(direction), size, 2.0 * m)
    } else {
        size.x + 2.0 * m
    }
}

/// Put the text of a linear segment in place.
///
/// `lift` raises the text band off the line along `normal` before the
/// text location shift is applied.
#[allow(clippy::too_many_arguments)]
pub fn place_linear_text(
    style: &StyleConfiguration,
    view: &Frame,
    line: &LinearFrame,
    size: Size2,
    content: String,
    offset: TextOffset,
    extent: f64,
    lift: f64,
) -> PlacedText {
    let m = style.text_margin.raw();
    let (w, h) = (size.x, size.y);
    let band_center = line.origin + line.direction * (offset.along + extent / 2.0) + line.normal * lift;

    let (direction, up, center) = if style.is_horizontal_text() {
        let td = view.x;
        let up = view.y;
        let mut center = band_center;
        if !style.is_inline() {
            let n = view.to_local(line.normal);
            let shift = n.x.abs() * (w / 2.0 + m) + n.y.abs() * (h / 2.0 + style.text_lift.raw());
            center += line.normal * shift;
        }
        (td, up, center)
    } else {
        let (td, _) = reading_direction(line.direction, view);
        let mut up = line.plane.cross(td);
        if up.dot(line.normal) < 0.0 {
            up = -up;
        }
        let mut center = band_center;
        if !style.is_inline() {
            center += line.normal * (h / 2.0 + m);
        }
        (td, up, center)
    };

    let placed = PlacedText {
        origin: center - direction * (w / 2.0),
        direction,
        up,
        size,
        content,
        left_edge: offset.along,
        extent,
    };
    debug!(
        along = offset.along,
        extent,
        lift,
        "placed linear text"
    );
    placed
}

/// Text standing along the witness direction at one end of the line
pub fn place_vertical_text(
    style: &StyleConfiguration,
    view: &Frame,
    anchor: DVec3,
    normal: DVec3,
    along: DVec3,
    size: Size2,
    content: String,
) -> PlacedText {
    let margin = style.witness_extend.raw() + style.char_width.raw() / 2.0;
    let (td, reversed) = reading_direction(normal, view);
    let origin = if reversed {
        anchor - td * (size.x + margin)
    } else {
        anchor + td * margin
    };
    let mut up = along;
    if view.to_local(up).y < 0.0 || (view.to_local(up).y.abs() < EPSILON && view.to_local(up).x < 0.0) {
        up = -up;
    }
    PlacedText {
        origin,
        direction: td,
        up,
        size,
        content,
        left_edge: 0.0,
        extent: 0.0,
    }
}

// ============================================================================
// Angular placement
// ============================================================================

/// Text placed on or near an arc, with its angular footprint
#[derive(Clone, Debug, PartialEq)]
pub struct ArcText {
    pub text: PlacedText,
    /// Angle where the footprint starts
    pub text_offset: f64,
    /// Angular footprint, signed
    pub text_sweep: f64,
    /// Point on the arc the text belongs to
    pub anchor: DVec3,
    /// Text width projected onto the arc tangent
    pub projected_width: f64,
    /// Text sits across the arc
    pub crosses_arc: bool,
}

/// Place the text of an angular segment.
///
/// `offset.along` is an arc length from the start ray. Leadered text is
/// lifted along a slanted radial so the chain does not run along the arc.
pub fn place_angular_text(
    style: &StyleConfiguration,
    view: &Frame,
    arc: &ArcParams,
    size: Size2,
    content: String,
    offset: TextOffset,
    string_len: f64,
) -> ArcText {
    let m = style.text_margin.raw();
    let (w, h) = (size.x, size.y);
    let r = arc.radius;
    let text_offset = offset.along / r;
    let text_sweep = string_len / r;
    let theta = text_offset + text_sweep / 2.0;
    let anchor = arc.point_at(theta);
    let radial = arc.axes.direction_at(theta);
    let tangent = arc.tangent_at(theta);
    let t_view = view.to_local(tangent);
    let projected_width = (w + 2.0 * m) * t_view.x.abs() + (h + 2.0 * m) * t_view.y.abs();

    let horizontal = style.is_horizontal_text();
    let (direction, up) = if horizontal {
        (view.x, view.y)
    } else {
        let (td, _) = reading_direction(tangent, view);
        let mut up = arc.axes.z.cross(td);
        if up.dot(radial) < 0.0 {
            up = -up;
        }
        (td, up)
    };

    let mut center = anchor;
    if let Some(lift) = offset.lift {
        let slant = if horizontal { defaults::AUTO_LEADER_SLANT } else { 0.0 };
        let leaning = arc.axes.direction_at(theta + slant);
        center += leaning * lift;
    } else if !style.is_inline() {
        if horizontal {
            let n = view.to_local(radial);
            center += radial * (n.x.abs() * (w / 2.0 + m) + n.y.abs() * (h / 2.0 + m));
        } else {
            center += radial * (h / 2.0 + m);
        }
    }

    ArcText {
        text: PlacedText {
            origin: center - direction * (w / 2.0),
            direction,
            up,
            size,
            content,
            left_edge: offset.along,
            extent: string_len,
        },
        text_offset,
        text_sweep,
        anchor,
        projected_width,
        crosses_arc: style.is_inline() && offset.lift.is_none(),
    }
}

/// Side of the text a leader attaches to
pub fn leader_attaches_left(style: &StyleConfiguration, text: &PlacedText, from: DVec3) -> bool {
    match style.elbow_alignment {
        ElbowAlignment::Left => true,
        ElbowAlignment::Right => false,
        ElbowAlignment::Auto => (from - text.center()).dot(text.direction) < 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Length;
    use glam::{dvec2, dvec3};

    fn style() -> StyleConfiguration {
        StyleConfiguration {
            text_margin: Length(0.5),
            min_leader: Length(1.0),
            char_width: Length(1.0),
            ..StyleConfiguration::default()
        }
    }

    fn request(span: f64, justification: Justification) -> OffsetRequest {
        OffsetRequest {
            justification,
            push_right: false,
            span,
            string_len: 4.0,
            text_height: 1.0,
            angular: false,
        }
    }

    fn flat_line() -> LinearFrame {
        LinearFrame {
            origin: DVec3::ZERO,
            direction: DVec3::X,
            normal: DVec3::Y,
            plane: DVec3::Z,
        }
    }

    // ==================== Offset tests ====================

    #[test]
    fn justified_offsets() {
        let style = style();
        let mut fit = FitState::fits();
        let center = calc_text_offset(&style, &mut fit, &request(12.0, Justification::Center));
        assert_eq!(center.along, 4.0);
        // start and end sit three character widths in from their witness
        let start = calc_text_offset(&style, &mut fit, &request(12.0, Justification::Start));
        assert_eq!(start.along, 3.0);
        let end = calc_text_offset(&style, &mut fit, &request(12.0, Justification::End));
        assert_eq!(end.along, 5.0);
        let manual = calc_text_offset(&style, &mut fit, &request(10.0, Justification::Manual(-2.0)));
        assert_eq!(manual.along, -2.0);
        assert!(!fit.all_dont_fit());
    }

    #[test]
    fn unfit_text_is_pushed_out_left() {
        let style = style();
        let mut fit = FitState::fits();
        fit.set_all_dont_fit(true);
        fit.set_text_not_fit(true);
        let offset = calc_text_offset(&style, &mut fit, &request(2.0, Justification::Center));
        assert_eq!(offset.along, -5.0);
        assert!(fit.push_text_outside());
        assert!(fit.is_consistent());
    }

    #[test]
    fn unfit_text_is_pushed_out_right() {
        let style = style();
        let mut fit = FitState::fits();
        fit.set_text_not_fit(true);
        let mut req = request(2.0, Justification::Center);
        req.push_right = true;
        let offset = calc_text_offset(&style, &mut fit, &req);
        assert_eq!(offset.along, 3.0);
        assert!(fit.all_dont_fit());
    }

    #[test]
    fn keep_text_inside_never_pushes_linear_text() {
        let mut style = style();
        style.fit_option = FitOption::KeepTextInside;
        let mut fit = FitState::fits();
        fit.set_all_dont_fit(true);
        fit.set_text_not_fit(true);
        let offset = calc_text_offset(&style, &mut fit, &request(2.0, Justification::Center));
        assert_eq!(offset.along, -1.0);
        assert!(!fit.push_text_outside());
    }

    #[test]
    fn auto_leader_lifts_text() {
        let mut style = style();
        style.ball_and_chain = crate::style::BallAndChainMode::Auto;
        let mut fit = FitState::fits();
        fit.set_text_not_fit(true);
        let offset = calc_text_offset(&style, &mut fit, &request(2.0, Justification::Center));
        assert!(offset.lift.is_some_and(|l| l > 0.0));
        assert!(!fit.push_text_outside());
    }

    #[test]
    fn block_justification_shifts_left_edge() {
        assert_eq!(left_edge_offset(5.0, 2.0, BlockJustification::Left), 5.0);
        assert_eq!(left_edge_offset(5.0, 2.0, BlockJustification::Center), 4.0);
        assert_eq!(left_edge_offset(5.0, 2.0, BlockJustification::Right), 3.0);
    }

    // ==================== Stack tests ====================

    #[test]
    fn stack_offset_of_aligned_inline_text() {
        let style = style();
        assert_eq!(stack_offset(&style, dvec2(3.0, 1.0), DVec3::X, false), 1.5);
    }

    #[test]
    fn explicit_stack_offset_wins() {
        let mut style = style();
        style.stack_offset = Some(Length(7.0));
        assert_eq!(stack_offset(&style, dvec2(3.0, 1.0), DVec3::X, true), 7.0);
    }

    #[test]
    fn box_and_angular_text_add_char_widths() {
        let mut style = style();
        style.box_text = true;
        assert_eq!(stack_offset(&style, dvec2(3.0, 1.0), DVec3::X, true), 3.5);
    }

    #[test]
    fn leader_needs_real_displacement() {
        let mut style = style();
        assert!(!needs_leader(&style, 5.0, 1.0));
        style.ball_and_chain = crate::style::BallAndChainMode::On;
        assert!(!needs_leader(&style, 0.2, 1.0));
        assert!(needs_leader(&style, 2.0, 1.0));
    }

    // ==================== Placement tests ====================

    #[test]
    fn centered_aligned_text_straddles_the_midpoint() {
        let style = style();
        let offset = TextOffset { along: 3.0, lift: None };
        let text = place_linear_text(
            &style,
            &Frame::IDENTITY,
            &flat_line(),
            dvec2(3.0, 1.0),
            "5.00".into(),
            offset,
            4.0,
            0.0,
        );
        assert!((text.origin - dvec3(3.5, 0.0, 0.0)).length() < 1e-12);
        assert_eq!(text.direction, DVec3::X);
        assert_eq!(text.up, DVec3::Y);
    }

    #[test]
    fn text_above_is_lifted_off_the_line() {
        let mut style = style();
        style.text_location = crate::style::TextLocation::Above;
        let offset = TextOffset { along: 3.0, lift: None };
        let text = place_linear_text(
            &style,
            &Frame::IDENTITY,
            &flat_line(),
            dvec2(3.0, 1.0),
            "5.00".into(),
            offset,
            4.0,
            0.0,
        );
        assert!((text.origin.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn leftward_line_text_still_reads_left_to_right() {
        let style = style();
        let line = LinearFrame {
            origin: dvec3(10.0, 0.0, 0.0),
            direction: -DVec3::X,
            normal: DVec3::Y,
            plane: DVec3::Z,
        };
        let offset = TextOffset { along: 3.0, lift: None };
        let text = place_linear_text(&style, &Frame::IDENTITY, &line, dvec2(3.0, 1.0), "x".into(), offset, 4.0, 0.0);
        assert_eq!(text.direction, DVec3::X);
        assert!(text.up.y > 0.0);
        assert!((text.center() - dvec3(5.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn aligned_arc_text_follows_the_tangent() {
        let style = style();
        let arc = ArcParams {
            center: DVec3::ZERO,
            radius: 10.0,
            axes: Frame::IDENTITY,
            sweep: std::f64::consts::PI,
        };
        let span = arc.arc_length();
        let offset = TextOffset {
            along: (span - 4.0) / 2.0,
            lift: None,
        };
        let placed = place_angular_text(&style, &Frame::IDENTITY, &arc, dvec2(3.0, 1.0), "90".into(), offset, 4.0);
        // top of the half circle: tangent points left, reversed for reading
        assert!((placed.text.direction - DVec3::X).length() < 1e-9);
        assert!((placed.anchor - dvec3(0.0, 10.0, 0.0)).length() < 1e-9);
        assert!((placed.text_sweep - 0.4).abs() < 1e-12);
        assert!(placed.crosses_arc);
    }
}
