//! Dimension line and arc generation.
//!
//! Lines are split around the box of the placed text. When the line misses
//! the box the caller falls back to the merge rules driven by justification
//! and fit state.

use glam::DVec3;

use super::context::LayoutContext;
use super::defaults;
use super::fit::{self, terms_are_inside};
use super::terminator::{self, Glyphs};
use super::text::PlacedText;
use crate::definition::Justification;
use crate::errors::Result;
use crate::output::{LineRole, Primitive, TrimCode};
use crate::style::{StyleConfiguration, TerminatorMode};
use crate::types::{EPSILON, Frame};

// ============================================================================
// Arc geometry
// ============================================================================

/// Circle carrying an angular dimension.
///
/// Angles are measured counter-clockwise from `axes.x` in the `axes` plane.
/// The chord variant passes a translated center here rather than touching
/// any shared state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcParams {
    pub center: DVec3,
    pub radius: f64,
    pub axes: Frame,
    pub sweep: f64,
}

impl ArcParams {
    #[inline]
    pub fn point_at(&self, angle: f64) -> DVec3 {
        self.center + self.axes.direction_at(angle) * self.radius
    }

    #[inline]
    pub fn tangent_at(&self, angle: f64) -> DVec3 {
        self.axes.tangent_at(angle)
    }

    pub fn arc_length(&self) -> f64 {
        self.radius * self.sweep
    }
}

// ============================================================================
// Text box
// ============================================================================

/// Rectangle around placed text, in the text's own plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBox {
    pub corner: DVec3,
    pub x_axis: DVec3,
    pub y_axis: DVec3,
    pub width: f64,
    pub height: f64,
}

impl TextBox {
    /// Box of `text` grown by the text margin, plus half a char width
    /// above and below when screen-horizontal text crosses a line that is
    /// not itself horizontal in view.
    pub fn around(text: &PlacedText, style: &StyleConfiguration, line_dir: DVec3, view: &Frame) -> TextBox {
        let x_margin = style.text_margin.raw().abs();
        let line_horizontal = view.to_local(line_dir).y.abs() < EPSILON;
        let y_margin = if !style.is_horizontal_text() || line_horizontal {
            0.0
        } else {
            style.char_width.raw() / 2.0
        };
        let (w, h) = (text.size.x, text.size.y);
        TextBox {
            corner: text.origin - text.direction * x_margin - text.up * (h / 2.0 + y_margin),
            x_axis: text.direction,
            y_axis: text.up,
            width: w + 2.0 * x_margin,
            height: h + 2.0 * y_margin,
        }
    }

    /// Where the segment `a -> b` enters and leaves the box.
    ///
    /// Both points are projected through the box normal, so a line that
    /// does not lie in the text plane is still split where it passes
    /// behind the text. Hits are clamped to the segment.
    pub fn intersect_segment(&self, a: DVec3, b: DVec3) -> Option<(DVec3, DVec3)> {
        let ua = (a - self.corner).dot(self.x_axis);
        let va = (a - self.corner).dot(self.y_axis);
        let du = (b - self.corner).dot(self.x_axis) - ua;
        let dv = (b - self.corner).dot(self.y_axis) - va;

        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        for (start, delta, size) in [(ua, du, self.width), (va, dv, self.height)] {
            if delta.abs() < EPSILON {
                if start < 0.0 || start > size {
                    return None;
                }
                continue;
            }
            let t0 = -start / delta;
            let t1 = (size - start) / delta;
            t_enter = t_enter.max(t0.min(t1));
            t_exit = t_exit.min(t0.max(t1));
        }

        let t_enter = t_enter.max(0.0);
        let t_exit = t_exit.min(1.0);
        if t_exit - t_enter <= EPSILON {
            return None;
        }
        Some((a + (b - a) * t_enter, a + (b - a) * t_exit))
    }
}

// ============================================================================
// Primitive emission
// ============================================================================

/// Emit a plain line, dropping stubs
pub fn emit_line(ctx: &mut LayoutContext<'_>, p0: DVec3, p1: DVec3, role: LineRole) {
    if p0.distance(p1) < defaults::MIN_STUB_LENGTH {
        return;
    }
    ctx.emit(Primitive::Segment {
        p0,
        p1,
        trim: TrimCode::None,
        role,
    });
}

/// One piece of dimension line and what sits at its ends
#[derive(Clone, Copy, Debug)]
pub struct DimLine {
    pub from: DVec3,
    pub to: DVec3,
    pub trim: TrimCode,
    /// The piece runs between the witness lines
    pub line_inside: bool,
    pub terms_inside: bool,
    /// `from` is the left end of the dimension
    pub left_to_right: bool,
}

/// Emit a dimension line, pulled back from glyphs the line must not cross
pub fn emit_dim_line(ctx: &mut LayoutContext<'_>, line: DimLine, glyphs: Glyphs) {
    let DimLine {
        from,
        to,
        trim,
        line_inside,
        terms_inside,
        left_to_right,
    } = line;

    let (mut left, mut right) = if left_to_right { (from, to) } else { (to, from) };
    if ctx.style.terminators.no_line_through && trim != TrimCode::None {
        let same_side = line_inside == terms_inside;
        // outside pieces carry the opposite glyph
        let (left_glyph, right_glyph) = if line_inside {
            (glyphs.left, glyphs.right)
        } else {
            (glyphs.right, glyphs.left)
        };
        let Some(dir) = (right - left).try_normalize() else {
            return;
        };
        if trim.trims_left() {
            let dist = terminator::trim_distance(&ctx.style, left_glyph, same_side);
            if left.distance(right) < dist {
                return;
            }
            left += dir * dist;
        }
        if trim.trims_right() {
            let dist = terminator::trim_distance(&ctx.style, right_glyph, same_side);
            if left.distance(right) < dist {
                return;
            }
            right -= dir * dist;
        }
    }

    let (p0, p1) = if left_to_right { (left, right) } else { (right, left) };
    if p0.distance(p1) < defaults::MIN_STUB_LENGTH {
        return;
    }
    ctx.emit(Primitive::Segment {
        p0,
        p1,
        trim,
        role: LineRole::DimensionLine,
    });
}

/// Emit the arc from `start` sweeping `sweep` (either sign)
pub fn emit_arc(ctx: &mut LayoutContext<'_>, arc: &ArcParams, start: f64, sweep: f64) {
    if sweep.abs() * arc.radius < defaults::MIN_STUB_LENGTH {
        return;
    }
    let end = start + sweep;
    ctx.emit(Primitive::Arc {
        center: arc.center,
        radius: arc.radius,
        axes: arc.axes,
        start_angle: start.min(end),
        end_angle: start.max(end),
    });
}

// ============================================================================
// Witness lines
// ============================================================================

/// Linear witness from a measured point to the dimension line.
/// `fallback` is used as the witness direction when the two coincide.
pub fn linear_witness(ctx: &mut LayoutContext<'_>, measured: DVec3, on_line: DVec3, fallback: DVec3) {
    let dir = (on_line - measured).try_normalize().unwrap_or(fallback);
    let p0 = measured + dir * ctx.style.witness_offset.raw();
    let p1 = on_line + dir * ctx.style.witness_extend.raw();
    emit_line(ctx, p0, p1, LineRole::Witness);
}

/// Radial witness from `feature` towards the dimension arc of `radius`
pub fn radial_witness(ctx: &mut LayoutContext<'_>, center: DVec3, feature: DVec3, radius: f64) {
    let Some(dir) = (feature - center).try_normalize() else {
        return;
    };
    let feature_radius = center.distance(feature);
    // witnesses reaching in from outside the arc run inwards
    let sign = if feature_radius > radius { -1.0 } else { 1.0 };
    let offset = sign * ctx.style.witness_offset.raw();
    let extend = sign * ctx.style.witness_extend.raw();
    let p0 = center + dir * (feature_radius + offset);
    let p1 = center + dir * (radius + extend);
    emit_line(ctx, p0, p1, LineRole::Witness);
}

/// Witness parallel to `dir`, running `length` from `start` plus the extension
pub fn chord_witness(ctx: &mut LayoutContext<'_>, start: DVec3, dir: DVec3, length: f64) {
    let p0 = start + dir * ctx.style.witness_offset.raw();
    let p1 = start + dir * (length + ctx.style.witness_extend.raw());
    emit_line(ctx, p0, p1, LineRole::Witness);
}

// ============================================================================
// Linear dimension line
// ============================================================================

/// Everything the linear line generator needs about one segment
#[derive(Clone, Copy, Debug)]
pub struct LinearLine<'t> {
    pub start: DVec3,
    pub end: DVec3,
    pub direction: DVec3,
    pub span: f64,
    pub text: &'t PlacedText,
    pub glyphs: Glyphs,
    pub justification: Justification,
    pub push_right: bool,
    pub outside_min_leader: f64,
}

fn inside(ctx: &LayoutContext<'_>, default: bool) -> bool {
    terms_are_inside(ctx.style.terminator_mode, default, ctx.fit.fit_terms_inside())
}

fn dim_line(
    ctx: &mut LayoutContext<'_>,
    glyphs: Glyphs,
    from: DVec3,
    to: DVec3,
    trim: TrimCode,
    line_inside: bool,
    default_inside: bool,
    left_to_right: bool,
) {
    let terms_inside = inside(ctx, default_inside);
    emit_dim_line(
        ctx,
        DimLine {
            from,
            to,
            trim,
            line_inside,
            terms_inside,
            left_to_right,
        },
        glyphs,
    );
}

/// Lay out the dimension line of one linear segment, then its terminators.
///
/// The text has already been placed; its box decides where the line breaks.
pub fn linear_dimension_line(ctx: &mut LayoutContext<'_>, line: &LinearLine<'_>, leadered: bool) -> Result<()> {
    let ends = if ctx.fit.all_dont_fit() {
        match linear_not_fit(ctx, line, leadered) {
            Some(ends) => ends,
            // unfit terminators suppressed
            None => return Ok(()),
        }
    } else {
        linear_fits(ctx, line, leadered)
    };

    let (tail_left, tail_right) = ends;
    terminator::line_terminator(ctx, tail_left, line.start, line.glyphs.left);
    terminator::line_terminator(ctx, tail_right, line.end, line.glyphs.right);
    Ok(())
}

/// Text and terminators fit: split around the text. Returns the tails the
/// terminators point away from.
fn linear_fits(ctx: &mut LayoutContext<'_>, line: &LinearLine<'_>, leadered: bool) -> (DVec3, DVec3) {
    let LinearLine {
        start: origin,
        end: endpt,
        direction,
        span,
        text,
        glyphs,
        ..
    } = *line;
    let margin = ctx.style.text_margin.raw();
    let inline = ctx.style.is_inline();
    let left_edge = text.left_edge;
    let extent = text.extent;

    if leadered {
        dim_line(ctx, glyphs, origin, endpt, TrimCode::Both, true, true, true);
        return (endpt, origin);
    }

    let manual = line.justification.is_manual();
    if manual && left_edge < 0.0 {
        // text dragged past the left witness
        let mut joint = origin;
        let mut trim = TrimCode::Both;
        let mut draw_outer = true;
        let outer_end;
        if inline {
            let right_edge = left_edge + extent;
            outer_end = origin + direction * right_edge;
            let trim_dist = terminator::trim_distance(&ctx.style, glyphs.left, inside(ctx, true));
            if right_edge > 0.0 {
                draw_outer = false;
            }
            if right_edge > trim_dist {
                joint = outer_end;
                trim = TrimCode::Right;
            }
        } else {
            outer_end = origin + direction * (left_edge + margin);
        }
        if draw_outer {
            dim_line(ctx, glyphs, outer_end, joint, TrimCode::Right, false, true, true);
        }
        dim_line(ctx, glyphs, joint, endpt, trim, true, true, true);
        return (endpt, origin);
    }

    if manual && left_edge + extent > span {
        // text dragged past the right witness
        let mut joint = endpt;
        let mut trim = TrimCode::Both;
        let mut draw_outer = true;
        let outer_end;
        if inline {
            outer_end = origin + direction * left_edge;
            let trim_dist = terminator::trim_distance(&ctx.style, glyphs.right, inside(ctx, true));
            if left_edge < span {
                draw_outer = false;
            }
            if left_edge < span - trim_dist {
                joint = outer_end;
                trim = TrimCode::Left;
            }
        } else {
            outer_end = origin + direction * (left_edge + extent + margin);
        }
        if draw_outer {
            dim_line(ctx, glyphs, outer_end, joint, TrimCode::Left, false, true, false);
        }
        dim_line(ctx, glyphs, joint, origin, trim, true, true, false);
        return (endpt, origin);
    }

    // text between the witness lines
    let text_box = TextBox::around(text, &ctx.style, direction, &ctx.view);
    match text_box.intersect_segment(origin, endpt) {
        Some((near, far)) => {
            let trim_dist = terminator::trim_distance(&ctx.style, glyphs.left, inside(ctx, true));
            let left_suppress =
                left_edge < trim_dist || near.distance(origin) < defaults::MIN_STUB_LENGTH;
            let right_suppress =
                left_edge + extent > span - trim_dist || far.distance(endpt) < defaults::MIN_STUB_LENGTH;
            if !left_suppress {
                dim_line(ctx, glyphs, near, origin, TrimCode::Left, true, true, false);
            }
            if !right_suppress {
                dim_line(ctx, glyphs, far, endpt, TrimCode::Right, true, true, true);
            }
            (near, far)
        }
        None => {
            dim_line(ctx, glyphs, origin, endpt, TrimCode::Both, true, true, true);
            (endpt, origin)
        }
    }
}

/// Text and terminators do not fit. Returns `None` when the outside
/// terminators were suppressed.
fn linear_not_fit(ctx: &mut LayoutContext<'_>, line: &LinearLine<'_>, leadered: bool) -> Option<(DVec3, DVec3)> {
    let LinearLine {
        start: origin,
        end: endpt,
        direction,
        span,
        text,
        glyphs,
        justification,
        push_right,
        outside_min_leader,
    } = *line;
    let style = ctx.style.clone();
    let margin = style.text_margin.raw();
    let inline = style.is_inline();
    let left_edge = text.left_edge;
    let extent = text.extent;
    let mut out_leader = outside_min_leader;

    let suppress_outside = style.suppress_unfit_terminators
        && fit::terminators_suppressable(&style, justification, &ctx.fit, left_edge, span);

    if leadered {
        if style.terminator_mode == TerminatorMode::Inside || ctx.fit.fit_terms_inside() {
            dim_line(ctx, glyphs, endpt, origin, TrimCode::Both, true, true, false);
            return Some((endpt, origin));
        }
        let tail_left = origin - direction * out_leader;
        let tail_right = origin + direction * (span + out_leader);
        if !suppress_outside {
            dim_line(ctx, glyphs, tail_left, origin, TrimCode::Right, false, false, true);
        }
        dim_line(ctx, glyphs, origin, endpt, TrimCode::Both, true, false, true);
        if !suppress_outside {
            dim_line(ctx, glyphs, endpt, tail_right, TrimCode::Left, false, false, true);
        }
        return Some((tail_left, tail_right));
    }

    let line_through = !style.terminators.no_line_through;
    let mut joiner_start = origin;
    let mut joiner_end = endpt;
    let mut need_joiner = false;
    let mut left_suppress = false;
    let mut right_suppress = false;
    let to_right = justification == Justification::End || push_right;

    let (tail_left, tail_right) =
        if ctx.fit.fit_terms_inside() && style.terminator_mode == TerminatorMode::Automatic {
            // terminators stay inside while the text moves out
            let reach = if inline {
                out_leader
            } else {
                extent + margin + out_leader
            };
            left_suppress = true;
            right_suppress = true;
            need_joiner = true;
            if !line_through {
                if to_right {
                    let p = endpt + direction * reach;
                    dim_line(ctx, glyphs, p, endpt, TrimCode::None, false, false, true);
                } else {
                    let p = origin - direction * reach;
                    dim_line(ctx, glyphs, p, origin, TrimCode::None, false, false, true);
                }
            } else if to_right {
                joiner_end += direction * reach;
            } else {
                joiner_start -= direction * reach;
            }
            (endpt, origin)
        } else if left_edge < -extent {
            // text outside on the left
            need_joiner = true;
            let reach = if inline { left_edge + extent } else { left_edge + margin };
            if inline {
                let trim_dist = terminator::trim_distance(&style, glyphs.left, inside(ctx, true));
                if reach > -trim_dist {
                    left_suppress = true;
                }
            }
            if style.ignore_min_leader && line_through {
                out_leader *= 0.5;
            }
            (origin + direction * reach, origin + direction * (span + out_leader))
        } else if left_edge > span {
            // text outside on the right
            need_joiner = true;
            let reach = if inline { left_edge } else { left_edge + extent + margin };
            if inline {
                let trim_dist = terminator::trim_distance(&style, glyphs.right, inside(ctx, true));
                if reach < span + trim_dist {
                    right_suppress = true;
                }
            }
            if style.ignore_min_leader && line_through {
                out_leader *= 0.5;
            }
            (origin - direction * out_leader, origin + direction * reach)
        } else {
            if style.ignore_min_leader && line_through {
                out_leader *= 0.5;
            }
            (origin - direction * out_leader, origin + direction * (span + out_leader))
        };

    if !left_suppress && !suppress_outside {
        dim_line(ctx, glyphs, tail_left, origin, TrimCode::Right, false, false, true);
    }

    let wants_joiner = style.joiner && (need_joiner || !(style.is_horizontal_text() || inline));
    let forced_joiner = style.terminator_mode == TerminatorMode::Automatic && ctx.fit.fit_terms_inside();
    if wants_joiner || forced_joiner {
        dim_line(ctx, glyphs, joiner_start, joiner_end, TrimCode::Both, true, false, true);
    }

    if !right_suppress && !suppress_outside {
        dim_line(ctx, glyphs, tail_right, endpt, TrimCode::Left, false, false, false);
    }

    if suppress_outside {
        return None;
    }
    Some((tail_left, tail_right))
}

// ============================================================================
// Arc dimension line
// ============================================================================

/// Everything the arc generator needs about one angular segment
#[derive(Clone, Copy, Debug)]
pub struct ArcLine {
    pub arc: ArcParams,
    /// Angular footprint of the text, signed
    pub text_sweep: f64,
    /// Angle where the text footprint starts
    pub text_offset: f64,
    /// Running direction of the text, for the underline
    pub text_dir: DVec3,
    pub glyphs: Glyphs,
    pub justification: Justification,
    pub leadered: bool,
    /// Projected text width, for the underline
    pub projected_width: f64,
    /// Horizontal text crosses the arc at its middle
    pub text_crosses_arc: bool,
}

/// Lay out the dimension arc of one angular segment, then its terminators
pub fn arc_dimension_line(ctx: &mut LayoutContext<'_>, line: &ArcLine) -> Result<()> {
    let arc = &line.arc;
    if arc.radius <= 0.0 {
        return Err(ctx.degenerate("dimension arc has no radius"));
    }
    let style = ctx.style.clone();
    let sweep = arc.sweep;
    let r = arc.radius;
    let leaders = fit::effective_min_leaders(&style, true, ctx.fit.fit_terms_inside());
    let mut min_angle = leaders.outside.abs() / r;
    if style.ignore_min_leader && min_angle > std::f64::consts::PI {
        min_angle = std::f64::consts::PI;
    }

    let (text_off, text_sw) = (line.text_offset, line.text_sweep);
    let overflow = (ctx.fit.all_dont_fit() && !ctx.fit.fit_terms_inside())
        || text_sw.abs() + style.min_leader.raw() / r > sweep
        || text_off < 0.0
        || text_off > sweep;

    let mut suppress_outside = false;
    let forward;

    if !line.leadered && overflow {
        if !line.justification.is_manual() && ctx.fit.text_not_fit() {
            suppress_outside = style.suppress_unfit_terminators;
        }
        forward = ctx.fit.all_dont_fit() && ctx.fit.fit_terms_inside();

        if style.joiner || ctx.fit.fit_terms_inside() {
            let start = if line.justification == Justification::End {
                0.0
            } else {
                -min_angle
            };
            let extent = if forward {
                sweep + min_angle
            } else {
                2.0 * min_angle + sweep
            };
            emit_arc(ctx, arc, start, extent);
            suppress_outside = false;
        } else {
            let skip_left = suppress_outside && text_off > sweep;
            let skip_right = suppress_outside && text_off < 0.0;
            if !skip_left {
                emit_arc(ctx, arc, -min_angle, min_angle);
            }
            if !skip_right {
                emit_arc(ctx, arc, sweep, min_angle);
            }
        }

        let underline = ctx.fit.push_text_outside()
            && !style.is_inline()
            && !style.is_horizontal_text()
            && style.extend_dim_line_under_text;
        if underline {
            let mut length = line.projected_width + 2.0 * style.text_margin.raw();
            let start = -min_angle;
            if start * text_sw < 0.0 {
                length = -length;
            }
            let p0 = arc.point_at(start);
            emit_line(ctx, p0, p0 + line.text_dir * length, LineRole::Underline);
        }
    } else {
        // leadered or fitting: the terminators sit inside the arc
        if (style.is_inline() || line.text_crosses_arc) && !line.leadered {
            let (left_end, right_start) = if text_sw > 0.0 {
                (text_off, text_off + text_sw)
            } else {
                (text_off + text_sw, text_off)
            };
            emit_arc(ctx, arc, 0.0, left_end);
            emit_arc(ctx, arc, right_start, sweep - right_start);
        } else {
            emit_arc(ctx, arc, 0.0, sweep);
        }
        forward = true;
    }

    if suppress_outside {
        return Ok(());
    }

    terminator::arc_terminator(ctx, arc, 0.0, forward, line.glyphs.left);
    terminator::arc_terminator(ctx, arc, sweep, !forward, line.glyphs.right);
    Ok(())
}
