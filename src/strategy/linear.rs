//! Linear dimensions: chained sizes and stacked locations.

use glam::{DVec3, dvec2};

use super::DimensionStrategy;
use crate::definition::{DimensionDefinition, DimensionKind, Justification};
use crate::errors::{LayoutError, Result};
use crate::format::format_length;
use crate::layout::fit::{
    self, SpanInput, classify, effective_min_leaders, linear_fit, text_placed_outside,
};
use crate::layout::leader::emit_leader;
use crate::layout::segment::{self, DimLine, LinearLine, linear_witness};
use crate::layout::terminator::{Glyphs, effective_glyphs, line_terminator};
use crate::layout::text::{
    LinearFrame, OffsetRequest, calc_text_offset, linear_string_len, needs_leader,
    place_linear_text, place_vertical_text, stack_offset,
};
use crate::layout::{Chain, LayoutContext};
use crate::log::debug;
use crate::output::TrimCode;
use crate::style::{StyleResolver, VerticalText};
use crate::types::{EPSILON, Size2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearStrategy;

impl DimensionStrategy for LinearStrategy {
    fn stroke(
        &self,
        ctx: &mut LayoutContext<'_>,
        def: &DimensionDefinition,
        resolver: &dyn StyleResolver,
    ) -> Result<()> {
        def.require_points(def.kind.min_points())?;
        let stacked = def.kind == DimensionKind::LinearLocation;
        Chain::new(resolver, def.points.len() - 1, stacked)
            .run(ctx, |ctx, index| linear_segment(ctx, def, index, stacked))
    }
}

/// Where one segment's dimension line runs
#[derive(Clone, Copy, Debug)]
struct LineGeometry {
    measured_start: DVec3,
    measured_end: DVec3,
    start: DVec3,
    end: DVec3,
    direction: DVec3,
    span: f64,
}

fn line_geometry(ctx: &LayoutContext<'_>, def: &DimensionDefinition, start: usize, end: usize) -> Result<LineGeometry> {
    let missing = || LayoutError::TooFewPoints {
        kind: def.kind,
        required: end + 1,
        found: def.points.len(),
    };
    let measured_start = def.point(start).ok_or_else(missing)?;
    let measured_end = def.point(end).ok_or_else(missing)?;
    let frame = ctx.frame;

    let local_start = frame.to_local(measured_start);
    let local_end = frame.to_local(measured_end);
    let along = local_end.x - local_start.x;
    if along.abs() < EPSILON {
        return Err(ctx.degenerate("zero-length linear span"));
    }

    let base = def.points.first().map_or(0.0, |p| frame.to_local(*p).y);
    let height = base + def.text(0).offset + ctx.stack.total;
    Ok(LineGeometry {
        measured_start,
        measured_end,
        start: measured_start + frame.y * (height - local_start.y),
        end: measured_end + frame.y * (height - local_end.y),
        direction: if along > 0.0 { frame.x } else { -frame.x },
        span: along.abs(),
    })
}

fn linear_segment(ctx: &mut LayoutContext<'_>, def: &DimensionDefinition, index: usize, stacked: bool) -> Result<()> {
    let start_index = if stacked { 0 } else { index };
    let end_index = index + 1;
    let mut line = line_geometry(ctx, def, start_index, end_index)?;
    let style = ctx.style.clone();
    let desc = def.text(end_index);
    let frame = ctx.frame;
    let view = ctx.view;
    ctx.points = [line.measured_start, line.measured_end, line.start, line.end];

    let content = desc
        .content
        .clone()
        .unwrap_or_else(|| format_length(line.span * style.format.scale, &style.format));
    let block = ctx.measure(&content)?;
    let size: Size2 = dvec2(block.width.raw(), block.height.raw());
    let (w, h) = (size.x, size.y);
    let glyphs = effective_glyphs(&style, ctx.first_segment, ctx.last_segment, stacked);

    // fit
    let check = view.to_local(line.direction);
    let leaders = effective_min_leaders(&style, false, false);
    let report = linear_fit(
        &style,
        &SpanInput {
            span: line.span,
            text: size,
            check,
            min_leader: leaders.inside,
        },
    );
    let manual_outside = text_placed_outside(
        desc.justification,
        desc.offset_y,
        size,
        style.text_lift.raw(),
        block.justification,
        line.span,
    );
    ctx.fit = classify(&style, &report, leaders.inside, manual_outside, desc.justification);
    let string_len = linear_string_len(&style, size, line.direction, &view);
    let extra = if fit::needs_extra_text_margin(&style) {
        style.text_margin.raw()
    } else {
        0.0
    };
    let text_not_fit = !report.fits
        && (fit::text_not_fit_by_justification(
            line.span,
            w,
            style.text_margin.raw(),
            style.char_width.raw(),
            desc.justification,
            style.is_horizontal_text(),
        ) || line.span < string_len + 2.0 * extra);
    ctx.fit.set_text_not_fit(text_not_fit);
    debug!(
        segment = index,
        span = line.span,
        effective = report.effective,
        all_dont_fit = ctx.fit.all_dont_fit(),
        fit_terms_inside = ctx.fit.fit_terms_inside(),
        text_not_fit,
        "linear fit"
    );

    let vertical = match style.vertical_text {
        VerticalText::Never => false,
        VerticalText::Always => true,
        VerticalText::WhenNotFit => ctx.fit.all_dont_fit(),
    };
    if vertical {
        line_witnesses(ctx, def, &line, start_index, end_index, stacked);
        return vertical_segment(ctx, &line, size, content, desc.justification, glyphs);
    }

    let offset = calc_text_offset(
        &style,
        &mut ctx.fit,
        &OffsetRequest {
            justification: desc.justification,
            push_right: desc.push_right,
            span: line.span,
            string_len,
            text_height: h,
            angular: false,
        },
    );
    let leadered = offset.lift.is_some() || needs_leader(&style, desc.offset_y, h);
    let lift = offset.lift.unwrap_or(desc.offset_y);

    let stack_height = stack_offset(&style, size, check, false);
    ctx.stack.height = stack_height;
    let text_outside = offset.along < 0.0 || offset.along + string_len > line.span;
    if ctx.fit.all_dont_fit()
        && !leadered
        && text_outside
        && style.text_lift_when_outside
        && !style.no_auto_text_lift
    {
        // line, text and witness ends all move by the stack height
        ctx.text_lift = stack_height;
        line.start += frame.y * stack_height;
        line.end += frame.y * stack_height;
        ctx.points[2] = line.start;
        ctx.points[3] = line.end;
        debug!(segment = index, lift = stack_height, "auto text lift");
    }
    line_witnesses(ctx, def, &line, start_index, end_index, stacked);

    let placed = place_linear_text(
        &style,
        &view,
        &LinearFrame {
            origin: line.start,
            direction: line.direction,
            normal: frame.y,
            plane: frame.z,
        },
        size,
        content,
        offset,
        string_len,
        lift,
    );

    let outside = effective_min_leaders(&style, false, ctx.fit.fit_terms_inside()).outside;
    segment::linear_dimension_line(
        ctx,
        &LinearLine {
            start: line.start,
            end: line.end,
            direction: line.direction,
            span: line.span,
            text: &placed,
            glyphs,
            justification: desc.justification,
            push_right: desc.push_right,
            outside_min_leader: outside,
        },
        leadered,
    )?;
    placed.emit(ctx);

    if leadered {
        let along = if offset.lift.is_some() {
            line.span / 2.0
        } else {
            (offset.along + string_len / 2.0).clamp(0.0, line.span)
        };
        emit_leader(ctx, line.start + line.direction * along, &placed);
    }
    Ok(())
}

/// Witnesses from the measured points up to the (possibly lifted) line
fn line_witnesses(
    ctx: &mut LayoutContext<'_>,
    def: &DimensionDefinition,
    line: &LineGeometry,
    start_index: usize,
    end_index: usize,
    stacked: bool,
) {
    let normal = ctx.frame.y;
    if !def.text(start_index).no_witness {
        if ctx.first_segment || stacked {
            linear_witness(ctx, line.measured_start, line.start, normal);
        } else if ctx.text_lift > 0.0 {
            // the shared witness stops at the unlifted line
            let unlifted = line.start - normal * ctx.text_lift;
            linear_witness(ctx, unlifted, line.start, normal);
        }
    }
    if !def.text(end_index).no_witness {
        linear_witness(ctx, line.measured_end, line.end, normal);
    }
}

/// Text stands along the witness direction; the terminators stay inside
fn vertical_segment(
    ctx: &mut LayoutContext<'_>,
    line: &LineGeometry,
    size: Size2,
    content: String,
    justification: Justification,
    glyphs: Glyphs,
) -> Result<()> {
    let style = ctx.style.clone();
    segment::emit_dim_line(
        ctx,
        DimLine {
            from: line.start,
            to: line.end,
            trim: TrimCode::Both,
            line_inside: true,
            terms_inside: true,
            left_to_right: true,
        },
        glyphs,
    );
    line_terminator(ctx, line.end, line.start, glyphs.left);
    line_terminator(ctx, line.start, line.end, glyphs.right);

    let anchor = match justification {
        Justification::Start => line.start,
        Justification::End => line.end,
        Justification::Center => line.start + line.direction * (line.span / 2.0),
        Justification::Manual(along) => line.start + line.direction * along,
    };
    let placed = place_vertical_text(&style, &ctx.view, anchor, ctx.frame.y, line.direction, size, content);
    placed.emit(ctx);
    ctx.stack.height = size.x + 2.0 * style.text_margin.raw();
    Ok(())
}
