//! Terminator placement: glyph selection, line trimming and arc walking.

use glam::DVec3;

use super::context::LayoutContext;
use super::segment::ArcParams;
use crate::log::warn;
use crate::output::Primitive;
use crate::style::{GlyphKind, StyleConfiguration};

/// Glyphs drawn at the two ends of one segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub left: GlyphKind,
    pub right: GlyphKind,
}

/// Glyphs in effect for a segment of a chain.
///
/// The first segment may use a distinct first glyph. Inner joints of an
/// unstacked chain share one bowtie glyph, drawn by the later segment.
pub fn effective_glyphs(style: &StyleConfiguration, first: bool, last: bool, stacked: bool) -> Glyphs {
    let terms = &style.terminators;
    let left = match (first, stacked) {
        (true, _) => terms.first.unwrap_or(terms.left),
        (false, false) => terms.bowtie.unwrap_or(terms.left),
        (false, true) => terms.left,
    };
    let right = if !stacked && !last && terms.bowtie.is_some() {
        GlyphKind::None
    } else {
        terms.right
    };
    Glyphs { left, right }
}

/// Distance a line end is pulled back so it does not run through `glyph`
pub fn trim_distance(style: &StyleConfiguration, glyph: GlyphKind, same_side: bool) -> f64 {
    if !style.terminators.no_line_through {
        return 0.0;
    }
    let tw = style.terminators.width.raw();
    let th = style.terminators.height.raw();
    match glyph {
        GlyphKind::None => 0.0,
        GlyphKind::Arrow if same_side => tw,
        GlyphKind::Arrow => 0.0,
        GlyphKind::Stroke => tw / 2.0,
        GlyphKind::Origin => th / 2.0,
        GlyphKind::Dot => th / 8.0,
    }
}

/// Place a glyph at `to`, pointing from `from` towards `to`
pub fn line_terminator(ctx: &mut LayoutContext<'_>, from: DVec3, to: DVec3, glyph: GlyphKind) {
    if glyph == GlyphKind::None {
        return;
    }
    let Some(direction) = (to - from).try_normalize() else {
        return;
    };
    ctx.emit(Primitive::Terminator {
        point: to,
        direction,
        glyph,
    });
}

/// Angle subtended on an arc of `radius` by a chord of length `width`.
/// `None` when the arc is too small to host the glyph.
pub fn add_angle(radius: f64, width: f64) -> Option<f64> {
    if width >= radius {
        return None;
    }
    let cos = 1.0 - (width * width) / (2.0 * radius * radius);
    Some(cos.clamp(-1.0, 1.0).acos())
}

/// Place a glyph on an arc at `angle`.
///
/// The tail of the glyph is found by walking the glyph width along the
/// arc, towards increasing angles when `forward` is set.
pub fn arc_terminator(
    ctx: &mut LayoutContext<'_>,
    arc: &ArcParams,
    angle: f64,
    forward: bool,
    glyph: GlyphKind,
) {
    if glyph == GlyphKind::None {
        return;
    }
    let tw = ctx.style.terminators.width.raw();
    let Some(add) = add_angle(arc.radius, tw) else {
        warn!(
            segment = ctx.segment,
            radius = arc.radius,
            width = tw,
            "arc too small for terminator, omitted"
        );
        return;
    };
    let anchor = arc.point_at(angle);
    let walked = arc.point_at(if forward { angle + add } else { angle - add });
    let Some(direction) = (anchor - walked).try_normalize() else {
        return;
    };
    ctx.emit(Primitive::Terminator {
        point: anchor,
        direction,
        glyph,
    });
}
