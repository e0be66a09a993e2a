//! Label-line dimensions: direction and length labels on a single line.

use glam::{DVec3, dvec2};

use super::DimensionStrategy;
use crate::definition::DimensionDefinition;
use crate::errors::Result;
use crate::format::{format_direction, format_length};
use crate::layout::text::PlacedText;
use crate::layout::{Chain, LayoutContext};
use crate::log::debug;
use crate::style::StyleResolver;
use crate::types::{EPSILON, reading_direction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelLineStrategy;

impl DimensionStrategy for LabelLineStrategy {
    fn stroke(
        &self,
        ctx: &mut LayoutContext<'_>,
        def: &DimensionDefinition,
        resolver: &dyn StyleResolver,
    ) -> Result<()> {
        def.require_points(def.kind.min_points())?;
        if def.points.len() < 2 {
            debug!(points = def.points.len(), "label line without a line, nothing to do");
            return Ok(());
        }
        Chain::new(resolver, 1, false).run(ctx, |ctx, _| label_segment(ctx, def))
    }
}

/// Where the labels hang off and which way the line runs
#[derive(Clone, Copy, Debug, PartialEq)]
struct LabelGeometry {
    anchor: DVec3,
    start: DVec3,
    end: DVec3,
}

/// Three points are (anchor, start, end); with two the anchor slides
/// along the line by the text offset.
fn label_geometry(def: &DimensionDefinition) -> Option<LabelGeometry> {
    match def.points.as_slice() {
        // points past the third are not part of the label line
        [anchor, start, end, ..] => Some(LabelGeometry {
            anchor: *anchor,
            start: *start,
            end: *end,
        }),
        [start, end] => {
            let dir = (*end - *start).normalize_or_zero();
            Some(LabelGeometry {
                anchor: *start + dir * def.text(0).offset,
                start: *start,
                end: *end,
            })
        }
        _ => None,
    }
}

struct Label {
    content: String,
    above: bool,
}

fn label_segment(ctx: &mut LayoutContext<'_>, def: &DimensionDefinition) -> Result<()> {
    let style = ctx.style.clone();
    let view = ctx.view;
    let Some(geometry) = label_geometry(def) else {
        return Ok(());
    };
    let line = geometry.end - geometry.start;
    let length = line.length();
    if length < EPSILON {
        return Err(ctx.degenerate("zero-length label line"));
    }
    ctx.points = [geometry.anchor, geometry.start, geometry.end, geometry.anchor];

    let local = ctx.frame.to_local(line);
    let degrees = local.y.atan2(local.x).to_degrees();
    let settings = &style.label_line;

    // the angle label goes above unless inverted
    let mut labels = Vec::with_capacity(2);
    if !settings.suppress_angle {
        labels.push(Label {
            content: def
                .text(0)
                .content
                .clone()
                .unwrap_or_else(|| format_direction(degrees, settings, &style.format)),
            above: !settings.invert_labels,
        });
    }
    if !settings.suppress_length {
        labels.push(Label {
            content: def
                .text(1)
                .content
                .clone()
                .unwrap_or_else(|| format_length(length * style.format.scale, &style.format)),
            above: settings.invert_labels,
        });
    }
    labels.sort_by_key(|label| !label.above);
    debug!(degrees, length, labels = labels.len(), "label line");

    let (direction, _) = reading_direction(line / length, &view);
    let mut up = ctx.frame.z.cross(direction);
    if view.to_local(up).y < 0.0 {
        up = -up;
    }
    let m = style.text_margin.raw();
    let side_by_side = !settings.adjacent_labels && labels.len() == 2;

    for (i, label) in labels.into_iter().enumerate() {
        let block = ctx.measure(&label.content)?;
        let size = dvec2(block.width.raw(), block.height.raw());
        let (w, h) = (size.x, size.y);
        let origin = if side_by_side {
            // both above, first one left of the anchor
            let lifted = geometry.anchor + up * (h / 2.0 + m);
            if i == 0 {
                lifted - direction * (w + m)
            } else {
                lifted + direction * m
            }
        } else {
            let sign = if label.above { 1.0 } else { -1.0 };
            geometry.anchor + up * (sign * (h / 2.0 + m)) - direction * (w / 2.0)
        };
        PlacedText {
            origin,
            direction,
            up,
            size,
            content: label.content,
            left_edge: 0.0,
            extent: w + 2.0 * m,
        }
        .emit(ctx);
    }
    Ok(())
}
