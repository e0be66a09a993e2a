//! Ordinate dimensions: offsets of each point from a datum, read along the
//! frame's y axis, with text lined up in one column.

use glam::{DVec3, dvec2};

use super::DimensionStrategy;
use crate::definition::DimensionDefinition;
use crate::errors::Result;
use crate::format::format_length;
use crate::layout::defaults;
use crate::layout::segment::emit_line;
use crate::layout::text::{PlacedText, stack_offset};
use crate::layout::{Chain, LayoutContext};
use crate::log::debug;
use crate::output::LineRole;
use crate::style::{StyleConfiguration, StyleResolver};
use crate::types::{EPSILON, reading_direction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrdinateStrategy;

impl DimensionStrategy for OrdinateStrategy {
    fn stroke(
        &self,
        ctx: &mut LayoutContext<'_>,
        def: &DimensionDefinition,
        resolver: &dyn StyleResolver,
    ) -> Result<()> {
        def.require_points(def.kind.min_points())?;
        let order = point_order(ctx, def, resolver.base().stacked);
        let mut previous: Option<f64> = None;
        Chain::new(resolver, order.len(), false).run(ctx, |ctx, index| {
            let text_y = ordinate_segment(ctx, def, order[index], previous)?;
            previous = Some(text_y);
            Ok(())
        })
    }
}

/// Datum first, then the rest; stacked ordinates go bottom to top
fn point_order(ctx: &LayoutContext<'_>, def: &DimensionDefinition, stacked: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..def.points.len()).collect();
    if stacked {
        let datum = def.points[0];
        let height = |i: usize| ctx.frame.to_local(def.points[i] - datum).y;
        order[1..].sort_by(|a, b| height(*a).total_cmp(&height(*b)));
    }
    order
}

/// Value an ordinate point reports
pub fn ordinate_value(style: &StyleConfiguration, point: usize, dy: f64) -> f64 {
    let ordinate = &style.ordinate;
    if point == 0 {
        return ordinate.start_value + ordinate.datum_value.unwrap_or(0.0);
    }
    let measured = if ordinate.reverse_decrement { dy } else { dy.abs() };
    ordinate.start_value + measured * style.format.scale
}

/// Lay out one ordinate point; returns the height its text ended up at
fn ordinate_segment(
    ctx: &mut LayoutContext<'_>,
    def: &DimensionDefinition,
    point: usize,
    previous: Option<f64>,
) -> Result<f64> {
    let style = ctx.style.clone();
    let frame = ctx.frame;
    let view = ctx.view;
    let datum = def.points[0];
    let p = def.points[point];
    let desc = def.text(point);
    let local = frame.to_local(p - datum);
    let dy = local.y;

    let content = desc
        .content
        .clone()
        .unwrap_or_else(|| format_length(ordinate_value(&style, point, dy), &style.format));
    let block = ctx.measure(&content)?;
    let size = dvec2(block.width.raw(), block.height.raw());
    let w = size.x;
    let m = style.text_margin.raw();

    // every text sits in the column at the datum plus the text offset
    let column = -local.x + def.text(0).offset;
    let foot = column_foot(frame.x, datum, p, def.text(0).offset);
    let lead = if column < 0.0 { -frame.x } else { frame.x };

    let mut text_y = dy;
    if style.ordinate.free_location {
        text_y += desc.offset_y;
    }
    let gap = stack_offset(&style, size, view.to_local(frame.x), false);
    if style.stacked {
        if let Some(prev) = previous {
            if text_y < prev + gap {
                text_y = prev + gap;
            }
        }
    }
    let end = foot + frame.y * (text_y - dy);
    ctx.points = [datum, p, foot, end];
    ctx.stack.height = gap;

    // witness, with a dog-leg when the text left the point's height
    let start = p + lead * style.witness_offset.raw();
    if (text_y - dy).abs() > EPSILON {
        let dog_leg = if style.min_leader.raw() > 0.0 {
            style.min_leader.raw()
        } else {
            defaults::LEADER_CHARS * style.char_width.raw()
        };
        let knee = foot - lead * (2.0 * dog_leg);
        let ankle = end - lead * dog_leg;
        emit_line(ctx, start, knee, LineRole::Witness);
        emit_line(ctx, knee, ankle, LineRole::Witness);
        emit_line(ctx, ankle, end, LineRole::Witness);
    } else {
        emit_line(ctx, start, end, LineRole::Witness);
    }

    let (direction, reversed) = reading_direction(lead, &view);
    let origin = if reversed {
        end - direction * (w + m)
    } else {
        end + direction * m
    };
    let mut up = frame.z.cross(direction);
    if view.to_local(up).y < 0.0 {
        up = -up;
    }
    let placed = PlacedText {
        origin,
        direction,
        up,
        size,
        content,
        left_edge: 0.0,
        extent: w + 2.0 * m,
    };
    placed.emit(ctx);
    debug!(
        segment = ctx.segment,
        point,
        dy,
        text_y,
        "ordinate placed"
    );
    Ok(text_y)
}

/// Point level with `p` in the text column `offset` past the datum
pub fn column_foot(frame_x: DVec3, datum: DVec3, p: DVec3, offset: f64) -> DVec3 {
    p + frame_x * ((datum - p).dot(frame_x) + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DimensionKind, TextDescriptor};
    use crate::metrics::{TextBlockMetrics, TextMetrics};
    use crate::output::Primitive;
    use crate::types::Length;
    use glam::dvec3;

    /// Every text is 3 wide and 1 high
    struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn measure(&self, _text: &str, _style: &StyleConfiguration) -> TextBlockMetrics {
            TextBlockMetrics::new(3.0, 1.0)
        }
    }

    fn style() -> StyleConfiguration {
        StyleConfiguration {
            text_margin: Length(0.5),
            min_leader: Length(1.0),
            witness_extend: Length(0.0),
            ..StyleConfiguration::default()
        }
    }

    fn definition(points: Vec<DVec3>) -> DimensionDefinition {
        DimensionDefinition::new(DimensionKind::Ordinate, points).with_text(0, TextDescriptor::with_offset(10.0))
    }

    fn stroke(def: &DimensionDefinition, style: &StyleConfiguration) -> Result<Vec<Primitive>> {
        let mut sink: Vec<Primitive> = Vec::new();
        {
            let mut ctx = LayoutContext::new(style.clone(), def.frame, def.view, &FixedMetrics, &mut sink);
            OrdinateStrategy.stroke(&mut ctx, def, style)?;
        }
        Ok(sink)
    }

    fn texts(out: &[Primitive]) -> Vec<(String, DVec3)> {
        out.iter()
            .filter_map(|p| match p {
                Primitive::TextRun { text, origin, .. } => Some((text.clone(), *origin)),
                _ => None,
            })
            .collect()
    }

    fn witnesses(out: &[Primitive]) -> Vec<(DVec3, DVec3)> {
        out.iter()
            .filter_map(|p| match p {
                Primitive::Segment {
                    p0,
                    p1,
                    role: LineRole::Witness,
                    ..
                } => Some((*p0, *p1)),
                _ => None,
            })
            .collect()
    }

    // ==================== Value tests ====================

    #[test]
    fn datum_and_offset_values() {
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, 5.0, 0.0), dvec3(0.0, 8.0, 0.0)]);
        let out = stroke(&def, &style()).unwrap();
        let texts = texts(&out);
        assert_eq!(texts[0], ("0.00".to_string(), dvec3(10.5, 0.0, 0.0)));
        assert_eq!(texts[1], ("5.00".to_string(), dvec3(10.5, 5.0, 0.0)));
        assert_eq!(texts[2], ("8.00".to_string(), dvec3(10.5, 8.0, 0.0)));
        assert_eq!(
            witnesses(&out),
            vec![
                (DVec3::ZERO, dvec3(10.0, 0.0, 0.0)),
                (dvec3(0.0, 5.0, 0.0), dvec3(10.0, 5.0, 0.0)),
                (dvec3(0.0, 8.0, 0.0), dvec3(10.0, 8.0, 0.0)),
            ]
        );
    }

    #[test]
    fn start_and_datum_values_shift_every_reading() {
        let mut style = style();
        style.ordinate.start_value = 100.0;
        style.ordinate.datum_value = Some(1.0);
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, 5.0, 0.0), dvec3(0.0, 8.0, 0.0)]);
        let out = stroke(&def, &style).unwrap();
        let names: Vec<String> = texts(&out).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["101.00", "105.00", "108.00"]);
    }

    #[test]
    fn reverse_decrement_keeps_the_sign() {
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, -5.0, 0.0), dvec3(0.0, -8.0, 0.0)]);
        let plain = stroke(&def, &style()).unwrap();
        assert_eq!(texts(&plain)[1].0, "5.00");

        let mut style = style();
        style.ordinate.reverse_decrement = true;
        let signed = stroke(&def, &style).unwrap();
        assert_eq!(texts(&signed)[1].0, "-5.00");
    }

    // ==================== Dog-leg tests ====================

    #[test]
    fn free_location_text_gets_a_dog_leg() {
        let mut style = style();
        style.ordinate.free_location = true;
        let mut text = TextDescriptor::default();
        text.offset_y = 2.0;
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, 5.0, 0.0), dvec3(0.0, 9.0, 0.0)]).with_text(1, text);
        let out = stroke(&def, &style).unwrap();
        assert_eq!(texts(&out)[1].1, dvec3(10.5, 7.0, 0.0));
        assert_eq!(
            &witnesses(&out)[1..4],
            &[
                (dvec3(0.0, 5.0, 0.0), dvec3(8.0, 5.0, 0.0)),
                (dvec3(8.0, 5.0, 0.0), dvec3(9.0, 7.0, 0.0)),
                (dvec3(9.0, 7.0, 0.0), dvec3(10.0, 7.0, 0.0)),
            ]
        );
    }

    #[test]
    fn stacked_text_clears_the_previous_one() {
        let mut style = style();
        style.stacked = true;
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, 0.5, 0.0), dvec3(0.0, 5.0, 0.0)]);
        let out = stroke(&def, &style).unwrap();
        // gap is text height plus margin
        assert_eq!(texts(&out)[1].1, dvec3(10.5, 1.5, 0.0));
        // dog-leg for the crowded point only
        assert_eq!(texts(&out)[2].1, dvec3(10.5, 5.0, 0.0));
        assert_eq!(witnesses(&out).len(), 5);
    }

    #[test]
    fn stacked_points_run_bottom_to_top() {
        let mut style = style();
        style.stacked = true;
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, 6.0, 0.0), dvec3(0.0, 3.0, 0.0)]);
        let names: Vec<String> = texts(&stroke(&def, &style).unwrap())
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(names, vec!["0.00", "3.00", "6.00"]);
    }

    #[test]
    fn text_left_of_the_points_reads_left_to_right() {
        let def = DimensionDefinition::new(
            DimensionKind::Ordinate,
            vec![DVec3::ZERO, dvec3(0.0, 5.0, 0.0), dvec3(0.0, 8.0, 0.0)],
        )
        .with_text(0, TextDescriptor::with_offset(-10.0));
        let out = stroke(&def, &style()).unwrap();
        // text ends a margin short of the witness end
        assert_eq!(texts(&out)[1].1, dvec3(-13.5, 5.0, 0.0));
    }

    #[test]
    fn datum_with_one_point_is_too_few() {
        let def = definition(vec![DVec3::ZERO, dvec3(0.0, 5.0, 0.0)]);
        assert_eq!(
            stroke(&def, &style()).unwrap_err(),
            crate::errors::LayoutError::TooFewPoints {
                kind: DimensionKind::Ordinate,
                required: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn column_foot_projects_onto_the_datum_column() {
        let foot = column_foot(DVec3::X, dvec3(1.0, 0.0, 0.0), dvec3(4.0, 5.0, 0.0), 2.0);
        assert_eq!(foot, dvec3(3.0, 5.0, 0.0));
    }
}
