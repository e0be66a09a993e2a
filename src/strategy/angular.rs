//! Angular dimensions: angle and arc-length sizes and locations, plus the
//! chord variant for small arc sizes.

use glam::{DVec3, dvec2};

use super::DimensionStrategy;
use crate::definition::{DimensionDefinition, DimensionKind};
use crate::errors::{LayoutError, Result};
use crate::format::{format_angle_for, format_length};
use crate::layout::defaults;
use crate::layout::fit::{
    self, ArcSpan, SpanInput, angular_fit, classify, effective_min_leaders, text_placed_outside,
};
use crate::layout::leader::emit_leader;
use crate::layout::segment::{ArcLine, ArcParams, arc_dimension_line, chord_witness, radial_witness};
use crate::layout::terminator::effective_glyphs;
use crate::layout::text::{OffsetRequest, calc_text_offset, needs_leader, place_angular_text, stack_offset};
use crate::layout::{Chain, LayoutContext};
use crate::log::debug;
use crate::style::{StyleConfiguration, StyleResolver};
use crate::types::{Angle, EPSILON, Frame};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AngularStrategy;

impl DimensionStrategy for AngularStrategy {
    fn stroke(
        &self,
        ctx: &mut LayoutContext<'_>,
        def: &DimensionDefinition,
        resolver: &dyn StyleResolver,
    ) -> Result<()> {
        def.require_points(def.kind.min_points())?;
        let location = def.kind.is_location();
        let stacked = location && resolver.base().stacked;
        Chain::new(resolver, def.points.len() - 2, stacked).run(ctx, |ctx, index| {
            let start_ray = if stacked { 1 } else { index + 1 };
            let geometry = solve_rays(ctx, def, start_ray, index + 2)?;
            let reported = if location && !stacked {
                ctx.sweep.accumulate(geometry.sweep)
            } else {
                geometry.sweep
            };

            let style = &ctx.style;
            let chord = def.kind == DimensionKind::ArcSize
                && def.points.len() == 3
                && style.chord_witnesses
                && geometry.sweep < std::f64::consts::PI;
            let radius = geometry.feature_radius + def.text(0).offset + ctx.stack.total;
            if radius <= EPSILON {
                return Err(ctx.degenerate("dimension arc has no radius"));
            }

            let segment = AngularSegment {
                index,
                start_ray,
                reported,
                stacked,
            };
            if chord {
                chord_segment(ctx, def, &geometry, radius, &segment)
            } else {
                let arc = ArcParams {
                    center: geometry.center,
                    radius,
                    axes: geometry.axes,
                    sweep: geometry.sweep,
                };
                let witnesses = Witnesses::Radial {
                    start: geometry.start_feature,
                    end: geometry.end_feature,
                };
                angular_segment(ctx, def, &arc, witnesses, &segment, geometry.feature_radius)
            }
        })
    }
}

/// Frame and sweep of one pair of rays around the pivot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayGeometry {
    pub center: DVec3,
    /// x along the start ray, z the rotation axis
    pub axes: Frame,
    pub sweep: f64,
    pub feature_radius: f64,
    pub start_feature: DVec3,
    pub end_feature: DVec3,
}

/// Solve the rotation frame and sweep of two rays.
///
/// The quadrant mirrors rays through the pivot; a clockwise style swaps
/// them so the sweep always runs counter-clockwise about `axes.z`.
pub fn solve_rays(ctx: &LayoutContext<'_>, def: &DimensionDefinition, start: usize, end: usize) -> Result<RayGeometry> {
    let missing = || LayoutError::TooFewPoints {
        kind: def.kind,
        required: end + 1,
        found: def.points.len(),
    };
    let center = def.point(0).ok_or_else(missing)?;
    let mut ray_start = def.point(start).ok_or_else(missing)? - center;
    let mut ray_end = def.point(end).ok_or_else(missing)? - center;
    if ray_start.length() < EPSILON || ray_end.length() < EPSILON {
        return Err(ctx.degenerate("ray point coincides with the pivot"));
    }

    match ctx.style.quadrant % 4 {
        1 => ray_start = -ray_start,
        2 => {
            ray_start = -ray_start;
            ray_end = -ray_end;
        }
        3 => ray_end = -ray_end,
        _ => {}
    }
    if ctx.style.clockwise {
        std::mem::swap(&mut ray_start, &mut ray_end);
    }

    let axes = if ctx.style.in_3d {
        Frame::from_x_and_plane(ray_start, ray_end).ok_or_else(|| ctx.degenerate("rays are parallel"))?
    } else {
        let z = ctx.frame.z;
        let x = (ray_start - z * ray_start.dot(z))
            .try_normalize()
            .ok_or_else(|| ctx.degenerate("start ray is normal to the drawing plane"))?;
        Frame::new(x, z.cross(x), z)
    };
    let local = axes.to_local(ray_end);
    let sweep = Angle(local.y.atan2(local.x)).normalized().radians();
    if sweep < EPSILON {
        return Err(ctx.degenerate("zero sweep"));
    }

    Ok(RayGeometry {
        center,
        axes,
        sweep,
        feature_radius: ray_start.length(),
        start_feature: center + ray_start,
        end_feature: center + ray_end,
    })
}

/// Per-segment bookkeeping shared by the plain and chord paths
#[derive(Clone, Copy, Debug)]
struct AngularSegment {
    index: usize,
    start_ray: usize,
    /// Sweep the text reports
    reported: f64,
    stacked: bool,
}

#[derive(Clone, Copy, Debug)]
enum Witnesses {
    Radial { start: DVec3, end: DVec3 },
    Chord { start: DVec3, end: DVec3, direction: DVec3, length: f64 },
}

/// Chord variant: the feature arc is carried out along the bisector to the
/// dimension radius, with parallel witnesses from the feature ends.
fn chord_segment(
    ctx: &mut LayoutContext<'_>,
    def: &DimensionDefinition,
    geometry: &RayGeometry,
    radius: f64,
    segment: &AngularSegment,
) -> Result<()> {
    let bisector = geometry.axes.direction_at(geometry.sweep / 2.0);
    let lift = radius - geometry.feature_radius;
    let arc = ArcParams {
        center: geometry.center + bisector * lift,
        radius: geometry.feature_radius,
        axes: geometry.axes,
        sweep: geometry.sweep,
    };
    let witnesses = Witnesses::Chord {
        start: geometry.start_feature,
        end: geometry.end_feature,
        direction: bisector,
        length: lift,
    };
    angular_segment(ctx, def, &arc, witnesses, segment, geometry.feature_radius)
}

fn measured_text(def: &DimensionDefinition, style: &StyleConfiguration, text_index: usize, sweep: f64, feature_radius: f64) -> String {
    if let Some(content) = &def.text(text_index).content {
        return content.clone();
    }
    if def.kind.is_arc_length() {
        format_length(feature_radius * sweep * style.format.scale, &style.format)
    } else {
        format_angle_for(sweep.to_degrees(), &style.format)
    }
}

fn is_inclined(tangent: DVec3) -> bool {
    tangent.x.abs() > defaults::ORTHOGONAL_SINE && tangent.y.abs() > defaults::ORTHOGONAL_SINE
}

fn angular_segment(
    ctx: &mut LayoutContext<'_>,
    def: &DimensionDefinition,
    arc: &ArcParams,
    witnesses: Witnesses,
    segment: &AngularSegment,
    feature_radius: f64,
) -> Result<()> {
    if arc.radius <= EPSILON {
        return Err(ctx.degenerate("dimension arc has no radius"));
    }
    let style = ctx.style.clone();
    let view = ctx.view;
    let text_index = segment.index + 2;
    let desc = def.text(text_index);
    ctx.points = [arc.center, arc.point_at(0.0), arc.point_at(arc.sweep), arc.point_at(arc.sweep / 2.0)];

    let content = measured_text(def, &style, text_index, segment.reported, feature_radius);
    let block = ctx.measure(&content)?;
    let size = dvec2(block.width.raw(), block.height.raw());
    let (w, h) = (size.x, size.y);
    let m = style.text_margin.raw();
    let glyphs = effective_glyphs(&style, ctx.first_segment, ctx.last_segment, segment.stacked);

    let span = arc.arc_length();
    let mid_tangent = view.to_local(arc.tangent_at(arc.sweep / 2.0));
    let string_len = if style.is_horizontal_text() {
        fit::project_text_size(mid_tangent, size, m)
    } else {
        w + 2.0 * m
    };

    // fit
    let leaders = effective_min_leaders(&style, true, false);
    let report = angular_fit(
        &style,
        &SpanInput {
            span,
            text: size,
            check: mid_tangent,
            min_leader: leaders.inside,
        },
        &ArcSpan {
            radius: arc.radius,
            sweep: arc.sweep,
            inclined: style.is_horizontal_text() && is_inclined(mid_tangent),
            inclined_check: mid_tangent,
        },
    );
    let manual_outside = text_placed_outside(
        desc.justification,
        desc.offset_y,
        size,
        style.text_lift.raw(),
        block.justification,
        span,
    );
    ctx.fit = classify(&style, &report, leaders.inside, manual_outside, desc.justification);
    let text_not_fit = !report.fits
        && fit::text_not_fit_by_justification(
            report.span,
            w,
            m,
            style.char_width.raw(),
            desc.justification,
            style.is_horizontal_text(),
        );
    ctx.fit.set_text_not_fit(text_not_fit);
    debug!(
        segment = segment.index,
        radius = arc.radius,
        sweep = arc.sweep,
        span = report.span,
        effective = report.effective,
        all_dont_fit = ctx.fit.all_dont_fit(),
        fit_terms_inside = ctx.fit.fit_terms_inside(),
        text_not_fit,
        "angular fit"
    );

    let mut offset = calc_text_offset(
        &style,
        &mut ctx.fit,
        &OffsetRequest {
            justification: desc.justification,
            push_right: desc.push_right,
            span,
            string_len,
            text_height: h,
            angular: true,
        },
    );
    let leadered = offset.lift.is_some() || needs_leader(&style, desc.offset_y, h);
    if leadered && offset.lift.is_none() {
        offset.lift = Some(desc.offset_y);
    }
    ctx.stack.height = stack_offset(&style, size, mid_tangent, true);

    let placed = place_angular_text(&style, &view, arc, size, content, offset, string_len);
    debug!(
        text_offset = placed.text_offset,
        text_sweep = placed.text_sweep,
        leadered,
        "placed angular text"
    );

    match witnesses {
        Witnesses::Radial { start, end } => {
            if (ctx.first_segment || segment.stacked) && !def.text(segment.start_ray).no_witness {
                radial_witness(ctx, arc.center, start, arc.radius);
            }
            if !desc.no_witness {
                radial_witness(ctx, arc.center, end, arc.radius);
            }
        }
        Witnesses::Chord {
            start,
            end,
            direction,
            length,
        } => {
            if !def.text(segment.start_ray).no_witness {
                chord_witness(ctx, start, direction, length);
            }
            if !desc.no_witness {
                chord_witness(ctx, end, direction, length);
            }
        }
    }
    placed.text.emit(ctx);

    arc_dimension_line(
        ctx,
        &ArcLine {
            arc: *arc,
            text_sweep: placed.text_sweep,
            text_offset: placed.text_offset,
            text_dir: placed.text.direction,
            glyphs,
            justification: desc.justification,
            leadered,
            projected_width: placed.projected_width,
            text_crosses_arc: placed.crosses_arc,
        },
    )?;

    if leadered {
        emit_leader(ctx, placed.anchor, &placed.text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{TextBlockMetrics, TextMetrics};
    use crate::output::{LineRole, Primitive};
    use crate::style::AngleFormat;
    use crate::types::Length;
    use glam::dvec3;
    use std::f64::consts::FRAC_PI_2;

    struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn measure(&self, _text: &str, _style: &StyleConfiguration) -> TextBlockMetrics {
            TextBlockMetrics::new(1.0, 0.5)
        }
    }

    fn style() -> StyleConfiguration {
        StyleConfiguration {
            text_margin: Length(0.1),
            witness_extend: Length(0.0),
            ..StyleConfiguration::default()
        }
    }

    fn quarter(kind: DimensionKind) -> DimensionDefinition {
        DimensionDefinition::new(
            kind,
            vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0), dvec3(0.0, 10.0, 0.0)],
        )
    }

    fn stroke(def: &DimensionDefinition, style: &StyleConfiguration) -> Result<Vec<Primitive>> {
        let mut sink: Vec<Primitive> = Vec::new();
        {
            let mut ctx = LayoutContext::new(style.clone(), def.frame, def.view, &FixedMetrics, &mut sink);
            AngularStrategy.stroke(&mut ctx, def, style)?;
        }
        Ok(sink)
    }

    fn texts(out: &[Primitive]) -> Vec<String> {
        out.iter()
            .filter_map(|p| match p {
                Primitive::TextRun { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    // ==================== Ray solving tests ====================

    #[test]
    fn quarter_turn_sweep() {
        let out = stroke(&quarter(DimensionKind::AngleSize), &style()).unwrap();
        assert_eq!(texts(&out), vec!["90°".to_string()]);
        assert_eq!(out.iter().filter(|p| p.is_segment(LineRole::Witness)).count(), 0);
    }

    #[test]
    fn clockwise_style_measures_the_reflex_angle() {
        let mut style = style();
        style.clockwise = true;
        let out = stroke(&quarter(DimensionKind::AngleSize), &style).unwrap();
        assert_eq!(texts(&out), vec!["270°".to_string()]);
    }

    #[test]
    fn quadrant_mirrors_the_start_ray() {
        let mut style = style();
        style.quadrant = 1;
        let out = stroke(&quarter(DimensionKind::AngleSize), &style).unwrap();
        assert_eq!(texts(&out), vec!["270°".to_string()]);
    }

    #[test]
    fn arc_kinds_report_arc_length() {
        let out = stroke(&quarter(DimensionKind::ArcSize), &style()).unwrap();
        assert_eq!(texts(&out), vec![format!("{:.2}", 10.0 * FRAC_PI_2)]);
    }

    #[test]
    fn coincident_ray_is_degenerate() {
        let def = DimensionDefinition::new(
            DimensionKind::AngleSize,
            vec![DVec3::ZERO, DVec3::ZERO, dvec3(0.0, 10.0, 0.0)],
        );
        let err = stroke(&def, &style()).unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateGeometry { segment: 0, .. }));
    }

    #[test]
    fn collinear_rays_have_zero_sweep() {
        let def = DimensionDefinition::new(
            DimensionKind::AngleSize,
            vec![DVec3::ZERO, dvec3(5.0, 0.0, 0.0), dvec3(10.0, 0.0, 0.0)],
        );
        let err = stroke(&def, &style()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::DegenerateGeometry {
                segment: 0,
                reason: "zero sweep"
            }
        );
    }

    // ==================== Arc tests ====================

    #[test]
    fn arc_and_terminators_sit_on_the_radius() {
        let def = quarter(DimensionKind::AngleSize)
            .with_text(0, crate::definition::TextDescriptor::with_offset(2.0));
        let out = stroke(&def, &style()).unwrap();
        let arcs: Vec<_> = out.iter().filter(|p| p.is_arc()).collect();
        assert!(!arcs.is_empty());
        for arc in &arcs {
            let Primitive::Arc { radius, .. } = arc else {
                unreachable!()
            };
            assert_eq!(*radius, 12.0);
        }
        let terms: Vec<DVec3> = out
            .iter()
            .filter_map(|p| match p {
                Primitive::Terminator { point, .. } => Some(*point),
                _ => None,
            })
            .collect();
        assert_eq!(terms.len(), 2);
        assert!((terms[0] - dvec3(12.0, 0.0, 0.0)).length() < 1e-9);
        assert!((terms[1] - dvec3(0.0, 12.0, 0.0)).length() < 1e-9);
        // witnesses run out from the feature points
        assert_eq!(out.iter().filter(|p| p.is_segment(LineRole::Witness)).count(), 2);
    }

    #[test]
    fn inline_text_splits_the_arc() {
        let out = stroke(&quarter(DimensionKind::AngleSize), &style()).unwrap();
        let mut spans: Vec<(f64, f64)> = out
            .iter()
            .filter_map(|p| match p {
                Primitive::Arc {
                    start_angle,
                    end_angle,
                    ..
                } => Some((*start_angle, *end_angle)),
                _ => None,
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        assert_eq!(spans.len(), 2);
        assert!(spans[0].0.abs() < 1e-12);
        assert!((spans[1].1 - FRAC_PI_2).abs() < 1e-12);
        // gap of the text footprint: (1 + 0.2) / 10
        assert!((spans[1].0 - spans[0].1 - 0.12).abs() < 1e-9);
    }

    #[test]
    fn location_chain_reports_running_sweep() {
        let def = DimensionDefinition::new(
            DimensionKind::AngleLocation,
            vec![
                DVec3::ZERO,
                dvec3(10.0, 0.0, 0.0),
                dvec3(0.0, 10.0, 0.0),
                dvec3(-10.0, 0.0, 0.0),
            ],
        );
        let out = stroke(&def, &style()).unwrap();
        assert_eq!(texts(&out), vec!["90°".to_string(), "180°".to_string()]);
    }

    #[test]
    fn stacked_location_grows_the_radius() {
        let mut style = style();
        style.stacked = true;
        let def = DimensionDefinition::new(
            DimensionKind::AngleLocation,
            vec![
                DVec3::ZERO,
                dvec3(10.0, 0.0, 0.0),
                dvec3(0.0, 10.0, 0.0),
                dvec3(-10.0, 0.0, 0.0),
            ],
        );
        let out = stroke(&def, &style).unwrap();
        assert_eq!(texts(&out), vec!["90°".to_string(), "180°".to_string()]);
        let radii: Vec<f64> = out
            .iter()
            .filter_map(|p| match p {
                Primitive::Arc { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert!(radii.iter().any(|r| *r > 10.0));
    }

    #[test]
    fn chord_variant_uses_parallel_witnesses() {
        let mut style = style();
        style.chord_witnesses = true;
        let def = quarter(DimensionKind::ArcSize)
            .with_text(0, crate::definition::TextDescriptor::with_offset(2.0));
        let out = stroke(&def, &style).unwrap();
        let bisector = dvec3(1.0, 1.0, 0.0).normalize();
        for p in out.iter().filter(|p| p.is_segment(LineRole::Witness)) {
            let Primitive::Segment { p0, p1, .. } = p else {
                unreachable!()
            };
            let dir = (*p1 - *p0).normalize();
            assert!((dir - bisector).length() < 1e-9);
        }
        let Some(Primitive::Arc { center, radius, .. }) = out.iter().find(|p| p.is_arc()) else {
            panic!("expected an arc");
        };
        assert_eq!(*radius, 10.0);
        assert!((*center - bisector * 2.0).length() < 1e-9);
    }

    #[test]
    fn degree_minute_format_is_used() {
        let mut style = style();
        style.format.angle_format = AngleFormat::DegMin;
        let def = DimensionDefinition::new(
            DimensionKind::AngleSize,
            vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0), dvec3(10.0, 10.0, 0.0)],
        );
        let out = stroke(&def, &style).unwrap();
        assert_eq!(texts(&out), vec!["45°0'".to_string()]);
    }
}
