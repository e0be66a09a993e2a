use dimstroke::style::{StyleProperty, StyleValue, TextLocation};
use dimstroke::types::{Frame, Length};
use dimstroke::{
    DimensionDefinition, DimensionKind, Justification, LayoutError, LineRole, MonospaceMetrics, OverrideTable, Primitive,
    StrategyRegistry, StyleConfiguration, TextBlockMetrics, TextDescriptor, TextMetrics, stroke,
};
use glam::{DVec3, dvec3};

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

fn run(def: &DimensionDefinition, resolver: &dyn dimstroke::StyleResolver) -> (Vec<Primitive>, Result<(), LayoutError>) {
    let mut sink: Vec<Primitive> = Vec::new();
    let result = stroke(def, resolver, &FixedMetrics, &mut sink);
    (sink, result)
}

fn count(out: &[Primitive], role: LineRole) -> usize {
    out.iter().filter(|p| p.is_segment(role)).count()
}

#[test]
fn linear_text_splits_the_line() {
    let def = DimensionDefinition::new(DimensionKind::LinearSize, vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0)]);
    let (out, result) = run(&def, &style());
    result.unwrap();

    let lines: Vec<(f64, f64)> = out
        .iter()
        .filter_map(|p| match p {
            Primitive::Segment {
                p0,
                p1,
                role: LineRole::DimensionLine,
                ..
            } => Some((p0.x.min(p1.x), p0.x.max(p1.x))),
            _ => None,
        })
        .collect();
    assert_eq!(lines.len(), 2);
    assert!((lines[0].0 - 0.0).abs() < 1e-9 && (lines[0].1 - 3.0).abs() < 1e-9);
    assert!((lines[1].0 - 7.0).abs() < 1e-9 && (lines[1].1 - 10.0).abs() < 1e-9);

    let terminators: Vec<(DVec3, DVec3)> = out
        .iter()
        .filter_map(|p| match p {
            Primitive::Terminator { point, direction, .. } => Some((*point, *direction)),
            _ => None,
        })
        .collect();
    assert_eq!(
        terminators,
        vec![
            (DVec3::ZERO, dvec3(-1.0, 0.0, 0.0)),
            (dvec3(10.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0)),
        ]
    );
    assert_eq!(count(&out, LineRole::Leader), 0);
}

#[test]
fn text_above_keeps_the_line_whole() {
    let mut style = style();
    style.text_location = TextLocation::Above;
    let def = DimensionDefinition::new(DimensionKind::LinearSize, vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0)]);
    let (out, result) = run(&def, &style);
    result.unwrap();
    assert_eq!(count(&out, LineRole::DimensionLine), 1);
    assert_eq!(out.iter().filter(|p| p.is_terminator()).count(), 2);
    assert_eq!(count(&out, LineRole::Leader), 0);
}

#[test]
fn failing_segment_keeps_earlier_ones() {
    // the second segment has no extent along x
    let def = DimensionDefinition::new(
        DimensionKind::LinearSize,
        vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0), dvec3(10.0, 5.0, 0.0)],
    )
    .with_text(0, TextDescriptor::with_offset(1.0));
    let (out, result) = run(&def, &style());
    assert_eq!(
        result,
        Err(LayoutError::DegenerateGeometry {
            segment: 1,
            reason: "zero-length linear span",
        })
    );
    assert_eq!(out.iter().filter(|p| p.is_text()).count(), 1);
    assert_eq!(count(&out, LineRole::Witness), 2);
}

#[test]
fn overrides_reach_their_segment_only() {
    let base = style();
    let mut table = OverrideTable::new(base);
    table.set(1, StyleProperty::TextLocation, StyleValue::Location(TextLocation::Above));
    let def = DimensionDefinition::new(
        DimensionKind::LinearSize,
        vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0), dvec3(20.0, 0.0, 0.0)],
    );
    let (out, result) = run(&def, &table);
    result.unwrap();
    // split line for the inline segment, whole line for the one above
    assert_eq!(count(&out, LineRole::DimensionLine), 3);
}

#[test]
fn angular_quarter_turn() {
    let def = DimensionDefinition::new(
        DimensionKind::AngleSize,
        vec![DVec3::ZERO, dvec3(10.0, 0.0, 0.0), dvec3(0.0, 10.0, 0.0)],
    )
    .with_text(0, TextDescriptor::with_offset(5.0));
    let (out, result) = run(&def, &style());
    result.unwrap();
    assert_eq!(count(&out, LineRole::Witness), 2);
    assert_eq!(out.iter().filter(|p| p.is_terminator()).count(), 2);
    assert!(out.iter().any(|p| p.is_arc()));
    let text: Vec<&str> = out
        .iter()
        .filter_map(|p| match p {
            Primitive::TextRun { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, vec!["90°"]);
}

#[test]
fn every_kind_strokes_with_real_metrics() {
    let style = StyleConfiguration::default();
    let cases = [
        (DimensionKind::LinearSize, vec![DVec3::ZERO, dvec3(2.0, 0.0, 0.0)]),
        (DimensionKind::LinearLocation, vec![DVec3::ZERO, dvec3(1.0, 0.0, 0.0), dvec3(2.0, 0.0, 0.0)]),
        (DimensionKind::AngleSize, vec![DVec3::ZERO, dvec3(1.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0)]),
        (DimensionKind::ArcSize, vec![DVec3::ZERO, dvec3(1.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0)]),
        (
            DimensionKind::AngleLocation,
            vec![DVec3::ZERO, dvec3(1.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0), dvec3(-1.0, 0.0, 0.0)],
        ),
        (
            DimensionKind::ArcLocation,
            vec![DVec3::ZERO, dvec3(1.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0), dvec3(-1.0, 0.0, 0.0)],
        ),
        (
            DimensionKind::Ordinate,
            vec![DVec3::ZERO, dvec3(0.0, 1.0, 0.0), dvec3(0.0, 2.0, 0.0)],
        ),
        (DimensionKind::LabelLine, vec![DVec3::ZERO, dvec3(1.0, 1.0, 0.0)]),
    ];
    let registry = StrategyRegistry::default();
    for (kind, points) in cases {
        let def = DimensionDefinition::new(kind, points).with_text(0, TextDescriptor::with_offset(0.5));
        let mut sink: Vec<Primitive> = Vec::new();
        registry
            .stroke(&def, &style, &MonospaceMetrics, &mut sink)
            .unwrap_or_else(|err| panic!("{kind:?} failed: {err}"));
        assert!(sink.iter().any(|p| p.is_text()), "{kind:?} produced no text");
    }
}

#[test]
fn rotated_frame_with_replaced_text() {
    // local x runs along world y
    let frame = Frame::new(DVec3::Y, -DVec3::X, DVec3::Z);
    let def = DimensionDefinition::new(DimensionKind::LinearSize, vec![DVec3::ZERO, dvec3(0.0, 10.0, 0.0)])
        .with_frame(frame)
        .with_view(Frame::IDENTITY)
        .with_text(
            1,
            TextDescriptor::default()
                .with_content("A")
                .with_justification(Justification::Start),
        );
    let (out, result) = run(&def, &style());
    result.unwrap();
    let text: Vec<&str> = out
        .iter()
        .filter_map(|p| match p {
            Primitive::TextRun { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, vec!["A"]);
    assert!(out.iter().any(|p| matches!(p, Primitive::Terminator { point, .. } if (*point - dvec3(0.0, 10.0, 0.0)).length() < 1e-9)));
}
