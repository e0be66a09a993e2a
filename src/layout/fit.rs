//! Fit evaluation: do text and terminators fit between the witness lines?
//!
//! Everything here is a pure function of sizes and style. Equality with the
//! available span counts as a fit; "does not fit" is always a strict `<`.

use glam::DVec3;

use super::context::FitState;
use super::defaults;
use crate::definition::Justification;
use crate::metrics::BlockJustification;
use crate::style::{FitOption, GlyphKind, StyleConfiguration, TerminatorMode};
use crate::types::{EPSILON, Size2, safe_div};

/// Length of the dimension direction `check` (view space) covered by a
/// `size` text box grown by `margin` on its governing side.
///
/// Similar triangles: the box is cut by its top/bottom edges when
/// `|cy·w| > |cx·h|`, by its left/right edges otherwise.
pub fn intersect_length(check: DVec3, size: Size2, margin: f64) -> f64 {
    let (w, h) = (size.x, size.y);
    if (check.y * w).abs() > (check.x * h).abs() {
        safe_div(h + margin, check.y).abs()
    } else {
        safe_div(w + margin, check.x).abs()
    }
}

/// Extent of the margin-grown box projected onto `check`
pub fn project_text_size(check: DVec3, size: Size2, margin: f64) -> f64 {
    (size.x + 2.0 * margin) * check.x.abs() + (size.y + 2.0 * margin) * check.y.abs()
}

/// Boundary rule: exact equality fits
#[inline]
pub fn fits_span(required: f64, available: f64) -> bool {
    required <= available
}

/// Minimum leader lengths in effect for one segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinLeaders {
    pub inside: f64,
    pub outside: f64,
}

pub fn effective_min_leaders(style: &StyleConfiguration, angular: bool, fit_terms_inside: bool) -> MinLeaders {
    let fallback = defaults::LEADER_CHARS * style.char_width.raw();
    let (inside, outside) = if style.ignore_min_leader {
        let tw = style.terminators.width.raw();
        let tm = style.text_margin.raw();
        let line_through = style.terminators.left == GlyphKind::Stroke;
        let inside = if angular {
            tw
        } else if line_through {
            tm
        } else {
            tw + tm
        };
        let outside = if fit_terms_inside { tw } else { 2.0 * tw };
        (inside, outside)
    } else {
        let margin = style.min_leader.raw();
        (margin, margin)
    };
    let or_fallback = |v: f64| if v == 0.0 { fallback } else { v };
    MinLeaders {
        inside: or_fallback(inside),
        outside: or_fallback(outside),
    }
}

/// Inputs shared by the linear and angular classifiers
#[derive(Clone, Copy, Debug)]
pub struct SpanInput {
    /// Available length between the witness lines (arc length for arcs)
    pub span: f64,
    pub text: Size2,
    /// Dimension direction (or arc tangent) in view space
    pub check: DVec3,
    pub min_leader: f64,
}

/// Result of a fit classification
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitReport {
    pub fits: bool,
    /// Width the text claims along the dimension
    pub effective: f64,
    /// Projected width of inclined horizontal text, 0 when unused
    pub projected: f64,
    /// Extra clearance used when checking terminators against text
    pub fit_margin: f64,
    /// Span the terminators compete for (the chord for some arc options)
    pub span: f64,
}

fn mode_allows(mode: TerminatorMode, automatic_fit: bool) -> bool {
    match mode {
        TerminatorMode::Reversed | TerminatorMode::Inside => true,
        TerminatorMode::Automatic => automatic_fit,
        TerminatorMode::Outside => false,
    }
}

/// Inclined: neither horizontal nor vertical in view space
fn is_inclined(check: DVec3) -> bool {
    check.x.abs() > EPSILON && check.y.abs() > EPSILON
}

/// Classify the text band of a linear dimension
pub fn linear_fit(style: &StyleConfiguration, input: &SpanInput) -> FitReport {
    let w = input.text.x;
    let m = style.text_margin.raw();
    let tw = style.terminators.width.raw();
    let len = input.span;
    let min_l = input.min_leader;
    let auto = style.terminator_mode == TerminatorMode::Automatic;
    let horizontal = style.is_horizontal_text();
    let mut projected = 0.0;

    let (fits, effective) = if auto && style.fit_inclined_text_box && horizontal {
        let mut eff = intersect_length(input.check, input.text, 2.0 * m);
        let mut fits = fits_span(eff + 2.0 * min_l, len);
        if is_inclined(input.check) {
            eff = project_text_size(input.check, input.text, m);
            projected = eff;
            if eff >= len {
                fits = false;
            }
        }
        (fits, eff)
    } else if auto && style.tight_fit_text_above {
        let required = (2.0 * tw).max(w) + 2.0 * m;
        (fits_span(required, len), w + 2.0 * m)
    } else if auto && style.ignore_min_leader {
        let eff = if horizontal {
            intersect_length(input.check, input.text, 2.0 * m)
        } else {
            w + 2.0 * m
        };
        (fits_span(eff + 2.0 * min_l, len), eff)
    } else if horizontal {
        let eff = intersect_length(input.check, input.text, 2.0 * m);
        (fits_span(eff + 2.0 * min_l, len), eff)
    } else {
        (fits_span(w + 2.0 * (m + min_l), len), w + 2.0 * m)
    };

    FitReport {
        fits: mode_allows(style.terminator_mode, fits),
        effective,
        projected,
        fit_margin: 0.0,
        span: len,
    }
}

/// Arc geometry the angular classifier needs
#[derive(Clone, Copy, Debug)]
pub struct ArcSpan {
    pub radius: f64,
    pub sweep: f64,
    /// Horizontal text leaning against the arc tangent
    pub inclined: bool,
    /// Tangent used for inclined text, view space
    pub inclined_check: DVec3,
}

/// Chord of an arc, capped at the diameter
pub fn chord_length(radius: f64, sweep: f64) -> f64 {
    if sweep < std::f64::consts::PI {
        2.0 * radius * (sweep / 2.0).sin()
    } else {
        2.0 * radius
    }
}

/// Text with minimum leaders on both sides fits the span
pub fn min_leader_fit(check: DVec3, size: Size2, margin: f64, min_leader: f64, span: f64) -> bool {
    let eff = intersect_length(check, size, 2.0 * margin);
    let min_l = (min_leader - margin).max(0.0);
    fits_span(eff + 2.0 * min_l, span)
}

/// Classify the text band of an angular dimension
pub fn angular_fit(style: &StyleConfiguration, input: &SpanInput, arc: &ArcSpan) -> FitReport {
    let m = style.text_margin.raw();
    let tw = style.terminators.width.raw();
    let mut len = arc.radius * arc.sweep;
    let mut eff = input.text.x;
    let mut fit_margin = 0.0;
    let chord = chord_length(arc.radius, arc.sweep);
    let horizontal = style.is_horizontal_text();

    if style.terminator_mode != TerminatorMode::Automatic {
        return FitReport {
            fits: true,
            effective: eff,
            projected: 0.0,
            fit_margin,
            span: len,
        };
    }

    let fits = if style.tight_fit_text_above {
        if horizontal {
            eff = project_text_size(input.check, input.text, m);
            len = chord;
        } else {
            eff += 2.0 * m;
        }
        fits_span(eff + 2.0 * tw, len)
    } else if style.fit_inclined_text_box && arc.inclined {
        fit_margin = defaults::ARC_FIT_MARGIN * m;
        let chord_margin = if arc.sweep < std::f64::consts::PI {
            tw + defaults::CHORD_MARGIN * m
        } else {
            0.0
        };
        let mut fits = min_leader_fit(arc.inclined_check, input.text, m, input.min_leader, len);
        eff = project_text_size(arc.inclined_check, input.text, m);
        if fits {
            fits = fits_span(eff + 2.0 * chord_margin, chord);
            len = chord;
        }
        fits
    } else if style.fit_option != FitOption::MoveTermsFirst {
        fit_margin = defaults::ARC_FIT_MARGIN * m;
        len = chord;
        min_leader_fit(input.check, input.text, m, input.min_leader, len)
    } else {
        fits_span(eff + 2.0 * m + 2.0 * input.min_leader, len)
    };

    FitReport {
        fits,
        effective: eff,
        projected: 0.0,
        fit_margin,
        span: len,
    }
}

/// Manually placed text sits outside the span or off the line
pub fn text_placed_outside(
    justification: Justification,
    offset_y: f64,
    text: Size2,
    text_lift: f64,
    block: BlockJustification,
    span: f64,
) -> bool {
    let Justification::Manual(along) = justification else {
        return false;
    };
    let half_height = 0.5 * text.y + text_lift;
    if offset_y.abs() > half_height {
        return true;
    }
    let hw = 0.5 * text.x;
    let center = match block {
        BlockJustification::Right => along - hw,
        BlockJustification::Center => along,
        BlockJustification::Left => along + hw,
    };
    center < 0.0 || center > span
}

/// Decide whether terminators stay inside once the text does not fit
pub fn terminators_between(
    style: &StyleConfiguration,
    report: &FitReport,
    inside_min_leader: f64,
    justification: Justification,
) -> bool {
    let terms_width = 2.0 * inside_min_leader;
    if !fits_span(terms_width, report.span) {
        return false;
    }
    let text_fits = report.effective + report.fit_margin < report.span;
    match style.fit_option {
        FitOption::MoveTextFirst => !justification.is_manual(),
        FitOption::MoveEither => !text_fits || terms_width > report.effective,
        _ => false,
    }
}

/// Text dragged out of the span by hand lays out as if it fit, as long as
/// the terminators fit and the fit option lets the text move
fn dragged_out_fits(style: &StyleConfiguration, report: &FitReport, inside_min_leader: f64) -> bool {
    fits_span(2.0 * inside_min_leader, report.span)
        && matches!(
            style.fit_option,
            FitOption::MoveTextFirst | FitOption::KeepTextInside | FitOption::MoveEither
        )
}

/// Apply a fit report to a fresh [`FitState`]
pub fn classify(
    style: &StyleConfiguration,
    report: &FitReport,
    inside_min_leader: f64,
    manual_outside: bool,
    justification: Justification,
) -> FitState {
    let mut state = FitState::fits();
    if report.fits || (manual_outside && dragged_out_fits(style, report, inside_min_leader)) {
        return state;
    }
    state.set_all_dont_fit(true);
    state.set_fit_terms_inside(terminators_between(style, report, inside_min_leader, justification));
    state
}

/// Terminators may be dropped when "suppress unfit terminators" is on
pub fn terminators_suppressable(
    style: &StyleConfiguration,
    justification: Justification,
    fit: &FitState,
    offset: f64,
    span: f64,
) -> bool {
    if matches!(
        style.fit_option,
        FitOption::MoveTextFirst | FitOption::MoveBoth | FitOption::KeepTermsOutside
    ) {
        return false;
    }
    if justification.is_manual() || fit.fit_terms_inside() {
        return false;
    }
    style.fit_option == FitOption::KeepTextInside || (offset > 0.0 && offset < span)
}

/// Whether an extra text margin is reserved around unfit text
pub fn needs_extra_text_margin(style: &StyleConfiguration) -> bool {
    if style.ignore_min_leader || style.tight_fit_text_above {
        return false;
    }
    !matches!(
        style.fit_option,
        FitOption::KeepTextInside | FitOption::MoveTextFirst | FitOption::MoveBoth | FitOption::MoveEither
    )
}

/// Terminator side after applying the terminator mode
pub fn terms_are_inside(mode: TerminatorMode, default: bool, fit_terms_inside: bool) -> bool {
    match mode {
        TerminatorMode::Automatic => fit_terms_inside || default,
        TerminatorMode::Reversed => !default,
        TerminatorMode::Inside => true,
        TerminatorMode::Outside => false,
    }
}

/// Text wider than the span by justification rules
pub fn text_not_fit_by_justification(
    span: f64,
    text_width: f64,
    margin: f64,
    char_width: f64,
    justification: Justification,
    horizontal: bool,
) -> bool {
    let check = text_width + 2.0 * margin;
    if justification == Justification::Center || horizontal {
        span < check
    } else {
        span < check + defaults::LEADER_CHARS * char_width
    }
}
