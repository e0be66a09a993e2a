//! Measurement strings: lengths, angles and label-line directions.

use crate::style::{AccuracyMode, AngleFormat, DirectionMode, FormatStyle, LabelLineStyle};

/// Format a plain number with `accuracy` decimals
pub fn format_number(value: f64, accuracy: u8, leading_zero: bool, trailing_zeros: bool) -> String {
    let places = accuracy as usize;
    let mut s = format!("{:.*}", places, value);
    // "-0.00" reads as zero
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s.remove(0);
    }
    if !trailing_zeros && s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if !leading_zero {
        if let Some(rest) = s.strip_prefix("0.") {
            s = format!(".{rest}");
        } else if let Some(rest) = s.strip_prefix("-0.") {
            s = format!("-.{rest}");
        }
    }
    s
}

/// Format a linear measurement
pub fn format_length(value: f64, style: &FormatStyle) -> String {
    format_number(
        value,
        style.primary_accuracy,
        style.leading_zero,
        style.trailing_zeros,
    )
}

/// Floating accuracy: the accuracy value also selects the angle format.
///
/// The degree-minute case deliberately continues into the
/// degree-minute-second adjustment, so a DegMin request with enough
/// accuracy comes out as DegMinSec.
pub fn floating_angle_format(format: AngleFormat, accuracy: u8) -> (AngleFormat, u8) {
    let mut format = format;
    let mut accuracy = accuracy as i32;
    let degmin = format == AngleFormat::DegMin;

    if degmin {
        if accuracy <= 0 {
            format = AngleFormat::Degrees;
            accuracy = 0;
        } else {
            format = AngleFormat::DegMin;
            accuracy -= 1;
        }
    }
    if degmin || format == AngleFormat::DegMinSec {
        if accuracy <= 0 {
            format = AngleFormat::Degrees;
            accuracy = 0;
        } else if accuracy == 1 {
            format = AngleFormat::DegMin;
            accuracy = 0;
        } else {
            format = AngleFormat::DegMinSec;
            accuracy -= 2;
        }
    }
    (format, accuracy.max(0) as u8)
}

/// Effective angle format and accuracy of a style
pub fn angle_format_of(style: &FormatStyle) -> (AngleFormat, u8) {
    match style.accuracy_mode {
        AccuracyMode::Fixed => (style.angle_format, style.angle_accuracy),
        AccuracyMode::Floating => floating_angle_format(style.angle_format, style.angle_accuracy),
    }
}

/// Round `value` to `accuracy` decimals, returning the rounded value
fn round_to(value: f64, accuracy: u8) -> f64 {
    let scale = 10f64.powi(accuracy as i32);
    (value * scale).round() / scale
}

/// Format an angle given in degrees
pub fn format_angle(
    degrees: f64,
    format: AngleFormat,
    accuracy: u8,
    leading_zero: bool,
    trailing_zeros: bool,
) -> String {
    let sign = if degrees < 0.0 { "-" } else { "" };
    let abs = degrees.abs();
    let num = |v: f64| format_number(v, accuracy, leading_zero, trailing_zeros);
    let body = match format {
        AngleFormat::Degrees => format!("{}°", num(abs)),
        AngleFormat::DegMin => {
            let minutes = round_to(abs * 60.0, accuracy);
            let deg = (minutes / 60.0).floor();
            format!("{}°{}'", deg as i64, num(minutes - deg * 60.0))
        }
        AngleFormat::DegMinSec => {
            let seconds = round_to(abs * 3600.0, accuracy);
            let deg = (seconds / 3600.0).floor();
            let rest = seconds - deg * 3600.0;
            let min = (rest / 60.0).floor();
            format!("{}°{}'{}\"", deg as i64, min as i64, num(rest - min * 60.0))
        }
        AngleFormat::Centesimal => format!("{}g", num(abs * 400.0 / 360.0)),
        AngleFormat::Radians => format!("{}r", num(abs.to_radians())),
    };
    if body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("{sign}{body}")
    } else {
        body
    }
}

/// Format an angle with the style's (possibly floating) angle settings
pub fn format_angle_for(degrees: f64, style: &FormatStyle) -> String {
    let (format, accuracy) = angle_format_of(style);
    format_angle(
        degrees,
        format,
        accuracy,
        style.leading_zero,
        style.trailing_zeros,
    )
}

fn wrap_degrees(deg: f64) -> f64 {
    let d = deg % 360.0;
    if d < 0.0 { d + 360.0 } else { d }
}

/// Direction of a line for label-line text.
/// `degrees` is measured counter-clockwise from the drawing x axis.
pub fn format_direction(degrees: f64, label: &LabelLineStyle, style: &FormatStyle) -> String {
    let (format, accuracy) = angle_format_of(style);
    let angle = |v: f64| format_angle(v, format, accuracy, style.leading_zero, style.trailing_zeros);
    match label.direction_mode {
        DirectionMode::Angle => {
            let mut a = degrees - label.base_direction;
            if label.clockwise {
                a = -a;
            }
            angle(wrap_degrees(a))
        }
        DirectionMode::Azimuth => angle(wrap_degrees(90.0 - degrees)),
        DirectionMode::Bearing => {
            let az = wrap_degrees(90.0 - degrees);
            if az <= 90.0 {
                format!("N{}E", angle(az))
            } else if az <= 180.0 {
                format!("S{}E", angle(180.0 - az))
            } else if az <= 270.0 {
                format!("S{}W", angle(az - 180.0))
            } else {
                format!("N{}W", angle(360.0 - az))
            }
        }
    }
}
