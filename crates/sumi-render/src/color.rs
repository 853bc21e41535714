//! CSS color strings to tiny-skia paints.

use tiny_skia::{Color, GradientStop, LinearGradient, Point, Rect, Shader, SpreadMode, Transform};

use crate::style::ColorStop;

/// Parse a CSS color string into straight RGBA bytes.
pub fn parse_color(css: &str) -> Option<[u8; 4]> {
    csscolorparser::parse(css.trim()).ok().map(|c| c.to_rgba8())
}

/// Color for `css` with its alpha scaled by `opacity` percent.
///
/// Unparseable strings paint black; styles are sanitized before painting so
/// this only matters for callers that skip sanitation.
pub fn paint_color(css: &str, opacity: f32) -> Color {
    let [r, g, b, a] = parse_color(css).unwrap_or([0, 0, 0, 255]);
    let alpha = (a as f32 * (opacity / 100.0).clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(r, g, b, alpha)
}

/// Linear gradient across `rect` at `angle` degrees.
///
/// The gradient line runs through the rectangle center and spans its
/// diagonal, so every angle covers the whole rectangle.
pub fn linear_gradient(
    rect: Rect,
    stops: &[ColorStop],
    angle: f32,
    opacity: f32,
) -> Option<Shader<'static>> {
    let cx = rect.x() + rect.width() / 2.0;
    let cy = rect.y() + rect.height() / 2.0;
    let half = rect.width().hypot(rect.height()) / 2.0;
    let (sin, cos) = angle.to_radians().sin_cos();
    let (dx, dy) = (cos * half, sin * half);

    let stops: Vec<GradientStop> = stops
        .iter()
        .map(|stop| GradientStop::new(stop.position, paint_color(&stop.color, opacity)))
        .collect();
    LinearGradient::new(
        Point::from_xy(cx - dx, cy - dy),
        Point::from_xy(cx + dx, cy + dy),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}
