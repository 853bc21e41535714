//! Declarative text style.
//!
//! `StyleSpec` is a flat record so it round-trips through the scene
//! persistence format unchanged. Every field has a default; any subset of
//! fields deserializes. Lengths are em ratios unless noted otherwise.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sumi_text::{LayoutParams, Orientation};

use crate::color::parse_color;
use crate::error::Diagnostic;

pub const FONT_SIZE_RANGE: (f32, f32) = (1.0, 1024.0);
pub const SPACING_RANGE: (f32, f32) = (-0.5, 5.0);
pub const MARGIN_RANGE: (f32, f32) = (0.0, 5.0);
pub const OPACITY_RANGE: (f32, f32) = (0.0, 100.0);
pub const BLUR_RANGE: (f32, f32) = (0.0, 100.0);
pub const OUTLINE_WIDTH_RANGE: (f32, f32) = (0.0, 200.0);
pub const SHADOW_OFFSET_RANGE: (f32, f32) = (-5.0, 5.0);
pub const SHADOW_SCALE_RANGE: (f32, f32) = (0.1, 10.0);
pub const RATIO_RANGE: (f32, f32) = (0.0, 1.0);

/// Pixels of blur radius per unit of blur strength.
pub const BLUR_RADIUS_PER_UNIT: f32 = 0.2;

/// One gradient stop. Deserializes from `{"position": .., "color": ..}` or
/// from a `[position, color]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f32,
    pub color: String,
}

impl ColorStop {
    pub fn new(position: f32, color: impl Into<String>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }
}

fn default_gradient() -> Vec<ColorStop> {
    vec![ColorStop::new(0.0, "#000000"), ColorStop::new(1.0, "#FFFFFF")]
}

/// Field names from older records, folded into the current fields by
/// [`StyleSpec::sanitized`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vertical: Option<bool>,
    /// Horizontal character spacing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_margin_ratio: Option<f32>,
    /// Line spacing for both orientations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_margin_ratio: Option<f32>,
}

impl LegacyFields {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    #[serde(alias = "font")]
    pub font_family: String,
    /// Pixels per em.
    pub font_size: f32,
    pub orientation: Orientation,

    pub text_visible: bool,
    pub font_color: String,
    /// Percent.
    pub text_opacity: f32,
    pub text_gradient_enabled: bool,
    pub text_gradient: Vec<ColorStop>,
    /// Degrees.
    pub text_gradient_angle: f32,
    pub text_gradient_opacity: f32,

    pub background_visible: bool,
    pub background_color: String,
    pub background_opacity: f32,
    pub background_corner_ratio: f32,
    pub background_outline_enabled: bool,
    pub background_outline_color: String,
    pub background_outline_opacity: f32,
    pub background_outline_width_ratio: f32,
    pub background_gradient_enabled: bool,
    pub background_gradient: Vec<ColorStop>,
    pub background_gradient_angle: f32,
    pub background_gradient_opacity: f32,

    pub shadow_enabled: bool,
    pub shadow_color: String,
    pub shadow_opacity: f32,
    /// Strength in [0, 100]; see [`BLUR_RADIUS_PER_UNIT`].
    pub shadow_blur: f32,
    /// Kept for persistence; does not affect geometry.
    pub shadow_scale: f32,
    pub shadow_offset_x: f32,
    pub shadow_offset_y: f32,

    pub outline_enabled: bool,
    pub outline_color: String,
    pub outline_opacity: f32,
    /// Pixels.
    pub outline_width: f32,
    pub outline_blur: f32,

    pub second_outline_enabled: bool,
    pub second_outline_color: String,
    pub second_outline_opacity: f32,
    pub second_outline_width: f32,
    pub second_outline_blur: f32,

    pub third_outline_enabled: bool,
    pub third_outline_color: String,
    pub third_outline_opacity: f32,
    pub third_outline_width: f32,
    pub third_outline_blur: f32,

    pub char_spacing_h: f32,
    pub line_spacing_h: f32,
    pub char_spacing_v: f32,
    pub line_spacing_v: f32,

    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub v_margin_top: f32,
    pub v_margin_bottom: f32,
    pub v_margin_left: f32,
    pub v_margin_right: f32,

    #[serde(flatten)]
    pub legacy: LegacyFields,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 48.0,
            orientation: Orientation::Horizontal,

            text_visible: true,
            font_color: "#ffffff".into(),
            text_opacity: 100.0,
            text_gradient_enabled: false,
            text_gradient: default_gradient(),
            text_gradient_angle: 0.0,
            text_gradient_opacity: 100.0,

            background_visible: true,
            background_color: "#000000".into(),
            background_opacity: 100.0,
            background_corner_ratio: 0.2,
            background_outline_enabled: false,
            background_outline_color: "#000000".into(),
            background_outline_opacity: 100.0,
            background_outline_width_ratio: 0.05,
            background_gradient_enabled: false,
            background_gradient: default_gradient(),
            background_gradient_angle: 0.0,
            background_gradient_opacity: 100.0,

            shadow_enabled: false,
            shadow_color: "#000000".into(),
            shadow_opacity: 100.0,
            shadow_blur: 0.0,
            shadow_scale: 1.0,
            shadow_offset_x: 0.1,
            shadow_offset_y: 0.1,

            outline_enabled: false,
            outline_color: "#000000".into(),
            outline_opacity: 100.0,
            outline_width: 5.0,
            outline_blur: 0.0,

            second_outline_enabled: false,
            second_outline_color: "#ffffff".into(),
            second_outline_opacity: 100.0,
            second_outline_width: 10.0,
            second_outline_blur: 0.0,

            third_outline_enabled: false,
            third_outline_color: "#000000".into(),
            third_outline_opacity: 100.0,
            third_outline_width: 15.0,
            third_outline_blur: 0.0,

            char_spacing_h: 0.0,
            line_spacing_h: 0.0,
            char_spacing_v: 0.0,
            line_spacing_v: 0.0,

            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            v_margin_top: 0.0,
            v_margin_bottom: 0.0,
            v_margin_left: 0.0,
            v_margin_right: 0.0,

            legacy: LegacyFields::default(),
        }
    }
}

/// Read-only view of one outline layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineLayer<'a> {
    pub enabled: bool,
    pub color: &'a str,
    pub opacity: f32,
    pub width: f32,
    pub blur: f32,
}

impl OutlineLayer<'_> {
    pub fn is_visible(&self) -> bool {
        self.enabled && self.width > 0.0
    }

    pub fn blur_radius(&self) -> f32 {
        self.blur * BLUR_RADIUS_PER_UNIT
    }
}

/// Per-side lengths.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl StyleSpec {
    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    /// Outline layers, innermost first.
    pub fn outline_layers(&self) -> [OutlineLayer<'_>; 3] {
        [
            OutlineLayer {
                enabled: self.outline_enabled,
                color: &self.outline_color,
                opacity: self.outline_opacity,
                width: self.outline_width,
                blur: self.outline_blur,
            },
            OutlineLayer {
                enabled: self.second_outline_enabled,
                color: &self.second_outline_color,
                opacity: self.second_outline_opacity,
                width: self.second_outline_width,
                blur: self.second_outline_blur,
            },
            OutlineLayer {
                enabled: self.third_outline_enabled,
                color: &self.third_outline_color,
                opacity: self.third_outline_opacity,
                width: self.third_outline_width,
                blur: self.third_outline_blur,
            },
        ]
    }

    /// Shadow offset in pixels.
    pub fn shadow_offset_px(&self) -> [f32; 2] {
        [
            self.shadow_offset_x * self.font_size,
            self.shadow_offset_y * self.font_size,
        ]
    }

    pub fn shadow_blur_radius(&self) -> f32 {
        self.shadow_blur * BLUR_RADIUS_PER_UNIT
    }

    /// Margins of the active orientation, in pixels.
    pub fn margins_px(&self) -> Sides {
        let ratios = if self.is_vertical() {
            [
                self.v_margin_top,
                self.v_margin_bottom,
                self.v_margin_left,
                self.v_margin_right,
            ]
        } else {
            [
                self.margin_top,
                self.margin_bottom,
                self.margin_left,
                self.margin_right,
            ]
        };
        let [top, bottom, left, right] = ratios.map(|ratio| ratio * self.font_size);
        Sides {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Spacing of the active orientation, in pixels.
    pub fn layout_params(&self) -> LayoutParams {
        let (char_spacing, line_spacing) = if self.is_vertical() {
            (self.char_spacing_v, self.line_spacing_v)
        } else {
            (self.char_spacing_h, self.line_spacing_h)
        };
        LayoutParams {
            orientation: self.orientation,
            char_spacing: char_spacing * self.font_size,
            line_spacing: line_spacing * self.font_size,
        }
    }

    /// Background border width in pixels, zero when the border is off.
    pub fn background_border_width(&self) -> f32 {
        if self.background_outline_enabled {
            (self.background_outline_width_ratio * self.font_size).max(1.0)
        } else {
            0.0
        }
    }

    /// Text gradient stops when the gradient is on and usable.
    pub fn text_gradient_stops(&self) -> Option<&[ColorStop]> {
        (self.text_gradient_enabled && !self.text_gradient.is_empty())
            .then_some(self.text_gradient.as_slice())
    }

    pub fn background_gradient_stops(&self) -> Option<&[ColorStop]> {
        (self.background_gradient_enabled && !self.background_gradient.is_empty())
            .then_some(self.background_gradient.as_slice())
    }

    /// Copy with legacy fields folded in and every value forced into range.
    ///
    /// Each adjustment is reported as a diagnostic; the input is never
    /// rejected.
    pub fn sanitized(&self) -> (StyleSpec, Vec<Diagnostic>) {
        let mut spec = self.clone();
        let mut s = Sanitizer::default();
        spec.fold_legacy();

        let defaults = StyleSpec::default();
        if spec.font_family.trim().is_empty() {
            s.note("font_family is empty, using the default family");
            spec.font_family = defaults.font_family.clone();
        }
        s.clamp("font_size", &mut spec.font_size, FONT_SIZE_RANGE, defaults.font_size);

        for (name, value) in [
            ("char_spacing_h", &mut spec.char_spacing_h),
            ("line_spacing_h", &mut spec.line_spacing_h),
            ("char_spacing_v", &mut spec.char_spacing_v),
            ("line_spacing_v", &mut spec.line_spacing_v),
        ] {
            s.clamp(name, value, SPACING_RANGE, 0.0);
        }
        for (name, value) in [
            ("margin_top", &mut spec.margin_top),
            ("margin_bottom", &mut spec.margin_bottom),
            ("margin_left", &mut spec.margin_left),
            ("margin_right", &mut spec.margin_right),
            ("v_margin_top", &mut spec.v_margin_top),
            ("v_margin_bottom", &mut spec.v_margin_bottom),
            ("v_margin_left", &mut spec.v_margin_left),
            ("v_margin_right", &mut spec.v_margin_right),
        ] {
            s.clamp(name, value, MARGIN_RANGE, 0.0);
        }
        for (name, value) in [
            ("text_opacity", &mut spec.text_opacity),
            ("text_gradient_opacity", &mut spec.text_gradient_opacity),
            ("background_opacity", &mut spec.background_opacity),
            ("background_outline_opacity", &mut spec.background_outline_opacity),
            ("background_gradient_opacity", &mut spec.background_gradient_opacity),
            ("shadow_opacity", &mut spec.shadow_opacity),
            ("outline_opacity", &mut spec.outline_opacity),
            ("second_outline_opacity", &mut spec.second_outline_opacity),
            ("third_outline_opacity", &mut spec.third_outline_opacity),
        ] {
            s.clamp(name, value, OPACITY_RANGE, 100.0);
        }
        for (name, value) in [
            ("shadow_blur", &mut spec.shadow_blur),
            ("outline_blur", &mut spec.outline_blur),
            ("second_outline_blur", &mut spec.second_outline_blur),
            ("third_outline_blur", &mut spec.third_outline_blur),
        ] {
            s.clamp(name, value, BLUR_RANGE, 0.0);
        }
        for (name, value, default) in [
            ("outline_width", &mut spec.outline_width, defaults.outline_width),
            (
                "second_outline_width",
                &mut spec.second_outline_width,
                defaults.second_outline_width,
            ),
            (
                "third_outline_width",
                &mut spec.third_outline_width,
                defaults.third_outline_width,
            ),
        ] {
            s.clamp(name, value, OUTLINE_WIDTH_RANGE, default);
        }
        s.clamp("shadow_offset_x", &mut spec.shadow_offset_x, SHADOW_OFFSET_RANGE, 0.1);
        s.clamp("shadow_offset_y", &mut spec.shadow_offset_y, SHADOW_OFFSET_RANGE, 0.1);
        s.clamp("shadow_scale", &mut spec.shadow_scale, SHADOW_SCALE_RANGE, 1.0);
        s.clamp(
            "background_corner_ratio",
            &mut spec.background_corner_ratio,
            RATIO_RANGE,
            defaults.background_corner_ratio,
        );
        s.clamp(
            "background_outline_width_ratio",
            &mut spec.background_outline_width_ratio,
            RATIO_RANGE,
            defaults.background_outline_width_ratio,
        );
        spec.text_gradient_angle = normalize_angle(spec.text_gradient_angle);
        spec.background_gradient_angle = normalize_angle(spec.background_gradient_angle);

        for (name, value, default) in [
            ("font_color", &mut spec.font_color, defaults.font_color.as_str()),
            (
                "background_color",
                &mut spec.background_color,
                defaults.background_color.as_str(),
            ),
            (
                "background_outline_color",
                &mut spec.background_outline_color,
                defaults.background_outline_color.as_str(),
            ),
            ("shadow_color", &mut spec.shadow_color, defaults.shadow_color.as_str()),
            ("outline_color", &mut spec.outline_color, defaults.outline_color.as_str()),
            (
                "second_outline_color",
                &mut spec.second_outline_color,
                defaults.second_outline_color.as_str(),
            ),
            (
                "third_outline_color",
                &mut spec.third_outline_color,
                defaults.third_outline_color.as_str(),
            ),
        ] {
            s.color(name, value, default);
        }

        s.stops("text_gradient", &mut spec.text_gradient);
        s.stops("background_gradient", &mut spec.background_gradient);
        if spec.text_gradient_enabled && spec.text_gradient.is_empty() {
            s.note("text_gradient has no usable stops, filling with font_color");
        }
        if spec.background_gradient_enabled && spec.background_gradient.is_empty() {
            s.note("background_gradient has no usable stops, filling with background_color");
        }

        (spec, s.diagnostics)
    }

    fn fold_legacy(&mut self) {
        let legacy = std::mem::take(&mut self.legacy);
        if legacy.is_vertical == Some(true) && self.orientation == Orientation::Horizontal {
            self.orientation = Orientation::Vertical;
        }
        if let Some(ratio) = legacy.horizontal_margin_ratio {
            if self.char_spacing_h == 0.0 {
                self.char_spacing_h = ratio;
            }
        }
        if let Some(ratio) = legacy.vertical_margin_ratio {
            if self.line_spacing_h == 0.0 {
                self.line_spacing_h = ratio;
            }
            if self.line_spacing_v == 0.0 {
                self.line_spacing_v = ratio;
            }
        }
    }
}

/// Narrow capability for anything that can describe a style, so thumbnail
/// generators and windows can share the renderer without a window type.
pub trait StyleSource {
    fn style(&self) -> Cow<'_, StyleSpec>;
}

impl StyleSource for StyleSpec {
    fn style(&self) -> Cow<'_, StyleSpec> {
        Cow::Borrowed(self)
    }
}

fn normalize_angle(angle: f32) -> f32 {
    if angle.is_finite() {
        angle.rem_euclid(360.0)
    } else {
        0.0
    }
}

#[derive(Default)]
struct Sanitizer {
    diagnostics: Vec<Diagnostic>,
}

impl Sanitizer {
    fn note(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(message));
    }

    fn clamp(&mut self, field: &str, value: &mut f32, (min, max): (f32, f32), default: f32) {
        if value.is_nan() {
            self.note(format!("{field} is not a number, using {default}"));
            *value = default;
            return;
        }
        let clamped = value.clamp(min, max);
        if clamped != *value {
            self.note(format!("{field} {value} clamped to {clamped}"));
            *value = clamped;
        }
    }

    fn color(&mut self, field: &str, value: &mut String, default: &str) {
        if parse_color(value).is_none() {
            self.note(format!("{field} `{value}` is not a color, using {default}"));
            *value = default.to_string();
        }
    }

    fn stops(&mut self, field: &str, stops: &mut Vec<ColorStop>) {
        let before = stops.len();
        stops.retain(|stop| parse_color(&stop.color).is_some());
        if stops.len() != before {
            self.note(format!(
                "{field}: dropped {} stop(s) with invalid colors",
                before - stops.len()
            ));
        }

        let mut adjusted = false;
        for stop in stops.iter_mut() {
            let position = if stop.position.is_nan() {
                0.0
            } else {
                stop.position.clamp(0.0, 1.0)
            };
            if position != stop.position {
                stop.position = position;
                adjusted = true;
            }
        }
        if adjusted {
            self.note(format!("{field}: stop positions clamped into [0, 1]"));
        }

        if !stops.is_sorted_by(|a, b| a.position <= b.position) {
            stops.sort_by(|a, b| a.position.total_cmp(&b.position));
            self.note(format!("{field}: stops sorted by position"));
        }
    }
}
