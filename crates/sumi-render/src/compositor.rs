//! Back-to-front painting of background, shadow, outlines and fill.
//!
//! Glyph geometry is resolved once by [`lock_geometry`] and shared by every
//! layer; layers only differ in paint, stroke and a paint-time translation
//! for the shadow.

use std::sync::Arc;

use sumi_text::{GlyphPath, GlyphPathCache, LayoutResult, MetricsProvider};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::blur::BlurCache;
use crate::color::{linear_gradient, paint_color};
use crate::error::RenderFailure;
use crate::sizing::CanvasSize;
use crate::style::StyleSpec;

/// Cubic control distance for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// One glyph with its final canvas transform.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub ch: char,
    pub path: Arc<GlyphPath>,
    pub transform: Transform,
    /// Glyph cell on the canvas; gradients span this rectangle.
    pub cell: Option<Rect>,
}

/// Resolve every placement to canvas space, with the content box at `origin`.
pub fn lock_geometry(
    layout: &LayoutResult,
    origin: [f32; 2],
    metrics: &MetricsProvider,
    glyphs: &mut GlyphPathCache,
) -> Vec<PlacedGlyph> {
    layout
        .placements
        .iter()
        .map(|placement| {
            let cell = placement.cell;
            PlacedGlyph {
                ch: placement.ch,
                path: glyphs.get_or_build(metrics, placement.ch),
                transform: placement.transform_at(origin),
                cell: Rect::from_xywh(
                    cell.x + origin[0],
                    cell.y + origin[1],
                    cell.width,
                    cell.height,
                ),
            }
        })
        .collect()
}

/// Decoration layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Shadow,
    /// Outline layer by index, 0 being the innermost.
    Outline(usize),
    Fill,
}

impl Layer {
    /// Back to front; outer outlines first.
    pub const PAINT_ORDER: [Layer; 6] = [
        Layer::Background,
        Layer::Shadow,
        Layer::Outline(2),
        Layer::Outline(1),
        Layer::Outline(0),
        Layer::Fill,
    ];
}

#[derive(Clone, Copy)]
enum Coverage<'s> {
    Fill,
    Stroke(&'s Stroke),
}

pub struct Compositor<'a> {
    style: &'a StyleSpec,
    canvas: &'a CanvasSize,
    glyphs: &'a [PlacedGlyph],
}

impl<'a> Compositor<'a> {
    /// `style` is expected to be sanitized.
    pub fn new(style: &'a StyleSpec, canvas: &'a CanvasSize, glyphs: &'a [PlacedGlyph]) -> Self {
        Self {
            style,
            canvas,
            glyphs,
        }
    }

    /// Paint every layer in [`Layer::PAINT_ORDER`].
    pub fn paint(&self, blurs: &mut BlurCache) -> Result<Pixmap, RenderFailure> {
        self.paint_layers(&Layer::PAINT_ORDER, blurs)
    }

    /// Paint only `layers`, in the given order, onto a transparent canvas.
    pub fn paint_layers(
        &self,
        layers: &[Layer],
        blurs: &mut BlurCache,
    ) -> Result<Pixmap, RenderFailure> {
        let mut pixmap = Pixmap::new(self.canvas.width, self.canvas.height).ok_or(
            RenderFailure::Allocation {
                width: self.canvas.width,
                height: self.canvas.height,
            },
        )?;

        for layer in layers {
            match *layer {
                Layer::Background => self.paint_background(&mut pixmap),
                _ if !self.style.text_visible => {}
                Layer::Shadow => self.paint_shadow(&mut pixmap, blurs)?,
                Layer::Outline(index) => self.paint_outline(&mut pixmap, blurs, index)?,
                Layer::Fill => self.paint_fill(&mut pixmap),
            }
        }
        Ok(pixmap)
    }

    fn paint_background(&self, pixmap: &mut Pixmap) {
        let style = self.style;
        if !style.background_visible && !style.background_outline_enabled {
            return;
        }
        let border = self.canvas.border;
        let Some(rect) = Rect::from_xywh(
            border / 2.0,
            border / 2.0,
            pixmap.width() as f32 - border,
            pixmap.height() as f32 - border,
        ) else {
            return;
        };
        let radius = (style.background_corner_ratio * style.font_size)
            .min(rect.width().min(rect.height()) / 2.0);
        let Some(path) = rounded_rect(rect, radius) else {
            return;
        };

        if style.background_visible {
            let gradient = style.background_gradient_stops().and_then(|stops| {
                linear_gradient(
                    rect,
                    stops,
                    style.background_gradient_angle,
                    style.background_gradient_opacity,
                )
            });
            let paint = match gradient {
                Some(shader) => Paint {
                    shader,
                    anti_alias: true,
                    ..Paint::default()
                },
                None => solid(paint_color(
                    &style.background_color,
                    style.background_opacity,
                )),
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        if border > 0.0 {
            let paint = solid(paint_color(
                &style.background_outline_color,
                style.background_outline_opacity,
            ));
            let stroke = Stroke {
                width: border,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn paint_shadow(&self, pixmap: &mut Pixmap, blurs: &mut BlurCache) -> Result<(), RenderFailure> {
        let style = self.style;
        if !style.shadow_enabled {
            return Ok(());
        }
        let paint = solid(paint_color(&style.shadow_color, style.shadow_opacity));
        self.paint_glyphs(
            pixmap,
            blurs,
            &paint,
            Coverage::Fill,
            style.shadow_offset_px(),
            style.shadow_blur_radius(),
        )
    }

    fn paint_outline(
        &self,
        pixmap: &mut Pixmap,
        blurs: &mut BlurCache,
        index: usize,
    ) -> Result<(), RenderFailure> {
        let layers = self.style.outline_layers();
        let Some(layer) = layers.get(index).filter(|layer| layer.is_visible()) else {
            return Ok(());
        };
        let stroke = Stroke {
            width: layer.width,
            line_join: LineJoin::Round,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        let paint = solid(paint_color(layer.color, layer.opacity));
        self.paint_glyphs(
            pixmap,
            blurs,
            &paint,
            Coverage::Stroke(&stroke),
            [0.0, 0.0],
            layer.blur_radius(),
        )
    }

    fn paint_fill(&self, pixmap: &mut Pixmap) {
        let style = self.style;
        let flat = solid(paint_color(&style.font_color, style.text_opacity));
        let stops = style.text_gradient_stops();

        for glyph in self.glyphs {
            let Some(path) = glyph.path.path.as_ref() else {
                continue;
            };
            let gradient = stops.zip(glyph.cell).and_then(|(stops, cell)| {
                linear_gradient(
                    cell,
                    stops,
                    style.text_gradient_angle,
                    style.text_gradient_opacity,
                )
            });
            match gradient {
                Some(shader) => {
                    let paint = Paint {
                        shader,
                        anti_alias: true,
                        ..Paint::default()
                    };
                    pixmap.fill_path(path, &paint, FillRule::Winding, glyph.transform, None);
                }
                None => pixmap.fill_path(path, &flat, FillRule::Winding, glyph.transform, None),
            }
        }
    }

    /// Paint glyph coverage shifted by `shift`. Blurred layers go through an
    /// alpha mask; sharp layers are drawn directly.
    fn paint_glyphs(
        &self,
        pixmap: &mut Pixmap,
        blurs: &mut BlurCache,
        paint: &Paint<'_>,
        coverage: Coverage<'_>,
        shift: [f32; 2],
        blur_radius: f32,
    ) -> Result<(), RenderFailure> {
        let shapes = self.glyphs.iter().filter_map(|glyph| {
            let path = glyph.path.path.as_ref()?;
            Some((path, glyph.transform.post_translate(shift[0], shift[1])))
        });

        if blur_radius.round() < 1.0 {
            for (path, transform) in shapes {
                match coverage {
                    Coverage::Fill => {
                        pixmap.fill_path(path, paint, FillRule::Winding, transform, None)
                    }
                    Coverage::Stroke(stroke) => {
                        pixmap.stroke_path(path, paint, stroke, transform, None)
                    }
                }
            }
            return Ok(());
        }

        let (width, height) = (pixmap.width(), pixmap.height());
        let mut mask = Mask::new(width, height).ok_or(RenderFailure::Allocation { width, height })?;
        for (path, transform) in shapes {
            match coverage {
                Coverage::Fill => mask.fill_path(path, FillRule::Winding, true, transform),
                Coverage::Stroke(stroke) => {
                    if let Some(outline) = path.stroke(stroke, 1.0) {
                        mask.fill_path(&outline, FillRule::Winding, true, transform);
                    }
                }
            }
        }

        let blurred = blurs.blurred(&mask, blur_radius);
        if let Some(full) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
            pixmap.fill_rect(full, paint, Transform::identity(), Some(blurred.as_ref()));
        }
        Ok(())
    }
}

fn solid(color: tiny_skia::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn rounded_rect(rect: Rect, radius: f32) -> Option<Path> {
    if radius <= 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }
    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let k = radius * (1.0 - KAPPA);
    let mut pb = PathBuilder::new();
    pb.move_to(l + radius, t);
    pb.line_to(r - radius, t);
    pb.cubic_to(r - k, t, r, t + k, r, t + radius);
    pb.line_to(r, b - radius);
    pb.cubic_to(r, b - k, r - k, b, r - radius, b);
    pb.line_to(l + radius, b);
    pb.cubic_to(l + k, b, l, b - k, l, b - radius);
    pb.line_to(l, t + radius);
    pb.cubic_to(l, t + k, l + k, t, l + radius, t);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::canvas_size;
    use sumi_text::testing::SyntheticFace;
    use sumi_text::{LayoutEngine, Orientation};

    const EPSILON: f32 = 1e-3;

    struct Scene {
        style: StyleSpec,
        canvas: CanvasSize,
        glyphs: Vec<PlacedGlyph>,
    }

    impl Scene {
        fn new(style: StyleSpec, content: &str) -> Self {
            let (style, _) = style.sanitized();
            let metrics = MetricsProvider::new(Arc::new(SyntheticFace::new()), style.font_size);
            let mut cache = GlyphPathCache::default();
            let layout = LayoutEngine::default().layout(
                content,
                &style.layout_params(),
                &metrics,
                &mut cache,
            );
            let canvas = canvas_size(&style, &layout);
            let glyphs = lock_geometry(&layout, canvas.content_origin(), &metrics, &mut cache);
            Self {
                style,
                canvas,
                glyphs,
            }
        }

        fn paint(&self, layers: &[Layer]) -> Pixmap {
            Compositor::new(&self.style, &self.canvas, &self.glyphs)
                .paint_layers(layers, &mut BlurCache::default())
                .unwrap()
        }
    }

    fn centroid(pixmap: &Pixmap) -> [f32; 2] {
        let width = pixmap.width() as usize;
        let (mut sx, mut sy, mut total) = (0.0f64, 0.0f64, 0.0f64);
        for (i, px) in pixmap.pixels().iter().enumerate() {
            let a = px.alpha() as f64;
            sx += a * ((i % width) as f64 + 0.5);
            sy += a * ((i / width) as f64 + 0.5);
            total += a;
        }
        assert!(total > 0.0, "layer is empty");
        [(sx / total) as f32, (sy / total) as f32]
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let px = pixmap.pixel(x, y).unwrap();
        [px.red(), px.green(), px.blue(), px.alpha()]
    }

    fn text_only() -> StyleSpec {
        StyleSpec {
            font_size: 100.0,
            background_visible: false,
            ..StyleSpec::default()
        }
    }

    #[test]
    fn test_zero_offset_shadow_matches_fill() {
        let scene = Scene::new(
            StyleSpec {
                orientation: Orientation::Vertical,
                shadow_enabled: true,
                shadow_offset_x: 0.0,
                shadow_offset_y: 0.0,
                ..text_only()
            },
            "国、ー",
        );
        let shadow = centroid(&scene.paint(&[Layer::Shadow]));
        let fill = centroid(&scene.paint(&[Layer::Fill]));
        assert!((shadow[0] - fill[0]).abs() < EPSILON);
        assert!((shadow[1] - fill[1]).abs() < EPSILON);
    }

    #[test]
    fn test_shadow_offset_is_paint_time_only() {
        let plain = Scene::new(text_only(), "国");
        let shadowed = Scene::new(
            StyleSpec {
                shadow_enabled: true,
                shadow_offset_x: 0.2,
                shadow_offset_y: 0.1,
                ..text_only()
            },
            "国",
        );
        let main_plain = centroid(&plain.paint(&[Layer::Fill]));
        let main_shadowed = centroid(&shadowed.paint(&[Layer::Fill]));
        assert!((main_plain[0] - main_shadowed[0]).abs() < EPSILON);
        assert!((main_plain[1] - main_shadowed[1]).abs() < EPSILON);

        let shadow = centroid(&shadowed.paint(&[Layer::Shadow]));
        assert!((shadow[0] - main_shadowed[0] - 20.0).abs() < 0.05);
        assert!((shadow[1] - main_shadowed[1] - 10.0).abs() < 0.05);
    }

    #[test]
    fn test_blurred_shadow_keeps_centroid() {
        let scene = Scene::new(
            StyleSpec {
                shadow_enabled: true,
                shadow_offset_x: 0.0,
                shadow_offset_y: 0.0,
                shadow_blur: 30.0,
                ..text_only()
            },
            "国",
        );
        let shadow = centroid(&scene.paint(&[Layer::Shadow]));
        let fill = centroid(&scene.paint(&[Layer::Fill]));
        assert!((shadow[0] - fill[0]).abs() < 0.5);
        assert!((shadow[1] - fill[1]).abs() < 0.5);
    }

    #[test]
    fn test_inner_outline_paints_over_outer() {
        let scene = Scene::new(
            StyleSpec {
                outline_enabled: true,
                outline_color: "#ff0000".into(),
                outline_width: 4.0,
                third_outline_enabled: true,
                third_outline_color: "#0000ff".into(),
                third_outline_width: 20.0,
                ..text_only()
            },
            "国",
        );
        let pixmap = scene.paint(&Layer::PAINT_ORDER);
        // Synthetic ink spans x 5..95 of the cell, shifted by the 20 px outline bleed.
        let left_edge = 20 + 5;
        let y = scene.canvas.height / 2;
        assert_eq!(pixel(&pixmap, left_edge - 1, y), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, left_edge - 6, y), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixmap, left_edge + 10, y), [255, 255, 255, 255]);
    }

    #[test]
    fn test_background_fills_margins_and_rounds_corners() {
        let scene = Scene::new(
            StyleSpec {
                font_size: 100.0,
                background_color: "#336699".into(),
                margin_left: 0.5,
                margin_top: 0.5,
                ..StyleSpec::default()
            },
            "a",
        );
        let pixmap = scene.paint(&[Layer::Background]);
        assert_eq!(pixel(&pixmap, 25, 75), [0x33, 0x66, 0x99, 255]);
        assert_eq!(pixel(&pixmap, 0, 0)[3], 0);
    }

    #[test]
    fn test_text_gradient_runs_along_angle() {
        let scene = Scene::new(
            StyleSpec {
                text_gradient_enabled: true,
                text_gradient: vec![
                    crate::style::ColorStop::new(0.0, "#ff0000"),
                    crate::style::ColorStop::new(1.0, "#0000ff"),
                ],
                ..text_only()
            },
            "国",
        );
        let pixmap = scene.paint(&[Layer::Fill]);
        let y = scene.canvas.height / 2;
        let left = pixel(&pixmap, 8, y);
        let right = pixel(&pixmap, 92, y);
        assert!(left[0] > left[2]);
        assert!(right[2] > right[0]);
    }

    #[test]
    fn test_hidden_text_paints_background_only() {
        let scene = Scene::new(
            StyleSpec {
                text_visible: false,
                shadow_enabled: true,
                ..StyleSpec::default()
            },
            "国",
        );
        let all = scene.paint(&Layer::PAINT_ORDER);
        let background = scene.paint(&[Layer::Background]);
        assert_eq!(all.data(), background.data());
    }

    #[test]
    fn test_rounded_rect_stays_inside() {
        let rect = Rect::from_xywh(0.0, 0.0, 40.0, 20.0).unwrap();
        let path = rounded_rect(rect, 10.0).unwrap();
        let bounds = path.bounds();
        assert!((bounds.width() - 40.0).abs() < EPSILON);
        assert!((bounds.height() - 20.0).abs() < EPSILON);
    }
}
