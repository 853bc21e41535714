use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;
use sumi_render::{
    FontLibrary, Orientation, RenderFailure, Renderer, RendererOptions, Severity, StyleSource,
    StyleSpec,
};
use sumi_text::testing::SyntheticFace;
use tiny_skia::Pixmap;

const FAMILY: &str = "Synthetic";

fn renderer_with(face: SyntheticFace, options: RendererOptions) -> Renderer {
    let mut fonts = FontLibrary::new();
    fonts.register(FAMILY, Arc::new(face));
    Renderer::with_font_library(fonts, options)
}

fn renderer() -> Renderer {
    renderer_with(SyntheticFace::new(), RendererOptions::default())
}

fn text_style(size: f32, orientation: Orientation) -> StyleSpec {
    StyleSpec {
        font_family: FAMILY.into(),
        font_size: size,
        orientation,
        background_visible: false,
        ..StyleSpec::default()
    }
}

fn centroid(pixmap: &Pixmap, rows: std::ops::Range<u32>) -> Option<[f32; 2]> {
    let width = pixmap.width() as usize;
    let (mut sx, mut sy, mut total) = (0.0f64, 0.0f64, 0.0f64);
    for (i, px) in pixmap.pixels().iter().enumerate() {
        let (x, y) = (i % width, i / width);
        if !rows.contains(&(y as u32)) {
            continue;
        }
        let a = px.alpha() as f64;
        sx += a * (x as f64 + 0.5);
        sy += a * (y as f64 + 0.5);
        total += a;
    }
    (total > 0.0).then(|| [(sx / total) as f32, (sy / total) as f32])
}

fn full_centroid(pixmap: &Pixmap) -> [f32; 2] {
    centroid(pixmap, 0..pixmap.height()).expect("pixmap has ink")
}

#[test]
fn warm_and_cold_renders_are_identical() -> Result<()> {
    let style = StyleSpec {
        font_family: FAMILY.into(),
        orientation: Orientation::Vertical,
        shadow_enabled: true,
        shadow_blur: 25.0,
        outline_enabled: true,
        outline_blur: 10.0,
        second_outline_enabled: true,
        text_gradient_enabled: true,
        background_gradient_enabled: true,
        background_outline_enabled: true,
        ..StyleSpec::default()
    };
    let content = "縦書き、\nテスト。";
    let options = RendererOptions {
        glyph_cache_capacity: 2,
        blur_cache_capacity: 1,
        render_cache_capacity: 1,
        ..RendererOptions::default()
    };
    let mut renderer = renderer_with(SyntheticFace::new(), options.clone());

    let cold = renderer.render(&style, content)?;
    let warm = renderer.render(&style, content)?;
    assert!(!cold.cache_hit);
    assert!(warm.cache_hit);
    assert_eq!(cold.pixmap.data(), warm.pixmap.data());

    // Evict everything through unrelated work, then render again.
    renderer.render(&style, "別の文字列")?;
    let evicted = renderer.render(&style, content)?;
    assert!(!evicted.cache_hit);
    assert_eq!(cold.pixmap.data(), evicted.pixmap.data());

    renderer.clear_caches();
    let cleared = renderer.render(&style, content)?;
    assert_eq!(cold.pixmap.data(), cleared.pixmap.data());

    let mut fresh = renderer_with(SyntheticFace::new(), options);
    assert_eq!(cold.pixmap.data(), fresh.render(&style, content)?.pixmap.data());
    Ok(())
}

#[test]
fn wide_ideograph_shadow_aligns_with_text() -> Result<()> {
    // Scenario A: a glyph wider than the em, vertical, zero shadow offset.
    let face = SyntheticFace::new().with_advance('龘', 1400.0);
    let mut renderer = renderer_with(face, RendererOptions::default());
    let base = text_style(100.0, Orientation::Vertical);

    let shadow_only = StyleSpec {
        shadow_enabled: true,
        shadow_offset_x: 0.0,
        shadow_offset_y: 0.0,
        text_opacity: 0.0,
        ..base.clone()
    };
    let shadow = renderer.render(&shadow_only, "龘")?;
    let text = renderer.render(&base, "龘")?;
    assert_eq!((shadow.width, shadow.height), (text.width, text.height));
    assert_eq!(text.width, 140);

    let [sx, sy] = full_centroid(&shadow.pixmap);
    let [tx, ty] = full_centroid(&text.pixmap);
    assert!((sx - tx).abs() < 1.0 && (sy - ty).abs() < 1.0);
    Ok(())
}

#[test]
fn vertical_punctuation_sits_upper_right() -> Result<()> {
    // Scenario B: ideographic and ASCII comma and period.
    let mut renderer = renderer();
    let output = renderer.render(&text_style(100.0, Orientation::Vertical), "、。,.")?;
    assert_eq!((output.width, output.height), (100, 400));

    for cell in 0..4u32 {
        let top = cell * 100;
        let [cx, cy] = centroid(&output.pixmap, top..top + 100).expect("punctuation has ink");
        assert!(cx > 50.0, "cell {cell}: x {cx}");
        assert!(cy < top as f32 + 50.0, "cell {cell}: y {cy}");
    }
    Ok(())
}

#[test]
fn ten_glyph_column_is_exactly_ten_cells() -> Result<()> {
    // Scenario C: 48 px synthetic face has ascent 38 and descent 10.
    let mut renderer = renderer();
    let style = StyleSpec {
        font_family: FAMILY.into(),
        orientation: Orientation::Vertical,
        line_spacing_v: 0.0,
        ..StyleSpec::default()
    };
    let output = renderer.render(&style, "あいうえおかきくけこ")?;
    assert_eq!(output.height, 10 * 48);
    assert_eq!(output.width, 48);
    Ok(())
}

#[test]
fn column_widens_for_wide_glyphs() -> Result<()> {
    let face = SyntheticFace::new().with_advance('W', 1500.0);
    let mut renderer = renderer_with(face, RendererOptions::default());
    let style = text_style(100.0, Orientation::Vertical);

    assert_eq!(renderer.measure(&style, "国国")?.width, 100);
    assert_eq!(renderer.measure(&style, "国W国")?.width, 150);
    Ok(())
}

#[test]
fn last_glyph_is_not_cut_off() -> Result<()> {
    let mut renderer = renderer();
    let output = renderer.render(&text_style(100.0, Orientation::Vertical), "一二三\n四")?;
    assert_eq!((output.width, output.height), (200, 300));

    // Third glyph ink reaches into the last cell and stays inside the canvas.
    let lowest = (0..output.height)
        .rev()
        .find(|&y| {
            (0..output.width).any(|x| output.pixmap.pixel(x, y).is_some_and(|p| p.alpha() > 0))
        })
        .expect("canvas has ink");
    assert!((280..output.height - 1).contains(&lowest), "lowest ink row {lowest}");
    Ok(())
}

#[test]
fn bleed_grows_with_shadow_offset_and_outline_width() -> Result<()> {
    let mut renderer = renderer();
    let base = StyleSpec {
        shadow_enabled: true,
        ..text_style(40.0, Orientation::Horizontal)
    };

    let mut previous = 0;
    for step in 0..20 {
        let style = StyleSpec {
            shadow_offset_x: step as f32 * 0.1,
            ..base.clone()
        };
        let width = renderer.measure(&style, "ab")?.width;
        assert!(width >= previous);
        previous = width;
    }

    let mut previous = 0;
    for width in [0.0, 2.0, 5.0, 11.0, 40.0] {
        let style = StyleSpec {
            second_outline_enabled: true,
            second_outline_width: width,
            ..base.clone()
        };
        let size = renderer.measure(&style, "ab")?;
        assert!(size.padding.left as u32 >= previous);
        previous = size.padding.left as u32;
    }
    Ok(())
}

#[test]
fn negative_shadow_offset_moves_text_by_bleed_only() -> Result<()> {
    let mut renderer = renderer();
    let plain = text_style(100.0, Orientation::Horizontal);
    let shadowed = StyleSpec {
        shadow_enabled: true,
        shadow_opacity: 0.0,
        shadow_offset_x: -0.25,
        shadow_offset_y: -0.25,
        ..plain.clone()
    };

    let a = renderer.render(&plain, "国")?;
    let b = renderer.render(&shadowed, "国")?;
    assert_eq!((b.width, b.height), (a.width + 25, a.height + 25));

    let [ax, ay] = full_centroid(&a.pixmap);
    let [bx, by] = full_centroid(&b.pixmap);
    assert!((bx - ax - 25.0).abs() < 0.01);
    assert!((by - ay - 25.0).abs() < 0.01);
    Ok(())
}

#[test]
fn empty_content_needs_no_font() -> Result<()> {
    let mut renderer = Renderer::with_font_library(FontLibrary::new(), RendererOptions::default());
    let output = renderer.render(&StyleSpec::default(), "")?;
    assert_eq!((output.width, output.height), (1, 1));

    let style = StyleSpec {
        margin_left: 1.0,
        margin_top: 0.5,
        ..StyleSpec::default()
    };
    let output = renderer.render(&style, "")?;
    assert_eq!((output.width, output.height), (48, 24));

    // Text decorations have nothing to surround.
    let decorated = StyleSpec {
        shadow_enabled: true,
        shadow_blur: 40.0,
        outline_enabled: true,
        third_outline_enabled: true,
        ..StyleSpec::default()
    };
    let output = renderer.render(&decorated, "")?;
    assert_eq!((output.width, output.height), (1, 1));
    Ok(())
}

fn ink_bounds(pixmap: &Pixmap) -> Option<[u32; 4]> {
    let mut bounds: Option<[u32; 4]> = None;
    for y in 0..pixmap.height() {
        for x in 0..pixmap.width() {
            if pixmap.pixel(x, y).is_some_and(|p| p.alpha() > 0) {
                let b = bounds.get_or_insert([x, y, x, y]);
                *b = [b[0].min(x), b[1].min(y), b[2].max(x), b[3].max(y)];
            }
        }
    }
    bounds
}

#[test]
fn overhanging_ink_stays_inside_canvas() -> Result<()> {
    // Negative left bearing and a descender 5 px below the cell at 100 px.
    let face = SyntheticFace::new().with_ink('j', [-100.0, -700.0, 300.0, 250.0]);
    let mut renderer = renderer_with(face, RendererOptions::default());

    let style = text_style(100.0, Orientation::Horizontal);
    let output = renderer.render(&style, "ja")?;
    assert_eq!((output.width, output.height), (110, 105));
    let [left, _, _, bottom] = ink_bounds(&output.pixmap).expect("text has ink");
    assert_eq!(left, 0);
    assert_eq!(bottom, 104);

    // A bracket wider than its advance, turned upright at the top of a column.
    let bracket = SyntheticFace::new().with_ink('「', [-200.0, -750.0, 1200.0, 100.0]);
    let mut renderer = renderer_with(bracket, RendererOptions::default());
    let output = renderer.render(&text_style(100.0, Orientation::Vertical), "「国")?;
    assert_eq!(output.width, 100);
    // Two 100 px cells plus 20 px of ink above the first.
    assert!((220..=221).contains(&output.height), "height {}", output.height);
    let [_, top, _, bottom] = ink_bounds(&output.pixmap).expect("text has ink");
    assert_eq!(top, 0);
    assert!(bottom < output.height - 1);
    Ok(())
}

#[test]
fn no_font_at_all_is_a_failure() {
    let mut renderer = Renderer::with_font_library(FontLibrary::new(), RendererOptions::default());
    let err = renderer.render(&StyleSpec::default(), "a").unwrap_err();
    assert!(matches!(err, RenderFailure::NoFontAvailable(_)));
}

#[test]
fn oversized_canvas_is_rejected() {
    let mut renderer = renderer_with(
        SyntheticFace::new(),
        RendererOptions {
            max_canvas_side: 100,
            ..RendererOptions::default()
        },
    );
    let err = renderer
        .render(&text_style(48.0, Orientation::Vertical), "あいうえお")
        .unwrap_err();
    assert!(matches!(
        err,
        RenderFailure::CanvasTooLarge { height: 240, limit: 100, .. }
    ));
}

#[test]
fn unknown_family_falls_back_with_diagnostic() -> Result<()> {
    let mut renderer = renderer();
    let style = StyleSpec {
        font_family: "Missing Family".into(),
        ..StyleSpec::default()
    };
    let output = renderer.render(&style, "abc")?;
    let note = output
        .diagnostics
        .iter()
        .find(|d| d.message.contains("Missing Family"))
        .expect("fallback is reported");
    assert_eq!(note.severity, Severity::Info);
    Ok(())
}

#[test]
fn partial_legacy_record_renders() -> Result<()> {
    let style: StyleSpec =
        serde_json::from_str(r#"{"font": "Synthetic", "is_vertical": true, "font_size": 40}"#)?;
    let mut renderer = renderer();
    let output = renderer.render(&style, "一二三")?;
    assert_eq!((output.width, output.height), (40, 120));
    Ok(())
}

#[test]
fn clamped_values_are_reported() -> Result<()> {
    let mut renderer = renderer();
    let style = StyleSpec {
        char_spacing_h: 12.0,
        ..text_style(20.0, Orientation::Horizontal)
    };
    let first = renderer.render(&style, "ab")?;
    let second = renderer.render(&style, "ab")?;
    assert!(second.cache_hit);
    for output in [&first, &second] {
        assert!(output.diagnostics.iter().any(|d| d.message.contains("char_spacing_h")));
    }
    Ok(())
}

struct Thumbnail {
    size: f32,
}

impl StyleSource for Thumbnail {
    fn style(&self) -> Cow<'_, StyleSpec> {
        Cow::Owned(StyleSpec {
            font_family: FAMILY.into(),
            font_size: self.size,
            ..StyleSpec::default()
        })
    }
}

#[test]
fn style_sources_render_like_styles() -> Result<()> {
    let mut renderer = renderer();
    let thumbnail = Thumbnail { size: 24.0 };
    let from_source = renderer.render_source(&thumbnail, "Aa")?;
    let direct = renderer.render(&thumbnail.style(), "Aa")?;
    assert_eq!(from_source.pixmap.data(), direct.pixmap.data());
    assert_eq!((direct.width, direct.height), (24, 24));
    Ok(())
}

#[test]
fn png_output() -> Result<()> {
    let mut renderer = renderer();
    let output = renderer.render(&text_style(32.0, Orientation::Horizontal), "png")?;
    let png = output.encode_png()?;
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let (width, height) = (output.width, output.height);
    assert_eq!(output.into_rgba().len(), (width * height * 4) as usize);
    Ok(())
}
