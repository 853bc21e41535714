//! The `render(style, content)` entry point.
//!
//! A [`Renderer`] owns its font library and every cache, so independent
//! renderers never share state. Calls are synchronous and run to completion
//! on the calling thread; callers that embed a renderer in a multi-threaded
//! host serialize access themselves.

use std::path::PathBuf;

use sumi_config::SumiConfig;
use sumi_text::{
    CacheStats, FontLibrary, GlyphPathCache, LayoutEngine, LayoutResult, MetricsProvider,
    VerticalClassTable,
};
use tiny_skia::Pixmap;
use tracing::{debug, warn};

use crate::blur::BlurCache;
use crate::cache::{CachedRender, RenderCache};
use crate::compositor::{Compositor, lock_geometry};
use crate::diagnostics::diagnostics_enabled;
use crate::error::{Diagnostic, RenderFailure};
use crate::sizing::{CanvasSize, canvas_size};
use crate::style::{StyleSource, StyleSpec};

/// Construction options for a [`Renderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RendererOptions {
    pub glyph_cache_capacity: usize,
    pub blur_cache_capacity: usize,
    pub render_cache_capacity: usize,
    /// Canvases with a side above this fail with
    /// [`RenderFailure::CanvasTooLarge`].
    pub max_canvas_side: u32,
    /// Family tried first when a requested family is unavailable.
    pub fallback_family: Option<String>,
    pub load_system_fonts: bool,
    pub extra_font_dirs: Vec<PathBuf>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::from_config(&SumiConfig::default())
    }
}

impl RendererOptions {
    pub fn from_config(config: &SumiConfig) -> Self {
        let family = config.fonts.default_family.trim();
        Self {
            glyph_cache_capacity: config.cache.glyph_capacity,
            blur_cache_capacity: config.cache.blur_capacity,
            render_cache_capacity: config.cache.render_capacity,
            max_canvas_side: config.limits.max_canvas_side,
            fallback_family: (!family.is_empty()).then(|| family.to_string()),
            load_system_fonts: config.fonts.load_system_fonts,
            extra_font_dirs: config.fonts.extra_font_dirs.clone(),
        }
    }
}

/// Result of one render call.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Premultiplied RGBA.
    pub pixmap: Pixmap,
    pub width: u32,
    pub height: u32,
    pub diagnostics: Vec<Diagnostic>,
    /// True when the bitmap came from the render cache.
    pub cache_hit: bool,
}

impl RenderOutput {
    /// `(bitmap, canvas_width, canvas_height)`.
    pub fn into_parts(self) -> (Pixmap, u32, u32) {
        (self.pixmap, self.width, self.height)
    }

    /// Premultiplied RGBA bytes, row major.
    pub fn into_rgba(self) -> Vec<u8> {
        self.pixmap.take()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderFailure> {
        self.pixmap
            .encode_png()
            .map_err(|err| RenderFailure::Encode(err.to_string()))
    }
}

/// Hit and miss counters of every cache a renderer owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub glyphs: CacheStats,
    pub blurs: CacheStats,
    pub renders: CacheStats,
}

/// Font, layout and canvas for one (style, content) pair.
struct Prepared {
    /// None for empty content, which never touches the font library.
    metrics: Option<MetricsProvider>,
    layout: LayoutResult,
    canvas: CanvasSize,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct Renderer {
    fonts: FontLibrary,
    engine: LayoutEngine,
    glyphs: GlyphPathCache,
    blurs: BlurCache,
    renders: RenderCache,
    max_canvas_side: u32,
}

impl Renderer {
    /// A renderer with its own font library, populated per `options`.
    pub fn new(options: RendererOptions) -> Self {
        let mut fonts = FontLibrary::new();
        if options.load_system_fonts {
            fonts.load_system_fonts();
        }
        for dir in &options.extra_font_dirs {
            fonts.load_fonts_dir(dir);
        }
        Self::with_font_library(fonts, options)
    }

    /// A renderer over a prepared font library. Font loading options are
    /// ignored.
    pub fn with_font_library(mut fonts: FontLibrary, options: RendererOptions) -> Self {
        if options.fallback_family.is_some() {
            fonts.set_fallback_family(options.fallback_family);
        }
        debug!(faces = fonts.face_count(), "renderer ready");
        Self {
            fonts,
            engine: LayoutEngine::default(),
            glyphs: GlyphPathCache::new(options.glyph_cache_capacity),
            blurs: BlurCache::new(options.blur_cache_capacity),
            renders: RenderCache::new(options.render_cache_capacity),
            max_canvas_side: options.max_canvas_side,
        }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Mutable access to the font library. Cached renders are dropped since
    /// family resolution may change.
    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        self.renders.clear();
        &mut self.fonts
    }

    pub fn class_table(&self) -> &VerticalClassTable {
        self.engine.table()
    }

    /// Replace the vertical classification table.
    pub fn set_class_table(&mut self, table: VerticalClassTable) {
        *self.engine.table_mut() = table;
        self.renders.clear();
    }

    /// Render `content` under `style`.
    ///
    /// Recoverable problems (unknown family, out-of-range values, bad colors)
    /// are reported in [`RenderOutput::diagnostics`]. Only allocation
    /// failure, oversized canvases and a host without any font are errors.
    pub fn render(&mut self, style: &StyleSpec, content: &str) -> Result<RenderOutput, RenderFailure> {
        let (style, mut diagnostics) = style.sanitized();
        for diagnostic in &diagnostics {
            debug!(message = %diagnostic.message, "style adjusted");
        }

        let style_json = match serde_json::to_string(&style) {
            Ok(json) => Some(json),
            Err(error) => {
                warn!(?error, "style not serializable, bypassing render cache");
                None
            }
        };
        if let Some(json) = &style_json {
            if let Some(hit) = self.renders.get(json, content) {
                if diagnostics_enabled("cache") {
                    debug!(width = hit.canvas.width, height = hit.canvas.height, "render cache hit");
                }
                diagnostics.extend(hit.diagnostics.iter().cloned());
                return Ok(RenderOutput {
                    pixmap: hit.pixmap.clone(),
                    width: hit.canvas.width,
                    height: hit.canvas.height,
                    diagnostics,
                    cache_hit: true,
                });
            }
        }

        let prepared = self.prepare(&style, content)?;
        let glyphs = match &prepared.metrics {
            Some(metrics) => lock_geometry(
                &prepared.layout,
                prepared.canvas.content_origin(),
                metrics,
                &mut self.glyphs,
            ),
            None => Vec::new(),
        };
        let pixmap = Compositor::new(&style, &prepared.canvas, &glyphs).paint(&mut self.blurs)?;

        if let Some(json) = style_json {
            self.renders.insert(
                json,
                content.to_string(),
                CachedRender {
                    pixmap: pixmap.clone(),
                    canvas: prepared.canvas,
                    diagnostics: prepared.diagnostics.clone(),
                },
            );
        }
        diagnostics.extend(prepared.diagnostics);
        Ok(RenderOutput {
            pixmap,
            width: prepared.canvas.width,
            height: prepared.canvas.height,
            diagnostics,
            cache_hit: false,
        })
    }

    /// Render with a style taken from any [`StyleSource`].
    pub fn render_source<S: StyleSource + ?Sized>(
        &mut self,
        source: &S,
        content: &str,
    ) -> Result<RenderOutput, RenderFailure> {
        let style = source.style();
        self.render(&style, content)
    }

    /// Canvas dimensions `render` would produce, without painting.
    pub fn measure(&mut self, style: &StyleSpec, content: &str) -> Result<CanvasSize, RenderFailure> {
        let (style, _) = style.sanitized();
        Ok(self.prepare(&style, content)?.canvas)
    }

    /// Drop every cached glyph, blur and render.
    pub fn clear_caches(&mut self) {
        self.glyphs.clear();
        self.blurs.clear();
        self.renders.clear();
    }

    pub fn cache_stats(&self) -> RendererStats {
        RendererStats {
            glyphs: self.glyphs.stats(),
            blurs: self.blurs.stats(),
            renders: self.renders.stats(),
        }
    }

    fn prepare(&mut self, style: &StyleSpec, content: &str) -> Result<Prepared, RenderFailure> {
        let mut diagnostics = Vec::new();
        let (metrics, layout) = if content.is_empty() {
            (None, LayoutResult::empty(style.orientation))
        } else {
            let resolved = self
                .fonts
                .resolve(&style.font_family)
                .map_err(RenderFailure::NoFontAvailable)?;
            if resolved.substituted {
                diagnostics.push(Diagnostic::info(format!(
                    "font family `{}` is not available, using `{}`",
                    style.font_family, resolved.family
                )));
            }

            let metrics = MetricsProvider::new(resolved.source, style.font_size);
            if let Some(missing) = missing_glyphs(&metrics, content) {
                warn!(family = %resolved.family, %missing, "characters without glyphs");
                diagnostics.push(Diagnostic::warning(format!(
                    "`{}` has no glyph for: {missing}",
                    resolved.family
                )));
            }

            let layout = self.engine.layout(
                content,
                &style.layout_params(),
                &metrics,
                &mut self.glyphs,
            );
            if diagnostics_enabled("layout") {
                debug!(
                    orientation = ?layout.orientation,
                    lines = layout.lines.len(),
                    glyphs = layout.placements.len(),
                    width = layout.width,
                    height = layout.height,
                    "layout"
                );
            }
            (Some(metrics), layout)
        };

        let canvas = canvas_size(style, &layout);
        if diagnostics_enabled("sizing") {
            debug!(
                width = canvas.width,
                height = canvas.height,
                padding = ?canvas.padding,
                overhang = ?canvas.overhang,
                shadow = ?canvas.shadow,
                outline = canvas.outline,
                border = canvas.border,
                "canvas"
            );
        }
        let limit = self.max_canvas_side;
        if canvas.width > limit || canvas.height > limit {
            return Err(RenderFailure::CanvasTooLarge {
                width: canvas.width,
                height: canvas.height,
                limit,
            });
        }

        Ok(Prepared {
            metrics,
            layout,
            canvas,
            diagnostics,
        })
    }
}

/// Distinct visible characters the face cannot map, in order of appearance.
fn missing_glyphs(metrics: &MetricsProvider, content: &str) -> Option<String> {
    let mut missing = String::new();
    for ch in content.chars() {
        if ch.is_whitespace() || ch.is_control() || missing.contains(ch) {
            continue;
        }
        if !metrics.has_glyph(ch) {
            missing.push(ch);
        }
    }
    (!missing.is_empty()).then_some(missing)
}
