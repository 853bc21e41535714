//! sumi-render: styled text to bitmaps.
//!
//! A [`Renderer`] turns a [`StyleSpec`] and a string into a premultiplied
//! RGBA pixmap sized to fit the text and every decoration around it.
//!
//! - `style`: the flat style record, its defaults and sanitation
//! - `sizing`: canvas dimensions from the layout plus decoration bleed
//! - `compositor`: background, shadow, outlines and fill over locked geometry
//! - `blur`, `cache`: blurred masks and finished renders, both LRU bounded
//! - `renderer`: the entry point tying fonts, layout, sizing and painting

pub mod blur;
pub mod cache;
pub mod color;
pub mod compositor;
pub mod diagnostics;
pub mod error;
pub mod renderer;
pub mod sizing;
pub mod style;

pub use blur::{BlurCache, BlurKey, blur_mask};
pub use cache::{CachedRender, RenderCache, RenderKey};
pub use compositor::{Compositor, Layer, PlacedGlyph, lock_geometry};
pub use diagnostics::diagnostics_enabled;
pub use error::{Diagnostic, RenderFailure, Severity};
pub use renderer::{RenderOutput, Renderer, RendererOptions, RendererStats};
pub use sizing::{CanvasSize, Padding, canvas_size, ink_overhang};
pub use style::{ColorStop, LegacyFields, OutlineLayer, Sides, StyleSource, StyleSpec};

pub use sumi_text::{FontLibrary, Orientation};
