pub mod face;
pub mod library;
pub mod metrics;

pub use face::{FontFace, FontId, GlyphSource};
pub use library::{FontLibrary, ResolvedFont};
pub use metrics::{FontMetrics, ScaledFontMetrics};

use thiserror::Error;

/// Errors that can occur while working with fonts.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font data")]
    InvalidFont,
    #[error("no font available for `{0}` and no fallback face is installed")]
    NoFallback(String),
}

/// Convenient result alias for font-related operations.
pub type Result<T> = std::result::Result<T, FontError>;
