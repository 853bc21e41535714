use serde::Serialize;
use thiserror::Error;

/// Unrecoverable render errors.
///
/// Everything recoverable (missing fonts, bad colors, out-of-range values)
/// is reported as a [`Diagnostic`] instead.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("failed to allocate a {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },
    #[error("canvas {width}x{height} exceeds the {limit}px side limit")]
    CanvasTooLarge { width: u32, height: u32, limit: u32 },
    #[error("no font face is available")]
    NoFontAvailable(#[source] sumi_text::FontError),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// A note about something the renderer adjusted on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}
