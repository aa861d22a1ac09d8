//! Tool configuration: the closed pen/eraser variant dispatched at
//! stroke-render time.

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

use serde::{Deserialize, Serialize};

use crate::buffer::{BACKGROUND, Rgba};
use crate::consts::{DEFAULT_BRUSH_SIZE, ERASER_WIDTH_FACTOR, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};

/// Which tool family is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Paint opaque color at the configured width.
    #[default]
    Pen,
    /// Paint the background color at double the configured width.
    Eraser,
}

/// The active tool with its stroke parameters. `size` is the nominal
/// brush width in pixels, always within `[MIN_BRUSH_SIZE, MAX_BRUSH_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Tool {
    Pen { color: Rgba, size: f64 },
    Eraser { size: f64 },
}

impl Tool {
    /// Build a tool from its parameters, clamping `size` into the
    /// accepted range. The color is ignored for the eraser.
    #[must_use]
    pub fn new(kind: ToolKind, size: f64, color: Rgba) -> Self {
        let size = if size.is_finite() { size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE) } else { DEFAULT_BRUSH_SIZE };
        match kind {
            ToolKind::Pen => Self::Pen { color, size },
            ToolKind::Eraser => Self::Eraser { size },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Pen { .. } => ToolKind::Pen,
            Self::Eraser { .. } => ToolKind::Eraser,
        }
    }

    /// Nominal brush size as configured.
    #[must_use]
    pub fn size(&self) -> f64 {
        match self {
            Self::Pen { size, .. } | Self::Eraser { size } => *size,
        }
    }

    /// Stamp radius in pixels: half the effective stroke width. The
    /// eraser's effective width is `ERASER_WIDTH_FACTOR` times its size.
    #[must_use]
    pub fn stamp_radius(&self) -> f64 {
        match self {
            Self::Pen { size, .. } => size / 2.0,
            Self::Eraser { size } => size * ERASER_WIDTH_FACTOR / 2.0,
        }
    }

    /// The color this tool paints with.
    #[must_use]
    pub fn paint(&self) -> Rgba {
        match self {
            Self::Pen { color, .. } => *color,
            Self::Eraser { .. } => BACKGROUND,
        }
    }
}

impl Default for Tool {
    fn default() -> Self {
        Self::Pen { color: Rgba::BLACK, size: DEFAULT_BRUSH_SIZE }
    }
}
