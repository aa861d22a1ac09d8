//! Input model: pointer/touch events, coordinate resolution, and the
//! stroke state machine.
//!
//! Mouse and touch input carry the same client-space coordinates and
//! resolve through one routine, [`PointerInput::resolve`], into the
//! surface-relative space the engine draws in. The only behavioral
//! difference between the two sources is that touch input must suppress
//! the host's default scrolling while a stroke is active.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

/// A point in surface-relative pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where a pointer event originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    /// Mouse (or pen treated as a mouse by the host).
    Mouse,
    /// Single-finger touch.
    Touch,
}

impl PointerSource {
    /// Whether the host must suppress its default scroll/pan handling
    /// while this source is drawing.
    #[must_use]
    pub fn suppresses_scroll(self) -> bool {
        matches!(self, Self::Touch)
    }
}

/// The drawing surface's position within the host's client space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceBounds {
    /// Client-space x of the surface's left edge.
    pub left: f64,
    /// Client-space y of the surface's top edge.
    pub top: f64,
}

impl SurfaceBounds {
    #[must_use]
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// A raw pointer event in host client space, before resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub source: PointerSource,
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerInput {
    #[must_use]
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self { source: PointerSource::Mouse, client_x, client_y }
    }

    #[must_use]
    pub fn touch(client_x: f64, client_y: f64) -> Self {
        Self { source: PointerSource::Touch, client_x, client_y }
    }

    /// Resolve this event into surface-relative coordinates. Mouse and
    /// touch share this routine; the source makes no difference here.
    #[must_use]
    pub fn resolve(&self, bounds: SurfaceBounds) -> Point {
        Point::new(self.client_x - bounds.left, self.client_y - bounds.top)
    }
}

/// The stroke state machine: at most one stroke is open per engine, and
/// it is only open between a pointer-down and the matching pointer-up or
/// pointer-leave.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    /// No stroke in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A stroke is open; `last` is the most recently recorded point.
    Drawing {
        last: Point,
    },
}

impl StrokeState {
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }
}
