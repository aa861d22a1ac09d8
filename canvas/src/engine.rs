//! The drawing engine: stroke state machine over an owned pixel surface.
//!
//! STATE MACHINE
//! =============
//! `Idle → Drawing` on pointer-down, `Drawing → Idle` on pointer-up or
//! pointer-leave. The engine emits a complete encoded snapshot of the
//! surface on every `Drawing → Idle` transition and on `clear` — those
//! are the only points at which persisted state changes. Loading a
//! snapshot never emits one.
//!
//! All operations run on the host's single interaction thread; snapshot
//! emission is synchronous with stroke completion, so the owner may
//! persist the returned payload immediately.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::buffer::{BACKGROUND, PixelBuffer, Rgba};
use crate::codec::{self, DecodeError, EncodedAnnotation};
use crate::consts::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use crate::input::{Point, PointerInput, StrokeState, SurfaceBounds};
use crate::tool::{Tool, ToolKind};

/// What the host must do after an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to persist.
    None,
    /// The surface changed in a way that supersedes the stored annotation;
    /// hand this payload to the record store.
    Snapshot(EncodedAnnotation),
}

/// Freehand drawing engine. Owns the pixel surface exclusively; the
/// surface dimensions are fixed at construction.
pub struct Engine {
    buffer: PixelBuffer,
    tool: Tool,
    stroke: StrokeState,
}

impl Engine {
    /// Create an engine over a background-filled surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { buffer: PixelBuffer::new(width, height), tool: Tool::default(), stroke: StrokeState::Idle }
    }

    // --- Queries ---

    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_drawing()
    }

    // --- Tool ---

    /// Select the active tool. Pure state update: the surface is not
    /// touched, and an open stroke keeps drawing with the new tool.
    pub fn set_tool(&mut self, kind: ToolKind, size: f64, color: Rgba) {
        self.tool = Tool::new(kind, size, color);
    }

    // --- Stroke operations ---

    /// Open a stroke at `point`. If a stroke is somehow still open (a
    /// missed pointer-up), it is re-anchored here; no snapshot is emitted
    /// because nothing left the `Drawing` state.
    pub fn begin_stroke(&mut self, point: Point) {
        self.stroke = StrokeState::Drawing { last: point };
    }

    /// Extend the open stroke to `point`, rasterizing one segment with
    /// the active tool. Silently does nothing while `Idle`.
    pub fn extend_stroke(&mut self, point: Point) {
        let StrokeState::Drawing { last } = self.stroke else {
            return;
        };
        self.buffer.stamp_segment(last, point, self.tool.stamp_radius(), self.tool.paint());
        self.stroke = StrokeState::Drawing { last: point };
    }

    /// Close the open stroke and emit a snapshot of the surface. Silently
    /// does nothing while `Idle`.
    pub fn end_stroke(&mut self) -> Action {
        if !self.stroke.is_drawing() {
            return Action::None;
        }
        self.stroke = StrokeState::Idle;
        Action::Snapshot(codec::encode(&self.buffer))
    }

    /// Fill the surface with the opaque background, force `Idle`, and
    /// emit a snapshot. Valid in any state.
    pub fn clear(&mut self) -> Action {
        self.buffer.fill(BACKGROUND);
        self.stroke = StrokeState::Idle;
        Action::Snapshot(codec::encode(&self.buffer))
    }

    /// Replace the surface contents from a stored payload, drawn at the
    /// origin over a background fill. An absent or empty payload just
    /// fills the background. Never emits a snapshot: loading is not a
    /// user mutation.
    ///
    /// # Errors
    ///
    /// `DecodeError` when the payload is malformed; the surface is left
    /// unchanged.
    pub fn load_snapshot(&mut self, encoded: Option<&EncodedAnnotation>) -> Result<(), DecodeError> {
        let Some(encoded) = encoded.filter(|e| !e.is_empty()) else {
            self.buffer.fill(BACKGROUND);
            self.stroke = StrokeState::Idle;
            return Ok(());
        };
        match codec::decode(encoded) {
            Ok(decoded) => {
                self.buffer.fill(BACKGROUND);
                self.buffer.blit_over(&decoded, 0, 0);
                self.stroke = StrokeState::Idle;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "annotation payload undecodable; surface left unchanged");
                Err(e)
            }
        }
    }

    // --- Unified pointer surface ---
    //
    // Mouse and touch events resolve through the same routine; the engine
    // never needs to know which source produced a stroke.

    /// Pointer or touch pressed: open a stroke at the resolved point.
    pub fn on_pointer_down(&mut self, input: PointerInput, bounds: SurfaceBounds) -> Action {
        self.begin_stroke(input.resolve(bounds));
        Action::None
    }

    /// Pointer or touch moved: extend the open stroke, if any.
    pub fn on_pointer_move(&mut self, input: PointerInput, bounds: SurfaceBounds) -> Action {
        self.extend_stroke(input.resolve(bounds));
        Action::None
    }

    /// Pointer or touch released: close the stroke and snapshot.
    pub fn on_pointer_up(&mut self) -> Action {
        self.end_stroke()
    }

    /// Pointer left the surface mid-stroke: treated exactly like a
    /// release, so the engine can never stay stuck in `Drawing`.
    pub fn on_pointer_leave(&mut self) -> Action {
        self.end_stroke()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT)
    }
}
