//! Shared numeric constants for the canvas crate.

// ── Brush ───────────────────────────────────────────────────────

/// Smallest brush size accepted by `Engine::set_tool`.
pub const MIN_BRUSH_SIZE: f64 = 1.0;

/// Largest brush size accepted by `Engine::set_tool`.
pub const MAX_BRUSH_SIZE: f64 = 20.0;

/// Brush size for a freshly constructed engine.
pub const DEFAULT_BRUSH_SIZE: f64 = 2.0;

/// Eraser strokes paint at this multiple of the configured brush width.
pub const ERASER_WIDTH_FACTOR: f64 = 2.0;

// ── Surface ─────────────────────────────────────────────────────

/// Default surface width in pixels.
pub const DEFAULT_SURFACE_WIDTH: u32 = 600;

/// Default surface height in pixels.
pub const DEFAULT_SURFACE_HEIGHT: u32 = 400;
