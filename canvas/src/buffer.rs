//! Pixel surface: the owned RGBA buffer strokes are rasterized into.
//!
//! The buffer is exclusively owned by one engine instance, its dimensions
//! are fixed at creation, and all mutation happens through the stamp/fill
//! operations here. Strokes arrive as line segments and are rasterized
//! with round caps by painting every pixel whose center lies within the
//! stamp radius of the segment.

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;

use serde::{Deserialize, Serialize};

use crate::input::Point;

/// Opaque background color for freshly created and cleared surfaces.
pub const BACKGROUND: Rgba = Rgba::WHITE;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::opaque(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::opaque(0x00, 0x00, 0x00);

    /// A fully opaque color from its RGB components.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse a `#rrggbb` or `#rrggbbaa` CSS hex color.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !matches!(digits.len(), 6 | 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

/// In-memory raster surface, row-major RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a surface of the given dimensions filled with [`BACKGROUND`].
    /// Dimensions are clamped to at least 1×1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut buffer = Self { width, height, data: vec![0; width as usize * height as usize * 4] };
        buffer.fill(BACKGROUND);
        buffer
    }

    /// Reassemble a surface from raw RGBA8 bytes. Returns `None` when the
    /// byte length does not match the dimensions.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, data })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(Rgba { r: self.data[i], g: self.data[i + 1], b: self.data[i + 2], a: self.data[i + 3] })
    }

    /// Overwrite the color at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = color.a;
    }

    /// Fill the whole surface with one color.
    pub fn fill(&mut self, color: Rgba) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = color.a;
        }
    }

    /// Source-over blend `color` onto the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if color.a == 0xff {
            self.set_pixel(x, y, color);
            return;
        }
        if color.a == 0 {
            return;
        }
        let Some(dst) = self.pixel(x, y) else {
            return;
        };
        let sa = f64::from(color.a) / 255.0;
        let da = f64::from(dst.a) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            self.set_pixel(x, y, Rgba { r: 0, g: 0, b: 0, a: 0 });
            return;
        }
        let blend = |s: u8, d: u8| {
            let s = f64::from(s);
            let d = f64::from(d);
            let c = (s * sa + d * da * (1.0 - sa)) / out_a;
            c.round().clamp(0.0, 255.0) as u8
        };
        self.set_pixel(
            x,
            y,
            Rgba {
                r: blend(color.r, dst.r),
                g: blend(color.g, dst.g),
                b: blend(color.b, dst.b),
                a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
            },
        );
    }

    /// Source-over blit `src` with its top-left corner at `(dx, dy)`,
    /// clipped to this surface.
    pub fn blit_over(&mut self, src: &PixelBuffer, dx: u32, dy: u32) {
        for sy in 0..src.height {
            let Some(ty) = dy.checked_add(sy).filter(|&ty| ty < self.height) else {
                break;
            };
            for sx in 0..src.width {
                let Some(tx) = dx.checked_add(sx).filter(|&tx| tx < self.width) else {
                    break;
                };
                if let Some(color) = src.pixel(sx, sy) {
                    self.blend_pixel(tx, ty, color);
                }
            }
        }
    }

    /// Rasterize the segment `a → b` as an opaque stroke of the given stamp
    /// radius with round caps: every pixel whose center lies within
    /// `radius` of the segment is painted `color`.
    pub fn stamp_segment(&mut self, a: Point, b: Point, radius: f64, color: Rgba) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let x0 = (a.x.min(b.x) - radius).floor().clamp(0.0, max_x) as u32;
        let x1 = (a.x.max(b.x) + radius).ceil().clamp(0.0, max_x) as u32;
        let y0 = (a.y.min(b.y) - radius).floor().clamp(0.0, max_y) as u32;
        let y1 = (a.y.max(b.y) + radius).ceil().clamp(0.0, max_y) as u32;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let center = Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
                if distance_to_segment(center, a, b) <= radius {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }
}

/// Distance from `p` to the closed segment `a → b`. A degenerate segment
/// collapses to point distance, which is what gives strokes round caps.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return (p.x - a.x).hypot(p.y - a.y);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    let nx = a.x + t * abx;
    let ny = a.y + t * aby;
    (p.x - nx).hypot(p.y - ny)
}
