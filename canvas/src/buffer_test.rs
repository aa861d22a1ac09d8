use super::*;

// =============================================================
// Rgba
// =============================================================

#[test]
fn rgba_from_hex_rgb() {
    assert_eq!(Rgba::from_hex("#000000"), Some(Rgba::BLACK));
    assert_eq!(Rgba::from_hex("#ffffff"), Some(Rgba::WHITE));
    assert_eq!(Rgba::from_hex("#1f2a3b"), Some(Rgba::opaque(0x1f, 0x2a, 0x3b)));
}

#[test]
fn rgba_from_hex_rgba() {
    assert_eq!(
        Rgba::from_hex("#10203040"),
        Some(Rgba { r: 0x10, g: 0x20, b: 0x30, a: 0x40 })
    );
}

#[test]
fn rgba_from_hex_rejects_missing_hash() {
    assert_eq!(Rgba::from_hex("000000"), None);
}

#[test]
fn rgba_from_hex_rejects_wrong_length() {
    assert_eq!(Rgba::from_hex("#fff"), None);
    assert_eq!(Rgba::from_hex("#fffffff"), None);
    assert_eq!(Rgba::from_hex("#"), None);
}

#[test]
fn rgba_from_hex_rejects_non_hex() {
    assert_eq!(Rgba::from_hex("#zzzzzz"), None);
}

#[test]
fn rgba_opaque_sets_full_alpha() {
    assert_eq!(Rgba::opaque(1, 2, 3).a, 0xff);
}

// =============================================================
// PixelBuffer construction
// =============================================================

#[test]
fn new_fills_background() {
    let buffer = PixelBuffer::new(4, 3);
    assert_eq!(buffer.width(), 4);
    assert_eq!(buffer.height(), 3);
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(buffer.pixel(x, y), Some(BACKGROUND));
        }
    }
}

#[test]
fn new_clamps_zero_dimensions() {
    let buffer = PixelBuffer::new(0, 0);
    assert_eq!(buffer.width(), 1);
    assert_eq!(buffer.height(), 1);
}

#[test]
fn from_raw_accepts_matching_length() {
    let buffer = PixelBuffer::from_raw(2, 2, vec![0; 16]);
    assert!(buffer.is_some());
}

#[test]
fn from_raw_rejects_length_mismatch() {
    assert!(PixelBuffer::from_raw(2, 2, vec![0; 15]).is_none());
    assert!(PixelBuffer::from_raw(2, 2, vec![0; 17]).is_none());
}

#[test]
fn from_raw_rejects_zero_dimensions() {
    assert!(PixelBuffer::from_raw(0, 2, Vec::new()).is_none());
    assert!(PixelBuffer::from_raw(2, 0, Vec::new()).is_none());
}

// =============================================================
// pixel / set_pixel
// =============================================================

#[test]
fn pixel_out_of_bounds_is_none() {
    let buffer = PixelBuffer::new(2, 2);
    assert_eq!(buffer.pixel(2, 0), None);
    assert_eq!(buffer.pixel(0, 2), None);
}

#[test]
fn set_pixel_roundtrip() {
    let mut buffer = PixelBuffer::new(2, 2);
    buffer.set_pixel(1, 1, Rgba::BLACK);
    assert_eq!(buffer.pixel(1, 1), Some(Rgba::BLACK));
    assert_eq!(buffer.pixel(0, 0), Some(BACKGROUND));
}

#[test]
fn set_pixel_out_of_bounds_is_ignored() {
    let mut buffer = PixelBuffer::new(2, 2);
    let before = buffer.clone();
    buffer.set_pixel(5, 5, Rgba::BLACK);
    assert_eq!(buffer, before);
}

#[test]
fn fill_overwrites_every_pixel() {
    let mut buffer = PixelBuffer::new(3, 3);
    buffer.set_pixel(1, 1, Rgba::BLACK);
    buffer.fill(Rgba::opaque(10, 20, 30));
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(buffer.pixel(x, y), Some(Rgba::opaque(10, 20, 30)));
        }
    }
}

// =============================================================
// blend_pixel
// =============================================================

#[test]
fn blend_opaque_replaces() {
    let mut buffer = PixelBuffer::new(1, 1);
    buffer.blend_pixel(0, 0, Rgba::BLACK);
    assert_eq!(buffer.pixel(0, 0), Some(Rgba::BLACK));
}

#[test]
fn blend_transparent_is_noop() {
    let mut buffer = PixelBuffer::new(1, 1);
    buffer.blend_pixel(0, 0, Rgba { r: 0, g: 0, b: 0, a: 0 });
    assert_eq!(buffer.pixel(0, 0), Some(BACKGROUND));
}

#[test]
fn blend_half_alpha_black_over_white() {
    let mut buffer = PixelBuffer::new(1, 1);
    buffer.blend_pixel(0, 0, Rgba { r: 0, g: 0, b: 0, a: 128 });
    assert_eq!(buffer.pixel(0, 0), Some(Rgba::opaque(127, 127, 127)));
}

#[test]
fn blend_out_of_bounds_is_ignored() {
    let mut buffer = PixelBuffer::new(1, 1);
    let before = buffer.clone();
    buffer.blend_pixel(9, 9, Rgba::BLACK);
    assert_eq!(buffer, before);
}

// =============================================================
// blit_over
// =============================================================

#[test]
fn blit_copies_at_origin() {
    let mut src = PixelBuffer::new(2, 2);
    src.fill(Rgba::BLACK);
    let mut dst = PixelBuffer::new(4, 4);
    dst.blit_over(&src, 0, 0);
    assert_eq!(dst.pixel(0, 0), Some(Rgba::BLACK));
    assert_eq!(dst.pixel(1, 1), Some(Rgba::BLACK));
    assert_eq!(dst.pixel(2, 2), Some(BACKGROUND));
}

#[test]
fn blit_with_offset() {
    let mut src = PixelBuffer::new(1, 1);
    src.fill(Rgba::BLACK);
    let mut dst = PixelBuffer::new(4, 4);
    dst.blit_over(&src, 2, 3);
    assert_eq!(dst.pixel(2, 3), Some(Rgba::BLACK));
    assert_eq!(dst.pixel(0, 0), Some(BACKGROUND));
}

#[test]
fn blit_clips_oversized_source() {
    let mut src = PixelBuffer::new(6, 6);
    src.fill(Rgba::BLACK);
    let mut dst = PixelBuffer::new(3, 3);
    dst.blit_over(&src, 0, 0);
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(dst.pixel(x, y), Some(Rgba::BLACK));
        }
    }
}

#[test]
fn blit_fully_outside_is_noop() {
    let mut src = PixelBuffer::new(2, 2);
    src.fill(Rgba::BLACK);
    let mut dst = PixelBuffer::new(3, 3);
    let before = dst.clone();
    dst.blit_over(&src, 10, 10);
    assert_eq!(dst, before);
}

// =============================================================
// stamp_segment
// =============================================================

#[test]
fn stamp_horizontal_stroke_covers_expected_row() {
    let mut buffer = PixelBuffer::new(20, 5);
    buffer.stamp_segment(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0, Rgba::BLACK);
    // Pixel centers on row 0 sit 0.5 below the segment; all within radius.
    for x in 0..=10 {
        assert_eq!(buffer.pixel(x, 0), Some(Rgba::BLACK), "x={x}");
    }
    // Row 1 centers are 1.5 away; untouched.
    for x in 0..=10 {
        assert_eq!(buffer.pixel(x, 1), Some(BACKGROUND), "x={x}");
    }
    // Beyond the round cap.
    assert_eq!(buffer.pixel(12, 0), Some(BACKGROUND));
}

#[test]
fn stamp_degenerate_segment_is_a_dot() {
    let mut buffer = PixelBuffer::new(10, 10);
    buffer.stamp_segment(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 2.0, Rgba::BLACK);
    assert_eq!(buffer.pixel(5, 5), Some(Rgba::BLACK));
    assert_eq!(buffer.pixel(4, 5), Some(Rgba::BLACK));
    assert_eq!(buffer.pixel(0, 0), Some(BACKGROUND));
}

#[test]
fn stamp_zero_radius_is_noop() {
    let mut buffer = PixelBuffer::new(10, 10);
    let before = buffer.clone();
    buffer.stamp_segment(Point::new(0.0, 0.0), Point::new(9.0, 9.0), 0.0, Rgba::BLACK);
    assert_eq!(buffer, before);
}

#[test]
fn stamp_off_surface_segment_paints_nothing() {
    let mut buffer = PixelBuffer::new(10, 10);
    let before = buffer.clone();
    buffer.stamp_segment(Point::new(50.0, 50.0), Point::new(60.0, 50.0), 2.0, Rgba::BLACK);
    assert_eq!(buffer, before);
}

#[test]
fn stamp_clips_partially_off_surface_segment() {
    let mut buffer = PixelBuffer::new(10, 10);
    buffer.stamp_segment(Point::new(-5.0, 5.0), Point::new(5.0, 5.0), 1.0, Rgba::BLACK);
    assert_eq!(buffer.pixel(0, 5), Some(Rgba::BLACK));
    assert_eq!(buffer.pixel(9, 5), Some(BACKGROUND));
}

// =============================================================
// distance_to_segment
// =============================================================

#[test]
fn distance_to_point_on_segment_is_zero() {
    let d = distance_to_segment(Point::new(5.0, 0.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    assert!(d.abs() < 1e-9);
}

#[test]
fn distance_perpendicular_to_segment() {
    let d = distance_to_segment(Point::new(5.0, 3.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    assert!((d - 3.0).abs() < 1e-9);
}

#[test]
fn distance_beyond_endpoint_uses_endpoint() {
    let d = distance_to_segment(Point::new(13.0, 4.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    assert!((d - 5.0).abs() < 1e-9);
}

#[test]
fn distance_to_degenerate_segment_is_point_distance() {
    let d = distance_to_segment(Point::new(3.0, 4.0), Point::new(0.0, 0.0), Point::new(0.0, 0.0));
    assert!((d - 5.0).abs() < 1e-9);
}
