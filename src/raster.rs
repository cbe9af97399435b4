//! Software raster surface.
//!
//! [`RasterSurface`] draws into an in-memory RGBA8 image with straight alpha
//! and source-over blending, the way a 2D canvas composites by default. Pixel
//! `(x, y)` covers `[x, x + 1) x [y, y + 1)`, so its center sits at
//! `(x + 0.5, y + 0.5)`; a pixel is painted when its center falls inside the
//! shape. Each shape blends every covered pixel exactly once.

use crate::error::RasterError;
use crate::surface::{DrawContext, Surface};
use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// An RGBA8 canvas.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// A transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Raw RGBA8 rows, top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The pixel at `(x, y)`, or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// True if every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Write the current contents as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RasterError> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn blend(&mut self, x: u32, y: u32, color: Vec4) {
        let dst = self.image.get_pixel_mut(x, y);
        *dst = source_over(*dst, color);
    }

    /// Pixel ranges whose centers can fall inside `[min, max]`, clipped to the image.
    fn pixel_span(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let x0 = (min.x - 0.5).ceil().max(0.0);
        let y0 = (min.y - 0.5).ceil().max(0.0);
        let x1 = (max.x - 0.5).floor().min(w as f32 - 1.0);
        let y1 = (max.y - 0.5).floor().min(h as f32 - 1.0);
        if !(x0 <= x1 && y0 <= y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Composite straight-alpha `src` over `dst`.
fn source_over(dst: Rgba<u8>, src: Vec4) -> Rgba<u8> {
    let sa = src.w.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
    let da_scaled = da * (1.0 - sa);
    let out_a = sa + da_scaled;

    let channel = |s: f32, d: f32| (s.clamp(0.0, 1.0) * sa + d * da_scaled) / out_a;
    let rgba = [
        channel(src.x, dr),
        channel(src.y, dg),
        channel(src.z, db),
        out_a,
    ];
    Rgba(rgba.map(|c| (c * 255.0).round() as u8))
}

/// Distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl DrawContext for RasterSurface {
    fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        if !(radius > 0.0) {
            return;
        }
        let extent = Vec2::splat(radius);
        let Some((x0, y0, x1, y1)) = self.pixel_span(center - extent, center + extent) else {
            return;
        };
        let radius_sq = radius * radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel_center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if pixel_center.distance_squared(center) <= radius_sq {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Vec4, width: f32) {
        let half = (width * 0.5).max(0.5);
        let pad = Vec2::splat(half);
        let Some((x0, y0, x1, y1)) = self.pixel_span(from.min(to) - pad, from.max(to) + pad) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel_center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(pixel_center, from, to) <= half {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    type Context = Self;

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Reallocates the canvas; like an HTML canvas, resizing wipes it.
    fn set_size(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn context(&mut self) -> Option<&mut Self> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn test_clear_zeroes_everything() {
        let mut surface = RasterSurface::new(8, 8);
        surface.fill_circle(Vec2::splat(4.0), 3.0, RED);
        assert!(!surface.is_blank());
        surface.clear();
        assert!(surface.is_blank());
    }

    #[test]
    fn test_fill_circle_coverage() {
        let mut surface = RasterSurface::new(20, 20);
        surface.fill_circle(Vec2::new(10.5, 10.5), 2.5, RED);
        assert_eq!(surface.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(12, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(13, 10), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(12, 12), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_circle_partly_off_surface() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_circle(Vec2::new(-0.5, 0.5), 1.5, RED);
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        surface.fill_circle(Vec2::new(-50.0, -50.0), 2.0, RED);
        surface.fill_circle(Vec2::new(1.0, 1.0), 0.0, RED);
    }

    #[test]
    fn test_line_touches_endpoints_and_is_connected() {
        let mut surface = RasterSurface::new(32, 32);
        let from = Vec2::new(2.5, 3.5);
        let to = Vec2::new(27.5, 15.5);
        surface.stroke_line(from, to, RED, 1.0);

        assert_eq!(surface.pixel(2, 3).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(27, 15).map(|p| p[3]), Some(255));
        // At least one pixel in every column along the major axis
        for x in 2..=27 {
            assert!((0..32).any(|y| surface.pixel(x, y).unwrap()[3] > 0), "gap at x={}", x);
        }
        assert_eq!(surface.pixel(2, 20), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_translucent_over_transparent() {
        let mut surface = RasterSurface::new(4, 4);
        surface.stroke_line(Vec2::new(0.5, 1.5), Vec2::new(3.5, 1.5), Vec4::new(1.0, 0.0, 0.0, 0.5), 1.0);
        let [r, g, b, a] = surface.pixel(1, 1).unwrap();
        assert_eq!((r, g, b), (255, 0, 0));
        assert!((127..=128).contains(&a));
    }

    #[test]
    fn test_translucent_over_opaque() {
        let mut surface = RasterSurface::new(2, 2);
        surface.fill_circle(Vec2::new(0.5, 0.5), 0.5, Vec4::new(0.0, 0.0, 1.0, 1.0));
        surface.fill_circle(Vec2::new(0.5, 0.5), 0.5, Vec4::new(1.0, 0.0, 0.0, 0.5));
        let [r, g, b, a] = surface.pixel(0, 0).unwrap();
        assert!((127..=128).contains(&r));
        assert_eq!(g, 0);
        assert!((127..=128).contains(&b));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_set_size_reallocates() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_circle(Vec2::splat(2.0), 2.0, RED);
        surface.set_size(6, 3);
        assert_eq!(surface.size(), (6, 3));
        assert!(surface.is_blank());
        assert_eq!(surface.as_bytes().len(), 6 * 3 * 4);
    }

    #[test]
    fn test_save_png_round_trip() {
        let mut surface = RasterSurface::new(16, 12);
        surface.fill_circle(Vec2::new(8.0, 6.0), 3.0, RED);
        surface.stroke_line(Vec2::new(0.5, 0.5), Vec2::new(15.5, 0.5), Vec4::new(0.0, 1.0, 0.0, 0.5), 1.0);

        let path = std::env::temp_dir().join(format!("cardfield_raster_{}.png", std::process::id()));
        surface.save_png(&path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.dimensions(), (16, 12));
        assert_eq!(loaded.as_raw().as_slice(), surface.as_bytes());
    }

    #[test]
    fn test_save_png_into_missing_directory() {
        let surface = RasterSurface::new(4, 4);
        let path = std::env::temp_dir()
            .join(format!("cardfield_missing_{}", std::process::id()))
            .join("frame.png");
        let err = surface.save_png(&path).unwrap_err();
        assert!(matches!(err, RasterError::Image(_)));
    }

    #[test]
    fn test_zero_sized_canvas() {
        let mut surface = RasterSurface::new(0, 0);
        surface.clear();
        surface.fill_circle(Vec2::ZERO, 3.0, RED);
        surface.stroke_line(Vec2::ZERO, Vec2::ONE, RED, 1.0);
        assert!(surface.is_blank());
    }
}
