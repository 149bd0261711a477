//! Minimal drawing capability used by the renderers.

use crate::scene::Rgba;
use crate::vector::Vec2;

/// Drawing surface. Coordinates are pixels; colors with alpha below 255 blend
/// over what is already there.
pub trait Canvas {
    fn size(&self) -> (usize, usize);
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgba);
    fn stroke_line(&mut self, a: Vec2, b: Vec2, width: f64, color: Rgba);
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0RGB, the layout softbuffer presents
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

#[inline]
fn unpack_rgb(c: u32) -> (u32, u32, u32) {
    ((c >> 16) & 0xFF, (c >> 8) & 0xFF, c & 0xFF)
}

#[inline]
fn blend(dst: u32, color: Rgba) -> u32 {
    match color.a {
        255 => pack_rgb(color.r, color.g, color.b),
        0 => dst,
        a => {
            let a = a as u32;
            let inv = 255 - a;
            let (dr, dg, db) = unpack_rgb(dst);
            let mix = |s: u8, d: u32| ((s as u32 * a + d * inv + 127) / 255) as u8;
            pack_rgb(mix(color.r, dr), mix(color.g, dg), mix(color.b, db))
        }
    }
}

/// Software frame buffer of packed 0RGB pixels, row-major.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, color: Rgba) {
        let idx = y * self.width + x;
        self.pixels[idx] = blend(self.pixels[idx], color);
    }

    /// Clamps a pixel-space box to the buffer. Returns `None` when empty.
    fn clip(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(usize, usize, usize, usize)> {
        let cx0 = x0.floor().max(0.0);
        let cy0 = y0.floor().max(0.0);
        let cx1 = x1.ceil().min(self.width as f64);
        let cy1 = y1.ceil().min(self.height as f64);
        if cx0 >= cx1 || cy0 >= cy1 {
            return None;
        }
        Some((cx0 as usize, cy0 as usize, cx1 as usize, cy1 as usize))
    }

    /// Fills every pixel whose center satisfies `inside`, within the box.
    fn fill_where(
        &mut self,
        (x0, y0, x1, y1): (usize, usize, usize, usize),
        color: Rgba,
        inside: impl Fn(Vec2) -> bool,
    ) {
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(Vec2::new(x as f64 + 0.5, y as f64 + 0.5)) {
                    self.put(x, y, color);
                }
            }
        }
    }
}

impl Canvas for FrameBuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(pack_rgb(color.r, color.g, color.b));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        // Pixel centers inside [x, x + w) x [y, y + h)
        let Some(bounds) = self.clip(x, y, x + w, y + h) else {
            return;
        };
        self.fill_where(bounds, color, |p| {
            p.x >= x && p.x < x + w && p.y >= y && p.y < y + h
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgba) {
        let Some(bounds) = self.clip(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        ) else {
            return;
        };
        let r2 = radius * radius;
        self.fill_where(bounds, color, |p| (p - center).dot(p - center) <= r2);
    }

    fn stroke_line(&mut self, a: Vec2, b: Vec2, width: f64, color: Rgba) {
        // At least one pixel wide so hairlines stay visible
        let half = (width * 0.5).max(0.5);
        let Some(bounds) = self.clip(
            a.x.min(b.x) - half,
            a.y.min(b.y) - half,
            a.x.max(b.x) + half,
            a.y.max(b.y) + half,
        ) else {
            return;
        };
        let ab = b - a;
        let len2 = ab.dot(ab);
        self.fill_where(bounds, color, |p| {
            let t = if len2 > 0.0 {
                ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            p.distance_to(a + ab * t) <= half
        });
    }
}
