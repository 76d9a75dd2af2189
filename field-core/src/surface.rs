use alloc::vec;
use alloc::vec::Vec;

use field_shared::Color;

use crate::math;

/// The drawing primitives the background needs from a host surface.
///
/// Coordinates passed to `fill_circle` are in backing pixels.
pub trait Surface {
    /// Set the backing store to `backing_width x backing_height` pixels and
    /// the on-screen size to `display_width x display_height` logical units
    fn resize(&mut self, backing_width: u32, backing_height: u32, display_width: f32, display_height: f32);

    fn clear(&mut self);

    fn fill(&mut self, color: Color);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);

    /// Whether the surface is attached to something that can show it
    fn is_attached(&self) -> bool {
        true
    }
}

/// Logical viewport size plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Non-finite or non-positive sizes collapse to zero; bad pixel ratios to 1
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        let extent = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self {
            width: extent(width),
            height: extent(height),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Backing store size in whole device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            math::round(self.width * self.pixel_ratio) as u32,
            math::round(self.height * self.pixel_ratio) as u32,
        )
    }
}

/// In-memory RGBA surface. Used headless and in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    display_width: f32,
    display_height: f32,
    pixels: Vec<Color>,
    attached: bool,
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelBuffer {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            display_width: 0.0,
            display_height: 0.0,
            pixels: Vec::new(),
            attached: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn display_size(&self) -> (f32, f32) {
        (self.display_width, self.display_height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            self.pixels.get((y * self.width + x) as usize).copied()
        } else {
            None
        }
    }

    /// Number of pixels exactly equal to `color`
    pub fn count(&self, color: Color) -> usize {
        self.pixels.iter().filter(|&&pixel| pixel == color).count()
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    fn blend(dst: Color, src: Color) -> Color {
        match src.a {
            0xFF => src,
            0 => dst,
            alpha => {
                let a = alpha as u32;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
                Color::rgba(
                    mix(src.r, dst.r),
                    mix(src.g, dst.g),
                    mix(src.b, dst.b),
                    (a + (dst.a as u32 * (255 - a) + 127) / 255) as u8,
                )
            }
        }
    }
}

impl Surface for PixelBuffer {
    fn resize(&mut self, backing_width: u32, backing_height: u32, display_width: f32, display_height: f32) {
        self.width = backing_width;
        self.height = backing_height;
        self.display_width = display_width;
        self.display_height = display_height;
        self.pixels = vec![Color::TRANSPARENT; backing_width as usize * backing_height as usize];
    }

    fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }

    fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Covers every pixel whose center lies within `radius` of the center
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 || self.width == 0 || self.height == 0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }

        let clamp_x = |value: f32| value.max(0.0).min(self.width as f32) as u32;
        let clamp_y = |value: f32| value.max(0.0).min(self.height as f32) as u32;
        let (x0, x1) = (clamp_x(math::floor(cx - radius)), clamp_x(math::ceil(cx + radius)));
        let (y0, y1) = (clamp_y(math::floor(cy - radius)), clamp_y(math::ceil(cy + radius)));
        let radius_squared = radius * radius;

        for y in y0..y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= radius_squared {
                    let index = (y * self.width + x) as usize;
                    self.pixels[index] = Self::blend(self.pixels[index], color);
                }
            }
        }
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
