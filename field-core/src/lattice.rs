use field_shared::{Color, DotGridSettings};

use crate::config::{non_negative, positive, ConfigurationError, SimulationConfig};
use crate::math;
use crate::surface::{Surface, Viewport};

/// Paints the static grid of dots behind the flock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeRenderer {
    spacing: f32,
    dot_radius: f32,
    dot_color: Color,
}

impl LatticeRenderer {
    pub fn new(spacing: f32, dot_radius: f32, dot_color: Color) -> Result<Self, ConfigurationError> {
        Ok(Self {
            spacing: positive("grid_spacing", spacing)?,
            dot_radius: non_negative("dot_radius", dot_radius)?,
            dot_color,
        })
    }

    /// Takes the lattice parameters of an already validated config
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            spacing: config.grid_spacing,
            dot_radius: config.dot_radius,
            dot_color: config.dot_color,
        }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Lattice points in logical units, row by row, covering `[0, width] x [0, height]`
    pub fn points(&self, width: f32, height: f32) -> impl Iterator<Item = (f32, f32)> {
        let spacing = self.spacing;
        let count = move |extent: f32| {
            if extent.is_finite() && extent >= 0.0 {
                math::floor(extent / spacing) as usize + 1
            } else {
                0
            }
        };
        let (columns, rows) = (count(width), count(height));

        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| (column as f32 * spacing, row as f32 * spacing))
        })
    }

    /// Size the surface for the viewport, wipe it and draw the lattice.
    /// Does nothing while the surface is detached.
    pub fn resize<S: Surface + ?Sized>(&self, surface: &mut S, viewport: Viewport) {
        if !surface.is_attached() {
            return;
        }

        let (backing_width, backing_height) = viewport.backing_size();
        surface.resize(backing_width, backing_height, viewport.width, viewport.height);
        surface.clear();
        self.draw(surface, viewport);
    }

    /// Draw the dots on top of whatever the surface holds
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, viewport: Viewport) {
        if !surface.is_attached() || viewport.is_empty() {
            return;
        }

        let ratio = viewport.pixel_ratio;
        let radius = self.dot_radius * ratio;
        if radius <= 0.0 {
            return;
        }

        for (x, y) in self.points(viewport.width, viewport.height) {
            surface.fill_circle(x * ratio, y * ratio, radius, self.dot_color);
        }
    }
}

impl TryFrom<&DotGridSettings> for LatticeRenderer {
    type Error = ConfigurationError;

    fn try_from(settings: &DotGridSettings) -> Result<Self, Self::Error> {
        Self::new(settings.grid_spacing, settings.dot_size, settings.dot_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelBuffer;

    fn renderer() -> LatticeRenderer {
        LatticeRenderer::new(40.0, 1.0, Color::DOT).unwrap()
    }

    #[test]
    fn test_points_include_both_edges() {
        let points: Vec<_> = renderer().points(80.0, 40.0).collect();
        assert_eq!(
            points,
            [(0.0, 0.0), (40.0, 0.0), (80.0, 0.0), (0.0, 40.0), (40.0, 40.0), (80.0, 40.0)]
        );
    }

    #[test]
    fn test_points_skip_partial_cells() {
        assert_eq!(renderer().points(79.9, 0.0).count(), 2);
        assert_eq!(renderer().points(-1.0, 100.0).count(), 0);
    }

    #[test]
    fn test_new_rejects_bad_spacing() {
        assert!(LatticeRenderer::new(0.0, 1.0, Color::DOT).is_err());
        assert!(LatticeRenderer::new(40.0, -1.0, Color::DOT).is_err());
    }

    #[test]
    fn test_resize_scales_for_pixel_ratio() {
        let mut surface = PixelBuffer::new();
        renderer().resize(&mut surface, Viewport::new(100.0, 50.0, 2.0));

        assert_eq!(surface.width(), 200);
        assert_eq!(surface.height(), 100);
        assert_eq!(surface.display_size(), (100.0, 50.0));
        // Dot at logical (40, 40) lands on backing (80, 80)
        assert_eq!(surface.pixel(80, 80), Some(Color::DOT));
        assert_eq!(surface.pixel(60, 60), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let viewport = Viewport::new(321.0, 177.0, 1.25);
        let mut first = PixelBuffer::new();
        let mut second = PixelBuffer::new();

        renderer().resize(&mut first, viewport);
        let snapshot = first.clone();
        renderer().resize(&mut first, viewport);
        renderer().resize(&mut second, viewport);

        assert_eq!(first, snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_resize_overwrites_previous_content() {
        let mut surface = PixelBuffer::new();
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        renderer().resize(&mut surface, viewport);
        let clean = surface.clone();

        surface.fill(Color::rgb(255, 0, 0));
        renderer().resize(&mut surface, viewport);

        assert_eq!(surface, clean);
    }

    #[test]
    fn test_detached_surface_is_untouched() {
        let mut surface = PixelBuffer::new();
        surface.set_attached(false);
        renderer().resize(&mut surface, Viewport::new(100.0, 100.0, 1.0));
        assert_eq!(surface.width(), 0);
    }

    #[test]
    fn test_from_dot_grid_settings() {
        let renderer = LatticeRenderer::try_from(&DotGridSettings::default()).unwrap();
        assert_eq!(renderer.spacing(), 40.0);
    }
}
