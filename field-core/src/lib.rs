#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod config;
pub mod driver;
pub mod flock;
pub mod lattice;
mod math;
pub mod neighbors;
pub mod surface;

pub use config::{ConfigurationError, SimulationConfig, SteeringWeights};
pub use driver::{DriverState, FrameDriver, FrameScheduler, ViewportObserver};
pub use field_shared::{Color, DotGridSettings, FieldSettings, SteeringSettings};
pub use flock::{Flock, Particle};
pub use lattice::LatticeRenderer;
pub use neighbors::{BruteForce, NeighborQuery, UniformGrid};
pub use surface::{PixelBuffer, Surface, Viewport};

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn from_angle(angle: f32, length: f32) -> Self {
        let (sin, cos) = math::sin_cos(angle);
        Self {
            x: cos * length,
            y: sin * length,
        }
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn magnitude(&self) -> f32 {
        math::sqrt(self.magnitude_squared())
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    /// Cap the magnitude at `max`, keeping the direction
    pub fn limit(&self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag > max {
            let normalized = self.normalize();
            Self {
                x: normalized.x * max,
                y: normalized.y * max,
            }
        } else {
            *self
        }
    }

    pub fn distance_squared(&self, other: &Vector2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        math::sqrt(self.distance_squared(other))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f32> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector2d_magnitude() {
        let v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.magnitude(), 5.0);
        assert_eq!(v.magnitude_squared(), 25.0);
    }

    #[test]
    fn test_vector2d_normalize_zero_is_zero() {
        assert_eq!(Vector2D::zero().normalize(), Vector2D::zero());
        let normalized = Vector2D::new(3.0, 4.0).normalize();
        assert_relative_eq!(normalized.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_vector2d_limit_keeps_direction() {
        let v = Vector2D::new(30.0, 40.0).limit(5.0);
        assert_relative_eq!(v.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(v.y, 4.0, epsilon = 1e-5);

        let slow = Vector2D::new(0.3, 0.4);
        assert_eq!(slow.limit(5.0), slow);
    }

    #[test]
    fn test_vector2d_from_angle() {
        let v = Vector2D::from_angle(core::f32::consts::FRAC_PI_2, 2.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_vector2d_distance_is_symmetric() {
        let a = Vector2D::new(1.5, -7.25);
        let b = Vector2D::new(-3.0, 12.0);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn test_vector2d_operations() {
        let v1 = Vector2D::new(1.0, 2.0);
        let v2 = Vector2D::new(3.0, 4.0);

        assert_eq!(v1 + v2, Vector2D::new(4.0, 6.0));
        assert_eq!(v2 - v1, Vector2D::new(2.0, 2.0));
        assert_eq!(v1 * 2.0, Vector2D::new(2.0, 4.0));
        assert_eq!(v2 / 2.0, Vector2D::new(1.5, 2.0));

        let mut acc = v1;
        acc += v2;
        assert_eq!(acc, Vector2D::new(4.0, 6.0));
    }
}
