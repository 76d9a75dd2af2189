#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNT: usize = 100;
pub const DEFAULT_VISUAL_RANGE: f32 = 75.0;
pub const DEFAULT_SPEED_LIMIT: f32 = 15.0;
pub const DEFAULT_GRID_SPACING: f32 = 40.0;
pub const DEFAULT_DOT_SIZE: f32 = 1.0;

/// An 8-bit RGBA color as written in CSS hex notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BACKGROUND: Color = Color::rgb(0xF2, 0xF2, 0xF0);
    pub const BOID: Color = Color::rgb(0x0C, 0x0C, 0x0C);
    pub const DOT: Color = Color::rgb(0xA6, 0xA6, 0xA4);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or(ColorParseError::MissingHash)?;

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit);
        }

        let digit = |i: usize| -> u8 {
            // Already validated as ASCII hex above
            (hex.as_bytes()[i] as char).to_digit(16).unwrap_or(0) as u8
        };
        let short = |i: usize| digit(i) * 17;
        let long = |i: usize| digit(i) * 16 + digit(i + 1);

        match hex.len() {
            3 => Ok(Self::rgb(short(0), short(1), short(2))),
            4 => Ok(Self::rgba(short(0), short(1), short(2), short(3))),
            6 => Ok(Self::rgb(long(0), long(2), long(4))),
            8 => Ok(Self::rgba(long(0), long(2), long(4), long(6))),
            len => Err(ColorParseError::InvalidLength(len)),
        }
    }
}

impl fmt::Display for Color {
    /// CSS form: `#rrggbb` when opaque, `rgba(r, g, b, alpha)` otherwise
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.is_opaque() {
            format!("{}", color)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                color.r, color.g, color.b, color.a
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    MissingHash,
    InvalidDigit,
    InvalidLength(usize),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHash => write!(f, "color must start with '#'"),
            Self::InvalidDigit => write!(f, "color contains a non-hex digit"),
            Self::InvalidLength(len) => {
                write!(f, "color must have 3, 4, 6 or 8 hex digits, got {}", len)
            }
        }
    }
}

impl core::error::Error for ColorParseError {}

/// Flocking tuning constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SteeringSettings {
    /// Neighbors closer than this push each other apart
    pub min_distance: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Distance from an edge at which the boundary bias kicks in
    pub edge_margin: f32,
    pub turn_factor: f32,
    /// Upper bound of the initial speed as a fraction of the speed limit
    pub initial_speed_fraction: f32,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            min_distance: 20.0,
            separation_weight: 0.05,
            alignment_weight: 0.05,
            cohesion_weight: 0.005,
            edge_margin: 200.0,
            turn_factor: 1.0,
            initial_speed_fraction: 0.25,
        }
    }
}

/// Configuration passed by the page when mounting the animated background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldSettings {
    pub count: usize,
    pub visual_range: f32,
    pub speed_limit: f32,
    pub grid_spacing: f32,
    pub dot_size: f32,
    /// Radius of a boid; falls back to `dot_size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boid_size: Option<f32>,
    pub background_color: Color,
    pub boid_color: Color,
    pub dot_color: Color,
    pub steering: SteeringSettings,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            visual_range: DEFAULT_VISUAL_RANGE,
            speed_limit: DEFAULT_SPEED_LIMIT,
            grid_spacing: DEFAULT_GRID_SPACING,
            dot_size: DEFAULT_DOT_SIZE,
            boid_size: None,
            background_color: Color::BACKGROUND,
            boid_color: Color::BOID,
            dot_color: Color::DOT,
            steering: SteeringSettings::default(),
        }
    }
}

impl FieldSettings {
    pub fn boid_radius(&self) -> f32 {
        self.boid_size.unwrap_or(self.dot_size)
    }

    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Configuration for the static, non-animated dot grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DotGridSettings {
    pub dot_color: Color,
    pub grid_spacing: f32,
    pub dot_size: f32,
}

impl Default for DotGridSettings {
    fn default() -> Self {
        Self {
            dot_color: Color::DOT,
            grid_spacing: DEFAULT_GRID_SPACING,
            dot_size: DEFAULT_DOT_SIZE,
        }
    }
}

impl DotGridSettings {
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
