use core::fmt;

use field_shared::{Color, FieldSettings, SteeringSettings};

/// Relative weights of the flocking rules and the edge bias.
///
/// These are visual tuning constants; the defaults reproduce the classic
/// boids demo the home page background is modelled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringWeights {
    pub min_distance: f32,
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub edge_margin: f32,
    pub turn_factor: f32,
    pub initial_speed_fraction: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self::from(&SteeringSettings::default())
    }
}

impl From<&SteeringSettings> for SteeringWeights {
    fn from(settings: &SteeringSettings) -> Self {
        Self {
            min_distance: settings.min_distance,
            separation: settings.separation_weight,
            alignment: settings.alignment_weight,
            cohesion: settings.cohesion_weight,
            edge_margin: settings.edge_margin,
            turn_factor: settings.turn_factor,
            initial_speed_fraction: settings.initial_speed_fraction,
        }
    }
}

impl SteeringWeights {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive("min_distance", self.min_distance)?;
        non_negative("separation", self.separation)?;
        non_negative("alignment", self.alignment)?;
        non_negative("cohesion", self.cohesion)?;
        positive("edge_margin", self.edge_margin)?;
        positive("turn_factor", self.turn_factor)?;
        positive("initial_speed_fraction", self.initial_speed_fraction)?;
        if self.initial_speed_fraction > 1.0 {
            return Err(ConfigurationError::OutOfRange {
                parameter: "initial_speed_fraction",
                value: self.initial_speed_fraction,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Everything one mount of the animated background needs. Immutable for
/// the lifetime of a mount; changing it means a full re-init.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub population: usize,
    /// Perception radius in surface units
    pub visual_range: f32,
    /// Maximum velocity magnitude in units per tick
    pub speed_limit: f32,
    pub grid_spacing: f32,
    pub dot_radius: f32,
    pub particle_radius: f32,
    pub background_color: Color,
    pub particle_color: Color,
    pub dot_color: Color,
    pub steering: SteeringWeights,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_settings_unchecked(&FieldSettings::default())
    }
}

impl SimulationConfig {
    fn from_settings_unchecked(settings: &FieldSettings) -> Self {
        Self {
            population: settings.count,
            visual_range: settings.visual_range,
            speed_limit: settings.speed_limit,
            grid_spacing: settings.grid_spacing,
            dot_radius: settings.dot_size,
            particle_radius: settings.boid_radius(),
            background_color: settings.background_color,
            particle_color: settings.boid_color,
            dot_color: settings.dot_color,
            steering: SteeringWeights::from(&settings.steering),
        }
    }

    /// Check every numeric parameter. A zero population is valid and
    /// simply renders nothing.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive("visual_range", self.visual_range)?;
        positive("speed_limit", self.speed_limit)?;
        positive("grid_spacing", self.grid_spacing)?;
        non_negative("dot_radius", self.dot_radius)?;
        non_negative("particle_radius", self.particle_radius)?;
        self.steering.validate()
    }

    /// Largest speed a freshly spawned particle may have
    pub fn initial_speed(&self) -> f32 {
        self.speed_limit * self.steering.initial_speed_fraction
    }
}

impl TryFrom<&FieldSettings> for SimulationConfig {
    type Error = ConfigurationError;

    fn try_from(settings: &FieldSettings) -> Result<Self, Self::Error> {
        let config = Self::from_settings_unchecked(settings);
        config.validate()?;
        Ok(config)
    }
}

/// A numeric parameter that cannot drive the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigurationError {
    NotPositive { parameter: &'static str, value: f32 },
    Negative { parameter: &'static str, value: f32 },
    OutOfRange { parameter: &'static str, value: f32, max: f32 },
}

impl ConfigurationError {
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::NotPositive { parameter, .. }
            | Self::Negative { parameter, .. }
            | Self::OutOfRange { parameter, .. } => parameter,
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { parameter, value } => {
                write!(f, "{} must be a positive finite number, got {}", parameter, value)
            }
            Self::Negative { parameter, value } => {
                write!(f, "{} must be a non-negative finite number, got {}", parameter, value)
            }
            Self::OutOfRange {
                parameter,
                value,
                max,
            } => write!(f, "{} must not exceed {}, got {}", parameter, max, value),
        }
    }
}

impl core::error::Error for ConfigurationError {}

pub(crate) fn positive(parameter: &'static str, value: f32) -> Result<f32, ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::NotPositive { parameter, value })
    }
}

pub(crate) fn non_negative(
    parameter: &'static str,
    value: f32,
) -> Result<f32, ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::Negative { parameter, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_home_page() {
        let config = SimulationConfig::default();
        assert_eq!(config.population, 100);
        assert_eq!(config.visual_range, 75.0);
        assert_eq!(config.speed_limit, 15.0);
        assert_eq!(config.grid_spacing, 40.0);
        assert_eq!(config.dot_radius, 1.0);
        assert_eq!(config.particle_radius, 1.0);
        assert_eq!(config.particle_color, Color::rgb(0x0C, 0x0C, 0x0C));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_population_is_valid() {
        let config = SimulationConfig {
            population: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        let cases = [
            ("visual_range", SimulationConfig { visual_range: 0.0, ..Default::default() }),
            ("speed_limit", SimulationConfig { speed_limit: -1.0, ..Default::default() }),
            ("grid_spacing", SimulationConfig { grid_spacing: f32::NAN, ..Default::default() }),
        ];

        for (parameter, config) in cases {
            let err = config.validate().unwrap_err();
            assert_eq!(err.parameter(), parameter);
            assert!(matches!(err, ConfigurationError::NotPositive { .. }));
        }
    }

    #[test]
    fn test_rejects_negative_radius() {
        let config = SimulationConfig {
            dot_radius: -0.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::Negative {
                parameter: "dot_radius",
                value: -0.5
            })
        );
    }

    #[test]
    fn test_rejects_bad_steering() {
        let mut config = SimulationConfig::default();
        config.steering.initial_speed_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::OutOfRange { parameter: "initial_speed_fraction", .. })
        ));

        config.steering.initial_speed_fraction = 0.25;
        config.steering.turn_factor = f32::INFINITY;
        assert_eq!(config.validate().unwrap_err().parameter(), "turn_factor");
    }

    #[test]
    fn test_try_from_settings() {
        let settings = FieldSettings {
            count: 7,
            boid_size: Some(3.0),
            ..FieldSettings::default()
        };
        let config = SimulationConfig::try_from(&settings).unwrap();
        assert_eq!(config.population, 7);
        assert_eq!(config.particle_radius, 3.0);
        assert_eq!(config.initial_speed(), 15.0 * 0.25);

        let broken = FieldSettings {
            speed_limit: 0.0,
            ..FieldSettings::default()
        };
        assert!(SimulationConfig::try_from(&broken).is_err());
    }

    #[test]
    fn test_error_message_names_parameter() {
        let err = ConfigurationError::NotPositive {
            parameter: "visual_range",
            value: 0.0,
        };
        assert_eq!(
            format!("{}", err),
            "visual_range must be a positive finite number, got 0"
        );
    }
}
