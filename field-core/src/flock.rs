use alloc::boxed::Box;
use alloc::vec::Vec;
use core::f32::consts::TAU;

use rand::Rng;

use crate::config::{ConfigurationError, SimulationConfig};
use crate::neighbors::{BruteForce, NeighborQuery};
use crate::surface::Surface;
use crate::Vector2D;

/// A single boid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Particle {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Self { position, velocity }
    }

    /// Uniform position inside the bounds, uniform heading, speed up to
    /// `max_speed`. Empty or non-finite extents place the particle at 0.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, max_speed: f32) -> Self {
        let mut coordinate = |extent: f32| {
            if extent.is_finite() && extent > 0.0 {
                rng.gen_range(0.0..extent)
            } else {
                0.0
            }
        };
        let x = coordinate(width);
        let y = coordinate(height);
        let heading = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(0.0..=max_speed);

        Self::new(Vector2D::new(x, y), Vector2D::from_angle(heading, speed))
    }

    /// Clamp the position into `[0, width] x [0, height]`
    pub fn clamp_to(&mut self, width: f32, height: f32) {
        self.position.x = self.position.x.max(0.0).min(width.max(0.0));
        self.position.y = self.position.y.max(0.0).min(height.max(0.0));
    }
}

/// The individual flocking rules. Each takes the particle, the whole
/// population and the indices of its current neighbors.
pub mod behavior {
    use super::*;
    use crate::config::SteeringWeights;

    /// Push away from neighbors closer than `min_distance`, proportional to
    /// how far inside that distance they are
    pub fn separation(
        particle: &Particle,
        particles: &[Particle],
        neighbors: &[usize],
        weights: &SteeringWeights,
    ) -> Vector2D {
        let mut steering = Vector2D::zero();

        for &i in neighbors {
            let offset = particle.position - particles[i].position;
            let distance = offset.magnitude();
            if distance > 0.0 && distance < weights.min_distance {
                steering += offset / distance * (weights.min_distance - distance);
            }
        }

        steering * weights.separation
    }

    /// Nudge the velocity toward the neighborhood's average velocity
    pub fn alignment(
        particle: &Particle,
        particles: &[Particle],
        neighbors: &[usize],
        weights: &SteeringWeights,
    ) -> Vector2D {
        if neighbors.is_empty() {
            return Vector2D::zero();
        }

        let mut sum = Vector2D::zero();
        for &i in neighbors {
            sum += particles[i].velocity;
        }

        let average = sum / neighbors.len() as f32;
        (average - particle.velocity) * weights.alignment
    }

    /// Nudge toward the neighborhood's centroid
    pub fn cohesion(
        particle: &Particle,
        particles: &[Particle],
        neighbors: &[usize],
        weights: &SteeringWeights,
    ) -> Vector2D {
        if neighbors.is_empty() {
            return Vector2D::zero();
        }

        let mut sum = Vector2D::zero();
        for &i in neighbors {
            sum += particles[i].position;
        }

        let centroid = sum / neighbors.len() as f32;
        (centroid - particle.position) * weights.cohesion
    }

    /// Soft containment: steer back toward the middle near or past an edge.
    ///
    /// The margin shrinks to half the extent on small surfaces so the two
    /// edge biases never cancel out.
    pub fn contain(particle: &Particle, width: f32, height: f32, weights: &SteeringWeights) -> Vector2D {
        Vector2D::new(
            edge_bias(particle.position.x, width, weights),
            edge_bias(particle.position.y, height, weights),
        )
    }

    fn edge_bias(coordinate: f32, extent: f32, weights: &SteeringWeights) -> f32 {
        let extent = extent.max(0.0);
        let margin = weights.edge_margin.min(extent / 2.0);

        if coordinate < margin {
            weights.turn_factor
        } else if coordinate > extent - margin {
            -weights.turn_factor
        } else {
            0.0
        }
    }
}

/// A fixed-size population of particles bounded by the current surface
pub struct Flock {
    particles: Vec<Particle>,
    config: SimulationConfig,
    width: f32,
    height: f32,
    query: Box<dyn NeighborQuery>,
    // Per-tick scratch space, kept to avoid reallocating every frame
    neighbors: Vec<usize>,
    velocities: Vec<Vector2D>,
}

impl Flock {
    /// Validate the config and scatter `population` particles over the bounds
    pub fn init<R: Rng + ?Sized>(
        config: SimulationConfig,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let max_speed = config.initial_speed();
        let particles = (0..config.population)
            .map(|_| Particle::random(rng, width, height, max_speed))
            .collect();

        Ok(Self::assemble(config, width, height, particles))
    }

    /// Build a flock from explicit particles. The population size becomes
    /// `particles.len()`.
    pub fn from_particles(
        mut config: SimulationConfig,
        width: f32,
        height: f32,
        particles: Vec<Particle>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        config.population = particles.len();
        Ok(Self::assemble(config, width, height, particles))
    }

    fn assemble(config: SimulationConfig, width: f32, height: f32, particles: Vec<Particle>) -> Self {
        Self {
            neighbors: Vec::with_capacity(particles.len()),
            velocities: Vec::with_capacity(particles.len()),
            particles,
            config,
            width,
            height,
            query: Box::new(BruteForce),
        }
    }

    /// Swap the neighbor lookup strategy
    pub fn with_neighbor_query<Q: NeighborQuery + 'static>(mut self, query: Q) -> Self {
        self.query = Box::new(query);
        self
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Advance one tick. Every new velocity is computed from the same
    /// snapshot of the population before any particle moves.
    pub fn step(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;

        let radius = self.config.visual_range;
        let weights = &self.config.steering;
        self.query.prepare(&self.particles, radius);
        self.velocities.clear();

        for (index, particle) in self.particles.iter().enumerate() {
            self.neighbors.clear();
            self.query
                .neighbors(&self.particles, index, radius, &mut self.neighbors);

            let steering = behavior::separation(particle, &self.particles, &self.neighbors, weights)
                + behavior::alignment(particle, &self.particles, &self.neighbors, weights)
                + behavior::cohesion(particle, &self.particles, &self.neighbors, weights)
                + behavior::contain(particle, width, height, weights);

            self.velocities
                .push((particle.velocity + steering).limit(self.config.speed_limit));
        }

        for (particle, velocity) in self.particles.iter_mut().zip(self.velocities.iter()) {
            particle.velocity = *velocity;
            particle.position += *velocity;
        }
    }

    /// Draw every particle as a filled circle. Does not clear the surface.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, pixel_ratio: f32) {
        let radius = self.config.particle_radius * pixel_ratio;
        if radius <= 0.0 {
            return;
        }

        for particle in &self.particles {
            surface.fill_circle(
                particle.position.x * pixel_ratio,
                particle.position.y * pixel_ratio,
                radius,
                self.config.particle_color,
            );
        }
    }

    /// Clamp positions into the new bounds; velocities and population are kept
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        for particle in &mut self.particles {
            particle.clamp_to(width, height);
        }
    }
}
