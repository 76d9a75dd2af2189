//! Neighbor lookup strategies.
//!
//! The steering rules only ever see a list of neighbor indices, so the scan
//! can be swapped for a bucketed index when populations grow.

use alloc::vec::Vec;

use crate::flock::Particle;
use crate::math;

pub trait NeighborQuery {
    /// Rebuild any index over the current positions. Called once per tick.
    fn prepare(&mut self, particles: &[Particle], radius: f32);

    /// Push the indices of every particle strictly closer than `radius` to
    /// `particles[index]`, excluding `index` itself.
    fn neighbors(&self, particles: &[Particle], index: usize, radius: f32, out: &mut Vec<usize>);
}

/// Checks every pair. O(n²) per tick, fine for a few hundred particles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl NeighborQuery for BruteForce {
    fn prepare(&mut self, _particles: &[Particle], _radius: f32) {}

    fn neighbors(&self, particles: &[Particle], index: usize, radius: f32, out: &mut Vec<usize>) {
        let origin = particles[index].position;
        let radius_squared = radius * radius;

        for (other, particle) in particles.iter().enumerate() {
            if other != index && origin.distance_squared(&particle.position) < radius_squared {
                out.push(other);
            }
        }
    }
}

/// Upper bound on cells per axis so a tiny radius over a huge area can't
/// allocate without limit
const MAX_CELLS_PER_AXIS: usize = 256;

/// Uniform bucket grid over the bounding box of the population.
///
/// Cells are at least `radius` wide, so every neighbor of a particle lives in
/// the 3x3 block of cells around it.
#[derive(Debug, Clone, Default)]
pub struct UniformGrid {
    cells: Vec<Vec<usize>>,
    cell_of: Vec<usize>,
    cell_size: f32,
    columns: usize,
    rows: usize,
    min_x: f32,
    min_y: f32,
}

impl UniformGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_coords(&self, x: f32, y: f32) -> (usize, usize) {
        let column = math::floor((x - self.min_x) / self.cell_size) as usize;
        let row = math::floor((y - self.min_y) / self.cell_size) as usize;
        (column.min(self.columns - 1), row.min(self.rows - 1))
    }
}

impl NeighborQuery for UniformGrid {
    fn prepare(&mut self, particles: &[Particle], radius: f32) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.cell_of.clear();

        if particles.is_empty() {
            self.columns = 0;
            self.rows = 0;
            return;
        }

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for particle in particles {
            min_x = min_x.min(particle.position.x);
            min_y = min_y.min(particle.position.y);
            max_x = max_x.max(particle.position.x);
            max_y = max_y.max(particle.position.y);
        }

        let extent = (max_x - min_x).max(max_y - min_y);
        self.cell_size = radius.max(extent / MAX_CELLS_PER_AXIS as f32);
        self.min_x = min_x;
        self.min_y = min_y;
        self.columns = (math::floor((max_x - min_x) / self.cell_size) as usize + 1).min(MAX_CELLS_PER_AXIS);
        self.rows = (math::floor((max_y - min_y) / self.cell_size) as usize + 1).min(MAX_CELLS_PER_AXIS);

        let needed = self.columns * self.rows;
        if self.cells.len() < needed {
            self.cells.resize_with(needed, Vec::new);
        }

        for (index, particle) in particles.iter().enumerate() {
            let (column, row) = self.cell_coords(particle.position.x, particle.position.y);
            let cell = row * self.columns + column;
            self.cells[cell].push(index);
            self.cell_of.push(cell);
        }
    }

    fn neighbors(&self, particles: &[Particle], index: usize, radius: f32, out: &mut Vec<usize>) {
        let Some(&cell) = self.cell_of.get(index) else {
            return;
        };
        let origin = particles[index].position;
        let radius_squared = radius * radius;
        let (column, row) = (cell % self.columns, cell / self.columns);
        let start = out.len();

        for check_row in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for check_column in column.saturating_sub(1)..=(column + 1).min(self.columns - 1) {
                for &other in &self.cells[check_row * self.columns + check_column] {
                    if other != index
                        && origin.distance_squared(&particles[other].position) < radius_squared
                    {
                        out.push(other);
                    }
                }
            }
        }

        // Same order as a linear scan, so steering sums match bit for bit
        out[start..].sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector2D;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_particles(rng: &mut StdRng, count: usize, width: f32, height: f32) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                Particle::new(
                    Vector2D::new(rng.gen_range(-20.0..width + 20.0), rng.gen_range(-20.0..height + 20.0)),
                    Vector2D::zero(),
                )
            })
            .collect()
    }

    fn collect<Q: NeighborQuery>(query: &mut Q, particles: &[Particle], radius: f32) -> Vec<Vec<usize>> {
        query.prepare(particles, radius);
        (0..particles.len())
            .map(|index| {
                let mut out = Vec::new();
                query.neighbors(particles, index, radius, &mut out);
                out.sort_unstable();
                out
            })
            .collect()
    }

    #[test]
    fn test_brute_force_excludes_self_and_far_particles() {
        let particles = [
            Particle::new(Vector2D::new(0.0, 0.0), Vector2D::zero()),
            Particle::new(Vector2D::new(10.0, 0.0), Vector2D::zero()),
            Particle::new(Vector2D::new(100.0, 0.0), Vector2D::zero()),
        ];
        let mut out = Vec::new();
        BruteForce.neighbors(&particles, 0, 75.0, &mut out);
        assert_eq!(out, [1]);
    }

    #[test]
    fn test_radius_is_exclusive() {
        let particles = [
            Particle::new(Vector2D::new(0.0, 0.0), Vector2D::zero()),
            Particle::new(Vector2D::new(75.0, 0.0), Vector2D::zero()),
        ];
        let mut out = Vec::new();
        BruteForce.neighbors(&particles, 0, 75.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_neighborhood_symmetry() {
        let mut rng = StdRng::seed_from_u64(7);
        let particles = random_particles(&mut rng, 150, 800.0, 600.0);
        let sets = collect(&mut BruteForce, &particles, 75.0);

        for (a, neighbors) in sets.iter().enumerate() {
            for &b in neighbors {
                assert!(sets[b].contains(&a), "{} sees {} but not the reverse", a, b);
            }
        }
    }

    #[test]
    fn test_random_pairs_symmetric() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1_000 {
            let radius = rng.gen_range(1.0..150.0);
            let particles = random_particles(&mut rng, 2, 300.0, 300.0);
            let mut forward = Vec::new();
            let mut backward = Vec::new();
            BruteForce.neighbors(&particles, 0, radius, &mut forward);
            BruteForce.neighbors(&particles, 1, radius, &mut backward);
            assert_eq!(forward.is_empty(), backward.is_empty());
        }
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut grid = UniformGrid::new();

        for &(count, radius) in &[(0, 75.0), (1, 75.0), (200, 75.0), (300, 12.5), (50, 400.0)] {
            let particles = random_particles(&mut rng, count, 1024.0, 768.0);
            let expected = collect(&mut BruteForce, &particles, radius);
            let actual = collect(&mut grid, &particles, radius);
            assert_eq!(actual, expected, "count {} radius {}", count, radius);
        }
    }

    #[test]
    fn test_grid_caps_cell_count() {
        let particles = [
            Particle::new(Vector2D::new(0.0, 0.0), Vector2D::zero()),
            Particle::new(Vector2D::new(1.0e6, 1.0e6), Vector2D::zero()),
        ];
        let mut grid = UniformGrid::new();
        grid.prepare(&particles, 0.5);
        assert!(grid.columns <= MAX_CELLS_PER_AXIS);
        assert!(grid.rows <= MAX_CELLS_PER_AXIS);
    }
}
