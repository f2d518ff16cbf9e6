//! Gradient noise
//!
//! Two-dimensional Perlin noise with lattice gradients derived from a hash of
//! the cell corner and a seed, so the same seed always yields the same field
//! without storing a gradient table.

use crate::foundation::math::{utils, Vec2};

/// Seeded 2D Perlin noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Perlin {
    seed: u32,
}

impl Perlin {
    /// Noise field for `seed`
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Seed of this field
    pub fn seed(&self) -> u32 {
        self.seed
    }

    fn hash(&self, x: i32, y: i32) -> u32 {
        let mut h = self.seed ^ (x as u32).wrapping_mul(0x27d4_eb2d) ^ (y as u32).wrapping_mul(0x1656_67b1);
        h ^= h >> 15;
        h = h.wrapping_mul(0x85eb_ca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2_ae35);
        h ^ (h >> 16)
    }

    fn gradient(&self, x: i32, y: i32) -> Vec2 {
        let angle = self.hash(x, y) as f32 / u32::MAX as f32 * std::f32::consts::TAU;
        Vec2::new(angle.cos(), angle.sin())
    }

    fn corner_dot(&self, point: &Vec2, corner_x: i32, corner_y: i32) -> f32 {
        let offset = Vec2::new(point.x - corner_x as f32, point.y - corner_y as f32);
        self.gradient(corner_x, corner_y).dot(&offset)
    }

    /// Sample the field at `(x, y)`.
    ///
    /// The result lies in `[-sqrt(2)/2, sqrt(2)/2]` and is zero on every
    /// integer lattice point.
    pub fn noise(&self, x: f32, y: f32) -> f32 {
        let point = Vec2::new(x, y);
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;

        let top_left = self.corner_dot(&point, x0, y0);
        let top_right = self.corner_dot(&point, x0 + 1, y0);
        let bottom_left = self.corner_dot(&point, x0, y0 + 1);
        let bottom_right = self.corner_dot(&point, x0 + 1, y0 + 1);

        let sx = smooth_step(x - x0 as f32);
        let sy = smooth_step(y - y0 as f32);
        let top = utils::lerp(top_left, top_right, sx);
        let bottom = utils::lerp(bottom_left, bottom_right, sx);
        utils::lerp(top, bottom, sy)
    }
}

/// Cubic ease used to blend lattice contributions
fn smooth_step(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
