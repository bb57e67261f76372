//! Rectangular arena geometry
//!
//! Origin at the bottom-left corner, `y` grows upward:
//! - left edge: x = 0, right edge: x = width
//! - bottom edge: y = 0, top edge: y = height

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{PLACEMENT_MAX, PLACEMENT_MIN};

/// Immutable per-trial boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Lower-left corner of the placement region
    #[inline]
    pub fn placement_min(&self) -> Vec2 {
        Vec2::new(self.width * PLACEMENT_MIN, self.height * PLACEMENT_MIN)
    }

    /// Upper-right corner of the placement region
    #[inline]
    pub fn placement_max(&self) -> Vec2 {
        Vec2::new(self.width * PLACEMENT_MAX, self.height * PLACEMENT_MAX)
    }

    /// Uniform sample inside the placement region
    pub fn sample_placement<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let min = self.placement_min();
        let max = self.placement_max();
        Vec2::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
        )
    }
}
