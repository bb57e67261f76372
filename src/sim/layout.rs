//! Dot field layout
//!
//! Rejection sampling inside the arena's central `[0.1, 0.9]` region with a
//! minimum center distance of five radii. Dense fields (many dots, large
//! radius, small arena) can make this impossible, so every dot gets a fixed
//! budget of candidate draws and the layout fails instead of spinning.

use glam::Vec2;
use rand::Rng;

use super::arena::Arena;
use super::state::Dot;
use crate::consts::MIN_SEPARATION_RADII;
use crate::error::LayoutError;
use crate::generate_velocity;
use crate::settings::TrialConfig;

/// Place `n` centers at least `5 * radius` apart from each other and from
/// every point in `existing`.
pub fn place<R: Rng + ?Sized>(
    n: usize,
    radius: f32,
    arena: &Arena,
    existing: &[Vec2],
    max_attempts: u32,
    rng: &mut R,
) -> Result<Vec<Vec2>, LayoutError> {
    let min_dist = MIN_SEPARATION_RADII * radius;
    let mut taken: Vec<Vec2> = existing.to_vec();
    let mut placed = Vec::with_capacity(n);

    for _ in 0..n {
        let candidate = (0..max_attempts)
            .map(|_| arena.sample_placement(rng))
            .find(|c| taken.iter().all(|p| p.distance(*c) >= min_dist));

        match candidate {
            Some(c) => {
                taken.push(c);
                placed.push(c);
            }
            None => {
                log::warn!(
                    "Layout gave up after {} attempts: {}/{} dots placed (radius {})",
                    max_attempts,
                    placed.len(),
                    n,
                    radius
                );
                return Err(LayoutError::Infeasible {
                    requested: n,
                    placed: placed.len(),
                    attempts: max_attempts,
                });
            }
        }
    }

    Ok(placed)
}

/// Build a complete dot field for one sub-trial.
///
/// Ids run `0..dot_count`; every dot starts `Normal` with its own random
/// heading at `dot_speed`.
pub fn lay_out_field<R: Rng + ?Sized>(
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Vec<Dot>, LayoutError> {
    let centers = place(
        config.dot_count,
        config.dot_radius,
        &config.arena(),
        &[],
        config.max_placement_attempts,
        rng,
    )?;

    let dots = centers
        .into_iter()
        .enumerate()
        .map(|(i, center)| {
            let mut dot = Dot::new(i as u32, center, config.dot_radius);
            dot.velocity = generate_velocity(rng, config.dot_speed);
            dot
        })
        .collect();

    Ok(dots)
}
