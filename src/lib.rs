//! Dot Tracker - multiple object tracking (MOT) experiment engine
//!
//! Core modules:
//! - `sim`: Deterministic trial simulation (dot physics, phases, click scoring)
//! - `protocol`: Ordered sub-trial table (required target counts)
//! - `settings`: Trial configuration, loaded from JSON
//! - `timing`: Millisecond clocks for reaction-time stamps
//! - `persistence`: Plain-text session summary output
//! - `error`: Error types shared across the crate

pub mod error;
pub mod persistence;
pub mod protocol;
pub mod settings;
pub mod sim;
pub mod timing;

pub use error::{ConfigError, LayoutError, ProtocolError, TrialError};
pub use persistence::SessionSummary;
pub use protocol::{Protocol, SubTrial};
pub use settings::TrialConfig;
pub use sim::{TrialEvent, TrialMachine, TrialPhase};
pub use timing::{Clock, ManualClock, MonotonicClock};

use glam::Vec2;
use rand::Rng;

/// Reference experiment constants
pub mod consts {
    /// Tick interval of the reference setup (ms)
    pub const TICK_INTERVAL_MS: u32 = 30;
    /// Blink colour toggles every N ticks
    pub const BLINK_TOGGLE_EVERY: u32 = 6;

    /// Arena dimensions (unit square, matches the plotting axes)
    pub const ARENA_WIDTH: f32 = 1.0;
    pub const ARENA_HEIGHT: f32 = 1.0;

    /// Dot defaults
    pub const DOT_COUNT: usize = 10;
    pub const DOT_RADIUS: f32 = 0.02;
    /// Dot speed in arena units per second
    pub const DOT_SPEED: f32 = 0.15;

    /// Full blink + move window per sub-trial (ms)
    pub const TRIAL_DURATION_MS: u32 = 10_000;
    /// Leading part of the window during which targets blink (ms)
    pub const BLINK_DURATION_MS: u32 = 2_000;

    /// Minimum center distance between placed dots, in radii
    pub const MIN_SEPARATION_RADII: f32 = 5.0;
    /// Placement region as a fraction of the arena extent
    pub const PLACEMENT_MIN: f32 = 0.1;
    pub const PLACEMENT_MAX: f32 = 0.9;
    /// Candidate draws per dot before layout gives up
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

    /// Release within this distance of the highlighted dot keeps the highlight.
    /// Absolute arena units, not scaled by dot radius.
    pub const DRAG_TOLERANCE: f32 = 0.3;
}

/// Direction vectors shorter than this are re-drawn
const MIN_DIRECTION_LENGTH: f32 = 1e-4;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Random velocity with magnitude `speed`.
///
/// The direction is drawn uniformly from `[-1, 1]²` and normalized;
/// near-zero draws are rejected and re-sampled.
pub fn generate_velocity<R: Rng + ?Sized>(rng: &mut R, speed: f32) -> Vec2 {
    loop {
        let dir = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
        if dir.length() >= MIN_DIRECTION_LENGTH {
            return dir.normalize() * speed;
        }
    }
}
