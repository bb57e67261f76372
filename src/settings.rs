//! Trial configuration
//!
//! One immutable value handed to the state machine at construction.
//! Loaded from JSON; missing fields fall back to the reference setup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::Arena;

/// Parameters of every sub-trial in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Dots ===
    /// Dots shown per sub-trial (targets included)
    pub dot_count: usize,
    pub dot_radius: f32,
    /// Arena units per second
    pub dot_speed: f32,

    // === Timing ===
    /// Blink + move window (ms)
    pub trial_duration_ms: u32,
    /// Leading blink part of the window (ms)
    pub blink_duration_ms: u32,
    pub tick_interval_ms: u32,
    /// Blink colour toggles every N ticks
    pub blink_toggle_every: u32,

    // === Clicking ===
    /// Release this close to the highlighted dot's center keeps the highlight
    pub drag_tolerance: f32,

    // === Layout ===
    /// Candidate draws per dot before layout fails
    pub max_placement_attempts: u32,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            dot_count: DOT_COUNT,
            dot_radius: DOT_RADIUS,
            dot_speed: DOT_SPEED,

            trial_duration_ms: TRIAL_DURATION_MS,
            blink_duration_ms: BLINK_DURATION_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            blink_toggle_every: BLINK_TOGGLE_EVERY,

            drag_tolerance: DRAG_TOLERANCE,

            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl TrialConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded trial config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.dot_radius > 0.0) {
            return invalid(format!("dot_radius must be positive, got {}", self.dot_radius));
        }
        if !(self.arena_width > 2.0 * self.dot_radius && self.arena_height > 2.0 * self.dot_radius)
        {
            return invalid(format!(
                "arena {}x{} is too small for dots of radius {}",
                self.arena_width, self.arena_height, self.dot_radius
            ));
        }
        if self.dot_count == 0 {
            return invalid("dot_count must be at least 1".to_string());
        }
        if !(self.dot_speed > 0.0) {
            return invalid(format!("dot_speed must be positive, got {}", self.dot_speed));
        }
        if self.tick_interval_ms == 0 {
            return invalid("tick_interval_ms must be non-zero".to_string());
        }
        if self.trial_duration_ms == 0 {
            return invalid("trial_duration_ms must be non-zero".to_string());
        }
        if self.blink_duration_ms > self.trial_duration_ms {
            return invalid(format!(
                "blink_duration_ms ({}) exceeds trial_duration_ms ({})",
                self.blink_duration_ms, self.trial_duration_ms
            ));
        }
        if self.blink_toggle_every == 0 {
            return invalid("blink_toggle_every must be non-zero".to_string());
        }
        if self.drag_tolerance < 0.0 {
            return invalid(format!(
                "drag_tolerance must not be negative, got {}",
                self.drag_tolerance
            ));
        }
        if self.max_placement_attempts == 0 {
            return invalid("max_placement_attempts must be non-zero".to_string());
        }
        Ok(())
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.arena_height)
    }

    /// Simulation step in seconds
    pub fn dt(&self) -> f32 {
        self.tick_interval_ms as f32 / 1000.0
    }

    /// Ticks in the blink + move window (the last one opens the response window)
    pub fn total_ticks(&self) -> u32 {
        self.trial_duration_ms.div_ceil(self.tick_interval_ms).max(2)
    }

    /// Leading ticks spent blinking
    pub fn blink_ticks(&self) -> u32 {
        let fraction = self.blink_duration_ms as f64 / self.trial_duration_ms as f64;
        (self.total_ticks() as f64 * fraction).floor() as u32
    }
}
