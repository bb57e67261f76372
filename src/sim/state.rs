//! Trial state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::persistence::SessionSummary;
use crate::protocol::Protocol;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialPhase {
    /// Waiting for the next sub-trial to be triggered
    Idle,
    /// Targets flash, nothing moves
    Blinking,
    /// Dots move and bounce off the arena edges
    Moving,
    /// Motion stopped, participant picks dots
    AwaitingClicks,
    /// All clicks of a sub-trial are in (transient)
    SubTrialComplete,
    /// Last sub-trial done, summary emitted
    SessionComplete,
}

/// What a renderer should show for a dot.
///
/// Scoring never reads this back; it only writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DotVisualState {
    #[default]
    Normal,
    /// Target, currently drawn like any other dot
    TrackedHidden,
    /// Target, drawn in the blink colour
    Blinking,
    /// Highlighted between press and release
    Selected,
    /// Picked and was a target
    Correct,
    /// Picked and was not a target
    Incorrect,
    /// Target the participant never picked
    UnselectedTarget,
}

impl DotVisualState {
    /// Default RGBA colour for renderers
    pub fn color(self) -> [u8; 4] {
        match self {
            DotVisualState::Normal | DotVisualState::TrackedHidden => [255, 255, 255, 255],
            DotVisualState::Blinking => [255, 0, 0, 255],
            DotVisualState::Selected => [255, 255, 0, 255],
            DotVisualState::Correct => [0, 255, 0, 255],
            DotVisualState::Incorrect => [255, 0, 255, 255],
            DotVisualState::UnselectedTarget => [0, 128, 255, 255],
        }
    }
}

/// A moving circular dot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub id: u32,
    pub center: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    pub state: DotVisualState,
}

impl Dot {
    pub fn new(id: u32, center: Vec2, radius: f32) -> Self {
        Self {
            id,
            center,
            radius,
            velocity: Vec2::ZERO,
            state: DotVisualState::Normal,
        }
    }

    /// Advance by one step; no clamping
    #[inline]
    pub fn update_position(&mut self, dt: f32) {
        self.center += self.velocity * dt;
    }

    /// Change only the visual tag
    #[inline]
    pub fn set_state(&mut self, state: DotVisualState) {
        self.state = state;
    }

    /// Check if a point is within the dot's radius
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance(point) <= self.radius
    }
}

/// A validated pick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickRecord {
    pub sub_trial: usize,
    pub dot_id: u32,
    pub correct: bool,
    /// Time since the response window opened (ms)
    pub reaction_ms: f64,
}

/// Notifications produced by state machine operations.
///
/// Any event means the dot field changed and should be redrawn.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialEvent {
    SubTrialStarted { index: usize, required: usize },
    BlinkToggled,
    MotionStarted,
    DotsMoved,
    ResponseWindowOpened { index: usize },
    DotHighlighted { dot_id: u32 },
    HighlightCleared,
    ClickRecorded(ClickRecord),
    SubTrialComplete {
        index: usize,
        duration_ms: f64,
        correct: usize,
    },
    SessionComplete(SessionSummary),
    Cancelled,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Per-run bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRunState {
    pub participant: Option<String>,
    pub sub_trial_index: usize,
    pub remaining_clicks: usize,
    pub phase: TrialPhase,
    /// Ids picked in the current sub-trial, in order
    pub clicked_dots: Vec<u32>,
    /// Ids of the current sub-trial's targets
    pub tracked: Vec<u32>,
    /// Dot between press and release
    pub highlighted: Option<u32>,
    /// When the current response window opened (ms)
    pub sub_trial_start_ms: Option<f64>,
    pub sub_trial_durations_ms: Vec<f64>,
    /// One slot per sub-trial, starts at the required count
    pub correct_counts: Vec<usize>,
    pub click_log: Vec<ClickRecord>,
    /// Tick index within the current blink + move window
    pub tick_index: u32,
    /// Tick source should be armed
    pub ticking: bool,
}

impl TrialRunState {
    pub fn new() -> Self {
        Self {
            participant: None,
            sub_trial_index: 0,
            remaining_clicks: 0,
            phase: TrialPhase::Idle,
            clicked_dots: Vec::new(),
            tracked: Vec::new(),
            highlighted: None,
            sub_trial_start_ms: None,
            sub_trial_durations_ms: Vec::new(),
            correct_counts: Vec::new(),
            click_log: Vec::new(),
            tick_index: 0,
            ticking: false,
        }
    }

    /// Fresh run for `participant` over `protocol`
    pub fn begin(&mut self, participant: String, protocol: &Protocol) {
        *self = Self::new();
        self.participant = Some(participant);
        self.correct_counts = protocol.iter().map(|s| s.required_tracked).collect();
    }

    /// Clicking is allowed only while waiting for outstanding picks
    pub fn clicking_enabled(&self) -> bool {
        self.phase == TrialPhase::AwaitingClicks && self.remaining_clicks > 0
    }

    pub fn is_tracked(&self, id: u32) -> bool {
        self.tracked.contains(&id)
    }

    pub fn is_clicked(&self, id: u32) -> bool {
        self.clicked_dots.contains(&id)
    }

    /// Drop per-sub-trial click state
    pub fn reset_clicking(&mut self) {
        self.clicked_dots.clear();
        self.tracked.clear();
        self.highlighted = None;
        self.sub_trial_start_ms = None;
        self.remaining_clicks = 0;
    }
}

impl Default for TrialRunState {
    fn default() -> Self {
        Self::new()
    }
}
