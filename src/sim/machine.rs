//! Trial state machine
//!
//! Owns the live dot field and the run bookkeeping. The shell drives it
//! through plain method calls and redraws whenever an operation returns
//! events:
//!
//! ```text
//! start_session ─► Blinking ─► Moving ─► AwaitingClicks ─┬─► Idle ─ advance ─► Blinking ...
//!                  (on_tick)   (on_tick)  (on_press /     └─► SessionComplete
//!                                          on_release)
//! ```

use glam::Vec2;
use rand_pcg::Pcg32;

use super::click;
use super::layout::lay_out_field;
use super::state::{Dot, DotVisualState, RngState, TrialEvent, TrialPhase, TrialRunState};
use super::tick;
use crate::error::TrialError;
use crate::protocol::{Protocol, SubTrial};
use crate::settings::TrialConfig;
use crate::timing::Clock;

/// Multiple object tracking session driver
pub struct TrialMachine<C: Clock> {
    config: TrialConfig,
    protocol: Protocol,
    rng_state: RngState,
    rng: Pcg32,
    clock: C,
    dots: Vec<Dot>,
    run: TrialRunState,
}

impl<C: Clock> TrialMachine<C> {
    /// Validate `config` against `protocol` and build an idle machine.
    ///
    /// The seed fixes every layout and heading of the session.
    pub fn new(
        config: TrialConfig,
        protocol: Protocol,
        seed: u64,
        clock: C,
    ) -> Result<Self, TrialError> {
        config.validate()?;
        protocol.check_fits(config.dot_count)?;

        let rng_state = RngState::new(seed);
        Ok(Self {
            config,
            protocol,
            rng: rng_state.to_rng(),
            rng_state,
            clock,
            dots: Vec::new(),
            run: TrialRunState::new(),
        })
    }

    /// Begin a run for `participant` and launch its first sub-trial.
    ///
    /// Allowed before any run and after a run has completed. An empty id is
    /// rejected without touching any state, and a failed layout leaves the
    /// previous run and its dots in place.
    pub fn start_session(&mut self, participant: &str) -> Result<Vec<TrialEvent>, TrialError> {
        let participant = participant.trim();
        if participant.is_empty() {
            log::warn!("Rejected session start: empty participant id");
            return Err(TrialError::InvalidParticipant);
        }
        let phase = self.run.phase;
        let fresh = self.run.participant.is_none() && phase == TrialPhase::Idle;
        if !fresh && phase != TrialPhase::SessionComplete {
            return Err(TrialError::WrongPhase {
                expected: TrialPhase::SessionComplete,
                actual: phase,
            });
        }

        log::info!(
            "Starting session for {} ({} sub-trials, seed {})",
            participant,
            self.protocol.len(),
            self.rng_state.seed
        );
        let previous = std::mem::take(&mut self.run);
        self.run.begin(participant.to_string(), &self.protocol);

        match self.advance() {
            Ok(events) => Ok(events),
            Err(e) => {
                self.run = previous;
                Err(e)
            }
        }
    }

    /// Launch the current sub-trial: fresh field, new targets, clock running
    pub fn advance(&mut self) -> Result<Vec<TrialEvent>, TrialError> {
        if self.run.participant.is_none() {
            return Err(TrialError::NoActiveSession);
        }
        if self.run.phase != TrialPhase::Idle {
            return Err(TrialError::WrongPhase {
                expected: TrialPhase::Idle,
                actual: self.run.phase,
            });
        }
        let Some(&SubTrial {
            index,
            required_tracked,
        }) = self.protocol.get(self.run.sub_trial_index)
        else {
            return Err(TrialError::NoActiveSession);
        };

        let mut dots = lay_out_field(&self.config, &mut self.rng)?;

        self.run.reset_clicking();
        self.run.tracked = dots.iter().take(required_tracked).map(|d| d.id).collect();
        for dot in dots.iter_mut().take(required_tracked) {
            dot.set_state(DotVisualState::TrackedHidden);
        }
        self.dots = dots;
        self.run.remaining_clicks = required_tracked;
        self.run.phase = TrialPhase::Blinking;
        self.run.tick_index = 0;
        self.run.ticking = true;

        log::info!(
            "Sub-trial {}/{} started: {} targets among {} dots",
            index + 1,
            self.protocol.len(),
            required_tracked,
            self.dots.len()
        );
        Ok(vec![TrialEvent::SubTrialStarted {
            index,
            required: required_tracked,
        }])
    }

    /// One fixed-interval step; ignored unless the clock is running
    pub fn on_tick(&mut self) -> Vec<TrialEvent> {
        let now = self.clock.now_ms();
        tick::tick(&mut self.run, &mut self.dots, &self.config, now)
    }

    pub fn on_press(&mut self, point: Vec2) -> Vec<TrialEvent> {
        click::press(&mut self.run, &mut self.dots, point)
    }

    pub fn on_release(&mut self, point: Vec2) -> Vec<TrialEvent> {
        let now = self.clock.now_ms();
        click::release(
            &mut self.run,
            &mut self.dots,
            point,
            self.config.drag_tolerance,
            now,
            self.protocol.len(),
        )
    }

    /// Abort the running sub-trial.
    ///
    /// The clock stops first, so no tick lands after this returns. Dots are
    /// cleared and the phase returns to `Idle`; the sub-trial index is kept
    /// and any picks already scored for it are rolled back, so the next
    /// `advance` replays it from scratch.
    pub fn cancel(&mut self) -> Vec<TrialEvent> {
        self.run.ticking = false;
        if self.run.participant.is_none() || self.run.phase == TrialPhase::SessionComplete {
            return Vec::new();
        }

        let index = self.run.sub_trial_index;
        if let (Some(slot), Some(sub)) = (
            self.run.correct_counts.get_mut(index),
            self.protocol.get(index),
        ) {
            *slot = sub.required_tracked;
        }
        self.run.click_log.retain(|c| c.sub_trial != index);

        self.dots.clear();
        self.run.reset_clicking();
        self.run.tick_index = 0;
        self.run.phase = TrialPhase::Idle;

        log::info!("Sub-trial {} cancelled", index);
        vec![TrialEvent::Cancelled]
    }

    /// Drop the current run entirely and return to a never-started machine
    pub fn reset(&mut self) {
        self.run = TrialRunState::new();
        self.dots.clear();
    }

    pub fn phase(&self) -> TrialPhase {
        self.run.phase
    }

    /// Live dot field, for rendering
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn run(&self) -> &TrialRunState {
        &self.run
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Whether the shell should keep delivering ticks
    pub fn is_ticking(&self) -> bool {
        self.run.ticking
    }

    pub fn clicking_enabled(&self) -> bool {
        self.run.clicking_enabled()
    }

    /// Ids of the current targets
    pub fn tracked(&self) -> &[u32] {
        &self.run.tracked
    }

    pub fn current_sub_trial(&self) -> Option<&SubTrial> {
        self.protocol.get(self.run.sub_trial_index)
    }
}
