//! Fixed timestep trial tick
//!
//! One blink + move window is `total_ticks` long:
//! - ticks `[0, blink)`: targets blink, nothing moves
//! - ticks `[blink, total - 1)`: every dot moves and bounces
//! - tick `total - 1`: motion stops and the response window opens

use super::arena::Arena;
use super::collision::bounce;
use super::state::{Dot, DotVisualState, TrialEvent, TrialPhase, TrialRunState};
use crate::settings::TrialConfig;

/// Advance the running window by one tick.
///
/// Does nothing unless the tick clock is running.
pub fn tick(
    run: &mut TrialRunState,
    dots: &mut [Dot],
    config: &TrialConfig,
    now_ms: f64,
) -> Vec<TrialEvent> {
    let mut events = Vec::new();
    if !run.ticking {
        return events;
    }

    let index = run.tick_index;
    run.tick_index += 1;

    let total = config.total_ticks();
    let blink = config.blink_ticks();

    if index + 1 >= total {
        // Final tick: stop the clock before anything else changes
        run.ticking = false;
        hide_targets(run, dots);
        run.phase = TrialPhase::AwaitingClicks;
        run.sub_trial_start_ms = Some(now_ms);
        log::debug!(
            "Sub-trial {} response window opened at {:.1} ms",
            run.sub_trial_index,
            now_ms
        );
        events.push(TrialEvent::ResponseWindowOpened {
            index: run.sub_trial_index,
        });
    } else if index < blink {
        run.phase = TrialPhase::Blinking;
        if index % config.blink_toggle_every == 0 {
            toggle_blink(run, dots);
            events.push(TrialEvent::BlinkToggled);
        }
    } else {
        if run.phase == TrialPhase::Blinking {
            hide_targets(run, dots);
            run.phase = TrialPhase::Moving;
            log::debug!("Sub-trial {} motion started", run.sub_trial_index);
            events.push(TrialEvent::MotionStarted);
        }
        move_dots(dots, &config.arena(), config.dt());
        events.push(TrialEvent::DotsMoved);
    }

    events
}

/// Move every dot by `dt`, then reflect off the arena edges
pub fn move_dots(dots: &mut [Dot], arena: &Arena, dt: f32) {
    for dot in dots.iter_mut() {
        dot.update_position(dt);
        bounce(arena, dot);
    }
}

/// Flip targets between their hidden and blink colours
fn toggle_blink(run: &TrialRunState, dots: &mut [Dot]) {
    for dot in dots.iter_mut().filter(|d| run.is_tracked(d.id)) {
        let next = match dot.state {
            DotVisualState::Blinking => DotVisualState::TrackedHidden,
            _ => DotVisualState::Blinking,
        };
        dot.set_state(next);
    }
}

/// Draw every target like an ordinary dot again
fn hide_targets(run: &TrialRunState, dots: &mut [Dot]) {
    for dot in dots.iter_mut().filter(|d| run.is_tracked(d.id)) {
        dot.set_state(DotVisualState::TrackedHidden);
    }
}
