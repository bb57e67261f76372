//! Click resolution and scoring
//!
//! A pick is a press/release pair. The press only highlights; the release
//! decides. Releasing close enough to the highlighted dot keeps it even if
//! the pointer drifted onto another dot (or off every dot).

use glam::Vec2;

use super::state::{ClickRecord, Dot, DotVisualState, TrialEvent, TrialPhase, TrialRunState};
use crate::persistence::SessionSummary;

/// Nearest dot whose radius contains `point`.
///
/// Exact nearest by center distance, independent of collection order.
pub fn resolve_target(dots: &[Dot], point: Vec2) -> Option<&Dot> {
    dots.iter()
        .filter(|d| d.contains(point))
        .min_by(|a, b| {
            a.center
                .distance_squared(point)
                .total_cmp(&b.center.distance_squared(point))
        })
}

/// Pointer pressed: highlight an unpicked dot under the pointer
pub fn press(run: &mut TrialRunState, dots: &mut [Dot], point: Vec2) -> Vec<TrialEvent> {
    let mut events = Vec::new();
    if !run.clicking_enabled() {
        return events;
    }

    let Some(id) = resolve_target(dots, point).map(|d| d.id) else {
        return events;
    };
    if run.is_clicked(id) {
        return events;
    }

    if let Some(prev) = run.highlighted.take() {
        restore(run, dots, prev);
    }
    if let Some(dot) = find_mut(dots, id) {
        dot.set_state(DotVisualState::Selected);
        run.highlighted = Some(id);
        events.push(TrialEvent::DotHighlighted { dot_id: id });
    }
    events
}

/// Pointer released: validate and score a pick.
///
/// `sub_trial_count` is the protocol length, used to detect the last
/// sub-trial of the session.
pub fn release(
    run: &mut TrialRunState,
    dots: &mut [Dot],
    point: Vec2,
    drag_tolerance: f32,
    now_ms: f64,
    sub_trial_count: usize,
) -> Vec<TrialEvent> {
    let mut events = Vec::new();

    let highlighted = run.highlighted.take();
    if let Some(id) = highlighted {
        restore(run, dots, id);
        events.push(TrialEvent::HighlightCleared);
    }
    if !run.clicking_enabled() {
        return events;
    }

    let fresh = resolve_target(dots, point).map(|d| d.id);
    let chosen = match highlighted.and_then(|id| dots.iter().find(|d| d.id == id)) {
        Some(h) if h.center.distance(point) <= drag_tolerance => Some(h.id),
        _ => fresh,
    };

    let Some(id) = chosen else {
        return events;
    };
    if run.is_clicked(id) {
        return events;
    }

    events.extend(record_click(run, dots, id, now_ms, sub_trial_count));
    events
}

/// Score a validated pick and check for sub-trial completion
fn record_click(
    run: &mut TrialRunState,
    dots: &mut [Dot],
    id: u32,
    now_ms: f64,
    sub_trial_count: usize,
) -> Vec<TrialEvent> {
    let mut events = Vec::new();
    let index = run.sub_trial_index;
    let correct = run.is_tracked(id);

    if let Some(dot) = find_mut(dots, id) {
        dot.set_state(if correct {
            DotVisualState::Correct
        } else {
            DotVisualState::Incorrect
        });
    }
    run.clicked_dots.push(id);
    if !correct
        && let Some(count) = run.correct_counts.get_mut(index)
    {
        *count = count.saturating_sub(1);
    }
    run.remaining_clicks = run.remaining_clicks.saturating_sub(1);

    let record = ClickRecord {
        sub_trial: index,
        dot_id: id,
        correct,
        reaction_ms: now_ms - run.sub_trial_start_ms.unwrap_or(now_ms),
    };
    log::debug!(
        "Sub-trial {}: dot {} picked ({}), {} left, RT {:.1} ms",
        index,
        id,
        if correct { "correct" } else { "incorrect" },
        run.remaining_clicks,
        record.reaction_ms
    );
    run.click_log.push(record);
    events.push(TrialEvent::ClickRecorded(record));

    if run.remaining_clicks == 0 {
        events.extend(complete_sub_trial(run, dots, now_ms, sub_trial_count));
    }
    events
}

/// Close the current sub-trial: record its duration, reveal missed targets,
/// then either idle for the next one or finish the session.
pub fn complete_sub_trial(
    run: &mut TrialRunState,
    dots: &mut [Dot],
    now_ms: f64,
    sub_trial_count: usize,
) -> Vec<TrialEvent> {
    let mut events = Vec::new();
    run.phase = TrialPhase::SubTrialComplete;

    let index = run.sub_trial_index;
    let duration_ms = now_ms - run.sub_trial_start_ms.unwrap_or(now_ms);
    run.sub_trial_durations_ms.push(duration_ms);

    for dot in dots.iter_mut() {
        if run.is_tracked(dot.id) && !run.is_clicked(dot.id) {
            dot.set_state(DotVisualState::UnselectedTarget);
        }
    }

    let correct = run.correct_counts.get(index).copied().unwrap_or(0);
    log::info!(
        "Sub-trial {} complete: {}/{} correct in {:.1} ms",
        index,
        correct,
        run.tracked.len(),
        duration_ms
    );
    events.push(TrialEvent::SubTrialComplete {
        index,
        duration_ms,
        correct,
    });

    run.reset_clicking();
    if index + 1 >= sub_trial_count {
        run.phase = TrialPhase::SessionComplete;
        let summary = SessionSummary::from_run(run);
        log::info!(
            "Session complete for {} ({} sub-trials)",
            summary.participant,
            summary.durations_ms.len()
        );
        events.push(TrialEvent::SessionComplete(summary));
    } else {
        run.sub_trial_index += 1;
        run.phase = TrialPhase::Idle;
    }
    events
}

/// Put an unpicked dot back to the look it had before highlighting
fn restore(run: &TrialRunState, dots: &mut [Dot], id: u32) {
    if let Some(dot) = find_mut(dots, id) {
        if dot.state == DotVisualState::Selected {
            dot.set_state(if run.is_tracked(id) {
                DotVisualState::TrackedHidden
            } else {
                DotVisualState::Normal
            });
        }
    }
}

fn find_mut(dots: &mut [Dot], id: u32) -> Option<&mut Dot> {
    dots.iter_mut().find(|d| d.id == id)
}
