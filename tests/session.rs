//! End-to-end sessions driven through the public state machine API

use dot_tracker::persistence::write_summary;
use dot_tracker::sim::{DotVisualState, TrialEvent, TrialMachine, TrialPhase};
use dot_tracker::{LayoutError, ManualClock, Protocol, TrialConfig, TrialError};
use glam::Vec2;

const TICK_MS: f64 = 30.0;

/// 10 ticks per window: 2 blinking, 7 moving, 1 opening the response window
fn quick_config() -> TrialConfig {
    TrialConfig {
        trial_duration_ms: 300,
        blink_duration_ms: 60,
        tick_interval_ms: 30,
        ..Default::default()
    }
}

fn new_machine(counts: &[usize], seed: u64) -> (TrialMachine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let machine = TrialMachine::new(
        quick_config(),
        Protocol::new(counts).unwrap(),
        seed,
        clock.clone(),
    )
    .unwrap();
    (machine, clock)
}

/// Tick until the response window opens
fn play_window(machine: &mut TrialMachine<ManualClock>, clock: &ManualClock) -> Vec<TrialEvent> {
    let mut events = Vec::new();
    while machine.is_ticking() {
        clock.advance(TICK_MS);
        events.extend(machine.on_tick());
    }
    events
}

fn center_of(machine: &TrialMachine<ManualClock>, id: u32) -> Vec2 {
    machine.dots().iter().find(|d| d.id == id).unwrap().center
}

fn click(machine: &mut TrialMachine<ManualClock>, point: Vec2) -> Vec<TrialEvent> {
    let mut events = machine.on_press(point);
    events.extend(machine.on_release(point));
    events
}

fn first_distractor(machine: &TrialMachine<ManualClock>) -> u32 {
    machine
        .dots()
        .iter()
        .find(|d| !machine.tracked().contains(&d.id))
        .unwrap()
        .id
}

#[test]
fn all_correct_picks_keep_full_count() {
    let (mut m, clock) = new_machine(&[2], 7);
    m.start_session("P01").unwrap();
    let events = play_window(&mut m, &clock);
    assert!(events.contains(&TrialEvent::ResponseWindowOpened { index: 0 }));

    let targets = m.tracked().to_vec();
    let first = center_of(&m, targets[0]);
    let second = center_of(&m, targets[1]);
    clock.advance(400.0);
    click(&mut m, first);
    clock.advance(350.0);
    let events = click(&mut m, second);

    let summary = events
        .iter()
        .find_map(|e| match e {
            TrialEvent::SessionComplete(s) => Some(s.clone()),
            _ => None,
        })
        .expect("session should complete");
    assert_eq!(summary.participant, "P01");
    assert_eq!(summary.correct_counts, vec![2]);
    assert_eq!(summary.durations_ms, vec![750.0]);
    assert_eq!(m.phase(), TrialPhase::SessionComplete);
}

#[test]
fn wrong_then_right_scores_one() {
    let (mut m, clock) = new_machine(&[2, 2], 11);
    m.start_session("P02").unwrap();
    play_window(&mut m, &clock);

    let target = m.tracked()[0];
    let distractor = first_distractor(&m);
    let wrong = center_of(&m, distractor);
    let right = center_of(&m, target);
    click(&mut m, wrong);
    let events = click(&mut m, right);

    assert!(events.iter().any(|e| matches!(
        e,
        TrialEvent::SubTrialComplete {
            index: 0,
            correct: 1,
            ..
        }
    )));
    assert_eq!(m.run().correct_counts[0], 1);
    assert_eq!(m.run().remaining_clicks, 0);
    assert_eq!(m.phase(), TrialPhase::Idle);

    // The missed target is revealed until the next sub-trial starts
    let missed = m
        .dots()
        .iter()
        .filter(|d| d.state == DotVisualState::UnselectedTarget)
        .count();
    assert_eq!(missed, 1);
}

#[test]
fn repeated_click_on_same_dot_counts_once() {
    let (mut m, clock) = new_machine(&[3], 5);
    m.start_session("P03").unwrap();
    play_window(&mut m, &clock);

    let distractor = first_distractor(&m);
    let point = center_of(&m, distractor);
    assert!(!click(&mut m, point).is_empty());
    let again: Vec<_> = click(&mut m, point)
        .into_iter()
        .filter(|e| matches!(e, TrialEvent::ClickRecorded(_)))
        .collect();

    assert!(again.is_empty());
    assert_eq!(m.run().correct_counts, vec![2]);
    assert_eq!(m.run().remaining_clicks, 2);
}

#[test]
fn full_protocol_writes_one_entry_per_sub_trial() {
    let counts = [2, 3, 4];
    let (mut m, clock) = new_machine(&counts, 99);
    let mut events = m.start_session("P04").unwrap();

    let summary = loop {
        if let Some(s) = events.iter().find_map(|e| match e {
            TrialEvent::SessionComplete(s) => Some(s.clone()),
            _ => None,
        }) {
            break s;
        }
        events = match m.phase() {
            TrialPhase::Idle => m.advance().unwrap(),
            TrialPhase::Blinking | TrialPhase::Moving => play_window(&mut m, &clock),
            TrialPhase::AwaitingClicks => {
                clock.advance(500.0);
                let target = m
                    .tracked()
                    .iter()
                    .copied()
                    .find(|id| !m.run().is_clicked(*id))
                    .unwrap();
                let point = center_of(&m, target);
                click(&mut m, point)
            }
            phase => panic!("unexpected phase {:?}", phase),
        };
    };

    assert_eq!(summary.durations_ms.len(), counts.len());
    assert_eq!(summary.correct_counts, counts.to_vec());
    for (duration, count) in summary.durations_ms.iter().zip(counts) {
        assert_eq!(*duration, 500.0 * count as f64);
    }

    let dir = tempfile::tempdir().unwrap();
    let path = write_summary(dir.path(), &summary).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text, "P04\n1000.0,1500.0,2000.0\n2,3,4\n");
}

#[test]
fn cancel_during_motion_freezes_everything() {
    let (mut m, clock) = new_machine(&[2, 2], 3);
    m.start_session("P05").unwrap();
    for _ in 0..5 {
        clock.advance(TICK_MS);
        m.on_tick();
    }
    assert_eq!(m.phase(), TrialPhase::Moving);

    let events = m.cancel();
    assert_eq!(events, vec![TrialEvent::Cancelled]);
    assert_eq!(m.phase(), TrialPhase::Idle);
    assert!(m.dots().is_empty());
    assert!(!m.is_ticking());

    for _ in 0..3 {
        clock.advance(TICK_MS);
        assert!(m.on_tick().is_empty());
    }
    assert!(m.dots().is_empty());
    assert_eq!(m.run().sub_trial_index, 0);
    assert!(m.run().sub_trial_durations_ms.is_empty());
}

#[test]
fn clicks_before_response_window_are_ignored() {
    let (mut m, clock) = new_machine(&[2], 8);
    m.start_session("P06").unwrap();
    clock.advance(TICK_MS);
    m.on_tick();

    let target = center_of(&m, m.tracked()[0]);
    assert!(click(&mut m, target).is_empty());
    assert!(m.run().clicked_dots.is_empty());
}

#[test]
fn blank_participant_is_rejected() {
    let (mut m, _) = new_machine(&[2], 1);
    assert!(matches!(
        m.start_session(""),
        Err(TrialError::InvalidParticipant)
    ));
    assert_eq!(m.phase(), TrialPhase::Idle);
    assert!(m.run().participant.is_none());
}

#[test]
fn infeasible_layout_is_an_error() {
    let config = TrialConfig {
        dot_count: 20,
        dot_radius: 0.1,
        max_placement_attempts: 200,
        ..quick_config()
    };
    let mut m =
        TrialMachine::new(config, Protocol::new(&[2]).unwrap(), 1, ManualClock::new()).unwrap();

    match m.start_session("P07") {
        Err(TrialError::Layout(LayoutError::Infeasible { requested, .. })) => {
            assert_eq!(requested, 20)
        }
        other => panic!("expected layout failure, got {:?}", other),
    }
    assert_eq!(m.phase(), TrialPhase::Idle);
    assert!(m.run().participant.is_none());
    assert!(m.dots().is_empty());
}

#[test]
fn same_seed_replays_identically() {
    let (mut a, clock_a) = new_machine(&[2, 3], 2024);
    let (mut b, clock_b) = new_machine(&[2, 3], 2024);
    a.start_session("A").unwrap();
    b.start_session("A").unwrap();

    while a.is_ticking() {
        clock_a.advance(TICK_MS);
        clock_b.advance(TICK_MS);
        assert_eq!(a.on_tick(), b.on_tick());
        assert_eq!(a.dots(), b.dots());
    }

    let (mut c, clock_c) = new_machine(&[2, 3], 2025);
    c.start_session("A").unwrap();
    play_window(&mut c, &clock_c);
    assert_ne!(a.dots(), c.dots());
}

#[test]
fn dots_stay_near_the_arena() {
    let config = TrialConfig {
        dot_speed: 2.0,
        ..quick_config()
    };
    let clock = ManualClock::new();
    let mut m = TrialMachine::new(config, Protocol::new(&[2]).unwrap(), 17, clock.clone()).unwrap();
    m.start_session("P08").unwrap();
    play_window(&mut m, &clock);

    // Reflection never pushes a dot back, so allow one step plus a radius
    let slack = 2.0 * 0.03 + 0.02;
    for dot in m.dots() {
        assert!(dot.center.x > -slack && dot.center.x < 1.0 + slack);
        assert!(dot.center.y > -slack && dot.center.y < 1.0 + slack);
    }
}
