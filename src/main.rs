//! Dot Tracker headless runner
//!
//! Plays a full session against a scripted participant and writes the
//! summary file. Useful for checking configs and protocols without a display.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use dot_tracker::persistence::write_summary;
use dot_tracker::sim::{TrialEvent, TrialMachine, TrialPhase};
use dot_tracker::{ManualClock, Protocol, SessionSummary, TrialConfig};

/// Run a multiple object tracking session with a scripted participant
#[derive(Parser, Debug)]
#[command(name = "dot-tracker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Participant identifier, also the summary file name
    #[arg(short, long)]
    participant: String,

    /// Trial config JSON (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for dot layouts and headings
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Directory the summary is written to
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// Probability that each scripted pick lands on a target
    #[arg(short, long, default_value_t = 0.8)]
    accuracy: f64,

    /// Sleep one tick interval between ticks
    #[arg(long)]
    realtime: bool,
}

/// Simulated response time range per pick (ms)
const THINK_MS: std::ops::Range<f64> = 250.0..900.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.accuracy) {
        bail!("--accuracy must be within [0, 1], got {}", cli.accuracy);
    }

    let config = match &cli.config {
        Some(path) => TrialConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TrialConfig::default(),
    };

    log::info!("Dot Tracker (headless) starting...");
    let summary = run_session(&cli, config)?;
    let path = write_summary(&cli.output_dir, &summary)
        .with_context(|| format!("writing summary to {}", cli.output_dir.display()))?;

    println!("{}", summary.to_text().trim_end());
    println!("Summary written to {}", path.display());
    Ok(())
}

fn run_session(cli: &Cli, config: TrialConfig) -> anyhow::Result<SessionSummary> {
    let tick_ms = config.tick_interval_ms;
    let clock = ManualClock::new();
    let mut machine = TrialMachine::new(config, Protocol::reference(), cli.seed, clock.clone())?;
    let mut participant = Pcg32::seed_from_u64(cli.seed.wrapping_add(1));
    log::info!(
        "Protocol: {} sub-trials, up to {} targets among {} dots (seed {})",
        machine.protocol().len(),
        machine.protocol().max_required(),
        machine.config().dot_count,
        machine.seed()
    );

    let mut events = machine.start_session(&cli.participant)?;
    loop {
        if let Some(summary) = events.iter().find_map(|e| match e {
            TrialEvent::SessionComplete(s) => Some(s.clone()),
            _ => None,
        }) {
            return Ok(summary);
        }

        events = match machine.phase() {
            TrialPhase::Idle => {
                if let Some(sub) = machine.current_sub_trial() {
                    log::debug!(
                        "Next sub-trial {} with {} targets",
                        sub.index,
                        sub.required_tracked
                    );
                }
                machine.advance()?
            }
            TrialPhase::Blinking | TrialPhase::Moving => {
                if cli.realtime {
                    std::thread::sleep(Duration::from_millis(u64::from(tick_ms)));
                }
                clock.advance(f64::from(tick_ms));
                machine.on_tick()
            }
            TrialPhase::AwaitingClicks => {
                clock.advance(participant.random_range(THINK_MS));
                let point = scripted_pick(&machine, &mut participant, cli.accuracy)
                    .context("no dot left to pick")?;
                let mut out = machine.on_press(point);
                out.extend(machine.on_release(point));
                out
            }
            phase => bail!("session stalled in {:?}", phase),
        };
    }
}

/// Center of an unpicked dot: a target with probability `accuracy`, a
/// distractor otherwise (or a target when no distractor is left)
fn scripted_pick<C, R>(machine: &TrialMachine<C>, rng: &mut R, accuracy: f64) -> Option<Vec2>
where
    C: dot_tracker::Clock,
    R: Rng + ?Sized,
{
    let run = machine.run();
    let (targets, distractors): (Vec<_>, Vec<_>) = machine
        .dots()
        .iter()
        .filter(|d| !run.is_clicked(d.id))
        .partition(|d| run.is_tracked(d.id));

    let pool = if rng.random_bool(accuracy) || distractors.is_empty() {
        &targets
    } else {
        &distractors
    };
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.random_range(0..pool.len())].center)
}
