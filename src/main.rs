//! Target Rush headless runner
//!
//! Plays a session with a simple autoplay bot and prints the result. Handy for
//! balance work: tweak a tuning JSON, run a few seeds, compare scores.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use glam::Vec2;
use log::LevelFilter;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use target_rush::sim::{ClickOutcome, LifecycleView, SessionPhase, Snapshot};
use target_rush::{Difficulty, Session, Tuning};

/// Bot clicks this often (ms of session time)
const CLICK_INTERVAL_MS: u64 = 200;

/// Headless autoplay for the target-shooting simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run seed
    #[arg(long, default_value_t = 0xC0FFEE)]
    seed: u64,

    /// gabriel-mode, easy, normal or hard
    #[arg(long, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// Session length cap in seconds
    #[arg(long, default_value_t = 120)]
    seconds: u64,

    /// Balance table (JSON, partial tables allowed)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Chance that a bot click lands where it aims
    #[arg(long, default_value_t = 0.9, value_parser = parse_accuracy)]
    accuracy: f64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Probability in [0, 1]; NaN and infinities are rejected
fn parse_accuracy(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("accuracy must be within [0, 1], got {s}"))
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading tuning file {}", path.display()))?;
    Tuning::from_json(&json).with_context(|| format!("loading tuning file {}", path.display()))
}

/// Where the bot wants to click next
fn choose_aim(snap: &Snapshot) -> Option<Vec2> {
    // Helpful power-ups first (the skull never)
    let power_up = snap
        .power_ups
        .iter()
        .find(|p| !p.kind.is_harmful())
        .map(|p| Vec2::new(p.x + p.size / 2.0, p.y + p.size / 2.0));
    if power_up.is_some() {
        return power_up;
    }

    // Otherwise the alive target closest to expiring
    snap.targets
        .iter()
        .filter(|t| t.lifecycle == LifecycleView::Alive)
        .min_by_key(|t| (t.spawn_ms, t.id))
        .map(|t| Vec2::new(t.x + t.size / 2.0, t.y + t.size / 2.0))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let tuning = load_tuning(args.tuning.as_ref())?;
    let (width, height) = (tuning.arena_width, tuning.arena_height);
    let mut session = Session::with_tuning(args.seed, tuning)?;
    let mut bot_rng = Pcg32::seed_from_u64(args.seed ^ 0x5EED_B07);

    session.start(args.difficulty);

    let end_ms = args.seconds.saturating_mul(1_000);
    let mut now = 0;
    let (mut hits, mut misses) = (0u32, 0u32);
    while now < end_ms && session.ledger().phase == SessionPhase::Running {
        now += CLICK_INTERVAL_MS;
        session.advance_to(now);

        if let Some(aim) = choose_aim(&session.snapshot()) {
            let point = if bot_rng.random_bool(args.accuracy) {
                aim
            } else {
                Vec2::new(
                    bot_rng.random_range(0.0..width),
                    bot_rng.random_range(0.0..height),
                )
            };
            match session.on_arena_click(point.x, point.y, now) {
                ClickOutcome::Miss => misses += 1,
                ClickOutcome::Ignored | ClickOutcome::Absorbed => {}
                _ => hits += 1,
            }
        }

        for event in session.drain_events() {
            log::debug!("{event:?}");
        }
    }

    let snap = session.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    }
    println!(
        "difficulty={} score={} lives={} combo={} phase={:?} time={}ms hits={} misses={}",
        args.difficulty,
        snap.ledger.score,
        snap.ledger.lives,
        snap.ledger.combo,
        snap.ledger.phase,
        snap.time_ms,
        hits,
        misses
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_must_be_a_probability() {
        assert_eq!(parse_accuracy("0.75"), Ok(0.75));
        assert_eq!(parse_accuracy("1"), Ok(1.0));
        for bad in ["NaN", "inf", "-0.1", "1.5", "often"] {
            assert!(parse_accuracy(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_args_reject_nan_accuracy() {
        assert!(Args::try_parse_from(["target-rush", "--accuracy", "NaN"]).is_err());
        let args = Args::try_parse_from(["target-rush", "--accuracy", "0.5"]).unwrap();
        assert_eq!(args.accuracy, 0.5);
    }
}
