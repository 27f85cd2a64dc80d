//! Game session host
//!
//! Owns the `GameState`, paces the fixed-step simulation against the host
//! clock and exposes the entry points the UI calls. Timestamps are
//! milliseconds since the session was started.

use glam::Vec2;

use crate::consts::MAX_SUBSTEPS;
use crate::sim::{
    ClickOutcome, GameEvent, GameState, Ledger, Snapshot, resolve_arena_click,
    resolve_entity_click, tick,
};
use crate::tuning::{Difficulty, Tuning, TuningError};

/// One game session: state plus pointer bookkeeping
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    /// Last pointer position, for crosshair effects only
    cursor: Vec2,
}

impl Session {
    /// Session with default tuning
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::new(seed, Tuning::default()),
            cursor: Vec2::ZERO,
        }
    }

    /// Session with a custom balance table, validated first
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self {
            state: GameState::new(seed, tuning),
            cursor: Vec2::ZERO,
        })
    }

    pub fn start(&mut self, difficulty: Difficulty) {
        self.state.start(difficulty);
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Run fixed ticks until the sim clock catches up with `now_ms`, at most
    /// `MAX_SUBSTEPS` per call. Returns the number of ticks run.
    pub fn advance_to(&mut self, now_ms: u64) -> u32 {
        let step = self.state.tuning.tick_ms;
        let mut substeps = 0;
        while self.state.is_running()
            && self.state.time_ms.saturating_add(step) <= now_ms
            && substeps < MAX_SUBSTEPS
        {
            tick(&mut self.state);
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.state.time_ms.saturating_add(step) <= now_ms {
            log::warn!(
                "Simulation behind by {} ms; catching up next frame",
                now_ms - self.state.time_ms
            );
        }
        substeps
    }

    /// Relative form of [`Session::advance_to`]
    pub fn advance(&mut self, elapsed_ms: u64) -> u32 {
        let target = self.state.time_ms.saturating_add(elapsed_ms);
        self.advance_to(target)
    }

    /// Informational; no simulation effect
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.cursor = Vec2::new(x, y);
    }

    /// Click on the arena at `(x, y)` at time `t`
    pub fn on_arena_click(&mut self, x: f32, y: f32, t: u64) -> ClickOutcome {
        self.advance_to(t);
        resolve_arena_click(&mut self.state, Vec2::new(x, y))
    }

    /// Click the UI already attributed to entity `id`
    pub fn on_entity_click(&mut self, id: u64, x: f32, y: f32, t: u64) -> ClickOutcome {
        self.advance_to(t);
        resolve_entity_click(&mut self.state, id, Vec2::new(x, y))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn time_ms(&self) -> u64 {
        self.state.time_ms
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for hosts that script scenarios (tests, tools)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::spawn_target_of_kind;
    use crate::sim::{SessionPhase, TargetKind};

    /// Tuning with spawning effectively off, so scenarios are hand-built
    fn quiet_tuning() -> Tuning {
        Tuning {
            target_spawn_interval_ms: 10_000_000,
            power_up_spawn_interval_ms: 10_000_000,
            ..Default::default()
        }
    }

    fn place(session: &mut Session, kind: TargetKind, pos: Vec2) -> (u64, Vec2) {
        let state = session.state_mut();
        let id = spawn_target_of_kind(state, kind, Some(pos));
        let index = state.target_index(id).unwrap();
        state.targets[index].vel = Vec2::ZERO;
        (id, state.targets[index].center())
    }

    #[test]
    fn test_start_normal_scenario() {
        let mut session = Session::with_tuning(7, quiet_tuning()).unwrap();
        session.start(Difficulty::Normal);
        assert_eq!(session.ledger().lives, 3);
        assert_eq!(session.ledger().score, 0);
        assert!(session.snapshot().targets.is_empty());

        assert_eq!(session.on_arena_click(300.0, 200.0, 0), ClickOutcome::Miss);
        assert_eq!(session.ledger().lives, 2);
        assert_eq!(session.ledger().combo, 0);

        let mut t = 0;
        for i in 0..5 {
            let (_, c) = place(&mut session, TargetKind::Normal, Vec2::new(40.0 * i as f32, 50.0));
            t += 20;
            assert!(matches!(session.on_arena_click(c.x, c.y, t), ClickOutcome::Popped { .. }));
            t += 400;
            session.advance_to(t);
        }
        assert_eq!(session.ledger().score, 5);
        assert_eq!(session.ledger().combo, 5);

        // combo 5 is not above the threshold: still one point
        let (_, c) = place(&mut session, TargetKind::Normal, Vec2::new(300.0, 300.0));
        session.on_arena_click(c.x, c.y, t);
        session.advance_to(t + 400);
        assert_eq!(session.ledger().score, 6);
        assert_eq!(session.ledger().combo, 6);

        let (_, c) = place(&mut session, TargetKind::Normal, Vec2::new(400.0, 300.0));
        session.on_arena_click(c.x, c.y, t + 400);
        session.advance_to(t + 800);
        assert_eq!(session.ledger().score, 8);
        assert_eq!(session.ledger().combo, 7);
    }

    #[test]
    fn test_boss_scenario() {
        let mut session = Session::with_tuning(7, quiet_tuning()).unwrap();
        session.start(Difficulty::Normal);
        let (id, c) = place(&mut session, TargetKind::Boss, Vec2::new(200.0, 100.0));

        let mut t = 0;
        for _ in 0..4 {
            t += 100;
            session.on_entity_click(id, c.x, c.y, t);
        }
        session.advance_to(t + 1_000);
        let view = session
            .snapshot()
            .targets
            .into_iter()
            .find(|v| v.id == id)
            .unwrap();
        assert_eq!(view.health, Some(1));
        assert_eq!(view.lifecycle, crate::sim::LifecycleView::Alive);
        assert_eq!(session.ledger().score, 0);

        t += 1_000;
        session.on_entity_click(id, c.x, c.y, t);
        session.advance_to(t + 300);
        assert_eq!(session.ledger().score, 10);
        assert!(session.snapshot().targets.iter().all(|v| v.id != id));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::new(5);
        session.start(Difficulty::Easy);
        session.advance(5_000);
        session.reset();
        let once = session.snapshot();
        session.reset();
        let twice = session.snapshot();
        assert_eq!(once, twice);
        assert_eq!(once.ledger.phase, SessionPhase::NotStarted);
        assert_eq!(once.ledger.lives, 10);
        assert!(once.targets.is_empty() && once.power_ups.is_empty());
    }

    #[test]
    fn test_clicks_ignored_unless_running() {
        let mut session = Session::new(5);
        assert_eq!(session.on_arena_click(10.0, 10.0, 0), ClickOutcome::Ignored);
        assert_eq!(session.ledger().lives, 3);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_advance_is_capped_per_call() {
        let mut session = Session::new(5);
        session.start(Difficulty::GabrielMode);
        let ran = session.advance_to(10_000);
        assert_eq!(ran, MAX_SUBSTEPS);
        assert_eq!(session.time_ms(), u64::from(MAX_SUBSTEPS) * 20);
        // Carries on where it left off
        session.advance_to(10_000);
        assert_eq!(session.time_ms(), u64::from(MAX_SUBSTEPS) * 40);
    }

    #[test]
    fn test_pointer_move_has_no_effect() {
        let mut session = Session::new(5);
        session.start(Difficulty::Normal);
        let before = session.snapshot();
        session.on_pointer_move(123.0, 45.0);
        assert_eq!(session.cursor(), Vec2::new(123.0, 45.0));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_events_drain() {
        let mut session = Session::with_tuning(7, quiet_tuning()).unwrap();
        session.start(Difficulty::Normal);
        session.on_arena_click(1.0, 1.0, 0);
        let events = session.drain_events();
        assert!(matches!(events[0], GameEvent::Started { .. }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Miss { .. })));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            tick_ms: 0,
            ..Default::default()
        };
        assert!(Session::with_tuning(1, tuning).is_err());
    }
}
