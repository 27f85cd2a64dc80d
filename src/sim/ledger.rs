//! Score, lives, combo and difficulty bookkeeping
//!
//! The ledger never goes negative and never exceeds its configured ceilings.
//! Phase changes are driven from `GameState`, which also emits the events.

use serde::Serialize;

use crate::tuning::{Difficulty, Tuning};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    Running,
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    pub score: u64,
    pub lives: u32,
    pub combo: u32,
    pub difficulty: Difficulty,
    /// Chance that a target spawn becomes a boss
    pub boss_spawn_rate: f32,
    pub phase: SessionPhase,
}

impl Ledger {
    pub fn new(tuning: &Tuning, difficulty: Difficulty) -> Self {
        Self {
            score: 0,
            lives: tuning.initial_lives(difficulty),
            combo: 0,
            difficulty,
            boss_spawn_rate: tuning.boss_rate_floor,
            phase: SessionPhase::NotStarted,
        }
    }

    /// Initial values for the current difficulty, phase `NotStarted`
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning, self.difficulty);
    }

    pub fn start(&mut self, tuning: &Tuning, difficulty: Difficulty) {
        *self = Self::new(tuning, difficulty);
        self.phase = SessionPhase::Running;
    }

    /// `Running -> Over`. Returns true if this call made the transition.
    pub fn end(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.phase = SessionPhase::Over;
        true
    }

    /// Score one confirmed hit and extend the combo. Returns the points granted.
    pub fn award_hit(&mut self, tuning: &Tuning) -> u64 {
        let points = tuning.points_for_hit(self.combo);
        self.score = self.score.saturating_add(points);
        self.combo = self.combo.saturating_add(1);
        points
    }

    /// Boss defeat: fixed bonus and one combo step
    pub fn award_defeat(&mut self, bonus: u64) {
        self.score = self.score.saturating_add(bonus);
        self.combo = self.combo.saturating_add(1);
    }

    /// Flat points that do not touch the combo
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
    }

    pub fn lose_lives(&mut self, count: u32) {
        self.lives = self.lives.saturating_sub(count);
    }

    pub fn gain_lives(&mut self, count: u32) {
        self.lives = self.lives.saturating_add(count);
    }

    /// Raise the boss spawn rate one step toward its ceiling. Only while
    /// running; returns the new rate if it changed.
    pub fn escalate_boss_rate(&mut self, tuning: &Tuning) -> Option<f32> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        let next = (self.boss_spawn_rate + tuning.boss_rate_step).min(tuning.boss_rate_ceiling);
        if next > self.boss_spawn_rate {
            self.boss_spawn_rate = next;
            Some(next)
        } else {
            None
        }
    }
}
