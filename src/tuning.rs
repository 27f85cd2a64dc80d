//! Data-driven game balance
//!
//! Every constant the simulation consults lives in [`Tuning`]. Tables can be
//! loaded from (partial) JSON; missing fields keep their defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Starting difficulty, selecting the initial lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    GabrielMode,
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::GabrielMode,
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::GabrielMode => "gabriel-mode",
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gabriel-mode" | "gabriel" | "gabrielmode" => Ok(Difficulty::GabrielMode),
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Initial lives per difficulty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivesTable {
    pub gabriel_mode: u32,
    pub easy: u32,
    pub normal: u32,
    pub hard: u32,
}

impl Default for LivesTable {
    fn default() -> Self {
        Self {
            gabriel_mode: 50,
            easy: 10,
            normal: 3,
            hard: 1,
        }
    }
}

impl LivesTable {
    pub fn lives_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::GabrielMode => self.gabriel_mode,
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Why a tuning table was rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Game balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena / clock ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Fixed step length in ms
    pub tick_ms: u64,

    // === Targets ===
    pub target_size: f32,
    /// Pixels per tick; velocities are drawn from `[-speed/2, speed/2]`
    pub target_speed: f32,
    /// Degrees per tick
    pub rotation_speed: f32,
    pub target_spawn_interval_ms: u64,
    /// Lifetime of a target spawned at score 0
    pub target_lifetime_ms: u64,
    /// Lifetime lost per score point
    pub lifetime_shrink_per_point_ms: u64,
    /// Lifetime never drops below this
    pub min_lifetime_ms: u64,
    pub popping_grace_ms: u64,

    // === Kind mix ===
    pub slime_chance: f32,
    pub mini_chance: f32,
    pub slime_size_multiplier: f32,
    pub mini_size_multiplier: f32,
    pub boss_size_multiplier: f32,
    pub boss_speed_multiplier: f32,

    // === Boss ===
    pub boss_base_health: u32,
    /// One extra health point per this many score points (0 disables scaling)
    pub boss_health_score_step: u64,
    pub boss_bonus_score: u64,
    /// Bosses shrug off lightning and lava-shield
    pub boss_resists_area_effects: bool,
    pub boss_rate_floor: f32,
    pub boss_rate_ceiling: f32,
    pub boss_rate_step: f32,
    pub boss_rate_interval_ms: u64,

    // === Power-ups ===
    pub power_up_size: f32,
    /// Zero keeps power-ups stationary
    pub power_up_speed: f32,
    pub power_up_spawn_interval_ms: u64,
    pub power_up_duration_ms: u64,
    pub freeze_duration_ms: u64,
    pub double_points_bonus: u64,
    pub lava_shield_lives: u32,

    // === Scoring ===
    pub combo_threshold: u32,
    pub hit_points: u64,
    pub combo_hit_points: u64,
    /// Clicking empty arena costs a life
    pub miss_costs_life: bool,

    pub lives: LivesTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            tick_ms: SIM_TICK_MS,

            target_size: TARGET_SIZE,
            target_speed: TARGET_SPEED,
            rotation_speed: TARGET_ROTATION_SPEED,
            target_spawn_interval_ms: 750,
            target_lifetime_ms: 30_000,
            lifetime_shrink_per_point_ms: 50,
            min_lifetime_ms: 15_000,
            popping_grace_ms: POPPING_GRACE_MS,

            slime_chance: 0.1,
            mini_chance: 0.1,
            slime_size_multiplier: 1.2,
            mini_size_multiplier: 0.5,
            boss_size_multiplier: 2.0,
            boss_speed_multiplier: 1.25,

            boss_base_health: 5,
            boss_health_score_step: 50,
            boss_bonus_score: 10,
            boss_resists_area_effects: true,
            boss_rate_floor: 0.03,
            boss_rate_ceiling: 0.2,
            boss_rate_step: 0.01,
            boss_rate_interval_ms: 30_000,

            power_up_size: TARGET_SIZE,
            power_up_speed: TARGET_SPEED,
            power_up_spawn_interval_ms: 2_500,
            power_up_duration_ms: 3_000,
            freeze_duration_ms: 5_000,
            double_points_bonus: 10,
            lava_shield_lives: 2,

            combo_threshold: 5,
            hit_points: 1,
            combo_hit_points: 2,
            miss_costs_life: true,

            lives: LivesTable::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON table and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every range the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "must be positive"));
        }
        for (field, value) in [
            ("target_spawn_interval_ms", self.target_spawn_interval_ms),
            ("power_up_spawn_interval_ms", self.power_up_spawn_interval_ms),
            ("boss_rate_interval_ms", self.boss_rate_interval_ms),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be positive"));
            }
        }
        if !(self.target_size > 0.0) {
            return Err(invalid("target_size", "must be positive"));
        }
        if !(self.power_up_size > 0.0) {
            return Err(invalid("power_up_size", "must be positive"));
        }
        for (field, value) in [
            ("slime_size_multiplier", self.slime_size_multiplier),
            ("mini_size_multiplier", self.mini_size_multiplier),
            ("boss_size_multiplier", self.boss_size_multiplier),
        ] {
            if !(value > 0.0) {
                return Err(invalid(field, "must be positive"));
            }
        }
        let largest = self.largest_entity_size();
        if !(self.arena_width > largest && self.arena_height > largest) {
            return Err(invalid(
                "arena_width",
                format!("arena must be larger than the largest entity ({largest})"),
            ));
        }
        if self.target_speed < 0.0
            || self.power_up_speed < 0.0
            || self.boss_speed_multiplier < 0.0
        {
            return Err(invalid("target_speed", "speeds cannot be negative"));
        }
        for (field, value) in [
            ("slime_chance", self.slime_chance),
            ("mini_chance", self.mini_chance),
            ("boss_rate_floor", self.boss_rate_floor),
            ("boss_rate_ceiling", self.boss_rate_ceiling),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }
        if self.slime_chance + self.mini_chance > 1.0 {
            return Err(invalid("mini_chance", "slime_chance + mini_chance exceeds 1"));
        }
        if self.boss_rate_floor > self.boss_rate_ceiling {
            return Err(invalid("boss_rate_floor", "floor is above ceiling"));
        }
        if self.boss_rate_step < 0.0 {
            return Err(invalid("boss_rate_step", "cannot be negative"));
        }
        if self.boss_base_health == 0 {
            return Err(invalid("boss_base_health", "a boss needs at least one health point"));
        }
        if self.min_lifetime_ms > self.target_lifetime_ms {
            return Err(invalid("min_lifetime_ms", "floor is above the base lifetime"));
        }
        Ok(())
    }

    pub fn initial_lives(&self, difficulty: Difficulty) -> u32 {
        self.lives.lives_for(difficulty)
    }

    /// Target lifetime at the given score, floored at `min_lifetime_ms`
    pub fn lifetime_at(&self, score: u64) -> u64 {
        let shrink = score.saturating_mul(self.lifetime_shrink_per_point_ms);
        self.target_lifetime_ms
            .saturating_sub(shrink)
            .max(self.min_lifetime_ms)
    }

    /// Boss health for a boss spawned at the given score
    pub fn boss_health_at(&self, score: u64) -> u32 {
        let extra = score.checked_div(self.boss_health_score_step).unwrap_or(0);
        let extra = u32::try_from(extra).unwrap_or(u32::MAX);
        self.boss_base_health.saturating_add(extra)
    }

    /// Points for one confirmed hit given the combo *before* the hit
    pub fn points_for_hit(&self, combo: u32) -> u64 {
        if combo > self.combo_threshold {
            self.combo_hit_points
        } else {
            self.hit_points
        }
    }

    fn largest_entity_size(&self) -> f32 {
        let t = self.target_size;
        [
            t,
            t * self.slime_size_multiplier,
            t * self.mini_size_multiplier,
            t * self.boss_size_multiplier,
            self.power_up_size,
        ]
        .into_iter()
        .fold(0.0, f32::max)
    }
}
