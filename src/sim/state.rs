//! Game state and core simulation types
//!
//! One `GameState` is the whole session context: ledger, entity registry,
//! RNG, timers and the outgoing event queue.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ledger::{Ledger, SessionPhase};
use crate::center_of;
use crate::tuning::{Difficulty, Tuning};

/// Target variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    Normal,
    /// Splits into two minis when hit
    Slime,
    Mini,
    /// Multi-hit, scored on defeat
    Boss,
}

impl TargetKind {
    pub fn size(&self, tuning: &Tuning) -> f32 {
        let mult = match self {
            TargetKind::Normal => 1.0,
            TargetKind::Slime => tuning.slime_size_multiplier,
            TargetKind::Mini => tuning.mini_size_multiplier,
            TargetKind::Boss => tuning.boss_size_multiplier,
        };
        tuning.target_size * mult
    }

    pub fn speed(&self, tuning: &Tuning) -> f32 {
        match self {
            TargetKind::Boss => tuning.target_speed * tuning.boss_speed_multiplier,
            _ => tuning.target_speed,
        }
    }
}

/// Classes of effect an entity may be resistant to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectClass {
    /// Lightning, lava-shield
    AreaEffect,
}

impl EffectClass {
    fn bit(self) -> u8 {
        match self {
            EffectClass::AreaEffect => 1 << 0,
        }
    }
}

/// Set of effect classes an entity shrugs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resistances(u8);

impl Resistances {
    pub const NONE: Resistances = Resistances(0);

    pub fn with(self, class: EffectClass) -> Self {
        Resistances(self.0 | class.bit())
    }

    pub fn resists(&self, class: EffectClass) -> bool {
        self.0 & class.bit() != 0
    }
}

/// What put a target into `Popping`, deciding what its removal grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopCause {
    /// Clicked; scores a hit and extends the combo
    Hit,
    /// Last boss health point removed; scores the boss bonus
    BossDefeat,
    /// Lifetime ran out; costs a life
    Expired,
    /// Lightning or lava-shield; one point, combo untouched
    AreaEffect,
}

/// Target lifecycle. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    Popping { deadline_ms: u64, cause: PopCause },
    Removed,
}

/// A clickable target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    /// Top-left corner of the bounding square
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    /// Degrees in [0, 360)
    pub rotation: f32,
    pub spawn_ms: u64,
    pub kind: TargetKind,
    pub size: f32,
    /// Bosses only
    pub health: Option<u32>,
    pub resistances: Resistances,
    pub lifecycle: Lifecycle,
}

impl Target {
    pub fn center(&self) -> Vec2 {
        center_of(self.pos, self.size)
    }

    /// Circular hit test, regardless of the drawn shape
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center()) <= self.size / 2.0
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    pub fn is_popping(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Popping { .. })
    }

    pub fn resists(&self, class: EffectClass) -> bool {
        self.resistances.resists(class)
    }

    /// Move `Alive -> Popping`. Returns false if the target was not alive.
    pub fn start_popping(&mut self, deadline_ms: u64, cause: PopCause) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.lifecycle = Lifecycle::Popping { deadline_ms, cause };
        true
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerUpKind {
    ExtraLife,
    TimeFreeze,
    DoublePoints,
    Skull,
    Lightning,
    LavaShield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::ExtraLife,
        PowerUpKind::TimeFreeze,
        PowerUpKind::DoublePoints,
        PowerUpKind::Skull,
        PowerUpKind::Lightning,
        PowerUpKind::LavaShield,
    ];

    /// Whether collecting this one ever hurts the player
    pub fn is_harmful(&self) -> bool {
        matches!(self, PowerUpKind::Skull)
    }
}

/// A transient power-up entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u64,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub spawn_ms: u64,
}

impl PowerUp {
    pub fn center(&self) -> Vec2 {
        center_of(self.pos, self.size)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center()) <= self.size / 2.0
    }
}

/// Work scheduled for a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    GrantLives(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub due_ms: u64,
    pub action: DeferredAction,
}

/// Notifications for the presentation layer (sound, particles, laser).
/// Never read back by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Started { difficulty: Difficulty, lives: u32 },
    Reset,
    TargetSpawned { id: u64, kind: TargetKind },
    PowerUpSpawned { id: u64, kind: PowerUpKind },
    /// Every accepted click fires the laser
    Shot { x: f32, y: f32 },
    Miss { x: f32, y: f32 },
    TargetPopping { id: u64, cause: PopCause },
    TargetRemoved { id: u64, cause: PopCause },
    SlimeSplit { parent: u64, children: [u64; 2] },
    BossDamaged { id: u64, health: u32 },
    PowerUpCollected { id: u64, kind: PowerUpKind },
    PowerUpExpired { id: u64 },
    LivesLost { count: u32, lives: u32 },
    LivesGained { count: u32, lives: u32 },
    Frozen { until_ms: u64 },
    Thawed,
    BossRateEscalated { rate: f32 },
    GameOver { score: u64 },
}

/// Complete session state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    pub ledger: Ledger,
    /// Session clock, 0 at start
    pub time_ms: u64,
    /// Live targets (sorted by id for determinism)
    pub targets: Vec<Target>,
    /// Live power-ups (sorted by id for determinism)
    pub power_ups: Vec<PowerUp>,
    pub deferred: Vec<Deferred>,
    /// Targets stay frozen until the clock reaches this
    pub frozen_until: Option<u64>,
    pub target_spawn_timer_ms: u64,
    pub power_up_spawn_timer_ms: u64,
    pub escalation_timer_ms: u64,
    /// Outgoing notifications, drained by the host
    pub events: Vec<GameEvent>,
    /// Never reset, so ids stay unique across restarts
    next_id: u64,
}

impl GameState {
    /// Create a new, not yet started, state with the given seed.
    /// `tuning` is assumed to be validated.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let ledger = Ledger::new(&tuning, Difficulty::default());
        Self {
            seed,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            ledger,
            time_ms: 0,
            targets: Vec::new(),
            power_ups: Vec::new(),
            deferred: Vec::new(),
            frozen_until: None,
            target_spawn_timer_ms: 0,
            power_up_spawn_timer_ms: 0,
            escalation_timer_ms: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.ledger.phase == SessionPhase::Running
    }

    /// Begin a fresh run at the given difficulty
    pub fn start(&mut self, difficulty: Difficulty) {
        self.purge();
        self.ledger.start(&self.tuning, difficulty);
        log::info!(
            "Session started: difficulty={} lives={}",
            difficulty,
            self.ledger.lives
        );
        self.events.push(GameEvent::Started {
            difficulty,
            lives: self.ledger.lives,
        });
        if self.ledger.lives == 0 {
            self.game_over();
        }
    }

    /// Back to `NotStarted` with initial values; timers stay idle
    pub fn reset(&mut self) {
        self.purge();
        self.ledger.reset(&self.tuning);
        log::info!("Session reset");
        self.events.push(GameEvent::Reset);
    }

    /// Drop every entity, timer and pending action
    fn purge(&mut self) {
        self.time_ms = 0;
        self.targets.clear();
        self.power_ups.clear();
        self.deferred.clear();
        self.frozen_until = None;
        self.target_spawn_timer_ms = 0;
        self.power_up_spawn_timer_ms = 0;
        self.escalation_timer_ms = 0;
        self.events.clear();
    }

    /// Remove lives (clamped at zero); ends the run when none remain
    pub fn lose_lives(&mut self, count: u32) {
        if count == 0 || !self.is_running() {
            return;
        }
        self.ledger.lose_lives(count);
        self.events.push(GameEvent::LivesLost {
            count,
            lives: self.ledger.lives,
        });
        if self.ledger.lives == 0 {
            self.game_over();
        }
    }

    pub fn gain_lives(&mut self, count: u32) {
        if count == 0 || !self.is_running() {
            return;
        }
        self.ledger.gain_lives(count);
        self.events.push(GameEvent::LivesGained {
            count,
            lives: self.ledger.lives,
        });
    }

    fn game_over(&mut self) {
        if self.ledger.end() {
            log::info!(
                "Game over: score={} after {} ms",
                self.ledger.score,
                self.time_ms
            );
            self.events.push(GameEvent::GameOver {
                score: self.ledger.score,
            });
        }
    }

    pub fn target(&self, id: u64) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_index(&self, id: u64) -> Option<usize> {
        self.targets.iter().position(|t| t.id == id)
    }

    pub fn alive_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_alive())
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.targets.sort_by_key(|t| t.id);
        self.power_ups.sort_by_key(|p| p.id);
    }
}
