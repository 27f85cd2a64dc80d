//! Spawning of targets and power-ups
//!
//! All kind selection goes through [`weighted_choice`] so the policy is a
//! table, not a chain of branches.

use glam::Vec2;
use rand::Rng;

use super::state::{
    EffectClass, GameEvent, GameState, Lifecycle, PowerUp, PowerUpKind, Resistances, Target,
    TargetKind,
};
use crate::tuning::Tuning;

/// Pick an entry from a weight table. `roll` is uniform in `[0, 1)`.
///
/// Entries are tested in order against cumulative weights, so with weights
/// summing to 1 the first entry wins for `roll < w0`, the second for
/// `w0 <= roll < w0 + w1`, and so on. Returns `None` for an empty or
/// zero-weight table.
pub fn weighted_choice<T: Copy>(table: &[(T, f32)], roll: f32) -> Option<T> {
    let total: f32 = table.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let scaled = roll.clamp(0.0, 1.0) * total;
    let mut acc = 0.0;
    for &(item, weight) in table {
        let weight = weight.max(0.0);
        if weight == 0.0 {
            continue;
        }
        acc += weight;
        if scaled < acc {
            return Some(item);
        }
    }
    // Rounding at the top end
    table.iter().rev().find(|(_, w)| *w > 0.0).map(|&(item, _)| item)
}

/// Regular (non-boss) kind weights
pub fn target_kind_weights(tuning: &Tuning) -> [(TargetKind, f32); 3] {
    let normal = (1.0 - tuning.slime_chance - tuning.mini_chance).max(0.0);
    [
        (TargetKind::Slime, tuning.slime_chance),
        (TargetKind::Mini, tuning.mini_chance),
        (TargetKind::Normal, normal),
    ]
}

/// Every power-up is equally likely
pub fn power_up_weights() -> [(PowerUpKind, f32); 6] {
    PowerUpKind::ALL.map(|kind| (kind, 1.0))
}

/// Roll the kind for one spawn event. The boss roll is independent and
/// overrides the regular roll when it succeeds.
pub fn roll_target_kind<R: Rng>(rng: &mut R, tuning: &Tuning, boss_rate: f32) -> TargetKind {
    let regular = weighted_choice(&target_kind_weights(tuning), rng.random::<f32>())
        .unwrap_or(TargetKind::Normal);
    let boss_roll = rng.random::<f32>();
    if boss_roll < boss_rate {
        TargetKind::Boss
    } else {
        regular
    }
}

/// Uniform in `[-speed/2, speed/2)` per axis
pub fn random_velocity<R: Rng>(rng: &mut R, speed: f32) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * speed,
        (rng.random::<f32>() - 0.5) * speed,
    )
}

/// Uniform top-left corner that keeps an entity of `size` inside the arena
pub fn random_position<R: Rng>(rng: &mut R, tuning: &Tuning, size: f32) -> Vec2 {
    Vec2::new(
        rng.random::<f32>() * (tuning.arena_width - size).max(0.0),
        rng.random::<f32>() * (tuning.arena_height - size).max(0.0),
    )
}

/// One target-timer event: roll a kind and spawn it somewhere in the arena
pub fn spawn_target(state: &mut GameState) -> u64 {
    let kind = roll_target_kind(&mut state.rng, &state.tuning, state.ledger.boss_spawn_rate);
    spawn_target_of_kind(state, kind, None)
}

/// Spawn a target of a given kind, at `pos` or at a random position
pub fn spawn_target_of_kind(state: &mut GameState, kind: TargetKind, pos: Option<Vec2>) -> u64 {
    let tuning = &state.tuning;
    let size = kind.size(tuning);
    let pos = match pos {
        Some(p) => p.clamp(
            Vec2::ZERO,
            Vec2::new(
                (tuning.arena_width - size).max(0.0),
                (tuning.arena_height - size).max(0.0),
            ),
        ),
        None => random_position(&mut state.rng, tuning, size),
    };
    let vel = random_velocity(&mut state.rng, kind.speed(tuning));

    let (health, resistances) = if kind == TargetKind::Boss {
        let resistances = if tuning.boss_resists_area_effects {
            Resistances::NONE.with(EffectClass::AreaEffect)
        } else {
            Resistances::NONE
        };
        (Some(tuning.boss_health_at(state.ledger.score)), resistances)
    } else {
        (None, Resistances::NONE)
    };

    let id = state.next_entity_id();
    state.targets.push(Target {
        id,
        pos,
        vel,
        rotation: 0.0,
        spawn_ms: state.time_ms,
        kind,
        size,
        health,
        resistances,
        lifecycle: Lifecycle::Alive,
    });
    if let Some(hp) = health {
        log::info!("Boss {} spawned with {} health", id, hp);
    } else {
        log::debug!("Spawned {:?} target {}", kind, id);
    }
    state.events.push(GameEvent::TargetSpawned { id, kind });
    id
}

/// Two minis at the slime's former corner
pub fn spawn_slime_children(state: &mut GameState, at: Vec2) -> [u64; 2] {
    [
        spawn_target_of_kind(state, TargetKind::Mini, Some(at)),
        spawn_target_of_kind(state, TargetKind::Mini, Some(at)),
    ]
}

/// One power-up-timer event
pub fn spawn_power_up(state: &mut GameState) -> u64 {
    let roll = state.rng.random::<f32>();
    let kind = weighted_choice(&power_up_weights(), roll).unwrap_or(PowerUpKind::ExtraLife);
    spawn_power_up_of_kind(state, kind)
}

pub fn spawn_power_up_of_kind(state: &mut GameState, kind: PowerUpKind) -> u64 {
    let size = state.tuning.power_up_size;
    let pos = random_position(&mut state.rng, &state.tuning, size);
    let vel = random_velocity(&mut state.rng, state.tuning.power_up_speed);
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos,
        vel,
        size,
        spawn_ms: state.time_ms,
    });
    log::debug!("Spawned {:?} power-up {}", kind, id);
    state.events.push(GameEvent::PowerUpSpawned { id, kind });
    id
}
