//! Click hit-testing and kind-specific hit consequences
//!
//! Also resolves `Popping` targets once their grace deadline passes, which
//! is where hit scores, boss bonuses and expiry penalties are applied.

use glam::Vec2;

use super::effects;
use super::spawner::spawn_slime_children;
use super::state::{GameEvent, GameState, Lifecycle, PopCause, PowerUpKind, Target, TargetKind};

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Session not running, or the entity no longer exists
    Ignored,
    /// Landed on a target that is already popping
    Absorbed,
    Miss,
    /// Target hit; it is now popping (or gone, for a slime)
    Popped { id: u64, kind: TargetKind },
    /// Boss hit but still standing
    BossDamaged { id: u64, health: u32 },
    PowerUp { id: u64, kind: PowerUpKind },
}

/// First alive target (in id order) whose circle contains `point`
pub fn hit_test_target(targets: &[Target], point: Vec2) -> Option<usize> {
    targets.iter().position(|t| t.is_alive() && t.contains(point))
}

/// Resolve a click on the arena: targets first, then power-ups, then miss
pub fn resolve_arena_click(state: &mut GameState, point: Vec2) -> ClickOutcome {
    if !state.is_running() {
        return ClickOutcome::Ignored;
    }
    state.events.push(GameEvent::Shot {
        x: point.x,
        y: point.y,
    });

    if let Some(index) = hit_test_target(&state.targets, point) {
        return hit_target(state, index);
    }
    if let Some(id) = state
        .power_ups
        .iter()
        .find(|p| p.contains(point))
        .map(|p| p.id)
    {
        return effects::collect_power_up(state, id);
    }
    if state
        .targets
        .iter()
        .any(|t| t.is_popping() && t.contains(point))
    {
        return ClickOutcome::Absorbed;
    }

    register_miss(state, point);
    ClickOutcome::Miss
}

/// Resolve a click the presentation layer already attributed to an entity
pub fn resolve_entity_click(state: &mut GameState, id: u64, point: Vec2) -> ClickOutcome {
    if !state.is_running() {
        return ClickOutcome::Ignored;
    }

    if let Some(index) = state.target_index(id) {
        state.events.push(GameEvent::Shot {
            x: point.x,
            y: point.y,
        });
        if !state.targets[index].is_alive() {
            return ClickOutcome::Absorbed;
        }
        return hit_target(state, index);
    }
    if state.power_ups.iter().any(|p| p.id == id) {
        state.events.push(GameEvent::Shot {
            x: point.x,
            y: point.y,
        });
        return effects::collect_power_up(state, id);
    }
    ClickOutcome::Ignored
}

fn register_miss(state: &mut GameState, point: Vec2) {
    state.ledger.break_combo();
    state.events.push(GameEvent::Miss {
        x: point.x,
        y: point.y,
    });
    if state.tuning.miss_costs_life {
        state.lose_lives(1);
    }
}

/// Apply a confirmed click to the alive target at `index`
fn hit_target(state: &mut GameState, index: usize) -> ClickOutcome {
    let now = state.time_ms;
    let deadline_ms = now.saturating_add(state.tuning.popping_grace_ms);
    let target = &mut state.targets[index];
    let id = target.id;
    let kind = target.kind;

    match kind {
        TargetKind::Boss => {
            let health = target.health.unwrap_or(1).saturating_sub(1);
            target.health = Some(health);
            if health > 0 {
                state.events.push(GameEvent::BossDamaged { id, health });
                return ClickOutcome::BossDamaged { id, health };
            }
            target.start_popping(deadline_ms, PopCause::BossDefeat);
            log::info!("Boss {} defeated", id);
            state.events.push(GameEvent::BossDamaged { id, health: 0 });
            state.events.push(GameEvent::TargetPopping {
                id,
                cause: PopCause::BossDefeat,
            });
        }
        TargetKind::Slime => {
            // Splits on the spot: scored now, never popping
            let at = target.pos;
            target.lifecycle = Lifecycle::Removed;
            state.targets.retain(|t| t.lifecycle != Lifecycle::Removed);
            state.ledger.award_hit(&state.tuning);
            state.events.push(GameEvent::TargetRemoved {
                id,
                cause: PopCause::Hit,
            });
            let children = spawn_slime_children(state, at);
            state.events.push(GameEvent::SlimeSplit {
                parent: id,
                children,
            });
        }
        TargetKind::Normal | TargetKind::Mini => {
            target.start_popping(deadline_ms, PopCause::Hit);
            state.events.push(GameEvent::TargetPopping {
                id,
                cause: PopCause::Hit,
            });
        }
    }
    ClickOutcome::Popped { id, kind }
}

/// Remove every popping target whose deadline has passed and apply what its
/// cause grants. Expired targets resolved together cost one life each.
/// Returns the number of targets removed.
pub fn resolve_pops(state: &mut GameState) -> usize {
    let now = state.time_ms;
    let mut expired = 0u32;
    let mut removed = Vec::new();

    for target in state.targets.iter_mut() {
        let Lifecycle::Popping { deadline_ms, cause } = target.lifecycle else {
            continue;
        };
        if deadline_ms > now {
            continue;
        }
        target.lifecycle = Lifecycle::Removed;
        match cause {
            PopCause::Hit => {
                state.ledger.award_hit(&state.tuning);
            }
            PopCause::BossDefeat => state.ledger.award_defeat(state.tuning.boss_bonus_score),
            PopCause::AreaEffect => state.ledger.add_score(1),
            PopCause::Expired => expired += 1,
        }
        removed.push((target.id, cause));
    }

    if removed.is_empty() {
        return 0;
    }
    state.targets.retain(|t| t.lifecycle != Lifecycle::Removed);
    for &(id, cause) in &removed {
        state.events.push(GameEvent::TargetRemoved { id, cause });
    }
    state.lose_lives(expired);
    removed.len()
}
