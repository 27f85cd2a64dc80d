//! Per-tick motion integration and expiry detection

use super::state::{GameEvent, GameState, PopCause};
use crate::{reflect_axis, wrap_degrees};

/// Advance every alive target and every power-up by one tick, bouncing off
/// the arena walls without energy loss.
pub fn integrate(state: &mut GameState) {
    let width = state.tuning.arena_width;
    let height = state.tuning.arena_height;
    let spin = state.tuning.rotation_speed;

    for target in state.targets.iter_mut().filter(|t| t.is_alive()) {
        let next = target.pos + target.vel;
        let (x, dx) = reflect_axis(next.x, target.vel.x, width - target.size);
        let (y, dy) = reflect_axis(next.y, target.vel.y, height - target.size);
        target.pos.x = x;
        target.pos.y = y;
        target.vel.x = dx;
        target.vel.y = dy;
        target.rotation = wrap_degrees(target.rotation + spin);
    }

    for power_up in &mut state.power_ups {
        let next = power_up.pos + power_up.vel;
        let (x, dx) = reflect_axis(next.x, power_up.vel.x, width - power_up.size);
        let (y, dy) = reflect_axis(next.y, power_up.vel.y, height - power_up.size);
        power_up.pos.x = x;
        power_up.pos.y = y;
        power_up.vel.x = dx;
        power_up.vel.y = dy;
    }
}

/// Mark alive targets past their lifetime as `Popping(Expired)`.
/// Returns how many were marked.
pub fn expire_targets(state: &mut GameState) -> usize {
    let now = state.time_ms;
    let lifetime = state.tuning.lifetime_at(state.ledger.score);
    let deadline_ms = now.saturating_add(state.tuning.popping_grace_ms);

    let mut expired = Vec::new();
    for target in state.targets.iter_mut() {
        if target.is_alive()
            && now.saturating_sub(target.spawn_ms) > lifetime
            && target.start_popping(deadline_ms, PopCause::Expired)
        {
            expired.push(target.id);
        }
    }

    for &id in &expired {
        state.events.push(GameEvent::TargetPopping {
            id,
            cause: PopCause::Expired,
        });
    }
    if !expired.is_empty() {
        log::debug!("{} target(s) expired at {} ms", expired.len(), now);
    }
    expired.len()
}

/// Drop power-ups older than their duration. No penalty, no grace.
pub fn expire_power_ups(state: &mut GameState) -> usize {
    let now = state.time_ms;
    let duration = state.tuning.power_up_duration_ms;
    let before = state.power_ups.len();
    let events = &mut state.events;
    state.power_ups.retain(|p| {
        let keep = now.saturating_sub(p.spawn_ms) <= duration;
        if !keep {
            events.push(GameEvent::PowerUpExpired { id: p.id });
        }
        keep
    });
    before - state.power_ups.len()
}
