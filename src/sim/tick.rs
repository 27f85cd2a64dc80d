//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Within one
//! tick: motion first, then expiry marking, then resolution of pops whose
//! grace ran out, then deferred work, then the spawn and escalation timers.

use super::effects;
use super::hit;
use super::motion;
use super::spawner;
use super::state::{GameEvent, GameState};

/// Advance the game state by one fixed timestep. No-op unless running.
pub fn tick(state: &mut GameState) {
    if !state.is_running() {
        return;
    }

    let dt = state.tuning.tick_ms;
    state.time_ms += dt;

    motion::integrate(state);
    motion::expire_power_ups(state);
    motion::expire_targets(state);

    hit::resolve_pops(state);
    if !state.is_running() {
        return;
    }

    effects::run_deferred(state);
    effects::thaw_if_due(state);

    // Spawn timers: at most one entity of each class per tick
    state.target_spawn_timer_ms += dt;
    if state.target_spawn_timer_ms >= state.tuning.target_spawn_interval_ms {
        state.target_spawn_timer_ms -= state.tuning.target_spawn_interval_ms;
        spawner::spawn_target(state);
    }

    state.power_up_spawn_timer_ms += dt;
    if state.power_up_spawn_timer_ms >= state.tuning.power_up_spawn_interval_ms {
        state.power_up_spawn_timer_ms -= state.tuning.power_up_spawn_interval_ms;
        spawner::spawn_power_up(state);
    }

    // Progressive difficulty
    state.escalation_timer_ms += dt;
    if state.escalation_timer_ms >= state.tuning.boss_rate_interval_ms {
        state.escalation_timer_ms -= state.tuning.boss_rate_interval_ms;
        if let Some(rate) = state.ledger.escalate_boss_rate(&state.tuning) {
            log::info!("Boss spawn rate raised to {:.0}%", rate * 100.0);
            state.events.push(GameEvent::BossRateEscalated { rate });
        }
    }

    // Ensure deterministic ordering
    state.normalize_order();
}
