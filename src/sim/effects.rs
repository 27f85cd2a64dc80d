//! Power-up effects
//!
//! Area effects reuse the same `Popping`-then-removal path as direct hits, so
//! a target caught by lightning and clicked at the same time is only counted
//! once.

use glam::Vec2;

use super::hit::ClickOutcome;
use super::spawner::random_velocity;
use super::state::{
    Deferred, DeferredAction, EffectClass, GameEvent, GameState, PopCause, PowerUpKind,
};

/// Remove a power-up from the registry and apply its effect
pub fn collect_power_up(state: &mut GameState, id: u64) -> ClickOutcome {
    let Some(index) = state.power_ups.iter().position(|p| p.id == id) else {
        return ClickOutcome::Ignored;
    };
    let kind = state.power_ups.remove(index).kind;
    log::info!("Power-up {:?} collected at {} ms", kind, state.time_ms);
    state.events.push(GameEvent::PowerUpCollected { id, kind });
    apply(state, kind);
    ClickOutcome::PowerUp { id, kind }
}

/// Apply the effect of `kind` to the ledger and registry
pub fn apply(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::ExtraLife => state.gain_lives(1),
        PowerUpKind::TimeFreeze => freeze(state),
        PowerUpKind::DoublePoints => state.ledger.add_score(state.tuning.double_points_bonus),
        PowerUpKind::Skull => state.lose_lives(1),
        PowerUpKind::Lightning => {
            area_pop(state, None);
        }
        PowerUpKind::LavaShield => {
            let vulnerable = state
                .alive_targets()
                .filter(|t| !t.resists(EffectClass::AreaEffect))
                .count();
            area_pop(state, Some(vulnerable.div_ceil(2)));
            let due_ms = state.time_ms.saturating_add(state.tuning.popping_grace_ms);
            state.deferred.push(Deferred {
                due_ms,
                action: DeferredAction::GrantLives(state.tuning.lava_shield_lives),
            });
        }
    }
}

/// Mark up to `limit` alive, non-resistant targets (in id order) as popping.
/// Returns how many were marked.
fn area_pop(state: &mut GameState, limit: Option<usize>) -> usize {
    let deadline_ms = state.time_ms.saturating_add(state.tuning.popping_grace_ms);
    let limit = limit.unwrap_or(usize::MAX);
    let mut marked = Vec::new();

    for target in state.targets.iter_mut() {
        if marked.len() >= limit {
            break;
        }
        if target.is_alive()
            && !target.resists(EffectClass::AreaEffect)
            && target.start_popping(deadline_ms, PopCause::AreaEffect)
        {
            marked.push(target.id);
        }
    }

    for &id in &marked {
        state.events.push(GameEvent::TargetPopping {
            id,
            cause: PopCause::AreaEffect,
        });
    }
    marked.len()
}

fn freeze(state: &mut GameState) {
    state.ledger.break_combo();
    for target in state.targets.iter_mut().filter(|t| t.is_alive()) {
        target.vel = Vec2::ZERO;
    }
    let until_ms = state.time_ms.saturating_add(state.tuning.freeze_duration_ms);
    // A second freeze extends the first
    state.frozen_until = Some(state.frozen_until.map_or(until_ms, |u| u.max(until_ms)));
    state.events.push(GameEvent::Frozen { until_ms });
}

/// Give every alive target a fresh velocity once the freeze runs out
pub fn thaw_if_due(state: &mut GameState) -> bool {
    match state.frozen_until {
        Some(until) if state.time_ms >= until => {}
        _ => return false,
    }
    state.frozen_until = None;
    let tuning = &state.tuning;
    for target in state.targets.iter_mut().filter(|t| t.is_alive()) {
        target.vel = random_velocity(&mut state.rng, target.kind.speed(tuning));
    }
    state.events.push(GameEvent::Thawed);
    true
}

/// Run deferred actions whose time has come. Only runs while the session is
/// running; `start`/`reset` clear the queue.
pub fn run_deferred(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    let now = state.time_ms;
    let (due, pending): (Vec<_>, Vec<_>) = state.deferred.drain(..).partition(|d| d.due_ms <= now);
    state.deferred = pending;
    for deferred in due {
        match deferred.action {
            DeferredAction::GrantLives(count) => state.gain_lives(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hit::{resolve_arena_click, resolve_entity_click, resolve_pops};
    use crate::sim::ledger::SessionPhase;
    use crate::sim::spawner::{spawn_power_up_of_kind, spawn_target_of_kind};
    use crate::sim::state::TargetKind;
    use crate::tuning::{Difficulty, Tuning};

    fn running_state(difficulty: Difficulty) -> GameState {
        let mut state = GameState::new(33, Tuning::default());
        state.start(difficulty);
        state
    }

    fn finish_grace(state: &mut GameState) {
        state.time_ms += state.tuning.popping_grace_ms;
        resolve_pops(state);
        run_deferred(state);
    }

    fn collect(state: &mut GameState, kind: PowerUpKind) -> ClickOutcome {
        let id = spawn_power_up_of_kind(state, kind);
        let outcome = collect_power_up(state, id);
        assert!(state.power_ups.iter().all(|p| p.id != id));
        outcome
    }

    #[test]
    fn test_extra_life_and_double_points() {
        let mut state = running_state(Difficulty::Normal);
        collect(&mut state, PowerUpKind::ExtraLife);
        assert_eq!(state.ledger.lives, 4);
        collect(&mut state, PowerUpKind::DoublePoints);
        assert_eq!(state.ledger.score, 10);
    }

    #[test]
    fn test_skull_on_last_life_ends_game() {
        let mut state = running_state(Difficulty::Hard);
        collect(&mut state, PowerUpKind::Skull);
        assert_eq!(state.ledger.lives, 0);
        assert_eq!(state.ledger.phase, SessionPhase::Over);
    }

    #[test]
    fn test_freeze_and_thaw() {
        let mut state = running_state(Difficulty::Normal);
        for _ in 0..4 {
            spawn_target_of_kind(&mut state, TargetKind::Normal, None);
        }
        state.ledger.combo = 7;
        collect(&mut state, PowerUpKind::TimeFreeze);
        assert_eq!(state.ledger.combo, 0);
        assert!(state.targets.iter().all(|t| t.vel == Vec2::ZERO));

        state.time_ms += state.tuning.freeze_duration_ms - 1;
        assert!(!thaw_if_due(&mut state));
        state.time_ms += 1;
        assert!(thaw_if_due(&mut state));
        assert!(state.targets.iter().any(|t| t.vel != Vec2::ZERO));
        let half = state.tuning.target_speed / 2.0;
        assert!(state.targets.iter().all(|t| t.vel.x.abs() <= half && t.vel.y.abs() <= half));
        assert_eq!(state.frozen_until, None);
    }

    #[test]
    fn test_second_freeze_extends() {
        let mut state = running_state(Difficulty::Normal);
        collect(&mut state, PowerUpKind::TimeFreeze);
        state.time_ms += 1_000;
        collect(&mut state, PowerUpKind::TimeFreeze);
        assert_eq!(state.frozen_until, Some(6_000));
        state.time_ms = 5_000;
        assert!(!thaw_if_due(&mut state));
    }

    #[test]
    fn test_lightning_spares_resistant_boss() {
        let mut state = running_state(Difficulty::Normal);
        let boss = spawn_target_of_kind(&mut state, TargetKind::Boss, None);
        for kind in [TargetKind::Normal, TargetKind::Mini, TargetKind::Slime] {
            spawn_target_of_kind(&mut state, kind, None);
        }
        collect(&mut state, PowerUpKind::Lightning);
        assert!(state.target(boss).unwrap().is_alive());
        assert_eq!(state.targets.iter().filter(|t| t.is_popping()).count(), 3);

        finish_grace(&mut state);
        assert_eq!(state.ledger.score, 3);
        assert_eq!(state.ledger.combo, 0);
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].id, boss);
    }

    #[test]
    fn test_lightning_hits_boss_without_resistance() {
        let mut state = GameState::new(
            2,
            Tuning {
                boss_resists_area_effects: false,
                ..Default::default()
            },
        );
        state.start(Difficulty::Normal);
        spawn_target_of_kind(&mut state, TargetKind::Boss, None);
        collect(&mut state, PowerUpKind::Lightning);
        finish_grace(&mut state);
        assert!(state.targets.is_empty());
        assert_eq!(state.ledger.score, 1);
    }

    #[test]
    fn test_lava_shield_pops_half_rounded_up() {
        let mut state = running_state(Difficulty::Normal);
        let boss = spawn_target_of_kind(&mut state, TargetKind::Boss, None);
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(spawn_target_of_kind(&mut state, TargetKind::Normal, None));
        }
        collect(&mut state, PowerUpKind::LavaShield);
        let popping: Vec<u64> = state
            .targets
            .iter()
            .filter(|t| t.is_popping())
            .map(|t| t.id)
            .collect();
        assert_eq!(popping, ids[..3].to_vec());
        assert!(state.target(boss).unwrap().is_alive());

        finish_grace(&mut state);
        assert_eq!(state.ledger.score, 3);
        assert_eq!(state.ledger.lives, 5);
        assert_eq!(state.targets.len(), 3);
    }

    #[test]
    fn test_lava_shield_with_no_targets_still_grants_lives() {
        let mut state = running_state(Difficulty::Normal);
        collect(&mut state, PowerUpKind::LavaShield);
        assert_eq!(state.ledger.lives, 3);
        finish_grace(&mut state);
        assert_eq!(state.ledger.lives, 5);
        assert_eq!(state.ledger.score, 0);
    }

    #[test]
    fn test_area_pop_and_direct_click_count_once() {
        let mut state = running_state(Difficulty::Normal);
        let id = spawn_target_of_kind(&mut state, TargetKind::Normal, Some(Vec2::new(50.0, 50.0)));
        collect(&mut state, PowerUpKind::Lightning);
        let point = state.target(id).unwrap().center();
        assert_eq!(resolve_entity_click(&mut state, id, point), ClickOutcome::Absorbed);
        assert_eq!(resolve_arena_click(&mut state, point), ClickOutcome::Absorbed);
        finish_grace(&mut state);
        assert_eq!(state.ledger.score, 1);
        assert_eq!(state.ledger.combo, 0);
    }

    #[test]
    fn test_deferred_lives_dropped_after_game_over() {
        let mut state = running_state(Difficulty::Hard);
        collect(&mut state, PowerUpKind::LavaShield);
        collect(&mut state, PowerUpKind::Skull);
        assert_eq!(state.ledger.phase, SessionPhase::Over);
        finish_grace(&mut state);
        assert_eq!(state.ledger.lives, 0);
    }

    #[test]
    fn test_power_up_click_through_entity_path() {
        let mut state = running_state(Difficulty::Normal);
        let id = spawn_power_up_of_kind(&mut state, PowerUpKind::ExtraLife);
        let point = state.power_ups[0].center();
        assert_eq!(
            resolve_entity_click(&mut state, id, point),
            ClickOutcome::PowerUp {
                id,
                kind: PowerUpKind::ExtraLife
            }
        );
        assert_eq!(state.ledger.lives, 4);
        assert_eq!(resolve_entity_click(&mut state, id, point), ClickOutcome::Ignored);
        assert_eq!(state.ledger.lives, 4);
    }

    #[test]
    fn test_restart_drops_pending_shield_lives_and_freeze() {
        for reset_first in [false, true] {
            let mut state = running_state(Difficulty::Normal);
            spawn_target_of_kind(&mut state, TargetKind::Normal, None);
            collect(&mut state, PowerUpKind::LavaShield);
            collect(&mut state, PowerUpKind::TimeFreeze);
            assert!(!state.deferred.is_empty());

            if reset_first {
                state.reset();
                assert!(state.deferred.is_empty());
                assert_eq!(state.frozen_until, None);
            }
            state.start(Difficulty::Normal);
            assert!(state.deferred.is_empty());
            assert_eq!(state.frozen_until, None);

            state.time_ms = 10_000;
            run_deferred(&mut state);
            assert!(!thaw_if_due(&mut state));
            assert_eq!(state.ledger.lives, 3);
            assert!(!state.events.iter().any(|e| matches!(e, GameEvent::Thawed)));
        }
    }

    #[test]
    fn test_huge_freeze_does_not_overflow() {
        let mut state = GameState::new(
            6,
            Tuning {
                freeze_duration_ms: u64::MAX,
                ..Default::default()
            },
        );
        state.start(Difficulty::Normal);
        state.time_ms = 500;
        collect(&mut state, PowerUpKind::TimeFreeze);
        assert_eq!(state.frozen_until, Some(u64::MAX));
        assert!(!thaw_if_due(&mut state));
    }
}
