//! Read-only views for the presentation layer
//!
//! Captured after every tick and every click; serializable so a UI running
//! elsewhere can consume them as JSON.

use serde::Serialize;

use super::ledger::Ledger;
use super::state::{EffectClass, GameState, Lifecycle, PowerUp, PowerUpKind, Target, TargetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleView {
    Alive,
    Popping,
    Removed,
}

impl From<Lifecycle> for LifecycleView {
    fn from(lifecycle: Lifecycle) -> Self {
        match lifecycle {
            Lifecycle::Alive => LifecycleView::Alive,
            Lifecycle::Popping { .. } => LifecycleView::Popping,
            Lifecycle::Removed => LifecycleView::Removed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetView {
    pub id: u64,
    pub kind: TargetKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub rotation: f32,
    pub health: Option<u32>,
    pub immune: bool,
    pub lifecycle: LifecycleView,
    pub spawn_ms: u64,
}

impl From<&Target> for TargetView {
    fn from(t: &Target) -> Self {
        Self {
            id: t.id,
            kind: t.kind,
            x: t.pos.x,
            y: t.pos.y,
            size: t.size,
            rotation: t.rotation,
            health: t.health,
            immune: t.resists(EffectClass::AreaEffect),
            lifecycle: t.lifecycle.into(),
            spawn_ms: t.spawn_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpView {
    pub id: u64,
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub spawn_ms: u64,
}

impl From<&PowerUp> for PowerUpView {
    fn from(p: &PowerUp) -> Self {
        Self {
            id: p.id,
            kind: p.kind,
            x: p.pos.x,
            y: p.pos.y,
            size: p.size,
            spawn_ms: p.spawn_ms,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time_ms: u64,
    pub ledger: Ledger,
    pub frozen: bool,
    pub targets: Vec<TargetView>,
    pub power_ups: Vec<PowerUpView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            time_ms: state.time_ms,
            ledger: state.ledger.clone(),
            frozen: state.frozen_until.is_some(),
            targets: state.targets.iter().map(TargetView::from).collect(),
            power_ups: state.power_ups.iter().map(PowerUpView::from).collect(),
        }
    }
}
