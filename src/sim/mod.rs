//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod effects;
pub mod hit;
pub mod ledger;
pub mod motion;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use hit::{ClickOutcome, resolve_arena_click, resolve_entity_click};
pub use ledger::{Ledger, SessionPhase};
pub use snapshot::{LifecycleView, PowerUpView, Snapshot, TargetView};
pub use spawner::weighted_choice;
pub use state::{
    EffectClass, GameEvent, GameState, Lifecycle, PopCause, PowerUp, PowerUpKind, Resistances,
    Target, TargetKind,
};
pub use tick::tick;
