//! Target Rush - arcade target-shooting simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, hits, power-ups, ledger)
//! - `session`: Host object pacing the simulation and taking pointer input
//! - `tuning`: Data-driven game balance

pub mod session;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use tuning::{Difficulty, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (50 Hz)
    pub const SIM_TICK_MS: u64 = 20;
    /// Maximum ticks run by a single `Session::advance_to` call
    pub const MAX_SUBSTEPS: u32 = 64;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 600.0;
    pub const ARENA_HEIGHT: f32 = 400.0;

    /// Target defaults
    pub const TARGET_SIZE: f32 = 30.0;
    pub const TARGET_SPEED: f32 = 2.0;
    /// Degrees per tick
    pub const TARGET_ROTATION_SPEED: f32 = 2.0;

    /// Delay between "hit/expired" and removal, for the pop animation
    pub const POPPING_GRACE_MS: u64 = 300;
}

/// Center of an entity whose bounding square starts at `pos`
#[inline]
pub fn center_of(pos: Vec2, size: f32) -> Vec2 {
    pos + Vec2::splat(size / 2.0)
}

/// Clamp a coordinate into `[0, max]` and bounce the velocity component if it
/// left the range. Returns the corrected `(coord, vel)`.
#[inline]
pub fn reflect_axis(coord: f32, vel: f32, max: f32) -> (f32, f32) {
    let max = max.max(0.0);
    if coord < 0.0 {
        (0.0, -vel)
    } else if coord > max {
        (max, -vel)
    } else {
        (coord, vel)
    }
}

/// Wrap an angle in degrees into `[0, 360)`
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
