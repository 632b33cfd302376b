//! Neon Arena - combat simulation for a wave-based arena survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (enemies, waves, combat, player, projectiles)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the balance numbers were tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Visible area in world units (the camera always shows this much of the arena)
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;

    /// Projectiles are culled this far outside the arena
    pub const PROJECTILE_CULL_MARGIN: f32 = 50.0;

    /// Palette (packed 0xRRGGBB), forwarded to the renderer with events
    pub const NEON_CYAN: u32 = 0x00FFFF;
    pub const NEON_MAGENTA: u32 = 0xFF00C8;
    pub const NEON_PINK: u32 = 0xFF3278;
    pub const NEON_YELLOW: u32 = 0xFFFF32;
    pub const NEON_GREEN: u32 = 0x32FF64;
    pub const NEON_ORANGE: u32 = 0xFF961E;
    pub const NEON_PURPLE: u32 = 0xB432FF;
    pub const NEON_RED: u32 = 0xFF2828;
    pub const NEON_BLUE: u32 = 0x3264FF;
    pub const WHITE: u32 = 0xFFFFFF;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed angular difference `to - from`, in [-π, π)
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Turn `current` toward `target` by at most `max_delta` radians (never snaps)
pub fn rotate_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = angle_delta(current, target);
    normalize_angle(current + delta.clamp(-max_delta, max_delta))
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector from `from` toward `to`, plus the distance between them.
///
/// Coincident points yield a zero direction instead of NaN.
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let dist = delta.length();
    if dist > 0.0 {
        (delta / dist, dist)
    } else {
        (Vec2::ZERO, 0.0)
    }
}

/// Clamp a circle of `radius` so it stays fully inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, radius: f32, arena: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, (arena.x - radius).max(radius)),
        pos.y.clamp(radius, (arena.y - radius).max(radius)),
    )
}
