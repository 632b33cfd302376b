//! Shared actor body: position, health, size, and the timers every actor carries

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_to_arena;
use crate::tuning::ArchetypeStats;

/// Physical and vital state shared by every enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Base movement speed (already wave-scaled)
    pub speed: f32,
    /// Contact damage
    pub damage: f32,
    /// Seconds left of the hit flash
    pub flash_timer: f32,
    /// Movement multiplier from debuffs (1.0 = unaffected)
    pub slow_factor: f32,
    pub slow_timer: f32,
}

impl Body {
    /// Build a body from archetype stats and wave multipliers
    pub fn from_stats(pos: Vec2, stats: &ArchetypeStats, mults: &Multipliers) -> Self {
        let max_hp = (stats.hp * mults.hp).floor().max(1.0);
        Self {
            pos,
            radius: stats.radius,
            hp: max_hp,
            max_hp,
            speed: stats.speed * mults.speed,
            damage: (stats.damage * mults.damage).floor(),
            flash_timer: 0.0,
            slow_factor: 1.0,
            slow_timer: 0.0,
        }
    }

    /// Speed after debuffs
    #[inline]
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.slow_factor
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Subtract hp, clamping at zero. Returns true if this hit killed the body.
    pub fn apply_damage(&mut self, amount: f32, flash: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        debug_assert!(amount.is_finite(), "non-finite damage {amount}");
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        self.flash_timer = flash;
        self.hp <= 0.0
    }

    /// Apply (or refresh) a movement slow
    pub fn apply_slow(&mut self, duration: f32, factor: f32) {
        self.slow_timer = self.slow_timer.max(duration);
        self.slow_factor = factor.clamp(0.0, 1.0);
    }

    /// Count down flash and slow timers; never leaves them negative
    pub fn tick_timers(&mut self, dt: f32) {
        self.flash_timer = (self.flash_timer - dt).max(0.0);
        if self.slow_timer > 0.0 {
            self.slow_timer = (self.slow_timer - dt).max(0.0);
            if self.slow_timer <= 0.0 {
                self.slow_factor = 1.0;
            }
        }
    }

    pub fn clamp_to_arena(&mut self, arena: Vec2) {
        self.pos = clamp_to_arena(self.pos, self.radius, arena);
    }

    /// Whether two circles overlap (strict)
    #[inline]
    pub fn overlaps(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance(pos) < self.radius + radius
    }
}

/// Wave scaling applied to base stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            hp: 1.0,
            speed: 1.0,
            damage: 1.0,
        }
    }
}
