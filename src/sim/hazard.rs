//! Lingering area-damage fields (toxic pools, ghost trails)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{NEON_GREEN, NEON_ORANGE};

/// Who a field hurts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    /// Dropped by enemies; hits the player for `damage` on contact
    Hostile,
    /// Dropped by the player (ultimate, ghost dash); deals `damage` per second to enemies inside
    Friendly,
}

/// A circular damage zone with a finite lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaField {
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub lifetime: f32,
    pub faction: Faction,
    pub color: u32,
}

impl AreaField {
    pub fn toxic(pos: Vec2, radius: f32, damage: f32, lifetime: f32, faction: Faction) -> Self {
        Self {
            pos,
            radius,
            damage,
            lifetime,
            faction,
            color: NEON_GREEN,
        }
    }

    /// Ghost dash trail patch
    pub fn ghost(pos: Vec2, radius: f32, damage: f32, lifetime: f32) -> Self {
        Self {
            color: NEON_ORANGE,
            ..Self::toxic(pos, radius, damage, lifetime, Faction::Friendly)
        }
    }

    /// Age the field. Returns false once it has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.lifetime = (self.lifetime - dt).max(0.0);
        self.lifetime > 0.0
    }

    /// Whether a circle at `pos` with `radius` touches the field
    #[inline]
    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance(pos) < self.radius + radius
    }
}
