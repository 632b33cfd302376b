//! Straight-line projectiles for both sides

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PROJECTILE_CULL_MARGIN;
use crate::polar_to_cartesian;

/// Default projectile lifetime in seconds
pub const PROJECTILE_LIFETIME: f32 = 3.0;
/// Default enemy bullet radius
pub const ENEMY_BULLET_RADIUS: f32 = 4.0;

/// Which side fired the projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Projectile behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Consumed on first hit
    Standard,
    /// Passes through targets, damaging each one once; pushes survivors
    Railgun {
        knockback: Vec2,
        /// Enemy IDs already damaged by this round
        hit: Vec<u32>,
    },
    /// Auto-aimed ultimate laser, consumed on first hit
    Laser,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Seconds until expiry
    pub lifetime: f32,
    pub owner: Owner,
    pub kind: ProjectileKind,
    /// Render tint
    pub color: u32,
    /// Cleared when consumed or expired; swept after collision resolution
    pub alive: bool,
}

impl Projectile {
    /// A projectile moving along `angle` at `speed`
    pub fn new(pos: Vec2, angle: f32, speed: f32, damage: f32, radius: f32, owner: Owner) -> Self {
        let color = match owner {
            Owner::Player => crate::consts::NEON_CYAN,
            Owner::Enemy => crate::consts::NEON_ORANGE,
        };
        Self {
            pos,
            vel: polar_to_cartesian(speed, angle),
            radius,
            damage,
            lifetime: PROJECTILE_LIFETIME,
            owner,
            kind: ProjectileKind::Standard,
            color,
            alive: true,
        }
    }

    /// Enemy bullet with the default enemy radius
    pub fn enemy(pos: Vec2, angle: f32, speed: f32, damage: f32) -> Self {
        Self::new(pos, angle, speed, damage, ENEMY_BULLET_RADIUS, Owner::Enemy)
    }

    /// Piercing railgun round carrying a knockback impulse along its heading
    pub fn railgun(pos: Vec2, angle: f32, speed: f32, damage: f32, radius: f32, knockback: f32) -> Self {
        Self {
            kind: ProjectileKind::Railgun {
                knockback: polar_to_cartesian(knockback, angle),
                hit: Vec::new(),
            },
            color: crate::consts::WHITE,
            ..Self::new(pos, angle, speed, damage, radius, Owner::Player)
        }
    }

    /// Ultimate laser
    pub fn laser(pos: Vec2, angle: f32, speed: f32, damage: f32) -> Self {
        Self {
            kind: ProjectileKind::Laser,
            color: crate::consts::NEON_RED,
            ..Self::new(pos, angle, speed, damage, 6.0, Owner::Player)
        }
    }

    #[inline]
    pub fn is_piercing(&self) -> bool {
        matches!(self.kind, ProjectileKind::Railgun { .. })
    }

    /// True if this piercing round already damaged `target`
    pub fn has_hit(&self, target: u32) -> bool {
        match &self.kind {
            ProjectileKind::Railgun { hit, .. } => hit.contains(&target),
            _ => false,
        }
    }

    /// Remember a pierced target; no-op for non-piercing kinds
    pub fn register_hit(&mut self, target: u32) {
        if let ProjectileKind::Railgun { hit, .. } = &mut self.kind {
            if !hit.contains(&target) {
                hit.push(target);
            }
        }
    }

    /// Knockback impulse carried by this projectile, if any
    pub fn knockback(&self) -> Option<Vec2> {
        match &self.kind {
            ProjectileKind::Railgun { knockback, .. } => Some(*knockback),
            _ => None,
        }
    }

    /// Move and age; marks the projectile dead when it expires or leaves the arena
    pub fn update(&mut self, dt: f32, arena: Vec2) {
        self.pos += self.vel * dt;
        self.lifetime = (self.lifetime - dt).max(0.0);
        let m = PROJECTILE_CULL_MARGIN;
        if self.lifetime <= 0.0
            || self.pos.x < -m
            || self.pos.x > arena.x + m
            || self.pos.y < -m
            || self.pos.y > arena.y + m
        {
            self.alive = false;
        }
    }
}
