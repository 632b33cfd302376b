//! Power-up pickups: timed spawns, expiry and collection on contact

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::obstacle::Obstacle;
use crate::tuning::PickupTuning;

/// Extra clearance kept between a new pickup and any obstacle
const OBSTACLE_CLEARANCE: f32 = 20.0;

/// Temporary buffs granted by pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    Health,
    Shield,
    DoubleDamage,
    SpeedBoost,
}

impl PowerUp {
    pub const ALL: [PowerUp; 4] = [Self::Health, Self::Shield, Self::DoubleDamage, Self::SpeedBoost];
}

/// A pickup lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PowerUp,
    pub radius: f32,
    pub lifetime: f32,
}

impl Pickup {
    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance(pos) < self.radius + radius
    }
}

/// Spawns, ages and hands out pickups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupManager {
    pub pickups: Vec<Pickup>,
    pub spawn_timer: f32,
}

impl PickupManager {
    pub fn new(t: &PickupTuning) -> Self {
        Self {
            pickups: Vec::new(),
            // First one shows up early
            spawn_timer: t.spawn_interval * 0.5,
        }
    }

    /// Advance one frame. Returns the buffs the player collected.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        player: Vec2,
        player_radius: f32,
        obstacles: &[Obstacle],
        arena: Vec2,
        t: &PickupTuning,
        rng: &mut Pcg32,
        events: &mut Vec<GameEvent>,
    ) -> Vec<PowerUp> {
        self.spawn_timer = (self.spawn_timer - dt).max(0.0);
        if self.spawn_timer <= 0.0 && self.pickups.len() < t.max_active {
            self.spawn_timer = t.spawn_interval;
            if let Some(pickup) = Self::place(obstacles, arena, t, rng) {
                events.push(GameEvent::PickupSpawned {
                    kind: pickup.kind,
                    pos: pickup.pos,
                });
                self.pickups.push(pickup);
            }
        }

        let mut collected = Vec::new();
        self.pickups.retain_mut(|pickup| {
            pickup.lifetime = (pickup.lifetime - dt).max(0.0);
            if pickup.lifetime <= 0.0 {
                return false;
            }
            if pickup.touches(player, player_radius) {
                events.push(GameEvent::PickupCollected {
                    kind: pickup.kind,
                    pos: pickup.pos,
                });
                collected.push(pickup.kind);
                return false;
            }
            true
        });
        collected
    }

    /// Weighted pick of a kind, placed clear of the walls and obstacles
    fn place(obstacles: &[Obstacle], arena: Vec2, t: &PickupTuning, rng: &mut Pcg32) -> Option<Pickup> {
        let w = &t.weights;
        let kind = *PowerUp::ALL
            .choose_weighted(rng, |kind| match kind {
                PowerUp::Health => w.health,
                PowerUp::Shield => w.shield,
                PowerUp::DoubleDamage => w.double_damage,
                PowerUp::SpeedBoost => w.speed_boost,
            })
            .ok()?;

        let lo = t.wall_margin;
        let hi = arena - Vec2::splat(t.wall_margin);
        if hi.x <= lo || hi.y <= lo {
            return None;
        }
        for _ in 0..t.spawn_attempts {
            let pos = Vec2::new(rng.random_range(lo..hi.x), rng.random_range(lo..hi.y));
            let blocked = obstacles
                .iter()
                .any(|o| o.collides_circle(pos, t.radius + OBSTACLE_CLEARANCE));
            if !blocked {
                return Some(Pickup {
                    pos,
                    kind,
                    radius: t.radius,
                    lifetime: t.lifetime,
                });
            }
        }
        log::debug!("No room for a {kind:?} pickup");
        None
    }
}
