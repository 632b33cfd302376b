//! Archetypes with a gimmick: the directional ShieldGuard and the SuicideBomber

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Blast, EnemyCtx, HIT_FLASH_DURATION};
use crate::direction_to;
use crate::polar_to_cartesian;
use crate::sim::arc::ShieldArc;
use crate::sim::entity::Body;
use crate::sim::event::AreaKind;
use crate::tuning::ShieldGuardTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldGuardState {
    /// Frontal shield; its facing is also the walking direction
    pub shield: ShieldArc,
}

impl ShieldGuardState {
    pub fn new(t: &ShieldGuardTuning, rng: &mut Pcg32) -> Self {
        let facing = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
        Self {
            shield: ShieldArc::new(facing, t.shield_arc),
        }
    }

    pub fn facing(&self) -> f32 {
        self.shield.facing
    }

    /// Whether an attack arriving from `angle` hits the shield
    pub fn blocks(&self, angle: f32) -> bool {
        self.shield.contains_angle(angle)
    }

    pub(super) fn update(&mut self, body: &mut Body, dt: f32, player: Vec2, turn_rate: f32) {
        let (dir, dist) = direction_to(body.pos, player);
        if dist > 0.0 {
            self.shield.turn_toward(dir.y.atan2(dir.x), turn_rate * dt);
        }
        body.pos += polar_to_cartesian(body.effective_speed() * dt, self.shield.facing);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomberPhase {
    Rushing,
    Priming,
    /// Terminal; the resolver removes the bomber once its blast is applied
    Exploded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomberState {
    pub phase: BomberPhase,
    pub facing: f32,
    pub prime_timer: f32,
}

impl BomberState {
    pub fn new(rng: &mut Pcg32) -> Self {
        Self {
            phase: BomberPhase::Rushing,
            facing: rng.random_range(-std::f32::consts::PI..std::f32::consts::PI),
            prime_timer: 0.0,
        }
    }

    pub(super) fn update(&mut self, id: u32, body: &mut Body, dt: f32, player: Vec2, ctx: &mut EnemyCtx) {
        let t = &ctx.tuning.enemies.bomber;
        match self.phase {
            BomberPhase::Rushing => {
                let (dir, dist) = direction_to(body.pos, player);
                if dist > 0.0 {
                    self.facing = crate::rotate_toward(self.facing, dir.y.atan2(dir.x), t.turn_rate * dt);
                }
                body.pos += polar_to_cartesian(body.effective_speed() * dt, self.facing);
                if body.pos.distance(player) < t.prime_distance {
                    self.phase = BomberPhase::Priming;
                    self.prime_timer = t.prime_duration;
                }
            }
            BomberPhase::Priming => {
                body.flash_timer = HIT_FLASH_DURATION;
                self.prime_timer -= dt;
                if self.prime_timer <= 0.0 {
                    self.prime_timer = 0.0;
                    self.phase = BomberPhase::Exploded;
                    ctx.out.blasts.push(Blast {
                        source: id,
                        pos: body.pos,
                        radius: t.explosion_radius,
                        damage: body.damage,
                    });
                    ctx.out
                        .area_effect(body.pos, t.explosion_radius, crate::consts::NEON_YELLOW, AreaKind::Explosion);
                }
            }
            BomberPhase::Exploded => {}
        }
    }
}
