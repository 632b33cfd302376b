//! Boss archetypes
//!
//! Each boss runs two or three ability timers side by side. Movement
//! abilities (charge, jump) freeze their velocity when they trigger, using
//! the speed the boss had at that moment, and always run to completion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grunts::{ShooterMove, band_move};
use super::{EnemyCtx, Strike};
use crate::consts::*;
use crate::sim::entity::Body;
use crate::sim::event::AreaKind;
use crate::sim::hazard::{AreaField, Faction};
use crate::sim::projectile::Projectile;
use crate::tuning::{BossTuning, SlimeBossTuning, SniperBossTuning};
use crate::{direction_to, polar_to_cartesian};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossMotion {
    Walking,
    Charging { remaining: f32, velocity: Vec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub motion: BossMotion,
    pub charge_timer: f32,
    pub slam_timer: f32,
    /// Seconds left of the slam ring animation; no new slam while it runs
    pub slam_anim: f32,
    pub minion_timer: f32,
    /// Minion spawn points waiting for the wave director
    pub pending_minions: Vec<Vec2>,
}

impl BossState {
    pub fn new(t: &BossTuning) -> Self {
        Self {
            motion: BossMotion::Walking,
            charge_timer: t.charge_cooldown * 0.5,
            slam_timer: t.slam_cooldown,
            slam_anim: 0.0,
            minion_timer: t.minion_cooldown * 0.6,
            pending_minions: Vec::new(),
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.motion, BossMotion::Charging { .. })
    }

    pub(super) fn update(&mut self, id: u32, body: &mut Body, dt: f32, player: Vec2, ctx: &mut EnemyCtx) {
        let t = &ctx.tuning.enemies.boss;
        let (dir, dist) = direction_to(body.pos, player);

        match &mut self.motion {
            BossMotion::Charging { remaining, velocity } => {
                body.pos += *velocity * dt;
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.motion = BossMotion::Walking;
                    self.charge_timer = t.charge_cooldown;
                }
            }
            BossMotion::Walking => {
                body.pos += dir * body.effective_speed() * dt;
                self.charge_timer = (self.charge_timer - dt).max(0.0);
                if self.charge_timer <= 0.0 && dist < t.charge_range && dist > 0.0 {
                    self.motion = BossMotion::Charging {
                        remaining: t.charge_duration,
                        velocity: dir * body.effective_speed() * t.charge_speed_mult,
                    };
                }
            }
        }

        // Slam: range check uses the distance from the start of the step
        self.slam_timer = (self.slam_timer - dt).max(0.0);
        if self.slam_anim > 0.0 {
            self.slam_anim = (self.slam_anim - dt).max(0.0);
        } else if self.slam_timer <= 0.0 && dist < t.slam_radius + t.slam_trigger_margin {
            self.slam_anim = t.slam_anim;
            self.slam_timer = t.slam_cooldown;
            ctx.out.area_effect(body.pos, t.slam_radius, NEON_RED, AreaKind::Slam);
            if dist < t.slam_radius {
                ctx.out.strikes.push(Strike {
                    source: id,
                    damage: t.slam_damage,
                });
            }
        }

        self.minion_timer = (self.minion_timer - dt).max(0.0);
        if self.minion_timer <= 0.0 {
            self.minion_timer = t.minion_cooldown;
            let count = t.minion_count.max(1);
            for i in 0..t.minion_count {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                self.pending_minions
                    .push(body.pos + polar_to_cartesian(t.minion_ring_radius, angle));
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniperBossState {
    pub movement: ShooterMove,
    pub shot_timer: f32,
    pub ring_timer: f32,
    /// Wind-down after a ring burst; the next ring can't start before it ends
    pub ring_anim: f32,
}

impl SniperBossState {
    pub fn new(t: &SniperBossTuning) -> Self {
        Self {
            movement: ShooterMove::Approach,
            shot_timer: t.shot_interval,
            ring_timer: t.ring_cooldown,
            ring_anim: 0.0,
        }
    }

    pub(super) fn update(&mut self, body: &mut Body, dt: f32, player: Vec2, wobble_offset: f32, ctx: &mut EnemyCtx) {
        let t = &ctx.tuning.enemies.sniper_boss;
        let (dir, dist) = direction_to(body.pos, player);

        self.movement = band_move(body, dt, dir, dist, t.preferred_dist, t.dist_band, ctx.time, wobble_offset);

        self.shot_timer = (self.shot_timer - dt).max(0.0);
        if self.shot_timer <= 0.0 {
            self.shot_timer = t.shot_interval;
            let aim = dir.y.atan2(dir.x);
            let mut shot = Projectile::enemy(body.pos, aim, t.shot_speed, t.shot_damage);
            shot.color = NEON_CYAN;
            ctx.out.projectiles.push(shot);
        }

        self.ring_timer = (self.ring_timer - dt).max(0.0);
        if self.ring_anim > 0.0 {
            self.ring_anim = (self.ring_anim - dt).max(0.0);
        } else if self.ring_timer <= 0.0 {
            self.ring_timer = t.ring_cooldown;
            self.ring_anim = t.ring_anim;
            let count = t.ring_bullet_count.max(1);
            for i in 0..count {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                ctx.out
                    .projectiles
                    .push(Projectile::enemy(body.pos, angle, t.ring_bullet_speed, t.ring_damage));
            }
            ctx.out.area_effect(body.pos, body.radius * 2.0, NEON_CYAN, AreaKind::RingBurst);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SlimeMotion {
    Walking,
    Jumping { remaining: f32, velocity: Vec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlimeBossState {
    pub motion: SlimeMotion,
    pub jump_timer: f32,
    pub trail_timer: f32,
}

impl SlimeBossState {
    pub fn new(t: &SlimeBossTuning) -> Self {
        Self {
            motion: SlimeMotion::Walking,
            jump_timer: t.jump_cooldown,
            trail_timer: t.trail_interval,
        }
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.motion, SlimeMotion::Jumping { .. })
    }

    pub(super) fn update(&mut self, id: u32, body: &mut Body, dt: f32, player: Vec2, ctx: &mut EnemyCtx) {
        let tuning = ctx.tuning;
        let t = &tuning.enemies.slime_boss;

        match &mut self.motion {
            SlimeMotion::Jumping { remaining, velocity } => {
                body.pos += *velocity * dt;
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.motion = SlimeMotion::Walking;
                    self.jump_timer = t.jump_cooldown;
                    self.trail_timer = t.trail_interval;
                    land(id, body, player, t, ctx);
                }
            }
            SlimeMotion::Walking => {
                let (dir, dist) = direction_to(body.pos, player);
                body.pos += dir * body.effective_speed() * dt;

                self.trail_timer = (self.trail_timer - dt).max(0.0);
                if self.trail_timer <= 0.0 {
                    self.trail_timer = t.trail_interval;
                    drop_pool(body.pos, t.pool_radius, t, ctx);
                }

                self.jump_timer = (self.jump_timer - dt).max(0.0);
                if self.jump_timer <= 0.0 && dist > 0.0 {
                    self.motion = SlimeMotion::Jumping {
                        remaining: t.jump_duration,
                        velocity: dir * body.effective_speed() * t.jump_speed_mult,
                    };
                }
            }
        }
    }
}

fn drop_pool(pos: Vec2, radius: f32, t: &SlimeBossTuning, ctx: &mut EnemyCtx) {
    ctx.out.fields.push(AreaField::toxic(
        pos,
        radius,
        t.pool_damage,
        t.pool_lifetime,
        Faction::Hostile,
    ));
    ctx.out.area_effect(pos, radius, NEON_GREEN, AreaKind::ToxicPool);
}

/// Landing: shockwave check against the player plus a large pool
fn land(id: u32, body: &mut Body, player: Vec2, t: &SlimeBossTuning, ctx: &mut EnemyCtx) {
    // The jump may have carried the slime past the wall
    body.clamp_to_arena(ctx.tuning.arena());
    ctx.out
        .area_effect(body.pos, t.shockwave_radius, NEON_GREEN, AreaKind::Shockwave);
    if body.pos.distance(player) < t.shockwave_radius {
        ctx.out.strikes.push(Strike {
            source: id,
            damage: t.shockwave_damage,
        });
    }
    drop_pool(body.pos, t.pool_radius * t.landing_pool_scale, t, ctx);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Archetype, ArchetypeKind, EnemyOutbox};
    use super::*;
    use crate::sim::event::GameEvent;
    use crate::tuning::Tuning;

    #[test]
    fn test_slam_hits_only_inside_radius() {
        let tuning = Tuning::default();
        let t = &tuning.enemies.boss;
        let boss_pos = Vec2::new(1200.0, 1200.0);

        // Inside the trigger margin but outside the hit radius: slam fires, misses
        let mut enemy = spawn(ArchetypeKind::Boss, boss_pos, &tuning);
        if let Archetype::Boss(b) = &mut enemy.archetype {
            b.slam_timer = 0.0;
            b.charge_timer = 100.0;
        }
        let mut out = EnemyOutbox::default();
        let player = boss_pos + Vec2::new(t.slam_radius + t.slam_trigger_margin / 2.0, 0.0);
        step(&mut enemy, 0.016, player, &tuning, &mut out);
        assert!(matches!(&enemy.archetype, Archetype::Boss(b) if b.slam_anim > 0.0));
        assert!(out.strikes.is_empty());

        // Inside the radius: registers a hit
        let mut enemy = spawn(ArchetypeKind::Boss, boss_pos, &tuning);
        if let Archetype::Boss(b) = &mut enemy.archetype {
            b.slam_timer = 0.0;
            b.charge_timer = 100.0;
        }
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, boss_pos + Vec2::new(100.0, 0.0), &tuning, &mut out);
        assert_eq!(out.strikes.len(), 1);
        assert_eq!(out.strikes[0].damage, t.slam_damage);
    }

    #[test]
    fn test_boss_queues_minion_ring() {
        let tuning = Tuning::default();
        let boss_pos = Vec2::new(1200.0, 1200.0);
        let mut enemy = spawn(ArchetypeKind::Boss, boss_pos, &tuning);
        if let Archetype::Boss(b) = &mut enemy.archetype {
            b.minion_timer = 0.0;
            b.charge_timer = 100.0;
        }
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, Vec2::new(2000.0, 2000.0), &tuning, &mut out);

        let minions = enemy.drain_minions();
        assert_eq!(minions.len(), tuning.enemies.boss.minion_count as usize);
        for m in &minions {
            let d = m.distance(enemy.pos());
            assert!((d - tuning.enemies.boss.minion_ring_radius).abs() < 5.0);
        }
        assert!(enemy.drain_minions().is_empty());
    }

    #[test]
    fn test_boss_charge_freezes_slowed_speed() {
        let tuning = Tuning::default();
        let mut enemy = spawn(ArchetypeKind::Boss, Vec2::new(1200.0, 1200.0), &tuning);
        enemy.body.apply_slow(0.05, 0.5);
        if let Archetype::Boss(b) = &mut enemy.archetype {
            b.charge_timer = 0.0;
        }
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, Vec2::new(1500.0, 1200.0), &tuning, &mut out);
        let Archetype::Boss(b) = &enemy.archetype else {
            panic!("not a boss");
        };
        let BossMotion::Charging { velocity, .. } = b.motion else {
            panic!("boss did not charge");
        };
        let expected = enemy.body.speed * 0.5 * tuning.enemies.boss.charge_speed_mult;
        assert!((velocity.length() - expected).abs() < 1e-2);

        // Slow expires mid-charge; velocity stays as committed
        for _ in 0..5 {
            step(&mut enemy, 0.016, Vec2::new(1500.0, 1200.0), &tuning, &mut out);
        }
        let Archetype::Boss(b) = &enemy.archetype else {
            panic!("not a boss");
        };
        if let BossMotion::Charging { velocity: later, .. } = b.motion {
            assert_eq!(later, velocity);
        }
    }

    #[test]
    fn test_sniper_ring_burst_is_evenly_spaced() {
        let tuning = Tuning::default();
        let mut enemy = spawn(ArchetypeKind::SniperBoss, Vec2::new(1200.0, 1200.0), &tuning);
        if let Archetype::SniperBoss(s) = &mut enemy.archetype {
            s.ring_timer = 0.0;
            s.shot_timer = 100.0;
        }
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, Vec2::new(1650.0, 1200.0), &tuning, &mut out);
        let count = tuning.enemies.sniper_boss.ring_bullet_count as usize;
        assert_eq!(out.projectiles.len(), count);
        let step_angle = std::f32::consts::TAU / count as f32;
        let a0 = out.projectiles[0].vel.to_angle();
        let a1 = out.projectiles[1].vel.to_angle();
        assert!((crate::angle_delta(a0, a1) - step_angle).abs() < 1e-4);
    }

    #[test]
    fn test_slime_landing_shockwave_and_pool() {
        let tuning = Tuning::default();
        let t = &tuning.enemies.slime_boss;
        let mut enemy = spawn(ArchetypeKind::SlimeBoss, Vec2::new(1200.0, 1200.0), &tuning);
        if let Archetype::SlimeBoss(s) = &mut enemy.archetype {
            s.jump_timer = 0.0;
            s.trail_timer = 100.0;
        }
        let player = Vec2::new(1400.0, 1200.0);
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, player, &tuning, &mut out);
        assert!(matches!(&enemy.archetype, Archetype::SlimeBoss(s) if s.is_jumping()));

        let steps = (t.jump_duration / 0.05).ceil() as usize + 1;
        for _ in 0..steps {
            step(&mut enemy, 0.05, player, &tuning, &mut out);
        }
        assert!(matches!(&enemy.archetype, Archetype::SlimeBoss(s) if !s.is_jumping()));
        let landing_radius = t.pool_radius * t.landing_pool_scale;
        let big_pool = out
            .fields
            .iter()
            .find(|f| (f.radius - landing_radius).abs() < 1e-3);
        assert!(big_pool.is_some());
        assert!(out.events.iter().any(|e| matches!(
            e,
            GameEvent::AreaEffect { kind: AreaKind::ToxicPool, radius, .. } if (radius - landing_radius).abs() < 1e-3
        )));
        let hit = enemy.pos().distance(player) < t.shockwave_radius;
        assert_eq!(out.strikes.len(), usize::from(hit));
    }

    #[test]
    fn test_slime_leaves_trail_while_walking() {
        let tuning = Tuning::default();
        let mut enemy = spawn(ArchetypeKind::SlimeBoss, Vec2::new(1200.0, 1200.0), &tuning);
        let mut out = EnemyOutbox::default();
        for _ in 0..60 {
            step(&mut enemy, 0.05, Vec2::new(2200.0, 1200.0), &tuning, &mut out);
        }
        assert!(out.fields.iter().any(|f| f.faction == Faction::Hostile));
        let pool_events = out
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::AreaEffect { kind: AreaKind::ToxicPool, .. }))
            .count();
        assert_eq!(pool_events, out.fields.len());
    }

    #[test]
    fn test_slime_lands_inside_the_arena() {
        let tuning = Tuning::default();
        let t = &tuning.enemies.slime_boss;
        let arena = tuning.arena();
        let start = Vec2::new(arena.x - 100.0, 1200.0);
        let mut enemy = spawn(ArchetypeKind::SlimeBoss, start, &tuning);
        if let Archetype::SlimeBoss(s) = &mut enemy.archetype {
            s.jump_timer = 0.0;
            s.trail_timer = 100.0;
        }
        // Jump at a point beyond the wall, with frames long enough to overshoot it
        let player = Vec2::new(arena.x + 2000.0, 1200.0);
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, player, &tuning, &mut out);
        while matches!(&enemy.archetype, Archetype::SlimeBoss(s) if s.is_jumping()) {
            let mut ctx = EnemyCtx {
                tuning: &tuning,
                rng: &mut rng(),
                time: 0.0,
                out: &mut out,
            };
            // Move the body without the post-update clamp to mimic a long frame
            if let Archetype::SlimeBoss(s) = &mut enemy.archetype {
                s.update(enemy.id, &mut enemy.body, t.jump_duration, player, &mut ctx);
            }
        }
        let pool = out.fields.last().expect("landing pool");
        assert!(pool.pos.x <= arena.x - enemy.body.radius);
        assert!(out.events.iter().all(|e| match e {
            GameEvent::AreaEffect { pos, .. } => pos.x <= arena.x,
            _ => true,
        }));
    }
}
