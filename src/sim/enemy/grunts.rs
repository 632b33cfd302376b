//! Rank-and-file archetypes: Chaser, Shooter, Tank

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::EnemyCtx;
use crate::direction_to;
use crate::sim::entity::Body;
use crate::sim::projectile::Projectile;
use crate::tuning::{ShooterTuning, TankTuning};

/// Turn a per-60Hz-frame probability into a per-step probability for `dt`
fn chance_per_step(per_frame: f32, dt: f32) -> f32 {
    let per_frame = per_frame.clamp(0.0, 1.0);
    1.0 - (1.0 - per_frame).powf(dt * 60.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChaserMode {
    Normal,
    Bursting { remaining: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaserState {
    pub mode: ChaserMode,
    /// Wave-scaled speed outside of a burst
    pub base_speed: f32,
}

impl ChaserState {
    pub fn new(base_speed: f32) -> Self {
        Self {
            mode: ChaserMode::Normal,
            base_speed,
        }
    }

    pub fn is_bursting(&self) -> bool {
        matches!(self.mode, ChaserMode::Bursting { .. })
    }

    pub(super) fn update(&mut self, body: &mut Body, dt: f32, player: Vec2, wobble_offset: f32, ctx: &mut EnemyCtx) {
        let t = &ctx.tuning.enemies.chaser;
        let (dir, dist) = direction_to(body.pos, player);

        match &mut self.mode {
            ChaserMode::Bursting { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.mode = ChaserMode::Normal;
                    body.speed = self.base_speed;
                }
            }
            ChaserMode::Normal => {
                if dist < t.burst_range && ctx.rng.random::<f32>() < chance_per_step(t.burst_chance, dt) {
                    self.mode = ChaserMode::Bursting {
                        remaining: t.burst_duration,
                    };
                    body.speed = self.base_speed * t.burst_speed_mult;
                }
            }
        }

        // Sideways sway so a pack doesn't move in a straight line
        let wobble = (ctx.time * 5.0 + wobble_offset).sin() * t.wobble_amplitude;
        let heading = dir + dir.perp() * wobble;
        body.pos += heading * body.effective_speed() * dt;
    }
}

/// Last movement decision of a shooter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShooterMove {
    Approach,
    Retreat,
    Strafe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterState {
    pub movement: ShooterMove,
    pub fire_timer: f32,
    /// Fires a fan instead of a single bullet
    pub fan: bool,
}

impl ShooterState {
    pub fn new(t: &ShooterTuning, wave: u32, rng: &mut Pcg32) -> Self {
        Self {
            movement: ShooterMove::Approach,
            fire_timer: rng.random_range(0.0..=t.fire_interval),
            fan: wave >= t.fan_wave_threshold,
        }
    }

    pub(super) fn update(&mut self, body: &mut Body, dt: f32, player: Vec2, wobble_offset: f32, ctx: &mut EnemyCtx) {
        let t = &ctx.tuning.enemies.shooter;
        let (dir, dist) = direction_to(body.pos, player);

        self.movement = band_move(body, dt, dir, dist, t.preferred_dist, t.dist_band, ctx.time, wobble_offset);

        self.fire_timer = (self.fire_timer - dt).max(0.0);
        if self.fire_timer <= 0.0 {
            self.fire_timer = t.fire_interval;
            let aim = dir.y.atan2(dir.x);
            let count = if self.fan { t.fan_bullet_count.max(1) } else { 1 };
            for offset in fan_offsets(count, t.fan_spread) {
                ctx.out
                    .projectiles
                    .push(Projectile::enemy(body.pos, aim + offset, t.bullet_speed, body.damage));
            }
        }
    }
}

/// Keep a preferred distance: close in, back off, or circle inside the band
#[allow(clippy::too_many_arguments)]
pub(super) fn band_move(
    body: &mut Body,
    dt: f32,
    dir: Vec2,
    dist: f32,
    preferred: f32,
    band: f32,
    time: f32,
    phase: f32,
) -> ShooterMove {
    let step = body.effective_speed() * dt;
    if dist > preferred + band {
        body.pos += dir * step;
        ShooterMove::Approach
    } else if dist < preferred - band {
        body.pos -= dir * step;
        ShooterMove::Retreat
    } else {
        let strafe = (time * 2.0 + phase).sin();
        body.pos += dir.perp() * strafe * step;
        ShooterMove::Strafe
    }
}

/// Symmetric angular offsets for a fan of `count` bullets spanning `spread`
pub fn fan_offsets(count: u32, spread: f32) -> impl Iterator<Item = f32> {
    (0..count).map(move |i| {
        if count > 1 {
            spread * (i as f32 / (count - 1) as f32 - 0.5)
        } else {
            0.0
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TankMotion {
    Walking,
    /// Velocity is fixed when the charge starts
    Charging { remaining: f32, velocity: Vec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankState {
    pub shielded: bool,
    /// Counts down the active shield, or the wait until the next one
    pub shield_timer: f32,
    /// Fraction of damage removed while shielded
    pub shield_reduction: f32,
    pub motion: TankMotion,
    pub charge_timer: f32,
}

impl TankState {
    pub fn new(t: &TankTuning, rng: &mut Pcg32) -> Self {
        Self {
            shielded: false,
            shield_timer: t.shield_cooldown * rng.random_range(0.5..=1.0),
            shield_reduction: t.shield_reduction.clamp(0.0, 1.0),
            motion: TankMotion::Walking,
            charge_timer: t.first_charge_delay,
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.motion, TankMotion::Charging { .. })
    }

    /// Damage that gets through the shield phase
    pub fn mitigate(&self, amount: f32) -> f32 {
        if self.shielded {
            amount * (1.0 - self.shield_reduction)
        } else {
            amount
        }
    }

    pub(super) fn update(&mut self, body: &mut Body, dt: f32, player: Vec2, ctx: &mut EnemyCtx) {
        let t = &ctx.tuning.enemies.tank;
        let (dir, dist) = direction_to(body.pos, player);

        // Shield phase runs independently of movement
        self.shield_timer = (self.shield_timer - dt).max(0.0);
        if self.shield_timer <= 0.0 {
            self.shielded = !self.shielded;
            self.shield_timer = if self.shielded {
                t.shield_duration
            } else {
                t.shield_cooldown
            };
        }

        match &mut self.motion {
            TankMotion::Charging { remaining, velocity } => {
                body.pos += *velocity * dt;
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.motion = TankMotion::Walking;
                    self.charge_timer = t.charge_cooldown_min + ctx.rng.random_range(0.0..=t.charge_cooldown_jitter);
                }
            }
            TankMotion::Walking => {
                body.pos += dir * body.effective_speed() * dt;
                self.charge_timer = (self.charge_timer - dt).max(0.0);
                if self.charge_timer <= 0.0 && dist < t.charge_range && dist > 0.0 {
                    self.motion = TankMotion::Charging {
                        remaining: t.charge_duration,
                        velocity: dir * body.effective_speed() * t.charge_speed_mult,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Archetype, ArchetypeKind, EnemyOutbox};
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_chaser_bursts_when_chance_is_certain() {
        let mut tuning = Tuning::default();
        tuning.enemies.chaser.burst_chance = 1.0;
        let mut enemy = spawn(ArchetypeKind::Chaser, Vec2::new(1000.0, 1000.0), &tuning);
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.1, Vec2::new(1500.0, 1000.0), &tuning, &mut out);

        let Archetype::Chaser(state) = &enemy.archetype else {
            panic!("not a chaser");
        };
        assert!(state.is_bursting());
        assert_eq!(enemy.body.speed, state.base_speed * tuning.enemies.chaser.burst_speed_mult);
    }

    #[test]
    fn test_chaser_never_bursts_out_of_range() {
        let mut tuning = Tuning::default();
        tuning.enemies.chaser.burst_chance = 1.0;
        let mut enemy = spawn(ArchetypeKind::Chaser, Vec2::new(100.0, 100.0), &tuning);
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.1, Vec2::new(2000.0, 2000.0), &tuning, &mut out);
        assert!(matches!(&enemy.archetype, Archetype::Chaser(s) if !s.is_bursting()));
    }

    #[test]
    fn test_chaser_burst_ends_and_restores_speed() {
        let mut tuning = Tuning::default();
        tuning.enemies.chaser.burst_chance = 1.0;
        let mut enemy = spawn(ArchetypeKind::Chaser, Vec2::new(1000.0, 1000.0), &tuning);
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.1, Vec2::new(1500.0, 1000.0), &tuning, &mut out);
        tuning.enemies.chaser.burst_chance = 0.0;
        for _ in 0..5 {
            step(&mut enemy, 0.1, Vec2::new(2000.0, 1000.0), &tuning, &mut out);
        }
        let Archetype::Chaser(state) = &enemy.archetype else {
            panic!("not a chaser");
        };
        assert!(!state.is_bursting());
        assert_eq!(enemy.body.speed, state.base_speed);
    }

    #[test]
    fn test_fan_offsets_symmetric() {
        let offsets: Vec<f32> = fan_offsets(3, 0.4).collect();
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0] + 0.2).abs() < 1e-6);
        assert!(offsets[1].abs() < 1e-6);
        assert!((offsets[2] - 0.2).abs() < 1e-6);

        let even: Vec<f32> = fan_offsets(4, 0.6).collect();
        assert!((even[0] + even[3]).abs() < 1e-6);
        assert!((even[1] + even[2]).abs() < 1e-6);

        assert_eq!(fan_offsets(1, 0.6).collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn test_shooter_band_movement() {
        let tuning = Tuning::default();
        let player = Vec2::new(1000.0, 1000.0);
        let mut out = EnemyOutbox::default();

        let mut far = spawn(ArchetypeKind::Shooter, Vec2::new(1500.0, 1000.0), &tuning);
        step(&mut far, 0.1, player, &tuning, &mut out);
        assert!(matches!(&far.archetype, Archetype::Shooter(s) if s.movement == ShooterMove::Approach));
        assert!(far.pos().x < 1500.0);

        let mut near = spawn(ArchetypeKind::Shooter, Vec2::new(1100.0, 1000.0), &tuning);
        step(&mut near, 0.1, player, &tuning, &mut out);
        assert!(matches!(&near.archetype, Archetype::Shooter(s) if s.movement == ShooterMove::Retreat));
        assert!(near.pos().x > 1100.0);

        let mut band = spawn(ArchetypeKind::Shooter, Vec2::new(1250.0, 1000.0), &tuning);
        step(&mut band, 0.1, player, &tuning, &mut out);
        assert!(matches!(&band.archetype, Archetype::Shooter(s) if s.movement == ShooterMove::Strafe));
    }

    #[test]
    fn test_shooter_fires_fan_from_threshold_wave() {
        let tuning = Tuning::default();
        let mut rng = rng();
        let mut state = ShooterState::new(&tuning.enemies.shooter, tuning.enemies.shooter.fan_wave_threshold, &mut rng);
        state.fire_timer = 0.0;
        let mut enemy = spawn(ArchetypeKind::Shooter, Vec2::new(1250.0, 1000.0), &tuning);
        enemy.archetype = Archetype::Shooter(state);

        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, Vec2::new(1000.0, 1000.0), &tuning, &mut out);
        assert_eq!(out.projectiles.len(), tuning.enemies.shooter.fan_bullet_count as usize);
    }

    #[test]
    fn test_tank_shield_reduces_damage() {
        let tuning = Tuning::default();
        let mut shielded = spawn(ArchetypeKind::Tank, Vec2::new(500.0, 500.0), &tuning);
        let mut control = shielded.clone();
        if let Archetype::Tank(t) = &mut shielded.archetype {
            t.shielded = true;
        }
        if let Archetype::Tank(t) = &mut control.archetype {
            t.shielded = false;
        }

        let before = shielded.body.hp;
        shielded.take_damage(100.0);
        control.take_damage(100.0);
        let shielded_delta = before - shielded.body.hp;
        let control_delta = before - control.body.hp;
        let reduction = tuning.enemies.tank.shield_reduction;
        assert!((shielded_delta - control_delta * (1.0 - reduction)).abs() < 1e-3);
    }

    #[test]
    fn test_tank_charge_is_committed() {
        let tuning = Tuning::default();
        let mut enemy = spawn(ArchetypeKind::Tank, Vec2::new(1000.0, 1000.0), &tuning);
        if let Archetype::Tank(t) = &mut enemy.archetype {
            t.charge_timer = 0.0;
        }
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.016, Vec2::new(1300.0, 1000.0), &tuning, &mut out);
        let Archetype::Tank(t) = &enemy.archetype else {
            panic!("not a tank");
        };
        let TankMotion::Charging { velocity, .. } = t.motion else {
            panic!("tank did not charge");
        };
        assert!(velocity.x > 0.0 && velocity.y.abs() < 1e-3);

        // Player moves behind the tank; the charge keeps its heading
        let before = enemy.pos();
        step(&mut enemy, 0.016, Vec2::new(500.0, 1000.0), &tuning, &mut out);
        assert!(enemy.pos().x > before.x);
    }
}
