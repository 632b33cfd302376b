//! Enemy actors: one closed set of archetypes, each with its own state machine
//!
//! Every enemy shares a [`Body`]; the archetype-specific timers and modes
//! live in the [`Archetype`] variant. Updates read the player position and
//! write only to the enemy itself, pushing anything that affects other actors
//! (bullets, blasts, slam hits, pools) into an [`EnemyOutbox`] for the
//! combat resolver.

mod bosses;
mod grunts;
mod specials;

pub use bosses::{BossMotion, BossState, SlimeBossState, SlimeMotion, SniperBossState};
pub use grunts::{ChaserMode, ChaserState, ShooterMove, ShooterState, TankMotion, TankState, fan_offsets};
pub use specials::{BomberPhase, BomberState, ShieldGuardState};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::AugmentKind;
use super::entity::{Body, Multipliers};
use super::event::{AreaKind, GameEvent};
use super::hazard::AreaField;
use super::projectile::Projectile;
use crate::consts::*;
use crate::tuning::Tuning;

/// Seconds an enemy flashes white after taking damage
pub const HIT_FLASH_DURATION: f32 = 0.1;

/// The fixed set of enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeKind {
    Chaser,
    Shooter,
    Tank,
    ShieldGuard,
    SuicideBomber,
    Boss,
    SniperBoss,
    SlimeBoss,
}

impl ArchetypeKind {
    /// Boss rotation pool
    pub const BOSSES: [ArchetypeKind; 3] = [Self::Boss, Self::SniperBoss, Self::SlimeBoss];

    pub fn is_boss(self) -> bool {
        matches!(self, Self::Boss | Self::SniperBoss | Self::SlimeBoss)
    }

    /// Ultimate augment tied to a boss kind
    pub fn augment(self) -> Option<AugmentKind> {
        match self {
            Self::Boss => Some(AugmentKind::Tank),
            Self::SniperBoss => Some(AugmentKind::Sniper),
            Self::SlimeBoss => Some(AugmentKind::Slime),
            _ => None,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            Self::Chaser => NEON_RED,
            Self::Shooter => NEON_ORANGE,
            Self::Tank => NEON_PURPLE,
            Self::ShieldGuard => NEON_BLUE,
            Self::SuicideBomber => NEON_YELLOW,
            Self::Boss => NEON_RED,
            Self::SniperBoss => NEON_CYAN,
            Self::SlimeBoss => NEON_GREEN,
        }
    }

    /// Particle budget for the death burst
    pub fn death_particles(self) -> u32 {
        if self.is_boss() { 60 } else { 15 }
    }
}

/// Archetype-specific state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Archetype {
    Chaser(ChaserState),
    Shooter(ShooterState),
    Tank(TankState),
    ShieldGuard(ShieldGuardState),
    SuicideBomber(BomberState),
    Boss(BossState),
    SniperBoss(SniperBossState),
    SlimeBoss(SlimeBossState),
}

/// Result of submitting damage to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Damaged,
    Killed,
    /// Blocked by a directional shield; hp untouched
    Deflected,
    /// Target was already dead or detonated
    Ignored,
}

/// Area damage centred on an exploding enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub source: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
}

/// A boss ability hit that already connected with the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub source: u32,
    pub damage: f32,
}

/// Cross-actor intents produced by enemy updates
#[derive(Debug, Default)]
pub struct EnemyOutbox {
    pub projectiles: Vec<Projectile>,
    pub blasts: Vec<Blast>,
    pub strikes: Vec<Strike>,
    pub fields: Vec<AreaField>,
    pub events: Vec<GameEvent>,
}

impl EnemyOutbox {
    pub fn area_effect(&mut self, pos: Vec2, radius: f32, color: u32, kind: AreaKind) {
        self.events.push(GameEvent::AreaEffect {
            pos,
            radius,
            color,
            kind,
        });
    }
}

/// Shared inputs for one enemy update pass
pub struct EnemyCtx<'a> {
    pub tuning: &'a Tuning,
    pub rng: &'a mut Pcg32,
    /// Simulation clock (seconds), drives wobble and strafing
    pub time: f32,
    pub out: &'a mut EnemyOutbox,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: ArchetypeKind,
    pub body: Body,
    pub xp: u32,
    /// Per-enemy phase so paths don't move in lockstep
    pub wobble_offset: f32,
    pub archetype: Archetype,
}

impl Enemy {
    /// Create an enemy of `kind` at `pos`, scaled by the wave multipliers
    pub fn spawn(
        id: u32,
        kind: ArchetypeKind,
        pos: Vec2,
        mults: &Multipliers,
        wave: u32,
        tuning: &Tuning,
        rng: &mut Pcg32,
    ) -> Self {
        let stats = tuning.enemies.stats(kind);
        let body = Body::from_stats(pos, stats, mults);
        let t = &tuning.enemies;
        let archetype = match kind {
            ArchetypeKind::Chaser => Archetype::Chaser(ChaserState::new(body.speed)),
            ArchetypeKind::Shooter => Archetype::Shooter(ShooterState::new(&t.shooter, wave, rng)),
            ArchetypeKind::Tank => Archetype::Tank(TankState::new(&t.tank, rng)),
            ArchetypeKind::ShieldGuard => {
                Archetype::ShieldGuard(ShieldGuardState::new(&t.shield_guard, rng))
            }
            ArchetypeKind::SuicideBomber => Archetype::SuicideBomber(BomberState::new(rng)),
            ArchetypeKind::Boss => Archetype::Boss(BossState::new(&t.boss)),
            ArchetypeKind::SniperBoss => Archetype::SniperBoss(SniperBossState::new(&t.sniper_boss)),
            ArchetypeKind::SlimeBoss => Archetype::SlimeBoss(SlimeBossState::new(&t.slime_boss)),
        };
        Self {
            id,
            kind,
            body,
            xp: stats.xp,
            wobble_offset: rng.random::<f32>() * std::f32::consts::TAU,
            archetype,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.body.is_dead()
    }

    pub fn is_boss(&self) -> bool {
        self.kind.is_boss()
    }

    /// Whether this enemy blocks hits by direction
    pub fn has_directional_shield(&self) -> bool {
        matches!(self.archetype, Archetype::ShieldGuard(_))
    }

    /// Submit non-directional damage. Returns true if it killed the enemy.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.take_hit(amount, None) == HitOutcome::Killed
    }

    /// Submit damage, honouring archetype mitigation.
    ///
    /// `from_angle` is the direction (from the enemy's centre) the attack
    /// arrived from; directional shields only apply when it is present.
    pub fn take_hit(&mut self, amount: f32, from_angle: Option<f32>) -> HitOutcome {
        if self.is_dead() {
            return HitOutcome::Ignored;
        }
        let amount = match &self.archetype {
            Archetype::Tank(tank) => tank.mitigate(amount),
            Archetype::ShieldGuard(guard) => {
                if from_angle.is_some_and(|angle| guard.blocks(angle)) {
                    return HitOutcome::Deflected;
                }
                amount
            }
            Archetype::SuicideBomber(bomber) if bomber.phase == BomberPhase::Exploded => {
                return HitOutcome::Ignored;
            }
            _ => amount,
        };
        if self.body.apply_damage(amount, HIT_FLASH_DURATION) {
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged
        }
    }

    /// Advance this enemy by `dt` toward/around the player
    pub fn update(&mut self, dt: f32, player: Vec2, ctx: &mut EnemyCtx) {
        if self.is_dead() {
            return;
        }
        let id = self.id;
        let body = &mut self.body;
        let wobble = self.wobble_offset;
        match &mut self.archetype {
            Archetype::Chaser(s) => s.update(body, dt, player, wobble, ctx),
            Archetype::Shooter(s) => s.update(body, dt, player, wobble, ctx),
            Archetype::Tank(s) => s.update(body, dt, player, ctx),
            Archetype::ShieldGuard(s) => s.update(body, dt, player, ctx.tuning.enemies.shield_guard.turn_rate),
            Archetype::SuicideBomber(s) => s.update(id, body, dt, player, ctx),
            Archetype::Boss(s) => s.update(id, body, dt, player, ctx),
            Archetype::SniperBoss(s) => s.update(body, dt, player, wobble, ctx),
            Archetype::SlimeBoss(s) => s.update(id, body, dt, player, ctx),
        }
        body.tick_timers(dt);
        body.clamp_to_arena(ctx.tuning.arena());
    }

    /// Take the minion spawn points a boss has queued
    pub fn drain_minions(&mut self) -> Vec<Vec2> {
        match &mut self.archetype {
            Archetype::Boss(s) => std::mem::take(&mut s.pending_minions),
            _ => Vec::new(),
        }
    }

    /// True once a bomber has gone off
    pub fn has_exploded(&self) -> bool {
        matches!(&self.archetype, Archetype::SuicideBomber(b) if b.phase == BomberPhase::Exploded)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overkill_marks_killed_for_every_archetype() {
        let tuning = Tuning::default();
        let kinds = [
            ArchetypeKind::Chaser,
            ArchetypeKind::Shooter,
            ArchetypeKind::Tank,
            ArchetypeKind::ShieldGuard,
            ArchetypeKind::SuicideBomber,
            ArchetypeKind::Boss,
            ArchetypeKind::SniperBoss,
            ArchetypeKind::SlimeBoss,
        ];
        for kind in kinds {
            let mut enemy = spawn(kind, Vec2::new(500.0, 500.0), &tuning);
            // Make sure the tank's shield can't soak the overkill
            if let Archetype::Tank(t) = &mut enemy.archetype {
                t.shielded = false;
            }
            let hp = enemy.body.hp;
            assert!(enemy.take_damage(hp + 1.0), "{kind:?} survived overkill");
            assert_eq!(enemy.body.hp, 0.0);
            assert!(enemy.is_dead());
        }
    }

    #[test]
    fn test_dead_enemy_ignores_hits() {
        let tuning = Tuning::default();
        let mut enemy = spawn(ArchetypeKind::Chaser, Vec2::new(500.0, 500.0), &tuning);
        enemy.take_damage(1000.0);
        assert_eq!(enemy.take_hit(10.0, None), HitOutcome::Ignored);
    }

    #[test]
    fn test_boss_kinds_map_to_augments() {
        assert_eq!(ArchetypeKind::Boss.augment(), Some(AugmentKind::Tank));
        assert_eq!(ArchetypeKind::SniperBoss.augment(), Some(AugmentKind::Sniper));
        assert_eq!(ArchetypeKind::SlimeBoss.augment(), Some(AugmentKind::Slime));
        assert_eq!(ArchetypeKind::Tank.augment(), None);
        assert!(ArchetypeKind::BOSSES.iter().all(|k| k.is_boss()));
    }

    #[test]
    fn test_update_clamps_to_arena() {
        let tuning = Tuning::default();
        let mut enemy = spawn(ArchetypeKind::Chaser, Vec2::new(5.0, 5.0), &tuning);
        let mut out = EnemyOutbox::default();
        step(&mut enemy, 0.1, Vec2::new(-500.0, -500.0), &tuning, &mut out);
        assert!(enemy.pos().x >= enemy.body.radius);
        assert!(enemy.pos().y >= enemy.body.radius);
    }

    proptest! {
        #[test]
        fn prop_hp_never_negative(hits in proptest::collection::vec(0.0f32..500.0, 1..20)) {
            let tuning = Tuning::default();
            let mut enemy = spawn(ArchetypeKind::Tank, Vec2::new(500.0, 500.0), &tuning);
            for h in hits {
                enemy.take_damage(h);
                prop_assert!(enemy.body.hp >= 0.0);
                prop_assert!(enemy.body.hp <= enemy.body.max_hp);
            }
        }

        #[test]
        fn prop_timers_never_negative(dts in proptest::collection::vec(0.0f32..0.05, 1..200)) {
            let tuning = Tuning::default();
            let mut enemy = spawn(ArchetypeKind::Boss, Vec2::new(1200.0, 1200.0), &tuning);
            let mut out = EnemyOutbox::default();
            for dt in dts {
                step(&mut enemy, dt, Vec2::new(1300.0, 1250.0), &tuning, &mut out);
                prop_assert!(enemy.body.flash_timer >= 0.0);
                prop_assert!(enemy.body.slow_timer >= 0.0);
                if let Archetype::Boss(b) = &enemy.archetype {
                    prop_assert!(b.slam_timer >= 0.0);
                    prop_assert!(b.minion_timer >= 0.0);
                    prop_assert!(b.slam_anim >= 0.0);
                }
            }
        }
    }
}
