//! Combat resolution: hits, damage rules, combo scoring, ultimate and trials
//!
//! Runs after every actor has moved. All damage between actors goes through
//! here; enemies killed during resolution are only marked, and the enemy
//! and projectile collections are compacted once at the end.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Blast, Enemy, HitOutcome, Strike};
use super::event::{ActorRef, AreaKind, GameEvent};
use super::hazard::{AreaField, Faction};
use super::player::Player;
use super::projectile::Projectile;
use crate::consts::{NEON_GREEN, NEON_MAGENTA};
use crate::tuning::{CombatTuning, Tuning, UltimateTuning};
use crate::{direction_to, polar_to_cartesian};

/// Ultimate modifiers, each tied to one boss
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AugmentKind {
    /// Auto-aimed lasers at the nearest enemies
    Sniper,
    /// Ring of toxic pools
    Slime,
    /// Stronger pushback
    Tank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialState {
    Active,
    Failed,
    Completed,
}

/// The one trial challenge the player can be running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub augment: AugmentKind,
    pub required: u32,
    pub kills: u32,
    pub state: TrialState,
}

impl TrialRecord {
    pub fn is_active(&self) -> bool {
        self.state == TrialState::Active
    }

    pub fn is_failed(&self) -> bool {
        self.state == TrialState::Failed
    }
}

/// Consecutive-kill counter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    /// Time left before the combo drops
    pub timer: f32,
    /// HUD pulse after each kill
    pub pulse: f32,
}

impl ComboState {
    /// Count a kill. Returns the tier reached by exactly this kill, if any.
    pub fn register_kill(&mut self, t: &CombatTuning) -> Option<u8> {
        self.count += 1;
        self.timer = t.combo_window;
        self.pulse = 1.0;
        if self.count == t.combo_tier2 {
            Some(2)
        } else if self.count == t.combo_tier1 {
            Some(1)
        } else {
            None
        }
    }

    /// Score multiplier for the current count
    pub fn multiplier(&self) -> f32 {
        1.0 + self.count.saturating_sub(1) as f32 * 0.25
    }

    pub fn tick(&mut self, dt: f32) {
        self.pulse = (self.pulse - dt * 4.0).max(0.0);
        if self.count > 0 {
            self.timer = (self.timer - dt).max(0.0);
            if self.timer <= 0.0 {
                self.count = 0;
            }
        }
    }
}

/// Ultimate charge and unlocked augments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UltimateState {
    pub charge: f32,
    pub augments: BTreeSet<AugmentKind>,
}

impl UltimateState {
    pub fn add_charge(&mut self, amount: f32, t: &UltimateTuning) {
        self.charge = (self.charge + amount).clamp(0.0, t.cooldown_max);
    }

    pub fn is_ready(&self, t: &UltimateTuning) -> bool {
        self.charge >= t.cooldown_max
    }

    pub fn has(&self, augment: AugmentKind) -> bool {
        self.augments.contains(&augment)
    }
}

/// Mutable view of everything combat touches
pub struct Battlefield<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a mut Vec<Enemy>,
    pub player_shots: &'a mut Vec<Projectile>,
    pub enemy_shots: &'a mut Vec<Projectile>,
    pub fields: &'a mut Vec<AreaField>,
}

/// An enemy taken out of play this frame
#[derive(Debug, Clone)]
pub struct Removed {
    pub enemy: Enemy,
    /// Killed by the player (score, XP); false for environment kills
    pub credited: bool,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub removed: Vec<Removed>,
    /// Hits that actually cost the player hp
    pub player_hits: u32,
}

/// Score, combo, ultimate and trial state for one match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Combat {
    pub score: u64,
    pub combo: ComboState,
    pub ultimate: UltimateState,
    pub trial: Option<TrialRecord>,
    /// Enemies killed by the player since the last compaction
    #[serde(skip)]
    credited: Vec<u32>,
}

impl Combat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one frame of contact between everything on the field
    pub fn resolve(
        &mut self,
        dt: f32,
        field: &mut Battlefield,
        blasts: &[Blast],
        strikes: &[Strike],
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> Resolution {
        let mut res = Resolution::default();

        self.dash_end(field, tuning, events);
        self.player_shots_vs_enemies(field, tuning, events);

        // Friendly pools: damage over time, no origin so shields don't apply
        for pool in field.fields.iter().filter(|f| f.faction == Faction::Friendly) {
            for enemy in field.enemies.iter_mut() {
                if !enemy.is_dead()
                    && pool.touches(enemy.pos(), enemy.body.radius)
                    && enemy.take_hit(pool.damage * dt, None) == HitOutcome::Killed
                {
                    self.on_kill(enemy, tuning, events);
                }
            }
        }

        for blast in blasts {
            if blast.pos.distance(field.player.pos) < blast.radius + field.player.radius {
                self.hurt_player(field.player, blast.damage, &mut res, events);
            }
            for enemy in field.enemies.iter_mut() {
                if enemy.id == blast.source || enemy.is_dead() {
                    continue;
                }
                if blast.pos.distance(enemy.pos()) < blast.radius + enemy.body.radius {
                    // Splash kills belong to the environment
                    enemy.take_hit(blast.damage / 2.0, None);
                }
            }
        }

        for strike in strikes {
            self.hurt_player(field.player, strike.damage, &mut res, events);
        }

        // Contact damage
        for enemy in field.enemies.iter() {
            if enemy.is_dead() || enemy.has_exploded() {
                continue;
            }
            if enemy.body.overlaps(field.player.pos, field.player.radius) {
                self.hurt_player(field.player, enemy.body.damage, &mut res, events);
            }
        }

        // Reflex dash soaks bullets; otherwise they pass through an immune player
        if field.player.phases_bullets() {
            for shot in field.enemy_shots.iter_mut().filter(|s| s.alive) {
                if shot.pos.distance(field.player.pos) < shot.radius + field.player.radius {
                    shot.alive = false;
                    field.player.bullets_phased += 1;
                }
            }
        } else if !field.player.is_immune() {
            for shot in field.enemy_shots.iter_mut().filter(|s| s.alive) {
                if shot.pos.distance(field.player.pos) < shot.radius + field.player.radius {
                    shot.alive = false;
                    self.hurt_player(field.player, shot.damage, &mut res, events);
                }
            }
        }

        for pool in field.fields.iter().filter(|f| f.faction == Faction::Hostile) {
            if pool.touches(field.player.pos, field.player.radius) {
                self.hurt_player(field.player, pool.damage, &mut res, events);
            }
        }

        self.compact(field, &mut res, events);
        res
    }

    /// Shockwave and reflex payoff for a dash that ended this frame
    fn dash_end(&mut self, field: &mut Battlefield, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if let Some(wave) = field.player.dash_shockwave(&tuning.player) {
            for enemy in field.enemies.iter_mut() {
                if enemy.is_dead() || enemy.has_exploded() {
                    continue;
                }
                let (dir, dist) = direction_to(wave.pos, enemy.pos());
                if dist <= 0.0 || dist >= wave.radius {
                    continue;
                }
                enemy.body.pos += dir * wave.pushback * tuning.combat.knockback_scale;
                if enemy.take_hit(wave.damage, None) == HitOutcome::Killed {
                    self.on_kill(enemy, tuning, events);
                }
            }
            for shot in field.enemy_shots.iter_mut() {
                if shot.pos.distance(wave.pos) < wave.radius {
                    shot.alive = false;
                }
            }
            events.push(GameEvent::AreaEffect {
                pos: wave.pos,
                radius: wave.radius,
                color: NEON_MAGENTA,
                kind: AreaKind::DashShockwave,
            });
        }

        if let Some(phased) = field.player.settle_reflex(&tuning.player) {
            log::debug!("Reflex dash: {phased} bullets phased");
            events.push(GameEvent::ReflexTriggered { phased });
        }
    }

    fn player_shots_vs_enemies(&mut self, field: &mut Battlefield, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        for shot in field.player_shots.iter_mut() {
            if !shot.alive {
                continue;
            }
            for enemy in field.enemies.iter_mut() {
                if enemy.is_dead() || enemy.has_exploded() || shot.has_hit(enemy.id) {
                    continue;
                }
                if shot.pos.distance(enemy.pos()) >= shot.radius + enemy.body.radius {
                    continue;
                }

                let origin = shot.pos - enemy.pos();
                let outcome = enemy.take_hit(shot.damage, Some(origin.y.atan2(origin.x)));
                match outcome {
                    HitOutcome::Ignored => continue,
                    HitOutcome::Deflected => events.push(GameEvent::Deflect { pos: shot.pos }),
                    HitOutcome::Damaged => {
                        events.push(GameEvent::DamageFlash {
                            actor: ActorRef::Enemy(enemy.id),
                        });
                        if let Some(kb) = shot.knockback() {
                            enemy.body.pos += kb * tuning.combat.knockback_scale;
                        }
                    }
                    HitOutcome::Killed => self.on_kill(enemy, tuning, events),
                }

                if shot.is_piercing() {
                    shot.register_hit(enemy.id);
                } else {
                    shot.alive = false;
                    break;
                }
            }
        }
    }

    /// Damage the player; any hp loss fails a running trial
    fn hurt_player(&mut self, player: &mut Player, amount: f32, res: &mut Resolution, events: &mut Vec<GameEvent>) {
        if player.take_damage(amount) {
            res.player_hits += 1;
            events.push(GameEvent::DamageFlash { actor: ActorRef::Player });
            self.fail_trial(events);
        }
    }

    /// Player-credited kill: combo, score, charge, trial progress, boss artifacts
    fn on_kill(&mut self, enemy: &Enemy, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        self.credited.push(enemy.id);

        if let Some(tier) = self.combo.register_kill(&tuning.combat) {
            events.push(GameEvent::ComboTier {
                tier,
                combo: self.combo.count,
            });
        }
        let gained = enemy.xp as f32 * self.combo.multiplier() * tuning.combat.score_multiplier;
        self.score += gained as u64;
        events.push(GameEvent::ScoreChanged { score: self.score });

        self.ultimate.add_charge(tuning.ultimate.charge_per_kill, &tuning.ultimate);
        self.advance_trial(events);

        if let Some(augment) = enemy.kind.augment() {
            self.grant_artifact(augment, &tuning.ultimate, events);
        }
    }

    fn advance_trial(&mut self, events: &mut Vec<GameEvent>) {
        let Some(trial) = self.trial.as_mut().filter(|t| t.is_active()) else {
            return;
        };
        trial.kills += 1;
        if trial.kills >= trial.required {
            trial.state = TrialState::Completed;
            self.ultimate.augments.insert(trial.augment);
            log::info!("Trial complete: {:?} augment unlocked", trial.augment);
            events.push(GameEvent::AugmentUnlocked(trial.augment));
        }
        events.push(GameEvent::TrialStateChanged(trial.clone()));
    }

    /// A boss artifact starts that augment's trial, once per augment
    fn grant_artifact(&mut self, augment: AugmentKind, t: &UltimateTuning, events: &mut Vec<GameEvent>) {
        if self.ultimate.has(augment) {
            return;
        }
        if self.trial.as_ref().is_some_and(|tr| tr.is_active()) {
            return;
        }
        let trial = TrialRecord {
            augment,
            required: t.trial_kill_target,
            kills: 0,
            state: TrialState::Active,
        };
        log::info!("Trial started: {augment:?}, {} kills without taking damage", trial.required);
        events.push(GameEvent::TrialStateChanged(trial.clone()));
        self.trial = Some(trial);
    }

    fn fail_trial(&mut self, events: &mut Vec<GameEvent>) {
        if let Some(trial) = self.trial.as_mut().filter(|t| t.is_active()) {
            trial.state = TrialState::Failed;
            log::info!("Trial failed: {:?} at {}/{}", trial.augment, trial.kills, trial.required);
            events.push(GameEvent::TrialStateChanged(trial.clone()));
        }
    }

    /// Drop dead enemies and spent projectiles
    fn compact(&mut self, field: &mut Battlefield, res: &mut Resolution, events: &mut Vec<GameEvent>) {
        field.player_shots.retain(|s| s.alive);
        field.enemy_shots.retain(|s| s.alive);

        let mut kept = Vec::with_capacity(field.enemies.len());
        for enemy in field.enemies.drain(..) {
            if !enemy.is_dead() && !enemy.has_exploded() {
                kept.push(enemy);
                continue;
            }
            let pos = enemy.pos();
            events.push(GameEvent::Death {
                pos,
                color: enemy.kind.color(),
                particle_count: enemy.kind.death_particles(),
            });
            if enemy.is_boss() {
                events.push(GameEvent::BossDefeated {
                    archetype: enemy.kind,
                    pos,
                });
            }
            let credited = self.credited.contains(&enemy.id);
            res.removed.push(Removed { enemy, credited });
        }
        *field.enemies = kept;
        self.credited.clear();
    }

    /// Combo decay and passive ultimate charge
    pub fn tick(&mut self, dt: f32, tuning: &Tuning) {
        self.combo.tick(dt);
        self.ultimate.add_charge(dt, &tuning.ultimate);
    }

    /// Fire the ultimate if it is fully charged. Returns true if it fired.
    pub fn fire_ultimate(&mut self, field: &mut Battlefield, tuning: &Tuning, events: &mut Vec<GameEvent>) -> bool {
        let t = &tuning.ultimate;
        if !self.ultimate.is_ready(t) {
            return false;
        }
        self.ultimate.charge = 0.0;
        let origin = field.player.pos;

        let push_mult = if self.ultimate.has(AugmentKind::Tank) {
            t.tank_pushback_mult
        } else {
            1.0
        };
        for enemy in field.enemies.iter_mut() {
            if enemy.is_dead() || enemy.has_exploded() {
                continue;
            }
            let (dir, dist) = direction_to(origin, enemy.pos());
            if dist > t.pulse_radius {
                continue;
            }
            match enemy.take_hit(t.pulse_damage, None) {
                HitOutcome::Killed => self.on_kill(enemy, tuning, events),
                HitOutcome::Damaged => {
                    enemy.body.pos += dir * t.pushback * t.pushback_scale * push_mult;
                    enemy.body.apply_slow(t.slow_duration, t.slow_factor);
                }
                HitOutcome::Deflected | HitOutcome::Ignored => {}
            }
        }

        for shot in field.enemy_shots.iter_mut() {
            if shot.pos.distance(origin) <= t.pulse_radius {
                shot.alive = false;
            }
        }

        if self.ultimate.has(AugmentKind::Sniper) {
            let mut targets: Vec<(f32, Vec2)> = field
                .enemies
                .iter()
                .filter(|e| !e.is_dead() && !e.has_exploded())
                .map(|e| (e.pos().distance_squared(origin), e.pos()))
                .collect();
            targets.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (_, target) in targets.into_iter().take(t.laser_count) {
                let aim = target - origin;
                field
                    .player_shots
                    .push(Projectile::laser(origin, aim.y.atan2(aim.x), t.laser_speed, t.laser_damage));
            }
        }

        if self.ultimate.has(AugmentKind::Slime) {
            let ring = t.pulse_radius * t.toxic_ring_ratio;
            let count = t.toxic_pool_count.max(1);
            for i in 0..t.toxic_pool_count {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                let pos = origin + polar_to_cartesian(ring, angle);
                field.fields.push(AreaField::toxic(
                    pos,
                    t.toxic_pool_radius,
                    t.toxic_pool_damage,
                    t.toxic_pool_lifetime,
                    Faction::Friendly,
                ));
                events.push(GameEvent::AreaEffect {
                    pos,
                    radius: t.toxic_pool_radius,
                    color: NEON_GREEN,
                    kind: AreaKind::ToxicPool,
                });
            }
        }

        log::info!("Ultimate fired with augments {:?}", self.ultimate.augments);
        events.push(GameEvent::AreaEffect {
            pos: origin,
            radius: t.pulse_radius,
            color: NEON_MAGENTA,
            kind: AreaKind::UltimatePulse,
        });
        events.push(GameEvent::UltimateFired { pos: origin });
        true
    }
}
