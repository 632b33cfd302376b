//! The player actor: movement, dash, firing, buffs, XP and upgrades

use std::collections::BTreeMap;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazard::AreaField;
use super::pickup::PowerUp;
use super::projectile::{Owner, Projectile};
use crate::consts::{NEON_CYAN, NEON_YELLOW};
use crate::tuning::PlayerTuning;
use crate::{clamp_to_arena, polar_to_cartesian};

/// Angular gap between neighbouring multi-barrel shots (radians)
const BARREL_SPREAD: f32 = 0.15;
/// Seconds the player flashes after a hit
const HIT_FLASH: f32 = 0.2;
/// Shield buff time consumed by one absorbed hit
const SHIELD_HIT_COST: f32 = 1.0;

/// Permanent stat upgrades offered on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upgrade {
    FireRate,
    BulletSpeed,
    MaxHp,
    Damage,
    MoveSpeed,
    DashCooldown,
    GiantGrowth,
    MultiBarrel,
    Railgun,
    /// Dashing leaves a damaging trail
    GhostDash,
    /// Dash end knocks back nearby enemies and erases bullets
    DashShockwave,
    /// Bullets dashed through speed up firing for a while
    ReflexDash,
}

impl Upgrade {
    pub const ALL: [Upgrade; 12] = [
        Self::FireRate,
        Self::BulletSpeed,
        Self::MaxHp,
        Self::Damage,
        Self::MoveSpeed,
        Self::DashCooldown,
        Self::GiantGrowth,
        Self::MultiBarrel,
        Self::Railgun,
        Self::GhostDash,
        Self::DashShockwave,
        Self::ReflexDash,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::FireRate => "fire_rate",
            Self::BulletSpeed => "bullet_speed",
            Self::MaxHp => "max_hp",
            Self::Damage => "damage",
            Self::MoveSpeed => "move_speed",
            Self::DashCooldown => "dash_cooldown",
            Self::GiantGrowth => "giant_growth",
            Self::MultiBarrel => "multi_barrel",
            Self::Railgun => "railgun",
            Self::GhostDash => "ghost_dash",
            Self::DashShockwave => "dash_shockwave",
            Self::ReflexDash => "reflex_dash",
        }
    }

    /// Parse an upgrade key; unknown keys yield `None`
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.key() == key)
    }

    pub fn max_level(self) -> u32 {
        match self {
            Self::FireRate | Self::Damage => 8,
            Self::BulletSpeed | Self::MoveSpeed => 6,
            Self::MaxHp => 10,
            Self::DashCooldown => 5,
            Self::GiantGrowth => 4,
            Self::MultiBarrel => 2,
            Self::Railgun => 1,
            Self::GhostDash | Self::DashShockwave | Self::ReflexDash => 3,
        }
    }
}

/// Area hit at the end of a dash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashShockwave {
    pub pos: Vec2,
    pub radius: f32,
    pub pushback: f32,
    pub damage: f32,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    /// Facing of the gun (radians)
    pub aim_angle: f32,

    pub fire_interval: f32,
    pub fire_timer: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_radius: f32,
    /// Counts down to the next railgun round (only with the upgrade)
    pub railgun_timer: f32,

    pub dash_cooldown: f32,
    pub dash_cooldown_timer: f32,
    pub dash_timer: f32,
    /// Fixed for the whole dash
    pub dash_velocity: Vec2,
    /// Set on the frame a dash finishes
    pub dash_ended_at: Option<Vec2>,
    pub ghost_timer: f32,
    /// Ghost trail patches dropped since the last drain
    pub ghost_trail: Vec<AreaField>,
    /// Enemy bullets absorbed during the current dash
    pub bullets_phased: u32,
    pub reflex_timer: f32,

    pub invincible_duration: f32,
    pub invincible_timer: f32,
    pub flash_timer: f32,

    pub shield_timer: f32,
    pub double_damage_timer: f32,
    pub speed_boost_timer: f32,

    pub xp: u32,
    pub level: u32,
    pub xp_required: u32,
    pub upgrades: BTreeMap<Upgrade, u32>,
}

impl Player {
    pub fn new(pos: Vec2, t: &PlayerTuning) -> Self {
        Self {
            pos,
            radius: t.radius,
            hp: t.max_hp,
            max_hp: t.max_hp,
            speed: t.speed,
            aim_angle: 0.0,
            fire_interval: t.fire_interval,
            fire_timer: 0.0,
            bullet_speed: t.bullet_speed,
            bullet_damage: t.bullet_damage,
            bullet_radius: t.bullet_radius,
            railgun_timer: t.railgun_interval,
            dash_cooldown: t.dash_cooldown,
            dash_cooldown_timer: 0.0,
            dash_timer: 0.0,
            dash_velocity: Vec2::ZERO,
            dash_ended_at: None,
            ghost_timer: 0.0,
            ghost_trail: Vec::new(),
            bullets_phased: 0,
            reflex_timer: 0.0,
            invincible_duration: t.invincible_duration,
            invincible_timer: 0.0,
            flash_timer: 0.0,
            shield_timer: 0.0,
            double_damage_timer: 0.0,
            speed_boost_timer: 0.0,
            xp: 0,
            level: 1,
            xp_required: t.base_xp_required,
            upgrades: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.hp > 0.0
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Hard immunity: no damage of any kind lands
    #[inline]
    pub fn is_immune(&self) -> bool {
        self.invincible_timer > 0.0 || self.is_dashing()
    }

    pub fn upgrade_level(&self, upgrade: Upgrade) -> u32 {
        self.upgrades.get(&upgrade).copied().unwrap_or(0)
    }

    pub fn barrel_count(&self) -> u32 {
        1 + self.upgrade_level(Upgrade::MultiBarrel)
    }

    /// Advance timers, movement and aim.
    ///
    /// `move_dir` is expected to be normalized (or zero). A dash request is
    /// honoured only off cooldown and with a nonzero direction.
    pub fn update(&mut self, dt: f32, move_dir: Vec2, dash: bool, aim: Vec2, t: &PlayerTuning, arena: Vec2) {
        for timer in [
            &mut self.fire_timer,
            &mut self.railgun_timer,
            &mut self.invincible_timer,
            &mut self.flash_timer,
            &mut self.dash_cooldown_timer,
            &mut self.shield_timer,
            &mut self.double_damage_timer,
            &mut self.speed_boost_timer,
            &mut self.reflex_timer,
        ] {
            *timer = (*timer - dt).max(0.0);
        }
        self.dash_ended_at = None;

        let move_dir = move_dir.normalize_or_zero();
        let mut dash_ended = false;
        if self.is_dashing() {
            self.pos += self.dash_velocity * dt;
            self.dash_timer = (self.dash_timer - dt).max(0.0);
            self.drop_ghost_trail(dt, t);
            dash_ended = !self.is_dashing();
        } else {
            let boost = if self.speed_boost_timer > 0.0 {
                t.speed_boost_mult
            } else {
                1.0
            };
            self.pos += move_dir * self.speed * boost * dt;

            if dash && self.dash_cooldown_timer <= 0.0 && move_dir != Vec2::ZERO {
                self.dash_timer = t.dash_duration;
                self.dash_cooldown_timer = self.dash_cooldown;
                self.dash_velocity = move_dir * t.dash_speed;
            }
        }

        self.pos = clamp_to_arena(self.pos, self.radius, arena);
        if dash_ended {
            self.dash_ended_at = Some(self.pos);
        }
        let to_aim = aim - self.pos;
        if to_aim != Vec2::ZERO {
            self.aim_angle = to_aim.y.atan2(to_aim.x);
        }
    }

    fn drop_ghost_trail(&mut self, dt: f32, t: &PlayerTuning) {
        let level = self.upgrade_level(Upgrade::GhostDash);
        if level == 0 {
            return;
        }
        self.ghost_timer -= dt;
        if self.ghost_timer <= 0.0 {
            self.ghost_timer = t.ghost_trail_interval;
            let step = (level - 1) as f32;
            self.ghost_trail.push(AreaField::ghost(
                self.pos,
                t.ghost_trail_radius + 4.0 * step,
                t.ghost_trail_damage * level as f32,
                t.ghost_trail_lifetime * (1.0 + 0.3 * step),
            ));
        }
    }

    /// Take the ghost trail patches dropped so far
    pub fn drain_ghost_trail(&mut self) -> Vec<AreaField> {
        std::mem::take(&mut self.ghost_trail)
    }

    /// The shockwave owed for a dash that ended this frame
    pub fn dash_shockwave(&self, t: &PlayerTuning) -> Option<DashShockwave> {
        let pos = self.dash_ended_at?;
        let level = self.upgrade_level(Upgrade::DashShockwave);
        if level == 0 {
            return None;
        }
        let step = (level - 1) as f32;
        Some(DashShockwave {
            pos,
            radius: t.shockwave_radius + 30.0 * step,
            pushback: t.shockwave_pushback * (1.0 + 0.3 * step),
            damage: t.shockwave_damage * level as f32,
        })
    }

    /// Whether enemy bullets touching the player are absorbed right now
    pub fn phases_bullets(&self) -> bool {
        self.is_dashing() && self.upgrade_level(Upgrade::ReflexDash) > 0
    }

    /// At dash end, turn phased bullets into the reflex buff.
    /// Returns how many bullets paid for it.
    pub fn settle_reflex(&mut self, t: &PlayerTuning) -> Option<u32> {
        self.dash_ended_at?;
        let level = self.upgrade_level(Upgrade::ReflexDash);
        if level == 0 || self.bullets_phased == 0 {
            return None;
        }
        self.reflex_timer = t.reflex_duration * (1.0 + 0.3 * (level - 1) as f32);
        Some(std::mem::take(&mut self.bullets_phased))
    }

    /// Seconds between shots, after buffs
    pub fn effective_fire_interval(&self, t: &PlayerTuning) -> f32 {
        if self.reflex_timer > 0.0 {
            self.fire_interval * t.reflex_fire_rate_mult
        } else {
            self.fire_interval
        }
    }

    /// Apply incoming damage. Returns true if hp actually went down.
    ///
    /// Immunity swallows the hit entirely; an active shield buff absorbs it
    /// at the cost of some shield time.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_immune() || !self.alive() {
            return false;
        }
        if self.shield_timer > 0.0 {
            self.shield_timer = (self.shield_timer - SHIELD_HIT_COST).max(0.0);
            return false;
        }
        debug_assert!(amount.is_finite(), "non-finite damage {amount}");
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        self.invincible_timer = self.invincible_duration;
        self.flash_timer = HIT_FLASH;
        true
    }

    /// Fire if the trigger is held and the gun is ready
    pub fn try_fire(&mut self, fire: bool, t: &PlayerTuning) -> Vec<Projectile> {
        if !fire || self.fire_timer > 0.0 || self.is_dashing() || !self.alive() {
            return Vec::new();
        }
        self.fire_timer = self.effective_fire_interval(t);

        let boosted = self.double_damage_timer > 0.0;
        let damage = if boosted {
            self.bullet_damage * 2.0
        } else {
            self.bullet_damage
        };
        let muzzle = |angle: f32| self.pos + polar_to_cartesian(self.radius + 8.0, angle);

        if self.upgrade_level(Upgrade::Railgun) > 0 && self.railgun_timer <= 0.0 {
            self.railgun_timer = t.railgun_interval;
            return vec![Projectile::railgun(
                muzzle(self.aim_angle),
                self.aim_angle,
                self.bullet_speed * t.railgun_speed_mult,
                damage * t.railgun_damage_mult,
                self.bullet_radius * 1.5,
                t.railgun_knockback,
            )];
        }

        let count = self.barrel_count();
        let spread = BARREL_SPREAD * (count - 1) as f32;
        super::enemy::fan_offsets(count, spread)
            .map(|offset| {
                let angle = self.aim_angle + offset;
                let mut shot = Projectile::new(
                    muzzle(angle),
                    angle,
                    self.bullet_speed,
                    damage,
                    self.bullet_radius,
                    Owner::Player,
                );
                shot.color = if boosted { NEON_YELLOW } else { NEON_CYAN };
                shot
            })
            .collect()
    }

    /// Add XP; returns how many levels were gained
    pub fn gain_xp(&mut self, amount: u32, t: &PlayerTuning) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp_required > 0 && self.xp >= self.xp_required {
            self.xp -= self.xp_required;
            self.level += 1;
            let scale = t.xp_scale_factor.powi(self.level as i32 - 1);
            self.xp_required = (t.base_xp_required as f32 * scale).round() as u32;
            self.hp = (self.hp + t.level_up_heal).min(self.max_hp);
            gained += 1;
        }
        gained
    }

    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        let level = self.upgrades.entry(upgrade).or_insert(0);
        debug_assert!(*level < upgrade.max_level(), "{upgrade:?} is already maxed");
        *level += 1;
        match upgrade {
            Upgrade::FireRate => self.fire_interval *= 0.8,
            Upgrade::BulletSpeed => self.bullet_speed *= 1.15,
            Upgrade::MaxHp => {
                self.max_hp += 25.0;
                self.hp = (self.hp + 25.0).min(self.max_hp);
            }
            Upgrade::Damage => self.bullet_damage *= 1.2,
            Upgrade::MoveSpeed => self.speed *= 1.1,
            Upgrade::DashCooldown => self.dash_cooldown *= 0.85,
            Upgrade::GiantGrowth => {
                self.radius += 5.0;
                self.max_hp += 50.0;
                self.hp = (self.hp + 50.0).min(self.max_hp);
                self.bullet_damage *= 1.3;
            }
            // Read at fire time or at dash end
            Upgrade::MultiBarrel
            | Upgrade::Railgun
            | Upgrade::GhostDash
            | Upgrade::DashShockwave
            | Upgrade::ReflexDash => {}
        }
    }

    pub fn apply_powerup(&mut self, powerup: PowerUp, t: &PlayerTuning) {
        match powerup {
            PowerUp::Health => self.hp = (self.hp + t.health_pickup).min(self.max_hp),
            PowerUp::Shield => self.shield_timer = t.shield_duration,
            PowerUp::DoubleDamage => self.double_damage_timer = t.double_damage_duration,
            PowerUp::SpeedBoost => self.speed_boost_timer = t.speed_boost_duration,
        }
    }

    /// Up to `n` distinct upgrades that aren't maxed yet, in random order
    pub fn upgrade_options(&self, rng: &mut Pcg32, n: usize) -> Vec<Upgrade> {
        let mut pool: Vec<Upgrade> = Upgrade::ALL
            .into_iter()
            .filter(|u| self.upgrade_level(*u) < u.max_level())
            .collect();
        pool.shuffle(rng);
        pool.truncate(n);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::Faction;
    use rand::SeedableRng;

    const ARENA: Vec2 = Vec2::new(2400.0, 2400.0);

    fn player() -> (Player, PlayerTuning) {
        let t = PlayerTuning::default();
        (Player::new(Vec2::new(1200.0, 1200.0), &t), t)
    }

    #[test]
    fn test_invincibility_window() {
        let (mut p, _) = player();
        assert!(p.take_damage(10.0));
        assert!(!p.take_damage(10.0));
        assert_eq!(p.hp, 90.0);
    }

    #[test]
    fn test_dash_is_immune_and_committed() {
        let (mut p, t) = player();
        p.update(0.016, Vec2::X, true, Vec2::ZERO, &t, ARENA);
        assert!(p.is_dashing());
        assert!(p.is_immune());
        assert!(!p.take_damage(50.0));
        assert_eq!(p.hp, t.max_hp);

        let before = p.pos;
        // Steering input is ignored mid-dash
        p.update(0.016, Vec2::NEG_X, false, Vec2::ZERO, &t, ARENA);
        assert!(p.pos.x > before.x);
    }

    #[test]
    fn test_dash_needs_direction() {
        let (mut p, t) = player();
        p.update(0.016, Vec2::ZERO, true, Vec2::ZERO, &t, ARENA);
        assert!(!p.is_dashing());
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let (mut p, t) = player();
        p.apply_powerup(PowerUp::Shield, &t);
        assert!(!p.take_damage(30.0));
        assert_eq!(p.hp, t.max_hp);
        assert_eq!(p.shield_timer, t.shield_duration - 1.0);
    }

    #[test]
    fn test_hp_clamps_at_zero() {
        let (mut p, _) = player();
        p.take_damage(1000.0);
        assert_eq!(p.hp, 0.0);
        assert!(!p.alive());
    }

    #[test]
    fn test_fire_rate_gate_and_barrels() {
        let (mut p, t) = player();
        assert_eq!(p.try_fire(true, &t).len(), 1);
        assert!(p.try_fire(true, &t).is_empty());

        p.apply_upgrade(Upgrade::MultiBarrel);
        p.apply_upgrade(Upgrade::MultiBarrel);
        p.fire_timer = 0.0;
        assert_eq!(p.try_fire(true, &t).len(), 3);
    }

    #[test]
    fn test_double_damage_buff() {
        let (mut p, t) = player();
        p.apply_powerup(PowerUp::DoubleDamage, &t);
        let shots = p.try_fire(true, &t);
        assert_eq!(shots[0].damage, t.bullet_damage * 2.0);
    }

    #[test]
    fn test_railgun_replaces_a_shot() {
        let (mut p, t) = player();
        p.apply_upgrade(Upgrade::Railgun);
        p.railgun_timer = 0.0;
        let shots = p.try_fire(true, &t);
        assert_eq!(shots.len(), 1);
        assert!(shots[0].is_piercing());
        assert_eq!(p.railgun_timer, t.railgun_interval);
    }

    #[test]
    fn test_level_up_heals_and_scales_requirement() {
        let (mut p, t) = player();
        p.hp = 50.0;
        assert_eq!(p.gain_xp(100, &t), 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.hp, 70.0);
        assert_eq!(p.xp_required, 140);
    }

    /// Dash along +x and run until it finishes; returns how many frames reported an end
    fn dash_through(p: &mut Player, t: &PlayerTuning) -> usize {
        p.update(0.016, Vec2::X, true, Vec2::ZERO, t, ARENA);
        assert!(p.is_dashing());
        (0..20)
            .filter(|_| {
                p.update(0.016, Vec2::X, false, Vec2::ZERO, t, ARENA);
                p.dash_ended_at.is_some()
            })
            .count()
    }

    #[test]
    fn test_dash_end_reported_once() {
        let (mut p, t) = player();
        assert_eq!(dash_through(&mut p, &t), 1);
        assert!(p.dash_ended_at.is_none());
        // No upgrades: nothing owed
        assert!(p.drain_ghost_trail().is_empty());
    }

    #[test]
    fn test_ghost_dash_leaves_trail() {
        let (mut p, t) = player();
        p.apply_upgrade(Upgrade::GhostDash);
        dash_through(&mut p, &t);
        let trail = p.drain_ghost_trail();
        assert!(trail.len() >= 2);
        assert!(trail.iter().all(|f| f.faction == Faction::Friendly));
        assert!(trail.iter().all(|f| f.damage == t.ghost_trail_damage));
        // Patches are laid along the dash path
        assert!(trail.last().map(|f| f.pos.x).unwrap_or(0.0) > trail[0].pos.x);
        assert!(p.drain_ghost_trail().is_empty());
    }

    #[test]
    fn test_dash_shockwave_only_at_dash_end() {
        let (mut p, t) = player();
        p.apply_upgrade(Upgrade::DashShockwave);
        p.apply_upgrade(Upgrade::DashShockwave);
        p.update(0.016, Vec2::X, true, Vec2::ZERO, &t, ARENA);
        assert!(p.dash_shockwave(&t).is_none());

        let mut wave = None;
        for _ in 0..20 {
            p.update(0.016, Vec2::X, false, Vec2::ZERO, &t, ARENA);
            wave = wave.or(p.dash_shockwave(&t));
        }
        let wave = wave.expect("shockwave at dash end");
        assert_eq!(wave.radius, t.shockwave_radius + 30.0);
        assert_eq!(wave.damage, t.shockwave_damage * 2.0);
    }

    #[test]
    fn test_reflex_needs_phased_bullets() {
        let (mut p, t) = player();
        p.apply_upgrade(Upgrade::ReflexDash);
        p.update(0.016, Vec2::X, true, Vec2::ZERO, &t, ARENA);
        assert!(p.phases_bullets());
        p.bullets_phased = 2;
        assert_eq!(p.settle_reflex(&t), None);

        let mut settled = None;
        for _ in 0..20 {
            p.update(0.016, Vec2::X, false, Vec2::ZERO, &t, ARENA);
            settled = settled.or(p.settle_reflex(&t));
        }
        assert_eq!(settled, Some(2));
        assert_eq!(p.bullets_phased, 0);
        assert!(p.reflex_timer > 0.0);
        assert!(!p.phases_bullets());
    }

    #[test]
    fn test_reflex_buff_speeds_up_firing() {
        let (mut p, t) = player();
        p.reflex_timer = 1.0;
        assert_eq!(p.try_fire(true, &t).len(), 1);
        assert_eq!(p.fire_timer, t.fire_interval * t.reflex_fire_rate_mult);
    }

    #[test]
    fn test_upgrade_keys() {
        for u in Upgrade::ALL {
            assert_eq!(Upgrade::from_key(u.key()), Some(u));
        }
        assert_eq!(Upgrade::from_key("laser_eyes"), None);
    }

    #[test]
    fn test_upgrade_options_skip_maxed() {
        let (mut p, _) = player();
        p.apply_upgrade(Upgrade::Railgun);
        let mut rng = Pcg32::seed_from_u64(3);
        let options = p.upgrade_options(&mut rng, 20);
        assert_eq!(options.len(), Upgrade::ALL.len() - 1);
        assert!(!options.contains(&Upgrade::Railgun));
    }
}
