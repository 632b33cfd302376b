//! Data-driven game balance
//!
//! Every gameplay number lives here so a session can be rebalanced from a
//! JSON file without touching simulation code. Missing keys fall back to the
//! defaults below, so partial tuning files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::ArchetypeKind;

/// Base stats shared by every enemy archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    pub speed: f32,
    pub hp: f32,
    pub radius: f32,
    pub damage: f32,
    pub xp: u32,
}

impl ArchetypeStats {
    const fn new(speed: f32, hp: f32, radius: f32, damage: f32, xp: u32) -> Self {
        Self { speed, hp, radius, damage, xp }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserTuning {
    pub stats: ArchetypeStats,
    /// Chance to start a burst, per 60 Hz frame
    pub burst_chance: f32,
    pub burst_speed_mult: f32,
    pub burst_duration: f32,
    /// Bursts only start inside this distance to the player
    pub burst_range: f32,
    /// Peak perpendicular wobble, as a fraction of the forward direction
    pub wobble_amplitude: f32,
}

impl Default for ChaserTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(150.0, 50.0, 16.0, 15.0, 20),
            burst_chance: 0.008,
            burst_speed_mult: 3.0,
            burst_duration: 0.4,
            burst_range: 600.0,
            wobble_amplitude: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub stats: ArchetypeStats,
    pub fire_interval: f32,
    pub bullet_speed: f32,
    pub preferred_dist: f32,
    /// Half-width of the distance band where the shooter strafes
    pub dist_band: f32,
    /// From this wave on, every shot is a fan
    pub fan_wave_threshold: u32,
    pub fan_bullet_count: u32,
    /// Total angular spread of a fan (radians)
    pub fan_spread: f32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(80.0, 40.0, 18.0, 10.0, 30),
            fire_interval: 1.5,
            bullet_speed: 350.0,
            preferred_dist: 250.0,
            dist_band: 30.0,
            fan_wave_threshold: 4,
            fan_bullet_count: 3,
            fan_spread: 0.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    pub stats: ArchetypeStats,
    pub shield_cooldown: f32,
    pub shield_duration: f32,
    /// Fraction of incoming damage removed while shielded
    pub shield_reduction: f32,
    pub first_charge_delay: f32,
    pub charge_range: f32,
    pub charge_duration: f32,
    pub charge_speed_mult: f32,
    /// Cooldown after a charge is `charge_cooldown_min + U(0, charge_cooldown_jitter)`
    pub charge_cooldown_min: f32,
    pub charge_cooldown_jitter: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(60.0, 200.0, 28.0, 30.0, 50),
            shield_cooldown: 8.0,
            shield_duration: 3.0,
            shield_reduction: 0.7,
            first_charge_delay: 3.0,
            charge_range: 400.0,
            charge_duration: 0.6,
            charge_speed_mult: 5.0,
            charge_cooldown_min: 2.0,
            charge_cooldown_jitter: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldGuardTuning {
    pub stats: ArchetypeStats,
    /// Maximum facing rotation (radians per second)
    pub turn_rate: f32,
    /// Full angular width of the frontal shield (radians)
    pub shield_arc: f32,
}

impl Default for ShieldGuardTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(70.0, 120.0, 22.0, 20.0, 40),
            turn_rate: 1.5,
            shield_arc: 120f32.to_radians(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BomberTuning {
    pub stats: ArchetypeStats,
    pub turn_rate: f32,
    /// Distance to the player that starts priming
    pub prime_distance: f32,
    pub prime_duration: f32,
    pub explosion_radius: f32,
}

impl Default for BomberTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(170.0, 30.0, 14.0, 40.0, 25),
            turn_rate: 3.0,
            prime_distance: 70.0,
            prime_duration: 0.6,
            explosion_radius: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub stats: ArchetypeStats,
    pub charge_range: f32,
    pub charge_speed_mult: f32,
    pub charge_duration: f32,
    pub charge_cooldown: f32,
    pub slam_radius: f32,
    /// Slam triggers when the player is within `slam_radius + slam_trigger_margin`
    pub slam_trigger_margin: f32,
    pub slam_damage: f32,
    pub slam_cooldown: f32,
    pub slam_anim: f32,
    pub minion_count: u32,
    pub minion_cooldown: f32,
    pub minion_ring_radius: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(50.0, 3000.0, 60.0, 40.0, 500),
            charge_range: 600.0,
            charge_speed_mult: 6.0,
            charge_duration: 0.8,
            charge_cooldown: 5.0,
            slam_radius: 180.0,
            slam_trigger_margin: 50.0,
            slam_damage: 35.0,
            slam_cooldown: 6.0,
            slam_anim: 0.4,
            minion_count: 4,
            minion_cooldown: 10.0,
            minion_ring_radius: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperBossTuning {
    pub stats: ArchetypeStats,
    pub preferred_dist: f32,
    pub dist_band: f32,
    pub shot_interval: f32,
    pub shot_speed: f32,
    pub shot_damage: f32,
    pub ring_cooldown: f32,
    pub ring_bullet_count: u32,
    pub ring_bullet_speed: f32,
    pub ring_damage: f32,
    pub ring_anim: f32,
}

impl Default for SniperBossTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(70.0, 2500.0, 50.0, 30.0, 600),
            preferred_dist: 450.0,
            dist_band: 30.0,
            shot_interval: 1.2,
            shot_speed: 550.0,
            shot_damage: 20.0,
            ring_cooldown: 7.0,
            ring_bullet_count: 16,
            ring_bullet_speed: 300.0,
            ring_damage: 15.0,
            ring_anim: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlimeBossTuning {
    pub stats: ArchetypeStats,
    pub jump_cooldown: f32,
    pub jump_duration: f32,
    pub jump_speed_mult: f32,
    pub shockwave_radius: f32,
    pub shockwave_damage: f32,
    pub trail_interval: f32,
    pub pool_radius: f32,
    pub pool_damage: f32,
    pub pool_lifetime: f32,
    /// Landing pools are this much larger than trail pools
    pub landing_pool_scale: f32,
}

impl Default for SlimeBossTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeStats::new(60.0, 3500.0, 65.0, 35.0, 550),
            jump_cooldown: 4.0,
            jump_duration: 0.7,
            jump_speed_mult: 8.0,
            shockwave_radius: 160.0,
            shockwave_damage: 30.0,
            trail_interval: 0.5,
            pool_radius: 35.0,
            pool_damage: 8.0,
            pool_lifetime: 4.0,
            landing_pool_scale: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub chaser: ChaserTuning,
    pub shooter: ShooterTuning,
    pub tank: TankTuning,
    pub shield_guard: ShieldGuardTuning,
    pub bomber: BomberTuning,
    pub boss: BossTuning,
    pub sniper_boss: SniperBossTuning,
    pub slime_boss: SlimeBossTuning,
}

impl EnemyTuning {
    /// Base stats for an archetype
    pub fn stats(&self, kind: ArchetypeKind) -> &ArchetypeStats {
        match kind {
            ArchetypeKind::Chaser => &self.chaser.stats,
            ArchetypeKind::Shooter => &self.shooter.stats,
            ArchetypeKind::Tank => &self.tank.stats,
            ArchetypeKind::ShieldGuard => &self.shield_guard.stats,
            ArchetypeKind::SuicideBomber => &self.bomber.stats,
            ArchetypeKind::Boss => &self.boss.stats,
            ArchetypeKind::SniperBoss => &self.sniper_boss.stats,
            ArchetypeKind::SlimeBoss => &self.slime_boss.stats,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub speed: f32,
    pub radius: f32,
    pub max_hp: f32,
    pub fire_interval: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_radius: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Immunity after taking a hit
    pub invincible_duration: f32,
    pub base_xp_required: u32,
    pub xp_scale_factor: f32,
    pub level_up_heal: f32,
    pub shield_duration: f32,
    pub double_damage_duration: f32,
    pub speed_boost_duration: f32,
    pub speed_boost_mult: f32,
    pub health_pickup: f32,
    /// With the railgun upgrade, one shot per interval is a railgun round
    pub railgun_interval: f32,
    pub railgun_damage_mult: f32,
    pub railgun_speed_mult: f32,
    pub railgun_knockback: f32,
    /// Ghost dash: seconds between trail drops while dashing
    pub ghost_trail_interval: f32,
    pub ghost_trail_lifetime: f32,
    pub ghost_trail_radius: f32,
    /// Damage per second to enemies standing in the trail
    pub ghost_trail_damage: f32,
    pub shockwave_radius: f32,
    pub shockwave_pushback: f32,
    pub shockwave_damage: f32,
    pub reflex_duration: f32,
    /// Fire interval multiplier while the reflex buff runs
    pub reflex_fire_rate_mult: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 300.0,
            radius: 20.0,
            max_hp: 100.0,
            fire_interval: 0.15,
            bullet_speed: 700.0,
            bullet_damage: 25.0,
            bullet_radius: 5.0,
            dash_speed: 900.0,
            dash_duration: 0.15,
            dash_cooldown: 1.0,
            invincible_duration: 0.5,
            base_xp_required: 100,
            xp_scale_factor: 1.4,
            level_up_heal: 20.0,
            shield_duration: 5.0,
            double_damage_duration: 6.0,
            speed_boost_duration: 6.0,
            speed_boost_mult: 1.5,
            health_pickup: 40.0,
            railgun_interval: 2.0,
            railgun_damage_mult: 3.0,
            railgun_speed_mult: 1.5,
            railgun_knockback: 300.0,
            ghost_trail_interval: 0.03,
            ghost_trail_lifetime: 1.5,
            ghost_trail_radius: 18.0,
            ghost_trail_damage: 40.0,
            shockwave_radius: 120.0,
            shockwave_pushback: 300.0,
            shockwave_damage: 10.0,
            reflex_duration: 3.0,
            reflex_fire_rate_mult: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Delay before the first wave
    pub first_wave_delay: f32,
    /// Break between a cleared wave and the next
    pub break_time: f32,
    /// Seconds between staggered spawns of a normal wave
    pub spawn_interval: f32,
    /// Every Nth wave is a boss wave (0 disables bosses)
    pub boss_interval: u32,
    /// Chasers spawned alongside a boss
    pub boss_escort: u32,
    /// Permanent difficulty bonus per defeated boss
    pub boss_difficulty_bonus: f32,
    /// Difficulty added per player level above 1
    pub difficulty_per_level: f32,
    pub hp_per_wave: f32,
    pub speed_per_wave: f32,
    pub damage_per_wave: f32,
    /// Extra enemy hp per unit of difficulty above 1.0 (scaled by 1/difficulty_per_level)
    pub hp_per_level: f32,
    pub speed_per_level: f32,
    pub damage_per_level: f32,
    pub max_chasers: u32,
    pub max_shooters: u32,
    pub max_tanks: u32,
    pub max_shield_guards: u32,
    pub max_bombers: u32,
    /// Spawn band: how far beyond the viewport edge candidates are sampled
    pub spawn_margin: f32,
    /// Candidates closer than this to the viewport edge are rejected
    pub spawn_edge_min: f32,
    pub spawn_min_dist: f32,
    pub spawn_attempts: u32,
    /// Keeps spawns off the arena wall
    pub spawn_wall_padding: f32,
    pub announcement_time: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            first_wave_delay: 2.0,
            break_time: 3.0,
            spawn_interval: 0.35,
            boss_interval: 5,
            boss_escort: 4,
            boss_difficulty_bonus: 0.1,
            difficulty_per_level: 0.05,
            hp_per_wave: 0.1,
            speed_per_wave: 0.03,
            damage_per_wave: 0.05,
            hp_per_level: 0.05,
            speed_per_level: 0.02,
            damage_per_level: 0.03,
            max_chasers: 20,
            max_shooters: 10,
            max_tanks: 5,
            max_shield_guards: 4,
            max_bombers: 6,
            spawn_margin: 100.0,
            spawn_edge_min: 50.0,
            spawn_min_dist: 300.0,
            spawn_attempts: 50,
            spawn_wall_padding: 30.0,
            announcement_time: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Rolling window that keeps a combo alive
    pub combo_window: f32,
    pub combo_tier1: u32,
    pub combo_tier2: u32,
    pub score_multiplier: f32,
    /// Knockback impulses are applied as `impulse * knockback_scale`
    pub knockback_scale: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            combo_window: 2.5,
            combo_tier1: 5,
            combo_tier2: 10,
            score_multiplier: 10.0,
            knockback_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UltimateTuning {
    /// Charge needed to fire (seconds of passive charge)
    pub cooldown_max: f32,
    pub charge_per_kill: f32,
    pub pulse_radius: f32,
    pub pulse_damage: f32,
    pub pushback: f32,
    /// Pushback impulses are applied as `pushback * pushback_scale`
    pub pushback_scale: f32,
    pub slow_duration: f32,
    pub slow_factor: f32,
    pub tank_pushback_mult: f32,
    pub laser_count: usize,
    pub laser_damage: f32,
    pub laser_speed: f32,
    pub toxic_pool_count: u32,
    pub toxic_pool_damage: f32,
    pub toxic_pool_lifetime: f32,
    pub toxic_pool_radius: f32,
    /// Toxic ring distance as a fraction of the pulse radius
    pub toxic_ring_ratio: f32,
    pub trial_kill_target: u32,
}

impl Default for UltimateTuning {
    fn default() -> Self {
        Self {
            cooldown_max: 30.0,
            charge_per_kill: 1.0,
            pulse_radius: 300.0,
            pulse_damage: 60.0,
            pushback: 400.0,
            pushback_scale: 0.15,
            slow_duration: 3.0,
            slow_factor: 0.4,
            tank_pushback_mult: 2.5,
            laser_count: 5,
            laser_damage: 80.0,
            laser_speed: 900.0,
            toxic_pool_count: 8,
            toxic_pool_damage: 20.0,
            toxic_pool_lifetime: 5.0,
            toxic_pool_radius: 45.0,
            toxic_ring_ratio: 0.6,
            trial_kill_target: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupWeights {
    pub health: f32,
    pub shield: f32,
    pub double_damage: f32,
    pub speed_boost: f32,
}

impl Default for PickupWeights {
    fn default() -> Self {
        Self {
            health: 3.0,
            shield: 2.0,
            double_damage: 2.0,
            speed_boost: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub spawn_interval: f32,
    pub max_active: usize,
    pub lifetime: f32,
    pub radius: f32,
    /// Pickups never spawn closer than this to the arena wall
    pub wall_margin: f32,
    pub spawn_attempts: u32,
    pub weights: PickupWeights,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 15.0,
            max_active: 3,
            lifetime: 12.0,
            radius: 14.0,
            wall_margin: 80.0,
            spawn_attempts: 30,
            weights: PickupWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    /// No obstacle centre lands within this distance of the arena centre
    pub safe_radius: f32,
    pub wall_margin: f32,
    /// Minimum gap between two obstacles
    pub gap: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            count: 8,
            min_size: 60.0,
            max_size: 140.0,
            safe_radius: 350.0,
            wall_margin: 60.0,
            gap: 20.0,
        }
    }
}

/// Complete balance sheet for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Frame deltas are clamped to this before any logic runs
    pub max_frame_dt: f32,
    pub player: PlayerTuning,
    pub enemies: EnemyTuning,
    pub waves: WaveTuning,
    pub combat: CombatTuning,
    pub ultimate: UltimateTuning,
    pub pickups: PickupTuning,
    pub obstacles: ObstacleTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: 2400.0,
            arena_height: 2400.0,
            max_frame_dt: 0.05,
            player: PlayerTuning::default(),
            enemies: EnemyTuning::default(),
            waves: WaveTuning::default(),
            combat: CombatTuning::default(),
            ultimate: UltimateTuning::default(),
            pickups: PickupTuning::default(),
            obstacles: ObstacleTuning::default(),
        }
    }
}

impl Tuning {
    /// Arena size as a vector
    pub fn arena(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width, self.arena_height)
    }

    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load tuning from disk, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(err) => {
                    log::warn!("Invalid tuning file {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Cannot read tuning file {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "waves": { "boss_interval": 3 }, "combat": { "combo_window": 1.0 } }"#)
            .expect("valid tuning");
        assert_eq!(tuning.waves.boss_interval, 3);
        assert_eq!(tuning.combat.combo_window, 1.0);
        assert_eq!(tuning.waves.spawn_min_dist, 300.0);
        assert_eq!(tuning.enemies.tank.shield_reduction, 0.7);
        // Nested default, not the derived zero
        assert_eq!(tuning.enemies.chaser.stats.hp, 50.0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default("/definitely/not/here.json");
        assert_eq!(tuning.arena_width, 2400.0);
    }

    #[test]
    fn test_stats_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.enemies.stats(ArchetypeKind::Tank).hp, 200.0);
        assert_eq!(tuning.enemies.stats(ArchetypeKind::Boss).radius, 60.0);
    }
}
