//! Wave Director: when and what to spawn, difficulty scaling, boss rotation

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{ArchetypeKind, Enemy};
use super::entity::Multipliers;
use super::event::GameEvent;
use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::polar_to_cartesian;
use crate::tuning::{Tuning, WaveTuning};

/// Axis-aligned camera rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min: Vec2,
    pub max: Vec2,
}

impl Viewport {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Default camera: a `VIEW_WIDTH` x `VIEW_HEIGHT` window centred on
    /// `center`, shifted to stay inside the arena when it fits
    pub fn centered(center: Vec2, arena: Vec2) -> Self {
        let size = Vec2::new(VIEW_WIDTH, VIEW_HEIGHT);
        let half = size / 2.0;
        let lo = Vec2::new(
            (center.x - half.x).clamp(0.0, (arena.x - size.x).max(0.0)),
            (center.y - half.y).clamp(0.0, (arena.y - size.y).max(0.0)),
        );
        Self::new(lo, lo + size)
    }

    /// Whether `p` lies strictly inside the rectangle grown by `margin` on every side
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x > self.min.x - margin && p.x < self.max.x + margin && p.y > self.min.y - margin && p.y < self.max.y + margin
    }
}

/// Where a spawn ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Sampled outside the camera and far enough from the player
    Sampled(Vec2),
    /// Retry budget exhausted; offset from the player instead
    Fallback(Vec2),
}

impl Placement {
    pub fn pos(self) -> Vec2 {
        match self {
            Self::Sampled(p) | Self::Fallback(p) => p,
        }
    }
}

/// Composition and scaling of one wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    pub chasers: u32,
    pub shooters: u32,
    pub tanks: u32,
    pub shield_guards: u32,
    pub bombers: u32,
    pub multipliers: Multipliers,
    /// Boss waves spawn one boss plus `chasers` as escort
    pub boss_wave: bool,
}

impl WaveSpec {
    pub fn total(&self) -> u32 {
        self.chasers + self.shooters + self.tanks + self.shield_guards + self.bombers + u32::from(self.boss_wave)
    }

    /// The non-boss roster, in type order
    fn roster(&self) -> Vec<ArchetypeKind> {
        let mut kinds = Vec::with_capacity(self.total() as usize);
        for (kind, count) in [
            (ArchetypeKind::Chaser, self.chasers),
            (ArchetypeKind::Shooter, self.shooters),
            (ArchetypeKind::Tank, self.tanks),
            (ArchetypeKind::ShieldGuard, self.shield_guards),
            (ArchetypeKind::SuicideBomber, self.bombers),
        ] {
            kinds.extend(std::iter::repeat_n(kind, count as usize));
        }
        kinds
    }
}

/// Snapshot for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveInfo {
    pub wave: u32,
    pub enemies_alive: usize,
    pub queued: usize,
    pub total_killed: u32,
    pub announcing: bool,
    pub boss_active: bool,
    pub difficulty: f32,
}

/// Mutable references the director needs to spawn enemies
pub struct SpawnCtx<'a> {
    pub tuning: &'a Tuning,
    pub rng: &'a mut Pcg32,
    pub next_id: &'a mut u32,
    pub events: &'a mut Vec<GameEvent>,
}

impl SpawnCtx<'_> {
    fn alloc_id(&mut self) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        id
    }
}

/// Schedules waves and owns the difficulty curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub wave: u32,
    /// True from wave start until the queue is empty and every enemy is dead
    pub wave_active: bool,
    /// Countdown to the next wave while on break
    pub wave_timer: f32,
    spawn_timer: f32,
    queue: VecDeque<ArchetypeKind>,
    multipliers: Multipliers,
    player_level: u32,
    /// Permanent bonus from defeated bosses
    boss_bonus: f32,
    difficulty_factor: f32,
    active_boss: Option<u32>,
    pub bosses_defeated: u32,
    enemies_alive: usize,
    pub total_killed: u32,
    announcement_timer: f32,
}

impl WaveDirector {
    pub fn new(t: &WaveTuning) -> Self {
        Self {
            wave: 0,
            wave_active: false,
            wave_timer: t.first_wave_delay,
            spawn_timer: 0.0,
            queue: VecDeque::new(),
            multipliers: Multipliers::default(),
            player_level: 1,
            boss_bonus: 0.0,
            difficulty_factor: 1.0,
            active_boss: None,
            bosses_defeated: 0,
            enemies_alive: 0,
            total_killed: 0,
            announcement_timer: 0.0,
        }
    }

    pub fn difficulty_factor(&self) -> f32 {
        self.difficulty_factor
    }

    /// ID of the boss currently alive, if any
    pub fn active_boss(&self) -> Option<u32> {
        self.active_boss
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Rescale difficulty for a new player level. Never lowers it.
    pub fn set_player_level(&mut self, level: u32, t: &WaveTuning) {
        self.player_level = self.player_level.max(level);
        self.recompute_difficulty(t);
    }

    fn recompute_difficulty(&mut self, t: &WaveTuning) {
        let from_level = (self.player_level.saturating_sub(1)) as f32 * t.difficulty_per_level;
        let next = 1.0 + from_level + self.boss_bonus;
        self.difficulty_factor = self.difficulty_factor.max(next);
    }

    pub fn is_boss_wave(wave: u32, t: &WaveTuning) -> bool {
        t.boss_interval > 0 && wave > 0 && wave % t.boss_interval == 0
    }

    /// Composition and multipliers for wave `n` at the current difficulty
    pub fn generate_wave(&self, n: u32, t: &WaveTuning) -> WaveSpec {
        let grown = n.saturating_sub(1) as f32;
        let excess = self.difficulty_factor - 1.0;
        let level_term = |per_level: f32| {
            if t.difficulty_per_level > 0.0 {
                1.0 + excess * per_level / t.difficulty_per_level
            } else {
                1.0 + excess
            }
        };
        let multipliers = Multipliers {
            hp: (1.0 + grown * t.hp_per_wave) * level_term(t.hp_per_level),
            speed: (1.0 + grown * t.speed_per_wave) * level_term(t.speed_per_level),
            damage: (1.0 + grown * t.damage_per_wave) * level_term(t.damage_per_level),
        };

        if Self::is_boss_wave(n, t) {
            return WaveSpec {
                chasers: t.boss_escort,
                shooters: 0,
                tanks: 0,
                shield_guards: 0,
                bombers: 0,
                multipliers,
                boss_wave: true,
            };
        }

        WaveSpec {
            chasers: (3 + n * 2).min(t.max_chasers),
            shooters: n.saturating_sub(1).min(t.max_shooters),
            tanks: (n.saturating_sub(3) / 2).min(t.max_tanks),
            shield_guards: if n >= 5 { ((n - 3) / 2).min(t.max_shield_guards) } else { 0 },
            bombers: if n >= 3 { ((n - 1) / 2).min(t.max_bombers) } else { 0 },
            multipliers,
            boss_wave: false,
        }
    }

    /// Pick a spawn point outside the camera and away from the player
    pub fn spawn_position(
        player: Vec2,
        viewport: &Viewport,
        t: &WaveTuning,
        arena: Vec2,
        rng: &mut Pcg32,
    ) -> Placement {
        let pad = t.spawn_wall_padding;
        let clamp = |p: Vec2| {
            Vec2::new(
                p.x.clamp(pad, (arena.x - pad).max(pad)),
                p.y.clamp(pad, (arena.y - pad).max(pad)),
            )
        };
        let near = t.spawn_edge_min;
        let far = t.spawn_margin.max(near);
        let (lo, hi) = (viewport.min, viewport.max);

        for _ in 0..t.spawn_attempts {
            let side = rng.random_range(0..4);
            let out = if far > near { rng.random_range(near..far) } else { near };
            let along_x = rng.random_range(lo.x - far..=hi.x + far);
            let along_y = rng.random_range(lo.y - far..=hi.y + far);
            let candidate = match side {
                0 => Vec2::new(along_x, lo.y - out),
                1 => Vec2::new(along_x, hi.y + out),
                2 => Vec2::new(lo.x - out, along_y),
                _ => Vec2::new(hi.x + out, along_y),
            };
            let candidate = clamp(candidate);
            if !viewport.contains(candidate, near) && candidate.distance(player) >= t.spawn_min_dist {
                return Placement::Sampled(candidate);
            }
        }

        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let pos = clamp(player + polar_to_cartesian(t.spawn_min_dist + 100.0, angle));
        log::debug!("Spawn search exhausted, falling back to {pos:?}");
        Placement::Fallback(pos)
    }

    fn spawn(&mut self, kind: ArchetypeKind, pos: Vec2, enemies: &mut Vec<Enemy>, ctx: &mut SpawnCtx) -> u32 {
        let id = ctx.alloc_id();
        let enemy = Enemy::spawn(id, kind, pos, &self.multipliers, self.wave, ctx.tuning, ctx.rng);
        ctx.events.push(GameEvent::Spawn { archetype: kind, pos });
        enemies.push(enemy);
        id
    }

    fn spawn_placed(
        &mut self,
        kind: ArchetypeKind,
        player: Vec2,
        viewport: &Viewport,
        enemies: &mut Vec<Enemy>,
        ctx: &mut SpawnCtx,
    ) -> u32 {
        let arena = ctx.tuning.arena();
        let pos = Self::spawn_position(player, viewport, &ctx.tuning.waves, arena, ctx.rng).pos();
        self.spawn(kind, pos, enemies, ctx)
    }

    /// Turn queued boss minion points into chasers
    fn relay_minions(&mut self, enemies: &mut Vec<Enemy>, ctx: &mut SpawnCtx) {
        let pad = ctx.tuning.waves.spawn_wall_padding;
        let arena = ctx.tuning.arena();
        let points: Vec<Vec2> = enemies.iter_mut().flat_map(|e| e.drain_minions()).collect();
        for p in points {
            let pos = crate::clamp_to_arena(p, pad, arena);
            self.spawn(ArchetypeKind::Chaser, pos, enemies, ctx);
        }
    }

    fn start_wave(&mut self, enemies: &mut Vec<Enemy>, player: Vec2, viewport: &Viewport, ctx: &mut SpawnCtx) {
        let t = &ctx.tuning.waves;
        self.wave += 1;
        self.wave_active = true;
        self.announcement_timer = t.announcement_time;

        let spec = self.generate_wave(self.wave, t);
        self.multipliers = spec.multipliers;

        let mut boss = None;
        if spec.boss_wave && self.active_boss.is_none() {
            let kind = ArchetypeKind::BOSSES[ctx.rng.random_range(0..ArchetypeKind::BOSSES.len())];
            let id = self.spawn_placed(kind, player, viewport, enemies, ctx);
            self.active_boss = Some(id);
            boss = Some(kind);
            log::info!("Wave {}: boss {kind:?} (id {id}) with {} escorts", self.wave, spec.chasers);
            for _ in 0..spec.chasers {
                self.spawn_placed(ArchetypeKind::Chaser, player, viewport, enemies, ctx);
            }
        } else {
            let mut roster = spec.roster();
            roster.shuffle(ctx.rng);
            self.queue = roster.into();
            self.spawn_timer = 0.0;
            log::info!("Wave {}: {} enemies, difficulty {:.2}", self.wave, spec.total(), self.difficulty_factor);
        }
        ctx.events.push(GameEvent::WaveStarted { wave: self.wave, boss });
    }

    /// Advance the director. Returns true on the tick a new wave starts.
    pub fn update(
        &mut self,
        dt: f32,
        enemies: &mut Vec<Enemy>,
        player: Vec2,
        viewport: &Viewport,
        ctx: &mut SpawnCtx,
    ) -> bool {
        self.announcement_timer = (self.announcement_timer - dt).max(0.0);
        self.relay_minions(enemies, ctx);

        if let Some(id) = self.active_boss {
            if !enemies.iter().any(|e| e.id == id && !e.is_dead()) {
                // Removed without passing through on_enemy_killed
                self.active_boss = None;
            }
        }

        let mut started = false;
        if !self.wave_active {
            self.wave_timer = (self.wave_timer - dt).max(0.0);
            if self.wave_timer <= 0.0 {
                self.start_wave(enemies, player, viewport, ctx);
                started = true;
            }
        }

        if self.wave_active {
            // The opening spawn of a wave lands on its start tick
            if !started {
                self.spawn_timer -= dt;
            }
            while self.spawn_timer <= 0.0 {
                let Some(kind) = self.queue.pop_front() else {
                    break;
                };
                self.spawn_placed(kind, player, viewport, enemies, ctx);
                self.spawn_timer += ctx.tuning.waves.spawn_interval.max(f32::EPSILON);
            }
        }

        self.enemies_alive = enemies.iter().filter(|e| !e.is_dead()).count();
        if self.wave_active && !started && self.queue.is_empty() && self.enemies_alive == 0 {
            self.wave_active = false;
            self.wave_timer = ctx.tuning.waves.break_time;
            log::info!("Wave {} cleared", self.wave);
            ctx.events.push(GameEvent::WaveCleared { wave: self.wave });
        }
        started
    }

    /// Book-keeping for any enemy death, including environment kills
    pub fn on_enemy_killed(&mut self, enemy: &Enemy, t: &WaveTuning) {
        self.total_killed += 1;
        if self.active_boss == Some(enemy.id) {
            self.active_boss = None;
            self.bosses_defeated += 1;
            self.boss_bonus += t.boss_difficulty_bonus;
            self.recompute_difficulty(t);
            log::info!(
                "Boss {:?} defeated; difficulty now {:.2}",
                enemy.kind,
                self.difficulty_factor
            );
        }
    }

    pub fn wave_info(&self) -> WaveInfo {
        WaveInfo {
            wave: self.wave,
            enemies_alive: self.enemies_alive,
            queued: self.queue.len(),
            total_killed: self.total_killed,
            announcing: self.announcement_timer > 0.0,
            boss_active: self.active_boss.is_some(),
            difficulty: self.difficulty_factor,
        }
    }
}
