//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Order per frame:
//! player, wave director, enemies, projectiles and fields, obstacles, pickups,
//! ultimate, combat resolution, then combo/ultimate timers.

use glam::Vec2;

use super::combat::Battlefield;
use super::enemy::{EnemyCtx, EnemyOutbox};
use super::event::GameEvent;
use super::obstacle;
use super::state::{GamePhase, GameState};
use super::wave::{SpawnCtx, Viewport};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement direction, normalized or zero
    pub move_dir: Vec2,
    /// World point the player aims at
    pub aim: Vec2,
    pub fire: bool,
    pub dash: bool,
    pub ultimate: bool,
    /// Pause toggle
    pub pause: bool,
    /// Camera rectangle; defaults to a view centred on the player
    pub viewport: Option<Viewport>,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    // A stalled frame must not turn into one huge logic jump
    let dt = dt.clamp(0.0, state.tuning.max_frame_dt);
    if dt <= 0.0 {
        return;
    }
    state.time += dt;
    state.time_ticks += 1;

    let tuning = &state.tuning;
    let arena = tuning.arena();

    // Player
    state
        .player
        .update(dt, input.move_dir, input.dash, input.aim, &tuning.player, arena);
    let shots = state.player.try_fire(input.fire, &tuning.player);
    state.player_shots.extend(shots);
    let player_pos = state.player.pos;

    // Wave director
    let viewport = input
        .viewport
        .unwrap_or_else(|| Viewport::centered(player_pos, arena));
    {
        let mut spawn = SpawnCtx {
            tuning,
            rng: &mut state.rng,
            next_id: &mut state.next_id,
            events: &mut state.events,
        };
        state
            .director
            .update(dt, &mut state.enemies, player_pos, &viewport, &mut spawn);
    }

    // Enemies see one snapshot of the player and write only to themselves
    let mut outbox = EnemyOutbox::default();
    {
        let mut ctx = EnemyCtx {
            tuning,
            rng: &mut state.rng,
            time: state.time,
            out: &mut outbox,
        };
        for enemy in state.enemies.iter_mut() {
            enemy.update(dt, player_pos, &mut ctx);
        }
    }
    state.enemy_shots.append(&mut outbox.projectiles);
    state.fields.append(&mut outbox.fields);
    state.events.append(&mut outbox.events);

    // Projectiles and area fields
    for shot in state.player_shots.iter_mut().chain(state.enemy_shots.iter_mut()) {
        shot.update(dt, arena);
    }
    state.fields.retain_mut(|field| field.tick(dt));

    // Obstacles
    let player = &mut state.player;
    player.pos = obstacle::resolve_circle(&state.obstacles, player.pos, player.radius);
    for enemy in state.enemies.iter_mut() {
        enemy.body.pos = obstacle::resolve_circle(&state.obstacles, enemy.body.pos, enemy.body.radius);
    }
    obstacle::block_projectiles(&state.obstacles, &mut state.player_shots);
    obstacle::block_projectiles(&state.obstacles, &mut state.enemy_shots);

    // Pickups
    let collected = state.pickups.update(
        dt,
        state.player.pos,
        state.player.radius,
        &state.obstacles,
        arena,
        &tuning.pickups,
        &mut state.rng,
        &mut state.events,
    );
    for powerup in collected {
        log::debug!("Picked up {powerup:?}");
        state.player.apply_powerup(powerup, &tuning.player);
    }
    state.fields.extend(state.player.drain_ghost_trail());

    // Combat
    let mut field = Battlefield {
        player: &mut state.player,
        enemies: &mut state.enemies,
        player_shots: &mut state.player_shots,
        enemy_shots: &mut state.enemy_shots,
        fields: &mut state.fields,
    };
    if input.ultimate {
        state.combat.fire_ultimate(&mut field, tuning, &mut state.events);
    }
    let resolution = state.combat.resolve(
        dt,
        &mut field,
        &outbox.blasts,
        &outbox.strikes,
        tuning,
        &mut state.events,
    );

    for removed in &resolution.removed {
        state.director.on_enemy_killed(&removed.enemy, &tuning.waves);
        if !removed.credited {
            continue;
        }
        let levels = state.player.gain_xp(removed.enemy.xp, &tuning.player);
        if levels > 0 {
            state.pending_level_ups += levels;
            state.director.set_player_level(state.player.level, &tuning.waves);
            log::info!("Level up: {}", state.player.level);
            state.events.push(GameEvent::LevelUp {
                level: state.player.level,
            });
        }
    }

    state.combat.tick(dt, tuning);

    if !state.player.alive() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over on wave {} with score {}",
            state.director.wave,
            state.combat.score
        );
        state.events.push(GameEvent::PlayerDied { pos: state.player.pos });
    }

    state.normalize_order();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::enemy::{ArchetypeKind, Enemy};
    use crate::sim::entity::Multipliers;
    use crate::sim::obstacle::Obstacle;
    use crate::sim::pickup::{Pickup, PowerUp};
    use crate::sim::player::Upgrade;
    use crate::sim::projectile::Projectile;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(42, Tuning::default())
    }

    fn add_enemy(state: &mut GameState, kind: ArchetypeKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        let enemy = Enemy::spawn(
            id,
            kind,
            pos,
            &Multipliers::default(),
            1,
            &state.tuning,
            &mut state.rng,
        );
        state.enemies.push(enemy);
        id
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = state();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused ticks don't advance time
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = state();
        tick(&mut state, &TickInput::default(), 10.0);
        assert!((state.time - state.tuning.max_frame_dt).abs() < 1e-6);
    }

    #[test]
    fn test_first_wave_starts() {
        let mut state = state();
        let input = TickInput::default();
        let steps = (state.tuning.waves.first_wave_delay / SIM_DT) as u32 + 2;
        for _ in 0..steps {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.director.wave, 1);
        assert!(state.director.wave_active);
        assert!(!state.enemies.is_empty());
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::WaveStarted { wave: 1, .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Spawn { .. })));
    }

    #[test]
    fn test_kill_awards_xp_and_score() {
        let mut state = state();
        state.obstacles.clear();
        let player = state.player.pos;
        let id = add_enemy(&mut state, ArchetypeKind::Chaser, player + Vec2::new(200.0, 0.0));
        state.enemies[0].body.hp = 1.0;

        let input = TickInput {
            fire: true,
            aim: player + Vec2::new(200.0, 0.0),
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut state, &input, SIM_DT);
            if !state.enemies.iter().any(|e| e.id == id) {
                break;
            }
        }
        assert!(!state.enemies.iter().any(|e| e.id == id));
        assert!(state.combat.score > 0);
        assert!(state.player.xp > 0 || state.player.level > 1);
        assert_eq!(state.director.total_killed, 1);
    }

    #[test]
    fn test_player_death_ends_game() {
        let mut state = state();
        state.player.hp = 1.0;
        let player = state.player.pos;
        add_enemy(&mut state, ArchetypeKind::Chaser, player);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerDied { .. })));

        // Nothing moves after game over
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_walking_onto_pickup_grants_buff() {
        let mut state = state();
        state.pickups.spawn_timer = 1000.0;
        let player = state.player.pos;
        state.pickups.pickups.push(Pickup {
            pos: player + Vec2::new(60.0, 0.0),
            kind: PowerUp::DoubleDamage,
            radius: state.tuning.pickups.radius,
            lifetime: state.tuning.pickups.lifetime,
        });

        let input = TickInput {
            move_dir: Vec2::X,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut state, &input, SIM_DT);
            if state.pickups.pickups.is_empty() {
                break;
            }
        }
        assert!(state.pickups.pickups.is_empty());
        assert!(state.player.double_damage_timer > 0.0);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PickupCollected { kind: PowerUp::DoubleDamage, .. })));
    }

    #[test]
    fn test_obstacles_stop_player_and_bullets() {
        let mut state = state();
        let player = state.player.pos;
        let block = Obstacle::new(player + Vec2::new(40.0, -100.0), Vec2::new(100.0, 200.0));
        state.obstacles = vec![block];
        state
            .enemy_shots
            .push(Projectile::enemy(player + Vec2::new(200.0, 0.0), std::f32::consts::PI, 300.0, 5.0));

        let input = TickInput {
            move_dir: Vec2::X,
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(!block.collides_circle(state.player.pos, state.player.radius - 0.01));
        assert!(state.player.pos.x < block.min.x);
        assert!(state.enemy_shots.is_empty());
        assert_eq!(state.player.hp, state.player.max_hp);
    }

    #[test]
    fn test_ghost_trail_lands_in_fields() {
        let mut state = state();
        state.obstacles.clear();
        state.player.apply_upgrade(Upgrade::GhostDash);
        let input = TickInput {
            move_dir: Vec2::X,
            dash: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.player.ghost_trail.is_empty());
        assert!(!state.fields.is_empty());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut state = state();
            let input = TickInput {
                fire: true,
                move_dir: Vec2::X,
                ..Default::default()
            };
            for i in 0..600 {
                let mut input = input.clone();
                input.aim = state
                    .enemies
                    .first()
                    .map_or(Vec2::ZERO, |e| e.pos());
                input.dash = i % 120 == 0;
                tick(&mut state, &input, SIM_DT);
            }
            (
                state.combat.score,
                state.enemies.len(),
                state.player.pos,
                state.director.wave,
            )
        };
        assert_eq!(run(), run());
    }
}
