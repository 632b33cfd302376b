//! Neon Arena headless runner
//!
//! Plays a match with a scripted autopilot and prints a JSON summary.
//!
//! Usage: `neon-arena [tuning.json] [seed] [seconds] [upgrades]`
//!
//! `upgrades` is a comma-separated preference list of upgrade keys, e.g.
//! `railgun,fire_rate,ghost_dash`. Level-ups take the first preferred
//! option on offer, otherwise the first option.

use glam::Vec2;
use serde::Serialize;

use neon_arena::Tuning;
use neon_arena::consts::*;
use neon_arena::sim::{GameEvent, GamePhase, GameState, TickInput, Upgrade, WaveInfo, tick};

/// Host frame rate the runner pretends to render at
const HOST_DT: f32 = 1.0 / 50.0;

/// Enemies closer than this make the autopilot back off
const KITE_DIST: f32 = 220.0;

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    seconds: f32,
    phase: GamePhase,
    score: u64,
    level: u32,
    hp: f32,
    wave: WaveInfo,
    bosses_defeated: u32,
    augments: Vec<String>,
    upgrades: Vec<String>,
    events: usize,
}

/// Steer toward open space, aim at the nearest enemy
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos;
    let nearest = state
        .enemies
        .iter()
        .filter(|e| !e.is_dead())
        .min_by(|a, b| {
            a.pos()
                .distance_squared(player)
                .total_cmp(&b.pos().distance_squared(player))
        });

    let mut input = TickInput {
        fire: nearest.is_some(),
        ultimate: state.combat.ultimate.is_ready(&state.tuning.ultimate),
        ..Default::default()
    };

    // Circle the arena centre so the player doesn't sit in a corner
    let center = state.arena() * 0.5;
    let orbit = (player - center).perp().normalize_or_zero();
    input.move_dir = orbit;

    if let Some(enemy) = nearest {
        input.aim = enemy.pos();
        let dist = enemy.pos().distance(player);
        if dist < KITE_DIST {
            let away = (player - enemy.pos()).normalize_or_zero();
            input.move_dir = (away + orbit * 0.5).normalize_or_zero();
            input.dash = dist < KITE_DIST * 0.4;
        }
    }
    if input.move_dir == Vec2::ZERO {
        input.move_dir = Vec2::X;
    }
    input
}

/// Parse the upgrade preference list, skipping unknown keys
fn parse_upgrades(list: &str) -> Vec<Upgrade> {
    list.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .filter_map(|key| {
            let upgrade = Upgrade::from_key(key);
            if upgrade.is_none() {
                log::warn!("Unknown upgrade key '{key}', ignoring");
            }
            upgrade
        })
        .collect()
}

/// First preferred upgrade on offer, else the first offer
fn pick_upgrade(options: &[Upgrade], preferred: &[Upgrade]) -> Option<Upgrade> {
    preferred
        .iter()
        .find(|u| options.contains(u))
        .or_else(|| options.first())
        .copied()
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let preferred = args.next().map(|list| parse_upgrades(&list)).unwrap_or_default();

    log::info!("Neon Arena (headless) starting, seed {seed}, {seconds}s");

    let mut state = GameState::new(seed, tuning);
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut event_count = 0;

    while elapsed < seconds && state.phase != GamePhase::GameOver {
        elapsed += HOST_DT;
        accumulator += HOST_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = autopilot(&state);
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        while state.pending_level_ups > 0 {
            let Some(pick) = pick_upgrade(&state.upgrade_options(3), &preferred) else {
                state.pending_level_ups = 0;
                break;
            };
            state.apply_upgrade(pick);
        }

        for event in state.drain_events() {
            event_count += 1;
            match event {
                GameEvent::BossDefeated { archetype, .. } => {
                    log::info!("Boss down: {archetype:?}");
                }
                GameEvent::AugmentUnlocked(augment) => {
                    log::info!("Augment unlocked: {augment:?}");
                }
                _ => {}
            }
        }
    }

    let summary = Summary {
        seed,
        seconds: state.time,
        phase: state.phase,
        score: state.score(),
        level: state.player.level,
        hp: state.player.hp,
        wave: state.wave_info(),
        bosses_defeated: state.director.bosses_defeated,
        augments: state
            .combat
            .ultimate
            .augments
            .iter()
            .map(|a| format!("{a:?}"))
            .collect(),
        upgrades: state
            .player
            .upgrades
            .iter()
            .map(|(u, level)| format!("{}:{level}", u.key()))
            .collect(),
        events: event_count,
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize summary: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upgrades_skips_unknown_keys() {
        let list = parse_upgrades("railgun, nope,ghost_dash,,reflex_dash");
        assert_eq!(list, vec![Upgrade::Railgun, Upgrade::GhostDash, Upgrade::ReflexDash]);
    }

    #[test]
    fn test_pick_prefers_listed_upgrade() {
        let options = [Upgrade::FireRate, Upgrade::Damage, Upgrade::DashShockwave];
        let preferred = [Upgrade::Railgun, Upgrade::DashShockwave];
        assert_eq!(pick_upgrade(&options, &preferred), Some(Upgrade::DashShockwave));
        assert_eq!(pick_upgrade(&options, &[]), Some(Upgrade::FireRate));
        assert_eq!(pick_upgrade(&[], &preferred), None);
    }
}
