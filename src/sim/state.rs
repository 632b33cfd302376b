//! Game state and core simulation types
//!
//! Everything one match needs lives here, so two states built from the same
//! seed and tuning and fed the same inputs stay identical.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::Combat;
use super::enemy::Enemy;
use super::event::GameEvent;
use super::hazard::AreaField;
use super::obstacle::{self, Obstacle};
use super::pickup::PickupManager;
use super::player::{Player, Upgrade};
use super::projectile::Projectile;
use super::wave::{WaveDirector, WaveInfo};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Player died
    GameOver,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulated seconds
    pub time: f32,
    pub time_ticks: u64,
    pub player: Player,
    /// Active enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub fields: Vec<AreaField>,
    /// Fixed for the whole match
    pub obstacles: Vec<Obstacle>,
    pub pickups: PickupManager,
    pub director: WaveDirector,
    pub combat: Combat,
    /// Level-ups waiting for an upgrade pick
    pub pending_level_ups: u32,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub tuning: Tuning,
    /// Next entity ID
    pub(crate) next_id: u32,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

impl GameState {
    /// Create a new match with the player in the centre of the arena
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(tuning.arena() * 0.5, &tuning.player);
        let director = WaveDirector::new(&tuning.waves);
        let mut rng = Pcg32::seed_from_u64(seed);
        let obstacles = obstacle::generate(&tuning.obstacles, tuning.arena(), &mut rng);
        log::info!("New match, seed {seed}, {} obstacles", obstacles.len());
        Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            time: 0.0,
            time_ticks: 0,
            player,
            enemies: Vec::new(),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            fields: Vec::new(),
            obstacles,
            pickups: PickupManager::new(&tuning.pickups),
            director,
            combat: Combat::new(),
            pending_level_ups: 0,
            events: Vec::new(),
            tuning,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Hand queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure enemies are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }

    pub fn arena(&self) -> Vec2 {
        self.tuning.arena()
    }

    pub fn score(&self) -> u64 {
        self.combat.score
    }

    pub fn wave_info(&self) -> WaveInfo {
        self.director.wave_info()
    }

    /// Upgrade choices for the next pending level-up
    pub fn upgrade_options(&mut self, n: usize) -> Vec<Upgrade> {
        if self.pending_level_ups == 0 {
            return Vec::new();
        }
        self.player.upgrade_options(&mut self.rng, n)
    }

    /// Spend one pending level-up. Returns false if none is pending or the
    /// upgrade is already maxed.
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) -> bool {
        if self.pending_level_ups == 0 || self.player.upgrade_level(upgrade) >= upgrade.max_level() {
            return false;
        }
        self.player.apply_upgrade(upgrade);
        self.pending_level_ups -= 1;
        log::info!("Upgrade {} -> level {}", upgrade.key(), self.player.upgrade_level(upgrade));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(7, Tuning::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.pos, state.arena() * 0.5);
        assert_eq!(state.score(), 0);
        // Player starts clear of every block
        let player = &state.player;
        assert!(state.obstacles.iter().all(|o| !o.collides_circle(player.pos, player.radius)));
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(7, Tuning::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_upgrade_needs_pending_level() {
        let mut state = GameState::new(7, Tuning::default());
        assert!(state.upgrade_options(3).is_empty());
        assert!(!state.apply_upgrade(Upgrade::FireRate));

        state.pending_level_ups = 1;
        assert_eq!(state.upgrade_options(3).len(), 3);
        assert!(state.apply_upgrade(Upgrade::FireRate));
        assert_eq!(state.pending_level_ups, 0);
        assert_eq!(state.player.upgrade_level(Upgrade::FireRate), 1);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(7, Tuning::default());
        state.events.push(GameEvent::LevelUp { level: 2 });
        assert_eq!(state.drain_events().len(), 1);
        assert!(state.drain_events().is_empty());
    }
}
