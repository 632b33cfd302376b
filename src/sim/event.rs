//! Notifications emitted by the simulation for the render/audio/VFX layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::{AugmentKind, TrialRecord};
use super::enemy::ArchetypeKind;
use super::pickup::PowerUp;

/// Who an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRef {
    Player,
    Enemy(u32),
}

/// Visual kind of an area effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaKind {
    Explosion,
    Slam,
    Shockwave,
    ToxicPool,
    RingBurst,
    UltimatePulse,
    /// Player's dash-end shockwave
    DashShockwave,
}

/// Something the outside world may want to show or play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawn {
        archetype: ArchetypeKind,
        pos: Vec2,
    },
    Death {
        pos: Vec2,
        color: u32,
        particle_count: u32,
    },
    DamageFlash {
        actor: ActorRef,
    },
    /// A shot bounced off a directional shield
    Deflect {
        pos: Vec2,
    },
    AreaEffect {
        pos: Vec2,
        radius: f32,
        color: u32,
        kind: AreaKind,
    },
    ScoreChanged {
        score: u64,
    },
    ComboTier {
        tier: u8,
        combo: u32,
    },
    TrialStateChanged(TrialRecord),
    AugmentUnlocked(AugmentKind),
    WaveStarted {
        wave: u32,
        boss: Option<ArchetypeKind>,
    },
    WaveCleared {
        wave: u32,
    },
    BossDefeated {
        archetype: ArchetypeKind,
        pos: Vec2,
    },
    UltimateFired {
        pos: Vec2,
    },
    PickupSpawned {
        kind: PowerUp,
        pos: Vec2,
    },
    PickupCollected {
        kind: PowerUp,
        pos: Vec2,
    },
    /// Reflex dash paid off: fire-rate buff started
    ReflexTriggered {
        phased: u32,
    },
    LevelUp {
        level: u32,
    },
    PlayerDied {
        pos: Vec2,
    },
}
