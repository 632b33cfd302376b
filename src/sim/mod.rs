//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Frame delta clamped before any logic runs
//! - No rendering or platform dependencies

pub mod arc;
pub mod combat;
pub mod enemy;
pub mod entity;
pub mod event;
pub mod hazard;
pub mod obstacle;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod wave;

pub use arc::ShieldArc;
pub use combat::{AugmentKind, Battlefield, Combat, ComboState, TrialRecord, TrialState, UltimateState};
pub use enemy::{Archetype, ArchetypeKind, Enemy, HitOutcome};
pub use entity::{Body, Multipliers};
pub use event::{ActorRef, AreaKind, GameEvent};
pub use hazard::{AreaField, Faction};
pub use obstacle::Obstacle;
pub use pickup::{Pickup, PickupManager, PowerUp};
pub use player::{DashShockwave, Player, Upgrade};
pub use projectile::{Owner, Projectile, ProjectileKind};
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use wave::{Placement, Viewport, WaveDirector, WaveInfo, WaveSpec};
