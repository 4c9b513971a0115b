//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (velocities in px/tick, timers in ticks)
//! - Seeded RNG only
//! - Stable iteration order (insertion order within each pool)
//! - No rendering or platform dependencies

pub mod ai;
pub mod boss;
pub mod collision;
pub mod effects;
pub mod geometry;
pub mod spawner;
pub mod state;
pub mod stats;
pub mod store;
pub mod tether;
pub mod tick;

pub use boss::{AttackPattern, BossSignal, BossState};
pub use collision::{CombatContext, Resolution};
pub use spawner::{WaveComposition, WaveState};
pub use state::{
    Boss, ComboTracker, Enemy, EnemyKind, EntityId, FloatingText, Outcome, Palette, Particle,
    ParticleBehavior, Player, PlayerRole, PowerUp, PowerUpKind, World,
};
pub use stats::{MatchEvent, MatchEvents, MatchStats, NoopEvents};
pub use store::{Entity, EntityKind, EntityStore, Pool};
pub use tether::Tether;
pub use tick::{TickInput, TickReport, tick};
