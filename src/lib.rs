//! Synchronicity - a tethered two-player arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, tether, AI, bosses, combat)
//! - `game_loop`: Fixed-timestep driver with pause and rebuild handling
//! - `renderer`: CPU-side frame meshes for whatever backend draws them
//! - `input`: Keyboard bindings for both cores, plus the demo autopilot
//! - `session`: Screen flow around the simulation (tutorial, transitions, retries)
//! - `narrative`: Story log requests and offline fallbacks
//! - `settings`: User preferences and control bindings

pub mod game_loop;
pub mod input;
pub mod narrative;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use game_loop::GameLoop;
pub use session::{ScreenState, Session};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz; velocities are px/tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 1024.0;
    pub const ARENA_HEIGHT: f32 = 768.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 12.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Ticks of contact immunity after a player is hit
    pub const PLAYER_INVULN_TICKS: u32 = 60;
    pub const TRAIL_LENGTH: usize = 12;

    /// Tether
    pub const MAX_TETHER_DISTANCE: f32 = 350.0;
    pub const OVERDRIVE_DISTANCE: f32 = 150.0;
    pub const TETHER_DAMAGE_WIDTH: f32 = 8.0;
    /// Damage per tick to anything touching the beam
    pub const TETHER_DAMAGE: f32 = 10.0;
    pub const OVERDRIVE_MULTIPLIER: f32 = 3.0;
    /// Severed beam drains integrity at this cadence
    pub const SEVERED_DRAIN_INTERVAL: u32 = 60;
    pub const SEVERED_DRAIN_DAMAGE: f32 = 2.0;

    /// Resonance
    pub const RESONANCE_MAX: f32 = 100.0;
    pub const RESONANCE_COOLDOWN: u32 = 300;
    pub const RESONANCE_PER_ORB: f32 = 2.0;
    pub const BURST_RADIUS: f32 = 450.0;
    pub const BURST_BOSS_DAMAGE: f32 = 400.0;
    /// Cores this close together trigger a charged burst
    pub const CORE_MERGE_DISTANCE: f32 = PLAYER_RADIUS * 2.0 + 4.0;

    /// Combo
    pub const COMBO_WINDOW_TICKS: u32 = 120;
    pub const COMBO_BONUS_STEP: f32 = 0.1;
    pub const COMBO_MAX_MULTIPLIER: f32 = 3.0;

    /// Power-ups
    pub const POWERUP_INTERVAL: u32 = 600;
    pub const POWERUP_LIFE: u32 = 600;
    pub const POWERUP_RADIUS: f32 = 10.0;
    pub const REPAIR_AMOUNT: f32 = 20.0;
    pub const CHARGE_AMOUNT: f32 = 25.0;

    /// Boss
    pub const BOSS_RADIUS: f32 = 50.0;
    pub const BOSS_PHASES: u32 = 3;
    pub const BOSS_INTRO_TICKS: u32 = 90;
    pub const BOSS_BASE_HP: f32 = 3000.0;
    pub const BOSS_HP_PER_TIER: f32 = 1500.0;
    pub const BOSS_BASE_ATTACK_PERIOD: u32 = 180;
    pub const BOSS_ATTACK_PERIOD_STEP: u32 = 50;
    pub const BOSS_CONTACT_DAMAGE: f32 = 20.0;
    pub const BOSS_SCORE: f32 = 5000.0;

    /// Progression
    pub const MAX_LEVEL: u32 = 20;
    pub const BOSS_LEVEL_INTERVAL: u32 = 5;

    /// Match stats at a fresh start
    pub const INITIAL_INTEGRITY: f32 = 100.0;
    pub const INITIAL_RESONANCE: f32 = 100.0;
}

/// True when `level` is a boss encounter
#[inline]
pub fn is_boss_level(level: u32) -> bool {
    level > 0 && level.is_multiple_of(consts::BOSS_LEVEL_INTERVAL)
}

/// Center of the arena
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}

/// Wrap a position around the arena edges (torus topology)
#[inline]
pub fn wrap_position(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.rem_euclid(consts::ARENA_WIDTH),
        pos.y.rem_euclid(consts::ARENA_HEIGHT),
    )
}

/// Clamp a circle of `radius` so it stays fully inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, radius: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, consts::ARENA_WIDTH - radius),
        pos.y.clamp(radius, consts::ARENA_HEIGHT - radius),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_levels() {
        assert!(is_boss_level(5));
        assert!(is_boss_level(20));
        assert!(!is_boss_level(6));
        assert!(!is_boss_level(0));
    }

    #[test]
    fn test_wrap_position() {
        let p = wrap_position(Vec2::new(-4.0, consts::ARENA_HEIGHT + 10.0));
        assert!((p.x - (consts::ARENA_WIDTH - 4.0)).abs() < 0.001);
        assert!((p.y - 10.0).abs() < 0.001);
    }
}
