//! Entity types and the per-generation world
//!
//! A `World` is rebuilt from scratch on every level start or retry; nothing
//! from a previous generation survives into the next.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::BossState;
use super::spawner::WaveState;
use super::store::EntityStore;
use super::tether::Tether;
use crate::arena_center;
use crate::consts::*;

/// Unique entity identifier (never reused within a match)
pub type EntityId = u32;

/// Placeholder id for entities not yet handed to the store
pub const UNASSIGNED: EntityId = 0;

/// Color tags resolved to RGBA by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    Anchor,
    Follower,
    Chaser,
    Drifter,
    Dasher,
    Minion,
    Boss,
    Repair,
    Charge,
    Resonance,
    TextDamage,
    TextScore,
    White,
}

/// Fixed player roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    /// Red core, first control scheme
    Anchor,
    /// Blue core, second control scheme
    Follower,
}

impl PlayerRole {
    pub fn palette(&self) -> Palette {
        match self {
            PlayerRole::Anchor => Palette::Anchor,
            PlayerRole::Follower => Palette::Follower,
        }
    }
}

/// One of the two tethered cores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    pub role: PlayerRole,
    pub speed: f32,
    /// Movement applied last tick (used by dashers to lead their target)
    pub vel: Vec2,
    /// Ticks of contact immunity remaining
    pub invuln_ticks: u32,
    /// Recent positions, newest first
    pub trail: VecDeque<Vec2>,
}

impl Player {
    pub fn new(id: EntityId, role: PlayerRole, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            radius: PLAYER_RADIUS,
            active: true,
            role,
            speed: PLAYER_SPEED,
            vel: Vec2::ZERO,
            invuln_ticks: 0,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Record current position to trail, dropping the oldest past `max_len`
    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.push_front(self.pos);
        while self.trail.len() > max_len {
            self.trail.pop_back();
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_ticks > 0
    }
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Chaser,
    Drifter,
    Dasher,
    Minion,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Chaser,
        EnemyKind::Drifter,
        EnemyKind::Dasher,
        EnemyKind::Minion,
    ];

    /// Position in behavior and stat tables
    pub const fn index(self) -> usize {
        match self {
            EnemyKind::Chaser => 0,
            EnemyKind::Drifter => 1,
            EnemyKind::Dasher => 2,
            EnemyKind::Minion => 3,
        }
    }

    pub fn stats(self) -> &'static EnemyStats {
        &ENEMY_STATS[self.index()]
    }

    pub fn palette(self) -> Palette {
        match self {
            EnemyKind::Chaser => Palette::Chaser,
            EnemyKind::Drifter => Palette::Drifter,
            EnemyKind::Dasher => Palette::Dasher,
            EnemyKind::Minion => Palette::Minion,
        }
    }
}

/// Base numbers for an enemy archetype
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub hp: f32,
    pub radius: f32,
    /// Cruise speed (dashers use it for the dash itself)
    pub speed: f32,
    pub value: u32,
    pub contact_damage: f32,
    /// Lifetime in ticks, if the enemy expires on its own
    pub lifetime: Option<u32>,
}

const ENEMY_STATS: [EnemyStats; 4] = [
    EnemyStats { hp: 30.0, radius: 14.0, speed: 2.2, value: 100, contact_damage: 10.0, lifetime: None },
    EnemyStats { hp: 20.0, radius: 12.0, speed: 1.5, value: 75, contact_damage: 8.0, lifetime: None },
    EnemyStats { hp: 40.0, radius: 13.0, speed: 9.0, value: 150, contact_damage: 15.0, lifetime: None },
    EnemyStats { hp: 10.0, radius: 8.0, speed: 2.8, value: 25, contact_damage: 5.0, lifetime: Some(600) },
];

/// Stage of a dasher's attack cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashStage {
    Stalk,
    Telegraph,
    Dash,
    Cooldown,
}

/// Per-type AI memory carried between ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiState {
    /// Chasers and minions need no memory
    Seek,
    /// Current heading in radians
    Drift { heading: f32 },
    Dash { stage: DashStage, timer: u32, target: Vec2 },
}

impl AiState {
    pub fn initial(kind: EnemyKind, heading: f32) -> Self {
        match kind {
            EnemyKind::Chaser | EnemyKind::Minion => AiState::Seek,
            EnemyKind::Drifter => AiState::Drift { heading },
            EnemyKind::Dasher => AiState::Dash {
                stage: DashStage::Stalk,
                timer: super::ai::DASH_STALK_TICKS,
                target: Vec2::ZERO,
            },
        }
    }
}

/// A regular enemy or boss minion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    pub vel: Vec2,
    pub kind: EnemyKind,
    pub hp: f32,
    pub max_hp: f32,
    pub value: u32,
    pub ai: AiState,
    /// Ticks left before the enemy expires (minions only)
    pub life: Option<u32>,
}

impl Enemy {
    /// Apply damage, returning true if this hit killed it
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.active || self.hp <= 0.0 {
            return false;
        }
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        if self.hp <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }
}

/// The level-ending guardian
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Phase index, never decreases (0 during intro)
    pub phase: u32,
    /// Ticks until the next attack fires
    pub attack_timer: u32,
    pub state: BossState,
    /// Ticks left in a charge attack
    pub charge_ticks: u32,
}

/// Particle motion model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleBehavior {
    /// Cosmetic debris
    Drift,
    /// Resonance orb that homes in on the nearest core
    Seek,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub color: Palette,
    pub size: f32,
    pub behavior: ParticleBehavior,
}

impl Particle {
    /// Remaining life as a 0-1 fraction
    pub fn life_fraction(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Repair,
    Charge,
}

impl PowerUpKind {
    pub fn palette(self) -> Palette {
        match self {
            PowerUpKind::Repair => Palette::Repair,
            PowerUpKind::Charge => Palette::Charge,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
    pub kind: PowerUpKind,
    /// Ticks until expiry
    pub life: u32,
}

/// Score and damage callouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub id: EntityId,
    pub pos: Vec2,
    pub active: bool,
    pub text: String,
    pub color: Palette,
    pub life: u32,
    pub size: f32,
    pub vel: Vec2,
}

/// Terminal result of a world, latched once reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    LevelComplete,
    Victory,
    Defeat,
}

/// Rolling kill-streak bookkeeping
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ComboTracker {
    pub count: u32,
    /// Ticks left before the streak lapses
    pub window: u32,
}

impl ComboTracker {
    /// Register a kill, returning the new streak length
    pub fn register_kill(&mut self) -> u32 {
        self.count = if self.window > 0 { self.count + 1 } else { 1 };
        self.window = COMBO_WINDOW_TICKS;
        self.count
    }

    /// Count down the window; returns true if the streak just lapsed
    pub fn decay(&mut self) -> bool {
        if self.window > 0 {
            self.window -= 1;
            if self.window == 0 && self.count > 0 {
                self.count = 0;
                return true;
            }
        }
        false
    }

    /// Score multiplier for the current streak
    pub fn multiplier(&self) -> f32 {
        let streak = self.count.max(1) - 1;
        (1.0 + streak as f32 * COMBO_BONUS_STEP).min(COMBO_MAX_MULTIPLIER)
    }
}

/// Complete simulation state for one level attempt
#[derive(Debug, Clone)]
pub struct World {
    pub level: u32,
    /// Rebuild counter; bumps on every retry or level change
    pub generation: u32,
    pub seed: u64,
    pub store: EntityStore,
    pub wave: WaveState,
    pub combo: ComboTracker,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks before another resonance burst may fire
    pub burst_cooldown: u32,
    /// Consecutive ticks spent with the tether severed
    pub severed_ticks: u32,
    pub boss_defeated: bool,
    pub outcome: Option<Outcome>,
    /// Cap on cosmetic particles
    pub particle_budget: usize,
    /// Trail points kept per player
    pub trail_length: usize,
    pub(crate) rng: Pcg32,
}

impl World {
    /// Build a fresh world for `level`
    pub fn new(level: u32, seed: u64, generation: u32) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let world_seed = seed
            .wrapping_add((level as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .wrapping_add(generation as u64);
        let mut store = EntityStore::new();
        let center = arena_center();
        store.spawn_players(
            center - Vec2::new(60.0, 0.0),
            center + Vec2::new(60.0, 0.0),
        );
        log::info!("Level {} world built (generation {})", level, generation);
        Self {
            level,
            generation,
            seed,
            store,
            wave: WaveState::for_level(level),
            combo: ComboTracker::default(),
            time_ticks: 0,
            burst_cooldown: 0,
            severed_ticks: 0,
            boss_defeated: false,
            outcome: None,
            particle_budget: 500,
            trail_length: TRAIL_LENGTH,
            rng: Pcg32::seed_from_u64(world_seed),
        }
    }

    /// Tether geometry derived from the players' live positions
    pub fn tether(&self) -> Tether {
        Tether::between(&self.store.players[0], &self.store.players[1])
    }

    /// Positions of both cores
    pub fn player_positions(&self) -> [Vec2; 2] {
        [self.store.players[0].pos, self.store.players[1].pos]
    }

    pub fn is_boss_level(&self) -> bool {
        crate::is_boss_level(self.level)
    }

    /// Regular wave exhausted and no enemies left alive
    pub fn wave_cleared(&self) -> bool {
        self.wave.remaining == 0 && self.store.enemies.active_count() == 0
    }

    /// Level-complete condition: wave cleared and, on boss levels, boss down
    pub fn level_cleared(&self) -> bool {
        self.wave_cleared() && (!self.is_boss_level() || self.boss_defeated)
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}
