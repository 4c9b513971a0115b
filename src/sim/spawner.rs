//! Wave composition and spawning
//!
//! Difficulty follows a five-level cycle: levels ramp up inside a cycle,
//! the fifth level is a boss encounter, and the next cycle starts easier
//! again with a small per-cycle bump.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss;
use super::state::{AiState, Enemy, EnemyKind, PowerUp, PowerUpKind, UNASSIGNED, World};
use crate::consts::*;

/// Spawning progress for the current level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveState {
    /// Regular enemies still to spawn
    pub remaining: u32,
    /// Ticks between regular spawns
    pub interval: u32,
    /// Ticks until the next regular spawn
    pub spawn_timer: u32,
    /// Enemy kinds this wave draws from
    pub mix: Vec<EnemyKind>,
    /// Boss still waiting to be summoned
    pub boss_pending: bool,
    /// Ticks until the next power-up drop
    pub power_up_timer: u32,
    /// Enemy hp multiplier for this cycle
    pub hp_scale: f32,
}

impl WaveState {
    pub fn for_level(level: u32) -> Self {
        let composition = WaveComposition::for_level(level);
        Self {
            remaining: composition.count,
            interval: composition.interval,
            // First enemy arrives after a short grace period
            spawn_timer: 45,
            mix: composition.mix,
            boss_pending: composition.boss,
            power_up_timer: POWERUP_INTERVAL,
            hp_scale: composition.hp_scale,
        }
    }
}

/// What a level throws at the players
#[derive(Debug, Clone, PartialEq)]
pub struct WaveComposition {
    pub count: u32,
    pub interval: u32,
    pub mix: Vec<EnemyKind>,
    pub boss: bool,
    pub hp_scale: f32,
}

impl WaveComposition {
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let cycle_position = (level - 1) % BOSS_LEVEL_INTERVAL + 1;
        let tier = (level - 1) / BOSS_LEVEL_INTERVAL;
        let hp_scale = 1.0 + 0.15 * tier as f32;

        if crate::is_boss_level(level) {
            return Self {
                count: 0,
                interval: 0,
                mix: Vec::new(),
                boss: true,
                hp_scale,
            };
        }

        let mut mix = vec![EnemyKind::Chaser];
        if cycle_position >= 2 || tier >= 1 {
            mix.push(EnemyKind::Drifter);
        }
        if cycle_position >= 3 {
            mix.push(EnemyKind::Dasher);
        }

        Self {
            count: 6 + 3 * cycle_position + 2 * tier,
            interval: 60u32.saturating_sub(5 * cycle_position + 4 * tier).max(20),
            mix,
            boss: false,
            hp_scale,
        }
    }
}

/// Random point on the arena border
fn edge_position(rng: &mut impl Rng) -> Vec2 {
    let t: f32 = rng.random();
    match rng.random_range(0..4) {
        0 => Vec2::new(t * ARENA_WIDTH, 0.0),
        1 => Vec2::new(ARENA_WIDTH, t * ARENA_HEIGHT),
        2 => Vec2::new(t * ARENA_WIDTH, ARENA_HEIGHT),
        _ => Vec2::new(0.0, t * ARENA_HEIGHT),
    }
}

/// Build an enemy of `kind` at `pos`; the store assigns its id on spawn
pub fn make_enemy(world: &mut World, kind: EnemyKind, pos: Vec2, vel: Vec2) -> Enemy {
    let stats = kind.stats();
    let hp = stats.hp * world.wave.hp_scale;
    let heading = world.rng.random::<f32>() * std::f32::consts::TAU;
    Enemy {
        id: UNASSIGNED,
        pos,
        radius: stats.radius,
        active: true,
        vel,
        kind,
        hp,
        max_hp: hp,
        value: stats.value,
        ai: AiState::initial(kind, heading),
        life: stats.lifetime,
    }
}

/// Advance spawn timers, adding enemies, the boss and power-ups as due
pub fn update(world: &mut World) {
    if world.wave.boss_pending {
        world.wave.boss_pending = false;
        let boss = boss::summon(world);
        log::info!("Boss summoned on level {} ({} hp)", world.level, boss.max_hp);
        world.store.spawn_boss(boss);
    }

    if world.wave.remaining > 0 {
        world.wave.spawn_timer = world.wave.spawn_timer.saturating_sub(1);
        if world.wave.spawn_timer == 0 {
            let kind = world.wave.mix[world.rng.random_range(0..world.wave.mix.len())];
            let pos = edge_position(&mut world.rng);
            let enemy = make_enemy(world, kind, pos, Vec2::ZERO);
            let id = world.store.spawn_enemy(enemy);
            log::debug!("Spawned {:?} #{} at {:?}", kind, id, pos);
            world.wave.remaining -= 1;
            world.wave.spawn_timer = world.wave.interval;
        }
    }

    world.wave.power_up_timer = world.wave.power_up_timer.saturating_sub(1);
    if world.wave.power_up_timer == 0 {
        world.wave.power_up_timer = POWERUP_INTERVAL;
        let kind = if world.rng.random::<f32>() < 0.55 {
            PowerUpKind::Repair
        } else {
            PowerUpKind::Charge
        };
        let margin = 80.0;
        let pos = Vec2::new(
            world.rng.random_range(margin..ARENA_WIDTH - margin),
            world.rng.random_range(margin..ARENA_HEIGHT - margin),
        );
        let power_up = PowerUp {
            id: UNASSIGNED,
            pos,
            radius: POWERUP_RADIUS,
            active: true,
            kind,
            life: POWERUP_LIFE,
        };
        log::debug!("Dropped {:?} power-up at {:?}", kind, pos);
        world.store.spawn_power_up(power_up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_scales_within_cycle() {
        let counts: Vec<u32> = (1..=4).map(|l| WaveComposition::for_level(l).count).collect();
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_difficulty_resets_after_boss() {
        let before_boss = WaveComposition::for_level(4);
        let after_boss = WaveComposition::for_level(6);
        assert!(after_boss.count < before_boss.count);
        // ...but the new cycle is still harder than the first one
        assert!(after_boss.count > WaveComposition::for_level(1).count);
        assert!(after_boss.hp_scale > 1.0);
    }

    #[test]
    fn test_type_mix_grows() {
        assert_eq!(WaveComposition::for_level(1).mix, vec![EnemyKind::Chaser]);
        assert!(WaveComposition::for_level(3).mix.contains(&EnemyKind::Dasher));
        assert!(!WaveComposition::for_level(2).mix.contains(&EnemyKind::Dasher));
    }

    #[test]
    fn test_boss_levels_have_no_regular_wave() {
        let wave = WaveComposition::for_level(10);
        assert!(wave.boss);
        assert_eq!(wave.count, 0);
        assert!(!WaveComposition::for_level(6).boss);
    }

    #[test]
    fn test_spawner_drains_wave() {
        let mut world = World::new(1, 42, 0);
        let total = world.wave.remaining;
        for _ in 0..5000 {
            update(&mut world);
        }
        assert_eq!(world.wave.remaining, 0);
        assert_eq!(world.store.enemies.active_count() as u32, total);
        assert!(world.store.power_ups.active_count() > 0);
    }

    #[test]
    fn test_boss_summoned_once() {
        let mut world = World::new(5, 42, 0);
        update(&mut world);
        update(&mut world);
        assert_eq!(world.store.bosses.active_count(), 1);
        assert!(!world.wave.boss_pending);
    }
}
