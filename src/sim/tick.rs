//! Fixed timestep simulation tick
//!
//! Core game loop step that advances a `World` deterministically.
//!
//! A tick runs in two phases. The first mutates entities and collects
//! `MatchEvent`s without touching `MatchStats`. The second commits those
//! events in order, notifies the observer, and only then checks the
//! terminal conditions, so defeat and level completion are decided on
//! settled state and latch before anything else can fire.

use glam::Vec2;

use super::collision::{self, CombatContext, Resolution};
use super::state::{Outcome, Palette, World};
use super::stats::{MatchEvent, MatchEvents, MatchStats};
use super::{ai, boss, effects, spawner};
use crate::consts::*;
use crate::{clamp_to_arena, wrap_position};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Anchor movement direction (normalized before use)
    pub anchor_dir: Vec2,
    /// Follower movement direction (normalized before use)
    pub follower_dir: Vec2,
    /// Fire the resonance burst if it is charged
    pub burst: bool,
    /// Host is not in the playing screen; the tick does nothing
    pub paused: bool,
}

/// What a tick did, for hosts and tests
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// False when the tick was skipped (paused or already finished)
    pub ran: bool,
    /// Events committed this tick, in commit order
    pub events: Vec<MatchEvent>,
    pub kills: u32,
    pub burst_fired: bool,
    /// Outcome latched during this tick
    pub outcome: Option<Outcome>,
}

/// Advance the world by one fixed timestep
pub fn tick(
    world: &mut World,
    stats: &mut MatchStats,
    input: &TickInput,
    events: &mut impl MatchEvents,
) -> TickReport {
    let mut report = TickReport::default();
    if input.paused || world.is_finished() {
        return report;
    }
    report.ran = true;
    world.time_ticks += 1;

    let mut pending = Vec::new();

    move_players(world, input);
    if world.combo.decay() {
        pending.push(MatchEvent::Combo(0));
    }
    world.burst_cooldown = world.burst_cooldown.saturating_sub(1);

    spawner::update(world);
    ai::update(world);

    let (signals, spawns) = boss::update(world);
    if !signals.is_empty() {
        let pos = world
            .store
            .active_boss()
            .map(|b| b.pos)
            .unwrap_or_else(crate::arena_center);
        let mut entry = Resolution::default();
        collision::handle_boss_signals(world, pos, &signals, &mut entry);
        pending.extend(entry.events);
    }
    boss::spawn_minions(world, &spawns);

    integrate(world);
    effects::update(world);

    let tether = world.tether();
    if tether.active {
        world.severed_ticks = 0;
    } else {
        world.severed_ticks += 1;
        if world.severed_ticks.is_multiple_of(SEVERED_DRAIN_INTERVAL) {
            pending.push(MatchEvent::Damage(SEVERED_DRAIN_DAMAGE));
            effects::callout(
                world,
                tether.midpoint(),
                "LINK SEVERED",
                Palette::TextDamage,
                20.0,
            );
        }
    }

    let ctx = CombatContext {
        resonance_ready: stats.resonance_ready(),
        burst_requested: input.burst,
    };
    let resolution = collision::resolve(world, &tether, ctx);
    report.kills = resolution.kills;
    report.burst_fired = resolution.burst_fired;
    pending.extend(resolution.events);

    world.store.purge_inactive();

    // Phase two: commit and notify
    for event in &pending {
        stats.apply(event);
        events.dispatch(event);
    }
    report.events = pending;

    if stats.is_defeated() {
        log::info!("Integrity lost on level {} at tick {}", world.level, world.time_ticks);
        world.outcome = Some(Outcome::Defeat);
        events.on_game_over();
    } else if world.level_cleared() {
        if world.level >= MAX_LEVEL {
            log::info!("Final level {} cleared", world.level);
            world.outcome = Some(Outcome::Victory);
            events.on_victory();
        } else {
            log::info!("Level {} cleared at tick {}", world.level, world.time_ticks);
            world.outcome = Some(Outcome::LevelComplete);
            events.on_level_complete();
        }
    }
    report.outcome = world.outcome;

    report
}

/// Steer both cores, keep them in the arena, and tick their timers
fn move_players(world: &mut World, input: &TickInput) {
    let trail_length = world.trail_length;
    let dirs = [input.anchor_dir, input.follower_dir];
    for (player, dir) in world.store.players.iter_mut().zip(dirs) {
        let next = clamp_to_arena(player.pos + dir.normalize_or_zero() * player.speed, player.radius);
        player.vel = next - player.pos;
        player.pos = next;
        player.record_trail(trail_length);
        player.invuln_ticks = player.invuln_ticks.saturating_sub(1);
    }
}

/// position += velocity for enemies (wrapping) and timed pickups
fn integrate(world: &mut World) {
    for enemy in world.store.enemies.iter_active_mut() {
        enemy.pos = wrap_position(enemy.pos + enemy.vel);
        if let Some(life) = enemy.life.as_mut() {
            *life = life.saturating_sub(1);
            if *life == 0 {
                enemy.active = false;
            }
        }
    }

    for power_up in world.store.power_ups.iter_active_mut() {
        power_up.life = power_up.life.saturating_sub(1);
        if power_up.life == 0 {
            power_up.active = false;
        }
    }
}
