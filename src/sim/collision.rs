//! Collision and combat resolution
//!
//! Runs once per tick after movement, always in the same order:
//! 1. tether vs enemies and boss
//! 2. player contact with enemies and boss
//! 3. player pickups (power-ups and resonance orbs)
//! 4. resonance burst
//!
//! Anything killed in an earlier step is inactive and skipped by later ones,
//! so each kill is rewarded exactly once. Whatever the beam touched in step 1
//! is also exempt from contact in step 2. Nothing here touches `MatchStats`;
//! effects come back as `MatchEvent`s for the driver to commit.

use glam::Vec2;

use super::boss::BossSignal;
use super::effects;
use super::geometry::circles_overlap;
use super::state::{EnemyKind, EntityId, Palette, ParticleBehavior, PowerUpKind, World};
use super::stats::MatchEvent;
use super::tether::Tether;
use crate::consts::*;

/// Tick-start facts the resolver needs from outside the world
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatContext {
    /// Resonance charge is full
    pub resonance_ready: bool,
    /// Host asked for a burst this tick
    pub burst_requested: bool,
}

/// Everything a resolution pass produced
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub events: Vec<MatchEvent>,
    pub kills: u32,
    pub burst_fired: bool,
}

/// Entities the beam touched this tick
#[derive(Debug, Default)]
struct BeamHits {
    enemies: Vec<EntityId>,
    boss: bool,
}

/// Run all four resolution steps
pub fn resolve(world: &mut World, tether: &Tether, ctx: CombatContext) -> Resolution {
    let mut out = Resolution::default();
    let beam = tether_damage(world, tether, &mut out);
    player_contact(world, &beam, &mut out);
    pickups(world, &mut out);
    if burst_triggered(world, tether, ctx) {
        resonance_burst(world, tether, &mut out);
    }
    out
}

/// Score, combo and effects for one kill
fn reward_kill(world: &mut World, pos: Vec2, value: f32, color: Palette, orbs: bool, out: &mut Resolution) {
    let combo = world.combo.register_kill();
    out.events.push(MatchEvent::Combo(combo));
    let points = (value * world.combo.multiplier()).floor();
    out.events.push(MatchEvent::Score(points));
    out.kills += 1;

    effects::burst(world, pos, color, 10, 4.0);
    if orbs {
        effects::seek_orbs(world, pos, 3);
    }
    effects::callout(world, pos, format!("+{points}"), Palette::TextScore, 16.0);
}

/// React to boss phase changes and defeat
///
/// `pos` is where the boss stood when the signals were raised; a defeated
/// boss is already inactive by the time this runs.
pub fn handle_boss_signals(world: &mut World, pos: Vec2, signals: &[BossSignal], out: &mut Resolution) {
    for signal in signals {
        match *signal {
            BossSignal::PhaseEntered(phase) => {
                log::info!("Boss entered phase {}", phase);
                effects::burst(world, pos, Palette::Boss, 24, 6.0);
                effects::callout(world, pos, format!("PHASE {phase}"), Palette::Boss, 28.0);
            }
            BossSignal::Defeated => {
                let tier = (world.level.saturating_sub(1)) / BOSS_LEVEL_INTERVAL;
                log::info!("Boss defeated on level {}", world.level);
                world.boss_defeated = true;
                reward_kill(
                    world,
                    pos,
                    BOSS_SCORE * (tier + 1) as f32,
                    Palette::Boss,
                    false,
                    out,
                );
                effects::burst(world, pos, Palette::White, 40, 8.0);

                // Leftover minions go down with their master, unrewarded
                let minions: Vec<(u32, Vec2)> = world
                    .store
                    .enemies
                    .iter_active()
                    .filter(|e| e.kind == EnemyKind::Minion)
                    .map(|e| (e.id, e.pos))
                    .collect();
                for (id, minion_pos) in minions {
                    world.store.deactivate(id);
                    effects::burst(world, minion_pos, Palette::Minion, 4, 3.0);
                }
            }
        }
    }
}

/// Step 1: beam damage, with the overdrive multiplier already in the tether
fn tether_damage(world: &mut World, tether: &Tether, out: &mut Resolution) -> BeamHits {
    let mut beam = BeamHits::default();
    if !tether.active {
        return beam;
    }
    let damage = tether.damage_per_tick();

    let mut killed = Vec::new();
    for enemy in world.store.enemies.iter_active_mut() {
        if !tether.touches(enemy.pos, enemy.radius) {
            continue;
        }
        beam.enemies.push(enemy.id);
        if enemy.take_damage(damage) {
            killed.push((enemy.pos, enemy.value as f32, enemy.kind.palette()));
        }
    }
    for (pos, value, color) in killed {
        reward_kill(world, pos, value, color, true, out);
    }

    let hit = match world.store.active_boss_mut() {
        Some(boss) if boss.is_vulnerable() && tether.touches(boss.pos, boss.radius) => {
            Some((boss.pos, boss.take_damage(damage)))
        }
        _ => None,
    };
    if let Some((pos, signals)) = hit {
        beam.boss = true;
        handle_boss_signals(world, pos, &signals, out);
    }
    beam
}

/// Step 2: contact hurts a player once, then grants a short immunity
fn player_contact(world: &mut World, beam: &BeamHits, out: &mut Resolution) {
    for idx in 0..world.store.players.len() {
        let player = &world.store.players[idx];
        if player.is_invulnerable() {
            continue;
        }
        let (pos, radius) = (player.pos, player.radius);

        let enemy_hit = world
            .store
            .enemies
            .iter_active()
            .filter(|e| !beam.enemies.contains(&e.id))
            .find(|e| circles_overlap(pos, radius, e.pos, e.radius))
            .map(|e| (e.id, e.pos, e.kind));

        let damage = if let Some((id, enemy_pos, kind)) = enemy_hit {
            // The enemy is spent on impact
            world.store.deactivate(id);
            effects::burst(world, enemy_pos, kind.palette(), 8, 3.0);
            Some(kind.stats().contact_damage)
        } else if beam.boss {
            None
        } else {
            // Harmless until the intro is over
            world
                .store
                .active_boss()
                .filter(|b| b.is_vulnerable() && circles_overlap(pos, radius, b.pos, b.radius))
                .map(|_| BOSS_CONTACT_DAMAGE)
        };

        if let Some(damage) = damage {
            world.store.players[idx].invuln_ticks = PLAYER_INVULN_TICKS;
            out.events.push(MatchEvent::Damage(damage));
            effects::callout(world, pos, format!("-{damage}"), Palette::TextDamage, 18.0);
        }
    }
}

/// Step 3: power-ups and resonance orbs touching either core
fn pickups(world: &mut World, out: &mut Resolution) {
    let players: Vec<(Vec2, f32)> = world.store.players.iter().map(|p| (p.pos, p.radius)).collect();
    let touching = |pos: Vec2, radius: f32| {
        players
            .iter()
            .any(|&(p, r)| circles_overlap(p, r, pos, radius))
    };

    let mut collected = Vec::new();
    for power_up in world.store.power_ups.iter_active_mut() {
        if touching(power_up.pos, power_up.radius) {
            power_up.active = false;
            collected.push((power_up.pos, power_up.kind));
        }
    }
    for (pos, kind) in collected {
        match kind {
            PowerUpKind::Repair => {
                out.events.push(MatchEvent::Damage(-REPAIR_AMOUNT));
                effects::callout(world, pos, "REPAIR", Palette::Repair, 18.0);
            }
            PowerUpKind::Charge => {
                out.events.push(MatchEvent::ResonanceCharge(CHARGE_AMOUNT));
                effects::callout(world, pos, "CHARGE", Palette::Charge, 18.0);
            }
        }
        effects::burst(world, pos, kind.palette(), 12, 3.0);
    }

    for orb in world.store.particles.iter_active_mut() {
        if orb.behavior == ParticleBehavior::Seek && touching(orb.pos, orb.radius) {
            orb.active = false;
            out.events.push(MatchEvent::ResonanceCharge(RESONANCE_PER_ORB));
        }
    }
}

/// Full charge, cooldown elapsed, and either the host asked or the cores merged
fn burst_triggered(world: &World, tether: &Tether, ctx: CombatContext) -> bool {
    ctx.resonance_ready
        && world.burst_cooldown == 0
        && (ctx.burst_requested || tether.length <= CORE_MERGE_DISTANCE)
}

/// Step 4: wipe every enemy in range; no orbs, so the burst never recharges itself
fn resonance_burst(world: &mut World, tether: &Tether, out: &mut Resolution) {
    let center = tether.midpoint();
    log::info!("Resonance burst at {:?}", center);

    let mut killed = Vec::new();
    for enemy in world.store.enemies.iter_active_mut() {
        if enemy.pos.distance(center) <= BURST_RADIUS + enemy.radius
            && enemy.take_damage(enemy.hp)
        {
            killed.push((enemy.pos, enemy.value as f32, enemy.kind.palette()));
        }
    }
    for (pos, value, color) in killed {
        reward_kill(world, pos, value, color, false, out);
    }

    let hit = match world.store.active_boss_mut() {
        Some(boss) if boss.pos.distance(center) <= BURST_RADIUS + boss.radius => {
            Some((boss.pos, boss.take_damage(BURST_BOSS_DAMAGE)))
        }
        _ => None,
    };
    if let Some((pos, signals)) = hit {
        handle_boss_signals(world, pos, &signals, out);
    }

    out.events.push(MatchEvent::ResonanceUse);
    out.burst_fired = true;
    world.burst_cooldown = RESONANCE_COOLDOWN;
    effects::burst(world, center, Palette::Resonance, 60, 10.0);
    effects::callout(world, center, "RESONANCE", Palette::Resonance, 32.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::make_enemy;
    use crate::sim::boss::{self, BossState};
    use crate::sim::state::{PowerUp, UNASSIGNED};

    fn world_with_enemy(kind: EnemyKind, pos: Vec2) -> (World, u32) {
        let mut world = World::new(1, 11, 0);
        world.wave.remaining = 0;
        let enemy = make_enemy(&mut world, kind, pos, Vec2::ZERO);
        let id = world.store.spawn_enemy(enemy);
        (world, id)
    }

    fn midpoint(world: &World) -> Vec2 {
        world.tether().midpoint()
    }

    #[test]
    fn test_overdrive_tether_kills_in_one_tick() {
        let mut world = World::new(1, 11, 0);
        world.wave.remaining = 0;
        let mid = midpoint(&world);
        let enemy = make_enemy(&mut world, EnemyKind::Chaser, mid, Vec2::ZERO);
        let id = world.store.spawn_enemy(enemy);

        let tether = world.tether();
        assert!(tether.overdrive);
        let out = resolve(&mut world, &tether, CombatContext::default());

        assert_eq!(out.kills, 1);
        assert_eq!(out.events, vec![MatchEvent::Combo(1), MatchEvent::Score(100.0)]);
        assert!(!world.store.enemies.get(id).unwrap().active);
    }

    #[test]
    fn test_normal_tether_takes_three_ticks() {
        let (mut world, id) = world_with_enemy(EnemyKind::Chaser, Vec2::ZERO);
        // Spread the cores past overdrive range
        world.store.players[0].pos = Vec2::new(300.0, 400.0);
        world.store.players[1].pos = Vec2::new(500.0, 400.0);
        world.store.enemies.get_mut(id).unwrap().pos = Vec2::new(400.0, 400.0);

        let tether = world.tether();
        assert!(tether.active && !tether.overdrive);
        for _ in 0..2 {
            assert_eq!(resolve(&mut world, &tether, CombatContext::default()).kills, 0);
        }
        assert_eq!(resolve(&mut world, &tether, CombatContext::default()).kills, 1);
    }

    #[test]
    fn test_severed_tether_deals_nothing() {
        let (mut world, id) = world_with_enemy(EnemyKind::Chaser, Vec2::new(400.0, 400.0));
        world.store.players[0].pos = Vec2::new(100.0, 400.0);
        world.store.players[1].pos = Vec2::new(100.0 + MAX_TETHER_DISTANCE + 50.0, 400.0);

        let tether = world.tether();
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert!(out.events.is_empty());
        let enemy = world.store.enemies.get(id).unwrap();
        assert_eq!(enemy.hp, enemy.max_hp);
    }

    #[test]
    fn test_kill_in_step_one_skips_contact() {
        // Enemy overlaps the anchor and sits on the beam
        let mut world = World::new(1, 11, 0);
        let pos = world.store.players[0].pos + Vec2::new(18.0, 0.0);
        let enemy = make_enemy(&mut world, EnemyKind::Chaser, pos, Vec2::ZERO);
        world.store.spawn_enemy(enemy);

        let tether = world.tether();
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert_eq!(out.kills, 1);
        assert!(!out.events.iter().any(|e| matches!(e, MatchEvent::Damage(_))));
        assert_eq!(world.store.players[0].invuln_ticks, 0);
    }

    #[test]
    fn test_beam_touched_enemy_skips_contact() {
        // Normal beam needs three ticks; the dasher survives step 1 while overlapping the anchor
        let (mut world, id) = world_with_enemy(EnemyKind::Dasher, Vec2::new(315.0, 400.0));
        world.store.players[0].pos = Vec2::new(300.0, 400.0);
        world.store.players[1].pos = Vec2::new(500.0, 400.0);

        let tether = world.tether();
        assert!(tether.active && !tether.overdrive);
        let out = resolve(&mut world, &tether, CombatContext::default());

        assert!(out.events.is_empty());
        assert_eq!(world.store.players[0].invuln_ticks, 0);
        let enemy = world.store.enemies.get(id).unwrap();
        assert!(enemy.active);
        assert_eq!(enemy.hp, enemy.max_hp - TETHER_DAMAGE);
    }

    #[test]
    fn test_boss_intro_has_no_contact() {
        let mut world = World::new(5, 11, 0);
        world.wave.remaining = 0;
        // Sever the beam so only contact matters
        world.store.players[0].pos = Vec2::new(200.0, 400.0);
        world.store.players[1].pos = Vec2::new(200.0 + MAX_TETHER_DISTANCE + 50.0, 400.0);
        let mut summoned = boss::summon(&mut world);
        summoned.pos = world.store.players[0].pos;
        world.store.spawn_boss(summoned);
        assert!(matches!(world.store.active_boss().unwrap().state, BossState::Intro { .. }));

        let tether = world.tether();
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert!(out.events.is_empty());

        // Once the fight starts the same overlap hurts
        world.store.active_boss_mut().unwrap().state = BossState::Phase(1);
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert_eq!(out.events, vec![MatchEvent::Damage(BOSS_CONTACT_DAMAGE)]);
    }

    #[test]
    fn test_contact_hits_once_then_immune() {
        let mut world = World::new(1, 11, 0);
        // Sever the beam so only contact matters
        world.store.players[0].pos = Vec2::new(200.0, 200.0);
        world.store.players[1].pos = Vec2::new(200.0, 200.0 + MAX_TETHER_DISTANCE + 50.0);
        let anchor = world.store.players[0].pos;
        for offset in [Vec2::new(-10.0, 0.0), Vec2::new(0.0, -10.0)] {
            let enemy = make_enemy(&mut world, EnemyKind::Drifter, anchor + offset, Vec2::ZERO);
            world.store.spawn_enemy(enemy);
        }

        let tether = world.tether();
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert_eq!(out.events, vec![MatchEvent::Damage(8.0)]);
        assert_eq!(world.store.players[0].invuln_ticks, PLAYER_INVULN_TICKS);
        // Immune now; the second drifter does nothing
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert!(out.events.is_empty());
        assert_eq!(world.store.enemies.active_count(), 1);
    }

    #[test]
    fn test_repair_pickup_heals() {
        let mut world = World::new(1, 11, 0);
        let pos = world.store.players[1].pos;
        let id = world.store.spawn_power_up(PowerUp {
            id: UNASSIGNED,
            pos,
            radius: POWERUP_RADIUS,
            active: true,
            kind: PowerUpKind::Repair,
            life: POWERUP_LIFE,
        });
        let tether = world.tether();
        let out = resolve(&mut world, &tether, CombatContext::default());
        assert_eq!(out.events, vec![MatchEvent::Damage(-REPAIR_AMOUNT)]);
        assert!(!world.store.power_ups.get(id).unwrap().active);
    }

    #[test]
    fn test_burst_clears_range_without_recharging() {
        let mut world = World::new(1, 11, 0);
        world.store.players[0].pos = Vec2::new(100.0, 700.0);
        world.store.players[1].pos = Vec2::new(100.0, 600.0);
        let near = [Vec2::new(300.0, 600.0), Vec2::new(150.0, 300.0)];
        for pos in near {
            let enemy = make_enemy(&mut world, EnemyKind::Dasher, pos, Vec2::ZERO);
            world.store.spawn_enemy(enemy);
        }
        let far = make_enemy(&mut world, EnemyKind::Chaser, Vec2::new(1000.0, 20.0), Vec2::ZERO);
        let far_id = world.store.spawn_enemy(far);

        let tether = world.tether();
        let ctx = CombatContext {
            resonance_ready: true,
            burst_requested: true,
        };
        let out = resolve(&mut world, &tether, ctx);

        assert!(out.burst_fired);
        assert_eq!(out.kills, 2);
        let uses = out.events.iter().filter(|e| **e == MatchEvent::ResonanceUse).count();
        assert_eq!(uses, 1);
        assert!(!out.events.iter().any(|e| matches!(e, MatchEvent::ResonanceCharge(_))));
        assert!(world.store.enemies.get(far_id).unwrap().active);
        assert_eq!(world.burst_cooldown, RESONANCE_COOLDOWN);
        assert!(
            world
                .store
                .particles
                .iter_active()
                .all(|p| p.behavior == ParticleBehavior::Drift)
        );
    }

    #[test]
    fn test_burst_needs_full_charge() {
        let mut world = World::new(1, 11, 0);
        let tether = world.tether();
        let ctx = CombatContext {
            resonance_ready: false,
            burst_requested: true,
        };
        assert!(!resolve(&mut world, &tether, ctx).burst_fired);
    }

    #[test]
    fn test_merging_cores_triggers_burst() {
        let mut world = World::new(1, 11, 0);
        let anchor = world.store.players[0].pos;
        world.store.players[1].pos = anchor + Vec2::new(CORE_MERGE_DISTANCE - 1.0, 0.0);
        let tether = world.tether();
        let ctx = CombatContext {
            resonance_ready: true,
            burst_requested: false,
        };
        assert!(resolve(&mut world, &tether, ctx).burst_fired);
        // Cooldown blocks an immediate repeat
        assert!(!resolve(&mut world, &tether, ctx).burst_fired);
    }
}
