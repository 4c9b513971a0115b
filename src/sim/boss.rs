//! Boss state machine
//!
//! `Intro -> Phase(1..=BOSS_PHASES) -> Defeated`. Phases advance on hp
//! thresholds, each with its own attack period and pattern. Transitions are
//! processed in a loop so a single large hit still passes through every
//! intermediate phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{direction_to, nearest};
use super::state::{Boss, EnemyKind, UNASSIGNED, World};
use crate::consts::*;
use crate::{arena_center, clamp_to_arena};

/// Boss lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    /// Entrance; immune and passive for the remaining ticks
    Intro { ticks: u32 },
    Phase(u32),
    Defeated,
}

/// Something the boss did that the rest of the tick must react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossSignal {
    /// Entered a phase (entry effects pending)
    PhaseEntered(u32),
    Defeated,
}

/// Attack patterns, one per phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPattern {
    /// Ring of minions around the boss
    RadialSummon,
    /// Lunge at the nearest player with a minion escort
    Charge,
    /// Minions flung outward in every direction
    Nova,
}

impl AttackPattern {
    pub fn for_phase(phase: u32) -> Self {
        match phase {
            0 | 1 => AttackPattern::RadialSummon,
            2 => AttackPattern::Charge,
            _ => AttackPattern::Nova,
        }
    }
}

/// Ticks between attacks in `phase`; later phases attack faster
pub fn attack_period(phase: u32) -> u32 {
    BOSS_BASE_ATTACK_PERIOD.saturating_sub(BOSS_ATTACK_PERIOD_STEP * phase.saturating_sub(1))
}

/// hp at or below which phase `phase` ends
pub fn phase_threshold(max_hp: f32, phase: u32) -> f32 {
    let remaining = BOSS_PHASES.saturating_sub(phase) as f32;
    max_hp * remaining / BOSS_PHASES as f32
}

/// Build the boss for the world's level (id assigned on spawn)
pub fn summon(world: &mut World) -> Boss {
    let tier = (world.level.saturating_sub(1)) / BOSS_LEVEL_INTERVAL;
    let max_hp = BOSS_BASE_HP + BOSS_HP_PER_TIER * tier as f32;
    Boss {
        id: UNASSIGNED,
        pos: Vec2::new(ARENA_WIDTH / 2.0, 140.0),
        radius: BOSS_RADIUS,
        active: true,
        vel: Vec2::ZERO,
        hp: max_hp,
        max_hp,
        phase: 0,
        attack_timer: BOSS_BASE_ATTACK_PERIOD,
        state: BossState::Intro {
            ticks: BOSS_INTRO_TICKS,
        },
        charge_ticks: 0,
    }
}

impl Boss {
    /// Can the boss currently be hurt?
    pub fn is_vulnerable(&self) -> bool {
        self.active && matches!(self.state, BossState::Phase(_))
    }

    pub fn is_defeated(&self) -> bool {
        self.state == BossState::Defeated
    }

    fn enter_phase(&mut self, phase: u32) {
        self.phase = phase;
        self.state = BossState::Phase(phase);
        self.attack_timer = attack_period(phase);
        self.charge_ticks = 0;
    }

    /// Apply damage and run every transition it triggers, in order
    pub fn take_damage(&mut self, amount: f32) -> Vec<BossSignal> {
        if !self.is_vulnerable() {
            return Vec::new();
        }
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        self.advance_phases()
    }

    /// Step through phase thresholds until the state matches hp
    pub fn advance_phases(&mut self) -> Vec<BossSignal> {
        let mut signals = Vec::new();
        loop {
            match self.state {
                BossState::Phase(n)
                    if n < BOSS_PHASES && self.hp <= phase_threshold(self.max_hp, n) =>
                {
                    self.enter_phase(n + 1);
                    signals.push(BossSignal::PhaseEntered(n + 1));
                }
                BossState::Phase(_) if self.hp <= 0.0 => {
                    self.state = BossState::Defeated;
                    self.active = false;
                    self.vel = Vec2::ZERO;
                    signals.push(BossSignal::Defeated);
                    break;
                }
                _ => break,
            }
        }
        signals
    }
}

/// Minion the boss wants spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinionSpawn {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Minions arranged in a ring around `center`
fn ring(center: Vec2, count: u32, radius: f32, speed: f32, offset: f32) -> Vec<MinionSpawn> {
    (0..count)
        .map(|i| {
            let angle = offset + std::f32::consts::TAU * i as f32 / count as f32;
            let dir = Vec2::from_angle(angle);
            MinionSpawn {
                pos: center + dir * radius,
                vel: dir * speed,
            }
        })
        .collect()
}

/// Movement and attack timers for the active boss
///
/// Returns signals raised this tick (intro finishing counts as entering
/// phase 1) and the minions its attacks summon.
pub fn update(world: &mut World) -> (Vec<BossSignal>, Vec<MinionSpawn>) {
    let players = world.player_positions();
    let time = world.time_ticks as f32;
    let Some(boss) = world.store.active_boss_mut() else {
        return (Vec::new(), Vec::new());
    };

    let mut signals = Vec::new();
    let mut spawns = Vec::new();

    match boss.state {
        BossState::Intro { ticks } => {
            let ticks = ticks.saturating_sub(1);
            if ticks == 0 {
                boss.enter_phase(1);
                signals.push(BossSignal::PhaseEntered(1));
            } else {
                boss.state = BossState::Intro { ticks };
            }
        }
        BossState::Phase(phase) => {
            let (_, target) = nearest(boss.pos, &players).unwrap_or((0, arena_center()));

            if boss.charge_ticks > 0 {
                boss.charge_ticks -= 1;
            } else {
                // Hover around the pair's midpoint, faster in later phases
                let midpoint = (players[0] + players[1]) * 0.5;
                let sway = Vec2::new((time * 0.02).sin(), (time * 0.013).cos()) * 120.0;
                let cruise = 0.6 + 0.4 * phase as f32;
                let desired = direction_to(boss.pos, midpoint + sway) * cruise;
                boss.vel += (desired - boss.vel) * 0.05;
            }

            boss.attack_timer = boss.attack_timer.saturating_sub(1);
            if boss.attack_timer == 0 {
                boss.attack_timer = attack_period(phase);
                match AttackPattern::for_phase(phase) {
                    AttackPattern::RadialSummon => {
                        spawns.extend(ring(boss.pos, 4, boss.radius + 20.0, 1.0, time));
                    }
                    AttackPattern::Charge => {
                        boss.vel = direction_to(boss.pos, target) * 7.0;
                        boss.charge_ticks = 25;
                        spawns.extend(ring(boss.pos, 2, boss.radius + 20.0, 1.5, time));
                    }
                    AttackPattern::Nova => {
                        spawns.extend(ring(boss.pos, 8, boss.radius + 10.0, 4.0, time * 0.5));
                    }
                }
                log::debug!("Boss phase {} attack: {} minions", phase, spawns.len());
            }
        }
        BossState::Defeated => {}
    }

    boss.pos = clamp_to_arena(boss.pos + boss.vel, boss.radius);
    (signals, spawns)
}

/// Materialize boss minions into the store
pub fn spawn_minions(world: &mut World, spawns: &[MinionSpawn]) {
    for spawn in spawns {
        let pos = crate::wrap_position(spawn.pos);
        let minion = super::spawner::make_enemy(world, EnemyKind::Minion, pos, spawn.vel);
        world.store.spawn_enemy(minion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fighting_boss() -> Boss {
        let mut world = World::new(5, 1, 0);
        let mut boss = summon(&mut world);
        boss.enter_phase(1);
        boss
    }

    #[test]
    fn test_intro_is_immune() {
        let mut world = World::new(5, 1, 0);
        let mut boss = summon(&mut world);
        assert!(boss.take_damage(10_000.0).is_empty());
        assert_eq!(boss.hp, boss.max_hp);
    }

    #[test]
    fn test_intro_ends_in_phase_one() {
        let mut world = World::new(5, 1, 0);
        let boss = summon(&mut world);
        world.store.spawn_boss(boss);
        let mut entered = Vec::new();
        for _ in 0..BOSS_INTRO_TICKS {
            let (signals, _) = update(&mut world);
            entered.extend(signals);
        }
        assert_eq!(entered, vec![BossSignal::PhaseEntered(1)]);
        assert_eq!(world.store.active_boss().map(|b| b.phase), Some(1));
    }

    #[test]
    fn test_single_threshold() {
        let mut boss = fighting_boss();
        let to_threshold = boss.max_hp - phase_threshold(boss.max_hp, 1);
        assert_eq!(boss.take_damage(to_threshold), vec![BossSignal::PhaseEntered(2)]);
        assert_eq!(boss.phase, 2);
        assert_eq!(boss.attack_timer, attack_period(2));
    }

    #[test]
    fn test_double_threshold_visits_each_phase() {
        let mut boss = fighting_boss();
        // Drop straight below the phase-3 threshold
        let signals = boss.take_damage(boss.max_hp * 0.8);
        assert_eq!(
            signals,
            vec![BossSignal::PhaseEntered(2), BossSignal::PhaseEntered(3)]
        );
        assert_eq!(boss.phase, 3);
    }

    #[test]
    fn test_killing_blow_passes_through_phases() {
        let mut boss = fighting_boss();
        let signals = boss.take_damage(boss.max_hp * 2.0);
        assert_eq!(
            signals,
            vec![
                BossSignal::PhaseEntered(2),
                BossSignal::PhaseEntered(3),
                BossSignal::Defeated
            ]
        );
        assert!(boss.is_defeated());
        assert!(!boss.active);
        // Terminal: no further signals
        assert!(boss.take_damage(10.0).is_empty());
    }

    #[test]
    fn test_attack_period_shortens() {
        assert!(attack_period(1) > attack_period(2));
        assert!(attack_period(2) > attack_period(3));
    }

    #[test]
    fn test_attack_fires_and_resets() {
        let mut world = World::new(5, 3, 0);
        let mut boss = summon(&mut world);
        boss.enter_phase(3);
        boss.attack_timer = 1;
        world.store.spawn_boss(boss);
        let (_, spawns) = update(&mut world);
        assert_eq!(spawns.len(), 8);
        assert_eq!(world.store.active_boss().map(|b| b.attack_timer), Some(attack_period(3)));
        spawn_minions(&mut world, &spawns);
        assert_eq!(world.store.enemies.active_count(), 8);
        assert!(world.store.enemies.iter_active().all(|e| e.kind == EnemyKind::Minion));
    }

    proptest! {
        #[test]
        fn prop_phase_never_decreases(hits in prop::collection::vec(0.0f32..2500.0, 1..40)) {
            let mut boss = fighting_boss();
            let mut last = boss.phase;
            for hit in hits {
                boss.take_damage(hit);
                prop_assert!(boss.phase >= last);
                prop_assert!(boss.hp >= 0.0);
                last = boss.phase;
            }
        }
    }
}
