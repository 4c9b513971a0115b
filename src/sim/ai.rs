//! Enemy behaviors
//!
//! Each enemy kind maps to one behavior function through `BEHAVIORS`.
//! A behavior is a pure function of the enemy and a read-only view of the
//! world, returning the velocity and AI memory for this tick.

use glam::Vec2;

use super::geometry::{direction_to, hash01, nearest};
use super::state::{AiState, DashStage, Enemy, EnemyKind, World};

/// Ticks a dasher stalks before winding up
pub const DASH_STALK_TICKS: u32 = 90;
/// Wind-up before the burst (velocity held at zero)
pub const DASH_TELEGRAPH_TICKS: u32 = 30;
pub const DASH_BURST_TICKS: u32 = 20;
pub const DASH_COOLDOWN_TICKS: u32 = 60;
/// How far ahead (in ticks) dashers lead a moving player
pub const DASH_LEAD_TICKS: f32 = 15.0;
/// Drifters pick a new heading at this cadence
pub const DRIFT_RETARGET_TICKS: u64 = 120;

/// What a behavior sees of the world
#[derive(Debug, Clone, Copy)]
pub struct AiContext {
    pub players: [Vec2; 2],
    pub player_vels: [Vec2; 2],
    pub time_ticks: u64,
}

impl AiContext {
    pub fn from_world(world: &World) -> Self {
        let [a, b] = &world.store.players;
        Self {
            players: [a.pos, b.pos],
            player_vels: [a.vel, b.vel],
            time_ticks: world.time_ticks,
        }
    }

    /// Nearest player's index and position
    fn target(&self, pos: Vec2) -> (usize, Vec2) {
        nearest(pos, &self.players).unwrap_or((0, self.players[0]))
    }
}

/// Result of one behavior evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub vel: Vec2,
    pub ai: AiState,
}

pub type BehaviorFn = fn(&Enemy, &AiContext) -> Steering;

/// Behavior table indexed by `EnemyKind::index`
pub const BEHAVIORS: [BehaviorFn; 4] = [chase, drift, dash, swarm];

/// Look up the behavior for a kind
pub fn behavior_for(kind: EnemyKind) -> BehaviorFn {
    BEHAVIORS[kind.index()]
}

/// Blend current velocity toward `desired` by `rate`
fn steer(current: Vec2, desired: Vec2, rate: f32) -> Vec2 {
    current + (desired - current) * rate
}

/// Steer toward the nearer player
fn chase(enemy: &Enemy, ctx: &AiContext) -> Steering {
    let (_, target) = ctx.target(enemy.pos);
    let desired = direction_to(enemy.pos, target) * enemy.kind.stats().speed;
    Steering {
        vel: steer(enemy.vel, desired, 0.08),
        ai: AiState::Seek,
    }
}

/// Wander on a heading that changes periodically; ignores players
fn drift(enemy: &Enemy, ctx: &AiContext) -> Steering {
    let heading = match enemy.ai {
        AiState::Drift { heading } => heading,
        _ => 0.0,
    };
    let epoch = ctx.time_ticks / DRIFT_RETARGET_TICKS;
    let heading = if ctx.time_ticks % DRIFT_RETARGET_TICKS == 0 {
        hash01(enemy.id, epoch as u32) * std::f32::consts::TAU
    } else {
        heading
    };
    let desired = Vec2::from_angle(heading) * enemy.kind.stats().speed;
    Steering {
        vel: steer(enemy.vel, desired, 0.05),
        ai: AiState::Drift { heading },
    }
}

/// Stalk, telegraph, burst toward the predicted position, cool down
fn dash(enemy: &Enemy, ctx: &AiContext) -> Steering {
    let (stage, timer, target) = match enemy.ai {
        AiState::Dash { stage, timer, target } => (stage, timer, target),
        _ => (DashStage::Stalk, DASH_STALK_TICKS, Vec2::ZERO),
    };
    let dash_speed = enemy.kind.stats().speed;
    let timer = timer.saturating_sub(1);

    let (vel, stage, timer, target) = match stage {
        DashStage::Stalk => {
            let (_, player) = ctx.target(enemy.pos);
            let vel = steer(enemy.vel, direction_to(enemy.pos, player) * 1.2, 0.05);
            if timer == 0 {
                (Vec2::ZERO, DashStage::Telegraph, DASH_TELEGRAPH_TICKS, target)
            } else {
                (vel, DashStage::Stalk, timer, target)
            }
        }
        DashStage::Telegraph => {
            // Lock on to where the nearest player is heading
            let (idx, player) = ctx.target(enemy.pos);
            let predicted = player + ctx.player_vels[idx] * DASH_LEAD_TICKS;
            if timer == 0 {
                let vel = direction_to(enemy.pos, predicted) * dash_speed;
                (vel, DashStage::Dash, DASH_BURST_TICKS, predicted)
            } else {
                (Vec2::ZERO, DashStage::Telegraph, timer, predicted)
            }
        }
        DashStage::Dash => {
            let vel = if enemy.vel.length_squared() > 0.0 {
                enemy.vel
            } else {
                direction_to(enemy.pos, target) * dash_speed
            };
            if timer == 0 {
                (vel * 0.5, DashStage::Cooldown, DASH_COOLDOWN_TICKS, target)
            } else {
                (vel, DashStage::Dash, timer, target)
            }
        }
        DashStage::Cooldown => {
            let vel = enemy.vel * 0.9;
            if timer == 0 {
                (vel, DashStage::Stalk, DASH_STALK_TICKS, target)
            } else {
                (vel, DashStage::Cooldown, timer, target)
            }
        }
    };

    Steering {
        vel,
        ai: AiState::Dash { stage, timer, target },
    }
}

/// Minions: twitchy chase
fn swarm(enemy: &Enemy, ctx: &AiContext) -> Steering {
    let (_, target) = ctx.target(enemy.pos);
    let desired = direction_to(enemy.pos, target) * enemy.kind.stats().speed;
    Steering {
        vel: steer(enemy.vel, desired, 0.12),
        ai: AiState::Seek,
    }
}

/// Update every active enemy's velocity and AI memory
pub fn update(world: &mut World) {
    let ctx = AiContext::from_world(world);
    for enemy in world.store.enemies.iter_active_mut() {
        let steering = behavior_for(enemy.kind)(enemy, &ctx);
        enemy.vel = steering.vel;
        enemy.ai = steering.ai;
    }
}
