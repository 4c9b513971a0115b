//! Keyboard mapping for both cores
//!
//! Keys are identified by the host's key names (`"w"`, `"ArrowUp"`, `" "`).
//! Single characters compare case-insensitively so Shift or Caps Lock
//! never drops a direction.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::World;
use crate::sim::geometry::{direction_to, nearest};
use crate::sim::tick::TickInput;

/// Canonical form of a key name
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Direction keys for one core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlScheme {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
}

impl ControlScheme {
    pub fn wasd() -> Self {
        Self {
            up: "w".into(),
            down: "s".into(),
            left: "a".into(),
            right: "d".into(),
        }
    }

    pub fn arrows() -> Self {
        Self {
            up: "ArrowUp".into(),
            down: "ArrowDown".into(),
            left: "ArrowLeft".into(),
            right: "ArrowRight".into(),
        }
    }

    /// Movement vector from held keys (screen space, +y down; not normalized)
    pub fn direction(&self, keys: &KeyboardState) -> Vec2 {
        let axis = |neg: &str, pos: &str| -> f32 {
            (keys.is_held(pos) as i32 - keys.is_held(neg) as i32) as f32
        };
        Vec2::new(axis(&self.left, &self.right), axis(&self.up, &self.down))
    }
}

/// Full binding set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    pub anchor: ControlScheme,
    pub follower: ControlScheme,
    pub burst: String,
    pub pause: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            anchor: ControlScheme::wasd(),
            follower: ControlScheme::arrows(),
            burst: " ".into(),
            pause: "Escape".into(),
        }
    }
}

impl Controls {
    /// Per-core movement and burst for the next tick
    pub fn tick_input(&self, keys: &KeyboardState) -> TickInput {
        TickInput {
            anchor_dir: self.anchor.direction(keys),
            follower_dir: self.follower.direction(keys),
            burst: keys.is_held(&self.burst),
            paused: false,
        }
    }

    pub fn is_pause(&self, key: &str) -> bool {
        normalize_key(key) == normalize_key(&self.pause)
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<String>,
}

impl KeyboardState {
    pub fn key_down(&mut self, key: &str) {
        self.held.insert(normalize_key(key));
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&normalize_key(key));
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&normalize_key(key))
    }

    /// Forget everything (focus lost, screen change)
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

/// Demo-mode pilot: keeps the cores close, sweeps the beam across the
/// nearest threat and fires the burst when a crowd gathers
pub fn autopilot(world: &World, resonance_ready: bool) -> TickInput {
    let [anchor, follower] = world.player_positions();
    let mid = (anchor + follower) * 0.5;

    let threats: Vec<Vec2> = world
        .store
        .enemies
        .iter_active()
        .map(|e| e.pos)
        .chain(world.store.active_boss().map(|b| b.pos))
        .collect();

    let target = nearest(mid, &threats).map(|(_, pos)| pos).unwrap_or_else(|| {
        // Nothing to fight: go for a power-up, else hold the center
        let pickups: Vec<Vec2> = world.store.power_ups.iter_active().map(|p| p.pos).collect();
        nearest(mid, &pickups)
            .map(|(_, pos)| pos)
            .unwrap_or_else(crate::arena_center)
    });

    // Orbit the cores around the target so the beam sweeps through it
    let phase = world.time_ticks as f32 * 0.05;
    let offset = Vec2::from_angle(phase) * 70.0;
    let anchor_goal = target + offset;
    let follower_goal = target - offset;

    let crowd = threats.iter().filter(|p| p.distance(mid) < 250.0).count();

    TickInput {
        anchor_dir: arrive(anchor, anchor_goal),
        follower_dir: arrive(follower, follower_goal),
        burst: resonance_ready && crowd >= 5,
        paused: false,
    }
}

/// Head for `goal`, stopping when close enough
fn arrive(pos: Vec2, goal: Vec2) -> Vec2 {
    if pos.distance(goal) < 4.0 {
        Vec2::ZERO
    } else {
        direction_to(pos, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("W"), "w");
        assert_eq!(normalize_key("ArrowUp"), "ArrowUp");
        assert_eq!(normalize_key(" "), " ");
    }

    #[test]
    fn test_schemes_are_independent() {
        let controls = Controls::default();
        let mut keys = KeyboardState::default();
        keys.key_down("W");
        keys.key_down("ArrowRight");

        let input = controls.tick_input(&keys);
        assert_eq!(input.anchor_dir, Vec2::new(0.0, -1.0));
        assert_eq!(input.follower_dir, Vec2::new(1.0, 0.0));
        assert!(!input.burst);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let scheme = ControlScheme::wasd();
        let mut keys = KeyboardState::default();
        keys.key_down("a");
        keys.key_down("d");
        keys.key_down("s");
        assert_eq!(scheme.direction(&keys), Vec2::new(0.0, 1.0));
        keys.key_up("S");
        assert_eq!(scheme.direction(&keys), Vec2::ZERO);
    }

    #[test]
    fn test_burst_and_pause_keys() {
        let controls = Controls::default();
        let mut keys = KeyboardState::default();
        keys.key_down(" ");
        assert!(controls.tick_input(&keys).burst);
        assert!(controls.is_pause("Escape"));
        assert!(!controls.is_pause("p"));
        keys.clear();
        assert!(!controls.tick_input(&keys).burst);
    }

    #[test]
    fn test_autopilot_heads_for_threat() {
        let mut world = World::new(1, 5, 0);
        let enemy = crate::sim::spawner::make_enemy(&mut world, crate::sim::EnemyKind::Chaser, Vec2::new(900.0, 384.0), Vec2::ZERO);
        world.store.spawn_enemy(enemy);
        let input = autopilot(&world, false);
        assert!(input.anchor_dir.x > 0.0);
        assert!(input.follower_dir.x > 0.0);
        assert!(!input.burst);
    }
}
