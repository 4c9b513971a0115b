//! The beam connecting the two cores
//!
//! Derived every tick from live player positions; there is no stored copy.

use glam::Vec2;

use super::geometry::circle_segment_overlap;
use super::state::Player;
use crate::consts::*;

/// Tether geometry and power state for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tether {
    pub start: Vec2,
    pub end: Vec2,
    pub length: f32,
    /// Within `MAX_TETHER_DISTANCE`; severed beams deal no damage
    pub active: bool,
    /// Within `OVERDRIVE_DISTANCE`
    pub overdrive: bool,
}

impl Tether {
    /// Compute the beam between two cores
    pub fn between(a: &Player, b: &Player) -> Self {
        Self::from_points(a.pos, b.pos)
    }

    pub fn from_points(start: Vec2, end: Vec2) -> Self {
        let length = start.distance(end);
        let active = length <= MAX_TETHER_DISTANCE;
        Self {
            start,
            end,
            length,
            active,
            overdrive: active && length <= OVERDRIVE_DISTANCE,
        }
    }

    /// `(start, end, active, overdrive)`
    pub fn segment(&self) -> (Vec2, Vec2, bool, bool) {
        (self.start, self.end, self.active, self.overdrive)
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    /// Damage multiplier for the current power state
    pub fn multiplier(&self) -> f32 {
        if !self.active {
            0.0
        } else if self.overdrive {
            OVERDRIVE_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Damage applied this tick to anything the beam touches
    pub fn damage_per_tick(&self) -> f32 {
        TETHER_DAMAGE * self.multiplier()
    }

    /// Beam width, fixed regardless of distance
    pub fn width(&self) -> f32 {
        TETHER_DAMAGE_WIDTH
    }

    /// Does the live beam touch a circle?
    pub fn touches(&self, center: Vec2, radius: f32) -> bool {
        self.active
            && circle_segment_overlap(center, radius, self.start, self.end, self.width() / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdrive_when_close() {
        let tether = Tether::from_points(Vec2::ZERO, Vec2::new(100.0, 0.0));
        assert!(tether.active);
        assert!(tether.overdrive);
        assert_eq!(tether.damage_per_tick(), TETHER_DAMAGE * 3.0);
    }

    #[test]
    fn test_overdrive_boundary_is_inclusive() {
        let tether = Tether::from_points(Vec2::ZERO, Vec2::new(OVERDRIVE_DISTANCE, 0.0));
        assert!(tether.overdrive);
        let tether = Tether::from_points(Vec2::ZERO, Vec2::new(OVERDRIVE_DISTANCE + 0.5, 0.0));
        assert!(!tether.overdrive);
        assert_eq!(tether.multiplier(), 1.0);
    }

    #[test]
    fn test_severed_beyond_max_distance() {
        let tether = Tether::from_points(Vec2::ZERO, Vec2::new(MAX_TETHER_DISTANCE + 1.0, 0.0));
        assert!(!tether.active);
        assert!(!tether.overdrive);
        assert_eq!(tether.damage_per_tick(), 0.0);
        // A severed beam touches nothing even when geometrically crossing
        assert!(!tether.touches(Vec2::new(100.0, 0.0), 10.0));
    }

    #[test]
    fn test_touch_uses_half_width() {
        let tether = Tether::from_points(Vec2::ZERO, Vec2::new(200.0, 0.0));
        let reach = 10.0 + TETHER_DAMAGE_WIDTH / 2.0;
        assert!(tether.touches(Vec2::new(100.0, reach), 10.0));
        assert!(!tether.touches(Vec2::new(100.0, reach + 0.5), 10.0));
    }
}
