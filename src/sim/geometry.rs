//! Geometry helpers for circles and line segments
//!
//! Everything in the arena is a circle except the tether, which is a thick
//! line segment. These are the only intersection tests the combat resolver needs.

use glam::Vec2;

/// Closest point on segment `a..b` to `p`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 0.0001 {
        // Degenerate segment
        return a;
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from `p` to segment `a..b`
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// True when two circles overlap (touching counts)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// True when a circle touches a segment thickened by `half_width` on each side
#[inline]
pub fn circle_segment_overlap(center: Vec2, radius: f32, a: Vec2, b: Vec2, half_width: f32) -> bool {
    point_segment_distance(center, a, b) <= radius + half_width
}

/// Unit direction from `from` toward `to`, zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Index and position of whichever point in `candidates` is nearest `pos`
pub fn nearest(pos: Vec2, candidates: &[Vec2]) -> Option<(usize, Vec2)> {
    candidates
        .iter()
        .copied()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            pos.distance_squared(*a)
                .partial_cmp(&pos.distance_squared(*b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Cheap deterministic hash to a value in [0, 1)
///
/// Used where behavior must stay a pure function of entity id and time.
#[inline]
pub fn hash01(a: u32, b: u32) -> f32 {
    let hash = a
        .wrapping_mul(2654435761)
        .wrapping_add(b.wrapping_mul(31337))
        .rotate_left(13)
        .wrapping_mul(0x9E37_79B1);
    (hash >> 8) as f32 / (1u32 << 24) as f32
}
