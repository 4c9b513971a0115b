//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::Palette;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Bytes per vertex in an uploaded buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const ANCHOR: [f32; 4] = [0.937, 0.267, 0.267, 1.0];
    pub const ANCHOR_GLOW: [f32; 4] = [0.988, 0.647, 0.647, 1.0];
    pub const FOLLOWER: [f32; 4] = [0.231, 0.510, 0.965, 1.0];
    pub const FOLLOWER_GLOW: [f32; 4] = [0.576, 0.773, 0.992, 1.0];
    pub const TETHER: [f32; 4] = [0.847, 0.706, 0.996, 1.0];
    pub const TETHER_OVERDRIVE: [f32; 4] = [0.984, 0.749, 0.141, 1.0];
    pub const TETHER_SEVERED: [f32; 4] = [0.937, 0.267, 0.267, 0.25];
    pub const CHASER: [f32; 4] = [0.133, 0.773, 0.369, 1.0];
    pub const DRIFTER: [f32; 4] = [0.918, 0.702, 0.031, 1.0];
    pub const DASHER: [f32; 4] = [0.976, 0.451, 0.086, 1.0];
    pub const MINION: [f32; 4] = [0.753, 0.518, 0.988, 1.0];
    pub const BOSS: [f32; 4] = [0.659, 0.333, 0.969, 1.0];
    pub const REPAIR: [f32; 4] = [0.063, 0.725, 0.506, 1.0];
    pub const CHARGE: [f32; 4] = [0.957, 0.447, 0.714, 1.0];
    pub const TEXT_SCORE: [f32; 4] = [0.984, 0.749, 0.141, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const HP_BAR_BACK: [f32; 4] = [0.2, 0.2, 0.25, 0.8];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.02, 1.0];
}

/// RGBA for a palette tag
pub fn palette_color(palette: Palette) -> [f32; 4] {
    match palette {
        Palette::Anchor => colors::ANCHOR,
        Palette::Follower => colors::FOLLOWER,
        Palette::Chaser => colors::CHASER,
        Palette::Drifter => colors::DRIFTER,
        Palette::Dasher => colors::DASHER,
        Palette::Minion => colors::MINION,
        Palette::Boss => colors::BOSS,
        Palette::Repair => colors::REPAIR,
        Palette::Charge => colors::CHARGE,
        Palette::Resonance => colors::TETHER,
        Palette::TextDamage | Palette::White => colors::WHITE,
        Palette::TextScore => colors::TEXT_SCORE,
    }
}

/// Same color with its alpha scaled
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}
