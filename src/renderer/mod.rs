//! CPU-side frame building
//!
//! Turns a `World` into a flat triangle list plus text labels. Any backend
//! that can draw colored triangles and strings can present the result; the
//! vertex buffer is `Pod` and uploads as-is via `FrameMesh::as_bytes`.

pub mod shapes;
pub mod vertex;

use glam::Vec2;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::ai::DASH_TELEGRAPH_TICKS;
use crate::sim::state::{AiState, DashStage};
use crate::sim::{BossState, PlayerRole, World};
pub use vertex::{Vertex, colors, palette_color};

/// Text to draw on top of the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub pos: Vec2,
    pub size: f32,
    pub color: [f32; 4],
}

/// Everything needed to present one frame
#[derive(Debug, Clone, Default)]
pub struct FrameMesh {
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
}

impl FrameMesh {
    /// Raw vertex bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    fn push(&mut self, vertices: Vec<Vertex>) {
        self.vertices.extend(vertices);
    }
}

/// Build the frame for the world's current state
///
/// Draw order, back to front: background, trails, tether, power-ups,
/// particles, enemies, boss, players, labels.
pub fn build_frame(world: &World, settings: &Settings) -> FrameMesh {
    let mut frame = FrameMesh::default();
    let segments = settings.quality.circle_segments();
    let time = world.time_ticks as f32;

    frame.push(shapes::rect(
        Vec2::ZERO,
        Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
        colors::BACKGROUND,
    ));

    // Trails
    if settings.trails {
        let max_alpha = if settings.high_contrast { 1.0 } else { 0.5 };
        for player in &world.store.players {
            let points: Vec<Vec2> = player.trail.iter().copied().collect();
            let color = match player.role {
                PlayerRole::Anchor => colors::ANCHOR_GLOW,
                PlayerRole::Follower => colors::FOLLOWER_GLOW,
            };
            frame.push(shapes::trail(&points, player.radius * 0.8, color, max_alpha));
        }
    }

    // Tether
    let tether = world.tether();
    if tether.active {
        let (color, width) = if tether.overdrive {
            // Overdrive pulses slightly wider
            let pulse = 1.0 + 0.25 * (time * 0.3).sin().abs();
            (colors::TETHER_OVERDRIVE, TETHER_DAMAGE_WIDTH * pulse)
        } else {
            (colors::TETHER, TETHER_DAMAGE_WIDTH)
        };
        frame.push(shapes::thick_line(tether.start, tether.end, width, color));
        let core_width = if settings.high_contrast { 3.0 } else { 2.0 };
        frame.push(shapes::thick_line(tether.start, tether.end, core_width, colors::WHITE));
    } else {
        frame.push(shapes::thick_line(tether.start, tether.end, 1.5, colors::TETHER_SEVERED));
    }

    // Power-ups blink out over their last second
    for power_up in world.store.power_ups.iter_active() {
        let alpha = if power_up.life < 60 && (power_up.life / 6) % 2 == 0 {
            0.3
        } else {
            1.0
        };
        let color = vertex::with_alpha(palette_color(power_up.kind.palette()), alpha);
        frame.push(shapes::ring(power_up.pos, power_up.radius, power_up.radius + 3.0, color, segments));
        frame.push(shapes::circle(power_up.pos, power_up.radius * 0.5, color, segments));
    }

    // Particles
    for particle in world.store.particles.iter_active() {
        let color = vertex::with_alpha(palette_color(particle.color), particle.life_fraction());
        let size = particle.size.max(1.0);
        frame.push(shapes::circle(particle.pos, size, color, 6));
    }

    // Enemies
    for enemy in world.store.enemies.iter_active() {
        let color = palette_color(enemy.kind.palette());
        frame.push(shapes::circle(enemy.pos, enemy.radius, color, segments));

        if let AiState::Dash {
            stage: DashStage::Telegraph,
            timer,
            ..
        } = enemy.ai
        {
            // Warning ring shrinks onto the dasher as the lunge nears
            let t = timer as f32 / DASH_TELEGRAPH_TICKS as f32;
            let outer = enemy.radius + 4.0 + 16.0 * t;
            frame.push(shapes::ring(enemy.pos, outer - 2.0, outer, colors::WHITE, segments));
        }
    }

    // Boss
    if let Some(boss) = world.store.active_boss() {
        let alpha = match boss.state {
            BossState::Intro { ticks } => 1.0 - ticks as f32 / BOSS_INTRO_TICKS as f32,
            _ => 1.0,
        };
        let color = vertex::with_alpha(colors::BOSS, alpha);
        frame.push(shapes::circle(boss.pos, boss.radius, color, segments * 2));
        frame.push(shapes::ring(
            boss.pos,
            boss.radius * 0.4,
            boss.radius * 0.5,
            vertex::with_alpha(colors::WHITE, alpha),
            segments,
        ));

        let bar_width = 400.0;
        let fraction = (boss.hp / boss.max_hp).clamp(0.0, 1.0);
        let origin = Vec2::new((ARENA_WIDTH - bar_width) / 2.0, 20.0);
        frame.push(shapes::rect(origin, Vec2::new(bar_width, 8.0), colors::HP_BAR_BACK));
        frame.push(shapes::rect(origin, Vec2::new(bar_width * fraction, 8.0), colors::BOSS));
        frame.labels.push(Label {
            text: format!("PHASE {}", boss.phase.max(1)),
            pos: origin + Vec2::new(bar_width + 12.0, 8.0),
            size: 14.0,
            color: colors::WHITE,
        });
    }

    // Players blink while invulnerable
    for player in &world.store.players {
        let visible = !player.is_invulnerable() || (player.invuln_ticks / 4) % 2 == 0;
        if !visible {
            continue;
        }
        let (core, glow) = match player.role {
            PlayerRole::Anchor => (colors::ANCHOR, colors::ANCHOR_GLOW),
            PlayerRole::Follower => (colors::FOLLOWER, colors::FOLLOWER_GLOW),
        };
        frame.push(shapes::ring(
            player.pos,
            player.radius,
            player.radius + 4.0,
            vertex::with_alpha(glow, 0.5),
            segments,
        ));
        frame.push(shapes::circle(player.pos, player.radius, core, segments));
    }

    if settings.floating_text {
        for text in world.store.texts.iter_active() {
            let fade = (text.life as f32 / 20.0).min(1.0);
            frame.labels.push(Label {
                text: text.text.clone(),
                pos: text.pos,
                size: text.size,
                color: vertex::with_alpha(palette_color(text.color), fade),
            });
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects;
    use crate::sim::Palette;

    #[test]
    fn test_bytes_match_vertices() {
        let world = World::new(1, 1, 0);
        let frame = build_frame(&world, &Settings::default());
        assert!(!frame.vertices.is_empty());
        assert_eq!(frame.as_bytes().len(), frame.vertices.len() * Vertex::STRIDE);
        assert_eq!(frame.vertices.len() % 3, 0);
    }

    #[test]
    fn test_severed_tether_is_dim() {
        let mut world = World::new(1, 1, 0);
        world.store.players[1].pos = Vec2::new(1000.0, 700.0);
        let frame = build_frame(&world, &Settings::default());
        assert!(frame.vertices.iter().any(|v| v.color == colors::TETHER_SEVERED));
        assert!(!frame.vertices.iter().any(|v| v.color == colors::TETHER));
    }

    #[test]
    fn test_overdrive_tether_color() {
        let world = World::new(1, 1, 0);
        assert!(world.tether().overdrive);
        let frame = build_frame(&world, &Settings::default());
        assert!(frame.vertices.iter().any(|v| v.color == colors::TETHER_OVERDRIVE));
    }

    #[test]
    fn test_labels_follow_setting() {
        let mut world = World::new(1, 1, 0);
        effects::callout(&mut world, Vec2::new(100.0, 100.0), "+100", Palette::TextScore, 16.0);

        let frame = build_frame(&world, &Settings::default());
        assert_eq!(frame.labels.len(), 1);
        assert_eq!(frame.labels[0].text, "+100");

        let quiet = Settings {
            floating_text: false,
            ..Default::default()
        };
        assert!(build_frame(&world, &quiet).labels.is_empty());
    }

    #[test]
    fn test_boss_hp_bar_label() {
        let mut world = World::new(5, 1, 0);
        let boss = crate::sim::boss::summon(&mut world);
        world.store.spawn_boss(boss);
        let frame = build_frame(&world, &Settings::default());
        assert!(frame.labels.iter().any(|l| l.text == "PHASE 1"));
    }
}
