//! Particles and floating text
//!
//! Cosmetic, apart from seek orbs which feed resonance when they reach a core.

use glam::Vec2;
use rand::Rng;

use super::geometry::{direction_to, nearest};
use super::state::{FloatingText, Palette, Particle, ParticleBehavior, UNASSIGNED, World};

const ORB_RADIUS: f32 = 4.0;
const ORB_LIFE: u32 = 180;
const TEXT_LIFE: u32 = 50;

/// Radial burst of cosmetic debris, trimmed to the particle budget
pub fn burst(world: &mut World, pos: Vec2, color: Palette, count: u32, speed: f32) {
    let live = world.store.particles.active_count();
    let room = world.particle_budget.saturating_sub(live) as u32;
    for _ in 0..count.min(room) {
        let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
        let magnitude = speed * (0.4 + world.rng.random::<f32>() * 0.6);
        let life = 25 + world.rng.random_range(0..20);
        let particle = Particle {
            id: UNASSIGNED,
            pos,
            radius: 0.0,
            active: true,
            vel: Vec2::from_angle(angle) * magnitude,
            life,
            max_life: life,
            color,
            size: 2.0 + world.rng.random::<f32>() * 2.0,
            behavior: ParticleBehavior::Drift,
        };
        world.store.spawn_particle(particle);
    }
}

/// Resonance orbs released by a kill; never subject to the cosmetic budget
pub fn seek_orbs(world: &mut World, pos: Vec2, count: u32) {
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count.max(1) as f32
            + world.rng.random::<f32>();
        let particle = Particle {
            id: UNASSIGNED,
            pos,
            radius: ORB_RADIUS,
            active: true,
            vel: Vec2::from_angle(angle) * 3.0,
            life: ORB_LIFE,
            max_life: ORB_LIFE,
            color: Palette::Resonance,
            size: ORB_RADIUS,
            behavior: ParticleBehavior::Seek,
        };
        world.store.spawn_particle(particle);
    }
}

/// Rising callout text
pub fn callout(world: &mut World, pos: Vec2, text: impl Into<String>, color: Palette, size: f32) {
    let text = FloatingText {
        id: UNASSIGNED,
        pos,
        active: true,
        text: text.into(),
        color,
        life: TEXT_LIFE,
        size,
        vel: Vec2::new(0.0, -1.2),
    };
    world.store.spawn_floating_text(text);
}

/// Integrate particles and texts, expiring the spent ones
pub fn update(world: &mut World) {
    let players = world.player_positions();
    for particle in world.store.particles.iter_active_mut() {
        if particle.behavior == ParticleBehavior::Seek {
            if let Some((_, target)) = nearest(particle.pos, &players) {
                particle.vel += direction_to(particle.pos, target) * 0.6;
                particle.vel *= 0.94;
            }
        } else {
            particle.vel *= 0.96;
        }
        particle.pos += particle.vel;
        particle.life = particle.life.saturating_sub(1);
        if particle.life == 0 {
            particle.active = false;
        }
    }

    for text in world.store.texts.iter_active_mut() {
        text.pos += text.vel;
        text.vel *= 0.95;
        text.life = text.life.saturating_sub(1);
        if text.life == 0 {
            text.active = false;
        }
    }
}
