//! Fixed-timestep driver
//!
//! Accumulates real frame time and runs whole simulation ticks, capped per
//! frame to prevent a spiral of death. Rendering reads the world as it is,
//! so a paused loop keeps showing its last frame.

use crate::consts::*;
use crate::renderer::{self, FrameMesh};
use crate::settings::Settings;
use crate::sim::{MatchEvents, MatchStats, Outcome, TickInput, World, tick};

/// Longest frame time accepted; anything slower is a stall, not gameplay
const MAX_FRAME_DT: f32 = 0.25;

/// Summary of one `advance` call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSummary {
    /// Simulation ticks run this frame
    pub ticks: u32,
    pub kills: u32,
    pub burst_fired: bool,
    /// Outcome latched during this frame
    pub outcome: Option<Outcome>,
}

/// Owns the current `World` and feeds it fixed ticks
#[derive(Debug, Clone)]
pub struct GameLoop {
    world: World,
    accumulator: f32,
    seed: u64,
    generation: u32,
    particle_budget: usize,
    trail_length: usize,
}

impl GameLoop {
    pub fn new(level: u32, seed: u64, settings: &Settings) -> Self {
        let mut game_loop = Self {
            world: World::new(level, seed, 0),
            accumulator: 0.0,
            seed,
            generation: 0,
            particle_budget: settings.max_particles(),
            trail_length: settings.trail_length(),
        };
        game_loop.configure_world();
        game_loop
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Run as many fixed ticks as `frame_dt` seconds allow
    pub fn advance(
        &mut self,
        frame_dt: f32,
        stats: &mut MatchStats,
        input: &TickInput,
        events: &mut impl MatchEvents,
    ) -> FrameSummary {
        let mut summary = FrameSummary::default();
        if input.paused || self.world.is_finished() {
            // Time spent paused never turns into catch-up ticks
            self.accumulator = 0.0;
            return summary;
        }

        let dt = if frame_dt.is_finite() { frame_dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.accumulator += dt;

        let mut input = input.clone();
        while self.accumulator >= SIM_DT && summary.ticks < MAX_SUBSTEPS {
            let report = tick(&mut self.world, stats, &input, events);
            self.accumulator -= SIM_DT;
            summary.ticks += 1;
            summary.kills += report.kills;
            summary.burst_fired |= report.burst_fired;

            // One-shot inputs only apply to the first substep
            input.burst = false;

            if report.outcome.is_some() {
                summary.outcome = report.outcome;
                self.accumulator = 0.0;
                break;
            }
        }

        summary
    }

    /// Build the current frame (valid whether or not ticks are running)
    pub fn render(&self, settings: &Settings) -> FrameMesh {
        renderer::build_frame(&self.world, settings)
    }

    /// Discard every entity and start `level` from scratch
    pub fn rebuild(&mut self, level: u32) {
        self.generation += 1;
        self.world = World::new(level, self.seed, self.generation);
        self.accumulator = 0.0;
        self.configure_world();
    }

    /// Pick up changed quality settings (takes effect immediately)
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.particle_budget = settings.max_particles();
        self.trail_length = settings.trail_length();
        self.configure_world();
    }

    fn configure_world(&mut self) {
        self.world.particle_budget = self.particle_budget;
        self.world.trail_length = self.trail_length;
    }
}
