//! Synchronicity entry point
//!
//! Runs a headless session with the demo autopilot at the fixed tick rate
//! and logs the run. Usage: `synchronicity [settings.json] [max_frames]`.
//! Verbosity follows `RUST_LOG` (default `info`).

use env_logger::{Builder, Env};

use synchronicity::consts::*;
use synchronicity::input::autopilot;
use synchronicity::sim::MatchEvents;
use synchronicity::{ScreenState, Session, Settings};

/// Retries allowed before the demo gives up
const MAX_RETRIES: u32 = 3;

/// Host-side bookkeeping fed by the simulation callbacks
#[derive(Debug, Default)]
struct RunLog {
    kills: u32,
    hits_taken: u32,
    bursts: u32,
    levels_cleared: u32,
}

impl MatchEvents for RunLog {
    fn on_score_update(&mut self, _points: f32) {
        self.kills += 1;
    }

    fn on_damage(&mut self, amount: f32) {
        if amount > 0.0 {
            self.hits_taken += 1;
        }
    }

    fn on_resonance_use(&mut self) {
        self.bursts += 1;
        log::info!("Resonance burst #{}", self.bursts);
    }

    fn on_combo_update(&mut self, combo: u32) {
        if combo >= 5 && combo.is_multiple_of(5) {
            log::info!("Combo x{}", combo);
        }
    }

    fn on_level_complete(&mut self) {
        self.levels_cleared += 1;
    }

    fn on_game_over(&mut self) {
        log::warn!("Integrity depleted");
    }

    fn on_victory(&mut self) {
        log::info!("All sectors synchronized");
    }
}

fn main() {
    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();

    let mut args = std::env::args().skip(1);
    let settings = args.next().map(Settings::load_from_path).unwrap_or_default();
    let max_frames: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60 * 60 * 15);

    log::info!(
        "Synchronicity (headless) starting, quality {}",
        settings.quality.as_str()
    );

    let mut session = Session::new(settings);
    let mut run = RunLog::default();
    session.start();

    for _ in 0..max_frames {
        let screen = session.screen();
        match screen {
            ScreenState::Tutorial | ScreenState::Playing => {
                let input = autopilot(session.game_loop().world(), session.stats().resonance_ready());
                session.update(SIM_DT, &input, &mut run);
            }
            ScreenState::Paused => session.toggle_pause(),
            ScreenState::LevelTransition | ScreenState::GameOver | ScreenState::Victory => {
                if let Some(request) = session.take_narrative_request() {
                    log::debug!("Story prompt: {}", request.prompt());
                    // No text generator offline; the built-in log stands in
                    session.deliver_story(request.serial, None);
                }
                if let Some(story) = session.story() {
                    log::info!("[{}] {}: {}", story.chapter, story.title, story.content);
                }

                match screen {
                    ScreenState::LevelTransition => session.next_level(),
                    ScreenState::GameOver if session.retry_count() < MAX_RETRIES => session.restart(),
                    _ => break,
                }
            }
            ScreenState::Menu => break,
        }
    }

    let stats = session.stats();
    log::info!(
        "Run over: level {}, score {}, max combo {}, {} kills, {} hits taken, {} levels cleared",
        stats.level,
        stats.score,
        stats.max_combo,
        run.kills,
        run.hits_taken,
        run.levels_cleared
    );
}
