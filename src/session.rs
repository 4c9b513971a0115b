//! Screen flow around the simulation
//!
//! `Menu -> Tutorial -> Playing <-> Paused`, then `LevelTransition`,
//! `GameOver` or `Victory` when the world latches an outcome. The session
//! owns the match stats, forwards simulation callbacks to the host, and
//! queues story requests that the host fulfils whenever it can.

use serde::{Deserialize, Serialize};

use crate::game_loop::{FrameSummary, GameLoop};
use crate::narrative::{self, NarrativeRequest, StoryLog, StoryOutcome};
use crate::renderer::FrameMesh;
use crate::settings::Settings;
use crate::sim::{MatchEvents, MatchStats, TickInput};

/// Which screen the host should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenState {
    Menu,
    /// Short briefing before play; counts down on its own
    Tutorial,
    Playing,
    Paused,
    LevelTransition,
    GameOver,
    Victory,
}

/// Forwards callbacks to the host while noting terminal ones
struct Relay<'a, E: MatchEvents> {
    host: &'a mut E,
    level_complete: bool,
    game_over: bool,
    victory: bool,
}

impl<'a, E: MatchEvents> Relay<'a, E> {
    fn new(host: &'a mut E) -> Self {
        Self {
            host,
            level_complete: false,
            game_over: false,
            victory: false,
        }
    }
}

impl<E: MatchEvents> MatchEvents for Relay<'_, E> {
    fn on_score_update(&mut self, points: f32) {
        self.host.on_score_update(points);
    }
    fn on_damage(&mut self, amount: f32) {
        self.host.on_damage(amount);
    }
    fn on_resonance_charge(&mut self, amount: f32) {
        self.host.on_resonance_charge(amount);
    }
    fn on_resonance_use(&mut self) {
        self.host.on_resonance_use();
    }
    fn on_combo_update(&mut self, combo: u32) {
        self.host.on_combo_update(combo);
    }
    fn on_level_complete(&mut self) {
        self.level_complete = true;
        self.host.on_level_complete();
    }
    fn on_game_over(&mut self) {
        self.game_over = true;
        self.host.on_game_over();
    }
    fn on_victory(&mut self) {
        self.victory = true;
        self.host.on_victory();
    }
}

/// One play session: stats, the running world, and the screens around it
#[derive(Debug)]
pub struct Session {
    screen: ScreenState,
    stats: MatchStats,
    settings: Settings,
    game_loop: GameLoop,
    tutorial_remaining: f32,
    retry_count: u32,
    /// Request waiting for the host to pick up
    pending_request: Option<NarrativeRequest>,
    /// Serial of the request whose answer we still accept
    awaiting: Option<NarrativeRequest>,
    story: Option<StoryLog>,
    loading: bool,
    next_serial: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("New session (seed {})", seed);
        Self {
            screen: ScreenState::Menu,
            stats: MatchStats::default(),
            game_loop: GameLoop::new(1, seed, &settings),
            settings,
            tutorial_remaining: 0.0,
            retry_count: 0,
            pending_request: None,
            awaiting: None,
            story: None,
            loading: false,
            next_serial: 1,
        }
    }

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Whole seconds left on the tutorial screen, for display
    pub fn tutorial_countdown(&self) -> u32 {
        self.tutorial_remaining.max(0.0).ceil() as u32
    }

    /// The simulation only runs on the playing screen
    pub fn is_paused(&self) -> bool {
        self.screen != ScreenState::Playing
    }

    pub fn story(&self) -> Option<&StoryLog> {
        self.story.as_ref()
    }

    /// A story request is in flight (gates the overlay only)
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Change settings mid-session
    pub fn apply_settings(&mut self, settings: Settings) {
        self.game_loop.apply_settings(&settings);
        self.settings = settings;
    }

    /// Leave the menu for a fresh run
    pub fn start(&mut self) {
        if self.screen != ScreenState::Menu {
            return;
        }
        self.stats = MatchStats::default();
        self.game_loop.rebuild(self.stats.level);
        self.clear_story();
        self.tutorial_remaining = self.settings.tutorial_seconds;
        self.screen = if self.tutorial_remaining > 0.0 {
            ScreenState::Tutorial
        } else {
            ScreenState::Playing
        };
        log::info!("Run started");
    }

    pub fn skip_tutorial(&mut self) {
        if self.screen == ScreenState::Tutorial {
            self.tutorial_remaining = 0.0;
            self.screen = ScreenState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.screen = match self.screen {
            ScreenState::Playing => ScreenState::Paused,
            ScreenState::Paused => ScreenState::Playing,
            other => other,
        };
    }

    /// Advance timers and the simulation by one rendered frame
    pub fn update(
        &mut self,
        frame_dt: f32,
        input: &TickInput,
        events: &mut impl MatchEvents,
    ) -> FrameSummary {
        if self.screen == ScreenState::Tutorial {
            self.tutorial_remaining -= frame_dt.max(0.0);
            if self.tutorial_remaining <= 0.0 {
                self.skip_tutorial();
            }
            return FrameSummary::default();
        }

        let input = TickInput {
            paused: input.paused || self.is_paused(),
            ..input.clone()
        };
        let mut relay = Relay::new(events);
        let summary = self
            .game_loop
            .advance(frame_dt, &mut self.stats, &input, &mut relay);

        let (game_over, victory, level_complete) =
            (relay.game_over, relay.victory, relay.level_complete);
        if game_over {
            self.enter_terminal(ScreenState::GameOver, StoryOutcome::GameOver);
        } else if victory {
            self.enter_terminal(ScreenState::Victory, StoryOutcome::Victory);
        } else if level_complete {
            let outcome = if crate::is_boss_level(self.stats.level + 1) {
                StoryOutcome::BossIntro
            } else {
                StoryOutcome::Complete
            };
            self.enter_terminal(ScreenState::LevelTransition, outcome);
        }

        summary
    }

    fn enter_terminal(&mut self, screen: ScreenState, outcome: StoryOutcome) {
        if matches!(
            self.screen,
            ScreenState::GameOver | ScreenState::Victory | ScreenState::LevelTransition
        ) {
            return;
        }
        log::info!("{:?} on level {} (score {})", screen, self.stats.level, self.stats.score);
        self.screen = screen;

        let integrity = if outcome == StoryOutcome::GameOver {
            0.0
        } else {
            self.stats.integrity
        };
        let request = NarrativeRequest {
            serial: self.next_serial,
            level: self.stats.level,
            integrity,
            score: self.stats.score,
            outcome,
        };
        self.next_serial += 1;
        self.story = None;
        self.loading = true;
        self.awaiting = Some(request.clone());
        self.pending_request = Some(request);
    }

    /// Hand the queued story request to the host (at most once)
    pub fn take_narrative_request(&mut self) -> Option<NarrativeRequest> {
        self.pending_request.take()
    }

    /// Accept the host's answer for `serial`; stale answers are dropped
    pub fn deliver_story(&mut self, serial: u64, raw: Option<&str>) -> bool {
        match &self.awaiting {
            Some(request) if request.serial == serial => {
                self.story = Some(narrative::resolve_story(request, raw));
                self.awaiting = None;
                self.loading = false;
                true
            }
            _ => {
                log::debug!("Dropping stale story #{}", serial);
                false
            }
        }
    }

    /// Continue from a level transition to the next level
    pub fn next_level(&mut self) {
        if self.screen != ScreenState::LevelTransition {
            return;
        }
        self.stats.advance_level();
        self.game_loop.rebuild(self.stats.level);
        self.clear_story();
        self.screen = ScreenState::Playing;
    }

    /// Retry after a defeat, or start over after a victory
    pub fn restart(&mut self) {
        match self.screen {
            ScreenState::Victory => self.stats = MatchStats::default(),
            ScreenState::GameOver => self.stats.reset_for_retry(),
            _ => return,
        }
        self.retry_count += 1;
        self.game_loop.rebuild(self.stats.level);
        self.clear_story();
        self.screen = ScreenState::Playing;
        log::info!("Restart #{} on level {}", self.retry_count, self.stats.level);
    }

    pub fn return_to_menu(&mut self) {
        self.clear_story();
        self.screen = ScreenState::Menu;
    }

    fn clear_story(&mut self) {
        self.story = None;
        self.loading = false;
        self.awaiting = None;
        self.pending_request = None;
    }

    /// Current frame; still valid while paused or between levels
    pub fn render(&self) -> FrameMesh {
        self.game_loop.render(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::narrative::Mood;
    use crate::sim::NoopEvents;

    #[derive(Default)]
    struct Counter {
        level_complete: u32,
        game_over: u32,
        victory: u32,
        damage: u32,
    }

    impl MatchEvents for Counter {
        fn on_damage(&mut self, _amount: f32) {
            self.damage += 1;
        }
        fn on_level_complete(&mut self) {
            self.level_complete += 1;
        }
        fn on_game_over(&mut self) {
            self.game_over += 1;
        }
        fn on_victory(&mut self) {
            self.victory += 1;
        }
    }

    fn playing_session() -> Session {
        let settings = Settings {
            seed: Some(99),
            ..Default::default()
        };
        let mut session = Session::new(settings);
        session.start();
        session.skip_tutorial();
        assert_eq!(session.screen(), ScreenState::Playing);
        session
    }

    /// Put the session on `level` with nothing left to fight
    fn cleared_level(session: &mut Session, level: u32) {
        session.stats.level = level;
        session.game_loop.rebuild(level);
        let world = session.game_loop.world_mut();
        world.wave.remaining = 0;
        world.wave.boss_pending = false;
        world.boss_defeated = true;
    }

    #[test]
    fn test_tutorial_counts_down() {
        let mut session = Session::new(Settings {
            seed: Some(1),
            ..Default::default()
        });
        assert!(session.is_paused());
        session.start();
        assert_eq!(session.screen(), ScreenState::Tutorial);
        assert_eq!(session.tutorial_countdown(), 5);

        for _ in 0..4 {
            session.update(1.0, &TickInput::default(), &mut NoopEvents);
        }
        assert_eq!(session.screen(), ScreenState::Tutorial);
        assert_eq!(session.game_loop().world().time_ticks, 0);
        session.update(1.0, &TickInput::default(), &mut NoopEvents);
        assert_eq!(session.screen(), ScreenState::Playing);
        assert!(!session.is_paused());
    }

    #[test]
    fn test_pause_stops_the_world() {
        let mut session = playing_session();
        session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        let ticks = session.game_loop().world().time_ticks;

        session.toggle_pause();
        assert!(session.is_paused());
        for _ in 0..30 {
            session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        }
        assert_eq!(session.game_loop().world().time_ticks, ticks);
        assert!(!session.render().vertices.is_empty());

        session.toggle_pause();
        session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        assert_eq!(session.game_loop().world().time_ticks, ticks + 1);
    }

    #[test]
    fn test_game_over_then_retry() {
        let mut session = playing_session();
        session.stats.score = 1234;
        session.stats.level = 3;
        session.stats.integrity = 0.0;
        session.stats.resonance_charge = 10.0;
        session.stats.combo = 4;
        let generation = session.game_loop().generation();

        let mut counter = Counter::default();
        session.update(SIM_DT, &TickInput::default(), &mut counter);
        assert_eq!(session.screen(), ScreenState::GameOver);
        assert_eq!(counter.game_over, 1);
        for _ in 0..10 {
            session.update(SIM_DT, &TickInput::default(), &mut counter);
        }
        assert_eq!(counter.game_over, 1);

        let request = session.take_narrative_request().unwrap();
        assert_eq!(request.outcome, StoryOutcome::GameOver);
        assert_eq!(request.integrity, 0.0);
        assert!(session.take_narrative_request().is_none());
        assert!(session.is_loading());

        session.restart();
        assert_eq!(session.screen(), ScreenState::Playing);
        assert_eq!(session.stats().score, 1234);
        assert_eq!(session.stats().level, 3);
        assert_eq!(session.stats().integrity, INITIAL_INTEGRITY);
        assert_eq!(session.stats().resonance_charge, RESONANCE_MAX);
        assert_eq!(session.stats().combo, 0);
        assert_eq!(session.game_loop().generation(), generation + 1);
        assert_eq!(session.game_loop().world().level, 3);
        assert_eq!(session.retry_count(), 1);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_level_complete_requests_boss_intro() {
        let mut session = playing_session();
        cleared_level(&mut session, 4);
        session.stats.integrity = 40.0;

        let mut counter = Counter::default();
        session.update(SIM_DT, &TickInput::default(), &mut counter);
        assert_eq!(counter.level_complete, 1);
        assert_eq!(session.screen(), ScreenState::LevelTransition);
        let request = session.take_narrative_request().unwrap();
        assert_eq!(request.outcome, StoryOutcome::BossIntro);
        assert_eq!(request.level, 4);

        session.next_level();
        assert_eq!(session.screen(), ScreenState::Playing);
        assert_eq!(session.stats().level, 5);
        assert_eq!(session.stats().integrity, INITIAL_INTEGRITY);
        assert!(session.game_loop().world().is_boss_level());
    }

    #[test]
    fn test_regular_transition_story() {
        let mut session = playing_session();
        cleared_level(&mut session, 1);
        session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        let request = session.take_narrative_request().unwrap();
        assert_eq!(request.outcome, StoryOutcome::Complete);
    }

    #[test]
    fn test_victory_restart_resets_everything() {
        let mut session = playing_session();
        cleared_level(&mut session, MAX_LEVEL);
        session.stats.score = 99_999;

        let mut counter = Counter::default();
        session.update(SIM_DT, &TickInput::default(), &mut counter);
        assert_eq!(counter.victory, 1);
        assert_eq!(counter.level_complete, 0);
        assert_eq!(session.screen(), ScreenState::Victory);

        session.restart();
        assert_eq!(session.stats(), &MatchStats::default());
        assert_eq!(session.game_loop().world().level, 1);
    }

    #[test]
    fn test_story_delivery_and_staleness() {
        let mut session = playing_session();
        cleared_level(&mut session, 2);
        session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        let request = session.take_narrative_request().unwrap();

        assert!(!session.deliver_story(request.serial + 7, Some("{}")));
        assert!(session.is_loading());

        let raw = r#"{"chapter":"III","title":"Relay","content":"Onward","visualCue":"Blue","mood":"hopeful"}"#;
        assert!(session.deliver_story(request.serial, Some(raw)));
        assert!(!session.is_loading());
        assert_eq!(session.story().map(|s| s.mood), Some(Mood::Hopeful));

        // A second answer for the same request is ignored
        assert!(!session.deliver_story(request.serial, None));
    }

    #[test]
    fn test_missing_story_falls_back() {
        let mut session = playing_session();
        session.stats.integrity = 0.0;
        session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        let request = session.take_narrative_request().unwrap();
        assert!(session.deliver_story(request.serial, None));
        assert_eq!(session.story(), Some(&narrative::fallback_story(&request)));
    }

    #[test]
    fn test_late_story_after_moving_on_is_dropped() {
        let mut session = playing_session();
        cleared_level(&mut session, 1);
        session.update(SIM_DT, &TickInput::default(), &mut NoopEvents);
        let request = session.take_narrative_request().unwrap();
        session.next_level();
        assert!(!session.deliver_story(request.serial, None));
        assert!(session.story().is_none());
    }

    #[test]
    fn test_callbacks_reach_host() {
        let mut session = playing_session();
        {
            let world = session.game_loop.world_mut();
            world.store.players[1].pos = world.store.players[0].pos + glam::Vec2::new(MAX_TETHER_DISTANCE + 10.0, 0.0);
        }
        let mut counter = Counter::default();
        for _ in 0..SEVERED_DRAIN_INTERVAL {
            session.update(SIM_DT, &TickInput::default(), &mut counter);
        }
        assert_eq!(counter.damage, 1);
    }
}
