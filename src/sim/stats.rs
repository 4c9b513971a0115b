//! Match statistics and the callback contract
//!
//! The simulation never mutates `MatchStats` directly. It emits
//! `MatchEvent`s during a tick and the driver commits them afterwards,
//! forwarding each one to a `MatchEvents` observer.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One mutation of the shared match record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Additive score, floored when committed
    Score(f32),
    /// Positive = damage, negative = heal
    Damage(f32),
    ResonanceCharge(f32),
    ResonanceUse,
    Combo(u32),
}

/// Observer for everything the simulation reports outward
///
/// All methods default to no-ops so hosts implement only what they need.
pub trait MatchEvents {
    fn on_score_update(&mut self, _points: f32) {}
    fn on_damage(&mut self, _amount: f32) {}
    fn on_resonance_charge(&mut self, _amount: f32) {}
    fn on_resonance_use(&mut self) {}
    fn on_combo_update(&mut self, _combo: u32) {}
    fn on_level_complete(&mut self) {}
    fn on_game_over(&mut self) {}
    fn on_victory(&mut self) {}

    /// Route a committed event to its callback
    fn dispatch(&mut self, event: &MatchEvent) {
        match *event {
            MatchEvent::Score(points) => self.on_score_update(points),
            MatchEvent::Damage(amount) => self.on_damage(amount),
            MatchEvent::ResonanceCharge(amount) => self.on_resonance_charge(amount),
            MatchEvent::ResonanceUse => self.on_resonance_use(),
            MatchEvent::Combo(combo) => self.on_combo_update(combo),
        }
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl MatchEvents for NoopEvents {}

/// Shared match record read by the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub score: u64,
    pub level: u32,
    pub integrity: f32,
    pub max_integrity: f32,
    pub resonance_charge: f32,
    pub combo: u32,
    pub max_combo: u32,
}

impl Default for MatchStats {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            integrity: INITIAL_INTEGRITY,
            max_integrity: INITIAL_INTEGRITY,
            resonance_charge: INITIAL_RESONANCE,
            combo: 0,
            max_combo: 0,
        }
    }
}

impl MatchStats {
    /// Commit one event, clamping every field to its legal range
    pub fn apply(&mut self, event: &MatchEvent) {
        match *event {
            MatchEvent::Score(points) => {
                if points.is_finite() && points > 0.0 {
                    let total = self.score as f64 + points as f64;
                    self.score = total.floor() as u64;
                }
            }
            MatchEvent::Damage(amount) => {
                if amount.is_finite() {
                    self.integrity = (self.integrity - amount).clamp(0.0, self.max_integrity);
                }
            }
            MatchEvent::ResonanceCharge(amount) => {
                if amount.is_finite() {
                    self.resonance_charge =
                        (self.resonance_charge + amount).clamp(0.0, RESONANCE_MAX);
                }
            }
            MatchEvent::ResonanceUse => self.resonance_charge = 0.0,
            MatchEvent::Combo(combo) => {
                self.combo = combo;
                self.max_combo = self.max_combo.max(combo);
            }
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.integrity <= 0.0
    }

    pub fn resonance_ready(&self) -> bool {
        self.resonance_charge >= RESONANCE_MAX
    }

    /// Retry the current level: keep score and level, refill the rest
    pub fn reset_for_retry(&mut self) {
        self.integrity = self.max_integrity;
        self.resonance_charge = RESONANCE_MAX;
        self.combo = 0;
    }

    /// Move on to the next level with integrity fully restored
    pub fn advance_level(&mut self) {
        self.level = (self.level + 1).min(MAX_LEVEL);
        self.integrity = self.max_integrity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_score_is_floored_and_additive() {
        let mut stats = MatchStats::default();
        stats.apply(&MatchEvent::Score(110.7));
        assert_eq!(stats.score, 110);
        // Fractions below a whole point are dropped, never carried
        stats.apply(&MatchEvent::Score(0.5));
        assert_eq!(stats.score, 110);
        stats.apply(&MatchEvent::Score(25.0));
        assert_eq!(stats.score, 135);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut stats = MatchStats::default();
        stats.apply(&MatchEvent::Damage(30.0));
        stats.apply(&MatchEvent::Damage(-50.0));
        assert_eq!(stats.integrity, stats.max_integrity);
    }

    #[test]
    fn test_resonance_use_resets() {
        let mut stats = MatchStats::default();
        assert!(stats.resonance_ready());
        stats.apply(&MatchEvent::ResonanceUse);
        assert_eq!(stats.resonance_charge, 0.0);
        assert!(!stats.resonance_ready());
    }

    #[test]
    fn test_retry_keeps_score_and_level() {
        let mut stats = MatchStats {
            score: 900,
            level: 4,
            integrity: 0.0,
            resonance_charge: 12.0,
            combo: 7,
            max_combo: 9,
            ..Default::default()
        };
        stats.reset_for_retry();
        assert_eq!(stats.score, 900);
        assert_eq!(stats.level, 4);
        assert_eq!(stats.integrity, 100.0);
        assert_eq!(stats.resonance_charge, 100.0);
        assert_eq!(stats.combo, 0);
        assert_eq!(stats.max_combo, 9);
    }

    fn any_event() -> impl Strategy<Value = MatchEvent> {
        prop_oneof![
            (-1000.0f32..1000.0).prop_map(MatchEvent::Score),
            (-500.0f32..500.0).prop_map(MatchEvent::Damage),
            (-500.0f32..500.0).prop_map(MatchEvent::ResonanceCharge),
            Just(MatchEvent::ResonanceUse),
            (0u32..50).prop_map(MatchEvent::Combo),
        ]
    }

    proptest! {
        #[test]
        fn prop_stats_stay_in_range(events in prop::collection::vec(any_event(), 0..64)) {
            let mut stats = MatchStats::default();
            let mut last_max_combo = 0;
            for event in &events {
                stats.apply(event);
                prop_assert!(stats.integrity >= 0.0 && stats.integrity <= stats.max_integrity);
                prop_assert!(stats.resonance_charge >= 0.0 && stats.resonance_charge <= RESONANCE_MAX);
                prop_assert!(stats.max_combo >= last_max_combo);
                last_max_combo = stats.max_combo;
            }
        }
    }
}
