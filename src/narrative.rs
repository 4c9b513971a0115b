//! Story log requests and responses
//!
//! Story text comes from an external generator the host talks to. The game
//! only queues a request and later accepts whatever came back; a failed,
//! empty or late response never blocks play.

use serde::{Deserialize, Serialize};

/// Why a story is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryOutcome {
    /// Regular level cleared
    Complete,
    /// Level cleared and the next one is a boss level
    BossIntro,
    GameOver,
    Victory,
}

impl StoryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryOutcome::Complete => "complete",
            StoryOutcome::BossIntro => "boss_intro",
            StoryOutcome::GameOver => "game_over",
            StoryOutcome::Victory => "victory",
        }
    }
}

/// Tone hint for the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Danger,
    Hopeful,
    Victory,
}

/// One story entry shown between levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryLog {
    pub chapter: String,
    pub title: String,
    pub content: String,
    /// Short stage direction, e.g. "The screen flickers red"
    #[serde(default)]
    pub visual_cue: String,
    #[serde(default)]
    pub mood: Mood,
}

/// Everything the generator needs, tagged with a serial for staleness checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub serial: u64,
    pub level: u32,
    pub integrity: f32,
    pub score: u64,
    pub outcome: StoryOutcome,
}

impl NarrativeRequest {
    /// Prompt text for a text generator
    pub fn prompt(&self) -> String {
        format!(
            "Two linked cores fight through the network. Level {} of {}. \
             Integrity {:.0}%. Score {}. Event: {}. \
             Respond with JSON {{chapter, title, content, visualCue, mood}} \
             where mood is one of neutral, danger, hopeful, victory.",
            self.level,
            crate::consts::MAX_LEVEL,
            self.integrity,
            self.score,
            self.outcome.as_str()
        )
    }
}

/// Parse a generator response, rejecting blank required fields
pub fn parse_story(raw: &str) -> Result<StoryLog, serde_json::Error> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let story: StoryLog = serde_json::from_str(trimmed)?;
    if story.title.trim().is_empty() || story.content.trim().is_empty() {
        return Err(serde::de::Error::custom("story has no title or content"));
    }
    Ok(story)
}

/// Built-in story used whenever the generator fails
pub fn fallback_story(request: &NarrativeRequest) -> StoryLog {
    let chapter = format!("LOG {:02}", request.level);
    let (title, content, visual_cue, mood) = match request.outcome {
        StoryOutcome::Complete => (
            "SECTOR STABILIZED",
            "The link held. Static thins out as the next sector comes online.",
            "The grid pulses a steady blue",
            Mood::Hopeful,
        ),
        StoryOutcome::BossIntro => (
            "ANOMALY DETECTED",
            "Something large is waiting in the next sector. Stay close. Stay linked.",
            "The screen flickers red",
            Mood::Danger,
        ),
        StoryOutcome::GameOver => (
            "CONNECTION LOST",
            "The tether snapped and the cores went dark. The signal can be rebuilt.",
            "Static swallows the arena",
            Mood::Danger,
        ),
        StoryOutcome::Victory => (
            "SYNCHRONICITY",
            "Every sector answers in one voice. The two cores were never apart.",
            "Gold light floods the grid",
            Mood::Victory,
        ),
    };
    StoryLog {
        chapter,
        title: title.to_string(),
        content: content.to_string(),
        visual_cue: visual_cue.to_string(),
        mood,
    }
}

/// Parse a response or fall back, logging why
pub fn resolve_story(request: &NarrativeRequest, raw: Option<&str>) -> StoryLog {
    match raw {
        Some(raw) => match parse_story(raw) {
            Ok(story) => story,
            Err(e) => {
                log::warn!("Story #{} unusable ({}); using fallback", request.serial, e);
                fallback_story(request)
            }
        },
        None => {
            log::warn!("Story #{} never arrived; using fallback", request.serial);
            fallback_story(request)
        }
    }
}
