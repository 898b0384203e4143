use anyhow::Result;
use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use waypoint_common::DelayConfig;

/// Humanization bounds, in milliseconds.
///
/// Each primitive draws from a tier derived from the base action bounds:
/// navigation uses a longer "thinking" tier, clicks and fills a settle
/// tier, scrolling a shorter one. All bounds collapse to zero under
/// [`DelayProfile::instant`] so tests run deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayProfile {
    pub action_min_ms: u64,
    pub action_max_ms: u64,
    pub keystroke_min_ms: u64,
    pub keystroke_max_ms: u64,
}

impl DelayProfile {
    /// Pacing of a person skimming a page.
    pub fn humanized() -> Self {
        Self {
            action_min_ms: 500,
            action_max_ms: 1800,
            keystroke_min_ms: 50,
            keystroke_max_ms: 150,
        }
    }

    /// No delays at all.
    pub fn instant() -> Self {
        Self {
            action_min_ms: 0,
            action_max_ms: 0,
            keystroke_min_ms: 0,
            keystroke_max_ms: 0,
        }
    }

    /// Pause before a navigation, mimicking the time a person takes to
    /// decide where to go next.
    pub fn thinking_range(&self) -> (u64, u64) {
        (self.action_min_ms * 2, self.action_max_ms * 3)
    }

    /// Pause after a click or a completed fill.
    pub fn settle_range(&self) -> (u64, u64) {
        (self.action_min_ms, self.action_max_ms)
    }

    /// Pause after a scroll.
    pub fn scroll_range(&self) -> (u64, u64) {
        (self.action_min_ms / 2, self.action_max_ms * 4 / 5)
    }
}

impl From<&DelayConfig> for DelayProfile {
    fn from(cfg: &DelayConfig) -> Self {
        Self {
            action_min_ms: cfg.action_min_ms,
            action_max_ms: cfg.action_max_ms,
            keystroke_min_ms: cfg.keystroke_min_ms,
            keystroke_max_ms: cfg.keystroke_max_ms,
        }
    }
}

#[derive(Debug, Clone)]
/// Produces human-like delays and typing behavior to reduce automation
/// signals.
pub struct BehavioralEngine {
    profile: DelayProfile,
}

impl BehavioralEngine {
    pub fn new(profile: DelayProfile) -> Self {
        Self { profile }
    }

    pub async fn pause_thinking(&self) {
        let (min, max) = self.profile.thinking_range();
        random_delay(min, max).await;
    }

    pub async fn pause_settle(&self) {
        let (min, max) = self.profile.settle_range();
        random_delay(min, max).await;
    }

    pub async fn pause_scroll(&self) {
        let (min, max) = self.profile.scroll_range();
        random_delay(min, max).await;
    }

    /// Type the provided text with random delays between characters,
    /// noisier and slower than a bulk value-set on purpose.
    pub async fn type_text_human_like(&self, element: &Element, text: &str) -> Result<()> {
        for ch in text.chars() {
            element.send_keys(&ch.to_string()).await?;
            random_delay(self.profile.keystroke_min_ms, self.profile.keystroke_max_ms).await;
        }
        Ok(())
    }
}

/// Sleep for a random duration between `min` and `max` milliseconds.
async fn random_delay(min: u64, max: u64) {
    if max == 0 {
        return;
    }
    let mut rng = OsRng;
    let ms = rng.gen_range(min..=max.max(min));
    sleep(Duration::from_millis(ms)).await;
}
