use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    cursor::{CursorBlink, DEFAULT_BLINK_PERIOD},
    spring::{Spring, SpringConfig},
    typewriter::{typed_length, typed_text},
    visuals::{derive_visual_offsets, HeroLayout, VisualOffsets},
};

/// Frame delta assumed when the host does not report one (60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevealConfigError {
    #[error("target text must not be empty")]
    EmptyTarget,
    #[error("typing threshold must be a positive finite fraction of scroll travel")]
    InvalidThreshold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    pub target: String,
    /// Fraction of smoothed scroll travel at which the whole target is typed.
    pub typing_threshold: f64,
    pub spring: SpringConfig,
    pub blink_period: Duration,
    pub frame_interval: Duration,
    pub layout: HeroLayout,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            target: "Welcome".to_string(),
            typing_threshold: 0.2,
            spring: SpringConfig::HERO_PROGRESS,
            blink_period: DEFAULT_BLINK_PERIOD,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            layout: HeroLayout::default(),
        }
    }
}

impl RevealConfig {
    pub fn validate(&self) -> Result<(), RevealConfigError> {
        if self.target.is_empty() {
            return Err(RevealConfigError::EmptyTarget);
        }
        if !self.typing_threshold.is_finite() || self.typing_threshold <= 0.0 {
            return Err(RevealConfigError::InvalidThreshold);
        }
        Ok(())
    }

    pub fn target_len(&self) -> usize {
        self.target.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub raw: f64,
    pub delta: Duration,
}

impl ProgressSample {
    pub fn new(raw: f64, delta: Duration) -> Self {
        Self { raw, delta }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollState {
    pub raw_progress: f64,
    pub smoothed_progress: f64,
    pub typed_length: usize,
    pub typing_complete: bool,
    pub cursor_visible: bool,
}

impl ScrollState {
    fn at_rest() -> Self {
        Self {
            raw_progress: 0.0,
            smoothed_progress: 0.0,
            typed_length: 0,
            typing_complete: false,
            cursor_visible: true,
        }
    }
}

/// Everything carried from one frame to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealFrame {
    pub state: ScrollState,
    pub spring: Spring,
    pub cursor: CursorBlink,
}

impl RevealFrame {
    pub fn initial(config: &RevealConfig) -> Self {
        Self {
            state: ScrollState::at_rest(),
            spring: Spring::new(config.spring, 0.0),
            cursor: CursorBlink::new(config.blink_period),
        }
    }
}

/// Folds one scroll sample into the previous frame.
///
/// Non-finite samples count as zero progress. Samples outside `[0, 1]` are
/// passed to the spring unchanged; only the typing computation clamps.
pub fn advance(previous: &RevealFrame, sample: ProgressSample, config: &RevealConfig) -> RevealFrame {
    let raw = finite_or_zero(sample.raw);
    let mut spring = previous.spring.clone();
    let smoothed = spring.step(raw, sample.delta);
    let mut cursor = previous.cursor.clone();
    let state = derive_state(raw, smoothed, config, &mut cursor);
    RevealFrame {
        state,
        spring,
        cursor,
    }
}

fn derive_state(
    raw: f64,
    smoothed: f64,
    config: &RevealConfig,
    cursor: &mut CursorBlink,
) -> ScrollState {
    let target_len = config.target_len();
    let typed = typed_length(smoothed, config.typing_threshold, target_len);
    let typing_complete = smoothed > 0.0 && typed == target_len;
    cursor.sync(typing_complete);

    ScrollState {
        raw_progress: raw,
        smoothed_progress: smoothed,
        typed_length: typed,
        typing_complete,
        cursor_visible: cursor.is_visible(),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ScrollState) + Send>;

/// Stateful wrapper around [`advance`] for a host frame loop.
///
/// Listeners registered with [`subscribe`](Self::subscribe) run after every
/// processed sample, in registration order, until they are unsubscribed.
pub struct ScrollRevealController {
    config: RevealConfig,
    frame: RevealFrame,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ScrollRevealController {
    pub fn new(config: RevealConfig) -> Result<Self, RevealConfigError> {
        config.validate()?;
        let frame = RevealFrame::initial(&config);
        Ok(Self {
            config,
            frame,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn state(&self) -> ScrollState {
        self.frame.state
    }

    pub fn frame(&self) -> &RevealFrame {
        &self.frame
    }

    pub fn typed_text(&self) -> &str {
        typed_text(&self.config.target, self.frame.state.typed_length)
    }

    /// Processes a sample assuming one nominal frame has passed.
    pub fn on_progress_sample(&mut self, raw: f64) -> ScrollState {
        self.on_progress_sample_after(raw, self.config.frame_interval)
    }

    pub fn on_progress_sample_after(&mut self, raw: f64, delta: Duration) -> ScrollState {
        let previous_len = self.frame.state.typed_length;
        self.frame = advance(&self.frame, ProgressSample::new(raw, delta), &self.config);
        let state = self.frame.state;
        if state.typed_length != previous_len {
            debug!(
                typed_length = state.typed_length,
                smoothed = state.smoothed_progress,
                "hero typewriter changed"
            );
        }
        self.notify(&state);
        state
    }

    /// Places the smoothed value directly at `raw`, e.g. when the page mounts
    /// already scrolled. Listeners are notified like for a regular sample.
    pub fn jump_to(&mut self, raw: f64) -> ScrollState {
        let raw = finite_or_zero(raw);
        self.frame.spring.jump_to(raw);
        let state = derive_state(raw, raw, &self.config, &mut self.frame.cursor);
        self.frame.state = state;
        self.notify(&state);
        state
    }

    /// Advances the cursor blink clock independently of scrolling.
    pub fn tick_cursor(&mut self, delta: Duration) -> bool {
        self.frame.cursor.tick(delta);
        self.frame.state.cursor_visible = self.frame.cursor.is_visible();
        self.frame.state.cursor_visible
    }

    pub fn visual_offsets(&self) -> VisualOffsets {
        derive_visual_offsets(self.frame.state.smoothed_progress, &self.config.layout)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ScrollState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not (or no longer) registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, state: &ScrollState) {
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
    }
}

impl std::fmt::Debug for ScrollRevealController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollRevealController")
            .field("config", &self.config)
            .field("frame", &self.frame)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
