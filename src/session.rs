//! Prompt queue, input buffer and keystroke history for one drill.
//!
//! A keystroke is appended to the buffer; while the buffer head matches the
//! prompt head both are consumed, the capture is scored and moved into
//! history. The prompt queue is then refilled from the configured key set.

use crate::assessment::{
    assess_with, calc_moving_average_window, Assessment, AssessmentConst, SpeedScale,
};
use crate::bounded::BoundedQueue;
use crate::config::Config;
use crate::error::{TrainerError, TrainerResult};
use crate::key::{is_key_def_match, KeyCapture, RatedKeyDef};
use crate::key_set::{KeySetName, KeySource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub prompt_size: usize,
    pub history_size_max: usize,
    pub moving_average_window: usize,
    pub speed: SpeedScale,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt_size: AssessmentConst::PROMPT_SIZE,
            history_size_max: AssessmentConst::HISTORY_SIZE_MAX,
            moving_average_window: AssessmentConst::MOVING_AVERAGE_WINDOW,
            speed: SpeedScale::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// The next keys shown to the user, front first.
    pub key_prompt: BoundedQueue<RatedKeyDef>,
    /// Matched keystrokes, oldest first, up to the retention bound.
    pub key_history: BoundedQueue<KeyCapture>,
    /// Keystrokes not yet matched against the prompt.
    pub buffer: VecDeque<KeyCapture>,
    pub config: Config,
    pub started_at: DateTime<Utc>,
    pub last_accepted_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new(config: Config, settings: &SessionConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            key_prompt: BoundedQueue::new(settings.prompt_size),
            key_history: BoundedQueue::new(settings.history_size_max),
            buffer: VecDeque::new(),
            config,
            started_at,
            last_accepted_at: None,
        }
    }

    /// Millis between the previous accepted keystroke (or the session start)
    /// and `keyed_at`.
    fn interval_millis(&self, keyed_at: DateTime<Utc>) -> f64 {
        let since = self.last_accepted_at.unwrap_or(self.started_at);
        (keyed_at - since).num_milliseconds().max(0) as f64
    }
}

/// Inputs a session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Key(KeyCapture),
    Backspace,
    KeySetChanged(KeySetName),
    ConfigChanged(Config),
}

/// What a handled event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// At least one buffered keystroke matched and moved into history.
    Matched { consumed: usize, buffered: usize },
    /// The keystroke did not match and stays in the buffer.
    Buffered { len: usize },
    Backspaced { len: usize },
    /// The prompt queue was cleared and refilled.
    PromptRefreshed,
    /// Configuration changed without affecting the prompt.
    ConfigUpdated,
}

/// Owns one session's state and the source that supplies its prompts.
#[derive(Debug)]
pub struct Session<S: KeySource> {
    state: SessionState,
    settings: SessionConfig,
    source: S,
}

impl<S: KeySource> Session<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self::starting_at(config, source, Utc::now())
    }

    pub fn starting_at(config: Config, source: S, started_at: DateTime<Utc>) -> Self {
        Self::with_settings(config, source, SessionConfig::default(), started_at)
    }

    pub fn with_settings(
        config: Config,
        source: S,
        settings: SessionConfig,
        started_at: DateTime<Utc>,
    ) -> Self {
        let state = SessionState::new(config, &settings, started_at);
        Self::from_state(state, source, settings)
    }

    /// Resume from an existing state under `settings`. An over-full prompt
    /// keeps its front keys, history keeps its newest entries, and the
    /// prompt is then topped up.
    pub fn from_state(mut state: SessionState, source: S, settings: SessionConfig) -> Self {
        state.key_prompt.truncate(settings.prompt_size);
        state.key_prompt.set_capacity(settings.prompt_size);
        state.key_history.set_capacity(settings.history_size_max);
        let mut session = Self {
            state,
            settings,
            source,
        };
        session.replenish();
        session
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &SessionConfig {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn prompt(&self) -> &BoundedQueue<RatedKeyDef> {
        &self.state.key_prompt
    }

    pub fn history(&self) -> &BoundedQueue<KeyCapture> {
        &self.state.key_history
    }

    pub fn buffer(&self) -> &VecDeque<KeyCapture> {
        &self.state.buffer
    }

    /// Handle one event to completion.
    pub fn apply(&mut self, event: SessionEvent) -> TrainerResult<Transition> {
        match event {
            SessionEvent::Key(capture) => self.key_pressed(capture),
            SessionEvent::Backspace => Ok(self.backspaced()),
            SessionEvent::KeySetChanged(name) => Ok(self.key_set_changed(name)),
            SessionEvent::ConfigChanged(config) => Ok(self.config_changed(config)),
        }
    }

    pub fn key_pressed(&mut self, capture: KeyCapture) -> TrainerResult<Transition> {
        if self.state.key_prompt.is_empty() {
            warn!("Key {} pressed with an empty prompt", capture.key);
            return Err(TrainerError::EmptyPrompt);
        }

        self.state.buffer.push_back(capture);

        let mut consumed = 0;
        while let Some(prompt) = self.next_match() {
            let Some(capture) = self.state.buffer.pop_front() else {
                break;
            };
            self.state.key_prompt.pop_front();

            let interval = self.state.interval_millis(capture.keyed_at);
            let assessment = assess_with(
                &self.settings.speed,
                &prompt,
                interval,
                &capture,
                capture.keyed_at,
            );
            debug!(
                "Matched {} after {}ms, overall {:.1}",
                capture.key, interval, assessment.overall
            );
            self.state.last_accepted_at = Some(capture.keyed_at);
            self.state
                .key_history
                .push_back(capture.matched(prompt, assessment));
            consumed += 1;
        }

        self.replenish();

        let buffered = self.state.buffer.len();
        if consumed > 0 {
            Ok(Transition::Matched { consumed, buffered })
        } else {
            debug!("Buffered mismatch, {} unmatched", buffered);
            Ok(Transition::Buffered { len: buffered })
        }
    }

    pub fn backspaced(&mut self) -> Transition {
        self.state.buffer.pop_back();
        let len = self.state.buffer.len();
        debug!("Backspace, {} unmatched", len);
        Transition::Backspaced { len }
    }

    pub fn key_set_changed(&mut self, name: KeySetName) -> Transition {
        info!("Key set changed to {}", name);
        self.state.config.key_set_name = name;
        self.refresh_prompt();
        Transition::PromptRefreshed
    }

    pub fn config_changed(&mut self, config: Config) -> Transition {
        let refresh = self.state.config.changes_prompt_pool(&config);
        info!(
            "Config changed (key set {}, refresh prompt: {})",
            config.key_set_name, refresh
        );
        self.state.config = config;
        if refresh {
            self.refresh_prompt();
            Transition::PromptRefreshed
        } else {
            Transition::ConfigUpdated
        }
    }

    /// Windowed summary of recent scores for display.
    pub fn moving_average(&self) -> TrainerResult<Assessment> {
        calc_moving_average_window(
            &self.state.key_history,
            self.settings.moving_average_window,
        )
    }

    /// The prompt head, if the buffer head matches it.
    fn next_match(&self) -> Option<RatedKeyDef> {
        let head = self.state.buffer.front()?;
        let prompt = self.state.key_prompt.front()?;
        is_key_def_match(head, prompt).then_some(*prompt)
    }

    fn refresh_prompt(&mut self) {
        self.state.key_prompt.clear();
        self.replenish();
    }

    /// Trim history to its bound and refill the prompt queue.
    fn replenish(&mut self) {
        let evicted = self.state.key_history.trim();
        if !evicted.is_empty() {
            debug!("Evicted {} history entries", evicted.len());
        }

        if self.state.key_prompt.is_full() {
            return;
        }
        let available = self.source.enumerate_key_set(&self.state.config);
        while !self.state.key_prompt.is_full() {
            match self.source.next_key_prompt(&available) {
                Some(prompt) => {
                    self.state.key_prompt.push_back(prompt);
                }
                None => {
                    warn!(
                        "Key set {} has no prompts available",
                        self.state.config.key_set_name
                    );
                    break;
                }
            }
        }
    }
}
