//! Keystroke scoring and moving-average aggregation.
//!
//! Every keystroke gets four percentages: accuracy (binary), speed (from the
//! interval since the previous accepted keystroke), difficulty (forwarded from
//! the prompt) and overall (the unweighted mean of the other three).

use crate::error::{TrainerError, TrainerResult};
use crate::key::{is_key_def_match, KeyCapture, RatedKeyDef};
use crate::util::{clamp_percent, mean};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value on the 0-100 scale.
pub type Percent = f64;

pub const PERFECT: Percent = 100.0;

pub struct AssessmentConst;

impl AssessmentConst {
    /// Keys per second that score 100% speed.
    pub const PERFECT_KEY_RATE_DEFAULT: f64 = 5.0;
    /// How many matched keystrokes to retain.
    pub const HISTORY_SIZE_MAX: usize = 200;
    /// How many keys are shown in the prompt.
    pub const PROMPT_SIZE: usize = 5;
    /// Number of recent scored keystrokes in the displayed average.
    pub const MOVING_AVERAGE_WINDOW: usize = 4;
    /// This many times slower than perfect scores 0% speed.
    pub const INTERVAL_RANGE_FACTOR: f64 = 10.0;
}

/// Score record for one keystroke, or a moving average of several.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessed_at: DateTime<Utc>,
    pub speed: Percent,
    pub accuracy: Percent,
    pub difficulty: Percent,
    pub overall: Percent,
}

/// Piecewise-linear mapping from inter-key interval to speed score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedScale {
    pub perfect_key_rate: f64,
    pub interval_range_factor: f64,
}

impl Default for SpeedScale {
    fn default() -> Self {
        Self {
            perfect_key_rate: AssessmentConst::PERFECT_KEY_RATE_DEFAULT,
            interval_range_factor: AssessmentConst::INTERVAL_RANGE_FACTOR,
        }
    }
}

impl SpeedScale {
    /// Interval in millis at or below which speed is 100%.
    pub fn interval_perfect(&self) -> f64 {
        1000.0 / self.perfect_key_rate
    }

    /// Interval in millis at or above which speed is 0%.
    pub fn interval_zero(&self) -> f64 {
        self.interval_range_factor * self.interval_perfect()
    }

    pub fn speed(&self, interval_millis: f64) -> Percent {
        let interval_perfect = self.interval_perfect();
        let range = self.interval_zero() - interval_perfect;
        // NaN when the rate is zero
        if !(range.is_finite() && range > 0.0) {
            return if interval_millis <= interval_perfect {
                PERFECT
            } else {
                0.0
            };
        }
        let norm_duration = (interval_millis - interval_perfect) * PERFECT / range;
        PERFECT - clamp_percent(norm_duration)
    }
}

/// Assess the given prompt/interval/capture, stamped with the current time.
pub fn assess(prompt: &RatedKeyDef, interval_millis: f64, capture: &KeyCapture) -> Assessment {
    assess_with(
        &SpeedScale::default(),
        prompt,
        interval_millis,
        capture,
        Utc::now(),
    )
}

/// Assess with an explicit speed scale and timestamp.
pub fn assess_with(
    scale: &SpeedScale,
    prompt: &RatedKeyDef,
    interval_millis: f64,
    capture: &KeyCapture,
    assessed_at: DateTime<Utc>,
) -> Assessment {
    let accuracy = if is_key_def_match(prompt, capture) {
        PERFECT
    } else {
        0.0
    };
    let difficulty = prompt.norm_difficulty;
    let speed = scale.speed(interval_millis);
    let overall = mean(&[accuracy, difficulty, speed]).unwrap_or_default();

    Assessment {
        assessed_at,
        speed,
        accuracy,
        difficulty,
        overall,
    }
}

/// Average the most recent scored entries of `history` (oldest first) over the
/// default window.
pub fn calc_moving_average<'a, I>(history: I) -> TrainerResult<Assessment>
where
    I: IntoIterator<Item = &'a KeyCapture>,
    I::IntoIter: DoubleEndedIterator,
{
    calc_moving_average_window(history, AssessmentConst::MOVING_AVERAGE_WINDOW)
}

pub fn calc_moving_average_window<'a, I>(history: I, window: usize) -> TrainerResult<Assessment>
where
    I: IntoIterator<Item = &'a KeyCapture>,
    I::IntoIter: DoubleEndedIterator,
{
    let window = window.max(1);
    let recent: Vec<&Assessment> = history
        .into_iter()
        .rev()
        .filter_map(|capture| capture.assessment.as_ref())
        .take(window)
        .collect();

    // Newest contributor comes first after the reverse walk.
    let assessed_at = match recent.first() {
        Some(newest) => newest.assessed_at,
        None => return Err(TrainerError::NoAssessments),
    };

    let count = recent.len() as f64;
    let difficulty: f64 = recent.iter().map(|a| a.difficulty).sum();
    let speed: f64 = recent.iter().map(|a| a.speed).sum();
    let accuracy: f64 = recent.iter().map(|a| a.accuracy).sum();
    let overall = (speed + accuracy + difficulty) / 3.0;

    Ok(Assessment {
        assessed_at,
        difficulty: difficulty / count,
        speed: speed / count,
        accuracy: accuracy / count,
        overall: overall / count,
    })
}
