// Duration-to-word-count calculation
//
// Converts an available music duration into the number of spoken words that
// fill it at the configured speaking rate. Only the speech entry delay is
// subtracted from the duration; crossfade at the end of the track is handled
// by the audio mixer and deliberately excluded from the word budget.

use crate::constants::{
    DEFAULT_BASE_WPM, DEFAULT_SAFETY_FACTOR, MS_PER_MINUTE, VOICE_SPEED_MAX, VOICE_SPEED_MIN,
};
use crate::errors::CalcError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fully-formed input for one calculation. The caller (UI layer) assembles
/// this from whatever widget state exists; the calculator reads nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Total music duration in milliseconds
    pub duration_ms: u64,
    /// Voice speed multiplier, clamped to 0.5..=2.0 during calculation
    pub voice_speed: f64,
    /// Delay before speech starts (music plays alone), milliseconds
    pub speech_entry_ms: u64,
    /// Speaking rate at voice speed 1.0
    pub base_wpm: f64,
    /// Multiplier in (0, 1]; 1.0 = fill 100% of the effective duration
    pub safety_factor: f64,
}

impl CalculationInput {
    pub fn new(duration_ms: u64, voice_speed: f64, speech_entry_ms: u64) -> Self {
        Self {
            duration_ms,
            voice_speed,
            speech_entry_ms,
            base_wpm: DEFAULT_BASE_WPM,
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub target_words: u32,
    /// Display-only inverse: how long the target words take to speak.
    /// Never used to re-derive the music duration.
    pub estimated_speech_ms: u64,
}

impl CalculationResult {
    /// Human-readable line for the UI summary field.
    pub fn summary(&self) -> String {
        format!(
            "{} words \u{2248} {} speech",
            self.target_words,
            format_duration(self.estimated_speech_ms)
        )
    }
}

/// Calculate the target word count for a given input.
///
/// Lower voice speed means speech takes longer, so fewer words fit in the
/// same time; the effective WPM scales linearly with the speed multiplier.
pub fn calculate_target_words(input: &CalculationInput) -> Result<CalculationResult, CalcError> {
    if input.duration_ms == 0 {
        return Err(CalcError::InvalidDuration);
    }
    if input.speech_entry_ms >= input.duration_ms {
        return Err(CalcError::ExhaustedByDelay);
    }

    // Only the entry delay reduces the word budget; crossfade does not.
    let effective_ms = (input.duration_ms - input.speech_entry_ms) as f64;

    let voice_speed = input.voice_speed.clamp(VOICE_SPEED_MIN, VOICE_SPEED_MAX);
    let adjusted_wpm = input.base_wpm * voice_speed;

    let raw_words = effective_ms / MS_PER_MINUTE * adjusted_wpm * input.safety_factor;
    let target_words = raw_words.max(0.0).round() as u32;

    debug!(
        duration_ms = input.duration_ms,
        effective_ms = effective_ms as u64,
        adjusted_wpm,
        target_words,
        "calculated target word count"
    );

    Ok(CalculationResult {
        target_words,
        estimated_speech_ms: estimated_speech_ms(target_words, voice_speed, input.base_wpm),
    })
}

/// Estimate how long `word_count` words take to speak at the given speed.
/// Display only; not authoritative.
pub fn estimated_speech_ms(word_count: u32, voice_speed: f64, base_wpm: f64) -> u64 {
    let adjusted_wpm = base_wpm * voice_speed.clamp(VOICE_SPEED_MIN, VOICE_SPEED_MAX);
    if adjusted_wpm <= 0.0 {
        return 0;
    }
    (word_count as f64 / adjusted_wpm * MS_PER_MINUTE) as u64
}

/// Format milliseconds as "M:SS" for display.
pub fn format_duration(duration_ms: u64) -> String {
    if duration_ms == 0 {
        return "0:00".to_string();
    }
    let total_seconds = duration_ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}
