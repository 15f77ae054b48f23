// Word-count comparison for the script editor
//
// Classifies the live word count of authored text against the current target
// so the UI can color the counter. Pure logic, no rendering here.

use crate::constants::{TOLERANCE_FLOOR_WORDS, TOLERANCE_FRACTION};
use serde::{Deserialize, Serialize};

/// Relative tolerance band around the target word count.
/// The floor keeps short targets from demanding word-perfect scripts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub floor_words: u32,
    pub fraction: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            floor_words: TOLERANCE_FLOOR_WORDS,
            fraction: TOLERANCE_FRACTION,
        }
    }
}

impl Tolerance {
    /// Allowed absolute deviation for a given target: max(floor, round(target * fraction)).
    pub fn allowed_deviation(&self, target: u32) -> u32 {
        let relative = (target as f64 * self.fraction).round() as u32;
        relative.max(self.floor_words)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordCountMatch {
    Within,
    Over,
    Under,
}

/// Classify an actual word count against the target.
pub fn classify(actual: u32, target: u32, tolerance: &Tolerance) -> WordCountMatch {
    let deviation = tolerance.allowed_deviation(target);
    let diff = actual.abs_diff(target);
    if diff <= deviation {
        WordCountMatch::Within
    } else if actual > target {
        WordCountMatch::Over
    } else {
        WordCountMatch::Under
    }
}

/// Live word count of authored text, whitespace-delimited.
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
