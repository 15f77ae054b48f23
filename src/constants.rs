pub const MS_PER_MINUTE: f64 = 60_000.0;

// Production-tested: ~1.7 words per second for emotional narration
pub const DEFAULT_BASE_WPM: f64 = 102.0;
// 1.0 = speech fills 100% of the effective duration, no buffer
pub const DEFAULT_SAFETY_FACTOR: f64 = 1.0;

pub const VOICE_SPEED_MIN: f64 = 0.5;
pub const VOICE_SPEED_MAX: f64 = 2.0;

pub const TOLERANCE_FLOOR_WORDS: u32 = 20;
pub const TOLERANCE_FRACTION: f64 = 0.05;

pub const FETCH_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const FETCH_READ_TIMEOUT_SECS: u64 = 30;
