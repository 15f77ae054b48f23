// Stimgen core - duration-to-word-count calculation and reconciliation
//
// Everything the generator UI needs to keep its target word count honest:
// the calculator (duration -> words), the reconciliation state machine
// (track selection, parameter changes, manual overrides, stale-fetch
// protection), the word-count comparison used by the script editor, and the
// backend duration-lookup client. Rendering and widget wiring live in the
// host application, not here.

pub mod calculator;
pub mod comparison;
pub mod config;
pub mod constants;
pub mod duration_service;
pub mod errors;
pub mod state;

pub use calculator::{
    calculate_target_words, estimated_speech_ms, format_duration, CalculationInput,
    CalculationResult,
};
pub use comparison::{classify, count_words, Tolerance, WordCountMatch};
pub use config::{load_config, CoreConfig};
pub use duration_service::{DurationLookup, HttpDurationService, TrackDuration, TrackRef};
pub use errors::CalcError;
pub use state::{FetchId, FetchOutcome, Phase, TargetWordsState};
