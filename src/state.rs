// Reconciliation state for the current target word count
//
// Single source of truth for "how many words should the script have" across
// three triggers: track selection (duration fetch), voice-speed / entry-delay
// changes, and manual edits of the target field. Phases cycle
// Unset -> Computed -> ManualOverride -> Computed.
//
// Duration fetches are identified by ticket so a slow in-flight fetch can
// never overwrite a newer selection: last writer wins by request identity,
// not by completion order.

use crate::calculator::{calculate_target_words, estimated_speech_ms, CalculationInput};
use crate::config::CoreConfig;
use crate::constants::{DEFAULT_BASE_WPM, DEFAULT_SAFETY_FACTOR};
use crate::duration_service::TrackDuration;
use crate::errors::CalcError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Ticket identifying one duration fetch. Each new ticket supersedes all
/// previously issued ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
  /// No duration known, no target set
  Unset,
  /// Target derived from the known duration and current parameters
  Computed,
  /// User typed a target; it is authoritative until the next fetch or
  /// explicit auto-calculate
  ManualOverride,
}

/// Result of delivering a fetch response to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
  /// Response belonged to the latest ticket and was applied
  Applied { target_words: Option<u32> },
  /// Response was superseded by a newer selection and discarded
  Stale,
}

pub struct TargetWordsState {
  phase: Phase,
  duration_ms: Option<u64>,
  target_words: Option<u32>,
  voice_speed: f64,
  speech_entry_ms: u64,
  // Stored for reference only; crossfade never affects the word budget.
  crossfade_ms: u64,
  base_wpm: f64,
  safety_factor: f64,
  latest_fetch: Option<FetchId>,
  next_fetch_id: u64,
}

impl Default for TargetWordsState {
  fn default() -> Self {
    Self {
      phase: Phase::Unset,
      duration_ms: None,
      target_words: None,
      voice_speed: 1.0,
      speech_entry_ms: 0,
      crossfade_ms: 0,
      base_wpm: DEFAULT_BASE_WPM,
      safety_factor: DEFAULT_SAFETY_FACTOR,
      latest_fetch: None,
      next_fetch_id: 0,
    }
  }
}

impl TargetWordsState {
  pub fn new(config: &CoreConfig) -> Self {
    Self {
      base_wpm: config.base_wpm,
      safety_factor: config.safety_factor,
      ..Self::default()
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn duration_ms(&self) -> Option<u64> {
    self.duration_ms
  }

  pub fn target_words(&self) -> Option<u32> {
    self.target_words
  }

  pub fn voice_speed(&self) -> f64 {
    self.voice_speed
  }

  pub fn speech_entry_ms(&self) -> u64 {
    self.speech_entry_ms
  }

  /// Display-only estimate for the current target, if any.
  pub fn estimated_speech_ms(&self) -> Option<u64> {
    self
      .target_words
      .map(|words| estimated_speech_ms(words, self.voice_speed, self.base_wpm))
  }

  /// Issue a ticket for a new duration fetch (track selection or forced
  /// auto-calculate). Any fetch still in flight is superseded.
  pub fn begin_fetch(&mut self) -> FetchId {
    self.next_fetch_id += 1;
    let id = FetchId(self.next_fetch_id);
    self.latest_fetch = Some(id);
    debug!(fetch_id = id.0, "duration fetch issued");
    id
  }

  fn is_stale(&self, id: FetchId) -> bool {
    self.latest_fetch != Some(id)
  }

  /// Deliver a successful duration lookup. A backend-provided target word
  /// count takes precedence over local calculation; otherwise the target is
  /// computed from the fetched duration and current parameters.
  pub fn apply_fetch(&mut self, id: FetchId, fetched: &TrackDuration) -> FetchOutcome {
    if self.is_stale(id) {
      debug!(fetch_id = id.0, "discarding stale duration fetch");
      return FetchOutcome::Stale;
    }

    self.duration_ms = Some(fetched.duration_ms);
    self.target_words = match fetched.target_words {
      Some(words) => Some(words),
      None => self.compute_local(),
    };
    self.phase = Phase::Computed;
    info!(
      duration_ms = fetched.duration_ms,
      target_words = ?self.target_words,
      backend_provided = fetched.target_words.is_some(),
      "target word count updated from fetch"
    );
    FetchOutcome::Applied {
      target_words: self.target_words,
    }
  }

  /// Deliver a failed duration lookup. Stale failures are ignored; a current
  /// failure resets the state and hands the error back to the caller. No
  /// retry happens here.
  pub fn fetch_failed(&mut self, id: FetchId, err: CalcError) -> Option<CalcError> {
    if self.is_stale(id) {
      debug!(fetch_id = id.0, "discarding stale fetch failure");
      return None;
    }
    warn!("duration fetch failed: {}", err);
    self.duration_ms = None;
    self.target_words = None;
    self.phase = Phase::Unset;
    Some(err)
  }

  /// Track selection cleared. A manual target survives; a computed one does
  /// not.
  pub fn clear_track(&mut self) {
    self.latest_fetch = None;
    self.duration_ms = None;
    if self.phase != Phase::ManualOverride {
      self.target_words = None;
      self.phase = Phase::Unset;
    }
  }

  pub fn set_voice_speed(&mut self, voice_speed: f64) {
    self.voice_speed = voice_speed;
    self.recompute_if_computed();
  }

  pub fn set_entry_delay(&mut self, speech_entry_ms: u64) {
    self.speech_entry_ms = speech_entry_ms;
    self.recompute_if_computed();
  }

  /// Crossfade is mixer territory; changing it never touches the target.
  pub fn set_crossfade(&mut self, crossfade_ms: u64) {
    self.crossfade_ms = crossfade_ms;
  }

  pub fn crossfade_ms(&self) -> u64 {
    self.crossfade_ms
  }

  /// Manual edit of the target field. Only positive values are accepted;
  /// returns whether the override took effect.
  pub fn manual_override(&mut self, words: u32) -> bool {
    if words == 0 {
      return false;
    }
    self.target_words = Some(words);
    self.phase = Phase::ManualOverride;
    info!(words, "manual target word count set");
    true
  }

  /// Explicit auto-calculate: recompute from the stored duration, overwriting
  /// any manual override. Returns the new target, or `None` when no duration
  /// is known yet; in that case the caller should issue a fresh fetch with
  /// `begin_fetch`.
  pub fn auto_calculate(&mut self) -> Option<u32> {
    self.duration_ms?;
    self.target_words = self.compute_local();
    self.phase = Phase::Computed;
    self.target_words
  }

  fn recompute_if_computed(&mut self) {
    // Manual overrides hold until the next fetch or auto-calculate; with no
    // duration there is nothing to recompute.
    if self.phase != Phase::Computed {
      return;
    }
    if self.duration_ms.is_none() {
      return;
    }
    self.target_words = self.compute_local();
  }

  fn compute_local(&self) -> Option<u32> {
    let duration_ms = self.duration_ms?;
    let input = CalculationInput {
      duration_ms,
      voice_speed: self.voice_speed,
      speech_entry_ms: self.speech_entry_ms,
      base_wpm: self.base_wpm,
      safety_factor: self.safety_factor,
    };
    match calculate_target_words(&input) {
      Ok(result) => Some(result.target_words),
      Err(err) => {
        warn!("target word count undefined: {}", err);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fetched(duration_ms: u64) -> TrackDuration {
    TrackDuration {
      duration_ms,
      duration_formatted: crate::calculator::format_duration(duration_ms),
      target_words: None,
      words_per_minute: None,
    }
  }

  // ========== Fetch / Compute Transitions ==========

  #[test]
  fn test_fetch_computes_target() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    let outcome = state.apply_fetch(id, &fetched(180_000));
    assert_eq!(
      outcome,
      FetchOutcome::Applied {
        target_words: Some(306)
      }
    );
    assert_eq!(state.phase(), Phase::Computed);
    assert_eq!(state.duration_ms(), Some(180_000));
  }

  #[test]
  fn test_backend_target_words_take_precedence() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    let mut track = fetched(180_000);
    track.target_words = Some(290);
    state.apply_fetch(id, &track);
    // Local calculation would say 306; backend said 290.
    assert_eq!(state.target_words(), Some(290));
  }

  #[test]
  fn test_stale_fetch_discarded() {
    let mut state = TargetWordsState::default();
    let track_a = state.begin_fetch();
    let track_b = state.begin_fetch();
    assert_eq!(state.apply_fetch(track_b, &fetched(120_000)), FetchOutcome::Applied {
      target_words: Some(204)
    });
    // Track A's slow response arrives after B was selected.
    assert_eq!(state.apply_fetch(track_a, &fetched(300_000)), FetchOutcome::Stale);
    assert_eq!(state.duration_ms(), Some(120_000));
    assert_eq!(state.target_words(), Some(204));
  }

  #[test]
  fn test_stale_failure_ignored() {
    let mut state = TargetWordsState::default();
    let old = state.begin_fetch();
    let new = state.begin_fetch();
    state.apply_fetch(new, &fetched(60_000));
    assert_eq!(state.fetch_failed(old, CalcError::Fetch("timeout".into())), None);
    assert_eq!(state.phase(), Phase::Computed);
  }

  #[test]
  fn test_fetch_failure_resets_state() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    let id = state.begin_fetch();
    let err = state.fetch_failed(id, CalcError::Fetch("503".into()));
    assert_eq!(err, Some(CalcError::Fetch("503".into())));
    assert_eq!(state.phase(), Phase::Unset);
    assert_eq!(state.duration_ms(), None);
    assert_eq!(state.target_words(), None);
  }

  // ========== Parameter Changes ==========

  #[test]
  fn test_speed_change_recomputes() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(120_000));
    assert_eq!(state.target_words(), Some(204));
    state.set_voice_speed(1.5);
    assert_eq!(state.target_words(), Some(306));
  }

  #[test]
  fn test_entry_delay_change_recomputes() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    state.set_entry_delay(10_000);
    assert_eq!(state.target_words(), Some(289));
  }

  #[test]
  fn test_delay_exhausting_track_clears_target() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(60_000));
    state.set_entry_delay(60_000);
    assert_eq!(state.target_words(), None);
  }

  #[test]
  fn test_crossfade_never_recomputes() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    let before = state.target_words();
    state.set_crossfade(5_000);
    assert_eq!(state.target_words(), before);
    assert_eq!(state.crossfade_ms(), 5_000);
  }

  #[test]
  fn test_param_change_without_duration_is_noop() {
    let mut state = TargetWordsState::default();
    state.set_voice_speed(1.5);
    assert_eq!(state.phase(), Phase::Unset);
    assert_eq!(state.target_words(), None);
  }

  // ========== Manual Override ==========

  #[test]
  fn test_manual_override_holds_through_param_changes() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    assert!(state.manual_override(250));
    assert_eq!(state.phase(), Phase::ManualOverride);
    state.set_voice_speed(2.0);
    state.set_entry_delay(15_000);
    assert_eq!(state.target_words(), Some(250));
  }

  #[test]
  fn test_manual_override_rejects_zero() {
    let mut state = TargetWordsState::default();
    assert!(!state.manual_override(0));
    assert_eq!(state.phase(), Phase::Unset);
  }

  #[test]
  fn test_new_fetch_overwrites_manual_override() {
    let mut state = TargetWordsState::default();
    state.manual_override(500);
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    assert_eq!(state.phase(), Phase::Computed);
    assert_eq!(state.target_words(), Some(306));
  }

  #[test]
  fn test_auto_calculate_overwrites_manual_override() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    state.manual_override(999);
    assert_eq!(state.auto_calculate(), Some(306));
    assert_eq!(state.phase(), Phase::Computed);
  }

  #[test]
  fn test_auto_calculate_without_duration_needs_fetch() {
    let mut state = TargetWordsState::default();
    assert_eq!(state.auto_calculate(), None);
    assert_eq!(state.phase(), Phase::Unset);
  }

  // ========== Clearing ==========

  #[test]
  fn test_clear_track_resets_computed_state() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    state.clear_track();
    assert_eq!(state.phase(), Phase::Unset);
    assert_eq!(state.duration_ms(), None);
    assert_eq!(state.target_words(), None);
  }

  #[test]
  fn test_clear_track_keeps_manual_value() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    state.manual_override(275);
    state.clear_track();
    assert_eq!(state.phase(), Phase::ManualOverride);
    assert_eq!(state.duration_ms(), None);
    assert_eq!(state.target_words(), Some(275));
  }

  #[test]
  fn test_config_overrides_flow_into_calculation() {
    let mut config = CoreConfig::default();
    config.base_wpm = 140.0;
    let mut state = TargetWordsState::new(&config);
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(60_000));
    assert_eq!(state.target_words(), Some(140));
  }

  #[test]
  fn test_estimated_speech_duration_for_display() {
    let mut state = TargetWordsState::default();
    let id = state.begin_fetch();
    state.apply_fetch(id, &fetched(180_000));
    assert_eq!(state.estimated_speech_ms(), Some(180_000));
  }
}
