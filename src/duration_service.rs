// Backend duration lookup
//
// The generator UI asks the backend for a track's duration before it can
// compute a word budget. The backend may also answer with a ready-made
// target word count; when it does, that value is authoritative and local
// calculation is skipped (see state::TargetWordsState::apply_fetch).

use crate::constants::{FETCH_CONNECT_TIMEOUT_SECS, FETCH_READ_TIMEOUT_SECS};
use crate::errors::CalcError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Identifies the track to look up, plus the parameters the backend may use
/// to compute `target_words` itself.
#[derive(Debug, Clone, Serialize)]
pub struct TrackRef {
    /// Relative path of the track within the backend's music directory
    pub path: String,
    pub voice_speed: f64,
    pub speech_entry_ms: u64,
    /// Words-per-minute override; omitted to use the backend default
    pub wpm: Option<f64>,
    pub safety_factor: Option<f64>,
}

impl TrackRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            voice_speed: 1.0,
            speech_entry_ms: 0,
            wpm: None,
            safety_factor: None,
        }
    }
}

/// Response of the backend's `/api/music/duration` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDuration {
    pub duration_ms: u64,
    pub duration_formatted: String,
    /// Backend-computed target; authoritative when present
    pub target_words: Option<u32>,
    pub words_per_minute: Option<f64>,
}

/// Seam between the reconciliation logic and the backend. Tests use an
/// in-memory implementation; production uses `HttpDurationService`.
pub trait DurationLookup {
    fn fetch_duration(&self, track: &TrackRef) -> Result<TrackDuration, CalcError>;
}

pub struct HttpDurationService {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpDurationService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::builder()
            .timeout_connect(Duration::from_secs(FETCH_CONNECT_TIMEOUT_SECS))
            .timeout_read(Duration::from_secs(FETCH_READ_TIMEOUT_SECS))
            .build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, track: &TrackRef) -> Result<Url, CalcError> {
        let mut url = Url::parse(&self.base_url)
            .and_then(|base| base.join("/api/music/duration"))
            .map_err(|e| CalcError::Fetch(format!("invalid backend url: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", &track.path);
            query.append_pair("voice_speed", &track.voice_speed.to_string());
            query.append_pair("speech_entry_ms", &track.speech_entry_ms.to_string());
            if let Some(wpm) = track.wpm {
                query.append_pair("wpm", &(wpm.round() as u64).to_string());
            }
            if let Some(safety_factor) = track.safety_factor {
                query.append_pair("safety_factor", &safety_factor.to_string());
            }
        }
        Ok(url)
    }
}

impl DurationLookup for HttpDurationService {
    fn fetch_duration(&self, track: &TrackRef) -> Result<TrackDuration, CalcError> {
        let url = self.endpoint(track)?;
        debug!(%url, "requesting track duration");

        let response = self
            .agent
            .get(url.as_str())
            .set("User-Agent", "StimgenCore/DurationLookup")
            .call()
            .map_err(|e| CalcError::Fetch(format!("duration request failed: {}", e)))?;

        let duration: TrackDuration = response
            .into_json()
            .map_err(|e| CalcError::Fetch(format!("invalid duration response: {}", e)))?;

        if duration.duration_ms == 0 {
            return Err(CalcError::InvalidDuration);
        }
        Ok(duration)
    }
}
