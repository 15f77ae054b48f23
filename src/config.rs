use crate::constants::{
    DEFAULT_BASE_WPM, DEFAULT_SAFETY_FACTOR, TOLERANCE_FLOOR_WORDS, TOLERANCE_FRACTION,
};
use crate::comparison::Tolerance;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Core configuration. The WPM and safety-factor defaults were empirically
/// tuned in production and may change; they stay overridable here rather than
/// hard-coded in the calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub base_wpm: f64,
    pub safety_factor: f64,
    pub tolerance_floor_words: u32,
    pub tolerance_fraction: f64,
    pub backend_url: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_wpm: DEFAULT_BASE_WPM,
            safety_factor: DEFAULT_SAFETY_FACTOR,
            tolerance_floor_words: TOLERANCE_FLOOR_WORDS,
            tolerance_fraction: TOLERANCE_FRACTION,
            backend_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            floor_words: self.tolerance_floor_words,
            fraction: self.tolerance_fraction,
        }
    }
}

/// Load config from a JSON file, falling back to defaults when the file is
/// missing or unreadable. Out-of-range values are clamped back to defaults.
pub fn load_config(path: &Path) -> CoreConfig {
    let config = match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<CoreConfig>(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("config file {} is not valid JSON: {}", path.display(), e);
                CoreConfig::default()
            }
        },
        Err(_) => CoreConfig::default(),
    };
    normalize(config)
}

fn normalize(mut config: CoreConfig) -> CoreConfig {
    if config.base_wpm <= 0.0 || !config.base_wpm.is_finite() {
        config.base_wpm = DEFAULT_BASE_WPM;
    }
    // Safety factor must stay in (0, 1]: 1.0 means no reduction.
    if !(config.safety_factor > 0.0 && config.safety_factor <= 1.0) {
        config.safety_factor = DEFAULT_SAFETY_FACTOR;
    }
    if !(0.0..=1.0).contains(&config.tolerance_fraction) {
        config.tolerance_fraction = TOLERANCE_FRACTION;
    }
    if config.backend_url.trim().is_empty() {
        config.backend_url = CoreConfig::default().backend_url;
    }
    config
}
