//! Engine configuration.
//!
//! [`EngineConfig`] is plain data: construct it with [`Default`] and the
//! `with_*` builders, or load it from JSON. Every field is optional in JSON;
//! missing fields fall back to the defaults.
//!
//! ```
//! use ambiance::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "mix": { "master": 0.5 } }"#).unwrap();
//! assert_eq!(config.mix.master, 0.5);
//! assert_eq!(config.mix.ghost, 0.10);
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mix::MixLevels;
use crate::tone::{Palette, Waveform};

/// The continuous background hum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumConfig {
    pub waveform: Waveform,
    pub frequency: f32,
}

impl Default for HumConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sawtooth,
            frequency: 60.0,
        }
    }
}

/// Bounds (seconds) of the uniformly random delay between ambient tones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleWindow {
    pub min_delay: f64,
    pub max_delay: f64,
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self {
            min_delay: 1.0,
            max_delay: 1.5,
        }
    }
}

impl ScheduleWindow {
    /// Both bounds finite and positive. Their order does not matter.
    pub fn is_usable(&self) -> bool {
        self.min_delay.is_finite() && self.max_delay.is_finite() && self.min_delay > 0.0 && self.max_delay > 0.0
    }

    /// Draw the delay until the next ambient tone. An unusable window draws
    /// from the default one instead.
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> f64 {
        let window = if self.is_usable() { *self } else { Self::default() };
        let lo = window.min_delay.min(window.max_delay);
        let hi = window.min_delay.max(window.max_delay);
        rng.gen_range(lo..=hi)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mix: MixLevels,
    pub hum: HumConfig,
    pub schedule: ScheduleWindow,
    /// Chance that an ambient firing is a ghost rather than an arcade chirp.
    pub ghost_probability: f64,
    pub palette: Palette,
    /// Skip ambient firings while the host reports itself hidden.
    pub suppress_when_hidden: bool,
    /// Most tones the voice bank renders at once; extra starts steal the oldest.
    pub voice_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mix: MixLevels::default(),
            hum: HumConfig::default(),
            schedule: ScheduleWindow::default(),
            ghost_probability: 0.8,
            palette: Palette::default(),
            suppress_when_hidden: false,
            voice_limit: 32,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_mix(mut self, mix: MixLevels) -> Self {
        self.mix = mix;
        self
    }

    pub fn with_schedule(mut self, min_delay: f64, max_delay: f64) -> Self {
        self.schedule = ScheduleWindow { min_delay, max_delay };
        self
    }

    pub fn with_ghost_probability(mut self, probability: f64) -> Self {
        self.ghost_probability = probability;
        self
    }

    pub fn with_suppress_when_hidden(mut self, suppress: bool) -> Self {
        self.suppress_when_hidden = suppress;
        self
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ScheduleWindow { min_delay, max_delay } = self.schedule;
        if !(min_delay.is_finite() && max_delay.is_finite()) || min_delay <= 0.0 || min_delay > max_delay {
            return Err(ConfigError::Invalid(format!(
                "schedule window must satisfy 0 < min_delay <= max_delay, got {}..{}",
                min_delay, max_delay
            )));
        }

        if !(0.0..=1.0).contains(&self.ghost_probability) {
            return Err(ConfigError::Invalid(format!(
                "ghost_probability must be within [0, 1], got {}",
                self.ghost_probability
            )));
        }

        for (name, level) in self.mix.all().iter() {
            if !level.is_finite() || *level < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "mix level `{}` must be a non-negative number, got {}",
                    name, level
                )));
            }
        }

        if self.palette.ghost_frequencies.is_empty() || self.palette.arcade_frequencies.is_empty() {
            return Err(ConfigError::Invalid("tone palettes must not be empty".into()));
        }

        let fixed = [
            self.hum.frequency,
            self.palette.ping_base,
            self.palette.blip_start,
            self.palette.blip_end,
            self.palette.roo_frequency,
        ];
        let pitches = self
            .palette
            .ghost_frequencies
            .iter()
            .chain(self.palette.arcade_frequencies.iter())
            .chain(fixed.iter());
        for f in pitches {
            if !f.is_finite() || *f <= 0.0 {
                return Err(ConfigError::Invalid(format!("frequencies must be positive, got {}", f)));
            }
        }

        if self.voice_limit == 0 {
            return Err(ConfigError::Invalid("voice_limit must be at least 1".into()));
        }

        Ok(())
    }
}
