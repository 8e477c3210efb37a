//! Error types.

use thiserror::Error;

/// Failures reported by an [`AudioPlatform`](crate::AudioPlatform) or
/// [`AudioContext`](crate::AudioContext).
///
/// None of these are fatal to the host: the engine turns every one of them
/// into "no sound" and, where it makes sense, tries again on the next gesture.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// The platform refuses to start or resume output without a user gesture.
    #[error("audio output is blocked until a user gesture")]
    PolicyBlocked,
    /// No synthesis backend or output device exists.
    #[error("audio synthesis is unavailable: {0}")]
    UnsupportedPlatform(String),
    /// Something went wrong while wiring oscillators, gains or the output.
    #[error("failed to build the audio graph: {0}")]
    GraphConstruction(String),
    /// The context was already closed.
    #[error("audio context is closed")]
    Closed,
}

impl AudioError {
    /// Whether a later attempt (usually the next gesture) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AudioError::PolicyBlocked | AudioError::GraphConstruction(_))
    }
}

/// Failures while loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(AudioError::PolicyBlocked.is_retryable());
        assert!(AudioError::GraphConstruction("oops".into()).is_retryable());
        assert!(!AudioError::UnsupportedPlatform("no device".into()).is_retryable());
        assert!(!AudioError::Closed.is_retryable());
    }

    #[test]
    fn messages_name_the_cause() {
        let err = AudioError::UnsupportedPlatform("no output device".into());
        assert_eq!(err.to_string(), "audio synthesis is unavailable: no output device");
    }
}
