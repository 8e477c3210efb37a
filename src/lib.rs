//! # Ambiance - procedural ambient audio engine
//!
//! A small audio engine that keeps a quiet background hum running, sprinkles
//! randomly pitched "ghost" and "arcade" tones on a jittered timer, and plays
//! short "ping"/"blip" feedback tones on demand. Everything sits behind a
//! single on/off toggle.
//!
//! The engine is split in two halves:
//!
//! - [`AmbientEngine`] - the session state machine (lazy initialization,
//!   toggle, teardown, scheduling). It talks to audio only through the
//!   [`AudioPlatform`] / [`AudioContext`] traits.
//! - [`GraphContext`] - the default [`AudioContext`], a message-passing audio
//!   graph (oscillators, gains, a highpass filter and a voice bank) that renders
//!   to a ring buffer or, with the `cpal_sink` feature, to a sound card.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ambiance::{AmbientEngine, EngineConfig, Gesture, OfflinePlatform};
//!
//! // With the `cpal_sink` feature, `DevicePlatform::default()` plays to speakers.
//! let mut engine = AmbientEngine::new(OfflinePlatform::new(48_000), EngineConfig::default());
//!
//! // Audio starts on the first qualifying gesture.
//! engine.handle_gesture(Gesture::KeyDown);
//!
//! let start = std::time::Instant::now();
//! loop {
//!     engine.update(start.elapsed().as_secs_f64());
//!     std::thread::sleep(std::time::Duration::from_millis(5));
//! }
//! ```
//!
//! ## Offline Rendering
//!
//! [`OfflinePlatform`] builds the same graph but writes interleaved samples
//! into an [`rtrb`] ring buffer instead of a device, which is what the tests
//! use to inspect real output.
//!
//! ## Features
//!
//! - `cpal_sink` - Enable [`CpalSink`](nodes::CpalSink), [`CpalDevice`] and
//!   [`DevicePlatform`] for real audio output.

extern crate alloc;

mod node;
mod graph;
mod context;
#[cfg(feature = "cpal_sink")]
mod device;
mod engine;
mod envelope;
mod error;
mod scheduler;

pub mod config;
pub mod mix;
pub mod nodes;
pub mod platform;
pub mod tone;

pub use node::{AudioNode, ProcessContext, NodeId};
pub use context::GraphContext;
pub use config::{EngineConfig, HumConfig, ScheduleWindow};
pub use engine::{AmbientEngine, DiscreteEvent, Gesture, HoverTarget, SessionState};
pub use envelope::{Automation, Envelope};
pub use error::{AudioError, ConfigError};
pub use mix::{Channel, MixLevels};
pub use platform::{AudioContext, AudioPlatform, ContextState, GeneratorId, GeneratorSpec, OfflinePlatform};
pub use scheduler::{Scheduler, TaskHandle};
pub use tone::{Palette, ToneEvent, ToneKind, Waveform};

#[cfg(feature = "cpal_sink")]
pub use device::{CpalDevice, DevicePlatform};
