//! Built-in audio nodes.
//!
//! ## Sources ([`source`])
//!
//! - [`Oscillator`] - Free-running sine/square/sawtooth/triangle (the hum)
//! - [`VoiceBank`] - Renders self-terminating [`ToneEvent`](crate::ToneEvent)s
//!
//! ## Effects ([`effect`])
//!
//! - [`Gain`] - Volume control with smoothing (one per generator)
//! - [`Mixer`] - Sum multiple inputs together
//! - [`Biquad`] - Highpass filter section used inside the voice bank
//!
//! ## Sinks ([`sink`])
//!
//! - [`CpalSink`] - Output to a system audio device (requires `cpal_sink` feature)
//! - [`RtrbSink`] - Write to a ring buffer (offline rendering)
//!
//! Nodes without parameters (like [`Mixer`]) use `()` as their message type.

pub mod source;
pub mod effect;
pub mod sink;

pub use source::{Oscillator, OscillatorMessage, VoiceBank, VoiceMessage};
pub use effect::{Biquad, Gain, GainMessage, Mixer};
pub use sink::RtrbSink;

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
