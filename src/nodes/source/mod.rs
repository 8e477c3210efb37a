//! Audio source nodes (generators with no audio inputs)

mod oscillator;
mod voice_bank;

pub use oscillator::{Oscillator, OscillatorMessage};
pub use voice_bank::{VoiceBank, VoiceMessage};
