//! Audio effect nodes (processors with audio inputs and outputs)

mod gain;
mod highpass;
mod mixer;

pub use gain::{Gain, GainMessage};
pub use highpass::Biquad;
pub use mixer::Mixer;
