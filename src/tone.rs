//! Tone descriptors and the palettes they are drawn from.
//!
//! A [`ToneEvent`] is a fire-and-forget sound: a waveform, a base frequency,
//! optional frequency automation, gain automation and a fixed duration after
//! which it stops by itself. The engine never keeps them around.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::mix::{Channel, MixLevels};

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Sample the waveform at `phase` in `[0, 1)`. Output is in `[-1, 1]`.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * core::f32::consts::TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        }
    }
}

/// What a tone is for. Decides its mix channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneKind {
    /// Long, soft ambient tone.
    Ghost,
    /// Short, sharp ambient tone.
    Arcade,
    /// Hover feedback.
    Ping,
    /// Click/highlight feedback.
    Blip,
    /// Footer animation thump.
    Roo,
}

impl ToneKind {
    pub fn channel(self) -> Channel {
        match self {
            ToneKind::Ghost => Channel::Ghost,
            ToneKind::Arcade => Channel::Arcade,
            ToneKind::Ping => Channel::Ping,
            ToneKind::Blip => Channel::Blip,
            ToneKind::Roo => Channel::Roo,
        }
    }
}

/// A self-terminating sound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToneEvent {
    pub kind: ToneKind,
    pub waveform: Waveform,
    pub base_frequency: f32,
    /// Frequency automation. `None` keeps `base_frequency` throughout.
    pub frequency_envelope: Option<Envelope>,
    pub gain_envelope: Envelope,
    /// Seconds until the tone stops.
    pub duration: f64,
    /// Highpass cutoff in Hz, if the tone runs through a filter.
    pub highpass: Option<f32>,
}

impl ToneEvent {
    #[inline]
    pub fn frequency_at(&self, t: f64) -> f32 {
        match &self.frequency_envelope {
            Some(env) => env.value_at(t),
            None => self.base_frequency,
        }
    }

    #[inline]
    pub fn gain_at(&self, t: f64) -> f32 {
        self.gain_envelope.value_at(t)
    }

    pub fn peak_gain(&self) -> f32 {
        self.gain_envelope.peak()
    }
}

/// Near-silence target for exponential decays (they cannot reach zero).
pub const SILENCE: f32 = 0.0001;

/// Pitches and shapes the ambient and feedback tones are built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub ghost_frequencies: Vec<f32>,
    pub arcade_frequencies: Vec<f32>,
    /// Lowest ping pitch; a random offset up to `ping_jitter` is added.
    pub ping_base: f32,
    pub ping_jitter: f32,
    pub ping_highpass: f32,
    pub blip_start: f32,
    pub blip_end: f32,
    pub roo_frequency: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ghost_frequencies: vec![110.0, 220.0, 330.0, 440.0],
            arcade_frequencies: vec![440.0, 660.0, 880.0, 1200.0, 1600.0],
            ping_base: 6500.0,
            ping_jitter: 500.0,
            ping_highpass: 2500.0,
            blip_start: 5500.0,
            blip_end: 40.0,
            roo_frequency: 60.0,
        }
    }
}

impl Palette {
    /// Sine swell: fades in over 0.5s, decays to near silence by 3s, stops at 3.1s.
    pub fn ghost(&self, frequency: f32, mix: &MixLevels) -> ToneEvent {
        let peak = mix.level(Channel::Ghost);
        ToneEvent {
            kind: ToneKind::Ghost,
            waveform: Waveform::Sine,
            base_frequency: frequency,
            frequency_envelope: None,
            gain_envelope: Envelope::starting_at(0.0)
                .linear_to(peak, 0.5)
                .exponential_to(SILENCE, 3.0),
            duration: 3.1,
            highpass: None,
        }
    }

    /// Chirp: pitch rises x1.5 over 0.1s while the gain decays by 0.2s.
    pub fn arcade(&self, waveform: Waveform, frequency: f32, mix: &MixLevels) -> ToneEvent {
        ToneEvent {
            kind: ToneKind::Arcade,
            waveform,
            base_frequency: frequency,
            frequency_envelope: Some(
                Envelope::starting_at(frequency).exponential_to(frequency * 1.5, 0.1),
            ),
            gain_envelope: Envelope::starting_at(mix.level(Channel::Arcade))
                .exponential_to(SILENCE, 0.2),
            duration: 0.21,
            highpass: None,
        }
    }

    /// High, filtered glass ping for hover feedback.
    pub fn ping<R: Rng>(&self, rng: &mut R, mix: &MixLevels) -> ToneEvent {
        let frequency = self.ping_base + rng.gen::<f32>() * self.ping_jitter;
        ToneEvent {
            kind: ToneKind::Ping,
            waveform: Waveform::Sine,
            base_frequency: frequency,
            frequency_envelope: None,
            gain_envelope: Envelope::starting_at(mix.level(Channel::Ping))
                .exponential_to(SILENCE, 0.1),
            duration: 0.11,
            highpass: Some(self.ping_highpass),
        }
    }

    /// Descending square-wave blip.
    pub fn blip(&self, mix: &MixLevels) -> ToneEvent {
        ToneEvent {
            kind: ToneKind::Blip,
            waveform: Waveform::Square,
            base_frequency: self.blip_start,
            frequency_envelope: Some(
                Envelope::starting_at(self.blip_start).exponential_to(self.blip_end, 0.08),
            ),
            gain_envelope: Envelope::starting_at(mix.level(Channel::Blip)).linear_to(0.0, 0.08),
            duration: 0.09,
            highpass: None,
        }
    }

    /// Short low sine thump.
    pub fn roo(&self, mix: &MixLevels) -> ToneEvent {
        ToneEvent {
            kind: ToneKind::Roo,
            waveform: Waveform::Sine,
            base_frequency: self.roo_frequency,
            frequency_envelope: None,
            gain_envelope: Envelope::starting_at(mix.level(Channel::Roo)).exponential_to(SILENCE, 0.1),
            duration: 0.1,
            highpass: None,
        }
    }

    /// Draw the next background tone: a ghost with probability
    /// `ghost_probability`, otherwise an arcade chirp.
    pub fn next_ambient<R: Rng>(
        &self,
        rng: &mut R,
        ghost_probability: f64,
        mix: &MixLevels,
    ) -> Option<ToneEvent> {
        if rng.gen::<f64>() < ghost_probability {
            let frequency = *self.ghost_frequencies.choose(rng)?;
            Some(self.ghost(frequency, mix))
        } else {
            let waveform = if rng.gen_bool(0.5) {
                Waveform::Square
            } else {
                Waveform::Triangle
            };
            let frequency = *self.arcade_frequencies.choose(rng)?;
            Some(self.arcade(waveform, frequency, mix))
        }
    }
}
