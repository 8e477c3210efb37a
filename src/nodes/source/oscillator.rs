//! Free-running oscillator

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::tone::Waveform;

/// Messages to control an [`Oscillator`]
#[derive(Clone, Copy, Debug)]
pub enum OscillatorMessage {
    SetFrequency(f32),
    SetAmplitude(f32),
    /// Silence the oscillator for good. It stays in the graph but outputs zeros.
    Stop,
}

/// A continuously running oscillator (mono source).
///
/// Used for generators that live as long as the context, like the background
/// hum. Short-lived tones go through [`VoiceBank`](super::VoiceBank) instead.
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
    amplitude: f32,
    stopped: bool,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency: frequency.max(0.0),
            phase: 0.0,
            amplitude: 0.25, // -12dB, safe default
            stopped: false,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl AudioNode for Oscillator {
    type Message = OscillatorMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = OscillatorMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                OscillatorMessage::SetFrequency(f) => self.frequency = f.max(0.0),
                OscillatorMessage::SetAmplitude(a) => self.amplitude = a.clamp(0.0, 1.0),
                OscillatorMessage::Stop => self.stopped = true,
            }
        }

        let (first, rest) = match outputs.split_first_mut() {
            Some(split) => split,
            None => return,
        };

        if self.stopped {
            first.silence();
        } else {
            let phase_inc = self.frequency / ctx.sample_rate as f32;
            let amplitude = self.amplitude;

            for sample in first.iter_mut() {
                *sample = self.waveform.sample(self.phase) * amplitude;

                self.phase += phase_inc;
                // Branchless phase wrap (phase is always positive)
                self.phase -= (self.phase >= 1.0) as u32 as f32;
            }
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
