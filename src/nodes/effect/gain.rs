//! Gain/volume control effect

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// Messages to control gain
#[derive(Clone, Copy, Debug)]
pub enum GainMessage {
    /// Set the gain multiplier (1.0 = unity, 0.0 = silence)
    SetGain(f32),
}

/// A gain (volume) control that passes audio through with amplitude scaling.
///
/// The context uses one of these as its master stage. Each output channel
/// reads the matching input channel, or the last one available, so a mono
/// input fans out to every output.
pub struct Gain {
    gain: f32,
    /// Smoothing to prevent clicks on rapid gain changes
    smoothed_gain: f32,
    /// Smoothing coefficient (0.0 = instant, 1.0 = no change)
    smooth_coeff: f32,
    channels: usize,
}

impl Gain {
    /// Create a new mono gain node with the specified gain value
    pub fn new(gain: f32) -> Self {
        Self {
            gain,
            smoothed_gain: gain,
            smooth_coeff: 0.995, // ~4ms at 48kHz
            channels: 1,
        }
    }

    /// Set the number of output channels (1 or 2)
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels.clamp(1, 2);
        self
    }

    /// Set the smoothing time in milliseconds
    pub fn with_smoothing_ms(mut self, ms: f32, sample_rate: u32) -> Self {
        // after `ms` milliseconds we've covered ~63% of the distance to target
        let samples = (ms / 1000.0) * sample_rate as f32;
        self.smooth_coeff = (-1.0 / samples).exp();
        self
    }

    /// Disable smoothing for instant gain changes
    pub fn without_smoothing(mut self) -> Self {
        self.smooth_coeff = 0.0;
        self
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                GainMessage::SetGain(g) => self.gain = g,
            }
        }

        // Only the first input is read; an unconnected gain outputs silence
        let in_buffers = match inputs.first() {
            Some(input) if !input.buffers().is_empty() => input.buffers(),
            _ => {
                outputs.iter_mut().for_each(Buffer::silence);
                return;
            }
        };

        let smooth_coeff = self.smooth_coeff;
        let target_gain = self.gain;
        let start_gain = self.smoothed_gain;
        let mut end_gain = start_gain;

        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            let in_buffer = &in_buffers[ch.min(in_buffers.len() - 1)];

            // every channel walks the same smoothing curve
            let mut gain = start_gain;
            for (out_sample, &in_sample) in out_buffer.iter_mut().zip(in_buffer.iter()) {
                gain = target_gain + smooth_coeff * (gain - target_gain);
                *out_sample = in_sample * gain;
            }
            end_gain = gain;
        }

        self.smoothed_gain = end_gain;
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { self.channels }
}
