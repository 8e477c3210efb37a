//! Mixer effect - sums multiple inputs together

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// A mixer that sums every connected input with equal weight.
///
/// Mono inputs are copied to every output channel; inputs with more channels
/// than the mixer has outputs lose the extras. The context sums the hum and
/// the voice bank through one of these before the master gain.
pub struct Mixer {
    channels: usize,
}

impl Mixer {
    /// Create a new mixer with the specified number of output channels
    pub fn new(channels: usize) -> Self {
        Self { channels: channels.max(1) }
    }

    pub fn stereo() -> Self {
        Self::new(2)
    }

    pub fn mono() -> Self {
        Self::new(1)
    }
}

impl AudioNode for Mixer {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        output: &mut [Buffer],
    ) {
        output.iter_mut().for_each(Buffer::silence);

        for input in inputs {
            let buffers = input.buffers();
            if buffers.is_empty() {
                continue;
            }

            for (out_ch, out_buf) in output.iter_mut().enumerate() {
                let in_buf = &buffers[out_ch.min(buffers.len() - 1)];
                for (out_sample, in_sample) in out_buf.iter_mut().zip(in_buf.iter()) {
                    *out_sample += *in_sample;
                }
            }
        }
    }

    fn num_inputs(&self) -> usize {
        usize::MAX
    }

    fn num_outputs(&self) -> usize {
        self.channels
    }
}
