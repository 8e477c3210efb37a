//! Ring buffer sink for offline rendering

use dasp_graph::{Buffer, Input};
use rtrb::Producer;
use tracing::trace;

use crate::node::{AudioNode, ProcessContext};

/// A sink that pushes interleaved audio into an rtrb ring buffer.
///
/// [`OfflinePlatform`](crate::OfflinePlatform) renders through one of these,
/// so tests and tools can read exactly what a device would have played.
/// A full buffer drops the whole block rather than writing part of it.
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
    dropped_blocks: u64,
}

impl RtrbSink {
    /// Create a sink that writes interleaved samples to the given producer
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            dropped_blocks: 0,
        }
    }

    pub fn mono(producer: Producer<f32>) -> Self {
        Self::new(producer, 1)
    }

    /// Returns how many sample slots are available
    #[inline]
    pub fn available(&self) -> usize {
        self.producer.slots()
    }

    /// Blocks skipped because the reader fell behind
    #[inline]
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks
    }
}

impl AudioNode for RtrbSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let buffers = match inputs.first() {
            Some(input) if !input.buffers().is_empty() => input.buffers(),
            _ => return,
        };

        let buffer_len = buffers[0].len();
        let samples_needed = buffer_len * self.channels;

        if self.producer.slots() < samples_needed {
            self.dropped_blocks += 1;
            trace!(dropped = self.dropped_blocks, "output ring buffer full, dropping block");
            return;
        }

        for i in 0..buffer_len {
            for ch in 0..self.channels {
                let src_ch = ch.min(buffers.len() - 1);
                // cannot fail, the slot count was checked above
                let _ = self.producer.push(buffers[src_ch][i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
