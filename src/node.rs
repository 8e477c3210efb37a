//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call. Contains the graph's sample rate
/// and the buffer size (always 64 samples, the `dasp_graph` block length).
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per buffer (currently always 64)
    pub buffer_size: usize,
}

impl ProcessContext {
    /// Duration of one block in seconds.
    #[inline]
    pub fn block_seconds(&self) -> f64 {
        self.buffer_size as f64 / self.sample_rate as f64
    }
}

/// Unique identifier for a node within a graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: Generate audio (0 inputs, 1+ outputs) - oscillators, the voice bank
/// - **Effects**: Process audio (1+ inputs, 1+ outputs) - gain, mixer, filters
/// - **Sinks**: Consume audio (1+ inputs, 0 outputs) - device outputs, ring buffers
///
/// # Message-Based Parameters
///
/// Nodes never share mutable state with the control side. Parameter updates
/// arrive as messages and are drained at the start of `process()`:
///
/// ```
/// use ambiance::{AudioNode, ProcessContext};
/// use dasp_graph::{Buffer, Input};
///
/// enum DroneMessage {
///     SetPitch(f32),
/// }
///
/// struct Drone {
///     pitch: f32,
///     phase: f32,
/// }
///
/// impl AudioNode for Drone {
///     type Message = DroneMessage;
///
///     fn process(
///         &mut self,
///         ctx: &ProcessContext,
///         messages: impl Iterator<Item = DroneMessage>,
///         _inputs: &[Input],
///         outputs: &mut [Buffer],
///     ) {
///         for msg in messages {
///             match msg {
///                 DroneMessage::SetPitch(p) => self.pitch = p,
///             }
///         }
///
///         for sample in outputs[0].iter_mut() {
///             *sample = (self.phase * std::f32::consts::TAU).sin() * 0.1;
///             self.phase = (self.phase + self.pitch / ctx.sample_rate as f32) % 1.0;
///         }
///     }
/// }
/// ```
///
/// Nodes without runtime parameters use `()` as their message type.
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates.
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write to `outputs`
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize { 0 }

    /// Number of audio output channels.
    fn num_outputs(&self) -> usize { 1 }
}
