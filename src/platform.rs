//! The seam between the engine and whatever produces sound.
//!
//! [`AudioPlatform`] creates contexts; [`AudioContext`] is one live synthesis
//! graph with a run state, persistent generators and fire-and-forget tones.
//! [`GraphContext`](crate::GraphContext) is the real implementation; tests
//! substitute recording fakes.

use rtrb::{Consumer, RingBuffer};
use tracing::debug;

use crate::context::GraphContext;
use crate::error::AudioError;
use crate::nodes::RtrbSink;
use crate::tone::{ToneEvent, Waveform};

/// Run state of a live context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextState {
    Running,
    Suspended,
    Closed,
}

/// Identifies a persistent generator started on a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorId(pub u32);

/// A generator that runs until it is explicitly stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorSpec {
    pub waveform: Waveform,
    pub frequency: f32,
    pub gain: f32,
}

/// Something that can create audio contexts.
pub trait AudioPlatform {
    type Context: AudioContext;

    /// Create a new context.
    ///
    /// Fails with [`AudioError::PolicyBlocked`] when output needs a user
    /// gesture first, and with [`AudioError::UnsupportedPlatform`] when there
    /// is nothing to play through.
    fn create_context(&mut self) -> Result<Self::Context, AudioError>;
}

/// One live synthesis graph.
pub trait AudioContext {
    fn state(&self) -> ContextState;

    /// Seconds of audio rendered so far. Does not advance while suspended.
    fn current_time(&self) -> f64;

    fn resume(&mut self) -> Result<(), AudioError>;

    fn suspend(&mut self) -> Result<(), AudioError>;

    /// Release the graph. Idempotent.
    fn close(&mut self);

    fn start_generator(&mut self, spec: GeneratorSpec) -> Result<GeneratorId, AudioError>;

    fn stop_generator(&mut self, id: GeneratorId);

    /// Start a self-terminating tone now.
    fn play_tone(&mut self, tone: ToneEvent) -> Result<(), AudioError>;

    /// Cap how many tones may sound at once; starting one more cuts the
    /// oldest. Contexts without a voice pool can ignore it.
    fn set_voice_limit(&mut self, _voices: usize) {}

    /// Let `dt` seconds of wall time pass. Contexts that render on demand
    /// produce audio here; others can ignore it.
    fn advance(&mut self, _dt: f64) {}
}

/// Renders the real graph into a ring buffer instead of a device.
///
/// Creating a context hands out a fresh [`Consumer`] for the interleaved
/// mono output, collected with [`take_output`](Self::take_output).
///
/// ```
/// use ambiance::{AudioContext, AudioPlatform, OfflinePlatform};
///
/// let mut platform = OfflinePlatform::new(48_000);
/// let mut ctx = platform.create_context().unwrap();
/// let mut output = platform.take_output().unwrap();
///
/// ctx.advance(0.01);
/// assert!(output.slots() > 0);
/// ```
pub struct OfflinePlatform {
    sample_rate: u32,
    capacity: usize,
    output: Option<Consumer<f32>>,
    contexts_created: usize,
}

impl OfflinePlatform {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            // ten seconds of mono output
            capacity: sample_rate as usize * 10,
            output: None,
            contexts_created: 0,
        }
    }

    /// Size of the output ring buffer in samples.
    pub fn with_capacity(mut self, samples: usize) -> Self {
        self.capacity = samples.max(crate::context::BLOCK_SIZE);
        self
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of contexts this platform has handed out.
    #[inline]
    pub fn contexts_created(&self) -> usize {
        self.contexts_created
    }

    /// The output of the most recently created context.
    pub fn take_output(&mut self) -> Option<Consumer<f32>> {
        self.output.take()
    }
}

impl AudioPlatform for OfflinePlatform {
    type Context = GraphContext;

    fn create_context(&mut self) -> Result<GraphContext, AudioError> {
        let (producer, consumer) = RingBuffer::new(self.capacity);
        let context = GraphContext::new(self.sample_rate).with_output(RtrbSink::mono(producer));

        self.output = Some(consumer);
        self.contexts_created += 1;
        debug!(sample_rate = self.sample_rate, "offline context created");
        Ok(context)
    }
}
