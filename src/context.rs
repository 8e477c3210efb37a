//! Graph-backed audio context
//!
//! [`GraphContext`] owns one [`AudioGraph`] wired like this:
//!
//! ```text
//! Oscillator -> Gain ─┐          (one chain per persistent generator)
//!                     ├─> Mixer -> output sink
//!          VoiceBank ─┘          (every fire-and-forget tone)
//! ```
//!
//! All parameter changes travel as messages, so nothing on the render path
//! takes a lock.

use dasp_graph::Buffer;
use hashbrown::HashMap;
use tracing::{debug, trace, warn};

use crate::error::AudioError;
use crate::graph::{AudioGraph, NodeHandle};
use crate::node::{AudioNode, NodeId};
use crate::nodes::{Gain, GainMessage, Mixer, Oscillator, OscillatorMessage, VoiceBank, VoiceMessage};
use crate::platform::{AudioContext, ContextState, GeneratorId, GeneratorSpec};
use crate::tone::ToneEvent;

/// Samples per processed block.
pub(crate) const BLOCK_SIZE: usize = Buffer::LEN;

const DEFAULT_VOICE_LIMIT: usize = 32;

/// Room for a burst of tones between two rendered blocks.
const VOICE_QUEUE_SIZE: usize = 256;

/// Longest stretch [`AudioContext::advance`] will catch up on in one call.
const MAX_CATCH_UP_SECONDS: f64 = 1.0;

/// Absorbs rounding when wall-time slices add up to exactly one block.
const BLOCK_EPSILON: f64 = 1e-9;

struct Generator {
    oscillator: NodeHandle<OscillatorMessage>,
    gain: NodeHandle<GainMessage>,
}

/// The default [`AudioContext`]: a fixed-rate audio graph with a hum bus, a
/// voice bank and an optional output sink.
///
/// # Example
///
/// ```
/// use ambiance::{AudioContext, GeneratorSpec, GraphContext, Waveform};
///
/// let mut ctx = GraphContext::new(48_000);
/// ctx.start_generator(GeneratorSpec { waveform: Waveform::Sawtooth, frequency: 60.0, gain: 0.003 }).unwrap();
///
/// ctx.render(0.5);
/// assert!((ctx.current_time() - 0.5).abs() < 0.002);
/// ```
pub struct GraphContext {
    graph: AudioGraph,
    sample_rate: u32,
    state: ContextState,

    mixer: NodeId,
    voices: NodeHandle<VoiceMessage>,
    generators: HashMap<GeneratorId, Generator>,
    next_generator: u32,

    blocks_processed: u64,
    /// Wall time handed to `advance` that hasn't filled a whole block yet
    pending_seconds: f64,
}

impl GraphContext {
    /// Create a running context with no output sink.
    ///
    /// Without a sink the graph still renders up to the mixer, which is
    /// enough for inspection via [`last_block`](Self::last_block).
    pub fn new(sample_rate: u32) -> Self {
        let mut graph = AudioGraph::new(sample_rate);

        let voices = graph.add_with_queue_size(VoiceBank::new(DEFAULT_VOICE_LIMIT), VOICE_QUEUE_SIZE);
        let mixer = graph.add(Mixer::mono()).id();
        graph.connect(voices.id(), mixer);
        graph.set_terminal(mixer);

        Self {
            graph,
            sample_rate,
            state: ContextState::Running,
            mixer,
            voices,
            generators: HashMap::new(),
            next_generator: 0,
            blocks_processed: 0,
            pending_seconds: 0.0,
        }
    }

    /// Route the mix into `sink` (builder pattern).
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        let sink = self.graph.add(sink).id();
        self.graph.connect(self.mixer, sink);
        self.graph.set_terminal(sink);
        self
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Number of generators started and not yet stopped.
    #[inline]
    pub fn active_generators(&self) -> usize {
        self.generators.len()
    }

    /// The mixed (pre-sink) output of the last processed block.
    pub fn last_block(&self) -> Option<&Buffer> {
        self.graph.output_of(self.mixer).and_then(|buffers| buffers.first())
    }

    /// Process one block. Does nothing unless running.
    pub fn process(&mut self) -> bool {
        if self.state != ContextState::Running {
            return false;
        }
        self.graph.process();
        self.blocks_processed += 1;
        true
    }

    /// Render `seconds` of audio right away, rounded up to whole blocks.
    pub fn render(&mut self, seconds: f64) {
        let block_seconds = self.graph.context().block_seconds();
        let blocks = (seconds.max(0.0) / block_seconds).ceil() as u64;
        for _ in 0..blocks {
            if !self.process() {
                break;
            }
        }
    }
}

impl AudioContext for GraphContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn current_time(&self) -> f64 {
        self.blocks_processed as f64 * BLOCK_SIZE as f64 / self.sample_rate as f64
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        match self.state {
            ContextState::Closed => Err(AudioError::Closed),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                self.state = ContextState::Running;
                debug!(at = self.current_time(), "context resumed");
                Ok(())
            }
        }
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        match self.state {
            ContextState::Closed => Err(AudioError::Closed),
            ContextState::Suspended => Ok(()),
            ContextState::Running => {
                self.state = ContextState::Suspended;
                // wall time spent suspended is not owed when resuming
                self.pending_seconds = 0.0;
                debug!(at = self.current_time(), "context suspended");
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        for (_, mut generator) in self.generators.drain() {
            let _ = generator.oscillator.send(OscillatorMessage::Stop);
        }
        let _ = self.voices.send(VoiceMessage::Silence);

        // dropping the old graph drops the sink, which releases the device
        self.graph = AudioGraph::new(self.sample_rate);
        self.state = ContextState::Closed;
        debug!(blocks = self.blocks_processed, "context closed");
    }

    fn start_generator(&mut self, spec: GeneratorSpec) -> Result<GeneratorId, AudioError> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        if !(spec.frequency.is_finite() && spec.gain.is_finite()) {
            return Err(AudioError::GraphConstruction(format!(
                "generator parameters must be finite: {:?}",
                spec
            )));
        }

        let oscillator = self
            .graph
            .add(Oscillator::new(spec.waveform, spec.frequency).with_amplitude(1.0));
        let gain = self.graph.add(Gain::new(spec.gain));
        self.graph.connect(oscillator.id(), gain.id());
        self.graph.connect(gain.id(), self.mixer);

        let id = GeneratorId(self.next_generator);
        self.next_generator += 1;
        self.generators.insert(id, Generator { oscillator, gain });

        debug!(?id, waveform = ?spec.waveform, frequency = spec.frequency, gain = spec.gain, "generator started");
        Ok(id)
    }

    fn stop_generator(&mut self, id: GeneratorId) {
        if let Some(mut generator) = self.generators.remove(&id) {
            let _ = generator.gain.send(GainMessage::SetGain(0.0));
            if generator.oscillator.send(OscillatorMessage::Stop).is_err() {
                warn!(?id, "generator queue full, stop message dropped");
            }
            debug!(?id, "generator stopped");
        }
    }

    fn play_tone(&mut self, tone: ToneEvent) -> Result<(), AudioError> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        trace!(kind = ?tone.kind, frequency = tone.base_frequency, "tone queued");
        self.voices.send(VoiceMessage::Play(tone)).map_err(|rejected| {
            let kind = match rejected {
                VoiceMessage::Play(tone) => Some(tone.kind),
                _ => None,
            };
            warn!(?kind, "voice queue full, tone dropped");
            AudioError::GraphConstruction("voice queue is full".into())
        })
    }

    fn set_voice_limit(&mut self, voices: usize) {
        if self.voices.send(VoiceMessage::SetLimit(voices)).is_err() {
            warn!(voices, "voice queue full, voice limit not applied");
        }
    }

    fn advance(&mut self, dt: f64) {
        if self.state != ContextState::Running || !(dt > 0.0) {
            return;
        }

        let block_seconds = self.graph.context().block_seconds();
        self.pending_seconds += dt;
        if self.pending_seconds > MAX_CATCH_UP_SECONDS {
            trace!(behind = self.pending_seconds, "render fell behind, skipping ahead");
            self.pending_seconds = MAX_CATCH_UP_SECONDS;
        }

        while self.pending_seconds + BLOCK_EPSILON >= block_seconds {
            self.process();
            self.pending_seconds -= block_seconds;
        }
    }
}
