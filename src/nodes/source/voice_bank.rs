//! Polyphonic renderer for self-terminating tones

use alloc::vec::Vec;

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::nodes::effect::Biquad;
use crate::tone::ToneEvent;

/// Messages to control a [`VoiceBank`]
#[derive(Clone, Debug)]
pub enum VoiceMessage {
    /// Start a tone at the beginning of the next block.
    Play(ToneEvent),
    /// Cut every sounding tone immediately.
    Silence,
    /// Change the voice limit. Excess voices are dropped oldest first.
    SetLimit(usize),
}

struct Voice {
    tone: ToneEvent,
    /// Samples rendered so far
    elapsed: u64,
    /// Sample count at which the tone stops
    end: u64,
    phase: f32,
    filter: Option<Biquad>,
}

impl Voice {
    fn new(tone: ToneEvent, sample_rate: u32) -> Self {
        let end = (tone.duration.max(0.0) * sample_rate as f64).round() as u64;
        let filter = tone
            .highpass
            .map(|cutoff| Biquad::highpass(cutoff, 1.0, sample_rate));
        Self {
            tone,
            elapsed: 0,
            end,
            phase: 0.0,
            filter,
        }
    }

    #[inline]
    fn finished(&self) -> bool {
        self.elapsed >= self.end
    }

    /// Mix this voice into `out`. Stops writing once the tone has ended.
    fn render(&mut self, out: &mut [f32], sample_rate: u32) {
        let rate = sample_rate as f64;
        for sample in out.iter_mut() {
            if self.finished() {
                break;
            }
            let t = self.elapsed as f64 / rate;
            let frequency = self.tone.frequency_at(t);
            let gain = self.tone.gain_at(t);

            let mut s = self.tone.waveform.sample(self.phase);
            if let Some(filter) = self.filter.as_mut() {
                s = filter.process(s);
            }
            *sample += s * gain;

            self.phase += frequency / sample_rate as f32;
            self.phase -= self.phase.floor();
            self.elapsed += 1;
        }
    }
}

/// Renders any number of [`ToneEvent`]s, up to a fixed voice limit, summed
/// into one mono output.
///
/// Each tone runs its waveform through its frequency automation, an optional
/// highpass, and its gain automation. A tone is dropped as soon as its
/// duration has elapsed, so nothing needs to stop it from the outside. When
/// the bank is full the oldest tone makes room for the new one.
pub struct VoiceBank {
    voices: Vec<Voice>,
    limit: usize,
    started: u64,
}

impl VoiceBank {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            voices: Vec::with_capacity(limit),
            limit,
            started: 0,
        }
    }

    /// Number of tones currently sounding.
    #[inline]
    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Total number of tones ever started.
    #[inline]
    pub fn started(&self) -> u64 {
        self.started
    }

    fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        let excess = self.voices.len().saturating_sub(self.limit);
        self.voices.drain(..excess);
    }

    fn start(&mut self, tone: ToneEvent, sample_rate: u32) {
        if self.voices.len() >= self.limit {
            self.voices.remove(0);
        }
        self.voices.push(Voice::new(tone, sample_rate));
        self.started += 1;
    }
}

impl AudioNode for VoiceBank {
    type Message = VoiceMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = VoiceMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                VoiceMessage::Play(tone) => self.start(tone, ctx.sample_rate),
                VoiceMessage::Silence => self.voices.clear(),
                VoiceMessage::SetLimit(limit) => self.set_limit(limit),
            }
        }

        let (first, rest) = match outputs.split_first_mut() {
            Some(split) => split,
            None => return,
        };

        first.silence();
        for voice in self.voices.iter_mut() {
            voice.render(first, ctx.sample_rate);
        }
        self.voices.retain(|v| !v.finished());

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
