//! CPAL audio output sink

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error};

use crate::error::AudioError;
use crate::node::{AudioNode, ProcessContext};

/// A sink that outputs audio to a CPAL device
///
/// The CPAL stream runs on its own thread; this node feeds samples into a
/// ring buffer that the stream consumes. The stream stops when the sink is
/// dropped, which is how closing a context releases the device.
pub struct CpalSink {
    buffer: Producer<f32>,
    channels: usize,
    /// Tracks how many samples CPAL has consumed
    samples_consumed: Arc<AtomicUsize>,
    /// Tracks underrun state for diagnostics
    had_underrun: Arc<AtomicBool>,
    // Dropping this wakes the stream thread, which then drops the stream.
    _shutdown: SyncSender<()>,
}

impl CpalSink {
    /// Build and start a stream on `device`.
    ///
    /// Blocks until the stream thread reports whether the stream is playing.
    /// A refusal to play maps to [`AudioError::PolicyBlocked`]: on the web
    /// this is the autoplay policy, and a later attempt from a gesture
    /// handler succeeds.
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Result<Self, AudioError> {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;

        // ~100ms of audio to absorb scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let samples_consumed = Arc::new(AtomicUsize::new(0));
        let had_underrun = Arc::new(AtomicBool::new(false));

        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), AudioError>>(1);
        let (shutdown_tx, shutdown_rx) = mpsc::sync_channel::<()>(1);

        let device = device.clone();
        let stream_consumed = samples_consumed.clone();
        let stream_underrun = had_underrun.clone();
        std::thread::Builder::new()
            .name("ambiance-output".into())
            .spawn(move || {
                let stream = match build_stream(
                    &device,
                    sample_format,
                    &stream_config,
                    consumer,
                    stream_consumed,
                    stream_underrun,
                ) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(play_error(e)));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // returns once the sink (and its sender) is dropped
                let _ = shutdown_rx.recv();
                debug!("output stream released");
            })
            .map_err(|e| AudioError::GraphConstruction(format!("failed to spawn output thread: {}", e)))?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::GraphConstruction("output thread exited early".into()))??;

        Ok(Self {
            buffer: producer,
            channels,
            samples_consumed,
            had_underrun,
            _shutdown: shutdown_tx,
        })
    }

    /// Returns how many samples have been played
    #[inline]
    pub fn samples_consumed(&self) -> usize {
        self.samples_consumed.load(Ordering::Relaxed)
    }

    /// Returns available space in the buffer (in samples)
    #[inline]
    pub fn buffer_available(&self) -> usize {
        self.buffer.slots()
    }

    /// Check and clear the underrun flag
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }
}

fn build_error(e: cpal::BuildStreamError) -> AudioError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => {
            AudioError::UnsupportedPlatform("output device is not available".into())
        }
        other => AudioError::GraphConstruction(other.to_string()),
    }
}

fn play_error(e: cpal::PlayStreamError) -> AudioError {
    match e {
        cpal::PlayStreamError::DeviceNotAvailable => {
            AudioError::UnsupportedPlatform("output device is not available".into())
        }
        other => {
            debug!(error = %other, "output stream refused to play");
            AudioError::PolicyBlocked
        }
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &cpal::StreamConfig,
    consumer: Consumer<f32>,
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
) -> Result<cpal::Stream, AudioError> {
    match sample_format {
        SampleFormat::F32 => build_typed::<f32>(device, stream_config, consumer, samples_consumed, had_underrun),
        SampleFormat::I16 => build_typed::<i16>(device, stream_config, consumer, samples_consumed, had_underrun),
        SampleFormat::U16 => build_typed::<u16>(device, stream_config, consumer, samples_consumed, had_underrun),
        other => Err(AudioError::GraphConstruction(format!(
            "unsupported sample format: {:?}",
            other
        ))),
    }
}

fn build_typed<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    device
        .build_output_stream(
            stream_config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut underrun = false;
                for sample in data.iter_mut() {
                    let s = consumer.pop().unwrap_or_else(|_| {
                        underrun = true;
                        0.0
                    });
                    *sample = T::from_sample(s.clamp(-1.0, 1.0));
                }
                if underrun {
                    had_underrun.store(true, Ordering::Relaxed);
                }
                samples_consumed.fetch_add(data.len(), Ordering::Relaxed);
            },
            |err| error!(error = %err, "output stream error"),
            None,
        )
        .map_err(build_error)
}

impl AudioNode for CpalSink {
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

        // generating faster than the device plays: skip rather than tear a block
        if self.buffer.slots() < samples_needed {
            return;
        }

        // Interleave channels, duplicating mono to every device channel
        for i in 0..buffer_len {
            for ch in 0..self.channels {
                let src_ch = ch.min(buffers.len() - 1);
                let _ = self.buffer.push(buffers[src_ch][i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
