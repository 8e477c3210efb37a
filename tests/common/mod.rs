//! A recording platform for driving the engine without audio.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ambiance::{
    AmbientEngine, AudioContext, AudioError, AudioPlatform, ContextState, EngineConfig, GeneratorId,
    GeneratorSpec, ToneEvent, ToneKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything the engine asked the platform to do.
#[derive(Default, Debug)]
pub struct Recording {
    pub contexts_created: usize,
    pub generators_started: Vec<GeneratorSpec>,
    pub generators_stopped: Vec<GeneratorId>,
    pub tones: Vec<ToneEvent>,
    pub resumes: usize,
    pub suspends: usize,
    pub closes: usize,
    pub time_advanced: f64,
    pub voice_limit: Option<usize>,
}

impl Recording {
    pub fn tones_of(&self, kind: ToneKind) -> usize {
        self.tones.iter().filter(|t| t.kind == kind).count()
    }

    pub fn ambient_tones(&self) -> usize {
        self.tones_of(ToneKind::Ghost) + self.tones_of(ToneKind::Arcade)
    }
}

pub type Shared = Rc<RefCell<Recording>>;

pub struct RecordingContext {
    state: ContextState,
    recording: Shared,
    resume_failure: Option<AudioError>,
    generator_failure: Option<AudioError>,
    next_generator: u32,
}

impl AudioContext for RecordingContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn current_time(&self) -> f64 {
        self.recording.borrow().time_advanced
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        if let Some(err) = self.resume_failure.clone() {
            return Err(err);
        }
        self.recording.borrow_mut().resumes += 1;
        self.state = ContextState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        self.recording.borrow_mut().suspends += 1;
        self.state = ContextState::Suspended;
        Ok(())
    }

    fn close(&mut self) {
        if self.state != ContextState::Closed {
            self.recording.borrow_mut().closes += 1;
            self.state = ContextState::Closed;
        }
    }

    fn start_generator(&mut self, spec: GeneratorSpec) -> Result<GeneratorId, AudioError> {
        if let Some(err) = self.generator_failure.clone() {
            return Err(err);
        }
        self.recording.borrow_mut().generators_started.push(spec);
        let id = GeneratorId(self.next_generator);
        self.next_generator += 1;
        Ok(id)
    }

    fn stop_generator(&mut self, id: GeneratorId) {
        self.recording.borrow_mut().generators_stopped.push(id);
    }

    fn set_voice_limit(&mut self, voices: usize) {
        self.recording.borrow_mut().voice_limit = Some(voices);
    }

    fn play_tone(&mut self, tone: ToneEvent) -> Result<(), AudioError> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        self.recording.borrow_mut().tones.push(tone);
        Ok(())
    }

    fn advance(&mut self, dt: f64) {
        if self.state == ContextState::Running {
            self.recording.borrow_mut().time_advanced += dt;
        }
    }
}

/// Hands out [`RecordingContext`]s, failing in scripted ways.
#[derive(Default)]
pub struct RecordingPlatform {
    pub recording: Shared,
    /// Failures returned by the next `create_context` calls, in order
    pub create_failures: VecDeque<AudioError>,
    /// New contexts start suspended, like an autoplay-restricted browser
    pub start_suspended: bool,
    pub resume_failure: Option<AudioError>,
    pub generator_failure: Option<AudioError>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(errors: impl IntoIterator<Item = AudioError>) -> Self {
        Self {
            create_failures: errors.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl AudioPlatform for RecordingPlatform {
    type Context = RecordingContext;

    fn create_context(&mut self) -> Result<RecordingContext, AudioError> {
        if let Some(err) = self.create_failures.pop_front() {
            return Err(err);
        }
        self.recording.borrow_mut().contexts_created += 1;

        let state = if self.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Ok(RecordingContext {
            state,
            recording: self.recording.clone(),
            resume_failure: self.resume_failure.clone(),
            generator_failure: self.generator_failure.clone(),
            next_generator: 0,
        })
    }
}

pub type TestEngine = AmbientEngine<RecordingPlatform, StdRng>;

pub fn engine_with(platform: RecordingPlatform, config: EngineConfig) -> (TestEngine, Shared) {
    let recording = platform.recording.clone();
    let engine = AmbientEngine::with_rng(platform, config, StdRng::seed_from_u64(0x5eed));
    (engine, recording)
}

pub fn engine() -> (TestEngine, Shared) {
    engine_with(RecordingPlatform::new(), EngineConfig::default())
}

/// Call `update` every `step` seconds from `from` up to and including `to`.
pub fn run(engine: &mut TestEngine, from: f64, to: f64, step: f64) {
    let mut t = from;
    while t <= to + 1e-9 {
        engine.update(t);
        t += step;
    }
}
