//! The ambient audio session state machine.
//!
//! ```text
//!                 initialize / gesture
//!  Uninitialized ──────────────────────> Running <───┐
//!        │                                 │         │ toggle / initialize
//!        │                          toggle │         │
//!        │                                 v         │
//!        │                             Suspended ────┘
//!        │ teardown                        │
//!        └────────────> Closed <───────────┘ teardown (from any state)
//! ```
//!
//! [`AmbientEngine`] owns at most one session (a context plus its hum
//! generator) and the single pending ambient firing. It never sleeps or
//! spawns: the host drives it with [`AmbientEngine::update`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, trace, warn};

use crate::config::EngineConfig;
use crate::error::AudioError;
use crate::mix::Channel;
use crate::platform::{AudioContext, AudioPlatform, ContextState, GeneratorId, GeneratorSpec};
use crate::scheduler::{Scheduler, TaskHandle};

/// Seconds the footer animation runs between rests.
const ROO_ACTIVE_MIN: f64 = 3.0;
const ROO_ACTIVE_MAX: f64 = 8.0;
/// Seconds each rest lasts.
const ROO_REST: f64 = 3.0;

/// Where the engine is in its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No context yet. The next gesture tries to create one.
    Uninitialized,
    /// Hum playing, ambient loop scheduled.
    Running,
    /// Context suspended by the toggle. The hum is kept, the loop is cancelled.
    Suspended,
    /// Torn down for good.
    Closed,
}

/// On-demand feedback tones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscreteEvent {
    /// Short, high, filtered sine.
    Ping,
    /// Fast descending square.
    Blip,
    /// Low sine thump, once per loop of the footer animation. Silent during
    /// the animation's rest periods.
    Roo,
}

/// User interactions that may unlock audio output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// A click or tap. `on_hero` marks the hero region, which also blips.
    PointerDown { on_hero: bool },
    TouchStart,
    KeyDown,
    Scroll,
}

/// Things the pointer can hover that give audible feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoverTarget {
    NavItem,
    ListEntry,
    HeroImage,
}

impl HoverTarget {
    pub fn event(self) -> DiscreteEvent {
        match self {
            HoverTarget::NavItem | HoverTarget::ListEntry => DiscreteEvent::Ping,
            HoverTarget::HeroImage => DiscreteEvent::Blip,
        }
    }
}

struct Session<C> {
    context: C,
    hum: GeneratorId,
}

/// Background hum, randomized ambient tones and feedback tones behind one
/// on/off toggle.
///
/// # Example
///
/// ```
/// use ambiance::{AmbientEngine, EngineConfig, Gesture, OfflinePlatform, SessionState};
///
/// let mut engine = AmbientEngine::new(OfflinePlatform::new(48_000), EngineConfig::default());
/// assert_eq!(engine.state(), SessionState::Uninitialized);
///
/// engine.handle_gesture(Gesture::PointerDown { on_hero: false });
/// assert!(engine.is_on());
///
/// assert!(!engine.toggle());
/// assert_eq!(engine.state(), SessionState::Suspended);
///
/// engine.teardown();
/// assert_eq!(engine.state(), SessionState::Closed);
/// ```
pub struct AmbientEngine<P: AudioPlatform, R: Rng = StdRng> {
    platform: P,
    config: EngineConfig,
    rng: R,

    session: Option<Session<P::Context>>,
    state: SessionState,

    scheduler: Scheduler,
    loop_task: Option<TaskHandle>,
    /// Flips `roo_resting` on and off
    roo_gate: Scheduler,
    roo_resting: bool,
    /// Host time of the last `update`, in seconds
    now: f64,

    visible: bool,
    /// Set once the platform reports it cannot synthesize at all
    unsupported: bool,
    last_error: Option<AudioError>,
}

impl<P: AudioPlatform> AmbientEngine<P, StdRng> {
    /// Create an engine with an entropy-seeded random source.
    ///
    /// Nothing touches the platform until the first [`initialize`](Self::initialize).
    pub fn new(platform: P, config: EngineConfig) -> Self {
        Self::with_rng(platform, config, StdRng::from_entropy())
    }
}

impl<P: AudioPlatform, R: Rng> AmbientEngine<P, R> {
    /// Create an engine drawing its randomness from `rng`.
    ///
    /// An invalid config is kept but never allowed to panic: a broken
    /// schedule window falls back to the default one.
    pub fn with_rng(platform: P, config: EngineConfig, mut rng: R) -> Self {
        if let Err(err) = config.validate() {
            warn!(error = %err, "engine config failed validation");
        }

        let mut roo_gate = Scheduler::new();
        roo_gate.schedule(0.0, rng.gen_range(ROO_ACTIVE_MIN..=ROO_ACTIVE_MAX));

        Self {
            platform,
            config,
            rng,
            session: None,
            state: SessionState::Uninitialized,
            scheduler: Scheduler::new(),
            loop_task: None,
            roo_gate,
            roo_resting: false,
            now: 0.0,
            visible: true,
            unsupported: false,
            last_error: None,
        }
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the toggle should show "on".
    #[inline]
    pub fn is_on(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The live context, if a session exists.
    pub fn context(&self) -> Option<&P::Context> {
        self.session.as_ref().map(|s| &s.context)
    }

    pub fn hum(&self) -> Option<GeneratorId> {
        self.session.as_ref().map(|s| s.hum)
    }

    /// The last failure that left the engine off. Autoplay refusals are not
    /// recorded.
    pub fn last_error(&self) -> Option<&AudioError> {
        self.last_error.as_ref()
    }

    /// Host time at which the next ambient tone fires, if one is scheduled.
    pub fn next_ambient_due(&self) -> Option<f64> {
        self.scheduler.next_due()
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the footer animation is resting, which mutes the roo.
    #[inline]
    pub fn is_roo_resting(&self) -> bool {
        self.roo_resting
    }

    /// Bring audio up: create the session, or resume a suspended one.
    ///
    /// Idempotent. A running engine keeps its session (and its single hum).
    /// When the platform wants a gesture first, the engine quietly stays
    /// [`Uninitialized`](SessionState::Uninitialized) and the next call
    /// tries again.
    pub fn initialize(&mut self) -> SessionState {
        match self.state {
            SessionState::Running => {}
            SessionState::Closed => trace!("initialize after teardown ignored"),
            SessionState::Suspended => self.resume_session(),
            SessionState::Uninitialized => {
                if self.unsupported {
                    trace!("audio unsupported on this platform, not retrying");
                } else {
                    self.start_session();
                }
            }
        }
        self.state
    }

    /// Flip audio on or off. Returns the resulting on-state.
    pub fn toggle(&mut self) -> bool {
        match self.state {
            SessionState::Running => {
                self.suspend_session();
                false
            }
            SessionState::Suspended | SessionState::Uninitialized => {
                self.initialize() == SessionState::Running
            }
            SessionState::Closed => false,
        }
    }

    /// Stop the hum, release the context and close the engine for good.
    ///
    /// Safe to call at any point, any number of times. Tones already playing
    /// are cut when the context closes.
    pub fn teardown(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.stop_loop();
        self.roo_gate.cancel_all();

        if let Some(mut session) = self.session.take() {
            session.context.stop_generator(session.hum);
            session.context.close();
        }
        self.state = SessionState::Closed;
        info!("ambient audio torn down");
    }

    /// Play a feedback tone. Does nothing unless running.
    pub fn play_discrete_event(&mut self, kind: DiscreteEvent) -> bool {
        if self.state != SessionState::Running {
            trace!(?kind, "discrete event ignored while not running");
            return false;
        }
        if kind == DiscreteEvent::Roo && self.roo_resting {
            trace!("roo muted while the footer rests");
            return false;
        }

        let tone = match kind {
            DiscreteEvent::Ping => self.config.palette.ping(&mut self.rng, &self.config.mix),
            DiscreteEvent::Blip => self.config.palette.blip(&self.config.mix),
            DiscreteEvent::Roo => self.config.palette.roo(&self.config.mix),
        };

        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return false,
        };
        match session.context.play_tone(tone) {
            Ok(()) => true,
            Err(err) => {
                warn!(?kind, error = %err, "failed to play feedback tone");
                false
            }
        }
    }

    pub fn ping(&mut self) -> bool {
        self.play_discrete_event(DiscreteEvent::Ping)
    }

    pub fn blip(&mut self) -> bool {
        self.play_discrete_event(DiscreteEvent::Blip)
    }

    /// One loop of the footer animation.
    pub fn roo(&mut self) -> bool {
        self.play_discrete_event(DiscreteEvent::Roo)
    }

    /// Feedback for the pointer entering `target`.
    pub fn hover(&mut self, target: HoverTarget) -> bool {
        self.play_discrete_event(target.event())
    }

    /// Every qualifying gesture initializes audio. A pointer-down on the hero
    /// region also blips once audio is up.
    pub fn handle_gesture(&mut self, gesture: Gesture) -> SessionState {
        let state = self.initialize();
        if let Gesture::PointerDown { on_hero: true } = gesture {
            self.blip();
        }
        state
    }

    /// Record whether the host is visible. Only matters with
    /// `suppress_when_hidden` set.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            debug!(visible, "visibility changed");
        }
        self.visible = visible;
    }

    /// Advance to host time `now` (seconds, monotonic): let the context render
    /// and fire the ambient loop if it is due.
    pub fn update(&mut self, now: f64) {
        let dt = now - self.now;
        if dt > 0.0 {
            self.now = now;
            if let Some(session) = self.session.as_mut() {
                session.context.advance(dt);
            }
        }

        if let Some(handle) = self.scheduler.take_due(self.now) {
            self.fire(handle);
        }
        if self.roo_gate.take_due(self.now).is_some() {
            self.flip_roo_rest();
        }
    }

    fn start_session(&mut self) {
        let mut context = match self.platform.create_context() {
            Ok(context) => context,
            Err(err) => return self.fail(err),
        };

        if context.state() == ContextState::Suspended {
            if let Err(err) = context.resume() {
                context.close();
                return self.fail(err);
            }
        }

        context.set_voice_limit(self.config.voice_limit.max(1));

        let spec = GeneratorSpec {
            waveform: self.config.hum.waveform,
            frequency: self.config.hum.frequency,
            gain: self.config.mix.level(Channel::Hum),
        };
        let hum = match context.start_generator(spec) {
            Ok(id) => id,
            Err(err) => {
                context.close();
                return self.fail(err);
            }
        };

        self.session = Some(Session { context, hum });
        self.state = SessionState::Running;
        self.last_error = None;
        info!(hum = ?spec, "ambient audio started");

        self.start_loop();
    }

    fn resume_session(&mut self) {
        let result = match self.session.as_mut() {
            Some(session) => session.context.resume(),
            None => Err(AudioError::Closed),
        };

        match result {
            Ok(()) => {
                self.state = SessionState::Running;
                info!("ambient audio resumed");
                self.start_loop();
            }
            Err(AudioError::Closed) => {
                // the context went away underneath us; build a fresh one
                debug!("suspended context is closed, starting a new session");
                self.session = None;
                self.state = SessionState::Uninitialized;
                self.start_session();
            }
            Err(err) => self.fail(err),
        }
    }

    fn suspend_session(&mut self) {
        self.stop_loop();
        if let Some(session) = self.session.as_mut() {
            if let Err(err) = session.context.suspend() {
                warn!(error = %err, "failed to suspend context");
            }
        }
        self.state = SessionState::Suspended;
        info!("ambient audio suspended");
    }

    fn fail(&mut self, err: AudioError) {
        match &err {
            AudioError::PolicyBlocked => {
                debug!("audio output blocked, waiting for the next gesture");
                return;
            }
            AudioError::UnsupportedPlatform(reason) => {
                warn!(%reason, "audio synthesis unavailable, leaving audio off");
                self.unsupported = true;
            }
            AudioError::GraphConstruction(_) | AudioError::Closed => {
                error!(error = %err, "failed to start ambient audio");
            }
        }
        self.last_error = Some(err);
    }

    fn start_loop(&mut self) {
        self.loop_task = Some(self.scheduler.schedule(self.now, 0.0));
    }

    fn stop_loop(&mut self) {
        if let Some(handle) = self.loop_task.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn fire(&mut self, handle: TaskHandle) {
        if self.loop_task != Some(handle) {
            trace!(?handle, "stale ambient firing dropped");
            return;
        }
        self.loop_task = None;

        let context_running = self
            .session
            .as_ref()
            .map_or(false, |s| s.context.state() == ContextState::Running);
        if self.state != SessionState::Running || !context_running {
            trace!("ambient firing while not running, loop stops");
            return;
        }

        if self.config.suppress_when_hidden && !self.visible {
            trace!("ambient tone skipped while hidden");
        } else {
            self.play_ambient();
        }

        let delay = self.config.schedule.next_delay(&mut self.rng);
        self.loop_task = Some(self.scheduler.schedule(self.now, delay));
    }

    fn flip_roo_rest(&mut self) {
        self.roo_resting = !self.roo_resting;
        let next = if self.roo_resting {
            ROO_REST
        } else {
            self.rng.gen_range(ROO_ACTIVE_MIN..=ROO_ACTIVE_MAX)
        };
        trace!(resting = self.roo_resting, next, "footer animation gate");
        self.roo_gate.schedule(self.now, next);
    }

    fn play_ambient(&mut self) {
        let tone = match self.config.palette.next_ambient(
            &mut self.rng,
            self.config.ghost_probability,
            &self.config.mix,
        ) {
            Some(tone) => tone,
            None => {
                warn!("empty ambient palette, nothing to play");
                return;
            }
        };

        if let Some(session) = self.session.as_mut() {
            trace!(kind = ?tone.kind, frequency = tone.base_frequency, "ambient tone");
            if let Err(err) = session.context.play_tone(tone) {
                warn!(error = %err, "failed to play ambient tone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::{ToneEvent, ToneKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        contexts: usize,
        generators: Vec<GeneratorSpec>,
        stopped: Vec<GeneratorId>,
        tones: Vec<ToneEvent>,
        closed: usize,
        voice_limit: Option<usize>,
    }

    struct FakeContext {
        state: ContextState,
        log: Rc<RefCell<Log>>,
    }

    impl AudioContext for FakeContext {
        fn state(&self) -> ContextState {
            self.state
        }

        fn current_time(&self) -> f64 {
            0.0
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            self.state = ContextState::Running;
            Ok(())
        }

        fn suspend(&mut self) -> Result<(), AudioError> {
            self.state = ContextState::Suspended;
            Ok(())
        }

        fn close(&mut self) {
            self.state = ContextState::Closed;
            self.log.borrow_mut().closed += 1;
        }

        fn start_generator(&mut self, spec: GeneratorSpec) -> Result<GeneratorId, AudioError> {
            let mut log = self.log.borrow_mut();
            log.generators.push(spec);
            Ok(GeneratorId(log.generators.len() as u32 - 1))
        }

        fn stop_generator(&mut self, id: GeneratorId) {
            self.log.borrow_mut().stopped.push(id);
        }

        fn play_tone(&mut self, tone: ToneEvent) -> Result<(), AudioError> {
            self.log.borrow_mut().tones.push(tone);
            Ok(())
        }

        fn set_voice_limit(&mut self, voices: usize) {
            self.log.borrow_mut().voice_limit = Some(voices);
        }
    }

    struct FakePlatform {
        log: Rc<RefCell<Log>>,
        failure: Option<AudioError>,
    }

    impl AudioPlatform for FakePlatform {
        type Context = FakeContext;

        fn create_context(&mut self) -> Result<FakeContext, AudioError> {
            if let Some(err) = self.failure.clone() {
                return Err(err);
            }
            self.log.borrow_mut().contexts += 1;
            Ok(FakeContext {
                state: ContextState::Running,
                log: self.log.clone(),
            })
        }
    }

    fn fake_engine(failure: Option<AudioError>) -> (AmbientEngine<FakePlatform>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let platform = FakePlatform {
            log: log.clone(),
            failure,
        };
        let engine = AmbientEngine::with_rng(platform, EngineConfig::default(), StdRng::seed_from_u64(7));
        (engine, log)
    }

    #[test]
    fn first_ambient_tone_is_immediate() {
        let (mut engine, log) = fake_engine(None);
        engine.initialize();
        assert_eq!(engine.next_ambient_due(), Some(0.0));

        engine.update(0.0);
        assert_eq!(log.borrow().tones.len(), 1);

        let due = engine.next_ambient_due().unwrap();
        assert!((1.0..=1.5).contains(&due), "next firing at {}", due);
    }

    #[test]
    fn loop_keeps_firing_inside_the_window() {
        let (mut engine, log) = fake_engine(None);
        engine.initialize();

        let mut t = 0.0;
        while t < 30.0 {
            engine.update(t);
            t += 0.05;
        }
        let fired = log.borrow().tones.len();
        // one immediate firing, then one every 1.0..=1.5 s
        assert!((18..=32).contains(&fired), "fired {} times", fired);
        assert!(log
            .borrow()
            .tones
            .iter()
            .all(|t| matches!(t.kind, ToneKind::Ghost | ToneKind::Arcade)));
    }

    #[test]
    fn hum_uses_configured_level() {
        let (mut engine, log) = fake_engine(None);
        engine.initialize();

        let log = log.borrow();
        assert_eq!(log.generators.len(), 1);
        assert_eq!(log.generators[0].frequency, 60.0);
        assert!((log.generators[0].gain - 0.003).abs() < 1e-7);
    }

    #[test]
    fn policy_block_retries_on_next_gesture() {
        let (mut engine, log) = fake_engine(Some(AudioError::PolicyBlocked));
        assert_eq!(engine.handle_gesture(Gesture::Scroll), SessionState::Uninitialized);
        assert!(engine.last_error().is_none());

        engine.platform_mut().failure = None;
        assert_eq!(engine.handle_gesture(Gesture::TouchStart), SessionState::Running);
        assert_eq!(log.borrow().contexts, 1);
    }

    #[test]
    fn unsupported_platform_is_not_retried() {
        let (mut engine, log) = fake_engine(Some(AudioError::UnsupportedPlatform("no output".into())));
        assert!(!engine.toggle());

        engine.platform_mut().failure = None;
        assert!(!engine.toggle());
        assert_eq!(log.borrow().contexts, 0);
        assert!(matches!(engine.last_error(), Some(AudioError::UnsupportedPlatform(_))));
    }

    #[test]
    fn graph_failure_allows_retry() {
        let (mut engine, _log) = fake_engine(Some(AudioError::GraphConstruction("boom".into())));
        assert!(!engine.toggle());
        assert!(engine.last_error().is_some());

        engine.platform_mut().failure = None;
        assert!(engine.toggle());
        assert!(engine.last_error().is_none());
    }

    #[test]
    fn hidden_engine_skips_but_keeps_scheduling() {
        let log = Rc::new(RefCell::new(Log::default()));
        let platform = FakePlatform {
            log: log.clone(),
            failure: None,
        };
        let config = EngineConfig::default().with_suppress_when_hidden(true);
        let mut engine = AmbientEngine::with_rng(platform, config, StdRng::seed_from_u64(1));

        engine.initialize();
        engine.set_visible(false);
        engine.update(0.0);
        assert!(log.borrow().tones.is_empty());
        assert!(engine.next_ambient_due().is_some());

        engine.set_visible(true);
        engine.update(2.0);
        assert_eq!(log.borrow().tones.len(), 1);
    }

    #[test]
    fn hidden_engine_plays_by_default() {
        let (mut engine, log) = fake_engine(None);
        engine.initialize();
        engine.set_visible(false);
        engine.update(0.0);
        assert_eq!(log.borrow().tones.len(), 1);
    }

    #[test]
    fn resume_restarts_the_loop() {
        let (mut engine, log) = fake_engine(None);
        engine.initialize();
        engine.update(0.0);
        assert!(!engine.toggle());
        assert_eq!(engine.next_ambient_due(), None);

        engine.update(5.0);
        assert!(engine.toggle());
        assert_eq!(engine.next_ambient_due(), Some(5.0));
        engine.update(5.0);
        assert_eq!(log.borrow().tones.len(), 2);
        assert_eq!(log.borrow().generators.len(), 1, "hum survives suspension");
    }

    #[test]
    fn session_gets_configured_voice_limit() {
        let log = Rc::new(RefCell::new(Log::default()));
        let platform = FakePlatform {
            log: log.clone(),
            failure: None,
        };
        let config = EngineConfig {
            voice_limit: 3,
            ..EngineConfig::default()
        };
        let mut engine = AmbientEngine::with_rng(platform, config, StdRng::seed_from_u64(2));
        engine.initialize();
        assert_eq!(log.borrow().voice_limit, Some(3));
    }

    #[test]
    fn broken_schedule_window_never_panics() {
        for config in vec![
            EngineConfig::default().with_schedule(1.0, f64::INFINITY),
            EngineConfig::default().with_schedule(f64::NAN, 1.5),
        ] {
            let log = Rc::new(RefCell::new(Log::default()));
            let platform = FakePlatform {
                log: log.clone(),
                failure: None,
            };
            let mut engine = AmbientEngine::with_rng(platform, config, StdRng::seed_from_u64(4));
            engine.initialize();
            engine.update(0.0);

            let due = engine.next_ambient_due().unwrap();
            assert!((1.0..=1.5).contains(&due), "fell back to {}", due);
            engine.update(due);
            assert_eq!(log.borrow().tones.len(), 2);
        }
    }

    #[test]
    fn roo_rests_between_animation_runs() {
        let (mut engine, log) = fake_engine(None);
        engine.initialize();
        assert!(!engine.is_roo_resting());
        assert!(engine.roo());

        // the first rest starts somewhere in 3..=8 s and lasts 3 s
        let mut t = 0.0;
        while !engine.is_roo_resting() {
            t += 0.1;
            engine.update(t);
            assert!(t <= 8.1, "no rest by {}", t);
        }
        let rest_start = t;
        assert!(!engine.roo());

        while engine.is_roo_resting() {
            t += 0.1;
            engine.update(t);
        }
        assert!((t - rest_start - 3.0).abs() < 0.15, "rested {} s", t - rest_start);
        assert!(engine.roo());

        let roos = log.borrow().tones.iter().filter(|t| t.kind == ToneKind::Roo).count();
        assert_eq!(roos, 2);
    }

    #[test]
    fn roo_is_silent_unless_running() {
        let (mut engine, log) = fake_engine(None);
        assert!(!engine.roo());
        engine.initialize();
        engine.toggle();
        assert!(!engine.roo());
        assert!(log.borrow().tones.is_empty());
    }

    #[test]
    fn hero_pointer_down_blips() {
        let (mut engine, log) = fake_engine(None);
        engine.handle_gesture(Gesture::PointerDown { on_hero: true });
        engine.handle_gesture(Gesture::PointerDown { on_hero: false });

        let log = log.borrow();
        assert_eq!(log.tones.len(), 1);
        assert_eq!(log.tones[0].kind, ToneKind::Blip);
    }

    #[test]
    fn hover_targets_map_to_events() {
        let (mut engine, log) = fake_engine(None);
        assert!(!engine.hover(HoverTarget::NavItem));

        engine.initialize();
        assert!(engine.hover(HoverTarget::NavItem));
        assert!(engine.hover(HoverTarget::ListEntry));
        assert!(engine.hover(HoverTarget::HeroImage));

        let kinds: Vec<_> = log.borrow().tones.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToneKind::Ping, ToneKind::Ping, ToneKind::Blip]);
    }

    #[test]
    fn teardown_is_idempotent_and_final() {
        let (mut engine, log) = fake_engine(None);
        engine.teardown();
        assert_eq!(engine.state(), SessionState::Closed);
        assert_eq!(engine.initialize(), SessionState::Closed);
        assert_eq!(log.borrow().contexts, 0);

        let (mut engine, log) = fake_engine(None);
        engine.initialize();
        engine.teardown();
        engine.teardown();
        assert_eq!(log.borrow().closed, 1);
        assert_eq!(log.borrow().stopped, vec![GeneratorId(0)]);
        assert!(engine.context().is_none());
    }
}
