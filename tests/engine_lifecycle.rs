mod common;

use ambiance::{
    AudioContext, AudioError, ContextState, DiscreteEvent, EngineConfig, Gesture, HoverTarget, MixLevels,
    SessionState, ToneKind, Waveform,
};
use common::{engine, engine_with, run, RecordingPlatform};

#[test]
fn initialize_twice_starts_one_hum() {
    let (mut engine, rec) = engine();
    assert_eq!(engine.initialize(), SessionState::Running);
    assert_eq!(engine.initialize(), SessionState::Running);

    let rec = rec.borrow();
    assert_eq!(rec.contexts_created, 1);
    assert_eq!(rec.generators_started.len(), 1);

    let hum = rec.generators_started[0];
    assert_eq!(hum.waveform, Waveform::Sawtooth);
    assert_eq!(hum.frequency, 60.0);
}

#[test]
fn toggle_round_trip() {
    let (mut engine, rec) = engine();
    engine.initialize();

    assert!(!engine.toggle());
    assert_eq!(engine.state(), SessionState::Suspended);
    assert_eq!(engine.context().unwrap().state(), ContextState::Suspended);

    assert!(engine.toggle());
    assert_eq!(engine.state(), SessionState::Running);
    assert_eq!(rec.borrow().generators_started.len(), 1);
    assert_eq!(rec.borrow().contexts_created, 1);
}

#[test]
fn toggle_from_uninitialized_turns_on() {
    let (mut engine, rec) = engine();
    assert!(engine.toggle());
    assert!(engine.is_on());
    assert_eq!(rec.borrow().generators_started.len(), 1);
}

#[test]
fn no_discrete_events_after_teardown() {
    let (mut engine, rec) = engine();
    engine.initialize();
    engine.teardown();

    assert!(!engine.play_discrete_event(DiscreteEvent::Ping));
    assert!(!engine.play_discrete_event(DiscreteEvent::Blip));
    assert!(!engine.hover(HoverTarget::HeroImage));
    assert!(rec.borrow().tones.is_empty());
}

#[test]
fn teardown_stops_hum_and_closes() {
    let (mut engine, rec) = engine();
    engine.initialize();
    let hum = engine.hum().unwrap();
    engine.teardown();
    engine.teardown();

    let rec = rec.borrow();
    assert_eq!(rec.generators_stopped, vec![hum]);
    assert_eq!(rec.closes, 1);
    assert_eq!(engine.state(), SessionState::Closed);
    assert!(!engine.toggle());
}

#[test]
fn teardown_without_session_is_safe() {
    let (mut engine, rec) = engine();
    engine.teardown();
    assert_eq!(engine.state(), SessionState::Closed);
    assert_eq!(rec.borrow().closes, 0);
}

#[test]
fn click_gesture_starts_audio_once() {
    let (mut engine, rec) = engine();
    assert_eq!(engine.state(), SessionState::Uninitialized);

    engine.handle_gesture(Gesture::PointerDown { on_hero: false });
    assert_eq!(engine.state(), SessionState::Running);

    engine.handle_gesture(Gesture::KeyDown);
    engine.handle_gesture(Gesture::Scroll);
    engine.handle_gesture(Gesture::TouchStart);
    assert_eq!(rec.borrow().generators_started.len(), 1);
}

#[test]
fn toggled_off_engine_stays_quiet() {
    let (mut engine, rec) = engine();
    engine.initialize();
    assert!(!engine.toggle());

    run(&mut engine, 0.0, 5.0, 0.1);
    assert_eq!(rec.borrow().ambient_tones(), 0);
}

#[test]
fn toggle_off_beats_a_due_firing() {
    let (mut engine, rec) = engine();
    engine.initialize();
    engine.update(0.0);
    let fired = rec.borrow().ambient_tones();

    let due = engine.next_ambient_due().unwrap();
    engine.toggle();
    engine.update(due + 0.5);
    assert_eq!(rec.borrow().ambient_tones(), fired);
}

#[test]
fn ambient_tones_follow_the_schedule() {
    let (mut engine, rec) = engine();
    engine.initialize();

    let mut fire_times = Vec::new();
    let mut t = 0.0;
    while t < 20.0 {
        let before = rec.borrow().ambient_tones();
        engine.update(t);
        if rec.borrow().ambient_tones() > before {
            fire_times.push(t);
        }
        t += 0.01;
    }

    assert_eq!(fire_times[0], 0.0);
    for pair in fire_times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= 1.0 - 1e-9 && gap <= 1.5 + 0.011, "gap {}", gap);
    }
}

#[test]
fn ambient_tones_are_mostly_ghosts() {
    let (mut engine, rec) = engine();
    engine.initialize();
    run(&mut engine, 0.0, 600.0, 0.25);

    let rec = rec.borrow();
    let ghosts = rec.tones_of(ToneKind::Ghost) as f64;
    let total = rec.ambient_tones() as f64;
    assert!(total > 300.0);
    let ratio = ghosts / total;
    assert!((0.7..0.9).contains(&ratio), "ghost ratio {}", ratio);
}

#[test]
fn ambient_tones_use_configured_mix() {
    let mix = MixLevels {
        master: 0.5,
        ..MixLevels::default()
    };
    let config = EngineConfig::default().with_mix(mix).with_ghost_probability(1.0);
    let (mut engine, rec) = engine_with(RecordingPlatform::new(), config);
    engine.initialize();
    engine.update(0.0);

    let rec = rec.borrow();
    let ghost = &rec.tones[0];
    assert_eq!(ghost.kind, ToneKind::Ghost);
    assert!((ghost.peak_gain() - 0.05).abs() < 1e-6);
    assert!((ghost.duration - 3.1).abs() < 1e-9);
    assert!((rec.generators_started[0].gain - 0.0015).abs() < 1e-7);
}

#[test]
fn autoplay_refusal_is_silent_and_retried() {
    let platform = RecordingPlatform::failing_with(vec![AudioError::PolicyBlocked, AudioError::PolicyBlocked]);
    let (mut engine, rec) = engine_with(platform, EngineConfig::default());

    assert_eq!(engine.handle_gesture(Gesture::Scroll), SessionState::Uninitialized);
    assert!(!engine.toggle());
    assert!(engine.last_error().is_none());

    assert_eq!(engine.handle_gesture(Gesture::KeyDown), SessionState::Running);
    assert_eq!(rec.borrow().generators_started.len(), 1);
}

#[test]
fn suspended_context_that_cannot_resume_is_released() {
    let platform = RecordingPlatform {
        start_suspended: true,
        resume_failure: Some(AudioError::PolicyBlocked),
        ..RecordingPlatform::default()
    };
    let (mut engine, rec) = engine_with(platform, EngineConfig::default());

    assert_eq!(engine.initialize(), SessionState::Uninitialized);
    assert!(engine.context().is_none());
    assert_eq!(rec.borrow().closes, 1);
    assert!(rec.borrow().generators_started.is_empty());

    engine.platform_mut().resume_failure = None;
    assert_eq!(engine.initialize(), SessionState::Running);
    assert_eq!(rec.borrow().resumes, 1);
}

#[test]
fn unsupported_platform_stays_off() {
    let platform = RecordingPlatform::failing_with(vec![AudioError::UnsupportedPlatform("none".into())]);
    let (mut engine, rec) = engine_with(platform, EngineConfig::default());

    assert!(!engine.toggle());
    assert!(!engine.toggle());
    engine.handle_gesture(Gesture::KeyDown);
    assert_eq!(engine.state(), SessionState::Uninitialized);
    assert_eq!(rec.borrow().contexts_created, 0);
}

#[test]
fn hum_failure_releases_context_and_allows_retry() {
    let platform = RecordingPlatform {
        generator_failure: Some(AudioError::GraphConstruction("no oscillator".into())),
        ..RecordingPlatform::default()
    };
    let (mut engine, rec) = engine_with(platform, EngineConfig::default());

    assert!(!engine.toggle());
    assert_eq!(rec.borrow().closes, 1);
    assert!(matches!(engine.last_error(), Some(AudioError::GraphConstruction(_))));

    engine.platform_mut().generator_failure = None;
    assert!(engine.toggle());
    assert_eq!(rec.borrow().contexts_created, 2);
}

#[test]
fn hover_and_hero_click_feedback() {
    let (mut engine, rec) = engine();
    engine.handle_gesture(Gesture::PointerDown { on_hero: true });
    engine.hover(HoverTarget::NavItem);
    engine.hover(HoverTarget::ListEntry);

    let rec = rec.borrow();
    assert_eq!(rec.tones_of(ToneKind::Blip), 1);
    assert_eq!(rec.tones_of(ToneKind::Ping), 2);

    for ping in rec.tones.iter().filter(|t| t.kind == ToneKind::Ping) {
        assert!((6500.0..7000.0).contains(&ping.base_frequency));
        assert_eq!(ping.highpass, Some(2500.0));
    }
}

#[test]
fn context_time_only_moves_while_running() {
    let (mut engine, _rec) = engine();
    engine.initialize();
    engine.update(1.0);
    engine.toggle();
    engine.update(3.0);
    engine.toggle();
    engine.update(3.5);

    let time = engine.context().unwrap().current_time();
    assert!((time - 1.5).abs() < 1e-9, "context time {}", time);
}
