mod helpers;
use helpers::seeded_config;

use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use particlize_sim::{
    ControllerEvent, ControllerState, ManualClock, ParticleEffect, ParticlizeConfig,
    ParticlizeController, PixelBuffer,
};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn fast_config(count: usize) -> ParticlizeConfig {
    let mut config = seeded_config(count);
    config.animation.duration_ms = 1000;
    config.runtime.frame_interval_ms = 2;
    config.runtime.capture_timeout_ms = 100;
    config
}

fn pixels() -> PixelBuffer {
    PixelBuffer::filled(4, 4, [200, 100, 50, 255])
}

/// Consomme les événements jusqu'à celui qui satisfait `pred`.
fn wait_for<F>(events: &Receiver<ControllerEvent>, mut pred: F) -> Option<ControllerEvent>
where
    F: FnMut(&ControllerEvent) -> bool,
{
    let deadline = Instant::now() + EVENT_TIMEOUT;
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(left) {
            Ok(event) if pred(&event) => return Some(event),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

/// Vide le canal puis attend `n` nouvelles notifications de rendu
/// (la boucle a fait au moins `n - 1` tours complets depuis l'appel).
fn wait_redraws(events: &Receiver<ControllerEvent>, n: usize) {
    while events.try_recv().is_ok() {}
    for _ in 0..n {
        assert!(wait_for(events, |e| matches!(e, ControllerEvent::Redraw { .. })).is_some());
    }
}

fn started(
    clock: &Arc<ManualClock>,
    config: ParticlizeConfig,
    calls: &Arc<AtomicUsize>,
) -> (ParticlizeController, Receiver<ControllerEvent>) {
    let mut controller = ParticlizeController::new(clock.clone());
    let events = controller.events();
    let counter = Arc::clone(calls);
    controller
        .start(ParticleEffect::Disintegration, config, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureRequested));
    assert!(controller.on_content_captured(&pixels()).unwrap());
    (controller, events)
}

// ==================================
// 1. Cycle de vie complet
// ==================================

#[test]
fn test_full_lifecycle_reaches_destroyed_and_calls_back_once() {
    let clock = Arc::new(ManualClock::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut controller = ParticlizeController::new(clock.clone());
    let events = controller.events();
    assert_eq!(controller.state(), ControllerState::Idle);

    let counter = Arc::clone(&calls);
    controller
        .start(ParticleEffect::Disintegration, fast_config(16), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(controller.state(), ControllerState::Capturing);
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureRequested));

    assert!(controller.on_content_captured(&pixels()).unwrap());
    assert_eq!(
        events.recv_timeout(EVENT_TIMEOUT),
        Ok(ControllerEvent::Started { particles: 16 })
    );
    assert_eq!(controller.state(), ControllerState::Running);

    clock.set(500);
    wait_redraws(&events, 2);
    let frame = controller.latest_frame().expect("frame published while running");
    assert_eq!(frame.count(), 16);
    assert!(controller.completion_percentage() > 0.0);

    clock.set(2000);
    assert_eq!(
        wait_for(&events, |e| *e == ControllerEvent::Completed),
        Some(ControllerEvent::Completed)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), ControllerState::Destroyed);
    assert!(controller.latest_frame().is_none());
    assert_eq!(controller.completion_percentage(), 1.0);

    controller.cleanup();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_capture_completes_right_away() {
    let clock = Arc::new(ManualClock::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut controller = ParticlizeController::new(clock.clone());
    let events = controller.events();
    let counter = Arc::clone(&calls);
    controller
        .start(ParticleEffect::Assembly, fast_config(16), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    wait_for(&events, |e| *e == ControllerEvent::CaptureRequested);

    let transparent = PixelBuffer::filled(4, 4, [0, 0, 0, 0]);
    assert!(controller.on_content_captured(&transparent).unwrap());
    assert!(wait_for(&events, |e| *e == ControllerEvent::Completed).is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), ControllerState::Destroyed);
}

// ==================================
// 2. Capture
// ==================================

#[test]
fn test_capture_timeout_aborts_to_idle() {
    let clock = Arc::new(ManualClock::new(0));
    let mut controller = ParticlizeController::new(clock.clone());
    let events = controller.events();
    controller
        .start(ParticleEffect::Disintegration, fast_config(16), || {})
        .unwrap();
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureRequested));

    clock.set(100);
    assert_eq!(controller.state(), ControllerState::Capturing);

    clock.set(101);
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureTimedOut));

    // capture livrée trop tard
    assert!(!controller.on_content_captured(&pixels()).unwrap());
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn test_capture_timeout_reaches_a_host_listening_only_on_events() {
    let clock = Arc::new(ManualClock::new(0));
    let controller = ParticlizeController::new(clock.clone());
    let events = controller.events();
    let mut config = fast_config(16);
    config.runtime.capture_timeout_ms = 3000;
    controller
        .start(ParticleEffect::Disintegration, config, || {})
        .unwrap();
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureRequested));

    // aucun appel au contrôleur : seul le canal d'événements est lu
    clock.set(10_000);
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureTimedOut));
    assert!(events.try_recv().is_err());
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn test_capture_watch_stops_once_content_arrives() {
    let clock = Arc::new(ManualClock::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (mut controller, events) = started(&clock, fast_config(16), &calls);
    assert_eq!(
        events.recv_timeout(EVENT_TIMEOUT),
        Ok(ControllerEvent::Started { particles: 16 })
    );

    // bien au-delà de l'échéance de capture, l'effet continue
    clock.set(500);
    wait_redraws(&events, 3);
    assert_eq!(controller.state(), ControllerState::Running);
    controller.cleanup();
}

#[test]
fn test_restart_while_capturing_replaces_parameters_but_not_deadline() {
    let clock = Arc::new(ManualClock::new(0));
    let mut controller = ParticlizeController::new(clock.clone());
    let events = controller.events();

    controller
        .start(ParticleEffect::Disintegration, fast_config(16), || {})
        .unwrap();
    clock.set(80);
    controller
        .start(ParticleEffect::Assembly, fast_config(4), || {})
        .unwrap();
    assert_eq!(events.recv_timeout(EVENT_TIMEOUT), Ok(ControllerEvent::CaptureRequested));
    assert!(events.try_recv().is_err());

    clock.set(101);
    assert_eq!(
        wait_for(&events, |e| *e == ControllerEvent::CaptureTimedOut),
        Some(ControllerEvent::CaptureTimedOut)
    );
    assert_eq!(controller.state(), ControllerState::Idle);

    controller
        .start(ParticleEffect::Disintegration, fast_config(16), || {})
        .unwrap();
    clock.set(150);
    controller
        .start(ParticleEffect::Assembly, fast_config(4), || {})
        .unwrap();
    assert!(controller.on_content_captured(&pixels()).unwrap());
    assert!(wait_for(&events, |e| *e == ControllerEvent::Started { particles: 4 }).is_some());
}

#[test]
fn test_invalid_config_keeps_controller_idle() {
    let clock = Arc::new(ManualClock::new(0));
    let controller = ParticlizeController::new(clock);
    let mut config = fast_config(16);
    config.animation.duration_ms = 0;

    assert!(controller
        .start(ParticleEffect::Disintegration, config, || {})
        .is_err());
    assert_eq!(controller.state(), ControllerState::Idle);
    assert!(controller.events().try_recv().is_err());
}

// ==================================
// 3. Exécution
// ==================================

#[test]
fn test_start_while_running_is_ignored() {
    let clock = Arc::new(ManualClock::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (controller, events) = started(&clock, fast_config(16), &calls);

    controller
        .start(ParticleEffect::Assembly, fast_config(4), || {})
        .unwrap();
    assert_eq!(controller.state(), ControllerState::Running);

    clock.set(2000);
    let mut captures = 0;
    let completed = wait_for(&events, |e| {
        if *e == ControllerEvent::CaptureRequested {
            captures += 1;
        }
        *e == ControllerEvent::Completed
    });
    assert!(completed.is_some());
    assert_eq!(captures, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pause_holds_the_effect_until_resumed() {
    let clock = Arc::new(ManualClock::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (controller, events) = started(&clock, fast_config(16), &calls);

    clock.set(100);
    wait_redraws(&events, 2);
    controller.pause();
    wait_redraws(&events, 2);
    let frozen = controller.completion_percentage();

    // bien au-delà de la durée : en pause, rien ne se termine
    clock.set(5000);
    wait_redraws(&events, 3);
    assert_eq!(controller.state(), ControllerState::Running);
    assert_eq!(controller.completion_percentage(), frozen);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    controller.resume();
    wait_redraws(&events, 2);
    assert_eq!(controller.state(), ControllerState::Running);

    clock.set(6000);
    assert!(wait_for(&events, |e| *e == ControllerEvent::Completed).is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ==================================
// 4. Nettoyage
// ==================================

#[test]
fn test_cleanup_during_run_stops_without_callback() {
    let clock = Arc::new(ManualClock::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (mut controller, events) = started(&clock, fast_config(16), &calls);

    clock.set(200);
    wait_redraws(&events, 2);
    controller.cleanup();

    assert_eq!(controller.state(), ControllerState::Destroyed);
    assert!(controller.latest_frame().is_none());

    // la boucle est jointe : plus aucun événement ensuite
    while events.try_recv().is_ok() {}
    clock.set(5000);
    std::thread::sleep(Duration::from_millis(20));
    assert!(events.try_recv().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // détruit : un nouveau start ne relance rien
    controller
        .start(ParticleEffect::Disintegration, fast_config(16), || {})
        .unwrap();
    assert_eq!(controller.state(), ControllerState::Destroyed);
    controller.cleanup();
}
