use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use overlay_engine::{
    Delivery, Dispatcher, DispatcherOptions, EventBus, EventSource, Handler, HandlerError,
    HandlerResult, NotificationDispatcher,
    test_support::{Counter, FlakySource, drain_notices, wait_until},
};
use overlay_protocol::{
    ActionId, EventKind, HostEvent, NotifyKind, RegistrationFailure, UiNotice, actions,
    ipc::{UiRx, ui_channel},
};
use parking_lot::Mutex;
use tracing_subscriber::prelude::*;

/// Dispatcher wired to a fresh UI notice channel.
fn create_test_dispatcher() -> (Dispatcher, UiRx) {
    let (tx, rx) = ui_channel();
    (Dispatcher::new(NotificationDispatcher::new(tx)), rx)
}

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

#[test]
fn repeated_initialization_delivers_once() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let bus = EventBus::new();
    let focus = Counter::new();
    let _g = dispatcher.on_focus_request(focus.handler());

    for _ in 0..5 {
        let report = dispatcher.subscribe(&bus);
        assert!(report.is_complete());
    }
    for kind in EventKind::ALL {
        assert_eq!(bus.listener_count(kind), 1, "{kind}");
        assert!(dispatcher.is_subscribed(kind));
    }

    bus.emit(HostEvent::FocusRequest);
    assert_eq!(focus.get(), 1);
}

#[test]
fn capture_triggers_are_debounced() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let shots = Counter::new();
    let _g = dispatcher.on_capture(shots.handler());

    let t0 = Instant::now();
    let outcomes: Vec<Delivery> = [0, 100, 250, 400]
        .into_iter()
        .map(|ms| dispatcher.deliver_at(HostEvent::CaptureTrigger, at(t0, ms)))
        .collect();

    assert_eq!(shots.get(), 2);
    assert_eq!(
        outcomes,
        vec![
            Delivery::Handled(ActionId::from(actions::SCREENSHOT)),
            Delivery::Debounced,
            Delivery::Debounced,
            Delivery::Handled(ActionId::from(actions::SCREENSHOT)),
        ]
    );
}

#[test]
fn unhandled_capture_still_consumes_debounce_slot() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let t0 = Instant::now();
    let first = dispatcher.deliver_at(HostEvent::CaptureTrigger, t0);
    assert_eq!(first, Delivery::NoHandler(ActionId::from(actions::SCREENSHOT)));
    assert!(!first.reached_handler());

    let shots = Counter::new();
    let _g = dispatcher.on_capture(shots.handler());
    assert_eq!(
        dispatcher.deliver_at(HostEvent::CaptureTrigger, at(t0, 100)),
        Delivery::Debounced
    );
    assert_eq!(shots.get(), 0);

    assert!(
        dispatcher
            .deliver_at(HostEvent::CaptureTrigger, at(t0, 300))
            .reached_handler()
    );
    assert_eq!(shots.get(), 1);
}

#[test]
fn other_kinds_are_not_debounced() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let audio = Counter::new();
    let _g = dispatcher.on_toggle_system_audio(audio.handler());
    let t0 = Instant::now();
    for ms in [0, 1, 2] {
        dispatcher.deliver_at(HostEvent::ToggleSystemAudio, at(t0, ms));
    }
    assert_eq!(audio.get(), 3);
}

#[test]
fn debounce_interval_is_configurable() {
    let (tx, _rx) = ui_channel();
    let dispatcher = Dispatcher::with_options(
        NotificationDispatcher::new(tx),
        DispatcherOptions {
            capture_debounce: Duration::from_millis(50),
            ..DispatcherOptions::default()
        },
    );
    let shots = Counter::new();
    let _g = dispatcher.on_capture(shots.handler());
    let t0 = Instant::now();
    for ms in [0, 49, 50, 99, 100] {
        dispatcher.deliver_at(HostEvent::CaptureTrigger, at(t0, ms));
    }
    assert_eq!(shots.get(), 3);
}

#[test]
fn last_registration_wins() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let a = Counter::new();
    let b = Counter::new();
    let _ga = dispatcher.on_custom("toggle_dashboard", a.handler());
    let _gb = dispatcher.on_custom("toggle_dashboard", b.handler());

    dispatcher.deliver(HostEvent::custom("toggle_dashboard"));
    assert_eq!(a.get(), 0);
    assert_eq!(b.get(), 1);
}

#[test]
fn stale_guard_does_not_remove_successor() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let b = Counter::new();
    let ga = dispatcher.on_custom("toggle_dashboard", Handler::from_fn(|| {}));
    let _gb = dispatcher.on_custom("toggle_dashboard", b.handler());
    drop(ga);

    dispatcher.deliver(HostEvent::custom("toggle_dashboard"));
    assert_eq!(b.get(), 1);
}

#[test]
fn unregistered_custom_action_warns() {
    let (dispatcher, mut rx) = create_test_dispatcher();
    let hits = Counter::new();
    let (layer, logs) = logging::capture::layer();
    let subscriber = tracing_subscriber::registry().with(layer);

    let outcome = tracing::subscriber::with_default(subscriber, || {
        dispatcher.on_custom("my_action", hits.handler()).detach();
        assert!(dispatcher.unregister("my_action"));
        dispatcher.deliver(HostEvent::custom("my_action"))
    });

    assert_eq!(outcome, Delivery::NoHandler(ActionId::from("my_action")));
    assert_eq!(hits.get(), 0);
    assert!(logs.contains("WARN", "no handler registered for custom shortcut"));
    let notices = drain_notices(&mut rx);
    assert!(matches!(
        notices.as_slice(),
        [UiNotice::Notify { kind: NotifyKind::Warn, text, .. }] if text.contains("my_action")
    ));
}

#[test]
fn missing_fixed_handler_is_silent() {
    let (dispatcher, mut rx) = create_test_dispatcher();
    let (layer, logs) = logging::capture::layer();
    let subscriber = tracing_subscriber::registry().with(layer);

    let outcome = tracing::subscriber::with_default(subscriber, || {
        dispatcher.deliver(HostEvent::StartRecording)
    });

    assert_eq!(
        outcome,
        Delivery::NoHandler(ActionId::from(actions::AUDIO_RECORDING))
    );
    assert_eq!(logs.count_level("WARN"), 0);
    assert!(drain_notices(&mut rx).is_empty());
}

#[test]
fn failing_handlers_do_not_block_later_events() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let audio = Counter::new();
    let _g1 = dispatcher.on_focus_request(Handler::from_fn(|| panic!("focus exploded")));
    let _g2 = dispatcher.on_start_recording(Handler::new(|_| Err(HandlerError::msg("no mic"))));
    let _g3 = dispatcher.on_toggle_system_audio(audio.handler());
    let (layer, logs) = logging::capture::layer();
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(
            dispatcher.deliver(HostEvent::FocusRequest),
            Delivery::Failed(ActionId::from(actions::FOCUS_INPUT))
        );
        let recording = dispatcher.deliver(HostEvent::StartRecording);
        assert_eq!(
            recording,
            Delivery::Failed(ActionId::from(actions::AUDIO_RECORDING))
        );
        assert!(recording.reached_handler());
        dispatcher.deliver(HostEvent::ToggleSystemAudio);
        // A panicking handler stays registered and keeps failing in isolation.
        dispatcher.deliver(HostEvent::FocusRequest);
    });

    assert_eq!(audio.get(), 1);
    assert_eq!(logs.count_level("ERROR"), 3);
    assert!(logs.contains("ERROR", "focus exploded"));
    assert!(logs.contains("ERROR", "no mic"));
}

#[tokio::test]
async fn async_handler_failure_is_logged_and_contained() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let (layer, logs) = logging::capture::layer();
    let _sub = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));

    let started = Counter::new();
    let s = started.clone();
    let _g1 = dispatcher.on_capture(Handler::from_async(move |_| {
        let s = s.clone();
        async move {
            s.bump();
            tokio::task::yield_now().await;
            Err(HandlerError::msg("capture device busy"))
        }
    }));
    let after = Counter::new();
    let _g2 = dispatcher.on_focus_request(after.handler());

    assert_eq!(
        dispatcher.deliver(HostEvent::CaptureTrigger),
        Delivery::Spawned(ActionId::from(actions::SCREENSHOT))
    );
    dispatcher.deliver(HostEvent::FocusRequest);
    assert_eq!(after.get(), 1);

    let logged = {
        let logs = logs.clone();
        wait_until(1000, move || logs.contains("ERROR", "capture device busy")).await
    };
    assert!(logged);
    assert_eq!(started.get(), 1);
}

async fn explode() -> HandlerResult {
    tokio::task::yield_now().await;
    panic!("async boom");
}

#[tokio::test]
async fn async_handler_panic_is_contained() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let (layer, logs) = logging::capture::layer();
    let _sub = tracing::subscriber::set_default(tracing_subscriber::registry().with(layer));

    let _g = dispatcher.on_custom("explode", Handler::from_async(|_| explode()));
    dispatcher.deliver(HostEvent::custom("explode"));
    let logged = {
        let logs = logs.clone();
        wait_until(1000, move || logs.contains("ERROR", "async boom")).await
    };
    assert!(logged);

    // The dispatcher keeps working after the task panicked.
    let ok = Counter::new();
    let _g2 = dispatcher.on_custom("fine", ok.handler());
    dispatcher.deliver(HostEvent::custom("fine"));
    assert_eq!(ok.get(), 1);
}

#[test]
fn async_handler_without_runtime_is_dropped() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let _g = dispatcher.on_capture(Handler::from_async(|_| async { Ok(()) }));
    assert_eq!(
        dispatcher.deliver(HostEvent::CaptureTrigger),
        Delivery::Failed(ActionId::from(actions::SCREENSHOT))
    );
}

#[test]
fn partial_subscription_failure_keeps_other_kinds() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let bus = EventBus::new();
    let source = FlakySource::new(bus.clone(), [EventKind::CaptureTrigger]);
    let focus = Counter::new();
    let shots = Counter::new();
    let _g1 = dispatcher.on_focus_request(focus.handler());
    let _g2 = dispatcher.on_capture(shots.handler());

    let report = dispatcher.subscribe(&source);
    assert!(!report.is_complete());
    assert_eq!(report.installed.len(), EventKind::ALL.len() - 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, EventKind::CaptureTrigger);

    bus.emit(HostEvent::FocusRequest);
    bus.emit(HostEvent::CaptureTrigger);
    assert_eq!(focus.get(), 1);
    assert_eq!(shots.get(), 0);
    assert!(!dispatcher.is_subscribed(EventKind::CaptureTrigger));
}

#[test]
fn registration_errors_are_rebroadcast() {
    let (dispatcher, mut rx) = create_test_dispatcher();
    let bus = EventBus::new();
    dispatcher.subscribe(&bus);
    let failures = vec![RegistrationFailure::from((
        ActionId::from(actions::SCREENSHOT),
        "cmd+shift+s".to_string(),
        "already bound".to_string(),
    ))];

    bus.emit(HostEvent::RegistrationError(failures.clone()));

    assert_eq!(
        drain_notices(&mut rx),
        vec![UiNotice::ShortcutRegistrationError(failures)]
    );
}

#[test]
fn shutdown_disposes_once() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let bus = EventBus::new();
    let focus = Counter::new();
    let _g = dispatcher.on_focus_request(focus.handler());
    dispatcher.subscribe(&bus);

    assert_eq!(dispatcher.shutdown(), EventKind::ALL.len());
    assert_eq!(dispatcher.shutdown(), 0);
    for kind in EventKind::ALL {
        assert_eq!(bus.listener_count(kind), 0);
    }
    bus.emit(HostEvent::FocusRequest);
    assert_eq!(focus.get(), 0);
}

#[test]
fn dropping_dispatcher_releases_subscriptions() {
    let bus = EventBus::new();
    {
        let (dispatcher, _rx) = create_test_dispatcher();
        dispatcher.subscribe(&bus);
        assert_eq!(bus.listener_count(EventKind::FocusRequest), 1);
    }
    assert_eq!(bus.listener_count(EventKind::FocusRequest), 0);
}

#[test]
fn registration_before_subscription_is_honored() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let _g = dispatcher.on_custom(
        "toggle_dashboard",
        Handler::new(move |ev| {
            s.lock().push(ev.clone());
            Ok(())
        }),
    );
    bus.emit(HostEvent::custom("toggle_dashboard"));
    assert!(seen.lock().is_empty());

    dispatcher.subscribe(&bus);
    bus.emit(HostEvent::custom("toggle_dashboard"));
    assert_eq!(seen.lock().as_slice(), &[HostEvent::custom("toggle_dashboard")]);
}

#[test]
fn handlers_may_reenter_the_dispatcher() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let inner = Counter::new();
    let _g1 = dispatcher.on_custom("inner", inner.handler());
    let d = dispatcher.clone();
    let _g2 = dispatcher.on_focus_request(Handler::from_fn(move || {
        d.deliver(HostEvent::custom("inner"));
        d.unregister("inner");
    }));

    dispatcher.deliver(HostEvent::FocusRequest);
    assert_eq!(inner.get(), 1);
    assert!(!dispatcher.registry().contains("inner"));
}

#[test]
fn source_trait_object_subscribes() {
    let (dispatcher, _rx) = create_test_dispatcher();
    let bus = EventBus::new();
    let source: &dyn EventSource = &bus;
    assert!(dispatcher.subscribe(source).is_complete());
    assert_eq!(dispatcher.subscribed_kinds().len(), EventKind::ALL.len());
}
