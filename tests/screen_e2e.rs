use std::sync::{Arc, Mutex};
use std::time::Duration;

use deadname_config::{
    AddRequestDeduplicator, AddSignal, AddSignalCenter, ArmOutcome, ConfigurationScreen, EraserApp, GuardState,
    InteractionError, ManualClock, NameRecord, NamesSnapshot, NamesStore, RecordField, ScreenConfig,
    SignalSubscriptionId, StoreChange,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn app_with(records: Vec<NameRecord>) -> (EraserApp, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let app = EraserApp::with_parts(
        Arc::new(NamesStore::with_records(records)),
        ScreenConfig::default(),
        clock.clone(),
    );
    (app, clock)
}

#[test]
fn append_blank_row_after_existing_pair() {
    init_tracing();
    let (app, _) = app_with(vec![NameRecord::new("Tom", "Alice")]);
    let mut screen = app.open_screen();

    screen.add_row();

    let rows = screen.render();
    let rows = rows.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].dead_name.value, "Tom");
    assert_eq!(rows[0].current_name.value, "Alice");
    assert_eq!(rows[1].dead_name.value, "");
    assert_eq!(rows[1].current_name.value, "");
}

#[test]
fn signal_delivered_twice_adds_one_row() {
    init_tracing();
    let (app, _) = app_with(Vec::new());
    let mut screen = app.open_screen();

    let signal = app.request_add();
    // Host notification layer re-delivers the same event.
    app.signals().post(signal);

    assert_eq!(screen.pump_signals(), 1);
    assert_eq!(app.store().len(), 1);
    assert!(app.store().get(0).unwrap().is_noop_rule());
}

#[test]
fn remove_first_of_two_rows_through_cooldown() {
    init_tracing();
    let a = NameRecord::new("A", "a");
    let b = NameRecord::new("B", "b");
    let (app, clock) = app_with(vec![a, b.clone()]);
    let mut screen = app.open_screen();

    assert_eq!(screen.request_removal(0).unwrap(), ArmOutcome::Armed);
    assert!(matches!(screen.guard_state(), GuardState::Suspended(p) if p.index == 0));

    // No row interaction while suspended.
    let view = screen.render();
    assert!(view.is_placeholder());
    assert!(view.rows().is_empty());
    assert_eq!(
        screen.edit(1, RecordField::CurrentName, "bee"),
        Err(InteractionError::RemovalPending)
    );
    assert_eq!(screen.request_removal(1).unwrap(), ArmOutcome::Ignored);
    assert_eq!(app.store().len(), 2);

    let wake = screen.next_wakeup().unwrap();
    clock.advance(Duration::from_millis(200));
    assert!(wake <= deadname_config::Clock::now(clock.as_ref()));
    assert_eq!(screen.tick(), 1);

    assert_eq!(app.store().records(), vec![b]);
    assert_eq!(screen.guard_state(), GuardState::Idle);
    assert!(!screen.render().is_placeholder());
    screen.edit(0, RecordField::CurrentName, "bee").unwrap();
}

#[test]
fn burst_of_remove_requests_removes_exactly_one_record() {
    init_tracing();
    let records: Vec<NameRecord> = (0..4).map(|i| NameRecord::new(format!("d{i}"), format!("c{i}"))).collect();
    let (app, clock) = app_with(records.clone());
    let mut screen = app.open_screen();

    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&removed);
    app.store().subscribe(Arc::new(move |change: &StoreChange, _: &[NameRecord]| {
        if let StoreChange::Removed { index, .. } = change {
            sink.lock().unwrap().push(*index);
        }
    }));

    assert!(screen.request_removal(2).unwrap().is_armed());
    for _ in 0..5 {
        assert_eq!(screen.request_removal(2).unwrap(), ArmOutcome::Ignored);
        assert_eq!(screen.request_removal(0).unwrap(), ArmOutcome::Ignored);
    }

    clock.advance(Duration::from_millis(250));
    assert_eq!(screen.tick(), 1);
    assert_eq!(screen.tick(), 0);

    assert_eq!(*removed.lock().unwrap(), vec![2]);
    let left: Vec<_> = app.store().records().into_iter().map(|r| r.dead_name).collect();
    assert_eq!(left, vec!["d0", "d1", "d3"]);
}

#[test]
fn closing_screen_during_cooldown_still_removes_record() {
    init_tracing();
    let a = NameRecord::new("A", "a");
    let b = NameRecord::new("B", "b");
    let (app, clock) = app_with(vec![a, b.clone()]);

    let mut screen = app.open_screen().with_dismiss(|| {});
    assert_eq!(screen.request_removal(0).unwrap(), ArmOutcome::Armed);
    assert!(screen.dismiss());
    drop(screen);

    assert_eq!(app.store().records(), vec![b.clone()]);

    // Nothing else fires later.
    clock.advance(Duration::from_millis(500));
    assert_eq!(app.store().records(), vec![b]);
    assert_eq!(app.store().listener_count(), 0);
}

#[test]
fn adds_during_cooldown_do_not_disturb_pending_removal() {
    init_tracing();
    let a = NameRecord::new("A", "a");
    let b = NameRecord::new("B", "b");
    let (app, clock) = app_with(vec![a.clone(), b]);
    let mut screen = app.open_screen();

    screen.request_removal(1).unwrap();
    screen.add_row();
    app.request_add();
    assert_eq!(screen.pump_signals(), 1);
    assert_eq!(app.store().len(), 4);

    clock.advance(Duration::from_millis(200));
    screen.tick();

    let records = app.store().records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], a);
    assert!(records[1].is_noop_rule());
    assert!(records[2].is_noop_rule());
}

#[test]
fn two_windows_see_each_others_edits() {
    init_tracing();
    let (app, _) = app_with(vec![NameRecord::blank()]);
    let mut left = app.open_screen();
    let right = app.open_screen();

    let before = right.render_generation();
    left.edit(0, RecordField::DeadName, "Tom").unwrap();

    assert!(right.render_generation() > before);
    assert_eq!(right.render().rows()[0].dead_name.value, "Tom");
}

#[test]
fn screens_with_separate_gates_would_double_add() {
    // Documents why screens on one signal centre must share a deduplicator.
    let store = Arc::new(NamesStore::new());
    let signals = AddSignalCenter::new();
    let clock = Arc::new(ManualClock::new());
    let mut a = ConfigurationScreen::new(
        Arc::clone(&store),
        Arc::new(AddRequestDeduplicator::new()),
        &signals,
        ScreenConfig::default(),
        clock.clone(),
    );
    let mut b = ConfigurationScreen::new(
        Arc::clone(&store),
        Arc::new(AddRequestDeduplicator::new()),
        &signals,
        ScreenConfig::default(),
        clock,
    );

    signals.post(AddSignal::fresh());
    a.pump_signals();
    b.pump_signals();
    assert_eq!(store.len(), 2);
}

#[test]
fn host_can_key_subscriptions_by_id() {
    let signals = AddSignalCenter::new();
    let first = signals.subscribe(4);
    let second = signals.subscribe(4);

    let ids: std::collections::HashSet<SignalSubscriptionId> = [first.id(), second.id()].into_iter().collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(signals.post(AddSignal::fresh()), 2);

    drop(second);
    assert_eq!(signals.post(AddSignal::fresh()), 1);
    assert_eq!(first.drain().len(), 2);
}

#[test]
fn persistence_listener_can_serialize_after_every_mutation() {
    init_tracing();
    let (app, clock) = app_with(Vec::new());
    let mut screen = app.open_screen();

    let saved: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);
    let store = Arc::downgrade(app.store());
    app.store().subscribe(Arc::new(move |_: &StoreChange, _: &[NameRecord]| {
        if let Some(store) = store.upgrade() {
            let json = serde_json::to_string(&store.snapshot()).unwrap();
            sink.lock().unwrap().push(json);
        }
    }));

    screen.add_row();
    screen.edit(0, RecordField::DeadName, "Tom").unwrap();
    screen.request_removal(0).unwrap();
    clock.advance(Duration::from_millis(200));
    screen.tick();

    let saved = saved.lock().unwrap();
    assert_eq!(saved.len(), 3);
    let last: NamesSnapshot = serde_json::from_str(&saved[2]).unwrap();
    assert!(last.records.is_empty());
    assert_eq!(last.revision, 3);
}

#[test]
fn config_from_json_drives_cooldown_and_done_control() {
    let config = ScreenConfig::from_json_str(
        r#"{"removal_cooldown_ms": 50, "host": {"window_close_affordance": true}}"#,
    )
    .unwrap();
    let clock = Arc::new(ManualClock::new());
    let app = EraserApp::with_parts(
        Arc::new(NamesStore::with_records(vec![NameRecord::blank()])),
        config,
        clock.clone(),
    );
    let mut screen = app.open_screen();
    assert!(screen.render().show_done_control);

    screen.request_removal(0).unwrap();
    clock.advance(Duration::from_millis(50));
    assert_eq!(screen.tick(), 1);
    assert!(app.store().is_empty());
}
