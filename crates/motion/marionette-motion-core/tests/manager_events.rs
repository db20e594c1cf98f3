use std::sync::{Arc, Mutex};

use marionette_motion_core::{
    decode_segments, CurveTarget, EntryCommand, EntryId, Inputs, Motion, MotionCurve, MotionError,
    MotionEvent, MotionManager, ParameterHandle, ParameterTable, PlaybackState,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn constant_motion(handle: &ParameterHandle, value: f32, duration: f32) -> Motion {
    let curve = MotionCurve::new(
        CurveTarget::Parameter(handle.clone()),
        decode_segments(&handle.name, &[0.0, value]).unwrap(),
    );
    Motion::new(duration).with_curve(curve)
}

fn user_data(manager: &mut MotionManager, store: &mut ParameterTable, dt: f32) -> Vec<String> {
    let outputs = manager.update(store, dt).unwrap();
    outputs.user_data().map(str::to_string).collect()
}

#[test]
fn non_looping_event_fires_once() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    let id = manager.start_motion(Arc::new(Motion::new(3.0).with_event(1.5, "beat")), false);
    manager.entry_mut(id).unwrap().set_time(1.0).unwrap();

    // Each update reports the events crossed since the previous update.
    assert!(user_data(&mut manager, &mut store, 1.0).is_empty());
    assert_eq!(user_data(&mut manager, &mut store, 0.5), vec!["beat".to_string()]);
    assert!(user_data(&mut manager, &mut store, 0.1).is_empty());
}

#[test]
fn looping_event_window_wraps_around() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    let motion = Motion::new(3.0)
        .with_loop(true)
        .with_event(1.5, "mid")
        .with_event(2.95, "late")
        .with_event(0.1, "early");
    let id = manager.start_motion(Arc::new(motion), true);
    manager.entry_mut(id).unwrap().set_time(2.9).unwrap();

    assert!(user_data(&mut manager, &mut store, 0.3).is_empty());
    // Window (2.9, 3.0] + [0, 0.2].
    assert_eq!(
        user_data(&mut manager, &mut store, 0.0),
        vec!["late".to_string(), "early".to_string()]
    );
    assert!(user_data(&mut manager, &mut store, 0.0).is_empty());
    assert_eq!(manager.entry(id).unwrap().state(), PlaybackState::Playing);
}

#[test]
fn zero_duration_motion_is_cleaned_up_after_one_update() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    let id = manager.start_motion(Arc::new(Motion::new(0.0)), false);
    assert!(!manager.all_finished());

    let outputs = manager.update(&mut store, 0.016).unwrap();
    assert!(outputs.events.contains(&MotionEvent::Finished { entry: id }));
    assert!(manager.all_finished());
    assert!(manager.entry(id).is_none());

    let mut offered = 0;
    manager
        .terminate_motions(
            |_| {
                offered += 1;
                true
            },
            1.0,
        )
        .unwrap();
    assert_eq!(offered, 0);
}

#[test]
fn listener_sees_events_before_cleanup() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    manager.set_event_listener(move |manager: &MotionManager, value: &str| {
        sink.lock().unwrap().push(format!("{value}:{}", manager.len()));
    });

    manager.start_motion(Arc::new(Motion::new(1.0).with_event(0.5, "ping")), false);
    manager.update(&mut store, 0.6).unwrap();
    assert!(log.lock().unwrap().is_empty());

    let outputs = manager.update(&mut store, 0.6).unwrap();
    assert_eq!(outputs.finished().count(), 1);
    assert!(manager.all_finished());
    assert_eq!(*log.lock().unwrap(), vec!["ping:1".to_string()]);
}

#[test]
fn listener_runs_after_every_entry_has_advanced() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    manager.start_motion(Arc::new(Motion::new(5.0).with_event(0.05, "early")), false);
    let later = manager.start_motion(Arc::new(Motion::new(5.0)), false);

    let seen: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.set_event_listener(move |manager: &MotionManager, _: &str| {
        sink.lock().unwrap().push(manager.entry(later).unwrap().time());
    });

    manager.update(&mut store, 0.1).unwrap();
    manager.update(&mut store, 0.1).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    approx(seen[0], 0.2, 1e-6);
}

#[test]
fn terminate_motions_skips_entries_already_fading_faster() {
    let mut manager = MotionManager::default();
    manager.start_motion(Arc::new(Motion::new(5.0)), false);
    manager.start_motion(Arc::new(Motion::new(5.0)), false);
    manager.terminate_all_motions(1.0).unwrap();

    let mut offered = 0;
    manager
        .terminate_motions(
            |_| {
                offered += 1;
                true
            },
            2.0,
        )
        .unwrap();
    assert_eq!(offered, 0);

    let mut offered = 0;
    manager
        .terminate_motions(
            |_| {
                offered += 1;
                false
            },
            0.5,
        )
        .unwrap();
    assert_eq!(offered, 2);
    for entry in manager.entries() {
        approx(entry.terminating_duration(), 1.0, 0.0);
    }

    assert!(matches!(
        manager.terminate_all_motions(f32::NAN),
        Err(MotionError::InvalidFadeSeconds { .. })
    ));
}

#[test]
fn later_entries_blend_against_earlier_writes() {
    let mut store = ParameterTable::new();
    let handle = store.add_parameter("ParamA", -20.0, 20.0, 0.0);
    let mut manager = MotionManager::default();

    manager.start_motion(Arc::new(constant_motion(&handle, 10.0, 5.0)), false);
    let second = manager.start_motion(Arc::new(constant_motion(&handle, 0.0, 5.0)), false);
    manager.entry_mut(second).unwrap().set_weight(0.5).unwrap();

    manager.update(&mut store, 0.1).unwrap();
    approx(store.value("ParamA").unwrap(), 5.0, 1e-6);
}

#[test]
fn writes_are_clamped_to_parameter_bounds() {
    let mut store = ParameterTable::new();
    let handle = store.add_parameter("ParamA", -1.0, 1.0, 0.0);
    let mut manager = MotionManager::default();
    manager.start_motion(Arc::new(constant_motion(&handle, 30.0, 5.0)), false);
    manager.update(&mut store, 0.1).unwrap();
    assert_eq!(store.value("ParamA"), Some(1.0));
}

#[test]
fn apply_inputs_drives_entries() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    let id = manager.start_motion(Arc::new(Motion::new(5.0)), false);

    let inputs = Inputs {
        entry_cmds: vec![
            EntryCommand::SetSpeed {
                entry: id,
                speed: 2.0,
            },
            EntryCommand::Pause {
                entry: id,
                paused: true,
            },
        ],
    };
    manager.apply_inputs(&inputs).unwrap();
    let entry = manager.entry(id).unwrap();
    assert_eq!(entry.state(), PlaybackState::Paused);
    assert_eq!(entry.speed(), 2.0);

    manager
        .apply_inputs(&Inputs {
            entry_cmds: vec![EntryCommand::Resume { entry: id }],
        })
        .unwrap();
    manager.update(&mut store, 0.5).unwrap();
    approx(manager.entry(id).unwrap().time(), 1.0, 0.0);

    let err = manager
        .apply_inputs(&Inputs {
            entry_cmds: vec![EntryCommand::Resume { entry: EntryId(99) }],
        })
        .unwrap_err();
    assert_eq!(err, MotionError::UnknownEntry { entry: EntryId(99) });
}

#[test]
fn inputs_round_trip_through_json() {
    let json = r#"{"entry_cmds":[{"Terminate":{"entry":3,"fade_out_seconds":0.5}}]}"#;
    let inputs: Inputs = serde_json::from_str(json).unwrap();
    assert_eq!(
        inputs.entry_cmds,
        vec![EntryCommand::Terminate {
            entry: EntryId(3),
            fade_out_seconds: 0.5,
        }]
    );
}

#[test]
fn negative_elapsed_is_rejected() {
    let mut store = ParameterTable::new();
    let mut manager = MotionManager::default();
    manager.start_motion(Arc::new(Motion::new(1.0)), false);
    assert!(matches!(
        manager.update(&mut store, -1.0),
        Err(MotionError::NegativeElapsed { .. })
    ));
    assert_eq!(manager.len(), 1);
}
