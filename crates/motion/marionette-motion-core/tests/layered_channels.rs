use std::sync::Arc;

use marionette_motion_core::{
    decode_segments, BlinkState, Breath, BreathParameter, Config, CurveTarget, EyeBlink,
    EyeBlinkConfig, ExpressionBlend, ExpressionData, ExpressionMotion, ModelLayout, Motion,
    MotionChannel, MotionCurve, MotionError, MotionManager, ParameterStore, ParameterTable, Pose,
    PoseConfig, PoseData, Rig,
};
use marionette_test_fixtures as fixtures;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn rig_table() -> ParameterTable {
    let layout: ModelLayout = fixtures::models::load("rig").expect("rig layout fixture");
    ParameterTable::from_layout(&layout)
}

fn eye_params(table: &ParameterTable) -> Vec<marionette_motion_core::ParameterHandle> {
    vec![
        table.parameter("ParamEyeLOpen").unwrap(),
        table.parameter("ParamEyeROpen").unwrap(),
    ]
}

#[test]
fn expression_fixture_blends_after_fade_in() {
    let mut table = rig_table();
    let data: ExpressionData = fixtures::expressions::load("smile").unwrap();
    let smile = ExpressionMotion::from_data(&data, &table);
    assert_eq!(smile.parameters().len(), 2);
    assert_eq!(smile.fade_in_seconds(), 0.5);
    assert_eq!(smile.fade_out_seconds(), 1.0);

    let mut manager = MotionManager::default();
    let id = manager.start_motion(Arc::new(smile), false);

    manager.entry_mut(id).unwrap().set_time(0.25).unwrap();
    manager.update(&mut table, 0.0).unwrap();
    approx(table.value("ParamBrowLY").unwrap(), 0.25, 1e-5);
    approx(table.value("ParamMouthOpenY").unwrap(), 0.5, 1e-5);

    table.reset_parameters();
    manager.entry_mut(id).unwrap().set_time(1.0).unwrap();
    manager.update(&mut table, 0.0).unwrap();
    approx(table.value("ParamBrowLY").unwrap(), 0.5, 1e-6);
    approx(table.value("ParamMouthOpenY").unwrap(), 1.0, 1e-6);

    // Infinite clips never finish on their own.
    manager.update(&mut table, 100.0).unwrap();
    assert!(!manager.all_finished());
}

#[test]
fn expression_multiply_scales_current_value() {
    let mut table = ParameterTable::new();
    let handle = table.add_parameter("ParamScale", 0.0, 10.0, 2.0);
    let expr = ExpressionMotion::new(0.0, 0.0).with_parameter(handle, ExpressionBlend::Multiply, 3.0);
    let mut manager = MotionManager::default();
    manager.start_motion(Arc::new(expr), false);
    manager.update(&mut table, 0.1).unwrap();
    approx(table.value("ParamScale").unwrap(), 6.0, 1e-6);
}

#[test]
fn pose_crossfades_to_the_newly_visible_part() {
    let mut table = rig_table();
    let data: PoseData = fixtures::poses::load("arms").unwrap();
    let pose = Pose::from_data(&data, &mut table, &PoseConfig::default());
    assert_eq!(pose.fade_seconds(), 0.5);
    assert_eq!(table.opacity("PartArmA"), Some(1.0));
    assert_eq!(table.opacity("PartArmB"), Some(0.0));

    let arm_a = table.part("PartArmA").unwrap();
    let arm_b = table.part("PartArmB").unwrap();
    table.set_part_target_opacity(&arm_a, 0.0);
    table.set_part_target_opacity(&arm_b, 1.0);

    // A negative step counts as no time passing.
    pose.update(&mut table, -0.1);
    assert_eq!(table.opacity("PartArmB"), Some(0.0));
    assert_eq!(table.opacity("PartArmA"), Some(1.0));

    pose.update(&mut table, 0.25);
    approx(table.opacity("PartArmB").unwrap(), 0.5, 1e-6);
    approx(table.opacity("PartArmA").unwrap(), 0.7, 1e-5);
    approx(table.opacity("PartHandA").unwrap(), 0.7, 1e-5);

    pose.update(&mut table, 0.25);
    approx(table.opacity("PartArmB").unwrap(), 1.0, 1e-6);
    approx(table.opacity("PartArmA").unwrap(), 0.0, 1e-6);
    approx(table.opacity("PartHandA").unwrap(), 0.0, 1e-6);

    pose.reset(&mut table);
    assert_eq!(table.opacity("PartArmA"), Some(1.0));
    assert_eq!(table.target_opacity("PartArmB"), Some(0.0));
}

#[test]
fn breath_adds_its_wave_on_top() {
    let mut table = rig_table();
    let breath = Breath::new().with_parameter(BreathParameter {
        handle: table.parameter("ParamAngleX").unwrap(),
        offset: 0.0,
        peak: 10.0,
        cycle: 4.0,
        weight: 0.5,
    });
    let mut manager = MotionManager::default();
    let id = manager.start_motion(Arc::new(breath), true);
    assert!(manager.entry(id).unwrap().loop_enabled());

    manager.entry_mut(id).unwrap().set_time(1.0).unwrap();
    manager.update(&mut table, 0.0).unwrap();
    approx(table.value("ParamAngleX").unwrap(), 5.0, 1e-4);
}

#[test]
fn eye_blink_closes_and_reopens() {
    let mut table = rig_table();
    let params = eye_params(&table);
    let mut blink = EyeBlink::new(
        EyeBlinkConfig::default(),
        params,
        Box::new(Pcg32::seed_from_u64(7)),
    );
    assert_eq!(blink.state(), BlinkState::First);

    let mut saw_closed = false;
    let mut reopened = false;
    for _ in 0..1000 {
        let value = blink.update(&mut table, 0.01).unwrap();
        assert!((0.0..=1.0).contains(&value));
        assert_eq!(table.value("ParamEyeLOpen"), Some(value));
        assert_eq!(table.value("ParamEyeROpen"), Some(value));
        if value == 0.0 {
            saw_closed = true;
        } else if saw_closed && value == 1.0 {
            reopened = true;
            break;
        }
    }
    assert!(saw_closed, "eyes never closed");
    assert!(reopened, "eyes never reopened");
}

#[test]
fn eye_blink_is_deterministic_for_a_seed() {
    let mut table = rig_table();
    let mut a = EyeBlink::new(EyeBlinkConfig::default(), eye_params(&table), Box::new(Pcg32::seed_from_u64(42)));
    let mut b = EyeBlink::new(EyeBlinkConfig::default(), eye_params(&table), Box::new(Pcg32::seed_from_u64(42)));
    a.update(&mut table, 0.0).unwrap();
    b.update(&mut table, 0.0).unwrap();
    assert_eq!(a.state(), BlinkState::Interval);
    assert_eq!(a.next_blink_time(), b.next_blink_time());
    assert!(a.next_blink_time() >= 0.0 && a.next_blink_time() < 3.0);
}

#[test]
fn inverse_eye_blink_negates_the_value() {
    let mut table = rig_table();
    let cfg = EyeBlinkConfig {
        inverse: true,
        ..EyeBlinkConfig::default()
    };
    let mut blink = EyeBlink::new(cfg, eye_params(&table), Box::new(Pcg32::seed_from_u64(1)));
    assert_eq!(blink.update(&mut table, 0.0).unwrap(), -1.0);
    // Clamped into the parameter range on write.
    assert_eq!(table.value("ParamEyeLOpen"), Some(0.0));
}

#[test]
fn rig_layers_expression_over_restored_base() {
    let mut table = ParameterTable::new();
    let handle = table.add_parameter("ParamAngleX", -30.0, 30.0, 0.0);
    let base = Motion::new(10.0).with_curve(MotionCurve::new(
        CurveTarget::Parameter(handle.clone()),
        decode_segments("ParamAngleX", &[0.0, 10.0]).unwrap(),
    ));
    let expr = ExpressionMotion::new(0.0, 0.0).with_parameter(handle, ExpressionBlend::Add, 5.0);

    let mut rig = Rig::new(&Config::default());
    rig.start_motion(MotionChannel::Base, Arc::new(base), false);
    rig.start_motion(MotionChannel::Expression, Arc::new(expr), false);

    rig.update(&mut table, 0.1).unwrap();
    approx(table.value("ParamAngleX").unwrap(), 15.0, 1e-5);
    // The additive layer does not compound across frames.
    rig.update(&mut table, 0.1).unwrap();
    approx(table.value("ParamAngleX").unwrap(), 15.0, 1e-5);

    assert!(matches!(
        rig.update(&mut table, -0.1),
        Err(MotionError::NegativeElapsed { .. })
    ));
}

#[test]
fn rig_replaces_breath_and_runs_pose() {
    let mut table = rig_table();
    let mut rig = Rig::default();
    let param = table.parameter("ParamBreath").unwrap();
    let mk_breath = |peak: f32| {
        Breath::new().with_parameter(BreathParameter {
            handle: param.clone(),
            offset: 0.5,
            peak,
            cycle: 3.0,
            weight: 0.5,
        })
    };
    let first = rig.set_breath(mk_breath(0.5)).unwrap();
    let second = rig.set_breath(mk_breath(0.25)).unwrap();
    assert_ne!(first, second);

    let data: PoseData = fixtures::poses::load("arms").unwrap();
    rig.set_pose(Some(Pose::from_data(&data, &mut table, &PoseConfig::default())));
    let arm_b = table.part("PartArmB").unwrap();
    table.set_part_target_opacity(&arm_b, 1.0);
    let arm_a = table.part("PartArmA").unwrap();
    table.set_part_target_opacity(&arm_a, 0.0);

    rig.update(&mut table, 0.25).unwrap();
    let effect = rig.manager(MotionChannel::Effect);
    assert_eq!(effect.len(), 1);
    assert!(effect.entry(second).is_some());
    approx(table.opacity("PartArmB").unwrap(), 0.5, 1e-6);
    assert!(rig.pose().is_some());
    assert!(!rig.all_finished());
}
