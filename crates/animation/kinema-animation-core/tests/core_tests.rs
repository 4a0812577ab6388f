use kinema_animation_core::{
    AnimationCore, AnimationError, AnimationHandle, AnimationKind, AnimationSnapshot, Config,
    InstanceId, Keyframe, PropertyId, SlideId, Tangent,
};

const S: SlideId = SlideId(1);
const I: InstanceId = InstanceId(10);
const P: PropertyId = PropertyId(100);

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn mk_linear(core: &mut AnimationCore, keys: &[(f32, f32)]) -> AnimationHandle {
    let anim = core
        .create_animation(S, I, P, 0, AnimationKind::Linear, false)
        .unwrap();
    for (t, v) in keys {
        core.insert_keyframe(anim, Keyframe::linear(*t, *v)).unwrap();
    }
    anim
}

fn load_fixture(core: &mut AnimationCore, name: &str) -> Vec<AnimationHandle> {
    let snapshots: Vec<AnimationSnapshot> =
        kinema_test_fixtures::animations::load(name).expect("fixture should load");
    snapshots
        .iter()
        .map(|s| core.restore_animation(s).unwrap())
        .collect()
}

#[test]
fn empty_track_evaluates_to_zero() {
    let mut core = AnimationCore::default();
    let anim = core
        .create_animation(S, I, P, 0, AnimationKind::Bezier, false)
        .unwrap();
    assert_eq!(core.evaluate_animation(anim, 3.0).unwrap(), 0.0);
    assert_eq!(core.get_animation_extrema(anim, None, None).unwrap(), (0.0, 0.0));
}

#[test]
fn linear_interpolation_is_affine_and_clamped() {
    let mut core = AnimationCore::new(Config::default());
    let anim = mk_linear(&mut core, &[(1.0, -3.0), (3.5, 7.0)]);

    for i in 1..50 {
        let t = 1.0 + 2.5 * (i as f32 / 50.0);
        let expected = -3.0 + 10.0 * (t - 1.0) / 2.5;
        approx(core.evaluate_animation(anim, t).unwrap(), expected, 1e-5);
    }
    assert_eq!(core.evaluate_animation(anim, 1.0).unwrap(), -3.0);
    assert_eq!(core.evaluate_animation(anim, 3.5).unwrap(), 7.0);
    assert_eq!(core.evaluate_animation(anim, -10.0).unwrap(), -3.0);
    assert_eq!(core.evaluate_animation(anim, 99.0).unwrap(), 7.0);
}

#[test]
fn linear_ramp_scenario() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 0.0), (2.0, 10.0), (4.0, 0.0)]);

    approx(core.evaluate_animation(anim, 1.0).unwrap(), 5.0, 1e-5);
    approx(core.evaluate_animation(anim, 3.0).unwrap(), 5.0, 1e-5);
    assert_eq!(
        core.get_animation_extrema(anim, None, None).unwrap(),
        (10.0, 0.0)
    );
}

#[test]
fn keyframes_inserted_out_of_order_are_sorted_on_demand() {
    let mut core = AnimationCore::default();
    let anim = core
        .create_animation(S, I, P, 0, AnimationKind::Linear, false)
        .unwrap();
    let late = core.insert_keyframe(anim, Keyframe::linear(4.0, 0.0)).unwrap();
    let early = core.insert_keyframe(anim, Keyframe::linear(0.0, 0.0)).unwrap();
    let mid = core.insert_keyframe(anim, Keyframe::linear(2.0, 10.0)).unwrap();

    assert_eq!(core.get_keyframes(anim).unwrap(), vec![early, mid, late]);
    assert!(core.is_first_keyframe(early).unwrap());
    assert!(core.is_last_keyframe(late).unwrap());
    assert!(!core.is_first_keyframe(mid).unwrap());
    approx(core.evaluate_animation(anim, 1.0).unwrap(), 5.0, 1e-5);

    // Moving a keyframe in time re-sorts the list.
    core.set_keyframe_data(mid, Keyframe::linear(5.0, 10.0)).unwrap();
    assert_eq!(core.get_keyframes(anim).unwrap(), vec![early, late, mid]);
    assert!(core.is_last_keyframe(mid).unwrap());
    assert_eq!(core.get_keyframe_count(anim).unwrap(), 3);
}

#[test]
fn duplicate_create_fails_and_keeps_original() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 1.0)]);

    let err = core
        .create_animation(S, I, P, 0, AnimationKind::Bezier, true)
        .unwrap_err();
    assert_eq!(
        err,
        AnimationError::AnimationExists {
            slide: S,
            instance: I,
            property: P,
            channel: 0,
        }
    );

    assert_eq!(core.get_animation(S, I, P, 0), Some(anim));
    let info = core.get_animation_info(anim).unwrap();
    assert_eq!(info.kind, AnimationKind::Linear);
    assert!(!info.first_keyframe_dynamic);
    assert_eq!(core.get_keyframe_count(anim).unwrap(), 1);

    // Other channels of the same property are free.
    assert!(core
        .create_animation(S, I, P, 1, AnimationKind::Linear, false)
        .is_ok());
}

#[test]
fn mismatched_keyframe_is_rejected() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 1.0), (1.0, 2.0)]);
    let before = core.get_keyframes(anim).unwrap();

    let err = core
        .insert_keyframe(anim, Keyframe::ease_in_out(0.5, 3.0, 100.0, 100.0))
        .unwrap_err();
    assert_eq!(
        err,
        AnimationError::AnimationKeyframeTypeError {
            expected: AnimationKind::Linear,
            actual: AnimationKind::EaseInOut,
        }
    );
    assert_eq!(core.get_keyframes(anim).unwrap(), before);

    let err = core
        .set_keyframe_data(before[0], Keyframe::new(AnimationKind::Bezier, 0.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, AnimationError::AnimationKeyframeTypeError { .. }));
    assert_eq!(core.get_keyframe_data(before[0]).unwrap(), Keyframe::linear(0.0, 1.0));
}

#[test]
fn delete_animation_invalidates_track_and_keyframes() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 1.0), (1.0, 2.0)]);
    let keys = core.get_keyframes(anim).unwrap();

    core.delete_animation(anim).unwrap();

    assert_eq!(core.get_animation(S, I, P, 0), None);
    assert!(!core.animation_exists(anim));
    for key in keys {
        assert!(!core.keyframe_exists(key));
        assert!(matches!(
            core.get_keyframe_data(key),
            Err(AnimationError::InvalidHandle { .. })
        ));
    }
    assert!(core.evaluate_animation(anim, 0.0).is_err());
    assert!(core.delete_animation(anim).is_err());
    assert!(core.get_animations().is_empty());
}

#[test]
fn erase_and_delete_all_mark_artist_edited() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
    let keys = core.get_keyframes(anim).unwrap();

    core.set_is_artist_edited(anim, false).unwrap();
    core.erase_keyframe(keys[1]).unwrap();
    assert!(core.is_artist_edited(anim).unwrap());
    assert_eq!(core.get_keyframes(anim).unwrap(), vec![keys[0], keys[2]]);
    assert_eq!(core.get_keyframe_animation(keys[0]).unwrap(), anim);

    core.set_is_artist_edited(anim, false).unwrap();
    core.delete_all_keyframes(anim).unwrap();
    assert!(core.is_artist_edited(anim).unwrap());
    assert_eq!(core.get_keyframe_count(anim).unwrap(), 0);
    assert!(!core.keyframe_exists(keys[0]));
    // Track itself survives.
    assert_eq!(core.get_animation(S, I, P, 0), Some(anim));
}

#[test]
fn bezier_evaluation_hits_keyframe_values_exactly() {
    let mut core = AnimationCore::default();
    let anim = core
        .create_animation(S, I, P, 0, AnimationKind::Bezier, false)
        .unwrap();
    core.insert_keyframe(
        anim,
        Keyframe::bezier(0.0, 1.0, Tangent::new(-0.5, 9.0), Tangent::new(0.7, -4.0)),
    )
    .unwrap();
    core.insert_keyframe(
        anim,
        Keyframe::bezier(1.3, 2.75, Tangent::new(0.9, 40.0), Tangent::new(1.6, -12.0)),
    )
    .unwrap();
    core.insert_keyframe(
        anim,
        Keyframe::bezier(2.0, -1.0, Tangent::new(1.9, 3.0), Tangent::new(2.0, -1.0)),
    )
    .unwrap();

    assert_eq!(core.evaluate_animation(anim, 0.0).unwrap(), 1.0);
    assert_eq!(core.evaluate_animation(anim, 1.3).unwrap(), 2.75);
    assert_eq!(core.evaluate_animation(anim, 2.0).unwrap(), -1.0);
}

#[test]
fn bezier_fixture_overshoots_between_keys() {
    let mut core = AnimationCore::default();
    let anim = load_fixture(&mut core, "bezier-overshoot")[0];

    approx(core.evaluate_animation(anim, 1.5).unwrap(), 7.5, 1e-4);
    let (max, min) = core.get_animation_extrema(anim, None, None).unwrap();
    approx(max, 7.5, 1e-4);
    approx(min, 0.0, 1e-6);
    // Fixture omits artistEdited; restoring keeps the captured flag.
    assert!(!core.is_artist_edited(anim).unwrap());
}

#[test]
fn bezier_with_third_point_tangents_is_linear() {
    let mut core = AnimationCore::default();
    let anim = core
        .create_animation(S, I, P, 0, AnimationKind::Bezier, false)
        .unwrap();
    core.insert_keyframe(
        anim,
        Keyframe::bezier(0.0, 0.0, Tangent::new(0.0, 0.0), Tangent::new(1.0, 3.0)),
    )
    .unwrap();
    core.insert_keyframe(
        anim,
        Keyframe::bezier(3.0, 9.0, Tangent::new(2.0, 6.0), Tangent::new(3.0, 9.0)),
    )
    .unwrap();

    for i in 1..30 {
        let t = 3.0 * i as f32 / 30.0;
        approx(core.evaluate_animation(anim, t).unwrap(), 3.0 * t, 1e-4);
    }
}

#[test]
fn ease_in_out_fixture_evaluates_smoothly() {
    let mut core = AnimationCore::default();
    let tracks = load_fixture(&mut core, "ease-position");
    assert_eq!(tracks.len(), 3);

    let x = core.get_animation(S, I, P, 0).unwrap();
    assert_eq!(core.evaluate_animation(x, 2.0).unwrap(), 10.0);
    // Symmetric flat tangents put the midpoint halfway.
    approx(core.evaluate_animation(x, 1.0).unwrap(), 5.0, 1e-4);
    // Flat tangents: slow start, so early samples trail the linear ramp.
    assert!(core.evaluate_animation(x, 0.25).unwrap() < 1.25);
    // Known approximation: keyframe values only.
    assert_eq!(core.get_animation_extrema(x, None, None).unwrap(), (10.0, 0.0));

    let y = core.get_animation(S, I, P, 1).unwrap();
    approx(core.evaluate_animation(y, 2.0).unwrap(), 5.0, 1e-5);

    let z = core.get_animation(S, I, P, 2).unwrap();
    assert_eq!(core.evaluate_animation(z, 0.0).unwrap(), -2.0);
    assert_eq!(core.evaluate_animation(z, 5.0).unwrap(), -2.0);
}

#[test]
fn extrema_respects_time_window() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(
        &mut core,
        &[(0.0, 0.0), (1.0, 4.0), (2.0, -6.0), (3.0, 1.0), (4.0, 20.0)],
    );
    // Window [1.5, 2.5] touches segments 1-2 and 2-3.
    assert_eq!(
        core.get_animation_extrema(anim, Some(1.5), Some(2.5)).unwrap(),
        (4.0, -6.0)
    );
    // Reversed bounds are normalized.
    assert_eq!(
        core.get_animation_extrema(anim, Some(2.5), Some(1.5)).unwrap(),
        (4.0, -6.0)
    );
    // Missing bound means the whole track.
    assert_eq!(
        core.get_animation_extrema(anim, Some(1.5), None).unwrap(),
        (20.0, -6.0)
    );
}

#[test]
fn lookup_cache_rebuilds_after_being_dropped() {
    let mut core = AnimationCore::default();
    load_fixture(&mut core, "ease-position");
    let before: Vec<_> = (0..3).map(|c| core.get_animation(S, I, P, c)).collect();

    core.clear_lookup_cache();
    let after: Vec<_> = (0..3).map(|c| core.get_animation(S, I, P, c)).collect();
    assert_eq!(before, after);

    // Incremental updates still apply after a rebuild.
    core.clear_lookup_cache();
    let extra = core
        .create_animation(S, I, PropertyId(5), 0, AnimationKind::Linear, false)
        .unwrap();
    assert_eq!(core.get_animation(S, I, PropertyId(5), 0), Some(extra));
    assert_eq!(core.get_animations_for(S, I).len(), 4);
    assert!(core
        .create_animation(S, I, P, 0, AnimationKind::EaseInOut, false)
        .is_err());
}

#[test]
fn clear_removes_everything() {
    let mut core = AnimationCore::default();
    load_fixture(&mut core, "linear-ramp");
    core.clear();
    assert!(core.get_animations().is_empty());
    assert_eq!(core.get_animation(S, I, P, 0), None);
}

#[test]
fn copy_animations_duplicates_tracks_and_keyframes() {
    let mut core = AnimationCore::default();
    load_fixture(&mut core, "ease-position");
    let dst_slide = SlideId(2);
    let dst_instance = InstanceId(11);

    let copies = core.copy_animations(S, I, dst_slide, dst_instance).unwrap();
    assert_eq!(copies.len(), 3);

    for channel in 0..3 {
        let src = core.get_animation(S, I, P, channel).unwrap();
        let dst = core.get_animation(dst_slide, dst_instance, P, channel).unwrap();
        let a = core.snapshot_animation(src).unwrap();
        let b = core.snapshot_animation(dst).unwrap();
        assert_eq!(a.keyframes, b.keyframes);
        assert_eq!(a.info.kind, b.info.kind);
        assert_eq!(b.info.slide, dst_slide);
        assert_eq!(b.info.instance, dst_instance);
    }

    // Copying again collides with the tracks just created.
    assert!(matches!(
        core.copy_animations(S, I, dst_slide, dst_instance),
        Err(AnimationError::AnimationExists { .. })
    ));
}

#[test]
fn snapshot_restore_round_trip_keeps_flags() {
    let mut core = AnimationCore::default();
    let anim = core
        .create_animation(S, I, P, 2, AnimationKind::EaseInOut, true)
        .unwrap();
    core.insert_keyframe(anim, Keyframe::ease_in_out(0.0, 1.0, 20.0, 80.0))
        .unwrap();
    core.insert_keyframe(anim, Keyframe::ease_in_out(1.0, 3.0, 100.0, 0.0))
        .unwrap();
    let snapshot = core.snapshot_animation(anim).unwrap();
    assert!(snapshot.info.first_keyframe_dynamic);
    assert!(snapshot.info.artist_edited);

    core.delete_animation(anim).unwrap();
    let restored = core.restore_animation(&snapshot).unwrap();
    assert_eq!(core.snapshot_animation(restored).unwrap(), snapshot);

    core.set_first_keyframe_dynamic(restored, false).unwrap();
    assert!(!core.get_animation_info(restored).unwrap().first_keyframe_dynamic);
}

#[test]
fn offset_animations_is_not_implemented() {
    let mut core = AnimationCore::default();
    load_fixture(&mut core, "linear-ramp");
    let err = core.offset_animations(S, I, 1.0).unwrap_err();
    assert!(matches!(err, AnimationError::NotImplemented { .. }));
    assert!(!err.is_programmer_error());
}

#[test]
fn dynamic_start_replaces_first_value_only_when_flagged() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 0.0), (2.0, 10.0)]);

    approx(
        core.evaluate_animation_with_dynamic_start(anim, 1.0, 4.0).unwrap(),
        5.0,
        1e-5,
    );

    core.set_first_keyframe_dynamic(anim, true).unwrap();
    approx(
        core.evaluate_animation_with_dynamic_start(anim, 1.0, 4.0).unwrap(),
        7.0,
        1e-5,
    );
    assert_eq!(
        core.evaluate_animation_with_dynamic_start(anim, -1.0, 4.0).unwrap(),
        4.0
    );
    approx(core.evaluate_animation(anim, 1.0).unwrap(), 5.0, 1e-5);
}

#[test]
fn nan_time_is_an_evaluation_error() {
    let mut core = AnimationCore::default();
    let anim = mk_linear(&mut core, &[(0.0, 1.0), (2.0, 3.0)]);

    let err = core.evaluate_animation(anim, f32::NAN).unwrap_err();
    assert!(matches!(err, AnimationError::AnimationEvaluationError { .. }));
    assert!(err.is_programmer_error());
    assert!(core
        .evaluate_animation_with_dynamic_start(anim, f32::NAN, 0.0)
        .is_err());
    approx(core.evaluate_animation(anim, 1.0).unwrap(), 2.0, 1e-5);
}
