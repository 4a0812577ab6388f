use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kinema_animation_core::{
    AnimationCore, AnimationHandle, AnimationKind, InstanceId, Keyframe, PropertyId, SlideId,
    Tangent,
};

const KEYS: usize = 256;

fn build(kind: AnimationKind) -> (AnimationCore, AnimationHandle) {
    let mut core = AnimationCore::default();
    let anim = core
        .create_animation(SlideId(1), InstanceId(1), PropertyId(1), 0, kind, false)
        .expect("fresh core");
    for i in 0..KEYS {
        let t = i as f32 * 0.5;
        let v = (i as f32 * 0.37).sin() * 10.0;
        let key = match kind {
            AnimationKind::Bezier => Keyframe::bezier(
                t,
                v,
                Tangent::new(t - 0.15, v + 1.0),
                Tangent::new(t + 0.15, v - 1.0),
            ),
            _ => Keyframe::new(kind, t, v),
        };
        core.insert_keyframe(anim, key).expect("matching kind");
    }
    (core, anim)
}

fn bench_evaluate(c: &mut Criterion) {
    for kind in [
        AnimationKind::Linear,
        AnimationKind::Bezier,
        AnimationKind::EaseInOut,
    ] {
        let (core, anim) = build(kind);
        let end = KEYS as f32 * 0.5;
        c.bench_function(&format!("evaluate_{kind:?}_{KEYS}_keys"), |b| {
            let mut t = 0.0f32;
            b.iter(|| {
                t = (t + 0.013) % end;
                black_box(core.evaluate_animation(anim, black_box(t)).unwrap())
            })
        });
    }
}

fn bench_extrema(c: &mut Criterion) {
    let (core, anim) = build(AnimationKind::Bezier);
    c.bench_function("extrema_bezier_full_range", |b| {
        b.iter(|| black_box(core.get_animation_extrema(anim, None, None).unwrap()))
    });
}

criterion_group!(benches, bench_evaluate, bench_extrema);
criterion_main!(benches);
