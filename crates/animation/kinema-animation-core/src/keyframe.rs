//! Keyframe variants.
//!
//! A track interpolates with exactly one [`AnimationKind`], and every keyframe it
//! owns carries the matching [`Keyframe`] variant. All consumers dispatch with a
//! single `match` so a new kind cannot be silently skipped.
//!
//! Times are seconds on the owning slide's timeline. Bezier tangents are stored
//! as absolute (time, value) positions, not offsets from the keyframe.

use serde::{Deserialize, Serialize};

/// Ease percentage applied to newly created ease-in/ease-out keyframes.
pub const DEFAULT_EASE_PERCENT: f32 = 100.0;

/// Interpolation kind of a track.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    Linear,
    Bezier,
    EaseInOut,
}

/// Absolute control point of a bezier keyframe.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tangent {
    pub time: f32,
    pub value: f32,
}

impl Tangent {
    #[inline]
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearKeyframe {
    pub time: f32,
    pub value: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BezierKeyframe {
    pub time: f32,
    pub value: f32,
    /// Control point arriving at this keyframe (left side).
    pub in_tangent: Tangent,
    /// Control point leaving this keyframe (right side).
    pub out_tangent: Tangent,
}

/// Keyframe smoothed by ease percentages in [0, 100].
/// 0 leaves the curve unsmoothed, 100 gives the widest flat tangent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EaseInOutKeyframe {
    pub time: f32,
    pub value: f32,
    pub ease_in: f32,
    pub ease_out: f32,
}

impl EaseInOutKeyframe {
    /// Synthesize the equivalent bezier keyframe given the times of the
    /// neighbouring keyframes. Tangents are flat (value equals the keyframe's
    /// value) and reach at most halfway to the neighbour; a missing neighbour
    /// collapses that side onto the keyframe itself.
    pub fn to_bezier(&self, prev_time: Option<f32>, next_time: Option<f32>) -> BezierKeyframe {
        let in_time = match prev_time {
            Some(prev) => self.time - ease_offset(self.ease_in, self.time - prev),
            None => self.time,
        };
        let out_time = match next_time {
            Some(next) => self.time + ease_offset(self.ease_out, next - self.time),
            None => self.time,
        };
        BezierKeyframe {
            time: self.time,
            value: self.value,
            in_tangent: Tangent::new(in_time, self.value),
            out_tangent: Tangent::new(out_time, self.value),
        }
    }
}

#[inline]
fn ease_offset(percent: f32, span: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0) * 0.5 * span.abs()
}

/// One timed sample on a track.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Keyframe {
    Linear(LinearKeyframe),
    Bezier(BezierKeyframe),
    EaseInOut(EaseInOutKeyframe),
}

impl Keyframe {
    #[inline]
    pub fn linear(time: f32, value: f32) -> Self {
        Keyframe::Linear(LinearKeyframe { time, value })
    }

    #[inline]
    pub fn bezier(time: f32, value: f32, in_tangent: Tangent, out_tangent: Tangent) -> Self {
        Keyframe::Bezier(BezierKeyframe {
            time,
            value,
            in_tangent,
            out_tangent,
        })
    }

    #[inline]
    pub fn ease_in_out(time: f32, value: f32, ease_in: f32, ease_out: f32) -> Self {
        Keyframe::EaseInOut(EaseInOutKeyframe {
            time,
            value,
            ease_in,
            ease_out,
        })
    }

    /// Default keyframe of the given kind. Bezier tangents collapse onto the
    /// keyframe; ease keyframes use [`DEFAULT_EASE_PERCENT`].
    pub fn new(kind: AnimationKind, time: f32, value: f32) -> Self {
        Self::new_with_ease(kind, time, value, DEFAULT_EASE_PERCENT, DEFAULT_EASE_PERCENT)
    }

    /// Like [`Keyframe::new`] with explicit ease percentages (ignored by
    /// non-ease kinds).
    pub fn new_with_ease(
        kind: AnimationKind,
        time: f32,
        value: f32,
        ease_in: f32,
        ease_out: f32,
    ) -> Self {
        match kind {
            AnimationKind::Linear => Self::linear(time, value),
            AnimationKind::Bezier => {
                let point = Tangent::new(time, value);
                Self::bezier(time, value, point, point)
            }
            AnimationKind::EaseInOut => Self::ease_in_out(time, value, ease_in, ease_out),
        }
    }

    #[inline]
    pub fn kind(&self) -> AnimationKind {
        match self {
            Keyframe::Linear(_) => AnimationKind::Linear,
            Keyframe::Bezier(_) => AnimationKind::Bezier,
            Keyframe::EaseInOut(_) => AnimationKind::EaseInOut,
        }
    }

    #[inline]
    pub fn time(&self) -> f32 {
        match self {
            Keyframe::Linear(k) => k.time,
            Keyframe::Bezier(k) => k.time,
            Keyframe::EaseInOut(k) => k.time,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        match self {
            Keyframe::Linear(k) => k.value,
            Keyframe::Bezier(k) => k.value,
            Keyframe::EaseInOut(k) => k.value,
        }
    }

    /// Move the keyframe in time. Bezier tangents travel with it.
    pub fn set_time(&mut self, time: f32) {
        match self {
            Keyframe::Linear(k) => k.time = time,
            Keyframe::Bezier(k) => {
                let delta = time - k.time;
                k.time = time;
                k.in_tangent.time += delta;
                k.out_tangent.time += delta;
            }
            Keyframe::EaseInOut(k) => k.time = time,
        }
    }

    /// Change the keyframe value. Bezier tangents shift by the same amount.
    pub fn set_value(&mut self, value: f32) {
        match self {
            Keyframe::Linear(k) => k.value = value,
            Keyframe::Bezier(k) => {
                let delta = value - k.value;
                k.value = value;
                k.in_tangent.value += delta;
                k.out_tangent.value += delta;
            }
            Keyframe::EaseInOut(k) => k.value = value,
        }
    }

    #[inline]
    pub fn with_time(mut self, time: f32) -> Self {
        self.set_time(time);
        self
    }
}
