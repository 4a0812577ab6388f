//! AnimationCore: ownership of tracks and keyframes, CRUD, evaluation and extrema.
//!
//! Methods:
//! - tracks: create_animation, delete_animation, get_animation, copy_animations
//! - keyframes: insert_keyframe, erase_keyframe, delete_all_keyframes, set/get_keyframe_data
//! - queries: get_keyframes (sorted on demand), evaluate_animation, get_animation_extrema

use std::cell::{Ref, RefCell};

use log::{debug, trace};

use crate::config::Config;
use crate::cubic::{cubic_bezier, CubicPolynomial};
use crate::error::AnimationError;
use crate::ids::{InstanceId, PropertyId, SlideId};
use crate::keyframe::{AnimationKind, BezierKeyframe, Keyframe};
use crate::lookup::LookupCache;
use crate::store::{AnimationHandle, HandleStore, KeyframeHandle, KeyframeRecord};
use crate::track::{AnimationInfo, AnimationSnapshot, AnimationTrack};
use crate::Result;

/// Owner of every track and keyframe.
#[derive(Debug)]
pub struct AnimationCore {
    cfg: Config,
    store: HandleStore,
    /// Rebuilt from `store` on first use after being emptied.
    lookup: RefCell<LookupCache>,
}

impl Default for AnimationCore {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimationCore {
    pub fn new(cfg: Config) -> Self {
        Self {
            store: HandleStore::with_capacity(cfg.initial_capacity),
            lookup: RefCell::new(LookupCache::default()),
            cfg,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ---------------------------------------------------------------------
    // Tracks
    // ---------------------------------------------------------------------

    /// Create an empty track for (slide, instance, property, channel).
    pub fn create_animation(
        &mut self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
        kind: AnimationKind,
        first_keyframe_dynamic: bool,
    ) -> Result<AnimationHandle> {
        if self
            .get_animation(slide, instance, property, channel)
            .is_some()
        {
            return Err(AnimationError::AnimationExists {
                slide,
                instance,
                property,
                channel,
            });
        }
        let mut info = AnimationInfo::new(slide, instance, property, channel, kind);
        info.first_keyframe_dynamic = first_keyframe_dynamic;

        // get_animation above guarantees the index is populated, so the
        // incremental insert below cannot be lost to a later rebuild.
        let handle = self.store.insert_animation(AnimationTrack::new(info));
        self.lookup.get_mut().insert(slide, instance, handle);
        debug!(
            "created {kind:?} animation {handle:?} for {slide} {instance} {property} channel {channel}"
        );
        Ok(handle)
    }

    /// Destroy a track and every keyframe it owns.
    pub fn delete_animation(&mut self, animation: AnimationHandle) -> Result<()> {
        let keyframes = self.store.animation_mut(animation)?.take_keyframes();
        for key in keyframes {
            self.store.remove_keyframe(key)?;
        }
        let track = self.store.remove_animation(animation)?;
        self.lookup
            .get_mut()
            .remove(track.info.slide, track.info.instance, animation);
        debug!("deleted animation {animation:?}");
        Ok(())
    }

    /// Find the live track for (slide, instance, property, channel).
    pub fn get_animation(
        &self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
    ) -> Option<AnimationHandle> {
        self.ensure_lookup();
        let lookup = self.lookup.borrow();
        lookup
            .bucket(slide, instance)
            .iter()
            .copied()
            .find(|handle| {
                self.store
                    .animation(*handle)
                    .map(|track| track.info.matches(property, channel))
                    .unwrap_or(false)
            })
    }

    pub fn get_animation_info(&self, animation: AnimationHandle) -> Result<AnimationInfo> {
        Ok(self.store.animation(animation)?.info)
    }

    /// Every live track, in store order.
    pub fn get_animations(&self) -> Vec<AnimationHandle> {
        self.store.animations().map(|(handle, _)| handle).collect()
    }

    /// Tracks attached to one instance on one slide.
    pub fn get_animations_for(&self, slide: SlideId, instance: InstanceId) -> Vec<AnimationHandle> {
        self.ensure_lookup();
        self.lookup.borrow().bucket(slide, instance).to_vec()
    }

    #[inline]
    pub fn animation_exists(&self, animation: AnimationHandle) -> bool {
        self.store.animation(animation).is_ok()
    }

    pub fn set_first_keyframe_dynamic(
        &mut self,
        animation: AnimationHandle,
        value: bool,
    ) -> Result<()> {
        self.store.animation_mut(animation)?.info.first_keyframe_dynamic = value;
        Ok(())
    }

    pub fn is_artist_edited(&self, animation: AnimationHandle) -> Result<bool> {
        Ok(self.store.animation(animation)?.info.artist_edited)
    }

    pub fn set_is_artist_edited(&mut self, animation: AnimationHandle, value: bool) -> Result<()> {
        self.store.animation_mut(animation)?.info.artist_edited = value;
        Ok(())
    }

    /// Duplicate every track of (src_slide, src_instance) onto
    /// (dst_slide, dst_instance), keyframes included. Stops at the first
    /// destination that already has a track.
    pub fn copy_animations(
        &mut self,
        src_slide: SlideId,
        src_instance: InstanceId,
        dst_slide: SlideId,
        dst_instance: InstanceId,
    ) -> Result<Vec<AnimationHandle>> {
        let sources = self.get_animations_for(src_slide, src_instance);
        let mut created = Vec::with_capacity(sources.len());
        for source in sources {
            let mut snapshot = self.snapshot_animation(source)?;
            snapshot.info.slide = dst_slide;
            snapshot.info.instance = dst_instance;
            created.push(self.restore_animation(&snapshot)?);
        }
        debug!(
            "copied {} animations from {src_slide} {src_instance} to {dst_slide} {dst_instance}",
            created.len()
        );
        Ok(created)
    }

    /// Shift every keyframe of an instance's tracks in time. Not supported.
    pub fn offset_animations(
        &mut self,
        _slide: SlideId,
        _instance: InstanceId,
        _offset: f32,
    ) -> Result<()> {
        Err(AnimationError::NotImplemented {
            operation: "offset_animations",
        })
    }

    /// Capture a track's info and its keyframes in time order.
    pub fn snapshot_animation(&self, animation: AnimationHandle) -> Result<AnimationSnapshot> {
        let track = self.store.animation(animation)?;
        let handles = self.sorted_handles(track);
        let keyframes = handles
            .iter()
            .map(|key| self.keyframe_data(*key))
            .collect::<Result<Vec<_>>>()?;
        Ok(AnimationSnapshot {
            info: track.info,
            keyframes,
        })
    }

    /// Recreate a track from a snapshot: same kind, flags and keyframes.
    pub fn restore_animation(&mut self, snapshot: &AnimationSnapshot) -> Result<AnimationHandle> {
        let info = snapshot.info;
        let handle = self.create_animation(
            info.slide,
            info.instance,
            info.property,
            info.channel,
            info.kind,
            info.first_keyframe_dynamic,
        )?;
        for keyframe in &snapshot.keyframes {
            if let Err(err) = self.insert_keyframe(handle, *keyframe) {
                self.delete_animation(handle)?;
                return Err(err);
            }
        }
        // insert_keyframe marks the track edited; keep the captured flag instead.
        self.set_is_artist_edited(handle, info.artist_edited)?;
        Ok(handle)
    }

    /// Remove every track and keyframe.
    pub fn clear(&mut self) {
        self.store.clear();
        self.lookup.get_mut().clear();
        debug!("cleared animation core");
    }

    /// Drop the (slide, instance) index. The next lookup rebuilds it from the store.
    pub fn clear_lookup_cache(&self) {
        self.lookup.borrow_mut().clear();
    }

    // ---------------------------------------------------------------------
    // Keyframes
    // ---------------------------------------------------------------------

    pub fn insert_keyframe(
        &mut self,
        animation: AnimationHandle,
        keyframe: Keyframe,
    ) -> Result<KeyframeHandle> {
        let kind = self.store.animation(animation)?.info.kind;
        check_kind(kind, &keyframe)?;

        let handle = self.store.insert_keyframe(KeyframeRecord {
            animation,
            data: keyframe,
        });
        let track = self.store.animation_mut(animation)?;
        if let Err(err) = track.push_keyframe(handle) {
            self.store.remove_keyframe(handle)?;
            return Err(err);
        }
        track.info.artist_edited = true;
        trace!(
            "inserted keyframe {handle:?} at {} into {animation:?}",
            keyframe.time()
        );
        Ok(handle)
    }

    pub fn erase_keyframe(&mut self, keyframe: KeyframeHandle) -> Result<()> {
        let record = self.store.remove_keyframe(keyframe)?;
        let track = self.store.animation_mut(record.animation)?;
        track.remove_keyframe(keyframe);
        track.info.artist_edited = true;
        Ok(())
    }

    pub fn delete_all_keyframes(&mut self, animation: AnimationHandle) -> Result<()> {
        let track = self.store.animation_mut(animation)?;
        let keyframes = track.take_keyframes();
        track.info.artist_edited = true;
        for key in keyframes {
            self.store.remove_keyframe(key)?;
        }
        Ok(())
    }

    pub fn get_keyframe_data(&self, keyframe: KeyframeHandle) -> Result<Keyframe> {
        self.keyframe_data(keyframe)
    }

    /// Replace a keyframe's data. The variant must still match the track.
    pub fn set_keyframe_data(&mut self, keyframe: KeyframeHandle, data: Keyframe) -> Result<()> {
        let animation = self.store.keyframe(keyframe)?.animation;
        let track = self.store.animation_mut(animation)?;
        check_kind(track.info.kind, &data)?;
        track.mark_dirty();
        self.store.keyframe_mut(keyframe)?.data = data;
        Ok(())
    }

    /// Track owning a keyframe.
    pub fn get_keyframe_animation(&self, keyframe: KeyframeHandle) -> Result<AnimationHandle> {
        Ok(self.store.keyframe(keyframe)?.animation)
    }

    #[inline]
    pub fn keyframe_exists(&self, keyframe: KeyframeHandle) -> bool {
        self.store.keyframe(keyframe).is_ok()
    }

    /// Keyframe handles in time order.
    pub fn get_keyframes(&self, animation: AnimationHandle) -> Result<Vec<KeyframeHandle>> {
        let track = self.store.animation(animation)?;
        Ok(self.sorted_handles(track).to_vec())
    }

    pub fn get_keyframe_count(&self, animation: AnimationHandle) -> Result<usize> {
        Ok(self.store.animation(animation)?.keyframe_count())
    }

    pub fn is_first_keyframe(&self, keyframe: KeyframeHandle) -> Result<bool> {
        let track = self.store.animation(self.store.keyframe(keyframe)?.animation)?;
        Ok(self.sorted_handles(track).first() == Some(&keyframe))
    }

    pub fn is_last_keyframe(&self, keyframe: KeyframeHandle) -> Result<bool> {
        let track = self.store.animation(self.store.keyframe(keyframe)?.animation)?;
        Ok(self.sorted_handles(track).last() == Some(&keyframe))
    }

    // ---------------------------------------------------------------------
    // Evaluation
    // ---------------------------------------------------------------------

    /// Value of the track at `time` (seconds). Empty tracks evaluate to 0 and
    /// times outside the keyed range hold the boundary value.
    pub fn evaluate_animation(&self, animation: AnimationHandle, time: f32) -> Result<f32> {
        self.evaluate_with(animation, time, None)
    }

    /// Like [`evaluate_animation`](Self::evaluate_animation), but when the track's
    /// first keyframe is dynamic its value is replaced by `start_value`.
    pub fn evaluate_animation_with_dynamic_start(
        &self,
        animation: AnimationHandle,
        time: f32,
        start_value: f32,
    ) -> Result<f32> {
        let dynamic = self.store.animation(animation)?.info.first_keyframe_dynamic;
        self.evaluate_with(animation, time, dynamic.then_some(start_value))
    }

    fn evaluate_with(
        &self,
        animation: AnimationHandle,
        time: f32,
        first_value: Option<f32>,
    ) -> Result<f32> {
        let track = self.store.animation(animation)?;
        if time.is_nan() {
            return Err(AnimationError::AnimationEvaluationError {
                reason: format!("cannot sample {animation:?} at NaN time"),
            });
        }
        let handles = self.sorted_handles(track);
        let key_at = |idx: usize| -> Result<Keyframe> {
            let mut key = self.keyframe_data(handles[idx])?;
            if let (0, Some(value)) = (idx, first_value) {
                key.set_value(value);
            }
            Ok(key)
        };
        if handles.is_empty() {
            return Ok(0.0);
        }
        let first = key_at(0)?;
        let last = key_at(handles.len() - 1)?;
        if time <= first.time() {
            return Ok(first.value());
        }
        if time >= last.time() {
            return Ok(last.value());
        }

        // First keyframe at or after `time`; bounded to 1..len-1 by the checks above.
        let right_idx = handles.partition_point(|key| self.keyframe_time(*key) < time);
        let left_idx = right_idx - 1;
        let left = key_at(left_idx)?;
        let right = key_at(right_idx)?;
        if time == right.time() {
            return Ok(right.value());
        }

        match (track.info.kind, left, right) {
            (AnimationKind::Linear, Keyframe::Linear(a), Keyframe::Linear(b)) => {
                let span = b.time - a.time;
                if span <= 0.0 {
                    return Ok(b.value);
                }
                Ok(a.value + (b.value - a.value) * ((time - a.time) / span))
            }
            (AnimationKind::Bezier, Keyframe::Bezier(a), Keyframe::Bezier(b)) => {
                Ok(evaluate_bezier_segment(&a, &b, time))
            }
            (AnimationKind::EaseInOut, Keyframe::EaseInOut(a), Keyframe::EaseInOut(b)) => {
                let prev_time = left_idx
                    .checked_sub(1)
                    .map(|i| self.keyframe_time(handles[i]));
                let next_time = handles
                    .get(right_idx + 1)
                    .map(|key| self.keyframe_time(*key));
                let a = a.to_bezier(prev_time, Some(b.time));
                let b = b.to_bezier(Some(a.time), next_time);
                Ok(evaluate_bezier_segment(&a, &b, time))
            }
            (kind, left, right) => Err(AnimationError::AnimationEvaluationError {
                reason: format!(
                    "{kind:?} track holds {:?}/{:?} keyframes",
                    left.kind(),
                    right.kind()
                ),
            }),
        }
    }

    /// (max, min) of the track over `[start, end]`, or over every keyframe when
    /// either bound is `None`.
    ///
    /// Bezier tracks report the true curve extrema of each segment. Linear and
    /// ease-in/ease-out tracks report the extreme keyframe values; this is exact
    /// for linear tracks but only approximates ease curves, whose flat tangents
    /// can overshoot between keys.
    pub fn get_animation_extrema(
        &self,
        animation: AnimationHandle,
        start: Option<f32>,
        end: Option<f32>,
    ) -> Result<(f32, f32)> {
        let track = self.store.animation(animation)?;
        let handles = self.sorted_handles(track);
        if handles.is_empty() {
            return Ok((0.0, 0.0));
        }
        let last = handles.len() - 1;
        let (lo, hi) = match (start, end) {
            (Some(start), Some(end)) => {
                let (start, end) = if start <= end { (start, end) } else { (end, start) };
                // Include the keyframes bracketing each bound so partially
                // covered segments count.
                let lo = handles
                    .partition_point(|key| self.keyframe_time(*key) <= start)
                    .saturating_sub(1);
                let hi = handles
                    .partition_point(|key| self.keyframe_time(*key) < end)
                    .min(last);
                (lo, hi.max(lo))
            }
            _ => (0, last),
        };

        let keys = handles[lo..=hi]
            .iter()
            .map(|key| self.keyframe_data(*key))
            .collect::<Result<Vec<_>>>()?;

        let mut max = f32::MIN;
        let mut min = f32::MAX;
        for key in &keys {
            max = max.max(key.value());
            min = min.min(key.value());
        }
        if track.info.kind == AnimationKind::Bezier {
            for pair in keys.windows(2) {
                if let (Keyframe::Bezier(a), Keyframe::Bezier(b)) = (pair[0], pair[1]) {
                    let curve = CubicPolynomial::from_bezier(
                        a.value,
                        a.out_tangent.value,
                        b.in_tangent.value,
                        b.value,
                    );
                    let (seg_max, seg_min) = curve.unit_extrema();
                    max = max.max(seg_max);
                    min = min.min(seg_min);
                }
            }
        }
        Ok((max, min))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn keyframe_data(&self, keyframe: KeyframeHandle) -> Result<Keyframe> {
        Ok(self.store.keyframe(keyframe)?.data)
    }

    /// Time of a keyframe referenced by a live track. Track lists only hold
    /// live handles, so the fallback is never observed.
    fn keyframe_time(&self, keyframe: KeyframeHandle) -> f32 {
        self.store
            .keyframe(keyframe)
            .map(|record| record.data.time())
            .unwrap_or(f32::INFINITY)
    }

    /// Stable-sort the track's keyframes by time if anything moved since the
    /// last sort.
    fn sorted_handles<'a>(&self, track: &'a AnimationTrack) -> Ref<'a, Vec<KeyframeHandle>> {
        {
            let mut list = track.keyframes.borrow_mut();
            if list.dirty {
                let mut keyed: Vec<(f32, KeyframeHandle)> = list
                    .handles
                    .iter()
                    .map(|key| (self.keyframe_time(*key), *key))
                    .collect();
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
                list.handles = keyed.into_iter().map(|(_, key)| key).collect();
                list.dirty = false;
            }
        }
        Ref::map(track.keyframes.borrow(), |list| &list.handles)
    }

    fn ensure_lookup(&self) {
        let needs_rebuild = self.lookup.borrow().is_empty();
        if !needs_rebuild {
            return;
        }
        let mut lookup = self.lookup.borrow_mut();
        let mut count = 0usize;
        for (handle, track) in self.store.animations() {
            lookup.insert(track.info.slide, track.info.instance, handle);
            count += 1;
        }
        if count > 0 {
            debug!("rebuilt animation lookup cache with {count} tracks");
        }
    }
}

fn check_kind(expected: AnimationKind, keyframe: &Keyframe) -> Result<()> {
    let actual = keyframe.kind();
    if actual != expected {
        return Err(AnimationError::AnimationKeyframeTypeError { expected, actual });
    }
    Ok(())
}

/// Solve the time cubic for the curve parameter at `time`, then evaluate the
/// value cubic at that parameter.
fn evaluate_bezier_segment(a: &BezierKeyframe, b: &BezierKeyframe, time: f32) -> f32 {
    let time_curve = CubicPolynomial::from_bezier(
        a.time - time,
        a.out_tangent.time - time,
        b.in_tangent.time - time,
        b.time - time,
    );
    let s = time_curve
        .roots()
        .in_unit_interval()
        .next()
        .unwrap_or_else(|| {
            // Tangents that fold back in time have no root in range; fall
            // back to the linear parameter.
            let span = b.time - a.time;
            if span > 0.0 {
                ((time - a.time) / span).clamp(0.0, 1.0)
            } else {
                1.0
            }
        });
    cubic_bezier(a.value, a.out_tangent.value, b.in_tangent.value, b.value, s)
}
