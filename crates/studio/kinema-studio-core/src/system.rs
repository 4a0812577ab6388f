//! Editor-facing animation authoring.
//!
//! [`StudioAnimationSystem`] sits between the scene's property values and the
//! [`AnimationCore`]. It keys live values into tracks, overlays animated
//! values onto property reads, and stages edits made to animated properties
//! while auto-keyframing is off. Staging commits go through the injected
//! [`TransactionSink`] so the host can undo them.

use kinema_animation_core::{
    AnimationCore, AnimationHandle, AnimationKind, InstanceId, Keyframe, KeyframeHandle,
    PropertyId, SlideId,
};
use log::{debug, trace, warn};

use crate::collaborators::{NullTransactionSink, PropertySystem, SlideSystem, TransactionSink};
use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::pending::{PendingValue, PendingValueChange, PendingValues, Reversible};
use crate::snapshots::DeanimatedTracks;
use crate::value::PropertyValue;
use crate::Result;

/// Keyframe supplied for one channel of [`StudioAnimationSystem::set_or_create_keyframe`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeyframeInfo {
    pub keyframe: Keyframe,
    /// Mark the track's first keyframe dynamic when this keyframe lands first.
    pub first_keyframe_dynamic: bool,
}

impl KeyframeInfo {
    pub fn new(keyframe: Keyframe) -> Self {
        Self {
            keyframe,
            first_keyframe_dynamic: false,
        }
    }
}

pub struct StudioAnimationSystem<P: PropertySystem, S: SlideSystem> {
    core: AnimationCore,
    properties: P,
    slides: S,
    cfg: StudioConfig,
    pending: PendingValues,
    deanimated: DeanimatedTracks,
    sink: Box<dyn TransactionSink>,
    refresh: Option<Box<dyn FnMut(InstanceId)>>,
}

impl<P: PropertySystem, S: SlideSystem> StudioAnimationSystem<P, S> {
    pub fn new(properties: P, slides: S) -> Self {
        Self::with_config(properties, slides, StudioConfig::default())
    }

    pub fn with_config(properties: P, slides: S, cfg: StudioConfig) -> Self {
        Self::with_core(AnimationCore::default(), properties, slides, cfg)
    }

    pub fn with_core(core: AnimationCore, properties: P, slides: S, cfg: StudioConfig) -> Self {
        Self {
            core,
            properties,
            slides,
            cfg,
            pending: PendingValues::default(),
            deanimated: DeanimatedTracks::default(),
            sink: Box::new(NullTransactionSink),
            refresh: None,
        }
    }

    // ---------------------------------------------------------------------
    // Accessors and settings
    // ---------------------------------------------------------------------

    pub fn core(&self) -> &AnimationCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut AnimationCore {
        &mut self.core
    }

    pub fn property_system(&self) -> &P {
        &self.properties
    }

    pub fn property_system_mut(&mut self) -> &mut P {
        &mut self.properties
    }

    pub fn slide_system(&self) -> &S {
        &self.slides
    }

    pub fn slide_system_mut(&mut self) -> &mut S {
        &mut self.slides
    }

    pub fn config(&self) -> &StudioConfig {
        &self.cfg
    }

    pub fn pending_values(&self) -> &PendingValues {
        &self.pending
    }

    pub fn auto_keyframe(&self) -> bool {
        self.cfg.auto_keyframe
    }

    pub fn set_auto_keyframe(&mut self, on: bool) {
        self.cfg.auto_keyframe = on;
    }

    pub fn smooth_interpolation(&self) -> bool {
        self.cfg.smooth_interpolation
    }

    /// Kind given to tracks created from now on: ease-in/out when on, linear otherwise.
    pub fn set_smooth_interpolation(&mut self, on: bool) {
        self.cfg.smooth_interpolation = on;
    }

    pub fn set_transaction_sink(&mut self, sink: Box<dyn TransactionSink>) {
        self.sink = sink;
    }

    /// Called with each instance whose staged values changed.
    pub fn set_refresh_callback<F>(&mut self, callback: F)
    where
        F: FnMut(InstanceId) + 'static,
    {
        self.refresh = Some(Box::new(callback));
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn is_property_animatable(&self, property: PropertyId) -> bool {
        self.properties.data_type(property).is_animatable()
    }

    /// True when channel 0 of the property has a controlling track.
    pub fn is_property_animated(&self, instance: InstanceId, property: PropertyId) -> bool {
        self.is_property_animatable(property)
            && self
                .get_controlling_animation(instance, property, 0)
                .is_some()
    }

    /// Track driving one channel on the property's applicable slide. A staged
    /// value's track is preferred over a lookup in the core.
    pub fn get_controlling_animation(
        &self,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
    ) -> Option<AnimationHandle> {
        let slide = self.slides.applicable_slide(instance, property)?;
        self.pending
            .find(slide, instance, property, channel)
            .map(|p| p.animation)
            .filter(|h| self.core.animation_exists(*h))
            .or_else(|| self.core.get_animation(slide, instance, property, channel))
    }

    /// Controlling track of every animated channel, in channel order.
    pub fn animated_channels(
        &self,
        instance: InstanceId,
        property: PropertyId,
    ) -> Vec<(usize, AnimationHandle)> {
        let arity = self.properties.data_type(property).arity();
        (0..arity)
            .filter_map(|channel| {
                self.get_controlling_animation(instance, property, channel)
                    .map(|h| (channel, h))
            })
            .collect()
    }

    /// Overlay animated channel values onto `value`. Staged values win over
    /// evaluated tracks; tracks are sampled at the slide's current time.
    /// Returns whether any channel was overridden.
    pub fn get_animated_instance_property_value(
        &self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        value: &mut PropertyValue,
    ) -> Result<bool> {
        let arity = self.properties.data_type(property).arity();
        if arity == 0 {
            return Ok(false);
        }
        let time = self.slides.slide_time(slide);
        let mut overridden = false;
        for channel in 0..arity {
            if let Some(staged) = self.pending.find(slide, instance, property, channel) {
                overridden |= value.set_channel(channel, staged.value);
                continue;
            }
            let Some(track) = self.core.get_animation(slide, instance, property, channel) else {
                continue;
            };
            if self.core.get_keyframe_count(track)? == 0 {
                continue;
            }
            let start = value.channel(channel).unwrap_or_default();
            let animated = self
                .core
                .evaluate_animation_with_dynamic_start(track, time, start)?;
            overridden |= value.set_channel(channel, animated);
        }
        Ok(overridden)
    }

    // ---------------------------------------------------------------------
    // Authoring
    // ---------------------------------------------------------------------

    /// Key the property's live value at the current time, creating one track
    /// per channel as needed. With `diff_against_current`, channels whose live
    /// value matches the evaluated track are left alone.
    pub fn keyframe_property(
        &mut self,
        instance: InstanceId,
        property: PropertyId,
        diff_against_current: bool,
    ) -> Result<()> {
        let value = self
            .properties
            .instance_property_value(instance, property)
            .ok_or(StudioError::MissingValue { instance, property })?;
        self.deanimated.clear();
        self.key_value(instance, property, &value, diff_against_current)
    }

    /// Write `keyframes[c]` at `time` into channel `c`, updating a keyframe
    /// already within the time tolerance instead of adding a second one.
    /// Missing tracks take the kind of the first supplied keyframe.
    pub fn set_or_create_keyframe(
        &mut self,
        instance: InstanceId,
        property: PropertyId,
        time: f32,
        keyframes: &[KeyframeInfo],
    ) -> Result<()> {
        let Some(first) = keyframes.first() else {
            return Ok(());
        };
        let arity = self.properties.data_type(property).arity();
        if arity == 0 {
            warn!("{property} on {instance} is not animatable; keyframes ignored");
            return Ok(());
        }
        let kind = first.keyframe.kind();
        let slide = self.resolve_slide(instance, property)?;
        self.deanimated.clear();

        for (channel, info) in keyframes.iter().take(arity).enumerate() {
            let track = self.ensure_track(slide, instance, property, channel, kind)?;
            let data = info.keyframe.with_time(time);
            let key = match self.keyframe_near(track, time)? {
                Some(existing) => {
                    self.core.set_keyframe_data(existing, data)?;
                    existing
                }
                None => self.core.insert_keyframe(track, data)?,
            };
            if info.first_keyframe_dynamic && self.core.is_first_keyframe(key)? {
                self.core.set_first_keyframe_dynamic(track, true)?;
            }
            self.pending.remove_for_animation(track);
        }
        Ok(())
    }

    /// Write a new value for an animated property.
    ///
    /// Returns `false` when no channel is animated on `slide`. With
    /// auto-keyframe on the value is keyed like [`keyframe_property`] with
    /// diffing, so unchanged channels get no keyframe. Otherwise it is staged
    /// and the staging commit is handed to the transaction sink.
    ///
    /// [`keyframe_property`]: Self::keyframe_property
    pub fn set_animated_instance_property_value(
        &mut self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        value: &PropertyValue,
    ) -> Result<bool> {
        let arity = self.properties.data_type(property).arity();
        let tracks: Vec<(usize, AnimationHandle)> = (0..arity)
            .filter_map(|channel| {
                self.core
                    .get_animation(slide, instance, property, channel)
                    .map(|h| (channel, h))
            })
            .collect();
        if tracks.is_empty() {
            return Ok(false);
        }

        if self.cfg.auto_keyframe {
            self.deanimated.clear();
            self.key_value(instance, property, value, true)?;
            return Ok(true);
        }

        let mut change = PendingValueChange::default();
        for (channel, track) in tracks {
            let Some(v) = value.channel(channel) else {
                warn!("{property} on {instance}: value has no channel {channel}");
                continue;
            };
            if let Some(old) = self.pending.for_animation(track) {
                if old.value == v {
                    continue;
                }
                change.removed.push(*old);
            }
            change.added.push(PendingValue {
                animation: track,
                slide,
                instance,
                property,
                channel,
                value: v,
            });
        }
        if change.is_empty() {
            return Ok(true);
        }
        self.deanimated.clear();
        trace!(
            "staging {} value(s) for {property} on {instance}",
            change.added.len()
        );
        self.apply_pending_change(&change);
        self.sink.record(change);
        Ok(true)
    }

    /// Re-animate a property. A snapshot left by [`deanimate`](Self::deanimate)
    /// is restored verbatim; without one the live value is keyed.
    pub fn animate(&mut self, instance: InstanceId, property: PropertyId) -> Result<()> {
        let arity = self.properties.data_type(property).arity();
        if arity == 0 {
            return Ok(());
        }
        let slide = self.resolve_slide(instance, property)?;
        let mut restored = 0usize;
        for channel in 0..arity {
            let Some(snapshot) = self.deanimated.take(slide, instance, property, channel) else {
                continue;
            };
            if self
                .core
                .get_animation(slide, instance, property, channel)
                .is_some()
            {
                debug!("channel {channel} of {property} on {instance} already animated; snapshot dropped");
                continue;
            }
            self.core.restore_animation(&snapshot)?;
            restored += 1;
        }
        if restored == 0 {
            return self.keyframe_property(instance, property, true);
        }
        debug!("restored {restored} track(s) for {property} on {instance}");
        Ok(())
    }

    /// Remove every controlling track of the property, remembering each so a
    /// following [`animate`](Self::animate) can bring it back unchanged.
    pub fn deanimate(&mut self, instance: InstanceId, property: PropertyId) -> Result<()> {
        let arity = self.properties.data_type(property).arity();
        if arity == 0 {
            return Ok(());
        }
        let slide = self.resolve_slide(instance, property)?;
        for channel in 0..arity {
            let Some(track) = self.core.get_animation(slide, instance, property, channel) else {
                continue;
            };
            let snapshot = self.core.snapshot_animation(track)?;
            self.deanimated.remember(snapshot);
            self.core.delete_animation(track)?;
            self.on_animation_deleted(track);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Staging
    // ---------------------------------------------------------------------

    pub fn apply_pending_change(&mut self, change: &PendingValueChange) {
        change.apply(&mut self.pending);
        self.notify(&change.instances());
    }

    pub fn revert_pending_change(&mut self, change: &PendingValueChange) {
        change.revert(&mut self.pending);
        self.notify(&change.instances());
    }

    pub fn clear_pending_values(&mut self) {
        let change = PendingValueChange {
            removed: self.pending.take(),
            added: Vec::new(),
        };
        self.notify(&change.instances());
    }

    pub fn clear_pending_values_for(&mut self, instance: InstanceId) {
        if !self.pending.remove_for_instance(instance).is_empty() {
            self.notify(&[instance]);
        }
    }

    /// Key every staged value at its instance's current time.
    pub fn flush_pending_values(&mut self) -> Result<()> {
        let staged: Vec<PendingValue> = self.pending.iter().copied().collect();
        let mut instances: Vec<InstanceId> = Vec::new();
        for entry in staged {
            if self.core.animation_exists(entry.animation) {
                let time = self.current_time(entry.instance, entry.slide);
                self.write_channel_value(entry.animation, time, entry.value)?;
            }
            self.pending.remove_for_animation(entry.animation);
            if !instances.contains(&entry.instance) {
                instances.push(entry.instance);
            }
        }
        self.notify(&instances);
        Ok(())
    }

    /// Drop staged values for a track deleted outside this system.
    pub fn on_animation_deleted(&mut self, animation: AnimationHandle) {
        self.pending.remove_for_animation(animation);
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn resolve_slide(&self, instance: InstanceId, property: PropertyId) -> Result<SlideId> {
        self.slides
            .applicable_slide(instance, property)
            .ok_or(StudioError::NoApplicableSlide { instance, property })
    }

    /// Playhead used for keying: the active slide of the instance's time
    /// graph, else `slide`.
    fn current_time(&self, instance: InstanceId, slide: SlideId) -> f32 {
        let active = self
            .slides
            .associated_graph(instance)
            .and_then(|(graph, own)| self.slides.graph_active_slide(graph).or(Some(own)))
            .unwrap_or(slide);
        self.slides.slide_time(active)
    }

    fn default_kind(&self) -> AnimationKind {
        if self.cfg.smooth_interpolation {
            AnimationKind::EaseInOut
        } else {
            AnimationKind::Linear
        }
    }

    fn ensure_track(
        &mut self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
        kind: AnimationKind,
    ) -> Result<AnimationHandle> {
        if let Some(track) = self.core.get_animation(slide, instance, property, channel) {
            return Ok(track);
        }
        let track = self
            .core
            .create_animation(slide, instance, property, channel, kind, false)?;
        debug!("created {kind:?} track for {property}[{channel}] on {instance} ({slide})");
        Ok(track)
    }

    /// Keyframe of `track` closest to `time`, if within the time tolerance.
    fn keyframe_near(&self, track: AnimationHandle, time: f32) -> Result<Option<KeyframeHandle>> {
        let mut best: Option<(f32, KeyframeHandle)> = None;
        for key in self.core.get_keyframes(track)? {
            let distance = (self.core.get_keyframe_data(key)?.time() - time).abs();
            if distance <= self.cfg.time_epsilon && best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, key));
            }
        }
        Ok(best.map(|(_, key)| key))
    }

    fn write_channel_value(&mut self, track: AnimationHandle, time: f32, value: f32) -> Result<()> {
        match self.keyframe_near(track, time)? {
            Some(key) => {
                let mut data = self.core.get_keyframe_data(key)?;
                data.set_value(value);
                self.core.set_keyframe_data(key, data)?;
            }
            None => {
                let kind = self.core.get_animation_info(track)?.kind;
                let data = Keyframe::new_with_ease(
                    kind,
                    time,
                    value,
                    self.cfg.default_ease_in,
                    self.cfg.default_ease_out,
                );
                self.core.insert_keyframe(track, data)?;
            }
        }
        Ok(())
    }

    fn key_value(
        &mut self,
        instance: InstanceId,
        property: PropertyId,
        value: &PropertyValue,
        diff_against_current: bool,
    ) -> Result<()> {
        let arity = self.properties.data_type(property).arity();
        if arity == 0 {
            debug!("{property} on {instance} is not animatable; nothing to key");
            return Ok(());
        }
        let slide = self.resolve_slide(instance, property)?;
        let time = self.current_time(instance, slide);
        let kind = self.default_kind();

        for channel in 0..arity {
            let Some(live) = value.channel(channel) else {
                warn!("{property} on {instance}: value has no channel {channel}");
                continue;
            };
            let track = self.ensure_track(slide, instance, property, channel, kind)?;
            if diff_against_current && self.core.get_keyframe_count(track)? > 0 {
                let current = self
                    .core
                    .evaluate_animation_with_dynamic_start(track, time, live)?;
                if (current - live).abs() <= self.cfg.value_epsilon {
                    continue;
                }
            }
            self.write_channel_value(track, time, live)?;
            self.pending.remove_for_animation(track);
        }
        Ok(())
    }

    fn notify(&mut self, instances: &[InstanceId]) {
        if let Some(refresh) = self.refresh.as_mut() {
            for instance in instances {
                refresh(*instance);
            }
        }
    }
}
