//! Staged values for animated properties edited without keyframing.
//!
//! A staged value overrides its track's evaluated value until it is keyed,
//! cleared, or reverted. At most one entry exists per track.

use kinema_animation_core::{AnimationHandle, InstanceId, PropertyId, SlideId};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingValue {
    pub animation: AnimationHandle,
    pub slide: SlideId,
    pub instance: InstanceId,
    pub property: PropertyId,
    pub channel: usize,
    pub value: f32,
}

impl PendingValue {
    #[inline]
    pub fn matches(
        &self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
    ) -> bool {
        self.slide == slide
            && self.instance == instance
            && self.property == property
            && self.channel == channel
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingValues {
    entries: Vec<PendingValue>,
}

impl PendingValues {
    pub fn find(
        &self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
    ) -> Option<&PendingValue> {
        self.entries
            .iter()
            .find(|p| p.matches(slide, instance, property, channel))
    }

    pub fn for_animation(&self, animation: AnimationHandle) -> Option<&PendingValue> {
        self.entries.iter().find(|p| p.animation == animation)
    }

    /// Insert, replacing any entry for the same track. Returns the replaced entry.
    pub fn insert(&mut self, value: PendingValue) -> Option<PendingValue> {
        match self
            .entries
            .iter_mut()
            .find(|p| p.animation == value.animation)
        {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push(value);
                None
            }
        }
    }

    pub fn remove_for_animation(&mut self, animation: AnimationHandle) -> Option<PendingValue> {
        let idx = self.entries.iter().position(|p| p.animation == animation)?;
        Some(self.entries.remove(idx))
    }

    /// Remove every entry for `instance`, returning them.
    pub fn remove_for_instance(&mut self, instance: InstanceId) -> Vec<PendingValue> {
        let (removed, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|p| p.instance == instance);
        self.entries = kept;
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingValue> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn take(&mut self) -> Vec<PendingValue> {
        std::mem::take(&mut self.entries)
    }
}

/// A change that can be replayed and undone against the staging list.
pub trait Reversible {
    fn apply(&self, pending: &mut PendingValues);
    fn revert(&self, pending: &mut PendingValues);
}

/// One staging commit: the entries it displaced and the entries it added.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingValueChange {
    pub removed: Vec<PendingValue>,
    pub added: Vec<PendingValue>,
}

impl PendingValueChange {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Instances touched by this change, without duplicates.
    pub fn instances(&self) -> Vec<InstanceId> {
        let mut out: Vec<InstanceId> = Vec::new();
        for entry in self.removed.iter().chain(&self.added) {
            if !out.contains(&entry.instance) {
                out.push(entry.instance);
            }
        }
        out
    }
}

impl Reversible for PendingValueChange {
    fn apply(&self, pending: &mut PendingValues) {
        for entry in &self.removed {
            pending.remove_for_animation(entry.animation);
        }
        for entry in &self.added {
            pending.insert(*entry);
        }
    }

    fn revert(&self, pending: &mut PendingValues) {
        for entry in &self.added {
            pending.remove_for_animation(entry.animation);
        }
        for entry in &self.removed {
            pending.insert(*entry);
        }
    }
}
