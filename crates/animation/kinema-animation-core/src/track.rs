//! Animation tracks: identity, flags and the time-ordered keyframe list.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::ids::{InstanceId, PropertyId, SlideId};
use crate::keyframe::{AnimationKind, Keyframe};
use crate::store::KeyframeHandle;
use crate::Result;

/// Identity and flags of a track.
///
/// (slide, instance, property, channel) is unique among live tracks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationInfo {
    pub slide: SlideId,
    pub instance: InstanceId,
    pub property: PropertyId,
    /// Component index of a vector-valued property (0 for scalars).
    pub channel: usize,
    pub kind: AnimationKind,
    /// The first keyframe's value is supplied at playback time rather than fixed.
    #[serde(default)]
    pub first_keyframe_dynamic: bool,
    /// Keyframes were authored deliberately rather than generated as scaffolding.
    #[serde(default)]
    pub artist_edited: bool,
}

impl AnimationInfo {
    pub fn new(
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
        kind: AnimationKind,
    ) -> Self {
        Self {
            slide,
            instance,
            property,
            channel,
            kind,
            first_keyframe_dynamic: false,
            artist_edited: false,
        }
    }

    #[inline]
    pub fn matches(&self, property: PropertyId, channel: usize) -> bool {
        self.property == property && self.channel == channel
    }
}

/// A track's info together with its keyframes in time order.
///
/// Used to copy tracks, to restore a deanimated property and as the fixture
/// format for tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub info: AnimationInfo,
    pub keyframes: Vec<Keyframe>,
}

/// Keyframe handles plus a flag recording that the order may be stale.
#[derive(Debug, Default)]
pub(crate) struct KeyframeList {
    pub handles: Vec<KeyframeHandle>,
    pub dirty: bool,
}

#[derive(Debug)]
pub(crate) struct AnimationTrack {
    pub info: AnimationInfo,
    /// Sorted on demand; evaluation only has `&self`, hence the cell.
    pub keyframes: RefCell<KeyframeList>,
}

impl AnimationTrack {
    pub fn new(info: AnimationInfo) -> Self {
        Self {
            info,
            keyframes: RefCell::new(KeyframeList::default()),
        }
    }

    /// Attach a keyframe. A handle already in the list means the store handed
    /// out a live key twice.
    pub fn push_keyframe(&mut self, handle: KeyframeHandle) -> Result<()> {
        let list = self.keyframes.get_mut();
        if list.handles.contains(&handle) {
            return Err(AnimationError::HandleExists);
        }
        list.handles.push(handle);
        list.dirty = true;
        Ok(())
    }

    /// Returns whether the handle was present.
    pub fn remove_keyframe(&mut self, handle: KeyframeHandle) -> bool {
        let list = self.keyframes.get_mut();
        let before = list.handles.len();
        list.handles.retain(|h| *h != handle);
        before != list.handles.len()
    }

    pub fn mark_dirty(&mut self) {
        self.keyframes.get_mut().dirty = true;
    }

    pub fn take_keyframes(&mut self) -> Vec<KeyframeHandle> {
        let list = self.keyframes.get_mut();
        list.dirty = false;
        std::mem::take(&mut list.handles)
    }

    #[inline]
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.borrow().handles.len()
    }
}
