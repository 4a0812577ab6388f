//! Handle object store.
//!
//! One generation-checked arena holds both tracks and keyframes. Typed handle
//! wrappers ([`AnimationHandle`], [`KeyframeHandle`]) select the logical kind,
//! so a keyframe handle can never be resolved as a track even though both share
//! the same physical key space. Erased keys are never handed out again while a
//! stale copy could still resolve to the new object.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::error::AnimationError;
use crate::keyframe::Keyframe;
use crate::track::AnimationTrack;
use crate::Result;

new_key_type! {
    /// Raw arena key shared by every stored object.
    pub struct Handle;
}

/// Handle to an animation track.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AnimationHandle(Handle);

/// Handle to a keyframe owned by a track.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyframeHandle(Handle);

impl AnimationHandle {
    #[inline]
    pub fn raw(self) -> Handle {
        self.0
    }
}

impl KeyframeHandle {
    #[inline]
    pub fn raw(self) -> Handle {
        self.0
    }
}

/// Keyframe data plus a back-reference to its owning track.
#[derive(Debug, Clone)]
pub(crate) struct KeyframeRecord {
    pub animation: AnimationHandle,
    pub data: Keyframe,
}

#[derive(Debug)]
pub(crate) enum StoredObject {
    Animation(AnimationTrack),
    Keyframe(KeyframeRecord),
}

#[derive(Debug, Default)]
pub(crate) struct HandleStore {
    objects: SlotMap<Handle, StoredObject>,
}

const TRACK: &str = "animation track";
const KEYFRAME: &str = "keyframe";

impl HandleStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn insert_animation(&mut self, track: AnimationTrack) -> AnimationHandle {
        AnimationHandle(self.objects.insert(StoredObject::Animation(track)))
    }

    pub fn insert_keyframe(&mut self, record: KeyframeRecord) -> KeyframeHandle {
        KeyframeHandle(self.objects.insert(StoredObject::Keyframe(record)))
    }

    pub fn animation(&self, handle: AnimationHandle) -> Result<&AnimationTrack> {
        match self.objects.get(handle.0) {
            Some(StoredObject::Animation(track)) => Ok(track),
            _ => Err(AnimationError::InvalidHandle { what: TRACK }),
        }
    }

    pub fn animation_mut(&mut self, handle: AnimationHandle) -> Result<&mut AnimationTrack> {
        match self.objects.get_mut(handle.0) {
            Some(StoredObject::Animation(track)) => Ok(track),
            _ => Err(AnimationError::InvalidHandle { what: TRACK }),
        }
    }

    pub fn keyframe(&self, handle: KeyframeHandle) -> Result<&KeyframeRecord> {
        match self.objects.get(handle.0) {
            Some(StoredObject::Keyframe(record)) => Ok(record),
            _ => Err(AnimationError::InvalidHandle { what: KEYFRAME }),
        }
    }

    pub fn keyframe_mut(&mut self, handle: KeyframeHandle) -> Result<&mut KeyframeRecord> {
        match self.objects.get_mut(handle.0) {
            Some(StoredObject::Keyframe(record)) => Ok(record),
            _ => Err(AnimationError::InvalidHandle { what: KEYFRAME }),
        }
    }

    pub fn remove_animation(&mut self, handle: AnimationHandle) -> Result<AnimationTrack> {
        self.animation(handle)?;
        match self.objects.remove(handle.0) {
            Some(StoredObject::Animation(track)) => Ok(track),
            _ => Err(AnimationError::InvalidHandle { what: TRACK }),
        }
    }

    pub fn remove_keyframe(&mut self, handle: KeyframeHandle) -> Result<KeyframeRecord> {
        self.keyframe(handle)?;
        match self.objects.remove(handle.0) {
            Some(StoredObject::Keyframe(record)) => Ok(record),
            _ => Err(AnimationError::InvalidHandle { what: KEYFRAME }),
        }
    }

    pub fn animations(&self) -> impl Iterator<Item = (AnimationHandle, &AnimationTrack)> {
        self.objects.iter().filter_map(|(key, obj)| match obj {
            StoredObject::Animation(track) => Some((AnimationHandle(key), track)),
            StoredObject::Keyframe(_) => None,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{InstanceId, PropertyId, SlideId};
    use crate::keyframe::AnimationKind;
    use crate::track::AnimationInfo;

    fn track() -> AnimationTrack {
        AnimationTrack::new(AnimationInfo::new(
            SlideId(1),
            InstanceId(2),
            PropertyId(3),
            0,
            AnimationKind::Linear,
        ))
    }

    #[test]
    fn typed_lookup_rejects_wrong_kind() {
        let mut store = HandleStore::default();
        let anim = store.insert_animation(track());
        let key = store.insert_keyframe(KeyframeRecord {
            animation: anim,
            data: Keyframe::linear(0.0, 1.0),
        });

        assert!(store.animation(anim).is_ok());
        assert!(store.keyframe(key).is_ok());
        // Same physical arena, different logical kind.
        assert!(store.keyframe(KeyframeHandle(anim.raw())).is_err());
        assert!(store.animation(AnimationHandle(key.raw())).is_err());
    }

    #[test]
    fn erased_handles_stay_invalid_after_slot_reuse() {
        let mut store = HandleStore::default();
        let anim = store.insert_animation(track());
        let first = store.insert_keyframe(KeyframeRecord {
            animation: anim,
            data: Keyframe::linear(0.0, 1.0),
        });
        store.remove_keyframe(first).unwrap();
        let second = store.insert_keyframe(KeyframeRecord {
            animation: anim,
            data: Keyframe::linear(1.0, 2.0),
        });

        assert_ne!(first, second);
        assert_eq!(
            store.keyframe(first).unwrap_err(),
            AnimationError::InvalidHandle { what: KEYFRAME }
        );
        assert_eq!(store.keyframe(second).unwrap().data.time(), 1.0);
        assert!(store.remove_keyframe(first).is_err());
    }

    #[test]
    fn animations_iterator_skips_keyframes() {
        let mut store = HandleStore::with_capacity(8);
        let anim = store.insert_animation(track());
        store.insert_keyframe(KeyframeRecord {
            animation: anim,
            data: Keyframe::linear(0.0, 1.0),
        });
        assert_eq!(store.len(), 2);
        let handles: Vec<_> = store.animations().map(|(h, _)| h).collect();
        assert_eq!(handles, vec![anim]);
        store.clear();
        assert_eq!(store.len(), 0);
    }
}
