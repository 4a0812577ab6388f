//! Secondary index: (slide, instance) -> track handles.
//!
//! Invariant: every track creation inserts its handle and every deletion
//! removes it. A stale entry would make `get_animation` return a dead handle,
//! a missing one would hide a live track. The index may be dropped wholesale;
//! the owner then rebuilds it from the store on next use.

use hashbrown::HashMap;

use crate::ids::{InstanceId, SlideId};
use crate::store::AnimationHandle;

#[derive(Debug, Default)]
pub(crate) struct LookupCache {
    buckets: HashMap<(SlideId, InstanceId), Vec<AnimationHandle>>,
}

impl LookupCache {
    pub fn insert(&mut self, slide: SlideId, instance: InstanceId, handle: AnimationHandle) {
        self.buckets
            .entry((slide, instance))
            .or_default()
            .push(handle);
    }

    pub fn remove(&mut self, slide: SlideId, instance: InstanceId, handle: AnimationHandle) {
        let key = (slide, instance);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.retain(|h| *h != handle);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    pub fn bucket(&self, slide: SlideId, instance: InstanceId) -> &[AnimationHandle] {
        self.buckets
            .get(&(slide, instance))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
