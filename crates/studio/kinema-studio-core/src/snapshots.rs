//! Tracks captured by `deanimate`, kept until the property is re-animated or
//! another authoring edit makes them stale.

use kinema_animation_core::{AnimationSnapshot, InstanceId, PropertyId, SlideId};

#[derive(Clone, Debug, Default)]
pub struct DeanimatedTracks {
    snapshots: Vec<AnimationSnapshot>,
}

impl DeanimatedTracks {
    /// Store `snapshot`, overwriting any earlier one for the same channel.
    pub fn remember(&mut self, snapshot: AnimationSnapshot) {
        let info = snapshot.info;
        self.snapshots.retain(|s| {
            !(s.info.slide == info.slide
                && s.info.instance == info.instance
                && s.info.matches(info.property, info.channel))
        });
        self.snapshots.push(snapshot);
    }

    /// Remove and return the snapshot for one channel.
    pub fn take(
        &mut self,
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
    ) -> Option<AnimationSnapshot> {
        let idx = self.snapshots.iter().position(|s| {
            s.info.slide == slide && s.info.instance == instance && s.info.matches(property, channel)
        })?;
        Some(self.snapshots.remove(idx))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
