//! Error types for the animation core

use crate::ids::{InstanceId, PropertyId, SlideId};
use crate::keyframe::AnimationKind;

/// Failures reported by [`AnimationCore`](crate::AnimationCore).
///
/// `AnimationExists` and `AnimationKeyframeTypeError` are conditions the caller
/// is expected to branch on. The remaining variants indicate a defect upstream
/// (stale handles, impossible states) and are never user-facing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// A live track already occupies this (slide, instance, property, channel).
    #[error("Animation already exists for {slide} {instance} {property} channel {channel}")]
    AnimationExists {
        slide: SlideId,
        instance: InstanceId,
        property: PropertyId,
        channel: usize,
    },

    /// An object was about to be stored under a handle that is still live.
    #[error("Handle already exists")]
    HandleExists,

    /// Keyframe variant does not match the owning track's kind.
    #[error("Keyframe type mismatch: track is {expected:?}, keyframe is {actual:?}")]
    AnimationKeyframeTypeError {
        expected: AnimationKind,
        actual: AnimationKind,
    },

    /// The track could not be evaluated.
    #[error("Animation evaluation error: {reason}")]
    AnimationEvaluationError { reason: String },

    /// Handle does not refer to a live object of the requested kind.
    #[error("Invalid handle: {what}")]
    InvalidHandle { what: &'static str },

    /// Operation is declared but has no implementation.
    #[error("Not implemented: {operation}")]
    NotImplemented { operation: &'static str },
}

impl AnimationError {
    /// Whether this error signals a defect in the caller rather than a
    /// condition it should handle.
    #[inline]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::HandleExists
                | Self::InvalidHandle { .. }
                | Self::AnimationEvaluationError { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::AnimationExists { .. } | Self::HandleExists | Self::InvalidHandle { .. } => {
                "store"
            }
            Self::AnimationKeyframeTypeError { .. } => "validation",
            Self::AnimationEvaluationError { .. } => "evaluation",
            Self::NotImplemented { .. } => "unsupported",
        }
    }
}
