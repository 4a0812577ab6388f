use kinema_animation_core::{AnimationError, InstanceId, PropertyId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StudioError {
    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error("No value for {property} on {instance}")]
    MissingValue {
        instance: InstanceId,
        property: PropertyId,
    },

    #[error("No applicable slide for {property} on {instance}")]
    NoApplicableSlide {
        instance: InstanceId,
        property: PropertyId,
    },
}

impl StudioError {
    pub fn category(&self) -> &'static str {
        match self {
            StudioError::Animation(err) => err.category(),
            StudioError::MissingValue { .. } | StudioError::NoApplicableSlide { .. } => "scene",
        }
    }
}
