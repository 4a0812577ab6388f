//! Kinema Animation Core
//!
//! Handle-based storage for per-property animation tracks and their keyframes,
//! plus the evaluation math (linear, bezier and ease-in/ease-out interpolation)
//! used by both the editor and the runtime player.

pub mod config;
pub mod cubic;
pub mod engine;
pub mod error;
pub mod ids;
pub mod keyframe;
pub mod lookup;
pub mod store;
pub mod track;

// Re-exports for consumers (studio bridge, hosts)
pub use engine::AnimationCore;
pub use config::Config;
pub use cubic::CubicPolynomial;
pub use error::AnimationError;
pub use ids::{GraphId, InstanceId, PropertyId, SlideId};
pub use keyframe::{
    AnimationKind, BezierKeyframe, EaseInOutKeyframe, Keyframe, LinearKeyframe, Tangent,
};
pub use store::{AnimationHandle, KeyframeHandle};
pub use track::{AnimationInfo, AnimationSnapshot};

/// Result alias used across the core.
pub type Result<T> = std::result::Result<T, AnimationError>;
