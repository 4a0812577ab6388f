//! Kinema Studio Core
//!
//! Editor-side bridge between scene properties and the animation core:
//! keyframing live property values, staging unkeyed edits on animated
//! properties, and deanimate/animate round trips.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod pending;
pub mod snapshots;
pub mod system;
pub mod value;

pub use collaborators::{
    NullTransactionSink, PropertySystem, RecordingTransactionSink, SlideSystem, TransactionSink,
};
pub use config::StudioConfig;
pub use error::StudioError;
pub use pending::{PendingValue, PendingValueChange, PendingValues, Reversible};
pub use system::{KeyframeInfo, StudioAnimationSystem};
pub use value::{DataType, PropertyValue};

pub type Result<T> = std::result::Result<T, StudioError>;
