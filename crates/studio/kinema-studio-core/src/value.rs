//! Property values as seen by the authoring layer.
//!
//! Only float-based types are animatable; each float component is one
//! animation channel.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    None,
    Float,
    Float2,
    Float3,
    Float4,
    /// RGBA
    Color,
    Long,
    Bool,
    String,
}

impl DataType {
    /// Number of animation channels; 0 for non-animatable types.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            DataType::Float => 1,
            DataType::Float2 => 2,
            DataType::Float3 => 3,
            DataType::Float4 | DataType::Color => 4,
            DataType::None | DataType::Long | DataType::Bool | DataType::String => 0,
        }
    }

    #[inline]
    pub fn is_animatable(self) -> bool {
        self.arity() > 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum PropertyValue {
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Color([f32; 4]),
    Long(i32),
    Bool(bool),
    String(String),
}

impl PropertyValue {
    pub fn data_type(&self) -> DataType {
        match self {
            PropertyValue::Float(_) => DataType::Float,
            PropertyValue::Float2(_) => DataType::Float2,
            PropertyValue::Float3(_) => DataType::Float3,
            PropertyValue::Float4(_) => DataType::Float4,
            PropertyValue::Color(_) => DataType::Color,
            PropertyValue::Long(_) => DataType::Long,
            PropertyValue::Bool(_) => DataType::Bool,
            PropertyValue::String(_) => DataType::String,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.data_type().arity()
    }

    fn components(&self) -> &[f32] {
        match self {
            PropertyValue::Float(v) => std::slice::from_ref(v),
            PropertyValue::Float2(v) => v,
            PropertyValue::Float3(v) => v,
            PropertyValue::Float4(v) | PropertyValue::Color(v) => v,
            PropertyValue::Long(_) | PropertyValue::Bool(_) | PropertyValue::String(_) => &[],
        }
    }

    fn components_mut(&mut self) -> &mut [f32] {
        match self {
            PropertyValue::Float(v) => std::slice::from_mut(v),
            PropertyValue::Float2(v) => v,
            PropertyValue::Float3(v) => v,
            PropertyValue::Float4(v) | PropertyValue::Color(v) => v,
            PropertyValue::Long(_) | PropertyValue::Bool(_) | PropertyValue::String(_) => {
                &mut []
            }
        }
    }

    /// Component `channel`, or `None` when out of range or not float-based.
    #[inline]
    pub fn channel(&self, channel: usize) -> Option<f32> {
        self.components().get(channel).copied()
    }

    /// Returns false when the channel does not exist.
    pub fn set_channel(&mut self, channel: usize, value: f32) -> bool {
        match self.components_mut().get_mut(channel) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
