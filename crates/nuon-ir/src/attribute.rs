//! Operator-local attributes.

use nuon_common::{Result, Status};

use crate::tensor::Tensor;

/// The kind tag of a [`NodeAttribute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Int64,
    Float,
    String,
    Tensor,
    Int64Array,
    FloatArray,
    StringArray,
    TensorArray,
    Invalid,
}

/// Payload of a [`NodeAttribute`], tagged by [`AttributeKind`].
#[derive(Debug)]
pub enum AttributeValue {
    Int64(i64),
    Float(f32),
    String(String),
    Tensor(Tensor),
    Int64s(Vec<i64>),
    Floats(Vec<f32>),
    Strings(Vec<String>),
    Tensors(Vec<Tensor>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Int64(_) => AttributeKind::Int64,
            Self::Float(_) => AttributeKind::Float,
            Self::String(_) => AttributeKind::String,
            Self::Tensor(_) => AttributeKind::Tensor,
            Self::Int64s(_) => AttributeKind::Int64Array,
            Self::Floats(_) => AttributeKind::FloatArray,
            Self::Strings(_) => AttributeKind::StringArray,
            Self::Tensors(_) => AttributeKind::TensorArray,
        }
    }
}

/// A static per-node operator parameter (axis, kernel shape, ...).
///
/// Accessors are kind-checked: requesting a float from an int64
/// attribute fails rather than coercing.
#[derive(Debug)]
pub struct NodeAttribute {
    name: String,
    value: AttributeValue,
}

impl NodeAttribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.value.kind()
    }

    fn mismatch(&self, requested: AttributeKind) -> Status {
        Status::Fail(format!(
            "attribute [{}] holds {:?}, not {requested:?}",
            self.name,
            self.kind()
        ))
    }

    pub fn as_i64(&self) -> Result<i64> {
        match &self.value {
            AttributeValue::Int64(v) => Ok(*v),
            _ => Err(self.mismatch(AttributeKind::Int64)),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match &self.value {
            AttributeValue::Float(v) => Ok(*v),
            _ => Err(self.mismatch(AttributeKind::Float)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match &self.value {
            AttributeValue::String(v) => Ok(v),
            _ => Err(self.mismatch(AttributeKind::String)),
        }
    }

    pub fn as_tensor(&self) -> Result<&Tensor> {
        match &self.value {
            AttributeValue::Tensor(v) => Ok(v),
            _ => Err(self.mismatch(AttributeKind::Tensor)),
        }
    }

    pub fn as_i64s(&self) -> Result<&[i64]> {
        match &self.value {
            AttributeValue::Int64s(v) => Ok(v),
            _ => Err(self.mismatch(AttributeKind::Int64Array)),
        }
    }

    pub fn as_f32s(&self) -> Result<&[f32]> {
        match &self.value {
            AttributeValue::Floats(v) => Ok(v),
            _ => Err(self.mismatch(AttributeKind::FloatArray)),
        }
    }

    pub fn as_strs(&self) -> Result<&[String]> {
        match &self.value {
            AttributeValue::Strings(v) => Ok(v),
            _ => Err(self.mismatch(AttributeKind::StringArray)),
        }
    }

    pub fn as_tensors(&self) -> Result<&[Tensor]> {
        match &self.value {
            AttributeValue::Tensors(v) => Ok(v),
            _ => Err(self.mismatch(AttributeKind::TensorArray)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuon_common::StatusKind;

    #[test]
    fn int_attribute_roundtrip() {
        let attr = NodeAttribute::new("axis", AttributeValue::Int64(1));
        assert_eq!(attr.kind(), AttributeKind::Int64);
        assert_eq!(attr.as_i64().unwrap(), 1);
    }

    #[test]
    fn kind_mismatch_fails() {
        let attr = NodeAttribute::new("axis", AttributeValue::Int64(1));
        let err = attr.as_f32().unwrap_err();
        assert_eq!(err.kind(), StatusKind::Fail);
        assert!(err.message().contains("axis"));
    }

    #[test]
    fn array_accessors_return_slices() {
        let attr = NodeAttribute::new("pads", AttributeValue::Int64s(vec![3, 3, 3, 3]));
        assert_eq!(attr.kind(), AttributeKind::Int64Array);
        assert_eq!(attr.as_i64s().unwrap(), &[3, 3, 3, 3]);
        assert!(attr.as_i64().is_err());
    }

    #[test]
    fn string_attribute() {
        let attr = NodeAttribute::new("auto_pad", AttributeValue::String("NOTSET".into()));
        assert_eq!(attr.as_str().unwrap(), "NOTSET");
        assert!(attr.as_strs().is_err());
    }

    #[test]
    fn float_array_attribute() {
        let attr = NodeAttribute::new("scales", AttributeValue::Floats(vec![1.0, 2.0]));
        assert_eq!(attr.as_f32s().unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn tensor_attribute_kind() {
        let attr = NodeAttribute::new("value", AttributeValue::Tensor(Tensor::new("value")));
        assert_eq!(attr.kind(), AttributeKind::Tensor);
        assert!(attr.as_tensor().is_ok());
        assert!(attr.as_tensors().is_err());
    }
}
