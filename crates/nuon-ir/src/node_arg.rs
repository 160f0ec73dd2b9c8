//! Named, typed edge values.

use crate::tensor_shape::TensorShape;
use crate::types::PrimitiveDataType;

/// A named, typed, shape-bearing value flowing along a graph edge.
///
/// Names are the sole identity used to wire producers to consumers; the
/// graph keeps one canonical `NodeArg` per name. Two args compare equal
/// iff name, data type, and shape all match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeArg {
    name: String,
    data_type: PrimitiveDataType,
    shape: TensorShape,
}

impl NodeArg {
    /// Creates an arg with unknown type and empty shape.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: PrimitiveDataType::Unknown,
            shape: TensorShape::new(),
        }
    }

    pub fn with_type_shape(
        name: impl Into<String>,
        data_type: PrimitiveDataType,
        shape: TensorShape,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            shape,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> PrimitiveDataType {
        self.data_type
    }

    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    /// The only mutation: shape inference writes the inferred shape here.
    pub fn set_shape(&mut self, shape: TensorShape) {
        self.shape = shape;
    }
}
