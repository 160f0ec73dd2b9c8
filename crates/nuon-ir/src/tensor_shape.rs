//! Tensor shapes.

use std::fmt;
use std::ops::{Index, IndexMut};

/// An ordered sequence of signed 64-bit dimensions.
///
/// A dimension of −1 denotes an unknown (symbolic) extent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TensorShape {
    dims: Vec<i64>,
}

impl TensorShape {
    /// Creates an empty (zero-rank) shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shape from the given dimensions.
    pub fn from_dims(dims: impl Into<Vec<i64>>) -> Self {
        Self { dims: dims.into() }
    }

    /// Number of dimensions.
    pub fn dims_num(&self) -> usize {
        self.dims.len()
    }

    /// Resizes to `num` dimensions, filling new slots with 0.
    pub fn set_dims_num(&mut self, num: usize) {
        self.dims.resize(num, 0);
    }

    /// Appends a dimension.
    pub fn add_dim(&mut self, dim: i64) {
        self.dims.push(dim);
    }

    /// The dimensions as a slice.
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    /// Replaces all dimensions.
    pub fn set_dims(&mut self, dims: impl Into<Vec<i64>>) {
        self.dims = dims.into();
    }

    /// A shape is scalar iff it has no dims, or exactly one dim of 1.
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty() || (self.dims.len() == 1 && self.dims[0] == 1)
    }

    /// Product of all dimensions; 0 for an empty shape.
    pub fn element_num(&self) -> i64 {
        if self.dims.is_empty() {
            return 0;
        }
        self.dims.iter().product()
    }
}

impl Index<usize> for TensorShape {
    type Output = i64;

    fn index(&self, index: usize) -> &i64 {
        &self.dims[index]
    }
}

impl IndexMut<usize> for TensorShape {
    fn index_mut(&mut self, index: usize) -> &mut i64 {
        &mut self.dims[index]
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{dim}")?;
        }
        f.write_str("}")
    }
}
