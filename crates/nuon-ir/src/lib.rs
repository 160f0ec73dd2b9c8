//! nuon intermediate representation.
//!
//! An in-memory computation graph lifted from a serialized model: typed
//! operator [`Node`]s connected by named, shape-bearing [`NodeArg`]s,
//! owned by a [`Graph`] that validates the DAG, orders it topologically,
//! and runs per-operator shape inference.

pub mod arena;
mod attribute;
mod graph;
pub mod infer;
mod model;
mod node;
mod node_arg;
mod tensor;
mod tensor_shape;
mod types;

pub use arena::{Arena, Handle};
pub use attribute::{AttributeKind, AttributeValue, NodeAttribute};
pub use graph::Graph;
pub use infer::{registry, InferRegistry, ShapeInfer};
pub use model::Model;
pub use node::{Edge, Node, NodeId};
pub use node_arg::NodeArg;
pub use tensor::Tensor;
pub use tensor_shape::TensorShape;
pub use types::{size_of_datatype, PrimitiveDataType};
