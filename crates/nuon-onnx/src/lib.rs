//! ONNX wire-format deserializer for nuon.
//!
//! Parses serialized ONNX models (protobuf wire format) and lifts them
//! into [`nuon_ir::Model`]s. Message types are hand-defined in
//! [`proto`] with field tags matching the published ONNX schema; the
//! loading pipeline lives in [`reader`].
//!
//! The returned model's graph is initialized but not yet validated; the
//! caller runs [`Graph::construct_topology`](nuon_ir::Graph::construct_topology)
//! before using the IR.

pub mod proto;
mod reader;

pub use reader::{load_from_file, load_from_memory, IR_VERSION_MAX, IR_VERSION_MIN};
