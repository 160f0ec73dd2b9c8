//! Shared builders for fabricating ONNX models in memory.

use nuon_onnx::proto::{
    data_type, GraphProto, ModelProto, OperatorSetIdProto, TensorShapeDimension, ValueInfoProto,
};
use prost::Message as _;

/// Fixed dimensions for a value-info shape.
#[allow(dead_code)]
pub fn fixed(dims: &[i64]) -> Vec<TensorShapeDimension> {
    dims.iter().map(|&d| TensorShapeDimension::fixed(d)).collect()
}

/// Symbolic dimensions (all unknown) of the given rank.
#[allow(dead_code)]
pub fn symbolic(rank: usize) -> Vec<TensorShapeDimension> {
    (0..rank)
        .map(|i| TensorShapeDimension::symbolic(format!("d{i}")))
        .collect()
}

/// A float tensor value-info with fixed dims.
#[allow(dead_code)]
pub fn float_value(name: &str, dims: &[i64]) -> ValueInfoProto {
    ValueInfoProto::tensor(name, data_type::FLOAT, fixed(dims))
}

/// A float tensor value-info whose dims are all symbolic; shape
/// inference is expected to fill them in.
#[allow(dead_code)]
pub fn float_value_symbolic(name: &str, rank: usize) -> ValueInfoProto {
    ValueInfoProto::tensor(name, data_type::FLOAT, symbolic(rank))
}

/// Wraps a graph in a loadable model envelope.
#[allow(dead_code)]
pub fn model_with_graph(graph: GraphProto) -> ModelProto {
    ModelProto {
        ir_version: 8,
        producer_name: "nuon-e2e".into(),
        producer_version: "0.1.0".into(),
        graph: Some(graph),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 13,
        }],
        ..Default::default()
    }
}

/// Encodes and loads a model; the graph is initialized but not built.
#[allow(dead_code)]
pub fn load(model: &ModelProto) -> nuon_common::Result<nuon_ir::Model> {
    nuon_onnx::load_from_memory(&model.encode_to_vec())
}

/// Encodes, loads, and runs the full topology pipeline.
#[allow(dead_code)]
pub fn load_and_build(model: &ModelProto) -> nuon_common::Result<nuon_ir::Model> {
    let mut ir_model = load(model)?;
    ir_model.get_graph_mut().construct_topology()?;
    Ok(ir_model)
}

/// The inferred dims of the arg named `name`.
#[allow(dead_code)]
pub fn arg_dims(model: &nuon_ir::Model, name: &str) -> Vec<i64> {
    let graph = model.get_graph();
    let handle = graph
        .get_nodearg(name)
        .unwrap_or_else(|| panic!("no nodearg named {name}"));
    graph.arg(handle).shape().dims().to_vec()
}

/// Node names in topological order.
#[allow(dead_code)]
pub fn topo_names(model: &nuon_ir::Model) -> Vec<String> {
    model
        .get_graph()
        .topological_nodes()
        .map(|node| node.name().to_string())
        .collect()
}
